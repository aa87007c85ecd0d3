//! Shared test fixtures

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use bcryptx::estimator::TEST_PASSWORD;
use bcryptx::{Error, HashPrimitive, Result};

/// Start and end of one non-tuning `generate` call
#[derive(Debug, Clone, Copy)]
pub struct Span {
    pub start: Instant,
    pub end: Instant,
}

impl Span {
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Fake primitive with latency doubling from 0.5ms at cost 4
///
/// Hashes look like `fake$<cost>$<secret>`.
#[derive(Default)]
pub struct Recording {
    tuning_runs: AtomicUsize,
    spans: Mutex<Vec<Span>>,
}

impl Recording {
    pub fn latency(cost: u32) -> Duration {
        Duration::from_micros(500 << (cost - Self::MIN_COST))
    }

    /// Number of tuning runs started (each begins by timing the minimum cost)
    pub fn tuning_runs(&self) -> usize {
        self.tuning_runs.load(Ordering::SeqCst)
    }

    pub fn spans(&self) -> Vec<Span> {
        self.spans.lock().unwrap().clone()
    }
}

impl HashPrimitive for Recording {
    const MIN_COST: u32 = 4;
    const MAX_COST: u32 = 20;

    fn generate(&self, secret: &[u8], cost: u32) -> Result<String> {
        if !(Self::MIN_COST..=Self::MAX_COST).contains(&cost) {
            return Err(Error::Primitive(format!("cost {cost} not allowed")));
        }

        let tuning = secret == TEST_PASSWORD.as_bytes();
        if tuning && cost == Self::MIN_COST {
            self.tuning_runs.fetch_add(1, Ordering::SeqCst);
        }

        let start = Instant::now();
        thread::sleep(Self::latency(cost));
        let end = Instant::now();

        if !tuning {
            self.spans.lock().unwrap().push(Span { start, end });
        }
        Ok(format!("fake${cost}${}", String::from_utf8_lossy(secret)))
    }

    fn compare(&self, hash: &str, secret: &[u8]) -> Result<()> {
        let (_, stored) = parse(hash)?;
        if stored.as_bytes() == secret {
            Ok(())
        } else {
            Err(Error::Mismatch)
        }
    }

    fn extract_cost(&self, hash: &str) -> Result<u32> {
        parse(hash).map(|(cost, _)| cost)
    }
}

fn parse(hash: &str) -> Result<(u32, &str)> {
    let malformed = || Error::MalformedHash(hash.to_string());
    let rest = hash.strip_prefix("fake$").ok_or_else(malformed)?;
    let (cost, secret) = rest.split_once('$').ok_or_else(malformed)?;
    Ok((cost.parse().map_err(|_| malformed())?, secret))
}
