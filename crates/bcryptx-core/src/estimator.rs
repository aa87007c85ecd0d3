//! Cost estimation
//!
//! Tuning builds a latency table indexed by cost. Low costs are timed
//! directly by hashing a fixed password. Once a cost takes at least
//! [`INTERP_THRESHOLD`], every higher cost is extrapolated by doubling the
//! previous entry and flooring to a 10ms boundary, since each cost step is
//! designed to double the work:
//!
//! ```text
//! cost:     0  1  2  3  4    5    ...  9     10     11     12
//! latency:  0  0  0  0  1ms  2ms  ...  38ms  77ms   150ms  300ms
//!                       |------- measured -------|-- extrapolated --
//! ```
//!
//! The cost for a tier is the last cost before the table first exceeds the
//! tier's budget, i.e. the first `k` with `table[k + 1] > budget`.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::{Error, HashPrimitive, Result, Tier, TunerConfig};

/// Latency at which direct measurement stops and extrapolation begins
pub const INTERP_THRESHOLD: Duration = Duration::from_millis(50);

/// Password hashed during direct measurement
pub const TEST_PASSWORD: &str = "#!PnutBudr";

/// Extrapolated latencies are floored to this granularity
const EXTRAPOLATION_STEP: Duration = Duration::from_millis(10);

/// Granularity used when presenting latencies
const REPORT_STEP_MS: u128 = 100;

/// Quick and strong cost pair produced by one tuning run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TunedCosts {
    pub quick: u32,
    pub strong: u32,
}

impl TunedCosts {
    pub fn cost(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Quick => self.quick,
            Tier::Strong => self.strong,
        }
    }
}

/// Per-cost hash latencies from one tuning run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatencyTable {
    entries: Vec<Duration>,
    min_cost: u32,
    last_measured: Option<u32>,
}

impl LatencyTable {
    /// Build a table for costs `0..=max_cost`
    ///
    /// `measure` is called once for each cost that needs a direct
    /// measurement, in ascending order. Its first error aborts the build.
    pub fn build<F>(min_cost: u32, max_cost: u32, mut measure: F) -> Result<Self>
    where
        F: FnMut(u32) -> Result<Duration>,
    {
        let mut entries = Vec::with_capacity(max_cost as usize + 1);
        entries.push(Duration::ZERO);
        let mut last_measured = None;

        for cost in 1..=max_cost {
            let previous = entries[cost as usize - 1];

            let latency = if cost < min_cost {
                Duration::ZERO
            } else if previous < INTERP_THRESHOLD {
                let elapsed = measure(cost)?;
                last_measured = Some(cost);
                elapsed
            } else {
                extrapolate(previous)
            };

            entries.push(latency);
        }

        Ok(Self {
            entries,
            min_cost,
            last_measured,
        })
    }

    /// Latency for a cost, measured or extrapolated
    pub fn get(&self, cost: u32) -> Option<Duration> {
        self.entries.get(cost as usize).copied()
    }

    pub fn entries(&self) -> &[Duration] {
        &self.entries
    }

    pub fn min_cost(&self) -> u32 {
        self.min_cost
    }

    pub fn max_cost(&self) -> u32 {
        (self.entries.len() as u32).saturating_sub(1)
    }

    /// Highest cost that was timed directly
    pub fn last_measured_cost(&self) -> Option<u32> {
        self.last_measured
    }

    /// Whether the entry for `cost` came from a real measurement
    pub fn is_measured(&self, cost: u32) -> bool {
        cost >= self.min_cost && self.last_measured.is_some_and(|last| cost <= last)
    }

    /// First cost whose successor exceeds `budget`
    ///
    /// This is the raw scan: it may return a cost below the minimum when the
    /// budget is smaller than the cheapest hash. See [`select_cost`].
    pub fn select(&self, budget: Duration) -> Option<u32> {
        self.entries
            .windows(2)
            .position(|pair| pair[1] > budget)
            .map(|k| k as u32)
    }

    /// Latency rounded to the nearest 100ms, for display
    pub fn rounded(&self, cost: u32) -> Option<Duration> {
        self.get(cost).map(round_for_report)
    }
}

/// Result of a tuning run
#[derive(Debug, Clone)]
pub struct TuningReport {
    pub costs: TunedCosts,
    pub table: LatencyTable,
    /// Wall-clock time spent tuning
    pub elapsed: Duration,
}

/// Measure, extrapolate and select the quick and strong costs
pub fn estimate<P: HashPrimitive>(primitive: &P, config: &TunerConfig) -> Result<TuningReport> {
    let started = Instant::now();

    let table = LatencyTable::build(P::MIN_COST, P::MAX_COST, |cost| {
        let t1 = Instant::now();
        let result = primitive.generate(TEST_PASSWORD.as_bytes(), cost);
        let elapsed = t1.elapsed();

        if let Err(e) = result {
            tracing::warn!(cost, error = %e, "Latency measurement failed");
            return Err(e);
        }

        tracing::debug!(
            cost,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "Measured hash latency"
        );
        Ok(elapsed)
    })?;

    tracing::debug!(
        last_measured = ?table.last_measured_cost(),
        "Extrapolating remaining costs"
    );

    let costs = TunedCosts {
        quick: select_cost(&table, Tier::Quick, config.quick_max_latency)?,
        strong: select_cost(&table, Tier::Strong, config.strong_max_latency)?,
    };
    let elapsed = started.elapsed();

    tracing::info!(
        quick_cost = costs.quick,
        strong_cost = costs.strong,
        elapsed_ms = elapsed.as_millis() as u64,
        measured = ?table.last_measured_cost(),
        "Tuned bcrypt costs"
    );

    Ok(TuningReport {
        costs,
        table,
        elapsed,
    })
}

/// Pick the cost for one tier, rejecting costs the primitive cannot use
pub fn select_cost(table: &LatencyTable, tier: Tier, budget: Duration) -> Result<u32> {
    match table.select(budget) {
        Some(cost) if cost >= table.min_cost() => Ok(cost),
        selected => {
            tracing::warn!(
                %tier,
                budget_ms = budget.as_millis() as u64,
                ?selected,
                "Latency budget cannot be met"
            );
            Err(Error::TuningInfeasible {
                tier,
                budget,
                min_cost: table.min_cost(),
                max_cost: table.max_cost(),
            })
        }
    }
}

fn extrapolate(previous: Duration) -> Duration {
    let doubled = previous.saturating_mul(2);
    let remainder = doubled.as_nanos() % EXTRAPOLATION_STEP.as_nanos();
    doubled - Duration::from_nanos(remainder as u64)
}

fn round_for_report(latency: Duration) -> Duration {
    let ms = (latency.as_millis() + REPORT_STEP_MS / 2) / REPORT_STEP_MS * REPORT_STEP_MS;
    Duration::from_millis(u64::try_from(ms).unwrap_or(u64::MAX))
}
