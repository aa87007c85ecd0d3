//! Output formatting

use std::fmt::{self, Write};

use serde::Serialize;

use bcryptx_core::{Tier, TunedCosts, TuningReport};

#[derive(Debug, Serialize)]
pub struct TuneOutput {
    pub quick_cost: u32,
    pub strong_cost: u32,
    pub elapsed_ms: u64,
    pub latencies: Vec<LatencyRow>,
}

#[derive(Debug, Serialize)]
pub struct LatencyRow {
    pub cost: u32,
    /// Rounded to the nearest 100ms
    pub latency_ms: u64,
    pub measured: bool,
}

impl TuneOutput {
    pub fn new(report: &TuningReport) -> Self {
        let table = &report.table;
        let latencies = (table.min_cost()..=table.max_cost())
            .filter_map(|cost| {
                table.rounded(cost).map(|latency| LatencyRow {
                    cost,
                    latency_ms: latency.as_millis() as u64,
                    measured: table.is_measured(cost),
                })
            })
            .collect();

        Self {
            quick_cost: report.costs.quick,
            strong_cost: report.costs.strong,
            elapsed_ms: report.elapsed.as_millis() as u64,
            latencies,
        }
    }
}

/// Human-readable tuning summary
///
/// Only the costs up to one past the strong cost are listed; higher rows are
/// extrapolations nobody will use.
pub fn render_table(report: &TuningReport) -> String {
    let output = TuneOutput::new(report);
    let mut out = String::new();

    let _ = writeln!(out, "quick cost:  {}", output.quick_cost);
    let _ = writeln!(out, "strong cost: {}", output.strong_cost);
    let _ = writeln!(out, "tuned in:    {}ms", output.elapsed_ms);
    let _ = writeln!(out);
    let _ = writeln!(out, "{:>4}  {:>10}  source", "cost", "latency");

    for row in output
        .latencies
        .iter()
        .take_while(|row| row.cost <= output.strong_cost + 1)
    {
        let marker = if row.cost == output.strong_cost {
            "  <- strong"
        } else if row.cost == output.quick_cost {
            "  <- quick"
        } else {
            ""
        };
        let source = if row.measured { "measured" } else { "estimated" };
        let _ = writeln!(
            out,
            "{:>4}  {:>8}ms  {}{}",
            row.cost, row.latency_ms, source, marker
        );
    }

    out
}

#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub cost: u32,
    pub tier: Option<Tier>,
    pub tuned: TunedCosts,
}

impl fmt::Display for InspectOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "cost: {}", self.cost)?;
        match self.tier {
            Some(tier) => write!(f, "tier: {tier}")?,
            None => write!(f, "tier: below quick")?,
        }
        write!(
            f,
            " (tuned quick={}, strong={})",
            self.tuned.quick, self.tuned.strong
        )
    }
}
