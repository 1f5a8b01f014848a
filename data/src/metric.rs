use std::fmt;

use serde::{Deserialize, Serialize};

use crate::volume::DerivedRecord;

const MILLION: f64 = 1_000_000.0;
const BILLION: f64 = 1_000_000_000.0;

/// The unit of measure currently shown on the chart. Exactly one is active
/// at any time; the selector control supplies it as an external event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Percent,
    Eth,
    Usd,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Percent, Metric::Usd, Metric::Eth];

    /// Linear y-domain for this metric, before any `nice` rounding.
    pub fn domain(&self) -> (f32, f32) {
        match self {
            Metric::Percent => (0.0, 100.0),
            Metric::Eth | Metric::Usd => (0.0, 10.0),
        }
    }

    /// The scaled value a derived record maps onto this metric's domain.
    pub fn scaled_value(&self, record: &DerivedRecord) -> f64 {
        match self {
            Metric::Percent => record.percent_of_total * 100.0,
            Metric::Eth => record.volume_eth / MILLION,
            Metric::Usd => record.volume_usd / BILLION,
        }
    }

    /// Per-bar value label, one decimal with the metric's unit suffix.
    pub fn bar_label(&self, record: &DerivedRecord) -> String {
        match self {
            Metric::Percent => format!("{:.1}%", self.scaled_value(record)),
            Metric::Eth => format!("{:.1}M", self.scaled_value(record)),
            Metric::Usd => format!("{:.1}B", self.scaled_value(record)),
        }
    }

    /// Summary string pushed to the totals display on every recompute.
    pub fn summary(&self, derived: &[DerivedRecord]) -> String {
        match self {
            Metric::Percent => "Total".to_string(),
            Metric::Eth => {
                let sum: f64 = derived.iter().map(|d| d.volume_eth / MILLION).sum();
                format!("{sum:.1}M")
            }
            Metric::Usd => {
                let sum: f64 = derived.iter().map(|d| d.volume_usd / BILLION).sum();
                format!("{sum:.1}B")
            }
        }
    }

    pub fn axis_caption(&self) -> String {
        match self {
            Metric::Percent => "% in total volume".to_string(),
            Metric::Eth => format!("volume traded in {} (millions)", self.to_string().to_uppercase()),
            Metric::Usd => format!("volume traded in {} (billions)", self.to_string().to_uppercase()),
        }
    }

    /// Vertical gap between a bar's top and its value label.
    pub fn label_offset(&self) -> f32 {
        match self {
            Metric::Percent => 15.0,
            Metric::Eth | Metric::Usd => 13.0,
        }
    }

    /// The tick-mark ladder decorating each tube. Percent needs a denser
    /// ladder than the volume metrics, whose domain is a coarse 0..10.
    pub fn ladder(&self) -> LadderSpec {
        match self {
            Metric::Percent => LadderSpec {
                rungs: 20,
                spacing: 13.8,
            },
            Metric::Eth | Metric::Usd => LadderSpec {
                rungs: 10,
                spacing: 27.6,
            },
        }
    }

    pub fn selector_label(&self) -> &'static str {
        match self {
            Metric::Percent => "%",
            Metric::Usd => "usd",
            Metric::Eth => "eth",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Percent => write!(f, "percent"),
            Metric::Eth => write!(f, "eth"),
            Metric::Usd => write!(f, "usd"),
        }
    }
}

/// Rung count and spacing of a tube's tick-mark ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LadderSpec {
    pub rungs: usize,
    pub spacing: f32,
}

impl LadderSpec {
    /// Major rungs are drawn wider. The dense percent ladder marks every
    /// fifth rung; the coarse ladders mark only their midpoint.
    pub fn rung_width(&self, index: usize) -> f32 {
        if self.rungs == 20 {
            if index % 5 == 0 { 10.0 } else { 5.0 }
        } else if index == self.rungs / 2 {
            8.0
        } else {
            4.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(volume_eth: f64, volume_usd: f64, percent: f64) -> DerivedRecord {
        DerivedRecord {
            pair: "DAI-ETH".to_string(),
            volume_eth,
            volume_usd,
            percent_of_total: percent,
        }
    }

    #[test]
    fn scaled_values_follow_metric_units() {
        let rec = record(2_500_000.0, 4_500_000_000.0, 0.25);

        assert_eq!(Metric::Percent.scaled_value(&rec), 25.0);
        assert_eq!(Metric::Eth.scaled_value(&rec), 2.5);
        assert_eq!(Metric::Usd.scaled_value(&rec), 4.5);
    }

    #[test]
    fn summary_per_metric() {
        let derived = vec![
            record(1_000_000.0, 2_000_000_000.0, 0.25),
            record(3_000_000.0, 6_000_000_000.0, 0.75),
        ];

        assert_eq!(Metric::Percent.summary(&derived), "Total");
        assert_eq!(Metric::Eth.summary(&derived), "4.0M");
        assert_eq!(Metric::Usd.summary(&derived), "8.0B");
    }

    #[test]
    fn usd_summary_rounds_small_totals_to_zero() {
        // 8000 USD against a billions domain comes out as "0.0B".
        let derived = vec![record(4.0, 8000.0, 1.0)];

        assert_eq!(Metric::Usd.summary(&derived), "0.0B");
    }

    #[test]
    fn percent_ladder_is_denser_than_volume_ladders() {
        let percent = Metric::Percent.ladder();
        let eth = Metric::Eth.ladder();

        assert!(percent.rungs > eth.rungs);
        assert!(percent.spacing < eth.spacing);

        // both ladders span the same tube height
        let percent_span = percent.spacing * percent.rungs as f32;
        let eth_span = eth.spacing * eth.rungs as f32;
        assert!((percent_span - eth_span).abs() < f32::EPSILON);
    }

    #[test]
    fn major_rungs_are_wider() {
        let ladder = Metric::Percent.ladder();
        assert!(ladder.rung_width(0) > ladder.rung_width(1));
        assert!(ladder.rung_width(5) > ladder.rung_width(4));

        let coarse = Metric::Usd.ladder();
        assert!(coarse.rung_width(5) > coarse.rung_width(4));
    }
}
