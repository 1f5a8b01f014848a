use serde::{Deserialize, Serialize};

/// Raw token amounts carry 18 implied decimal places.
const WEI_PER_ETH: f64 = 1e18;

const FIXTURE: &str = include_str!("volume/fixture.json");

/// One raw trade-volume record, loaded once and never mutated.
///
/// The amounts arrive as decimal strings since the fixed-point integers
/// overflow a JSON number long before they overflow a `String`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VolumeRecord {
    #[serde(rename = "PAIR")]
    pub pair: String,
    #[serde(rename = "AMOUNT_IN_ETH")]
    pub amount_in_raw: String,
    #[serde(rename = "AMOUNT_OUT_ETH")]
    pub amount_out_raw: String,
}

/// Per-pair volumes derived from a [`VolumeRecord`] for one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRecord {
    pub pair: String,
    pub volume_eth: f64,
    pub volume_usd: f64,
    pub percent_of_total: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregates {
    pub derived: Vec<DerivedRecord>,
    pub total_volume_eth: f64,
}

/// Loads the embedded volume fixture.
pub fn records() -> Result<Vec<VolumeRecord>, crate::Error> {
    Ok(serde_json::from_str(FIXTURE)?)
}

/// Derives per-pair ETH/USD volumes and the global total from raw records.
///
/// Pure and deterministic: the derived collection is rebuilt on every call,
/// never patched in place. Records whose amount fields fail to parse are
/// skipped and excluded from the totals. A zero total volume defines every
/// `percent_of_total` as zero.
pub fn aggregate(records: &[VolumeRecord], price: f64) -> Aggregates {
    let volumes: Vec<(&VolumeRecord, f64)> = records
        .iter()
        .filter_map(|record| match parse_volume_eth(record) {
            Some(volume) => Some((record, volume)),
            None => {
                log::warn!(
                    "skipping volume record for {:?} with unparseable amounts",
                    record.pair,
                );
                None
            }
        })
        .collect();

    let total_volume_eth: f64 = volumes.iter().map(|(_, volume)| volume).sum();

    let derived = volumes
        .into_iter()
        .map(|(record, volume_eth)| DerivedRecord {
            pair: record.pair.clone(),
            volume_eth,
            volume_usd: volume_eth * price,
            percent_of_total: if total_volume_eth > 0.0 {
                volume_eth / total_volume_eth
            } else {
                0.0
            },
        })
        .collect();

    Aggregates {
        derived,
        total_volume_eth,
    }
}

fn parse_volume_eth(record: &VolumeRecord) -> Option<f64> {
    let amount_in: f64 = record.amount_in_raw.trim().parse().ok()?;
    let amount_out: f64 = record.amount_out_raw.trim().parse().ok()?;

    if !amount_in.is_finite() || !amount_out.is_finite() {
        return None;
    }

    Some((amount_in + amount_out) / WEI_PER_ETH)
}
