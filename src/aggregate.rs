//! # Per-Stage Totals
//!
//! Reduces a night of intervals to cumulative time per stage in a single pass.
//! Overlapping samples are summed independently; de-duplicating them is the
//! source's job, not the aggregator's.

use crate::{validate_intervals, LayoutError, SleepInterval, SleepStage};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cumulative duration per stage. Only stages with a positive total are present.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTotals {
    #[serde(with = "seconds_map")]
    totals: BTreeMap<SleepStage, Duration>,
}

impl StageTotals {
    pub fn get(&self, stage: SleepStage) -> Option<Duration> {
        self.totals.get(&stage).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Stages with recorded time, in ordinal order.
    pub fn stages_present(&self) -> Vec<SleepStage> {
        self.totals.keys().copied().collect()
    }

    /// `(stage, total)` pairs in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (SleepStage, Duration)> + '_ {
        self.totals.iter().map(|(stage, total)| (*stage, *total))
    }

    /// Sum over every stage, in-bed included.
    pub fn total(&self) -> Duration {
        self.totals.values().fold(Duration::zero(), |acc, d| acc + *d)
    }

    /// Sum over the stages that count as sleep.
    pub fn asleep_total(&self) -> Duration {
        self.iter()
            .filter(|(stage, _)| stage.is_asleep())
            .fold(Duration::zero(), |acc, (_, d)| acc + d)
    }
}

/// Sum interval durations per stage.
///
/// # Example
/// ```
/// use chrono::DateTime;
/// use sleep_chart_lib::{aggregate::aggregate, SleepInterval, SleepStage};
///
/// let t = |s: &str| DateTime::parse_from_rfc3339(s).unwrap();
/// let night = [
///     SleepInterval::new(SleepStage::Core, t("2024-03-01T23:00:00Z"), t("2024-03-02T00:00:00Z")).unwrap(),
///     SleepInterval::new(SleepStage::Deep, t("2024-03-02T00:00:00Z"), t("2024-03-02T00:45:00Z")).unwrap(),
///     SleepInterval::new(SleepStage::Core, t("2024-03-02T00:45:00Z"), t("2024-03-02T01:15:00Z")).unwrap(),
/// ];
///
/// let totals = aggregate(&night).unwrap();
/// assert_eq!(totals.get(SleepStage::Core).unwrap().num_minutes(), 90);
/// assert_eq!(totals.stages_present(), vec![SleepStage::Core, SleepStage::Deep]);
/// ```
pub fn aggregate(intervals: &[SleepInterval]) -> Result<StageTotals, LayoutError> {
    validate_intervals(intervals)?;

    let mut totals: BTreeMap<SleepStage, Duration> = BTreeMap::new();
    for interval in intervals {
        let duration = interval.duration();
        if duration > Duration::zero() {
            *totals.entry(interval.stage).or_insert_with(Duration::zero) += duration;
        }
    }

    Ok(StageTotals { totals })
}

/// Serialize the totals as whole seconds so JSON output stays readable.
mod seconds_map {
    use crate::SleepStage;
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<SleepStage, Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        map.iter()
            .map(|(stage, d)| (*stage, d.num_seconds()))
            .collect::<BTreeMap<_, _>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<SleepStage, Duration>, D::Error> {
        let raw = BTreeMap::<SleepStage, i64>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(stage, secs)| (stage, Duration::seconds(secs)))
            .collect())
    }
}
