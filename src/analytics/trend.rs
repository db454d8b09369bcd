//! Perfect-day streaks and metric trend classification.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::enums::{MetricType, TrendPolarity};

/// Percentage-change magnitude above which a trend is no longer "stable".
pub const TREND_STABLE_BAND_PCT: f64 = 10.0;
/// Minimum number of samples before a trend is computed at all.
pub const TREND_MIN_SAMPLES: usize = 3;

/// Per-day adherence counts, the unit of streak detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAdherence {
    pub date: NaiveDate,
    pub scheduled: u32,
    pub taken: u32,
}

impl DayAdherence {
    /// A day is perfect when no scheduled dose was missed. A day with
    /// nothing scheduled counts as perfect.
    pub fn is_perfect(&self) -> bool {
        self.taken >= self.scheduled
    }
}

/// Longest consecutive run of perfect days in a chronologically ordered
/// series.
pub fn longest_streak(days: &[DayAdherence]) -> u32 {
    let mut longest = 0u32;
    let mut current = 0u32;
    for day in days {
        if day.is_perfect() {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Concerning,
    Stable,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Concerning => "concerning",
            Trend::Stable => "stable",
        }
    }
}

/// Summary of one metric type over the analysis window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricTrend {
    pub metric_type: MetricType,
    pub trend: Trend,
    pub description: String,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percentage change of the most recent third against the earliest third.
/// Below 6 samples the two groups overlap, which biases the change toward
/// zero and therefore toward `stable`.
fn percent_change(values: &[f64]) -> f64 {
    let recent = mean(&values[values.len() - TREND_MIN_SAMPLES..]);
    let earlier = mean(&values[..TREND_MIN_SAMPLES]);
    if earlier.abs() < f64::EPSILON {
        if recent.abs() < f64::EPSILON {
            return 0.0;
        }
        return if recent > 0.0 { 100.0 } else { -100.0 };
    }
    (recent - earlier) / earlier * 100.0
}

/// Map a change direction through the metric's polarity to a label.
fn label_change(change: f64, polarity: TrendPolarity) -> Trend {
    if change.abs() <= TREND_STABLE_BAND_PCT {
        return Trend::Stable;
    }
    match polarity {
        TrendPolarity::HigherIsBetter => {
            if change > 0.0 {
                Trend::Improving
            } else {
                Trend::Concerning
            }
        }
        TrendPolarity::LowerIsBetter => {
            if change < 0.0 {
                Trend::Improving
            } else {
                Trend::Concerning
            }
        }
        TrendPolarity::StabilityIsBetter => Trend::Concerning,
    }
}

/// Classify a chronologically ordered value series for one metric type.
pub fn metric_trend(metric_type: MetricType, values: &[f64]) -> MetricTrend {
    let (average, min, max) = if values.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        (
            mean(values),
            values.iter().cloned().fold(f64::INFINITY, f64::min),
            values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        )
    };

    if values.len() < TREND_MIN_SAMPLES {
        return MetricTrend {
            metric_type,
            trend: Trend::Stable,
            description: "Not enough readings to detect a trend yet.".to_string(),
            average,
            min,
            max,
        };
    }

    let change = percent_change(values);
    let trend = label_change(change, metric_type.polarity());
    let description = describe(metric_type, trend, change);

    MetricTrend {
        metric_type,
        trend,
        description,
        average,
        min,
        max,
    }
}

fn describe(metric_type: MetricType, trend: Trend, change: f64) -> String {
    let name = metric_type.as_str().replace('_', " ");
    let direction = if change > 0.0 { "up" } else { "down" };
    match trend {
        Trend::Stable => format!("Your {name} has been stable."),
        Trend::Improving => format!(
            "Your {name} is trending {direction} ({:+.0}%) — moving in the right direction.",
            change
        ),
        Trend::Concerning => format!(
            "Your {name} is trending {direction} ({:+.0}%) — worth mentioning to your care team.",
            change
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32, scheduled: u32, taken: u32) -> DayAdherence {
        DayAdherence {
            date: NaiveDate::from_ymd_opt(2026, 7, d).unwrap(),
            scheduled,
            taken,
        }
    }

    #[test]
    fn empty_day_counts_as_perfect() {
        assert!(day(1, 0, 0).is_perfect());
    }

    #[test]
    fn missed_dose_breaks_perfection() {
        assert!(!day(1, 3, 2).is_perfect());
        assert!(day(1, 3, 3).is_perfect());
    }

    #[test]
    fn longest_streak_spans_empty_days() {
        // perfect, perfect (nothing scheduled), perfect, missed, perfect
        let days = [day(1, 2, 2), day(2, 0, 0), day(3, 1, 1), day(4, 2, 1), day(5, 2, 2)];
        assert_eq!(longest_streak(&days), 3);
    }

    #[test]
    fn longest_streak_empty_series() {
        assert_eq!(longest_streak(&[]), 0);
    }

    #[test]
    fn all_perfect_streak_is_full_length() {
        let days: Vec<DayAdherence> = (1..=7).map(|d| day(d, 2, 2)).collect();
        assert_eq!(longest_streak(&days), 7);
    }

    #[test]
    fn too_few_samples_is_stable() {
        let t = metric_trend(MetricType::Weight, &[82.0, 81.5]);
        assert_eq!(t.trend, Trend::Stable);
        assert!(t.description.contains("Not enough"));
    }

    #[test]
    fn falling_weight_is_improving() {
        // lower-is-better: a clear downward move is an improvement
        let values = [90.0, 89.0, 88.0, 80.0, 79.0, 78.0];
        let t = metric_trend(MetricType::Weight, &values);
        assert_eq!(t.trend, Trend::Improving);
    }

    #[test]
    fn rising_blood_sugar_is_concerning() {
        let values = [100.0, 102.0, 101.0, 125.0, 130.0, 128.0];
        let t = metric_trend(MetricType::BloodSugar, &values);
        assert_eq!(t.trend, Trend::Concerning);
    }

    #[test]
    fn rising_steps_is_improving() {
        let values = [2000.0, 2200.0, 2100.0, 3000.0, 3100.0, 3200.0];
        let t = metric_trend(MetricType::Steps, &values);
        assert_eq!(t.trend, Trend::Improving);
    }

    #[test]
    fn small_heart_rate_drift_is_stable() {
        // within the ±10% band, direction is irrelevant
        let values = [70.0, 71.0, 69.0, 68.0, 67.0, 68.0];
        let t = metric_trend(MetricType::HeartRate, &values);
        assert_eq!(t.trend, Trend::Stable);
    }

    #[test]
    fn large_heart_rate_swing_is_concerning_either_direction() {
        let up = [60.0, 61.0, 62.0, 80.0, 82.0, 85.0];
        let down = [85.0, 82.0, 80.0, 62.0, 61.0, 60.0];
        assert_eq!(metric_trend(MetricType::HeartRate, &up).trend, Trend::Concerning);
        assert_eq!(metric_trend(MetricType::HeartRate, &down).trend, Trend::Concerning);
    }

    #[test]
    fn window_stats_cover_all_samples() {
        let values = [3.0, 1.0, 2.0];
        let t = metric_trend(MetricType::SleepHours, &values);
        assert_eq!(t.min, 1.0);
        assert_eq!(t.max, 3.0);
        assert!((t.average - 2.0).abs() < 1e-9);
    }

    #[test]
    fn overlapping_groups_below_six_samples() {
        // 4 samples: first 3 and last 3 share the middle two; a jump at the
        // end still registers
        let values = [100.0, 100.0, 100.0, 160.0];
        let t = metric_trend(MetricType::BloodSugar, &values);
        assert_eq!(t.trend, Trend::Concerning);
    }

    #[test]
    fn zero_baseline_does_not_divide_by_zero() {
        let values = [0.0, 0.0, 0.0, 500.0, 500.0, 500.0];
        let t = metric_trend(MetricType::Steps, &values);
        assert_eq!(t.trend, Trend::Improving);
    }
}
