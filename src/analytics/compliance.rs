//! Compliance aggregation over medication-log rows.

use serde::{Deserialize, Serialize};

/// Rate at or above which compliance is classified "high".
pub const COMPLIANCE_HIGH_MIN: u32 = 80;
/// Rate at or above which compliance is classified "medium".
pub const COMPLIANCE_MEDIUM_MIN: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceLevel {
    High,
    Medium,
    Low,
}

impl ComplianceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ComplianceLevel::High => "high",
            ComplianceLevel::Medium => "medium",
            ComplianceLevel::Low => "low",
        }
    }
}

/// Derived adherence summary for one medication or one user over a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceSummary {
    pub total_doses: u32,
    pub taken_doses: u32,
    /// Integer percentage in [0, 100]. Canonical precision for the whole
    /// system: everything rounds the same way.
    pub compliance_rate: u32,
    pub compliance_level: ComplianceLevel,
}

/// Integer compliance percentage. Zero scheduled doses is vacuous
/// compliance and reads 100 — business rule, not an accident.
pub fn compliance_rate(taken_doses: u32, total_doses: u32) -> u32 {
    if total_doses == 0 {
        return 100;
    }
    let rate = (f64::from(taken_doses) / f64::from(total_doses) * 100.0).round() as u32;
    rate.min(100)
}

pub fn classify(rate: u32) -> ComplianceLevel {
    if rate >= COMPLIANCE_HIGH_MIN {
        ComplianceLevel::High
    } else if rate >= COMPLIANCE_MEDIUM_MIN {
        ComplianceLevel::Medium
    } else {
        ComplianceLevel::Low
    }
}

impl ComplianceSummary {
    pub fn from_counts(taken_doses: u32, total_doses: u32) -> Self {
        let rate = compliance_rate(taken_doses, total_doses);
        Self {
            total_doses,
            taken_doses,
            compliance_rate: rate,
            compliance_level: classify(rate),
        }
    }

    /// Summarize a log set given one `taken` flag per scheduled dose.
    pub fn from_taken_flags(flags: &[bool]) -> Self {
        let total = flags.len() as u32;
        let taken = flags.iter().filter(|&&t| t).count() as u32;
        Self::from_counts(taken, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_doses_is_vacuously_compliant() {
        let summary = ComplianceSummary::from_taken_flags(&[]);
        assert_eq!(summary.compliance_rate, 100);
        assert_eq!(summary.compliance_level, ComplianceLevel::High);
        assert_eq!(summary.total_doses, 0);
    }

    #[test]
    fn rate_always_within_bounds() {
        for taken in 0..=20u32 {
            for total in 0..=20u32 {
                let taken = taken.min(total);
                let rate = compliance_rate(taken, total);
                assert!(rate <= 100, "rate {rate} out of range for {taken}/{total}");
            }
        }
    }

    #[test]
    fn nine_of_ten_is_high() {
        let summary = ComplianceSummary::from_counts(9, 10);
        assert_eq!(summary.compliance_rate, 90);
        assert_eq!(summary.compliance_level, ComplianceLevel::High);
    }

    #[test]
    fn six_of_ten_is_medium() {
        let summary = ComplianceSummary::from_counts(6, 10);
        assert_eq!(summary.compliance_rate, 60);
        assert_eq!(summary.compliance_level, ComplianceLevel::Medium);
    }

    #[test]
    fn below_sixty_is_low() {
        assert_eq!(classify(59), ComplianceLevel::Low);
        assert_eq!(classify(0), ComplianceLevel::Low);
    }

    #[test]
    fn threshold_boundaries_exact() {
        assert_eq!(classify(80), ComplianceLevel::High);
        assert_eq!(classify(79), ComplianceLevel::Medium);
        assert_eq!(classify(60), ComplianceLevel::Medium);
        assert_eq!(classify(59), ComplianceLevel::Low);
    }

    #[test]
    fn integer_rounding_is_canonical() {
        // 2/3 = 66.67% rounds to 67, not 66.67
        assert_eq!(compliance_rate(2, 3), 67);
        // 1/3 = 33.33% rounds to 33
        assert_eq!(compliance_rate(1, 3), 33);
    }

    #[test]
    fn summarize_is_idempotent() {
        let flags = [true, false, true, true, false, true, true];
        let first = ComplianceSummary::from_taken_flags(&flags);
        let second = ComplianceSummary::from_taken_flags(&flags);
        assert_eq!(first, second);
    }
}
