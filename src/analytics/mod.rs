//! Medication-adherence and health-metric analytics.
//!
//! Everything in here is pure computation over rows the repositories have
//! already fetched: compliance percentages, perfect-day streaks, metric
//! trends, and alert classification. Threshold constants live next to the
//! code that applies them and are shared by every caller — no per-module
//! copies.

pub mod alerts;
pub mod compliance;
pub mod dispatch;
pub mod trend;

pub use alerts::{blood_pressure_alert, compliance_alert, AlertSeverity, HealthAlert};
pub use compliance::{ComplianceLevel, ComplianceSummary};
pub use dispatch::{AlertDispatcher, TracingDispatcher};
pub use trend::{DayAdherence, MetricTrend, Trend};
