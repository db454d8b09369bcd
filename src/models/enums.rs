use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(MetricType {
    Weight => "weight",
    Height => "height",
    BloodPressure => "blood_pressure",
    HeartRate => "heart_rate",
    BloodSugar => "blood_sugar",
    Temperature => "temperature",
    OxygenSaturation => "oxygen_saturation",
    Steps => "steps",
    SleepHours => "sleep_hours",
    WaterIntake => "water_intake",
    Cholesterol => "cholesterol",
});

/// Whether a rising series of this metric is good, bad, or neither.
/// Drives the trend-direction-to-label mapping; every metric type is
/// classified here so new types cannot be silently misread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendPolarity {
    HigherIsBetter,
    LowerIsBetter,
    StabilityIsBetter,
}

impl MetricType {
    pub const ALL: [MetricType; 11] = [
        MetricType::Weight,
        MetricType::Height,
        MetricType::BloodPressure,
        MetricType::HeartRate,
        MetricType::BloodSugar,
        MetricType::Temperature,
        MetricType::OxygenSaturation,
        MetricType::Steps,
        MetricType::SleepHours,
        MetricType::WaterIntake,
        MetricType::Cholesterol,
    ];

    /// Default unit for this metric type.
    pub fn default_unit(self) -> &'static str {
        match self {
            MetricType::Weight => "kg",
            MetricType::Height => "cm",
            MetricType::BloodPressure => "mmHg",
            MetricType::HeartRate => "bpm",
            MetricType::BloodSugar => "mg/dL",
            MetricType::Temperature => "°C",
            MetricType::OxygenSaturation => "%",
            MetricType::Steps => "steps",
            MetricType::SleepHours => "h",
            MetricType::WaterIntake => "mL",
            MetricType::Cholesterol => "mg/dL",
        }
    }

    pub fn polarity(self) -> TrendPolarity {
        match self {
            MetricType::Weight
            | MetricType::BloodPressure
            | MetricType::BloodSugar
            | MetricType::Cholesterol => TrendPolarity::LowerIsBetter,
            MetricType::Steps
            | MetricType::OxygenSaturation
            | MetricType::SleepHours
            | MetricType::WaterIntake => TrendPolarity::HigherIsBetter,
            MetricType::HeartRate | MetricType::Temperature | MetricType::Height => {
                TrendPolarity::StabilityIsBetter
            }
        }
    }

    /// True for metrics recorded as a value pair (systolic/diastolic).
    pub fn has_secondary_value(self) -> bool {
        matches!(self, MetricType::BloodPressure)
    }
}

str_enum!(GoalStatus {
    Active => "active",
    Completed => "completed",
    Abandoned => "abandoned",
});

str_enum!(ExerciseActivity {
    Walking => "walking",
    Swimming => "swimming",
    Cycling => "cycling",
    Yoga => "yoga",
    TaiChi => "tai_chi",
    Strength => "strength",
    Stretching => "stretching",
    Dancing => "dancing",
    Other => "other",
});

str_enum!(ExerciseIntensity {
    Low => "low",
    Moderate => "moderate",
    High => "high",
});

str_enum!(GroupRole {
    Member => "member",
    Admin => "admin",
});
