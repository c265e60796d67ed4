use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const CM_PER_INCH: f64 = 2.54;
pub const INCHES_PER_FOOT: f64 = 12.0;
pub const KG_PER_LB: f64 = 0.453_592;
pub const LBS_PER_KG: f64 = 2.204_62;

pub const METRIC_HEIGHT_RANGE_CM: (f64, f64) = (50.0, 300.0);
pub const METRIC_WEIGHT_RANGE_KG: (f64, f64) = (20.0, 500.0);
/// 4 ft to 8 ft, expressed the same way the form converts feet and inches.
pub const IMPERIAL_HEIGHT_RANGE_CM: (f64, f64) = (48.0 * CM_PER_INCH, 96.0 * CM_PER_INCH);
pub const IMPERIAL_WEIGHT_RANGE_LB: (f64, f64) = (44.0, 1100.0);

pub const DEFAULT_THEME: &str = "light";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Metric,
    Imperial,
}

impl Unit {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Metric => Self::Imperial,
            Self::Imperial => Self::Metric,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "metric" | "si" | "cm" | "kg" => Ok(Self::Metric),
            "imperial" | "us" | "ft" | "lb" | "lbs" => Ok(Self::Imperial),
            _ => Err(Error::validation(format!(
                "Invalid unit '{s}'. Use 'metric' or 'imperial'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Self::Underweight,
        Self::Normal,
        Self::Overweight,
        Self::Obese,
    ];

    /// Upper bounds are exclusive: 18.5 is Normal, 25 is Overweight, 30 is Obese.
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::Normal => "Normal",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        }
    }

    /// Label used in the category guide.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal Weight",
            other => other.as_str(),
        }
    }

    /// Human-readable BMI range for the category guide.
    #[must_use]
    pub fn range(self) -> &'static str {
        match self {
            Self::Underweight => "Below 18.5",
            Self::Normal => "18.5 - 24.9",
            Self::Overweight => "25.0 - 29.9",
            Self::Obese => "30.0 and above",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BmiResult {
    pub bmi: f64,
    pub category: Category,
}

/// Compute BMI from canonical metric values. Inputs are assumed finite and positive.
#[must_use]
pub fn calculate_bmi(height_cm: f64, weight_kg: f64) -> BmiResult {
    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    BmiResult {
        bmi,
        category: Category::from_bmi(bmi),
    }
}

// --- BMI calculation records ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiRecord {
    pub id: i64,
    /// Centimeters.
    pub height: f64,
    /// Kilograms.
    pub weight: f64,
    /// Unit the values were originally entered in. Display hint only.
    pub unit: Unit,
    pub bmi: f64,
    pub category: Category,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewBmiRecord {
    pub height: f64,
    pub weight: f64,
    pub unit: Unit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpdateBmiRecord {
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub unit: Option<Unit>,
}

impl UpdateBmiRecord {
    #[must_use]
    pub fn changes_measurements(&self) -> bool {
        self.height.is_some() || self.weight.is_some()
    }
}

// --- User preferences ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preference {
    pub id: i64,
    pub default_unit: Unit,
    /// Always centimeters, whatever `default_unit` says.
    pub saved_height: Option<f64>,
    pub theme: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPreference {
    pub default_unit: Option<Unit>,
    pub saved_height: Option<f64>,
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePreference {
    pub default_unit: Option<Unit>,
    pub saved_height: Option<f64>,
    pub theme: Option<String>,
}

// --- Conversions ---

#[must_use]
pub fn feet_inches_to_cm(feet: f64, inches: f64) -> f64 {
    (feet * INCHES_PER_FOOT + inches) * CM_PER_INCH
}

#[must_use]
pub fn lb_to_kg(lb: f64) -> f64 {
    lb * KG_PER_LB
}

#[must_use]
pub fn kg_to_lb(kg: f64) -> f64 {
    kg * LBS_PER_KG
}

/// Split centimeters into whole feet and remaining inches, inches rounded to
/// two decimals. The rounding happens on the total so the remainder never
/// reaches 12.
#[must_use]
pub fn cm_to_feet_inches(cm: f64) -> (f64, f64) {
    let total_inches = (cm / CM_PER_INCH * 100.0).round() / 100.0;
    let feet = (total_inches / INCHES_PER_FOOT).floor();
    let inches = ((total_inches - feet * INCHES_PER_FOOT) * 100.0).round() / 100.0;
    (feet, inches)
}

// --- Validation ---

fn out_of_range(value: f64, (min, max): (f64, f64)) -> bool {
    value < min || value > max
}

/// Validate a new record. Height and weight are already in centimeters and
/// kilograms; `unit` picks which range family applies.
pub fn validate_new_record(record: &NewBmiRecord) -> Result<()> {
    validate_measurements(record.height, record.weight)?;
    match record.unit {
        Unit::Metric => {
            if out_of_range(record.height, METRIC_HEIGHT_RANGE_CM) {
                return Err(Error::validation("Height must be between 50-300 cm"));
            }
            if out_of_range(record.weight, METRIC_WEIGHT_RANGE_KG) {
                return Err(Error::validation("Weight must be between 20-500 kg"));
            }
        }
        Unit::Imperial => {
            if out_of_range(record.height, IMPERIAL_HEIGHT_RANGE_CM) {
                return Err(Error::validation("Height must be between 4-8 feet"));
            }
            let (min_lb, max_lb) = IMPERIAL_WEIGHT_RANGE_LB;
            if out_of_range(record.weight, (lb_to_kg(min_lb), lb_to_kg(max_lb))) {
                return Err(Error::validation("Weight must be between 44-1100 lbs"));
            }
        }
    }
    Ok(())
}

/// Height and weight must both be finite and strictly positive.
pub fn validate_measurements(height: f64, weight: f64) -> Result<()> {
    let ok = |v: f64| v.is_finite() && v > 0.0;
    if !ok(height) || !ok(weight) {
        return Err(Error::validation("Invalid height or weight values"));
    }
    Ok(())
}
