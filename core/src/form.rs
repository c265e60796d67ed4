//! Raw text input, field validation, and conversion to canonical metric units.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;
use crate::models::{
    NewBmiRecord, Preference, Unit, cm_to_feet_inches, feet_inches_to_cm, lb_to_kg,
};

pub const FEET_RANGE: (f64, f64) = (3.0, 8.0);
pub const WEIGHT_RANGE_LB: (f64, f64) = (44.0, 1100.0);
pub const HEIGHT_RANGE_CM: (f64, f64) = (50.0, 300.0);
pub const WEIGHT_RANGE_KG: (f64, f64) = (20.0, 500.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Height,
    HeightFeet,
    HeightInches,
    Weight,
    /// Not an input; carries errors from the calculation itself.
    General,
}

impl Field {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Height => "height",
            Self::HeightFeet => "heightFeet",
            Self::HeightInches => "heightInches",
            Self::Weight => "weight",
            Self::General => "general",
        }
    }

    /// Input fields shown for `unit`.
    #[must_use]
    pub fn inputs(unit: Unit) -> &'static [Field] {
        match unit {
            Unit::Metric => &[Self::Height, Self::Weight],
            Unit::Imperial => &[Self::HeightFeet, Self::HeightInches, Self::Weight],
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_lowercase().as_str() {
            "height" | "cm" => Ok(Self::Height),
            "feet" | "ft" | "heightfeet" => Ok(Self::HeightFeet),
            "inches" | "in" | "heightinches" => Ok(Self::HeightInches),
            "weight" | "kg" | "lb" | "lbs" => Ok(Self::Weight),
            _ => Err(Error::Validation(format!("Unknown field '{s}'"))),
        }
    }
}

/// Validation messages keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn general(msg: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(Field::General, msg);
        errors
    }

    pub fn insert(&mut self, field: Field, msg: impl Into<String>) {
        self.0.insert(field, msg.into());
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (_, msg) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            f.write_str(msg)?;
            first = false;
        }
        Ok(())
    }
}

/// Canonical metric measurement ready for the record store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub unit: Unit,
}

impl Measurement {
    #[must_use]
    pub fn to_new_record(self) -> NewBmiRecord {
        NewBmiRecord {
            height: self.height_cm,
            weight: self.weight_kg,
            unit: self.unit,
        }
    }
}

/// The calculator form as typed: a unit and the raw text of each field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub unit: Unit,
    pub height: String,
    pub weight: String,
    pub height_feet: String,
    pub height_inches: String,
}

impl FormInput {
    #[must_use]
    pub fn new(unit: Unit) -> Self {
        Self {
            unit,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn metric(height: &str, weight: &str) -> Self {
        Self {
            height: height.to_string(),
            weight: weight.to_string(),
            ..Self::new(Unit::Metric)
        }
    }

    #[must_use]
    pub fn imperial(feet: &str, inches: &str, weight: &str) -> Self {
        Self {
            height_feet: feet.to_string(),
            height_inches: inches.to_string(),
            weight: weight.to_string(),
            ..Self::new(Unit::Imperial)
        }
    }

    /// Pre-fill from a saved preference. The saved height is centimeters
    /// regardless of unit; imperial forms get whole feet plus inches.
    #[must_use]
    pub fn from_preference(pref: &Preference) -> Self {
        let mut form = Self::new(pref.default_unit);
        if let Some(cm) = pref.saved_height.filter(|h| *h > 0.0) {
            match pref.default_unit {
                Unit::Metric => form.height = format_number(cm),
                Unit::Imperial => {
                    let (feet, inches) = cm_to_feet_inches(cm);
                    form.height_feet = format_number(feet);
                    form.height_inches = format_number(inches);
                }
            }
        }
        form
    }

    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Height => &self.height,
            Field::HeightFeet => &self.height_feet,
            Field::HeightInches => &self.height_inches,
            Field::Weight => &self.weight,
            Field::General => "",
        }
    }

    /// Returns whether the stored text changed.
    pub fn set(&mut self, field: Field, value: &str) -> bool {
        let slot = match field {
            Field::Height => &mut self.height,
            Field::HeightFeet => &mut self.height_feet,
            Field::HeightInches => &mut self.height_inches,
            Field::Weight => &mut self.weight,
            Field::General => return false,
        };
        let value = value.trim();
        if slot.as_str() == value {
            return false;
        }
        value.clone_into(slot);
        true
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.unit);
    }

    /// Whether any field tracked for the current unit holds text.
    #[must_use]
    pub fn has_input(&self) -> bool {
        Field::inputs(self.unit)
            .iter()
            .any(|f| !self.get(*f).trim().is_empty())
    }

    /// Validate every field of the current unit and convert to metric.
    pub fn validate(&self) -> Result<Measurement, FieldErrors> {
        let mut errors = FieldErrors::new();
        let measurement = match self.unit {
            Unit::Metric => {
                let height = parse_in_range(&self.height, HEIGHT_RANGE_CM);
                let weight = parse_in_range(&self.weight, WEIGHT_RANGE_KG);
                if height.is_none() {
                    errors.insert(Field::Height, "Height must be between 50-300 cm");
                }
                if weight.is_none() {
                    errors.insert(Field::Weight, "Weight must be between 20-500 kg");
                }
                height.zip(weight)
            }
            Unit::Imperial => {
                let feet = parse_in_range(&self.height_feet, FEET_RANGE);
                let inches = if self.height_inches.trim().is_empty() {
                    Some(0.0)
                } else {
                    parse_number(&self.height_inches).filter(|i| (0.0..12.0).contains(i))
                };
                let weight = parse_in_range(&self.weight, WEIGHT_RANGE_LB);
                if feet.is_none() {
                    errors.insert(Field::HeightFeet, "Feet must be between 3-8");
                }
                if inches.is_none() {
                    errors.insert(Field::HeightInches, "Inches must be between 0-11");
                }
                if weight.is_none() {
                    errors.insert(Field::Weight, "Weight must be between 44-1100 lbs");
                }
                match (feet, inches, weight) {
                    (Some(ft), Some(inch), Some(lb)) => {
                        Some((feet_inches_to_cm(ft, inch), lb_to_kg(lb)))
                    }
                    _ => None,
                }
            }
        };

        match measurement {
            Some((height_cm, weight_kg)) if errors.is_empty() => Ok(Measurement {
                height_cm,
                weight_kg,
                unit: self.unit,
            }),
            _ => Err(errors),
        }
    }
}

/// Parse a trimmed decimal number; empty, non-numeric, and non-finite text yield `None`.
#[must_use]
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_in_range(s: &str, (min, max): (f64, f64)) -> Option<f64> {
    parse_number(s).filter(|v| (min..=max).contains(v))
}

/// Format with at most two decimals and no trailing zeros.
#[must_use]
pub fn format_number(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::calculate_bmi;

    #[test]
    fn test_metric_valid() {
        let m = FormInput::metric("170", "70").validate().unwrap();
        assert_eq!(m.height_cm, 170.0);
        assert_eq!(m.weight_kg, 70.0);
        assert_eq!(m.unit, Unit::Metric);
    }

    #[test]
    fn test_metric_bounds_inclusive() {
        assert!(FormInput::metric("50", "20").validate().is_ok());
        assert!(FormInput::metric("300", "500").validate().is_ok());
        assert!(FormInput::metric("49.9", "20").validate().is_err());
        assert!(FormInput::metric("300.1", "20").validate().is_err());
    }

    #[test]
    fn test_metric_errors_keyed_by_field() {
        let errors = FormInput::metric("", "abc").validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get(Field::Height), Some("Height must be between 50-300 cm"));
        assert_eq!(errors.get(Field::Weight), Some("Weight must be between 20-500 kg"));

        let errors = FormInput::metric("170", "5").validate().unwrap_err();
        assert!(!errors.contains(Field::Height));
        assert!(errors.contains(Field::Weight));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(FormInput::metric("inf", "70").validate().is_err());
        assert!(FormInput::metric("NaN", "70").validate().is_err());
    }

    #[test]
    fn test_imperial_round_trip() {
        let m = FormInput::imperial("5", "7", "150").validate().unwrap();
        assert!((m.height_cm - 170.18).abs() < 1e-9);
        assert!((m.weight_kg - 68.04).abs() < 0.01);
        let r = calculate_bmi(m.height_cm, m.weight_kg);
        assert!((r.bmi - 23.49).abs() < 0.01);
        assert_eq!(r.category, crate::models::Category::Normal);
    }

    #[test]
    fn test_imperial_inches_optional() {
        let m = FormInput::imperial("6", "", "180").validate().unwrap();
        assert!((m.height_cm - 182.88).abs() < 1e-9);
    }

    #[test]
    fn test_imperial_inches_must_be_below_twelve() {
        let errors = FormInput::imperial("5", "12", "150").validate().unwrap_err();
        assert_eq!(errors.get(Field::HeightInches), Some("Inches must be between 0-11"));
        assert!(FormInput::imperial("5", "11.5", "150").validate().is_ok());
        assert!(FormInput::imperial("5", "-1", "150").validate().is_err());
        assert!(FormInput::imperial("5", "x", "150").validate().is_err());
    }

    #[test]
    fn test_imperial_field_errors() {
        let errors = FormInput::imperial("2", "", "30").validate().unwrap_err();
        assert_eq!(errors.get(Field::HeightFeet), Some("Feet must be between 3-8"));
        assert_eq!(errors.get(Field::Weight), Some("Weight must be between 44-1100 lbs"));
        assert!(!errors.contains(Field::HeightInches));
    }

    #[test]
    fn test_has_input_tracks_active_unit() {
        let mut form = FormInput::new(Unit::Metric);
        assert!(!form.has_input());
        form.set(Field::HeightFeet, "5");
        assert!(!form.has_input());
        form.set(Field::Weight, "70");
        assert!(form.has_input());

        let mut form = FormInput::new(Unit::Imperial);
        form.set(Field::HeightInches, "4");
        assert!(form.has_input());
        form.set(Field::HeightInches, "   ");
        assert!(!form.has_input());
    }

    #[test]
    fn test_set_reports_change() {
        let mut form = FormInput::new(Unit::Metric);
        assert!(form.set(Field::Height, " 170 "));
        assert_eq!(form.height, "170");
        assert!(!form.set(Field::Height, "170"));
        assert!(!form.set(Field::General, "x"));
    }

    #[test]
    fn test_from_preference_metric() {
        let pref = Preference {
            id: 1,
            default_unit: Unit::Metric,
            saved_height: Some(172.5),
            theme: "light".to_string(),
            timestamp: Utc::now(),
        };
        let form = FormInput::from_preference(&pref);
        assert_eq!(form.unit, Unit::Metric);
        assert_eq!(form.height, "172.5");
        assert!(form.weight.is_empty());
    }

    #[test]
    fn test_from_preference_imperial() {
        let pref = Preference {
            id: 1,
            default_unit: Unit::Imperial,
            saved_height: Some(170.18),
            theme: "light".to_string(),
            timestamp: Utc::now(),
        };
        let form = FormInput::from_preference(&pref);
        assert_eq!(form.height_feet, "5");
        assert_eq!(form.height_inches, "7");
        assert!(form.height.is_empty());
    }

    #[test]
    fn test_from_preference_without_height() {
        let pref = Preference {
            id: 1,
            default_unit: Unit::Imperial,
            saved_height: None,
            theme: "light".to_string(),
            timestamp: Utc::now(),
        };
        let form = FormInput::from_preference(&pref);
        assert_eq!(form, FormInput::new(Unit::Imperial));
    }

    #[test]
    fn test_field_parse() {
        assert_eq!("ft".parse::<Field>().unwrap(), Field::HeightFeet);
        assert_eq!("Weight".parse::<Field>().unwrap(), Field::Weight);
        assert!("shoe".parse::<Field>().is_err());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(170.0), "170");
        assert_eq!(format_number(172.5), "172.5");
        assert_eq!(format_number(6.999), "7");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn test_field_errors_display() {
        let errors = FormInput::metric("", "").validate().unwrap_err();
        assert_eq!(
            errors.to_string(),
            "Height must be between 50-300 cm; Weight must be between 20-500 kg"
        );
    }
}
