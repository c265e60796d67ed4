//! Static seed datasets loaded once at startup.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Result;
use crate::models::{BmiRecord, Preference, Unit, calculate_bmi};

const CALCULATIONS_JSON: &str = include_str!("../data/bmi_calculations.json");
const PREFERENCES_JSON: &str = include_str!("../data/user_preferences.json");

/// Seed rows carry only the measurements; bmi and category are derived on load.
#[derive(Debug, Deserialize)]
struct SeedCalculation {
    id: i64,
    height: f64,
    weight: f64,
    unit: Unit,
    timestamp: DateTime<Utc>,
}

impl From<SeedCalculation> for BmiRecord {
    fn from(seed: SeedCalculation) -> Self {
        let result = calculate_bmi(seed.height, seed.weight);
        BmiRecord {
            id: seed.id,
            height: seed.height,
            weight: seed.weight,
            unit: seed.unit,
            bmi: result.bmi,
            category: result.category,
            timestamp: seed.timestamp,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub calculations: Vec<BmiRecord>,
    pub preferences: Vec<Preference>,
}

impl SeedData {
    /// The datasets compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(CALCULATIONS_JSON, PREFERENCES_JSON)
    }

    pub fn from_json(calculations: &str, preferences: &str) -> Result<Self> {
        let rows: Vec<SeedCalculation> = serde_json::from_str(calculations)?;
        let preferences: Vec<Preference> = serde_json::from_str(preferences)?;
        Ok(Self {
            calculations: rows.into_iter().map(BmiRecord::from).collect(),
            preferences,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn test_embedded_seed_parses() {
        let seed = SeedData::embedded().unwrap();
        assert!(!seed.calculations.is_empty());
        assert!(seed.calculations.len() <= 10);
        assert_eq!(seed.preferences.len(), 1);
    }

    #[test]
    fn test_seed_records_satisfy_bmi_invariant() {
        let seed = SeedData::embedded().unwrap();
        for rec in &seed.calculations {
            let expected = calculate_bmi(rec.height, rec.weight);
            assert_eq!(rec.bmi, expected.bmi);
            assert_eq!(rec.category, expected.category);
        }
    }

    #[test]
    fn test_from_json_derives_category() {
        let seed = SeedData::from_json(
            r#"[{"id": 7, "height": 200.0, "weight": 120.0, "unit": "metric",
                 "timestamp": "2024-01-01T00:00:00Z"}]"#,
            "[]",
        )
        .unwrap();
        assert_eq!(seed.calculations[0].bmi, 30.0);
        assert_eq!(seed.calculations[0].category, Category::Obese);
        assert!(seed.preferences.is_empty());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = SeedData::from_json("{not json", "[]").unwrap_err();
        assert!(matches!(err, crate::Error::Seed(_)));
    }
}
