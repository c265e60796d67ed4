//! In-memory record stores.
//!
//! Each store owns its collection outright; nothing here is shared or global.
//! The service layer decides how stores are shared between tasks.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{
    BmiRecord, DEFAULT_THEME, NewBmiRecord, NewPreference, Preference, UpdateBmiRecord,
    UpdatePreference, calculate_bmi, validate_measurements, validate_new_record,
};

/// Most recent calculations kept; older ones are evicted on insert.
pub const MAX_CALCULATIONS: usize = 10;

const CALCULATION: &str = "BMI calculation";
const PREFERENCES: &str = "User preferences";

/// Timestamp-derived ids that never repeat or go backwards, even when two
/// records are created within the same millisecond.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    #[must_use]
    pub fn starting_after(last: i64) -> Self {
        Self { last }
    }

    pub fn next_at(&mut self, now: DateTime<Utc>) -> i64 {
        let id = now.timestamp_millis().max(self.last + 1);
        self.last = id;
        id
    }
}

// --- BMI calculations ---

#[derive(Debug, Default)]
pub struct CalculationStore {
    records: VecDeque<BmiRecord>,
    ids: IdGenerator,
}

impl CalculationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing records, newest first, capped at
    /// [`MAX_CALCULATIONS`].
    #[must_use]
    pub fn with_records(mut records: Vec<BmiRecord>) -> Self {
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records.truncate(MAX_CALCULATIONS);
        let last_id = records.iter().map(|r| r.id).max().unwrap_or_default();
        Self {
            records: records.into(),
            ids: IdGenerator::starting_after(last_id),
        }
    }

    /// Snapshot of every record, newest first.
    #[must_use]
    pub fn list(&self) -> Vec<BmiRecord> {
        self.records.iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: i64) -> Result<BmiRecord> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(Error::NotFound {
                entity: CALCULATION,
                id,
            })
    }

    pub fn create(&mut self, new: &NewBmiRecord) -> Result<BmiRecord> {
        self.create_at(new, Utc::now())
    }

    pub fn create_at(&mut self, new: &NewBmiRecord, now: DateTime<Utc>) -> Result<BmiRecord> {
        validate_new_record(new)?;
        let result = calculate_bmi(new.height, new.weight);
        let record = BmiRecord {
            id: self.ids.next_at(now),
            height: new.height,
            weight: new.weight,
            unit: new.unit,
            bmi: result.bmi,
            category: result.category,
            timestamp: now,
        };

        self.records.push_front(record.clone());
        if self.records.len() > MAX_CALCULATIONS {
            let evicted = self.records.len() - MAX_CALCULATIONS;
            self.records.truncate(MAX_CALCULATIONS);
            debug!(evicted, "calculation store: dropped oldest records");
        }
        debug!(id = record.id, bmi = record.bmi, "calculation store: inserted");
        Ok(record)
    }

    /// Merge `update` into the record. BMI and category are recomputed
    /// whenever height or weight is part of the update.
    pub fn update(&mut self, id: i64, update: &UpdateBmiRecord) -> Result<BmiRecord> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(Error::NotFound {
                entity: CALCULATION,
                id,
            })?;

        let height = update.height.unwrap_or(record.height);
        let weight = update.weight.unwrap_or(record.weight);
        if update.changes_measurements() {
            validate_measurements(height, weight)?;
        }

        record.height = height;
        record.weight = weight;
        if let Some(unit) = update.unit {
            record.unit = unit;
        }
        if update.changes_measurements() {
            let result = calculate_bmi(height, weight);
            record.bmi = result.bmi;
            record.category = result.category;
        }
        debug!(id, "calculation store: updated");
        Ok(record.clone())
    }

    pub fn delete(&mut self, id: i64) -> Result<BmiRecord> {
        let idx = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(Error::NotFound {
                entity: CALCULATION,
                id,
            })?;
        let removed = self.records.remove(idx).ok_or(Error::NotFound {
            entity: CALCULATION,
            id,
        })?;
        debug!(id, "calculation store: deleted");
        Ok(removed)
    }
}

// --- User preferences ---

/// Holds zero or one preference record.
#[derive(Debug, Default)]
pub struct PreferenceStore {
    current: Option<Preference>,
    ids: IdGenerator,
}

impl PreferenceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first seeded record; any others are dropped.
    #[must_use]
    pub fn with_records(records: Vec<Preference>) -> Self {
        let last_id = records.iter().map(|p| p.id).max().unwrap_or_default();
        Self {
            current: records.into_iter().next(),
            ids: IdGenerator::starting_after(last_id),
        }
    }

    #[must_use]
    pub fn list(&self) -> Vec<Preference> {
        self.current.iter().cloned().collect()
    }

    #[must_use]
    pub fn current(&self) -> Option<&Preference> {
        self.current.as_ref()
    }

    pub fn get(&self, id: i64) -> Result<Preference> {
        self.current
            .as_ref()
            .filter(|p| p.id == id)
            .cloned()
            .ok_or(Error::NotFound {
                entity: PREFERENCES,
                id,
            })
    }

    /// Discard whatever is stored and insert one record built from defaults
    /// overridden by `new`.
    pub fn create(&mut self, new: &NewPreference) -> Preference {
        self.create_at(new, Utc::now())
    }

    pub fn create_at(&mut self, new: &NewPreference, now: DateTime<Utc>) -> Preference {
        let pref = Preference {
            id: self.ids.next_at(now),
            default_unit: new.default_unit.unwrap_or_default(),
            saved_height: new.saved_height.filter(|h| *h > 0.0),
            theme: new
                .theme
                .clone()
                .unwrap_or_else(|| DEFAULT_THEME.to_string()),
            timestamp: now,
        };
        if let Some(old) = self.current.replace(pref.clone()) {
            debug!(old = old.id, new = pref.id, "preference store: replaced");
        }
        pref
    }

    pub fn update(&mut self, id: i64, update: &UpdatePreference) -> Result<Preference> {
        let pref = self
            .current
            .as_mut()
            .filter(|p| p.id == id)
            .ok_or(Error::NotFound {
                entity: PREFERENCES,
                id,
            })?;
        if let Some(unit) = update.default_unit {
            pref.default_unit = unit;
        }
        if let Some(height) = update.saved_height {
            pref.saved_height = Some(height).filter(|h| *h > 0.0);
        }
        if let Some(ref theme) = update.theme {
            pref.theme.clone_from(theme);
        }
        Ok(pref.clone())
    }

    pub fn delete(&mut self, id: i64) -> Result<Preference> {
        match self.current.take_if(|p| p.id == id) {
            Some(removed) => Ok(removed),
            None => Err(Error::NotFound {
                entity: PREFERENCES,
                id,
            }),
        }
    }
}
