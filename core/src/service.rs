use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::db::{CalculationStore, PreferenceStore};
use crate::error::Result;
use crate::models::{
    BmiRecord, BmiResult, NewBmiRecord, NewPreference, Preference, UpdateBmiRecord,
    UpdatePreference, calculate_bmi,
};
use crate::seed::SeedData;

/// Artificial response delays standing in for a remote backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub read: Duration,
    pub write: Duration,
}

impl Latency {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            read: Duration::ZERO,
            write: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn from_millis(read_ms: u64, write_ms: u64) -> Self {
        Self {
            read: Duration::from_millis(read_ms),
            write: Duration::from_millis(write_ms),
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self::from_millis(200, 300)
    }
}

async fn pause(d: Duration) {
    if !d.is_zero() {
        tokio::time::sleep(d).await;
    }
}

/// Calculation records and the preference record behind one async facade.
///
/// Methods take `&self` so the service can sit in an `Arc` shared with
/// debounced tasks. Each store has its own lock and no lock is held across a
/// simulated delay.
pub struct BmiService {
    calculations: Mutex<CalculationStore>,
    preferences: Mutex<PreferenceStore>,
    latency: Latency,
}

impl BmiService {
    #[must_use]
    pub fn new(
        calculations: CalculationStore,
        preferences: PreferenceStore,
        latency: Latency,
    ) -> Self {
        Self {
            calculations: Mutex::new(calculations),
            preferences: Mutex::new(preferences),
            latency,
        }
    }

    #[must_use]
    pub fn empty(latency: Latency) -> Self {
        Self::new(CalculationStore::new(), PreferenceStore::new(), latency)
    }

    #[must_use]
    pub fn from_seed(seed: SeedData, latency: Latency) -> Self {
        Self::new(
            CalculationStore::with_records(seed.calculations),
            PreferenceStore::with_records(seed.preferences),
            latency,
        )
    }

    /// Service preloaded with the embedded seed datasets.
    pub fn seeded(latency: Latency) -> Result<Self> {
        Ok(Self::from_seed(SeedData::embedded()?, latency))
    }

    // --- Calculation ---

    #[must_use]
    pub fn calculate(&self, height_cm: f64, weight_kg: f64) -> BmiResult {
        calculate_bmi(height_cm, weight_kg)
    }

    pub async fn list_calculations(&self) -> Vec<BmiRecord> {
        pause(self.latency.read).await;
        self.calculations.lock().await.list()
    }

    pub async fn get_calculation(&self, id: i64) -> Result<BmiRecord> {
        pause(self.latency.read).await;
        self.calculations.lock().await.get(id)
    }

    pub async fn create_calculation(&self, new: &NewBmiRecord) -> Result<BmiRecord> {
        pause(self.latency.write).await;
        let record = self.calculations.lock().await.create(new)?;
        info!(
            id = record.id,
            bmi = record.bmi,
            category = %record.category,
            "calculation stored"
        );
        Ok(record)
    }

    pub async fn update_calculation(&self, id: i64, update: &UpdateBmiRecord) -> Result<BmiRecord> {
        pause(self.latency.write).await;
        self.calculations.lock().await.update(id, update)
    }

    pub async fn delete_calculation(&self, id: i64) -> Result<BmiRecord> {
        pause(self.latency.read).await;
        self.calculations.lock().await.delete(id)
    }

    // --- Preferences ---

    pub async fn list_preferences(&self) -> Vec<Preference> {
        pause(self.latency.read).await;
        self.preferences.lock().await.list()
    }

    pub async fn get_preference(&self, id: i64) -> Result<Preference> {
        pause(self.latency.read).await;
        self.preferences.lock().await.get(id)
    }

    /// Replace the stored preference record with a fresh one.
    pub async fn create_preference(&self, new: &NewPreference) -> Preference {
        pause(self.latency.write).await;
        let pref = self.preferences.lock().await.create(new);
        info!(unit = %pref.default_unit, saved_height = ?pref.saved_height, "preferences saved");
        pref
    }

    pub async fn update_preference(&self, id: i64, update: &UpdatePreference) -> Result<Preference> {
        pause(self.latency.write).await;
        self.preferences.lock().await.update(id, update)
    }

    pub async fn delete_preference(&self, id: i64) -> Result<Preference> {
        pause(self.latency.read).await;
        let removed = self.preferences.lock().await.delete(id)?;
        debug!(id, "preferences deleted");
        Ok(removed)
    }

    /// Save the last-used unit and height, carrying over fields the caller
    /// did not set (currently the theme) from the existing record.
    ///
    /// The merge and the replacement happen under one lock so a preference
    /// saved during the write delay is merged rather than overwritten.
    pub async fn remember(&self, new: NewPreference) -> Preference {
        pause(self.latency.write).await;
        let mut prefs = self.preferences.lock().await;
        let theme = new
            .theme
            .clone()
            .or_else(|| prefs.current().map(|p| p.theme.clone()));
        let pref = prefs.create(&NewPreference { theme, ..new });
        info!(unit = %pref.default_unit, saved_height = ?pref.saved_height, "preferences saved");
        pref
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Unit};

    fn service() -> BmiService {
        BmiService::empty(Latency::none())
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let svc = service();
        let rec = svc
            .create_calculation(&NewBmiRecord {
                height: 170.0,
                weight: 70.0,
                unit: Unit::Metric,
            })
            .await
            .unwrap();
        assert_eq!(rec.category, Category::Normal);

        let all = svc.list_calculations().await;
        assert_eq!(all, vec![rec.clone()]);
        assert_eq!(svc.get_calculation(rec.id).await.unwrap(), rec);
    }

    #[tokio::test]
    async fn test_list_is_a_copy() {
        let svc = service();
        let new = NewBmiRecord {
            height: 170.0,
            weight: 70.0,
            unit: Unit::Metric,
        };
        svc.create_calculation(&new).await.unwrap();
        let mut snapshot = svc.list_calculations().await;
        snapshot.clear();
        assert_eq!(svc.list_calculations().await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_not_found() {
        let svc = service();
        assert!(
            svc.update_calculation(9, &UpdateBmiRecord::default())
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(svc.delete_calculation(9).await.unwrap_err().is_not_found());
        assert!(svc.get_preference(9).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_calculate_delegates() {
        let svc = service();
        assert_eq!(svc.calculate(200.0, 74.0).category, Category::Normal);
    }

    #[tokio::test]
    async fn test_seeded_service_has_data() {
        let svc = BmiService::seeded(Latency::none()).unwrap();
        assert!(!svc.list_calculations().await.is_empty());
        assert_eq!(svc.list_preferences().await.len(), 1);
    }

    #[tokio::test]
    async fn test_remember_keeps_existing_theme() {
        let svc = service();
        svc.create_preference(&NewPreference {
            theme: Some("dark".to_string()),
            ..Default::default()
        })
        .await;

        let saved = svc
            .remember(NewPreference {
                default_unit: Some(Unit::Imperial),
                saved_height: Some(170.18),
                theme: None,
            })
            .await;
        assert_eq!(saved.theme, "dark");
        assert_eq!(saved.default_unit, Unit::Imperial);
        assert_eq!(svc.list_preferences().await, vec![saved]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_applied() {
        let svc = BmiService::empty(Latency::default());
        let start = tokio::time::Instant::now();
        svc.list_calculations().await;
        assert!(start.elapsed() >= Duration::from_millis(200));

        let start = tokio::time::Instant::now();
        svc.create_preference(&NewPreference::default()).await;
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remember_merges_preference_saved_during_delay() {
        let svc = std::sync::Arc::new(BmiService::empty(Latency::default()));
        let theme_change = {
            let svc = std::sync::Arc::clone(&svc);
            tokio::spawn(async move {
                svc.create_preference(&NewPreference {
                    theme: Some("dark".to_string()),
                    ..Default::default()
                })
                .await
            })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;

        let saved = svc
            .remember(NewPreference {
                default_unit: Some(Unit::Metric),
                saved_height: Some(180.0),
                theme: None,
            })
            .await;
        theme_change.await.unwrap();

        assert_eq!(saved.theme, "dark");
        assert_eq!(svc.list_preferences().await, vec![saved]);
    }
}
