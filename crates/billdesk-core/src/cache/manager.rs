use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{Template, UnpaidBills};

/// Consider cache stale after 1 hour.
const CACHE_STALE_MINUTES: i64 = 60;

const TEMPLATES: &str = "templates";
const UNPAID_BILLS: &str = "unpaid_bills";

/// Every entry the manager writes; `clear` removes exactly these.
const ENTRIES: [&str; 2] = [TEMPLATES, UNPAID_BILLS];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(self.cache_path(name), contents)
            .with_context(|| format!("Failed to write cache file: {}", name))?;
        Ok(())
    }

    // ===== Templates =====

    pub fn load_templates(&self) -> Result<Option<CachedData<Vec<Template>>>> {
        self.load(TEMPLATES)
    }

    pub fn save_templates(&self, templates: &[Template]) -> Result<()> {
        self.save(TEMPLATES, &templates)
    }

    // ===== Unpaid Bills =====

    pub fn load_unpaid_bills(&self) -> Result<Option<CachedData<UnpaidBills>>> {
        self.load(UNPAID_BILLS)
    }

    pub fn save_unpaid_bills(&self, unpaid: &UnpaidBills) -> Result<()> {
        self.save(UNPAID_BILLS, unpaid)
    }

    // ===== Housekeeping =====

    /// Remove every cached entry. Missing files are not an error.
    pub fn clear(&self) -> Result<()> {
        for name in ENTRIES {
            let path = self.cache_path(name);
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(entry = name, "Removed cache entry"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to remove cache file: {}", name))
                }
            }
        }
        Ok(())
    }

    fn age_of<T, F>(&self, name: &str, load: F) -> Option<String>
    where
        F: FnOnce() -> Result<Option<CachedData<T>>>,
    {
        match load() {
            Ok(Some(cached)) => Some(cached.age_display()),
            Ok(None) => None,
            Err(e) => {
                debug!(entry = name, error = %e, "Unreadable cache entry");
                None
            }
        }
    }

    /// Missing and unreadable entries count as stale.
    fn is_entry_stale<T, F>(&self, name: &str, load: F) -> bool
    where
        F: FnOnce() -> Result<Option<CachedData<T>>>,
    {
        match load() {
            Ok(Some(cached)) => cached.is_stale(),
            Ok(None) => true,
            Err(e) => {
                debug!(entry = name, error = %e, "Unreadable cache entry, treating as stale");
                true
            }
        }
    }

    /// Whether any dashboard entry is older than the staleness window.
    pub fn any_stale(&self) -> bool {
        self.is_entry_stale(TEMPLATES, || self.load_templates())
            || self.is_entry_stale(UNPAID_BILLS, || self.load_unpaid_bills())
    }

    pub fn get_cache_ages(&self) -> CacheAges {
        CacheAges {
            templates: self.age_of(TEMPLATES, || self.load_templates()),
            unpaid_bills: self.age_of(UNPAID_BILLS, || self.load_unpaid_bills()),
            stale: self.any_stale(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CacheAges {
    pub templates: Option<String>,
    pub unpaid_bills: Option<String>,
    pub stale: bool,
}

impl CacheAges {
    pub fn last_updated(&self) -> String {
        self.templates
            .clone()
            .or_else(|| self.unpaid_bills.clone())
            .unwrap_or_else(|| "never".to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompanyBills;
    use chrono::Duration;

    fn manager() -> (tempfile::TempDir, CacheManager) {
        let dir = tempfile::tempdir().unwrap();
        let manager = CacheManager::new(dir.path().join("data")).unwrap();
        (dir, manager)
    }

    fn template(id: i64) -> Template {
        Template {
            id,
            name: format!("Template {}", id),
            subject: "Invoice".to_string(),
            body: "Please pay".to_string(),
            mail: "billing@example.com".to_string(),
            company_ids: vec![1],
        }
    }

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_age_display_rounding() {
        let mut cached = CachedData::new(());
        cached.cached_at = Utc::now() - Duration::minutes(95);
        assert_eq!(cached.age_display(), "2h ago");

        cached.cached_at = Utc::now() - Duration::minutes(1440 + 60);
        assert_eq!(cached.age_display(), "1d ago");

        cached.cached_at = Utc::now() + Duration::minutes(10);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_is_stale() {
        let fresh = CachedData::new(vec![1]);
        assert!(!fresh.is_stale());

        let mut old = CachedData::new(vec![1]);
        old.cached_at = Utc::now() - Duration::minutes(61);
        assert!(old.is_stale());
    }

    #[test]
    fn test_templates_save_and_load() {
        let (_dir, manager) = manager();
        assert!(manager.load_templates().unwrap().is_none());

        manager.save_templates(&[template(1), template(2)]).unwrap();
        let cached = manager.load_templates().unwrap().unwrap();
        assert_eq!(cached.data.len(), 2);
        assert_eq!(cached.data[1].name, "Template 2");
    }

    #[test]
    fn test_clear_removes_all_entries() {
        let (_dir, manager) = manager();
        manager.save_templates(&[template(1)]).unwrap();
        manager
            .save_unpaid_bills(&UnpaidBills {
                companies: vec![CompanyBills {
                    id: 1,
                    name: "Acme".to_string(),
                    bills: vec![],
                }],
                total_amount: 0.0,
                total_count: 0,
            })
            .unwrap();

        manager.clear().unwrap();
        assert!(manager.load_templates().unwrap().is_none());
        assert!(manager.load_unpaid_bills().unwrap().is_none());

        // Clearing an empty cache is fine.
        manager.clear().unwrap();
    }

    #[test]
    fn test_corrupt_entry_is_an_error() {
        let (_dir, manager) = manager();
        std::fs::write(manager.cache_path(TEMPLATES), "not json").unwrap();
        assert!(manager.load_templates().is_err());
        assert!(manager.get_cache_ages().templates.is_none());
    }

    fn write_aged<T: Serialize>(manager: &CacheManager, name: &str, data: T, minutes: i64) {
        let mut cached = CachedData::new(data);
        cached.cached_at = Utc::now() - Duration::minutes(minutes);
        let json = serde_json::to_string(&cached).unwrap();
        std::fs::write(manager.cache_path(name), json).unwrap();
    }

    #[test]
    fn test_any_stale() {
        let (_dir, manager) = manager();
        // Nothing cached yet
        assert!(manager.any_stale());

        manager.save_templates(&[template(1)]).unwrap();
        manager.save_unpaid_bills(&UnpaidBills::default()).unwrap();
        assert!(!manager.any_stale());
        assert!(!manager.get_cache_ages().stale);

        write_aged(&manager, UNPAID_BILLS, UnpaidBills::default(), 90);
        assert!(manager.any_stale());
        let ages = manager.get_cache_ages();
        assert!(ages.stale);
        assert_eq!(ages.unpaid_bills.as_deref(), Some("2h ago"));
    }

    #[test]
    fn test_cache_ages() {
        let (_dir, manager) = manager();
        assert_eq!(manager.get_cache_ages().last_updated(), "never");

        manager.save_unpaid_bills(&UnpaidBills::default()).unwrap();
        let ages = manager.get_cache_ages();
        assert!(ages.templates.is_none());
        assert_eq!(ages.last_updated(), "just now");
    }
}
