//! Learning cache: four bounded mappings with pluggable persistence.
//!
//! The cache remembers classifications, design templates, user preferences
//! and stage telemetry across runs. It is loaded once at startup and saved
//! wholesale (whole-file rewrite, last writer wins) after every successful
//! pipeline run and every feedback submission. Persistence is explicit:
//! `record_*` methods mutate memory only, callers decide when to
//! [`LearningCache::persist`].

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use noteflow_core::defaults::{
    CACHE_MAX_CLASSIFICATIONS, CACHE_MAX_METRICS, CACHE_MAX_TEMPLATES, DEFAULT_USER_ID,
};
use noteflow_core::{
    CacheBackend, CachedClassification, Classification, DesignTemplate, FeedbackEntry,
    LearningCacheData, PerformanceMetric, Result,
};

// =============================================================================
// BACKENDS
// =============================================================================

/// Cache backend holding the snapshot in memory. Used in tests and when no
/// cache file is configured.
#[derive(Default)]
pub struct MemoryBackend {
    snapshot: RwLock<Option<LearningCacheData>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn load(&self) -> Result<Option<LearningCacheData>> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn save(&self, data: &LearningCacheData) -> Result<()> {
        *self.snapshot.write().await = Some(data.clone());
        Ok(())
    }
}

/// Cache backend persisting the snapshot as a single JSON file.
///
/// The mappings are BTreeMaps, so the file content is stable across saves
/// of identical data.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl CacheBackend for JsonFileBackend {
    async fn load(&self) -> Result<Option<LearningCacheData>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                // A corrupt cache file should not stop the server. Start
                // fresh; the next save replaces it.
                warn!(path = %self.path.display(), error = %e, "cache file unreadable, starting fresh");
                Ok(None)
            }
        }
    }

    async fn save(&self, data: &LearningCacheData) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

// =============================================================================
// CACHE
// =============================================================================

/// The learning cache. All mutation goes through `record_*` methods, which
/// enforce the per-mapping capacity bounds.
pub struct LearningCache {
    data: RwLock<LearningCacheData>,
    backend: Arc<dyn CacheBackend>,
}

impl LearningCache {
    /// Load the snapshot from the backend, or start empty.
    pub async fn load(backend: Arc<dyn CacheBackend>) -> Result<Self> {
        let data = backend.load().await?.unwrap_or_default();
        info!(
            classifications = data.classifications.len(),
            templates = data.templates.len(),
            metrics = data.metrics.len(),
            "learning cache loaded"
        );
        Ok(Self {
            data: RwLock::new(data),
            backend,
        })
    }

    /// Remember a classification for a content pattern.
    pub async fn record_classification(&self, key: impl Into<String>, value: Classification) {
        let mut data = self.data.write().await;
        data.classifications.insert(
            key.into(),
            CachedClassification {
                classification: value,
                last_used: Utc::now(),
            },
        );
        evict_oldest_touched(&mut data.classifications, CACHE_MAX_CLASSIFICATIONS, |c| {
            c.last_used
        });
    }

    /// Look up a previously recorded classification. A hit counts as a
    /// touch, so frequently served patterns stay resident.
    pub async fn lookup_classification(&self, key: &str) -> Option<Classification> {
        let mut data = self.data.write().await;
        let cached = data.classifications.get_mut(key)?;
        cached.last_used = Utc::now();
        Some(cached.classification.clone())
    }

    /// Remember a design combination, bumping usage if it already exists.
    pub async fn record_template(&self, key: impl Into<String>, template: DesignTemplate) {
        let mut data = self.data.write().await;
        let key = key.into();
        match data.templates.get_mut(&key) {
            Some(existing) => {
                existing.usage_count += 1;
                existing.last_used = Utc::now();
                existing.success_score = template.success_score;
            }
            None => {
                data.templates.insert(key, template);
            }
        }
        evict_oldest_touched(&mut data.templates, CACHE_MAX_TEMPLATES, |t| t.last_used);
    }

    /// Append a feedback entry to the default user's history.
    pub async fn record_feedback(&self, entry: FeedbackEntry) {
        let mut data = self.data.write().await;
        data.user_preferences
            .entry(DEFAULT_USER_ID.to_string())
            .or_default()
            .feedback_history
            .push(entry);
    }

    /// Record write-only stage telemetry. Metric keys are prefixed with a
    /// millisecond timestamp, so lexicographic order is insertion order and
    /// eviction drops the oldest entries.
    pub async fn record_metric(&self, metric: PerformanceMetric) {
        let key = format!("{:013}-{}", metric.timestamp.timestamp_millis(), metric.stage);
        let mut data = self.data.write().await;
        data.metrics.insert(key, metric);
        evict_first_keys(&mut data.metrics, CACHE_MAX_METRICS);
    }

    /// Aggregate counters for the analytics endpoint.
    pub async fn analytics(&self) -> serde_json::Value {
        let data = self.data.read().await;

        let feedback: Vec<&FeedbackEntry> = data
            .user_preferences
            .values()
            .flat_map(|p| p.feedback_history.iter())
            .collect();
        let average_rating = if feedback.is_empty() {
            None
        } else {
            Some(feedback.iter().map(|f| f.rating).sum::<f64>() / feedback.len() as f64)
        };

        let average_satisfaction = if data.metrics.is_empty() {
            None
        } else {
            Some(
                data.metrics.values().map(|m| m.satisfaction).sum::<f64>()
                    / data.metrics.len() as f64,
            )
        };

        serde_json::json!({
            "totalClassifications": data.classifications.len(),
            "totalTemplates": data.templates.len(),
            "totalMetrics": data.metrics.len(),
            "feedbackCount": feedback.len(),
            "averageRating": average_rating,
            "averageSatisfaction": average_satisfaction,
            "subjects": data.classifications.values()
                .map(|c| c.classification.subject.as_str())
                .collect::<std::collections::BTreeSet<_>>(),
        })
    }

    /// Write the full snapshot through the backend.
    pub async fn persist(&self) -> Result<()> {
        let data = self.data.read().await;
        self.backend.save(&data).await?;
        debug!(
            classifications = data.classifications.len(),
            templates = data.templates.len(),
            metrics = data.metrics.len(),
            "learning cache persisted"
        );
        Ok(())
    }

    /// Snapshot of the current cache content (tests and diagnostics).
    pub async fn snapshot(&self) -> LearningCacheData {
        self.data.read().await.clone()
    }
}

/// Drop the lexicographically smallest keys until the map fits its bound.
/// Only valid for mappings whose keys are timestamp-prefixed, where
/// lexicographic order is insertion order (metrics).
fn evict_first_keys<V>(map: &mut BTreeMap<String, V>, max: usize) {
    while map.len() > max {
        let Some(key) = map.keys().next().cloned() else {
            break;
        };
        map.remove(&key);
    }
}

/// Drop the entries with the oldest touch timestamp until the map fits
/// its bound.
fn evict_oldest_touched<V>(
    map: &mut BTreeMap<String, V>,
    max: usize,
    touched: impl Fn(&V) -> DateTime<Utc>,
) {
    while map.len() > max {
        let Some(oldest_key) = map
            .iter()
            .min_by_key(|(_, v)| touched(v))
            .map(|(k, _)| k.clone())
        else {
            break;
        };
        map.remove(&oldest_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use noteflow_core::Difficulty;

    fn classification(subject: &str) -> Classification {
        Classification {
            subject: subject.to_string(),
            tone: "academic".to_string(),
            language: "en".to_string(),
            tags: vec![],
            difficulty: Difficulty::Intermediate,
        }
    }

    fn metric(stage: &str, age_secs: i64) -> PerformanceMetric {
        PerformanceMetric {
            processing_ms: 100,
            satisfaction: 8.0,
            error_rate: 0.0,
            timestamp: Utc::now() - Duration::seconds(age_secs),
            stage: stage.to_string(),
            input_size: 42,
            output_quality: 7.5,
        }
    }

    async fn fresh_cache() -> LearningCache {
        LearningCache::load(Arc::new(MemoryBackend::new()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_classification_round_trip() {
        let cache = fresh_cache().await;
        cache
            .record_classification("bio-pattern", classification("biology"))
            .await;

        let hit = cache.lookup_classification("bio-pattern").await.unwrap();
        assert_eq!(hit.subject, "biology");
        assert!(cache.lookup_classification("unknown").await.is_none());
    }

    #[tokio::test]
    async fn test_classification_eviction_drops_oldest_touched() {
        let cache = fresh_cache().await;
        // The oldest entry must go first even when its key sorts last.
        cache
            .record_classification("zzz-stale", classification("math"))
            .await;
        for i in 0..CACHE_MAX_CLASSIFICATIONS {
            cache
                .record_classification(format!("aaa-{:04}", i), classification("math"))
                .await;
        }

        let snapshot = cache.snapshot().await;
        assert_eq!(snapshot.classifications.len(), CACHE_MAX_CLASSIFICATIONS);
        assert!(!snapshot.classifications.contains_key("zzz-stale"));
        assert!(snapshot
            .classifications
            .contains_key(&format!("aaa-{:04}", CACHE_MAX_CLASSIFICATIONS - 1)));
    }

    #[tokio::test]
    async fn test_classification_lookup_keeps_entry_resident() {
        let cache = fresh_cache().await;
        cache
            .record_classification("keep-me", classification("biology"))
            .await;
        for i in 0..CACHE_MAX_CLASSIFICATIONS - 1 {
            cache
                .record_classification(format!("filler-{:04}", i), classification("math"))
                .await;
        }

        // A hit refreshes the touch timestamp, so the next insert evicts
        // the oldest filler instead.
        assert!(cache.lookup_classification("keep-me").await.is_some());
        cache
            .record_classification("one-more", classification("math"))
            .await;

        let snapshot = cache.snapshot().await;
        assert!(snapshot.classifications.contains_key("keep-me"));
        assert!(!snapshot.classifications.contains_key("filler-0000"));
    }

    #[tokio::test]
    async fn test_template_usage_bump() {
        let cache = fresh_cache().await;
        let template = DesignTemplate {
            subject: "chemistry".to_string(),
            color_scheme: "pastel".to_string(),
            font_combination: "clean".to_string(),
            layout_style: "balanced".to_string(),
            success_score: 7.0,
            usage_count: 1,
            last_used: Utc::now(),
        };
        cache.record_template("chem-pastel", template.clone()).await;
        cache.record_template("chem-pastel", template).await;

        let snapshot = cache.snapshot().await;
        assert_eq!(snapshot.templates["chem-pastel"].usage_count, 2);
    }

    #[tokio::test]
    async fn test_feedback_appends_to_default_user() {
        let cache = fresh_cache().await;
        cache
            .record_feedback(FeedbackEntry {
                rating: 9.0,
                features: vec!["diagrams".to_string()],
                timestamp: Utc::now(),
            })
            .await;
        cache
            .record_feedback(FeedbackEntry {
                rating: 6.0,
                features: vec![],
                timestamp: Utc::now(),
            })
            .await;

        let snapshot = cache.snapshot().await;
        let history = &snapshot.user_preferences[DEFAULT_USER_ID].feedback_history;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].rating, 9.0);
    }

    #[tokio::test]
    async fn test_metric_keys_order_by_time() {
        let cache = fresh_cache().await;
        cache.record_metric(metric("layout", 100)).await;
        cache.record_metric(metric("classifier", 0)).await;

        let snapshot = cache.snapshot().await;
        let keys: Vec<&String> = snapshot.metrics.keys().collect();
        assert_eq!(keys.len(), 2);
        // Older metric sorts first.
        assert!(keys[0].ends_with("layout"));
        assert!(keys[1].ends_with("classifier"));
    }

    #[tokio::test]
    async fn test_analytics_aggregates() {
        let cache = fresh_cache().await;
        cache
            .record_classification("p1", classification("biology"))
            .await;
        cache
            .record_feedback(FeedbackEntry {
                rating: 8.0,
                features: vec![],
                timestamp: Utc::now(),
            })
            .await;
        cache.record_metric(metric("formatter", 0)).await;

        let analytics = cache.analytics().await;
        assert_eq!(analytics["totalClassifications"], 1);
        assert_eq!(analytics["feedbackCount"], 1);
        assert_eq!(analytics["averageRating"], 8.0);
        assert_eq!(analytics["averageSatisfaction"], 8.0);
    }

    #[tokio::test]
    async fn test_analytics_empty_cache() {
        let cache = fresh_cache().await;
        let analytics = cache.analytics().await;
        assert_eq!(analytics["feedbackCount"], 0);
        assert!(analytics["averageRating"].is_null());
    }

    #[tokio::test]
    async fn test_json_file_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learning.json");
        let backend = JsonFileBackend::new(&path);

        assert!(backend.load().await.unwrap().is_none());

        let mut data = LearningCacheData::default();
        data.classifications.insert(
            "p".to_string(),
            CachedClassification {
                classification: classification("physics"),
                last_used: Utc::now(),
            },
        );
        backend.save(&data).await.unwrap();

        let loaded = backend.load().await.unwrap().unwrap();
        assert_eq!(loaded, data);
    }

    #[tokio::test]
    async fn test_json_file_backend_corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learning.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let backend = JsonFileBackend::new(&path);
        assert!(backend.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persist_writes_through_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let cache = LearningCache::load(backend.clone()).await.unwrap();
        cache
            .record_classification("p", classification("history"))
            .await;
        cache.persist().await.unwrap();

        let reloaded = LearningCache::load(backend).await.unwrap();
        assert!(reloaded.lookup_classification("p").await.is_some());
    }
}
