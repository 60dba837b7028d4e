//! Short-lived in-memory hand-off for generated reports.
//!
//! Entries expire after a fixed TTL and the map is capped; nothing is
//! written to disk and nothing survives a restart.

use axum::body::Bytes;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct StoredReport {
    pub bytes: Bytes,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Insertion order, used to pick eviction victims.
    seq: u64,
}

impl StoredReport {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Clone)]
pub struct ReportStore {
    entries: Arc<DashMap<Uuid, StoredReport>>,
    ttl: Duration,
    max_items: usize,
    seq: Arc<AtomicU64>,
}

impl ReportStore {
    pub fn new(ttl: Duration, max_items: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
            max_items: max_items.max(1),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn ttl_minutes(&self) -> u64 {
        self.ttl.as_secs() / 60
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn save(&self, bytes: impl Into<Bytes>, filename: impl Into<String>) -> Uuid {
        self.save_at(bytes, filename, Utc::now())
    }

    pub fn save_at(
        &self,
        bytes: impl Into<Bytes>,
        filename: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Uuid {
        while self.entries.len() >= self.max_items {
            if !self.evict_oldest() {
                break;
            }
        }

        let ttl = ChronoDuration::from_std(self.ttl).unwrap_or(ChronoDuration::MAX);
        let id = Uuid::new_v4();
        let report = StoredReport {
            bytes: bytes.into(),
            filename: filename.into(),
            created_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
        };

        tracing::debug!(pdf_id = %id, size = report.bytes.len(), "Report stored");
        self.entries.insert(id, report);
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<StoredReport> {
        self.get_at(id, Utc::now())
    }

    /// Returns the entry unless it has expired; expired entries are dropped.
    pub fn get_at(&self, id: &Uuid, now: DateTime<Utc>) -> Option<StoredReport> {
        let found = self.entries.get(id).map(|entry| entry.value().clone());
        match found {
            Some(report) if report.is_expired_at(now) => {
                self.entries.remove_if(id, |_, r| r.is_expired_at(now));
                None
            }
            other => other,
        }
    }

    pub fn delete(&self, id: &Uuid) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, report| !report.is_expired_at(now));
        before.saturating_sub(self.entries.len())
    }

    fn evict_oldest(&self) -> bool {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().seq)
            .map(|entry| *entry.key());

        match oldest {
            Some(id) => {
                tracing::debug!(pdf_id = %id, "Evicting oldest stored report");
                self.entries.remove(&id).is_some()
            }
            None => false,
        }
    }

    /// Purges expired entries every `interval` until `shutdown` fires.
    pub fn spawn_janitor(&self, interval: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::debug!("Report store janitor stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let purged = store.purge_expired();
                        if purged > 0 {
                            tracing::info!(purged, remaining = store.len(), "Purged expired reports");
                        }
                    }
                }
            }
        })
    }
}
