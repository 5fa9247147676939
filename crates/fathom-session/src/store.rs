//! `FileSessionStore`: one [`PersistedStore`] per `(domain, profile)` key,
//! lazily created and kept exclusive per-key by the `DashMap` shard it lives
//! in (spec.md §5 "Session store — exclusive per (domain, profile) during
//! save/load; readers clone before returning").

use crate::health::{derive_health, SessionHealthConfig};
use async_trait::async_trait;
use dashmap::DashMap;
use fathom_persistence::PersistedStore;
use fathom_types::{Result, SessionHealth, SessionSnapshot, SessionStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

fn path_for(base_dir: &std::path::Path, domain: &str, profile: &str) -> PathBuf {
    base_dir.join(domain).join(format!("{profile}.json"))
}

type Key = (String, String);

pub struct FileSessionStore {
    base_dir: PathBuf,
    debounce: Duration,
    stores: DashMap<Key, Arc<PersistedStore<SessionSnapshot>>>,
    health_config: SessionHealthConfig,
}

impl FileSessionStore {
    pub fn new(base_dir: impl Into<PathBuf>, debounce: Duration) -> Self {
        Self {
            base_dir: base_dir.into(),
            debounce,
            stores: DashMap::new(),
            health_config: SessionHealthConfig::default(),
        }
    }

    fn store_for(&self, domain: &str, profile: &str) -> Arc<PersistedStore<SessionSnapshot>> {
        let key = (domain.to_string(), profile.to_string());
        self.stores
            .entry(key)
            .or_insert_with(|| {
                let path = path_for(&self.base_dir, domain, profile);
                Arc::new(PersistedStore::new(path, self.debounce))
            })
            .clone()
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save(&self, snapshot: SessionSnapshot) -> Result<()> {
        let store = self.store_for(&snapshot.domain, &snapshot.profile);
        debug!(domain = %snapshot.domain, profile = %snapshot.profile, "saving session snapshot");
        store.save(snapshot).await;
        Ok(())
    }

    async fn load(&self, domain: &str, profile: &str) -> Result<Option<SessionSnapshot>> {
        let store = self.store_for(domain, profile);
        store.load().await
    }

    async fn health(&self, domain: &str, profile: &str) -> Result<SessionHealth> {
        let snapshot = self.load(domain, profile).await?;
        Ok(derive_health(snapshot.as_ref(), chrono::Utc::now(), &self.health_config))
    }

    async fn invalidate(&self, domain: &str, profile: &str) -> Result<()> {
        let store = self.store_for(domain, profile);
        // Flush first so a pending debounced write can't resurrect the file
        // after we remove it (flush bumps the generation, superseding it).
        store.flush().await?;

        let path = path_for(&self.base_dir, domain, profile);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let key = (domain.to_string(), profile.to_string());
        self.stores.remove(&key);
        debug!(domain, profile, "invalidated session snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(domain: &str, profile: &str) -> SessionSnapshot {
        SessionSnapshot {
            domain: domain.to_string(),
            profile: profile.to_string(),
            payload: vec![1, 2, 3],
            created_at: Utc::now(),
            expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
        }
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), Duration::from_millis(10));
        let snap = snapshot("example.com", "default");

        store.save(snap.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let loaded = store.load("example.com", "default").await.unwrap().unwrap();
        assert_eq!(loaded.domain, "example.com");
        assert_eq!(loaded.payload, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn missing_when_never_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), Duration::from_millis(10));
        let health = store.health("example.com", "default").await.unwrap();
        assert_eq!(health, SessionHealth::Missing);
    }

    #[tokio::test]
    async fn distinct_profiles_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), Duration::from_millis(10));
        store.save(snapshot("example.com", "a")).await.unwrap();
        store.save(snapshot("example.com", "b")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let a = store.load("example.com", "a").await.unwrap().unwrap();
        let b = store.load("example.com", "b").await.unwrap().unwrap();
        assert_eq!(a.profile, "a");
        assert_eq!(b.profile, "b");
    }

    #[tokio::test]
    async fn invalidate_flushes_and_drops_cached_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), Duration::from_secs(60));
        store.save(snapshot("example.com", "default")).await.unwrap();
        store.invalidate("example.com", "default").await.unwrap();

        let loaded = store.load("example.com", "default").await.unwrap();
        assert!(loaded.is_none());
    }
}
