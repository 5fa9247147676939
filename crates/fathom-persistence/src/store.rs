//! Debounced, atomic-write JSON persistence (spec.md §5 "Persistence").
//!
//! Grounded on `riptide_persistence::state::SessionSpilloverManager::spill_session`'s
//! write-temp-then-rename pattern, generalized to any `Serialize +
//! DeserializeOwned` value and given a debounce window so repeated `save()`
//! calls within `persistDebounceMs` coalesce into one write.

use fathom_types::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// A debounced, atomic-write JSON file backing store for one `T`.
///
/// `save()` arms a `debounce` timer; a later `save()` within the window
/// replaces the pending value without writing. `flush()` writes immediately,
/// superseding any pending debounced write.
pub struct PersistedStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    path: PathBuf,
    debounce: Duration,
    pending: Arc<Mutex<Option<T>>>,
    generation: Arc<AtomicU64>,
}

impl<T> PersistedStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(path: impl Into<PathBuf>, debounce: Duration) -> Self {
        Self {
            path: path.into(),
            debounce,
            pending: Arc::new(Mutex::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Load the persisted value, if the file exists.
    pub async fn load(&self) -> Result<Option<T>> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Arm a debounced write. Returns immediately; the actual write happens
    /// on a background task after `debounce`, unless superseded by another
    /// `save()` or `flush()` first.
    pub async fn save(&self, value: T) {
        *self.pending.lock().await = Some(value);
        let this_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let pending = self.pending.clone();
        let generation = self.generation.clone();
        let path = self.path.clone();
        let debounce = self.debounce;

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if generation.load(Ordering::SeqCst) != this_generation {
                // A later save (or a flush) already took care of this write.
                return;
            }
            let value = pending.lock().await.take();
            if let Some(value) = value {
                if let Err(e) = write_atomic(&path, &value).await {
                    warn!(path = %path.display(), error = %e, "debounced persistence write failed");
                }
            }
        });
    }

    /// Force an immediate write of the pending value, if any, bypassing the
    /// debounce window.
    pub async fn flush(&self) -> Result<()> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let value = self.pending.lock().await.take();
        if let Some(value) = value {
            write_atomic(&self.path, &value).await?;
        }
        Ok(())
    }
}

async fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp_path = path.with_extension("tmp");

    let mut file = fs::File::create(&tmp_path).await?;
    file.write_all(&bytes).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&tmp_path, path).await?;
    debug!(path = %path.display(), bytes = bytes.len(), "persisted state");
    Ok(())
}
