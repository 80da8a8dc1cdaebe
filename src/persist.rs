/*
 *  persist.rs
 *
 *  LedMarquee - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	Debounced, best-effort persistence of the marquee settings
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::constants::{SAVE_DEBOUNCE, SETTINGS_KEY};
use crate::settings::{Settings, SettingsPatch};
use crate::storage::{KeyValueStore, StorageError};

/// Owns the settings blob in a [`KeyValueStore`].
///
/// Edits land in a single pending slot; a writer task stores the newest
/// snapshot once no edit has arrived for the debounce period. A load that
/// completes after the first edit is discarded.
pub struct SettingsPersister {
    store: Arc<dyn KeyValueStore>,
    key: String,
    pending: Option<watch::Sender<Option<Settings>>>,
    writer: Option<JoinHandle<()>>,
    edited: bool,
    loaded: bool,
}

impl SettingsPersister {
    /// Must be called inside a tokio runtime; the writer task starts here.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_options(store, SETTINGS_KEY, SAVE_DEBOUNCE)
    }

    pub fn with_options(store: Arc<dyn KeyValueStore>, key: &str, debounce: Duration) -> Self {
        let (tx, rx) = watch::channel(None);
        let writer = tokio::spawn(run_writer(Arc::clone(&store), key.to_string(), rx, debounce));
        Self {
            store,
            key: key.to_string(),
            pending: Some(tx),
            writer: Some(writer),
            edited: false,
            loaded: false,
        }
    }

    pub fn has_edits(&self) -> bool {
        self.edited
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Read and parse the stored blob off the runtime threads. Failures are
    /// logged and read as "nothing stored".
    pub fn spawn_load(&self) -> JoinHandle<Option<SettingsPatch>> {
        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        tokio::spawn(async move {
            let read = tokio::task::spawn_blocking(move || read_patch(store.as_ref(), &key)).await;
            match read {
                Ok(Ok(patch)) => patch,
                Ok(Err(e)) => {
                    warn!("could not load stored settings: {}", e);
                    None
                }
                Err(e) => {
                    error!("settings load task failed: {}", e);
                    None
                }
            }
        })
    }

    /// Merge a finished load into `settings`. Returns false when the load is
    /// stale because the user already changed something.
    pub fn accept_loaded(&mut self, patch: Option<SettingsPatch>, settings: &mut Settings) -> bool {
        if self.edited {
            info!("stored settings arrived after an edit, keeping in-memory values");
            return false;
        }
        self.loaded = true;
        match patch {
            Some(patch) => {
                settings.apply(patch);
                info!("stored settings applied");
                true
            }
            None => {
                debug!("no stored settings, using defaults");
                false
            }
        }
    }

    /// Record a user edit and (re)arm the debounced write.
    pub fn record_edit(&mut self, settings: &Settings) {
        self.edited = true;
        if let Some(tx) = &self.pending {
            tx.send_replace(Some(settings.clone()));
        }
    }

    /// Write any pending snapshot now and stop the writer.
    pub async fn shutdown(mut self) {
        // closing the slot makes the writer store what it holds and exit
        self.pending.take();
        if let Some(handle) = self.writer.take() {
            if let Err(e) = handle.await {
                error!("settings writer failed to join: {}", e);
            }
        }
        debug!("settings persister stopped");
    }
}

impl Drop for SettingsPersister {
    fn drop(&mut self) {
        if let Some(handle) = self.writer.take() {
            handle.abort();
            debug!("SettingsPersister dropped, writer aborted");
        }
    }
}

fn read_patch(store: &dyn KeyValueStore, key: &str) -> Result<Option<SettingsPatch>, StorageError> {
    match store.get(key)? {
        Some(json) => Ok(Some(Settings::parse_patch(&json)?)),
        None => Ok(None),
    }
}

async fn run_writer(
    store: Arc<dyn KeyValueStore>,
    key: String,
    mut rx: watch::Receiver<Option<Settings>>,
    debounce: Duration,
) {
    loop {
        if rx.changed().await.is_err() {
            break;
        }
        let mut closed = false;
        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        closed = true;
                        break;
                    }
                }
                _ = tokio::time::sleep(debounce) => break,
            }
        }

        let snapshot = rx.borrow_and_update().clone();
        if let Some(settings) = snapshot {
            write_snapshot(Arc::clone(&store), key.clone(), settings).await;
        }
        if closed {
            break;
        }
    }
}

async fn write_snapshot(store: Arc<dyn KeyValueStore>, key: String, settings: Settings) {
    let json = match settings.to_json() {
        Ok(json) => json,
        Err(e) => {
            error!("could not serialize settings: {}", e);
            return;
        }
    };
    match tokio::task::spawn_blocking(move || store.set(&key, &json)).await {
        Ok(Ok(())) => debug!("settings saved"),
        Ok(Err(e)) => warn!("could not save settings: {}", e),
        Err(e) => error!("settings save task failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    use crate::storage::MemoryStore;

    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: AtomicUsize,
        written: Notify,
        fail: bool,
    }

    impl KeyValueStore for CountingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.fail {
                return Err(StorageError::Unavailable("offline".into()));
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.written.notify_one();
            if self.fail {
                return Err(StorageError::Unavailable("offline".into()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    fn stored(store: &CountingStore) -> Option<Settings> {
        let json = store.inner.get(SETTINGS_KEY).unwrap()?;
        let mut settings = Settings::default();
        settings.apply(Settings::parse_patch(&json).unwrap());
        Some(settings)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_collapse_into_one_write() {
        let store = Arc::new(CountingStore::default());
        let mut persister = SettingsPersister::new(store.clone());

        for (i, text) in ["A", "AB", "ABC"].iter().enumerate() {
            persister.record_edit(&Settings::with_text(*text));
            if i < 2 {
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
        }
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);

        persister.shutdown().await;
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(stored(&store).unwrap().text, "ABC");
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_fires_after_quiet_period() {
        let store = Arc::new(CountingStore::default());
        let mut persister = SettingsPersister::new(store.clone());

        persister.record_edit(&Settings::with_text("QUIET"));
        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        store.written.notified().await;
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);

        // nothing pending, shutdown must not write again
        persister.shutdown().await;
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(stored(&store).unwrap().text, "QUIET");
    }

    #[tokio::test]
    async fn test_load_applies_stored_values() {
        let store = Arc::new(CountingStore::default());
        let mut saved = Settings::with_text("SAVED");
        saved.speed = 240.0;
        store.inner.set(SETTINGS_KEY, &saved.to_json().unwrap()).unwrap();

        let mut persister = SettingsPersister::new(store.clone());
        let patch = persister.spawn_load().await.unwrap();
        let mut settings = Settings::default();
        assert!(persister.accept_loaded(patch, &mut settings));
        assert!(persister.is_loaded());
        assert_eq!(settings, saved);

        // applying a load is not an edit
        persister.shutdown().await;
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_late_load_never_overwrites_edits() {
        let store = Arc::new(CountingStore::default());
        store.inner.set(SETTINGS_KEY, &Settings::with_text("OLD").to_json().unwrap()).unwrap();

        let mut persister = SettingsPersister::new(store.clone());
        let load = persister.spawn_load();

        let mut settings = Settings::with_text("NEW");
        persister.record_edit(&settings);
        let patch = load.await.unwrap();
        assert!(!persister.accept_loaded(patch, &mut settings));
        assert_eq!(settings.text, "NEW");
        assert!(!persister.is_loaded());

        persister.shutdown().await;
        assert_eq!(stored(&store).unwrap().text, "NEW");
    }

    #[tokio::test]
    async fn test_bad_blob_reads_as_nothing() {
        let store = Arc::new(CountingStore::default());
        store.inner.set(SETTINGS_KEY, "{ not json").unwrap();
        let mut persister = SettingsPersister::new(store.clone());

        let patch = persister.spawn_load().await.unwrap();
        assert_eq!(patch, None);
        let mut settings = Settings::default();
        assert!(!persister.accept_loaded(patch, &mut settings));
        assert_eq!(settings, Settings::default());
    }

    #[tokio::test]
    async fn test_failing_store_is_logged_not_raised() {
        let store = Arc::new(CountingStore { fail: true, ..Default::default() });
        let mut persister = SettingsPersister::new(store.clone());

        assert_eq!(persister.spawn_load().await.unwrap(), None);
        persister.record_edit(&Settings::with_text("LOST"));
        persister.shutdown().await;
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(store.inner.get(SETTINGS_KEY).unwrap(), None);
    }
}
