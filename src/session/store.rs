//! Persisted "was connected" flag, used only to gate auto-reconnect.
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

const WAS_CONNECTED_KEY: &str = "basestory.wallet.was-connected";

#[async_trait]
pub trait ReconnectStore: Send + Sync {
    async fn was_connected(&self) -> bool;
    async fn mark_connected(&self);
    async fn clear(&self);
}

/// Flag stored in a cacache directory so it survives restarts.
#[derive(Debug, Clone)]
pub struct CacacheStore {
    dir: PathBuf,
}

impl CacacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ReconnectStore for CacacheStore {
    async fn was_connected(&self) -> bool {
        cacache::read(&self.dir, WAS_CONNECTED_KEY)
            .await
            .is_ok_and(|data| data == b"true")
    }

    async fn mark_connected(&self) {
        if let Err(e) = cacache::write(&self.dir, WAS_CONNECTED_KEY, b"true").await {
            log::warn!("session::store: failed to persist reconnect flag: {e}");
        }
    }

    async fn clear(&self) {
        match cacache::remove(&self.dir, WAS_CONNECTED_KEY).await {
            Ok(()) | Err(cacache::Error::EntryNotFound(..)) => {}
            Err(e) => log::warn!("session::store: failed to clear reconnect flag: {e}"),
        }
    }
}

/// In-process flag for ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    flag: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub const fn with_flag(connected: bool) -> Self {
        Self {
            flag: AtomicBool::new(connected),
        }
    }
}

#[async_trait]
impl ReconnectStore for MemoryStore {
    async fn was_connected(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    async fn mark_connected(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    async fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
