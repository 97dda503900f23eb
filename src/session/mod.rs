//! Wallet session: connection state, the sub/universal account pair and balance refresh.
//!
//! One [`WalletSession`] is created per app instance and handed to whatever needs it. State is
//! published through a `watch` channel so views can re-render on change.
//!
//! ```ignore
//! let session = WalletSession::new(settings, factory, store);
//! session.init().await; // auto-reconnect if the user was connected last time
//! session.connect().await?;
//! let id = session.send_calls(calls).await?;
//! session.disconnect().await;
//! ```
pub mod store;

use crate::config::Config;
use crate::errors::WalletError;
use crate::poll::{spawn_poller, PollHandle, Tick};
use crate::provider::{Call, CallsStatus, SendCallsRequest, WalletProvider};
use crate::reader::{balance_of_calldata, decode_balance};
use crate::units::format_token_amount;
use alloy::primitives::{Address, U256};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{watch, Mutex};

pub use store::{CacacheStore, MemoryStore, ReconnectStore};

pub const BALANCE_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Balance shown when nothing better is known.
pub const ZERO_BALANCE: &str = "0.00";

/// Lazily builds the wallet provider on first use.
pub type ProviderFactory =
    Box<dyn Fn() -> Result<Arc<dyn WalletProvider>, WalletError> + Send + Sync>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub connected: bool,
    pub universal_address: Option<Address>,
    pub sub_account_address: Option<Address>,
    /// Cosmetic only
    pub display_name: String,
    pub usdc_balance: Option<String>,
    pub loading: bool,
    pub last_error: Option<String>,
}

/// Accounts returned by a successful authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accounts {
    /// `None` only in the degraded single-address case
    pub sub_account: Option<Address>,
    pub universal: Address,
}

impl Accounts {
    /// Interprets the provider's `[sub, universal]` response.
    ///
    /// # Errors
    /// * `NoAccounts` if the list is empty
    /// * `AmbiguousAccounts` if sub and universal are the same address
    /// * `AmbiguousAccounts` if only one address came back and a sub account is required
    pub fn from_authorization(
        addresses: &[Address],
        require_sub: bool,
    ) -> Result<Self, WalletError> {
        match addresses {
            [] => Err(WalletError::NoAccounts),
            [only] if require_sub => Err(WalletError::AmbiguousAccounts(format!(
                "expected sub and universal accounts, got only {only}"
            ))),
            [only] => {
                log::warn!(
                    "session::connect: wallet returned a single account {only}, \
                     sub account unavailable"
                );
                Ok(Self {
                    sub_account: None,
                    universal: *only,
                })
            }
            [sub, universal, ..] if sub == universal => Err(WalletError::AmbiguousAccounts(
                format!("sub and universal accounts are both {sub}"),
            )),
            [sub, universal, ..] => Ok(Self {
                sub_account: Some(*sub),
                universal: *universal,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub chain_id: u64,
    /// Token whose balance is tracked
    pub token: Address,
    pub balance_interval: Duration,
    pub require_sub_account: bool,
}

impl SessionSettings {
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self {
            chain_id: config.network.chain_id(),
            token: config.token(),
            balance_interval: BALANCE_POLL_INTERVAL,
            require_sub_account: config.require_sub_account,
        }
    }
}

struct Inner {
    settings: SessionSettings,
    factory: ProviderFactory,
    provider: Mutex<Option<Arc<dyn WalletProvider>>>,
    store: Arc<dyn ReconnectStore>,
    state: watch::Sender<Session>,
    connecting: AtomicBool,
    auto_reconnect_attempted: AtomicBool,
    /// Bumped by every disconnect
    epoch: AtomicU64,
    balance_poller: Mutex<Option<PollHandle>>,
}

/// Resets the re-entrancy flag even if the connect future is dropped midway.
struct ConnectGuard<'a>(&'a AtomicBool);

impl Drop for ConnectGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct WalletSession {
    inner: Arc<Inner>,
}

impl WalletSession {
    pub fn new(
        settings: SessionSettings,
        factory: ProviderFactory,
        store: Arc<dyn ReconnectStore>,
    ) -> Self {
        let (state, _) = watch::channel(Session::default());

        Self {
            inner: Arc::new(Inner {
                settings,
                factory,
                provider: Mutex::new(None),
                store,
                state,
                connecting: AtomicBool::new(false),
                auto_reconnect_attempted: AtomicBool::new(false),
                epoch: AtomicU64::new(0),
                balance_poller: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Auto-reconnects once per session if the user was connected last time.
    ///
    /// Returns true if a reconnect happened.
    pub async fn init(&self) -> bool {
        if self.inner.auto_reconnect_attempted.swap(true, Ordering::SeqCst) {
            return false;
        }
        if !self.inner.store.was_connected().await {
            return false;
        }
        if let Err(e) = self.provider().await {
            log::warn!("session::init: skipping auto-reconnect: {e}");
            return false;
        }

        log::info!("session::init: reconnecting previous session");
        match self.connect().await {
            Ok(()) => self.snapshot().connected,
            Err(e) => {
                log::warn!("session::init: auto-reconnect failed: {e}");
                false
            }
        }
    }

    /// Requests accounts from the wallet and starts balance polling.
    ///
    /// A call made while another connect is in flight returns `Ok(())` without doing anything.
    /// If `disconnect` runs before the wallet answers, the answer is discarded and the session
    /// stays disconnected.
    ///
    /// # Errors
    /// * If the provider cannot be created
    /// * If the user rejects the authorization
    /// * If the returned accounts are unusable
    pub async fn connect(&self) -> Result<(), WalletError> {
        if self.inner.connecting.swap(true, Ordering::SeqCst) {
            log::debug!("session::connect: already in progress");
            return Ok(());
        }
        let _guard = ConnectGuard(&self.inner.connecting);
        let epoch = self.inner.epoch.load(Ordering::SeqCst);

        self.inner.state.send_modify(|s| {
            s.loading = true;
            s.last_error = None;
        });

        let authorized = match self.provider().await {
            Ok(provider) => provider.request_accounts().await.and_then(|addresses| {
                Accounts::from_authorization(&addresses, self.inner.settings.require_sub_account)
            }),
            Err(e) => Err(e),
        };

        if self.disconnected_since(epoch) {
            log::info!("session::connect: disconnected while authorizing, dropping {authorized:?}");
            return Ok(());
        }

        match authorized {
            Ok(accounts) => {
                let display_name = generate_display_name();
                log::info!(
                    "session::connect: connected {} (sub account {:?}) as {display_name}",
                    accounts.universal,
                    accounts.sub_account
                );
                self.inner.state.send_modify(|s| {
                    s.connected = true;
                    s.universal_address = Some(accounts.universal);
                    s.sub_account_address = accounts.sub_account;
                    s.display_name = display_name;
                    s.usdc_balance = None;
                    s.loading = false;
                });
                self.inner.store.mark_connected().await;

                self.fetch_balance().await;
                if !self.disconnected_since(epoch) {
                    self.start_balance_polling().await;
                }
                Ok(())
            }
            Err(e) => {
                log::error!("session::connect: {e}");
                self.inner.store.clear().await;
                self.inner.state.send_modify(|s| {
                    s.loading = false;
                    s.last_error = Some(e.user_message());
                });
                Err(e)
            }
        }
    }

    /// Clears the session and the reconnect flag. Makes no network calls.
    pub async fn disconnect(&self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(poller) = self.inner.balance_poller.lock().await.take() {
            poller.stop();
        }
        self.inner.state.send_replace(Session::default());
        self.inner.store.clear().await;
        log::info!("session::disconnect: disconnected");
    }

    /// Stops background work without forgetting the persisted flag.
    pub async fn teardown(&self) {
        if let Some(poller) = self.inner.balance_poller.lock().await.take() {
            poller.stop();
        }
    }

    /// Reads the token balance of the universal account. Never fails.
    ///
    /// Errors are logged and reported as `"0.00"`.
    pub async fn fetch_balance(&self) -> String {
        let Some(universal) = self.snapshot().universal_address else {
            return ZERO_BALANCE.to_string();
        };
        let Some(provider) = self.inner.provider.lock().await.clone() else {
            return ZERO_BALANCE.to_string();
        };

        let balance = match self.read_balance(provider.as_ref(), universal).await {
            Ok(balance) => format_token_amount(balance),
            Err(e) => {
                log::warn!("session::fetch_balance: {universal}: {e}");
                ZERO_BALANCE.to_string()
            }
        };

        // The session may have changed while the read was in flight
        self.inner.state.send_if_modified(|s| {
            if s.connected && s.universal_address == Some(universal) {
                s.usdc_balance = Some(balance.clone());
                true
            } else {
                false
            }
        });

        balance
    }

    /// Submits `calls` as one batch from the sub account.
    ///
    /// # Errors
    /// * `NotConnected` if there is no sub account or provider; nothing is sent
    /// * Whatever the provider reports; there is no retry
    pub async fn send_calls(&self, calls: Vec<Call>) -> Result<String, WalletError> {
        let from = self
            .snapshot()
            .sub_account_address
            .ok_or(WalletError::NotConnected)?;
        let provider = self
            .inner
            .provider
            .lock()
            .await
            .clone()
            .ok_or(WalletError::NotConnected)?;

        let request = SendCallsRequest {
            from,
            chain_id: self.inner.settings.chain_id,
            calls,
        };

        log::info!(
            "session::send_calls: submitting {} calls from {from}",
            request.calls.len()
        );
        let batch_id = provider.send_calls(request).await.inspect_err(|e| {
            log::warn!("session::send_calls: {e}");
        })?;
        log::info!("session::send_calls: batch {batch_id}");

        Ok(batch_id)
    }

    /// # Errors
    /// * `ProviderUnavailable` if no provider was ever created
    /// * Whatever the provider reports
    pub async fn get_calls_status(&self, batch_id: &str) -> Result<CallsStatus, WalletError> {
        let provider = self.inner.provider.lock().await.clone().ok_or_else(|| {
            WalletError::ProviderUnavailable("wallet provider not initialized".to_string())
        })?;
        provider.get_calls_status(batch_id).await
    }

    /// The wallet provider, created on first use.
    ///
    /// # Errors
    /// * If the factory fails
    pub async fn provider(&self) -> Result<Arc<dyn WalletProvider>, WalletError> {
        let mut slot = self.inner.provider.lock().await;
        if let Some(provider) = slot.as_ref() {
            return Ok(provider.clone());
        }

        let provider = (self.inner.factory)().inspect_err(|e| {
            log::error!("session::provider: {e}");
        })?;
        *slot = Some(provider.clone());
        Ok(provider)
    }

    async fn read_balance(
        &self,
        provider: &dyn WalletProvider,
        owner: Address,
    ) -> Result<U256, WalletError> {
        let raw = provider
            .eth_call(self.inner.settings.token, balance_of_calldata(owner))
            .await?;
        decode_balance(&raw)
    }

    fn disconnected_since(&self, epoch: u64) -> bool {
        self.inner.epoch.load(Ordering::SeqCst) != epoch
    }

    fn should_poll(&self) -> bool {
        let state = self.inner.state.borrow();
        state.connected && state.universal_address.is_some()
    }

    async fn start_balance_polling(&self) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let interval = self.inner.settings.balance_interval;

        let poller = spawn_poller(interval, move |_| {
            let weak = weak.clone();
            async move {
                let Some(inner) = weak.upgrade() else {
                    return Tick::Stop;
                };
                let session = WalletSession { inner };
                if !session.should_poll() {
                    return Tick::Stop;
                }
                session.fetch_balance().await;
                Tick::Continue(interval)
            }
        });

        // Replacing drops and stops any previous poller
        let previous = self.inner.balance_poller.lock().await.replace(poller);
        if let Some(previous) = previous {
            previous.stop();
        }
    }
}

fn generate_display_name() -> String {
    const ADJECTIVES: [&str; 8] = [
        "Quiet", "Brave", "Curious", "Gentle", "Lucky", "Swift", "Witty", "Cosmic",
    ];
    const ANIMALS: [&str; 8] = [
        "Otter", "Falcon", "Panda", "Fox", "Heron", "Lynx", "Koala", "Owl",
    ];

    format!(
        "{}{}{}",
        ADJECTIVES[fastrand::usize(..ADJECTIVES.len())],
        ANIMALS[fastrand::usize(..ANIMALS.len())],
        fastrand::u16(100..1000)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{sub, universal, MockProvider};
    use alloy::primitives::Bytes;

    fn settings() -> SessionSettings {
        SessionSettings {
            chain_id: 84532,
            token: Address::with_last_byte(0xcc),
            balance_interval: BALANCE_POLL_INTERVAL,
            require_sub_account: false,
        }
    }

    fn session_with(provider: Arc<MockProvider>, store: Arc<MemoryStore>) -> WalletSession {
        let factory: ProviderFactory =
            Box::new(move || Ok(provider.clone() as Arc<dyn WalletProvider>));
        WalletSession::new(settings(), factory, store)
    }

    #[test]
    fn test_accounts_from_authorization() {
        let pair = Accounts::from_authorization(&[sub(1), universal(1)], false).unwrap();
        assert_eq!(pair.sub_account, Some(sub(1)));
        assert_eq!(pair.universal, universal(1));

        let degraded = Accounts::from_authorization(&[universal(1)], false).unwrap();
        assert_eq!(degraded.sub_account, None);
        assert_eq!(degraded.universal, universal(1));

        assert_eq!(
            Accounts::from_authorization(&[], false),
            Err(WalletError::NoAccounts)
        );
        assert!(matches!(
            Accounts::from_authorization(&[universal(1)], true),
            Err(WalletError::AmbiguousAccounts(_))
        ));
        assert!(matches!(
            Accounts::from_authorization(&[sub(1), sub(1)], false),
            Err(WalletError::AmbiguousAccounts(_))
        ));
    }

    #[test]
    fn test_display_name() {
        let name = generate_display_name();
        assert!(name.len() > 6);
        assert!(name.chars().last().unwrap().is_ascii_digit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_populates_both_addresses() {
        let provider = Arc::new(MockProvider::with_accounts(vec![sub(1), universal(1)]));
        provider.set_balance(U256::from(150_000u64));
        let store = Arc::new(MemoryStore::default());
        let session = session_with(provider.clone(), store.clone());

        session.connect().await.unwrap();

        let state = session.snapshot();
        assert!(state.connected);
        assert_eq!(state.sub_account_address, Some(sub(1)));
        assert_eq!(state.universal_address, Some(universal(1)));
        assert!(!state.display_name.is_empty());
        assert!(!state.loading);
        // balance is fetched right away, not after the first interval
        assert_eq!(state.usdc_balance.as_deref(), Some("0.15"));
        assert!(store.was_connected().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_failure_clears_flag() {
        let provider = Arc::new(MockProvider::with_accounts(vec![]));
        provider.fail_accounts(WalletError::UserRejected);
        let store = Arc::new(MemoryStore::with_flag(true));
        let session = session_with(provider, store.clone());

        assert_eq!(session.connect().await, Err(WalletError::UserRejected));

        let state = session.snapshot();
        assert!(!state.connected);
        assert_eq!(state.universal_address, None);
        assert_eq!(state.last_error.as_deref(), Some("Request cancelled in wallet."));
        assert!(!store.was_connected().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_is_not_reentrant() {
        let provider = Arc::new(MockProvider::with_accounts(vec![sub(1), universal(1)]));
        provider.set_accounts_delay(Duration::from_secs(1));
        let session = session_with(provider.clone(), Arc::new(MemoryStore::default()));

        let (first, second) = tokio::join!(session.connect(), session.connect());
        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(provider.request_accounts_count(), 1);

        // the guard is released afterwards
        session.connect().await.unwrap();
        assert_eq!(provider.request_accounts_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_uses_latest_addresses() {
        let provider = Arc::new(MockProvider::with_accounts(vec![sub(1), universal(1)]));
        let session = session_with(provider.clone(), Arc::new(MemoryStore::default()));

        session.connect().await.unwrap();
        session.disconnect().await;
        assert_eq!(session.snapshot(), Session::default());

        provider.set_accounts(vec![universal(2)]);
        session.connect().await.unwrap();

        let state = session.snapshot();
        assert_eq!(state.universal_address, Some(universal(2)));
        // nothing from the first session leaks through
        assert_eq!(state.sub_account_address, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_during_authorization_wins() {
        let provider = Arc::new(MockProvider::with_accounts(vec![sub(1), universal(1)]));
        provider.set_accounts_delay(Duration::from_secs(1));
        let store = Arc::new(MemoryStore::with_flag(true));
        let session = session_with(provider.clone(), store.clone());

        let connecting = tokio::spawn({
            let session = session.clone();
            async move { session.connect().await }
        });
        tokio::time::sleep(Duration::from_millis(500)).await;
        session.disconnect().await;

        assert!(connecting.await.unwrap().is_ok());
        assert_eq!(provider.request_accounts_count(), 1);
        assert_eq!(session.snapshot(), Session::default());
        assert!(!store.was_connected().await);

        // no balance read and no poller left behind
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(provider.eth_call_count(), 0);
        assert!(!session.snapshot().connected);

        // a later connect works normally
        session.connect().await.unwrap();
        assert!(session.snapshot().connected);
        assert!(store.was_connected().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_is_idempotent() {
        let provider = Arc::new(MockProvider::with_accounts(vec![sub(1), universal(1)]));
        let store = Arc::new(MemoryStore::default());
        let session = session_with(provider.clone(), store.clone());

        session.disconnect().await;
        session.connect().await.unwrap();
        session.disconnect().await;
        session.disconnect().await;

        assert_eq!(session.snapshot(), Session::default());
        assert!(!store.was_connected().await);
        assert_eq!(provider.request_accounts_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_balance_swallows_errors() {
        let provider = Arc::new(MockProvider::with_accounts(vec![sub(1), universal(1)]));
        let session = session_with(provider.clone(), Arc::new(MemoryStore::default()));

        // not connected: zero without touching the provider
        assert_eq!(session.fetch_balance().await, "0.00");
        assert_eq!(provider.eth_call_count(), 0);

        session.connect().await.unwrap();
        provider.fail_balance(WalletError::Read("node down".to_string()));
        assert_eq!(session.fetch_balance().await, "0.00");
        assert_eq!(session.snapshot().usdc_balance.as_deref(), Some("0.00"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_balance_polling_follows_connection() {
        let provider = Arc::new(MockProvider::with_accounts(vec![sub(1), universal(1)]));
        let session = session_with(provider.clone(), Arc::new(MemoryStore::default()));

        session.connect().await.unwrap();
        assert_eq!(provider.eth_call_count(), 1);

        provider.set_balance(U256::from(100_000_000u64));
        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(provider.eth_call_count(), 3);
        assert_eq!(session.snapshot().usdc_balance.as_deref(), Some("100.00"));

        session.disconnect().await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(provider.eth_call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_does_not_double_poll() {
        let provider = Arc::new(MockProvider::with_accounts(vec![sub(1), universal(1)]));
        let session = session_with(provider.clone(), Arc::new(MemoryStore::default()));

        session.connect().await.unwrap();
        session.connect().await.unwrap();
        assert_eq!(provider.eth_call_count(), 2);

        tokio::time::sleep(Duration::from_secs(15)).await;
        // one poller, one tick
        assert_eq!(provider.eth_call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_calls_requires_sub_account() {
        let provider = Arc::new(MockProvider::with_accounts(vec![universal(1)]));
        let session = session_with(provider.clone(), Arc::new(MemoryStore::default()));

        let call = Call::new(Address::with_last_byte(7), Bytes::new());
        assert_eq!(
            session.send_calls(vec![call.clone()]).await,
            Err(WalletError::NotConnected)
        );

        // degraded connect: still no sub account
        session.connect().await.unwrap();
        assert_eq!(
            session.send_calls(vec![call]).await,
            Err(WalletError::NotConnected)
        );
        assert!(provider.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_calls_preserves_order() {
        let provider = Arc::new(MockProvider::with_accounts(vec![sub(1), universal(1)]));
        let session = session_with(provider.clone(), Arc::new(MemoryStore::default()));
        session.connect().await.unwrap();

        let approve = Call::new(Address::with_last_byte(0xcc), Bytes::from(vec![1]));
        let post = Call::new(Address::with_last_byte(0xdd), Bytes::from(vec![2]));
        let batch_id = session
            .send_calls(vec![approve.clone(), post.clone()])
            .await
            .unwrap();
        assert_eq!(batch_id, "batch-1");

        let sent = provider.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, sub(1));
        assert_eq!(sent[0].chain_id, 84532);
        assert_eq!(sent[0].calls, vec![approve, post]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_calls_propagates_rejection() {
        let provider = Arc::new(MockProvider::with_accounts(vec![sub(1), universal(1)]));
        let session = session_with(provider.clone(), Arc::new(MemoryStore::default()));
        session.connect().await.unwrap();

        provider.fail_send(WalletError::InsufficientBalance);
        let call = Call::new(Address::with_last_byte(7), Bytes::new());
        assert_eq!(
            session.send_calls(vec![call]).await,
            Err(WalletError::InsufficientBalance)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_calls_status_without_provider() {
        let provider = Arc::new(MockProvider::with_accounts(vec![sub(1), universal(1)]));
        let session = session_with(provider, Arc::new(MemoryStore::default()));
        assert!(matches!(
            session.get_calls_status("batch-1").await,
            Err(WalletError::ProviderUnavailable(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_reconnect_needs_flag() {
        let provider = Arc::new(MockProvider::with_accounts(vec![sub(1), universal(1)]));
        let session = session_with(provider.clone(), Arc::new(MemoryStore::default()));

        assert!(!session.init().await);
        assert_eq!(provider.request_accounts_count(), 0);
        assert!(!session.snapshot().connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_reconnect_runs_once() {
        let provider = Arc::new(MockProvider::with_accounts(vec![sub(1), universal(1)]));
        let session = session_with(provider.clone(), Arc::new(MemoryStore::with_flag(true)));

        assert!(session.init().await);
        assert!(!session.init().await);
        assert_eq!(provider.request_accounts_count(), 1);
        assert!(session.snapshot().connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_reconnect_without_provider() {
        let factory: ProviderFactory =
            Box::new(|| Err(WalletError::ProviderUnavailable("no wallet".to_string())));
        let store = Arc::new(MemoryStore::with_flag(true));
        let session = WalletSession::new(settings(), factory, store);

        assert!(!session.init().await);
        assert!(matches!(
            session.connect().await,
            Err(WalletError::ProviderUnavailable(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_sees_connect() {
        let provider = Arc::new(MockProvider::with_accounts(vec![sub(1), universal(1)]));
        let session = session_with(provider, Arc::new(MemoryStore::default()));
        let mut rx = session.subscribe();

        session.connect().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().connected);
    }
}
