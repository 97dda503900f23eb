//! Deposit detection for the funding flow.
//!
//! A watch polls the token balance of one address until it rises at least `min_delta` above
//! the baseline, reports the deposit once and stops for good. Failed reads are reported and
//! retried after a longer backoff; the watch never gives up on its own.
use crate::errors::WalletError;
use crate::poll::{spawn_poller, PollHandle, Tick};
use crate::reader::BalanceReader;
use crate::units::{format_token_amount, MIN_DEPOSIT};
use alloy::primitives::{Address, U256};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub const DEPOSIT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEPOSIT_ERROR_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositStatus {
    Waiting,
    /// Terminal
    Detected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositWatch {
    pub target_address: Address,
    pub baseline_balance: U256,
    pub status: DepositStatus,
    pub detected_delta: Option<U256>,
}

/// Reported once per watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositDetected {
    pub token: Address,
    /// Increase over the baseline, formatted
    pub amount: String,
    /// Balance after the deposit, formatted
    pub new_balance: String,
    pub delta: U256,
    pub balance: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositSettings {
    pub poll_interval: Duration,
    pub error_backoff: Duration,
    /// Smallest increase that counts; values below 1 are treated as 1
    pub min_delta: U256,
}

impl Default for DepositSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEPOSIT_POLL_INTERVAL,
            error_backoff: DEPOSIT_ERROR_BACKOFF,
            min_delta: MIN_DEPOSIT,
        }
    }
}

#[derive(Clone)]
pub struct DepositMonitor {
    reader: Arc<dyn BalanceReader>,
    token: Address,
    settings: DepositSettings,
}

impl DepositMonitor {
    pub fn new(reader: Arc<dyn BalanceReader>, token: Address) -> Self {
        Self::with_settings(reader, token, DepositSettings::default())
    }

    pub fn with_settings(
        reader: Arc<dyn BalanceReader>,
        token: Address,
        settings: DepositSettings,
    ) -> Self {
        Self {
            reader,
            token,
            settings,
        }
    }

    /// Starts watching `address`. Dropping the returned handle stops the watch.
    ///
    /// Must be called from within a tokio runtime.
    pub fn watch<D, E>(
        &self,
        address: Address,
        baseline: U256,
        on_detected: D,
        on_error: E,
    ) -> DepositWatchHandle
    where
        D: FnOnce(DepositDetected) + Send + 'static,
        E: FnMut(&WalletError) + Send + 'static,
    {
        let state = Arc::new(Mutex::new(DepositWatch {
            target_address: address,
            baseline_balance: baseline,
            status: DepositStatus::Waiting,
            detected_delta: None,
        }));
        let on_detected = Arc::new(Mutex::new(Some(on_detected)));
        let on_error = Arc::new(Mutex::new(on_error));

        let reader = self.reader.clone();
        let token = self.token;
        let settings = self.settings;
        let min_delta = settings.min_delta.max(U256::from(1u64));
        let watch = state.clone();

        log::info!(
            "deposit::watch: watching {address} from baseline {}",
            format_token_amount(baseline)
        );

        let poller = spawn_poller(settings.poll_interval, move |flag| {
            let reader = reader.clone();
            let watch = watch.clone();
            let on_detected = on_detected.clone();
            let on_error = on_error.clone();

            async move {
                let read = reader.token_balance(token, address).await;
                if !flag.is_active() {
                    return Tick::Stop;
                }

                let current = match read {
                    Ok(current) => current,
                    Err(e) => {
                        log::warn!("deposit::watch: {address}: {e}");
                        let mut on_error = on_error.lock().unwrap_or_else(PoisonError::into_inner);
                        (*on_error)(&e);
                        return Tick::Continue(settings.error_backoff);
                    }
                };

                let delta = current.saturating_sub(baseline);
                if delta < min_delta {
                    return Tick::Continue(settings.poll_interval);
                }

                {
                    let mut watch = watch.lock().unwrap_or_else(PoisonError::into_inner);
                    watch.status = DepositStatus::Detected;
                    watch.detected_delta = Some(delta);
                }

                let detected = DepositDetected {
                    token,
                    amount: format_token_amount(delta),
                    new_balance: format_token_amount(current),
                    delta,
                    balance: current,
                };
                log::info!(
                    "deposit::watch: {address} received {} (balance {})",
                    detected.amount,
                    detected.new_balance
                );

                let callback = on_detected
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
                if let Some(callback) = callback {
                    callback(detected);
                }
                Tick::Stop
            }
        });

        DepositWatchHandle { poller, state }
    }
}

/// Starts a watch with the default settings.
///
/// Must be called from within a tokio runtime.
pub fn monitor_deposit<D, E>(
    address: Address,
    baseline: U256,
    on_detected: D,
    on_error: E,
    reader: Arc<dyn BalanceReader>,
    token: Address,
) -> DepositWatchHandle
where
    D: FnOnce(DepositDetected) + Send + 'static,
    E: FnMut(&WalletError) + Send + 'static,
{
    DepositMonitor::new(reader, token).watch(address, baseline, on_detected, on_error)
}

#[derive(Debug)]
pub struct DepositWatchHandle {
    poller: PollHandle,
    state: Arc<Mutex<DepositWatch>>,
}

impl DepositWatchHandle {
    /// Best-effort; an in-flight read finishes but reports nothing.
    pub fn stop(&self) {
        self.poller.stop();
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.poller.is_active()
    }

    #[must_use]
    pub fn snapshot(&self) -> DepositWatch {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn status(&self) -> DepositStatus {
        self.snapshot().status
    }

    #[must_use]
    pub fn detected_delta(&self) -> Option<U256> {
        self.snapshot().detected_delta
    }
}
