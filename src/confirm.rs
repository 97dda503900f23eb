//! Waiting for a submitted batch to land, with a fixed attempt ceiling.
use crate::errors::WalletError;
use crate::provider::{BatchState, CallsStatus, WalletProvider};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmSettings {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for ConfirmSettings {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(2),
        }
    }
}

/// Polls `wallet_getCallsStatus` until the batch is final.
///
/// Status lookups that fail are logged and count as an attempt.
///
/// # Errors
/// * `Reverted` if the batch failed or reverted, fully or partially
/// * `Timeout` after `max_attempts` lookups without a final status
/// * Any non-transient provider error, immediately
pub async fn wait_for_calls(
    provider: &dyn WalletProvider,
    batch_id: &str,
    settings: ConfirmSettings,
) -> Result<CallsStatus, WalletError> {
    for attempt in 1..=settings.max_attempts {
        match provider.get_calls_status(batch_id).await {
            Ok(status) => match status.state {
                BatchState::Confirmed => {
                    log::info!("confirm: batch {batch_id} confirmed after {attempt} attempts");
                    return Ok(status);
                }
                BatchState::Pending => {
                    log::debug!(
                        "confirm: batch {batch_id} pending ({attempt}/{})",
                        settings.max_attempts
                    );
                }
                state => {
                    log::warn!("confirm: batch {batch_id} {state}");
                    return Err(WalletError::Reverted(format!("batch {batch_id} {state}")));
                }
            },
            Err(e) if e.is_transient() => {
                log::warn!("confirm: status lookup for {batch_id} failed: {e}");
            }
            Err(e) => return Err(e),
        }

        if attempt < settings.max_attempts {
            tokio::time::sleep(settings.interval).await;
        }
    }

    Err(WalletError::Timeout {
        attempts: settings.max_attempts,
    })
}
