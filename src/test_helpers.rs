use crate::errors::WalletError;
use crate::provider::{BatchState, CallsStatus, SendCallsRequest, WalletProvider};
use crate::reader::BalanceReader;
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolValue;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn sub(n: u8) -> Address {
    Address::with_last_byte(0x10 + n)
}

pub fn universal(n: u8) -> Address {
    Address::with_last_byte(0x20 + n)
}

pub fn pending() -> CallsStatus {
    CallsStatus {
        state: BatchState::Pending,
        receipts: vec![],
    }
}

pub fn finished(state: BatchState) -> CallsStatus {
    CallsStatus {
        state,
        receipts: vec![],
    }
}

/// Scripted wallet provider that records what it was asked to do.
#[derive(Debug)]
pub struct MockProvider {
    accounts: Mutex<Result<Vec<Address>, WalletError>>,
    accounts_delay: Mutex<Duration>,
    balance: Mutex<Result<U256, WalletError>>,
    send_error: Mutex<Option<WalletError>>,
    statuses: Mutex<VecDeque<Result<CallsStatus, WalletError>>>,
    sent: Mutex<Vec<SendCallsRequest>>,
    request_accounts_calls: AtomicUsize,
    eth_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl MockProvider {
    pub fn with_accounts(accounts: Vec<Address>) -> Self {
        Self {
            accounts: Mutex::new(Ok(accounts)),
            accounts_delay: Mutex::new(Duration::ZERO),
            balance: Mutex::new(Ok(U256::ZERO)),
            send_error: Mutex::new(None),
            statuses: Mutex::new(VecDeque::new()),
            sent: Mutex::new(vec![]),
            request_accounts_calls: AtomicUsize::new(0),
            eth_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock().unwrap() = Ok(accounts);
    }

    pub fn fail_accounts(&self, error: WalletError) {
        *self.accounts.lock().unwrap() = Err(error);
    }

    pub fn set_accounts_delay(&self, delay: Duration) {
        *self.accounts_delay.lock().unwrap() = delay;
    }

    pub fn set_balance(&self, balance: U256) {
        *self.balance.lock().unwrap() = Ok(balance);
    }

    pub fn fail_balance(&self, error: WalletError) {
        *self.balance.lock().unwrap() = Err(error);
    }

    pub fn fail_send(&self, error: WalletError) {
        *self.send_error.lock().unwrap() = Some(error);
    }

    /// Statuses returned in order; the last one repeats.
    pub fn push_status(&self, status: Result<CallsStatus, WalletError>) {
        self.statuses.lock().unwrap().push_back(status);
    }

    pub fn sent(&self) -> Vec<SendCallsRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn request_accounts_count(&self) -> usize {
        self.request_accounts_calls.load(Ordering::SeqCst)
    }

    pub fn eth_call_count(&self) -> usize {
        self.eth_calls.load(Ordering::SeqCst)
    }

    pub fn status_count(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.request_accounts_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.accounts_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.accounts.lock().unwrap().clone()
    }

    async fn eth_call(&self, _to: Address, _data: Bytes) -> Result<Bytes, WalletError> {
        self.eth_calls.fetch_add(1, Ordering::SeqCst);
        let balance = self.balance.lock().unwrap().clone()?;
        Ok(balance.abi_encode().into())
    }

    async fn send_calls(&self, request: SendCallsRequest) -> Result<String, WalletError> {
        if let Some(error) = self.send_error.lock().unwrap().clone() {
            return Err(error);
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(request);
        Ok(format!("batch-{}", sent.len()))
    }

    async fn get_calls_status(&self, _batch_id: &str) -> Result<CallsStatus, WalletError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.len() > 1 {
            statuses.pop_front().unwrap()
        } else {
            statuses.front().cloned().unwrap_or_else(|| Ok(pending()))
        }
    }
}

/// Balance reader that walks through a script of results; the last one repeats.
#[derive(Debug)]
pub struct MockReader {
    script: Mutex<VecDeque<Result<U256, WalletError>>>,
    reads: AtomicUsize,
}

impl MockReader {
    pub fn new(script: Vec<Result<U256, WalletError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BalanceReader for MockReader {
    async fn token_balance(&self, _token: Address, _owner: Address) -> Result<U256, WalletError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap_or(Ok(U256::ZERO))
        }
    }
}
