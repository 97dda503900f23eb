use super::{BatchState, CallReceipt, CallsStatus, SendCallsRequest, WalletProvider};
use crate::errors::WalletError;
use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Version of the `wallet_sendCalls` payload we emit.
const SEND_CALLS_VERSION: &str = "2.0.0";

/// Wallet provider reached over JSON-RPC 2.0 on HTTP.
#[derive(Debug)]
pub struct RpcWalletProvider {
    url: String,
    client: Client,
    next_id: AtomicU64,
}

impl RpcWalletProvider {
    /// # Errors
    /// * If the HTTP client cannot be built
    pub fn new(url: &str) -> Result<Self, WalletError> {
        // Authorization prompts can sit on screen for a while
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| WalletError::ProviderUnavailable(e.to_string()))?;

        Ok(Self {
            url: url.to_string(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        log::debug!("provider::rpc: -> {method} #{id}");

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| WalletError::ProviderUnavailable(e.to_string()))?
            .json::<Value>()
            .await
            .map_err(|e| WalletError::ProviderUnavailable(e.to_string()))?;

        rpc_result(response)
    }
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        let result = self.request("eth_requestAccounts", json!([])).await?;
        parse_accounts(&result)
    }

    async fn eth_call(&self, to: Address, data: Bytes) -> Result<Bytes, WalletError> {
        let params = json!([
            { "to": to.to_string(), "data": format!("0x{}", hex::encode(&data)) },
            "latest"
        ]);
        let result = self
            .request("eth_call", params)
            .await
            .map_err(|e| match e {
                WalletError::Rpc { message, .. } => WalletError::Read(message),
                other => other,
            })?;
        parse_bytes(&result)
    }

    async fn send_calls(&self, request: SendCallsRequest) -> Result<String, WalletError> {
        let result = self
            .request("wallet_sendCalls", send_calls_params(&request))
            .await?;
        parse_batch_id(&result)
    }

    async fn get_calls_status(&self, batch_id: &str) -> Result<CallsStatus, WalletError> {
        let result = self
            .request("wallet_getCallsStatus", json!([batch_id]))
            .await?;
        parse_calls_status(&result)
    }
}

fn malformed(what: &str, value: &Value) -> WalletError {
    WalletError::Rpc {
        code: -32603,
        message: format!("malformed {what}: {value}"),
    }
}

fn rpc_result(mut response: Value) -> Result<Value, WalletError> {
    if let Some(error) = response.get("error").filter(|error| !error.is_null()) {
        let code = error["code"].as_i64().unwrap_or(-32603);
        let message = error["message"].as_str().unwrap_or("unknown error");
        return Err(WalletError::from_rpc(code, message));
    }

    match response.get_mut("result").map(Value::take) {
        Some(result) => Ok(result),
        None => Err(malformed("response", &response)),
    }
}

fn send_calls_params(request: &SendCallsRequest) -> Value {
    let calls: Vec<Value> = request
        .calls
        .iter()
        .map(|call| {
            let mut entry = json!({ "to": call.to.to_string() });
            if let Some(data) = &call.data {
                entry["data"] = json!(format!("0x{}", hex::encode(data)));
            }
            if let Some(value) = call.value {
                entry["value"] = json!(format!("{value:#x}"));
            }
            entry
        })
        .collect();

    json!([{
        "version": SEND_CALLS_VERSION,
        "chainId": format!("{:#x}", request.chain_id),
        "from": request.from.to_string(),
        "atomicRequired": true,
        "calls": calls,
    }])
}

fn parse_accounts(result: &Value) -> Result<Vec<Address>, WalletError> {
    let Some(entries) = result.as_array() else {
        return Err(malformed("accounts", result));
    };

    entries
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .and_then(|s| Address::from_str(s).ok())
                .ok_or_else(|| malformed("account", entry))
        })
        .collect()
}

fn parse_bytes(result: &Value) -> Result<Bytes, WalletError> {
    let Some(raw) = result.as_str() else {
        return Err(WalletError::Read(format!("malformed call result: {result}")));
    };
    hex::decode(raw.trim_start_matches("0x"))
        .map(Bytes::from)
        .map_err(|e| WalletError::Read(format!("malformed call result: {e}")))
}

/// Batch ids come back either bare or as `{ "id": ... }` depending on the wallet version.
fn parse_batch_id(result: &Value) -> Result<String, WalletError> {
    result
        .as_str()
        .or_else(|| result.get("id").and_then(Value::as_str))
        .map(ToString::to_string)
        .ok_or_else(|| malformed("batch id", result))
}

fn parse_calls_status(result: &Value) -> Result<CallsStatus, WalletError> {
    let state = match &result["status"] {
        Value::Number(code) => code.as_u64().map(BatchState::from_code),
        Value::String(label) => Some(BatchState::from_label(label)),
        _ => None,
    }
    .ok_or_else(|| malformed("calls status", result))?;

    let receipts = result["receipts"]
        .as_array()
        .map(|receipts| {
            receipts
                .iter()
                .map(|receipt| CallReceipt {
                    transaction_hash: receipt["transactionHash"]
                        .as_str()
                        .and_then(|h| B256::from_str(h).ok()),
                    success: matches!(receipt["status"].as_str(), Some("0x1" | "success")),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(CallsStatus { state, receipts })
}
