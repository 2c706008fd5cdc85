//! EIP-1193 bindings for the wallet injected at `window.ethereum`.

use crate::{
    error::ProviderError,
    token::{transfer_calldata, transfer_topic, TransferEvent},
    wallet::{
        PendingTransfer, Signer, Subscription, TokenContract, TransferHandler, WalletProvider,
    },
};
use alloy_primitives::{Address, Bytes, TxHash, B256, U256, U64};
use async_trait::async_trait;
use gloo_timers::future::TimeoutFuture;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{cell::Cell, rc::Rc};
use wasm_bindgen::{JsCast, JsValue};

/// EIP-1193 code for a request the user declined.
const USER_REJECTED: i64 = 4001;

const NO_PARAMS: [(); 0] = [];

#[derive(Debug, Serialize)]
struct RpcRequest<'a, P: Serialize> {
    method: &'a str,
    params: P,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionRequest {
    from: Address,
    to: Address,
    data: Bytes,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LogFilter {
    address: Address,
    /// `None` matches any value in that position.
    topics: Vec<Option<B256>>,
    from_block: U64,
    to_block: U64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    topics: Vec<B256>,
    data: Bytes,
    block_number: Option<U64>,
    log_index: Option<U64>,
    transaction_hash: Option<TxHash>,
    #[serde(default)]
    removed: bool,
}

#[derive(Debug, Deserialize)]
struct RpcReceipt {
    status: Option<U64>,
}

/// Handle on the injected provider object.
#[derive(Clone)]
pub struct InjectedProvider {
    ethereum: JsValue,
    poll_interval_ms: u32,
}

impl InjectedProvider {
    /// `None` when no wallet extension injected `window.ethereum`.
    pub fn detect(poll_interval_ms: u32) -> Option<InjectedProvider> {
        let window = web_sys::window()?;
        let ethereum = js_sys::Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            log::warn!("window.ethereum not found");
            return None;
        }
        Some(InjectedProvider {
            ethereum,
            poll_interval_ms,
        })
    }

    async fn request<P, R>(&self, method: &str, params: P) -> Result<R, ProviderError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let request_fn: js_sys::Function =
            js_sys::Reflect::get(&self.ethereum, &JsValue::from_str("request"))
                .map_err(js_error)?
                .dyn_into()
                .map_err(|_| ProviderError::Js("ethereum.request is not a function".to_string()))?;

        let args = serde_wasm_bindgen::to_value(&RpcRequest { method, params })
            .map_err(|e| ProviderError::Js(e.to_string()))?;
        let resp = request_fn.call1(&self.ethereum, &args).map_err(js_error)?;
        let promise = js_sys::Promise::resolve(&resp);
        let result = wasm_bindgen_futures::JsFuture::from(promise)
            .await
            .map_err(rpc_error)?;
        log::debug!("{} -> {:?}", method, result);

        serde_wasm_bindgen::from_value(result).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    async fn block_number(&self) -> Result<u64, ProviderError> {
        let number: U64 = self.request("eth_blockNumber", NO_PARAMS).await?;
        Ok(number.to::<u64>())
    }

    /// Transfers of `token` from or to `account` in blocks `from..=to`, in chain order.
    async fn transfer_events(
        &self,
        token: Address,
        account: Address,
        from: u64,
        to: u64,
    ) -> Result<Vec<TransferEvent>, ProviderError> {
        let [sent, received] = account_filters(token, account, from, to);
        let sent: Vec<RpcLog> = self.request("eth_getLogs", [sent]).await?;
        let received: Vec<RpcLog> = self.request("eth_getLogs", [received]).await?;
        Ok(merge_logs(sent, received)
            .into_iter()
            .filter_map(|log| TransferEvent::from_log(log.topics, log.data, log.transaction_hash))
            .collect())
    }
}

/// Topic filters for transfers sent by and received by `account`. A node ORs values within
/// a topic position but not across positions, so the two directions need separate queries.
fn account_filters(token: Address, account: Address, from: u64, to: u64) -> [LogFilter; 2] {
    let filter = |topics| LogFilter {
        address: token,
        topics,
        from_block: U64::from(from),
        to_block: U64::from(to),
    };
    let account = account.into_word();
    [
        filter(vec![Some(transfer_topic()), Some(account)]),
        filter(vec![Some(transfer_topic()), None, Some(account)]),
    ]
}

/// Merges both directions into chain order, dropping removed logs and the duplicate a
/// self-transfer produces.
fn merge_logs(sent: Vec<RpcLog>, received: Vec<RpcLog>) -> Vec<RpcLog> {
    let mut logs: Vec<RpcLog> = sent
        .into_iter()
        .chain(received)
        .filter(|log| !log.removed)
        .collect();
    logs.sort_by_key(|log| (log.block_number, log.log_index));
    logs.dedup_by_key(|log| (log.block_number, log.log_index, log.transaction_hash));
    logs
}

#[async_trait(?Send)]
impl WalletProvider for InjectedProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.request("eth_requestAccounts", NO_PARAMS).await
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        let chain_id: U64 = self.request("eth_chainId", NO_PARAMS).await?;
        Ok(chain_id.to::<u64>())
    }

    async fn signer(&self) -> Result<Rc<dyn Signer>, ProviderError> {
        let accounts: Vec<Address> = self.request("eth_accounts", NO_PARAMS).await?;
        let account = accounts
            .first()
            .copied()
            .ok_or_else(|| ProviderError::Decode("wallet exposed no accounts".to_string()))?;
        Ok(Rc::new(InjectedSigner {
            provider: self.clone(),
            account,
        }))
    }
}

pub struct InjectedSigner {
    provider: InjectedProvider,
    account: Address,
}

#[async_trait(?Send)]
impl Signer for InjectedSigner {
    async fn address(&self) -> Result<Address, ProviderError> {
        Ok(self.account)
    }

    fn token(&self, address: Address) -> Rc<dyn TokenContract> {
        Rc::new(InjectedToken {
            provider: self.provider.clone(),
            from: self.account,
            address,
        })
    }
}

pub struct InjectedToken {
    provider: InjectedProvider,
    from: Address,
    address: Address,
}

#[async_trait(?Send)]
impl TokenContract for InjectedToken {
    async fn transfer(&self, to: Address, amount: U256) -> Result<PendingTransfer, ProviderError> {
        let tx = TransactionRequest {
            from: self.from,
            to: self.address,
            data: transfer_calldata(to, amount),
        };
        let tx_hash: TxHash = self.provider.request("eth_sendTransaction", [tx]).await?;
        Ok(PendingTransfer { tx_hash })
    }

    async fn confirm(&self, pending: &PendingTransfer) -> Result<bool, ProviderError> {
        loop {
            let receipt: Option<RpcReceipt> = self
                .provider
                .request("eth_getTransactionReceipt", [pending.tx_hash])
                .await?;
            if let Some(receipt) = receipt {
                return Ok(receipt.status.map_or(true, |status| status == U64::from(1)));
            }
            TimeoutFuture::new(self.provider.poll_interval_ms).await;
        }
    }

    fn on_transfer(&self, handler: TransferHandler) -> Result<Subscription, ProviderError> {
        let active = Rc::new(Cell::new(true));
        let provider = self.provider.clone();
        let token = self.address;
        let account = self.from;

        let running = active.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let mut cursor: Option<u64> = None;
            while running.get() {
                match provider.block_number().await {
                    Ok(head) => {
                        let from = cursor.map_or(head, |last| last + 1);
                        if from <= head {
                            match provider.transfer_events(token, account, from, head).await {
                                Ok(events) => {
                                    cursor = Some(head);
                                    for event in events {
                                        if !running.get() {
                                            break;
                                        }
                                        handler(event);
                                    }
                                }
                                // The range is retried on the next tick.
                                Err(err) => log::warn!("eth_getLogs {}..{} failed: {}", from, head, err),
                            }
                        }
                    }
                    Err(err) => log::warn!("eth_blockNumber failed: {}", err),
                }
                TimeoutFuture::new(provider.poll_interval_ms).await;
            }
            log::debug!("transfer polling for {} stopped", token);
        });

        Ok(Subscription::new(move || active.set(false)))
    }
}

fn js_error(value: JsValue) -> ProviderError {
    ProviderError::Js(
        value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value)),
    )
}

/// Maps a rejected provider promise onto [`ProviderError`].
fn rpc_error(value: JsValue) -> ProviderError {
    let code = js_sys::Reflect::get(&value, &JsValue::from_str("code"))
        .ok()
        .and_then(|code| code.as_f64())
        .map(|code| code as i64);
    let message = js_sys::Reflect::get(&value, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{:?}", value));

    match code {
        Some(USER_REJECTED) => ProviderError::UserRejected,
        Some(code) => ProviderError::Rpc { code, message },
        None => ProviderError::Js(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const TOKEN: Address = address!("3600000000000000000000000000000000000000");
    const ACCOUNT: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    const PADDED_ACCOUNT: &str =
        "0x000000000000000000000000aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const TRANSFER_TOPIC: &str =
        "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

    fn rpc_log(block: u64, index: u64, hash: u8) -> RpcLog {
        RpcLog {
            topics: vec![],
            data: Bytes::new(),
            block_number: Some(U64::from(block)),
            log_index: Some(U64::from(index)),
            transaction_hash: Some(TxHash::repeat_byte(hash)),
            removed: false,
        }
    }

    #[test]
    fn log_filters_are_scoped_to_the_account() {
        let [sent, received] = account_filters(TOKEN, ACCOUNT, 16, 31);

        let sent = serde_json::to_value(&sent).unwrap();
        assert_eq!(sent["fromBlock"], "0x10");
        assert_eq!(sent["toBlock"], "0x1f");
        assert_eq!(sent["topics"], serde_json::json!([TRANSFER_TOPIC, PADDED_ACCOUNT]));

        let received = serde_json::to_value(&received).unwrap();
        assert_eq!(
            received["topics"],
            serde_json::json!([TRANSFER_TOPIC, null, PADDED_ACCOUNT])
        );
    }

    #[test]
    fn merged_logs_follow_chain_order() {
        let merged = merge_logs(
            vec![rpc_log(5, 0, 1), rpc_log(7, 2, 3)],
            vec![rpc_log(6, 1, 2), rpc_log(7, 0, 4)],
        );
        let hashes: Vec<_> = merged.iter().map(|log| log.transaction_hash).collect();
        assert_eq!(
            hashes,
            [1, 2, 4, 3].map(|byte| Some(TxHash::repeat_byte(byte))).to_vec()
        );
    }

    #[test]
    fn self_transfer_is_fetched_once() {
        let merged = merge_logs(vec![rpc_log(9, 3, 7)], vec![rpc_log(9, 3, 7)]);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn removed_logs_are_dropped() {
        let mut reorged = rpc_log(4, 0, 1);
        reorged.removed = true;
        let merged = merge_logs(vec![reorged], vec![rpc_log(4, 1, 2)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].transaction_hash, Some(TxHash::repeat_byte(2)));
    }

    #[test]
    fn rpc_log_decodes_to_transfer() {
        let json = r#"{
            "address": "0x3600000000000000000000000000000000000000",
            "topics": [
                "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
                "0x000000000000000000000000aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                "0x000000000000000000000000bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"
            ],
            "data": "0x0000000000000000000000000000000000000000000000000000000000a037a0",
            "blockNumber": "0x1b4",
            "transactionHash": "0x4242424242424242424242424242424242424242424242424242424242424242",
            "logIndex": "0x0",
            "removed": false
        }"#;
        let log: RpcLog = serde_json::from_str(json).unwrap();
        assert!(!log.removed);

        let event = TransferEvent::from_log(log.topics, log.data, log.transaction_hash).unwrap();
        assert_eq!(event.from, address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"));
        assert_eq!(event.to, address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"));
        assert_eq!(event.value, U256::from(10_500_000u64));
        assert_eq!(event.transaction_hash, Some(TxHash::repeat_byte(0x42)));
    }

    #[test]
    fn pending_receipt_is_null() {
        let receipt: Option<RpcReceipt> = serde_json::from_str("null").unwrap();
        assert!(receipt.is_none());

        let receipt: Option<RpcReceipt> = serde_json::from_str(r#"{"status": "0x0"}"#).unwrap();
        assert_eq!(receipt.unwrap().status, Some(U64::ZERO));
    }
}
