//! ERC-20 surface used by the app: the `Transfer` event and the `transfer` call.

use alloy_primitives::{Address, Bytes, LogData, TxHash, B256, U256};
use alloy_sol_types::{sol, SolCall, SolEvent};

sol! {
    #[derive(Debug)]
    event Transfer(address indexed from, address indexed to, uint256 value);

    function transfer(address to, uint256 amount) external returns (bool);
}

/// A decoded `Transfer` log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub transaction_hash: Option<TxHash>,
}

impl TransferEvent {
    /// Decodes a raw log; `None` when the log is not an ERC-20 `Transfer`.
    pub fn from_log(topics: Vec<B256>, data: Bytes, transaction_hash: Option<TxHash>) -> Option<Self> {
        if topics.first() != Some(&Transfer::SIGNATURE_HASH) {
            return None;
        }
        let log_data = LogData::new(topics, data)?;
        match Transfer::decode_log_data(&log_data) {
            Ok(event) => Some(TransferEvent {
                from: event.from,
                to: event.to,
                value: event.value,
                transaction_hash,
            }),
            Err(err) => {
                log::warn!("undecodable Transfer log: {}", err);
                None
            }
        }
    }
}

pub fn transfer_calldata(to: Address, amount: U256) -> Bytes {
    transferCall { to, amount }.abi_encode().into()
}

pub fn transfer_topic() -> B256 {
    Transfer::SIGNATURE_HASH
}
