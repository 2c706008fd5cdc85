use alloy_primitives::TxHash;
use thiserror::Error;

/// Failures surfaced to the user by the connect and send flows.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no wallet provider detected")]
    ProviderUnavailable,
    #[error("wallet is on chain {actual}, expected chain {expected}")]
    WrongNetwork { expected: u64, actual: u64 },
    #[error("could not connect wallet: {0}")]
    ConnectionFailed(#[source] ProviderError),
    #[error("wallet is not connected")]
    NotConnected,
    #[error("invalid destination address: {0:?}")]
    InvalidAddress(String),
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),
    #[error("amount {amount:?} has more than {decimals} decimal places")]
    AmountPrecisionError { amount: String, decimals: u8 },
    #[error(transparent)]
    SendFailed(#[from] SendFailure),
}

/// How far a transfer got before it failed.
#[derive(Debug, Error)]
pub enum SendFailure {
    #[error("transfer was not submitted: {0}")]
    Rejected(#[source] ProviderError),
    #[error("transfer {tx_hash} reverted")]
    Reverted { tx_hash: TxHash },
    #[error("transfer {tx_hash} could not be confirmed: {source}")]
    Unconfirmed {
        tx_hash: TxHash,
        #[source]
        source: ProviderError,
    },
}

/// Errors reported by the wallet provider or the node behind it.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request rejected by the user")]
    UserRejected,
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("javascript error: {0}")]
    Js(String),
}

/// The way an error is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Blocking alert; the action is abandoned.
    Alert(String),
    /// Inline status line.
    Status(String),
}

impl Error {
    pub fn notice(&self) -> Notice {
        match self {
            Error::ProviderUnavailable => Notice::Alert("No wallet detected".to_string()),
            Error::WrongNetwork { .. } => Notice::Alert(format!("Switch your wallet network: {}", self)),
            Error::ConnectionFailed(_) => Notice::Alert("Could not connect wallet".to_string()),
            Error::NotConnected => Notice::Alert("Connect your wallet first".to_string()),
            Error::InvalidAddress(_) => Notice::Alert("Invalid destination address".to_string()),
            Error::InvalidAmount(_) => Notice::Alert("Invalid amount".to_string()),
            Error::AmountPrecisionError { decimals, .. } => Notice::Alert(format!(
                "Amount supports at most {} decimal places",
                decimals
            )),
            Error::SendFailed(SendFailure::Unconfirmed { tx_hash, .. }) => Notice::Status(format!(
                "Payment {} could not be confirmed",
                tx_hash
            )),
            Error::SendFailed(SendFailure::Reverted { .. }) => {
                Notice::Status("Payment reverted".to_string())
            }
            Error::SendFailed(SendFailure::Rejected(_)) => {
                Notice::Status("Failed to send payment".to_string())
            }
        }
    }
}
