//! Outbound payment flow: validate, submit, wait for confirmation.
//!
//! The ledger is not touched here; a sent payment shows up once the transfer listener
//! observes its `Transfer` event.

use crate::{
    address::parse_address,
    config::Config,
    error::{Error, SendFailure},
    units::parse_units,
    wallet::Signer,
};
use alloy_primitives::TxHash;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendProgress {
    Sending,
    AwaitingConfirmation(TxHash),
    Sent(TxHash),
}

impl fmt::Display for SendProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendProgress::Sending => write!(f, "Sending payment..."),
            SendProgress::AwaitingConfirmation(_) => write!(f, "Awaiting confirmation..."),
            SendProgress::Sent(_) => write!(f, "Payment sent!"),
        }
    }
}

/// Sends `amount_text` tokens to `destination`, reporting each stage through `progress`.
/// Validation failures return before any network call.
pub async fn send_payment(
    signer: &dyn Signer,
    config: &Config,
    destination: &str,
    amount_text: &str,
    progress: impl Fn(SendProgress),
) -> Result<TxHash, Error> {
    let to = parse_address(destination)?;
    let amount = parse_units(amount_text, config.token_decimals)?;

    progress(SendProgress::Sending);
    let token = signer.token(config.token_address);
    let pending = token
        .transfer(to, amount)
        .await
        .map_err(SendFailure::Rejected)?;
    log::info!("transfer of {} base units to {} submitted as {}", amount, to, pending.tx_hash);

    progress(SendProgress::AwaitingConfirmation(pending.tx_hash));
    let succeeded = token
        .confirm(&pending)
        .await
        .map_err(|source| SendFailure::Unconfirmed {
            tx_hash: pending.tx_hash,
            source,
        })?;
    if !succeeded {
        return Err(SendFailure::Reverted {
            tx_hash: pending.tx_hash,
        }
        .into());
    }

    progress(SendProgress::Sent(pending.tx_hash));
    Ok(pending.tx_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::testing::{MockSigner, MockToken};
    use alloy_primitives::{address, Address, U256};
    use futures::executor::block_on;
    use std::{cell::RefCell, rc::Rc};

    const A: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    const B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn signer() -> MockSigner {
        MockSigner {
            account: A,
            token: Rc::new(MockToken::default()),
        }
    }

    fn send(signer: &MockSigner, destination: &str, amount: &str) -> (Result<TxHash, Error>, Vec<SendProgress>) {
        let stages = RefCell::new(Vec::new());
        let result = block_on(send_payment(
            signer,
            &Config::default(),
            destination,
            amount,
            |stage| stages.borrow_mut().push(stage),
        ));
        (result, stages.into_inner())
    }

    #[test]
    fn successful_send_walks_every_stage() {
        let signer = signer();
        let (result, stages) = send(&signer, B, "10.5");
        let tx_hash = result.unwrap();

        assert_eq!(
            stages,
            vec![
                SendProgress::Sending,
                SendProgress::AwaitingConfirmation(tx_hash),
                SendProgress::Sent(tx_hash),
            ]
        );
        assert_eq!(
            *signer.token.transfers.borrow(),
            vec![(B.parse::<Address>().unwrap(), U256::from(10_500_000u64))]
        );
    }

    #[test]
    fn invalid_input_never_reaches_the_network() {
        let signer = signer();
        for (destination, amount) in [
            ("0x1234", "1"),
            ("not an address", "1"),
            (B, "0"),
            (B, "-3"),
            (B, "ten"),
            (B, "1.0000001"),
        ] {
            let (result, stages) = send(&signer, destination, amount);
            assert!(result.is_err());
            assert!(stages.is_empty());
        }
        assert!(signer.token.transfers.borrow().is_empty());
    }

    #[test]
    fn validation_errors_are_specific() {
        let signer = signer();
        assert!(matches!(send(&signer, "0x12", "1").0, Err(Error::InvalidAddress(_))));
        assert!(matches!(send(&signer, B, "0").0, Err(Error::InvalidAmount(_))));
        assert!(matches!(
            send(&signer, B, "0.1234567").0,
            Err(Error::AmountPrecisionError { .. })
        ));
    }

    #[test]
    fn rejected_submission() {
        let signer = signer();
        signer.token.fail_submit.set(true);
        let (result, stages) = send(&signer, B, "1");
        assert!(matches!(result, Err(Error::SendFailed(SendFailure::Rejected(_)))));
        assert_eq!(stages, vec![SendProgress::Sending]);
    }

    #[test]
    fn unconfirmed_submission_is_not_reported_sent() {
        let signer = signer();
        signer.token.fail_confirm.set(true);
        let (result, stages) = send(&signer, B, "1");
        assert!(matches!(
            result,
            Err(Error::SendFailed(SendFailure::Unconfirmed { .. }))
        ));
        assert!(!stages.iter().any(|s| matches!(s, SendProgress::Sent(_))));
    }

    #[test]
    fn reverted_transfer_fails() {
        let signer = signer();
        signer.token.revert.set(true);
        let (result, _) = send(&signer, B, "1");
        assert!(matches!(
            result,
            Err(Error::SendFailed(SendFailure::Reverted { .. }))
        ));
    }
}
