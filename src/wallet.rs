//! Wallet capabilities the app depends on, and the connect flow built on them.

use crate::{
    config::Config,
    error::{Error, ProviderError},
    token::TransferEvent,
};
use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use std::{fmt, rc::Rc};

/// Account access and network information exposed by a wallet.
#[async_trait(?Send)]
pub trait WalletProvider {
    /// Asks the wallet for account access; may prompt the user.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;
    async fn chain_id(&self) -> Result<u64, ProviderError>;
    async fn signer(&self) -> Result<Rc<dyn Signer>, ProviderError>;
}

/// Capability to authorize transactions for one account.
#[async_trait(?Send)]
pub trait Signer {
    async fn address(&self) -> Result<Address, ProviderError>;
    /// Contract handle sharing this signer's network connection.
    fn token(&self, address: Address) -> Rc<dyn TokenContract>;
}

pub type TransferHandler = Box<dyn Fn(TransferEvent)>;

#[async_trait(?Send)]
pub trait TokenContract {
    /// Submits `transfer(to, amount)`; resolves once the network accepted it.
    async fn transfer(&self, to: Address, amount: U256) -> Result<PendingTransfer, ProviderError>;
    /// Waits until the transfer is final. `Ok(false)` means it was mined but reverted.
    async fn confirm(&self, pending: &PendingTransfer) -> Result<bool, ProviderError>;
    fn on_transfer(&self, handler: TransferHandler) -> Result<Subscription, ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransfer {
    pub tx_hash: TxHash,
}

/// Registered event handler. Deregisters on [`Subscription::unsubscribe`] or drop.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Subscription {
        Subscription {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// A connected account and the signer bound to it.
#[derive(Clone)]
pub struct Connection {
    pub account: Address,
    pub signer: Rc<dyn Signer>,
    pub chain_id: u64,
}

impl Connection {
    /// Same account held through the same signer handle.
    pub fn same_as(&self, other: &Connection) -> bool {
        self.account == other.account && Rc::ptr_eq(&self.signer, &other.signer)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("account", &self.account)
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

pub async fn connect(provider: Option<&dyn WalletProvider>, config: &Config) -> Result<Connection, Error> {
    let provider = provider.ok_or(Error::ProviderUnavailable)?;

    let accounts = provider.request_accounts().await.map_err(Error::ConnectionFailed)?;
    log::debug!("wallet granted {} account(s)", accounts.len());

    let chain_id = provider.chain_id().await.map_err(Error::ConnectionFailed)?;
    if config.enforce_network && chain_id != config.chain_id {
        return Err(Error::WrongNetwork {
            expected: config.chain_id,
            actual: chain_id,
        });
    }

    let signer = provider.signer().await.map_err(Error::ConnectionFailed)?;
    let account = signer.address().await.map_err(Error::ConnectionFailed)?;
    log::info!("connected {} on chain {}", account, chain_id);

    Ok(Connection {
        account,
        signer,
        chain_id,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory wallet used by unit tests.

    use super::*;
    use std::cell::{Cell, RefCell};

    pub struct MockProvider {
        pub account: Address,
        pub chain_id: u64,
        pub reject: bool,
        pub token: Rc<MockToken>,
    }

    impl MockProvider {
        pub fn new(account: Address) -> MockProvider {
            MockProvider {
                account,
                chain_id: 5042002,
                reject: false,
                token: Rc::new(MockToken::default()),
            }
        }
    }

    #[async_trait(?Send)]
    impl WalletProvider for MockProvider {
        async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
            if self.reject {
                return Err(ProviderError::UserRejected);
            }
            Ok(vec![self.account])
        }

        async fn chain_id(&self) -> Result<u64, ProviderError> {
            Ok(self.chain_id)
        }

        async fn signer(&self) -> Result<Rc<dyn Signer>, ProviderError> {
            Ok(Rc::new(MockSigner {
                account: self.account,
                token: self.token.clone(),
            }))
        }
    }

    pub struct MockSigner {
        pub account: Address,
        pub token: Rc<MockToken>,
    }

    #[async_trait(?Send)]
    impl Signer for MockSigner {
        async fn address(&self) -> Result<Address, ProviderError> {
            Ok(self.account)
        }

        fn token(&self, _address: Address) -> Rc<dyn TokenContract> {
            self.token.clone()
        }
    }

    /// Token contract double. Handlers registered through `on_transfer` receive whatever
    /// `emit` is given until their subscription is cancelled.
    #[derive(Default)]
    pub struct MockToken {
        handlers: Rc<RefCell<Vec<(u64, Rc<TransferHandler>)>>>,
        next_id: Cell<u64>,
        pub transfers: RefCell<Vec<(Address, U256)>>,
        pub fail_submit: Cell<bool>,
        pub fail_confirm: Cell<bool>,
        pub revert: Cell<bool>,
    }

    impl MockToken {
        pub fn emit(&self, event: TransferEvent) {
            let handlers: Vec<_> = self.handlers.borrow().iter().map(|(_, h)| h.clone()).collect();
            for handler in handlers {
                (*handler)(event.clone());
            }
        }

        pub fn active_handlers(&self) -> usize {
            self.handlers.borrow().len()
        }
    }

    #[async_trait(?Send)]
    impl TokenContract for MockToken {
        async fn transfer(&self, to: Address, amount: U256) -> Result<PendingTransfer, ProviderError> {
            if self.fail_submit.get() {
                return Err(ProviderError::UserRejected);
            }
            self.transfers.borrow_mut().push((to, amount));
            Ok(PendingTransfer {
                tx_hash: TxHash::with_last_byte(self.transfers.borrow().len() as u8),
            })
        }

        async fn confirm(&self, _pending: &PendingTransfer) -> Result<bool, ProviderError> {
            if self.fail_confirm.get() {
                return Err(ProviderError::Rpc {
                    code: -32000,
                    message: "receipt unavailable".to_string(),
                });
            }
            Ok(!self.revert.get())
        }

        fn on_transfer(&self, handler: TransferHandler) -> Result<Subscription, ProviderError> {
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            self.handlers.borrow_mut().push((id, Rc::new(handler)));

            let handlers = self.handlers.clone();
            Ok(Subscription::new(move || {
                handlers.borrow_mut().retain(|(other, _)| *other != id);
            }))
        }
    }
}
