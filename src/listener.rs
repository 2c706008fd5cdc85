//! Live transfer subscription that follows the connected account.
//!
//! [`TransferListener::sync`] is the only state transition: call it whenever the connection
//! changes. It is a no-op while the same account and signer stay connected; otherwise the
//! previous subscription is torn down before a new one is registered, so two handlers never
//! feed the ledger at the same time.

use crate::{
    error::ProviderError,
    token::TransferEvent,
    units::format_units,
    wallet::{Connection, Subscription},
};
use alloy_primitives::{Address, TxHash};
use std::{cell::Cell, rc::Rc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

/// A transfer observed on chain that concerns the connected account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub from: Address,
    pub to: Address,
    pub amount: String,
    pub direction: Direction,
    pub transaction_hash: Option<TxHash>,
}

/// A record tagged with the subscription that delivered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedTransfer {
    pub subscription: u64,
    pub record: TransferRecord,
}

pub type TransferSink = Rc<dyn Fn(ObservedTransfer)>;

/// Records for `account` carried by `event`. The two directions are checked independently,
/// so a self-transfer yields a `Received` and a `Sent` record.
pub fn classify(account: Address, event: &TransferEvent, decimals: u8) -> Vec<TransferRecord> {
    let amount = format_units(event.value, decimals);
    let record = |direction| TransferRecord {
        from: event.from,
        to: event.to,
        amount: amount.clone(),
        direction,
        transaction_hash: event.transaction_hash,
    };

    let mut records = Vec::new();
    if event.to == account {
        records.push(record(Direction::Received));
    }
    if event.from == account {
        records.push(record(Direction::Sent));
    }
    records
}

enum State {
    Unsubscribed,
    Subscribed {
        connection: Connection,
        id: u64,
        active: Rc<Cell<bool>>,
        subscription: Subscription,
    },
}

pub struct TransferListener {
    token: Address,
    decimals: u8,
    sink: TransferSink,
    state: State,
    next_id: u64,
}

impl TransferListener {
    pub fn new(token: Address, decimals: u8, sink: TransferSink) -> TransferListener {
        TransferListener {
            token,
            decimals,
            sink,
            state: State::Unsubscribed,
            next_id: 0,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        matches!(self.state, State::Subscribed { .. })
    }

    /// Whether `id` names the subscription currently feeding the ledger.
    pub fn is_current(&self, id: u64) -> bool {
        matches!(&self.state, State::Subscribed { id: current, .. } if *current == id)
    }

    pub fn sync(&mut self, connection: Option<&Connection>) -> Result<(), ProviderError> {
        if let (State::Subscribed { connection: pinned, .. }, Some(next)) = (&self.state, connection) {
            if pinned.same_as(next) {
                return Ok(());
            }
        }

        self.unsubscribe();
        match connection {
            Some(connection) => self.subscribe(connection),
            None => Ok(()),
        }
    }

    /// Tears down the active subscription, if any.
    pub fn unsubscribe(&mut self) {
        if let State::Subscribed {
            connection,
            id,
            active,
            subscription,
        } = std::mem::replace(&mut self.state, State::Unsubscribed)
        {
            active.set(false);
            subscription.unsubscribe();
            log::info!("unsubscribed transfers for {} (#{})", connection.account, id);
        }
    }

    fn subscribe(&mut self, connection: &Connection) -> Result<(), ProviderError> {
        let id = self.next_id;
        self.next_id += 1;

        let active = Rc::new(Cell::new(true));
        let handler = {
            let active = active.clone();
            let sink = self.sink.clone();
            let account = connection.account;
            let decimals = self.decimals;
            move |event: TransferEvent| {
                if !active.get() {
                    return;
                }
                for record in classify(account, &event, decimals) {
                    sink(ObservedTransfer {
                        subscription: id,
                        record,
                    });
                }
            }
        };

        let contract = connection.signer.token(self.token);
        let subscription = contract.on_transfer(Box::new(handler))?;
        log::info!("subscribed transfers for {} (#{})", connection.account, id);

        self.state = State::Subscribed {
            connection: connection.clone(),
            id,
            active,
            subscription,
        };
        Ok(())
    }
}

impl Drop for TransferListener {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
