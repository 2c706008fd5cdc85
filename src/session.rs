//! Everything the page shows, owned in one place.

use crate::{
    config::Config,
    listener::{Direction, TransferRecord},
    wallet::Connection,
};
use alloy_primitives::Address;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub destination: String,
    pub amount: String,
}

/// Summary another party can scan to pay the connected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    pub address: Address,
    pub token: String,
    pub network: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    token_symbol: String,
    network_name: String,
    connection: Option<Connection>,
    form: FormState,
    status: String,
    ledger: Vec<TransferRecord>,
}

impl Session {
    pub fn new(config: &Config) -> Session {
        Session {
            token_symbol: config.token_symbol.clone(),
            network_name: config.network_name.clone(),
            connection: None,
            form: FormState::default(),
            status: String::new(),
            ledger: Vec::new(),
        }
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    pub fn account(&self) -> Option<Address> {
        self.connection.as_ref().map(|c| c.account)
    }

    /// Replaces any previous account and signer.
    pub fn connected(&mut self, connection: Connection) {
        self.connection = Some(connection);
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn set_destination(&mut self, destination: String) {
        self.form.destination = destination;
    }

    pub fn set_amount(&mut self, amount: String) {
        self.form.amount = amount;
    }

    pub fn clear_form(&mut self) {
        self.form = FormState::default();
    }

    /// Clears the form after `submitted` went through, unless the user has edited it since.
    pub fn payment_completed(&mut self, submitted: &FormState) {
        if self.form == *submitted {
            self.clear_form();
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Newest first.
    pub fn ledger(&self) -> &[TransferRecord] {
        &self.ledger
    }

    /// Prepends an observed transfer and announces it on the status line.
    pub fn record_transfer(&mut self, record: TransferRecord) {
        self.status = match record.direction {
            Direction::Received => format!("Received {} {}", record.amount, self.token_symbol),
            Direction::Sent => format!("Sent {} {}", record.amount, self.token_symbol),
        };
        self.ledger.insert(0, record);
    }

    pub fn payment_request(&self) -> Option<PaymentRequest> {
        self.account().map(|address| PaymentRequest {
            address,
            token: self.token_symbol.clone(),
            network: self.network_name.clone(),
        })
    }

    pub fn payment_request_json(&self) -> String {
        self.payment_request()
            .and_then(|request| serde_json::to_string(&request).ok())
            .unwrap_or_default()
    }
}
