use crate::{
    config::Config,
    error::{Error, Notice},
    listener::{ObservedTransfer, TransferListener, TransferRecord},
    session::{FormState, Session},
    submitter::SendProgress,
    wallet::Connection,
};
use futures::StreamExt;
use std::{cell::RefCell, rc::Rc};
use sycamore::futures::ScopeSpawnFuture;
use sycamore::prelude::*;

pub fn initialize_store(ctx: ScopeRef, config: Config) {
    ctx.provide_context_ref(ctx.create_signal(Session::new(&config)));
    ctx.provide_context_ref(ctx.create_ref(config));
}

pub enum Action {
    Connected(Connection),
    DestinationSet(String),
    AmountSet(String),
    Progress(SendProgress),
    /// Carries the form as submitted.
    PaymentSent(FormState),
    Failed(Error),
    TransferObserved(TransferRecord),
}

pub fn reducer(ctx: ScopeRef, action: Action) {
    let session = ctx.use_context::<Signal<Session>>();
    let mut next = (*session.get_untracked()).clone();

    match action {
        Action::Connected(connection) => {
            next.set_status("");
            next.connected(connection);
        }
        Action::DestinationSet(destination) => next.set_destination(destination),
        Action::AmountSet(amount) => next.set_amount(amount),
        Action::Progress(progress) => {
            log::info!("payment: {:?}", progress);
            next.set_status(progress.to_string());
        }
        Action::PaymentSent(submitted) => next.payment_completed(&submitted),
        Action::Failed(err) => {
            log::error!("{}", err);
            match err.notice() {
                Notice::Alert(message) => alert(&message),
                Notice::Status(message) => next.set_status(message),
            }
        }
        Action::TransferObserved(record) => next.record_transfer(record),
    }

    session.set(next);
}

/// Keeps a transfer subscription pinned to the connected account for the lifetime of `ctx`.
pub fn watch_transfers(ctx: ScopeRef) {
    let session = ctx.use_context::<Signal<Session>>();
    let config = ctx.use_context::<Config>();

    let (sender, mut receiver) = futures::channel::mpsc::unbounded::<ObservedTransfer>();
    let listener = ctx.create_ref(RefCell::new(TransferListener::new(
        config.token_address,
        config.token_decimals,
        Rc::new(move |observed| {
            if let Err(err) = sender.unbounded_send(observed) {
                log::warn!("transfer dropped: {}", err);
            }
        }),
    )));

    ctx.create_effect(move || {
        let snapshot = session.get();
        let mut listener = listener.borrow_mut();
        if let Err(err) = listener.sync(snapshot.connection()) {
            log::error!("could not subscribe to transfers: {}", err);
        }
        log::debug!("transfer listener active: {}", listener.is_subscribed());
    });

    ctx.spawn_future(async move {
        while let Some(observed) = receiver.next().await {
            let current = listener.borrow().is_current(observed.subscription);
            if current {
                reducer(ctx, Action::TransferObserved(observed.record));
            } else {
                log::debug!("dropping transfer from stale subscription #{}", observed.subscription);
            }
        }
    });

    ctx.on_cleanup(move || listener.borrow_mut().unsubscribe());
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        if let Err(err) = window.alert_with_message(message) {
            log::warn!("alert failed: {:?}", err);
        }
    }
}
