use crate::{
    config::Config,
    error::Error,
    session::Session,
    store::{reducer, Action},
    submitter::send_payment,
};
use sycamore::futures::ScopeSpawnFuture;
use sycamore::prelude::*;

#[component]
pub fn PaymentForm<G: Html>(ctx: ScopeRef) -> View<G> {
    let session = ctx.use_context::<Signal<Session>>();
    let config = ctx.use_context::<Config>();
    let destination = ctx.create_signal(String::new());
    let amount = ctx.create_signal(String::new());
    let sending = ctx.create_signal(false);

    // inputs -> session
    ctx.create_effect(move || {
        let destination = destination.get();
        let amount = amount.get();
        let current = session.get_untracked();
        if current.form().destination != *destination {
            reducer(ctx, Action::DestinationSet((*destination).clone()));
        }
        if current.form().amount != *amount {
            reducer(ctx, Action::AmountSet((*amount).clone()));
        }
    });

    // session -> inputs, so a cleared form empties the fields
    ctx.create_effect(move || {
        let current = session.get();
        if *destination.get_untracked() != current.form().destination {
            destination.set(current.form().destination.clone());
        }
        if *amount.get_untracked() != current.form().amount {
            amount.set(current.form().amount.clone());
        }
    });

    let on_send = move |_: web_sys::Event| {
        if *sending.get_untracked() {
            return;
        }
        let current = session.get_untracked();
        let connection = match current.connection() {
            Some(connection) => connection.clone(),
            None => return reducer(ctx, Action::Failed(Error::NotConnected)),
        };
        let form = current.form().clone();

        sending.set(true);
        ctx.spawn_future(async move {
            let result = send_payment(
                connection.signer.as_ref(),
                config,
                &form.destination,
                &form.amount,
                |progress| reducer(ctx, Action::Progress(progress)),
            )
            .await;
            match result {
                Ok(tx_hash) => {
                    log::info!("payment {} confirmed", tx_hash);
                    reducer(ctx, Action::PaymentSent(form));
                }
                Err(err) => reducer(ctx, Action::Failed(err)),
            }
            sending.set(false);
        });
    };

    let amount_placeholder = format!("Amount {}", config.token_symbol);

    view! {ctx,
        div(class="space-y-4") {
            input(class="w-full p-3 rounded bg-zinc-800 text-white", placeholder="Destination address", bind:value=destination)
            input(class="w-full p-3 rounded bg-zinc-800 text-white", placeholder=amount_placeholder, bind:value=amount)
            button(class="w-full py-3 bg-green-600 text-white rounded-xl", on:click=on_send) {
                (if *sending.get() { "Sending..." } else { "Send" })
            }
        }
    }
}
