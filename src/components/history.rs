use crate::{address::short, config::Config, listener::Direction, session::Session};
use sycamore::prelude::*;

#[component]
pub fn History<G: Html>(ctx: ScopeRef) -> View<G> {
    let session = ctx.use_context::<Signal<Session>>();
    let config = ctx.use_context::<Config>();
    let ledger = ctx.create_memo(|| session.get().ledger().to_vec());

    view! {ctx,
        (if ledger.get().is_empty() {
            View::empty()
        } else {
            view! {ctx,
                div(class="mt-4 space-y-2") {
                    h2(class="text-white text-sm font-semibold") { "Transaction history" }
                    Indexed {
                        iterable: ledger,
                        view: move |ctx, record| {
                            let (label, color, counterparty) = match record.direction {
                                Direction::Received => ("Received", "text-green-400", short(&record.from)),
                                Direction::Sent => ("Sent", "text-red-400", short(&record.to)),
                            };
                            let amount = format!("{} {}", record.amount, config.token_symbol);
                            let tx = record
                                .transaction_hash
                                .map(|hash| {
                                    let hash = hash.to_string();
                                    format!("{}…{}", &hash[..8], &hash[hash.len() - 4..])
                                })
                                .unwrap_or_default();
                            view! {ctx,
                                div(class="flex justify-between items-center bg-zinc-800 rounded-lg p-3 text-sm") {
                                    span(class=color) { (label) }
                                    span(class="text-zinc-400 text-xs") { (counterparty) }
                                    span(class="text-white") { (amount) }
                                    span(class="text-zinc-500 text-xs") { (tx) }
                                }
                            }
                        }
                    }
                }
            }
        })
    }
}
