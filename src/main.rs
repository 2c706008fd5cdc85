mod address;
mod components;
mod config;
mod error;
mod ethereum;
mod listener;
mod session;
mod store;
mod submitter;
mod token;
mod units;
mod wallet;

use components::{
    history::History, payment::PaymentForm, status::StatusLine, wallet::WalletPanel,
};
use config::Config;
use session::Session;
use sycamore::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).expect("logger is initialised once");

    let config = Config::from_window();
    log::info!(
        "Arc Pay: {} at {} on {} (chain {}, enforced: {})",
        config.token_symbol,
        config.token_address,
        config.network_name,
        config.chain_id,
        config.enforce_network
    );

    sycamore::render(move |ctx| {
        store::initialize_store(ctx, config);
        store::watch_transfers(ctx);
        let session = ctx.use_context::<Signal<Session>>();
        let connected = ctx.create_selector(|| session.get().account().is_some());

        view! { ctx,
            main(class="min-h-screen bg-zinc-950 flex items-center justify-center p-4") {
                div(class="w-full max-w-sm bg-zinc-900 rounded-2xl p-6 space-y-6") {
                    h1(class="text-white text-center text-2xl font-bold") { "Arc Pay" }
                    WalletPanel {}
                    (if *connected.get() {
                        view! { ctx,
                            PaymentForm {}
                            History {}
                            StatusLine {}
                        }
                    } else {
                        View::empty()
                    })
                }
            }
        }
    });
}
