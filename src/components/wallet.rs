use crate::{
    config::Config,
    ethereum::InjectedProvider,
    session::Session,
    store::{reducer, Action},
    wallet::{connect, WalletProvider},
};
use sycamore::futures::ScopeSpawnFuture;
use sycamore::prelude::*;

#[component]
pub fn WalletPanel<G: Html>(ctx: ScopeRef) -> View<G> {
    let session = ctx.use_context::<Signal<Session>>();
    let config = ctx.use_context::<Config>();
    let connecting = ctx.create_signal(false);
    let connected_account = ctx.create_selector(|| session.get().account());

    let on_connect = move |_: web_sys::Event| {
        if *connecting.get() {
            return;
        }
        connecting.set(true);
        ctx.spawn_future(async move {
            let provider = InjectedProvider::detect(config.poll_interval_ms);
            let provider = provider.as_ref().map(|p| p as &dyn WalletProvider);
            match connect(provider, config).await {
                Ok(connection) => reducer(ctx, Action::Connected(connection)),
                Err(err) => reducer(ctx, Action::Failed(err)),
            }
            connecting.set(false);
        });
    };

    view! {ctx,
        div(class="space-y-4") {
            (if let Some(account) = *connected_account.get() {
                let address = account.to_checksum(None);
                let request = session.get_untracked().payment_request_json();
                view! {ctx,
                    div(class="bg-black text-white rounded-xl p-4 text-sm break-all") { (address) }
                    pre(class="bg-zinc-800 text-zinc-400 rounded-xl p-3 text-xs whitespace-pre-wrap break-all") { (request) }
                }
            } else {
                view! {ctx,
                    button(class="w-full py-3 bg-white text-black rounded-xl font-semibold", on:click=on_connect) {
                        (if *connecting.get() { "Connecting..." } else { "Connect Wallet" })
                    }
                }
            })
        }
    }
}
