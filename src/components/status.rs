use crate::session::Session;
use sycamore::prelude::*;

#[component]
pub fn StatusLine<G: Html>(ctx: ScopeRef) -> View<G> {
    let session = ctx.use_context::<Signal<Session>>();
    let status = ctx.create_memo(|| session.get().status().to_string());

    view! {ctx,
        (if status.get().is_empty() {
            View::empty()
        } else {
            view! {ctx, p(class="text-center text-sm text-zinc-400") { (status.get()) } }
        })
    }
}
