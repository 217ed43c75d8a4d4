#![allow(dead_code)]

use oxide_route_tree::{Context, Handler, Next, Pipeline, Request, RouteMatch, Router, handler};
use serde_json::{Value, json};

/// Appends `label` to the context's trail, then continues.
pub fn mark(label: &'static str) -> Handler {
    handler(move |mut ctx: Context, next: Next| async move {
        let mut trail = ctx.state("trail").cloned().unwrap_or_else(|| json!([]));
        if let Some(items) = trail.as_array_mut() {
            items.push(json!(label));
        }
        ctx.set_state("trail", trail);
        next.run(ctx).await
    })
}

/// Sets a 200 text body, then continues.
pub fn reply(text: &'static str) -> Handler {
    handler(move |mut ctx: Context, next: Next| async move {
        ctx.text(text);
        next.run(ctx).await
    })
}

/// Sets a state flag, then continues.
pub fn flag(key: &'static str) -> Handler {
    handler(move |mut ctx: Context, next: Next| async move {
        ctx.set_state(key, true);
        next.run(ctx).await
    })
}

pub fn trail(ctx: &Context) -> Vec<String> {
    ctx.state("trail")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub fn body(ctx: &Context) -> String {
    ctx.response.body_string().unwrap_or_default()
}

/// Runs a resolved chain on its own, outside any pipeline.
pub async fn run_match(found: RouteMatch) -> Context {
    let mut ctx = Context::new(Request::get("/"));
    ctx.request.params = found.params;
    Next::chain(found.chain).run(ctx).await
}

/// Mounts the router as the first middleware, followed by `downstream`.
pub fn app(router: Router, downstream: Vec<Handler>) -> Pipeline {
    downstream
        .into_iter()
        .fold(Pipeline::new().middleware(router.into_middleware()), Pipeline::middleware)
}
