//! Regex routes with a nested profile API.
//!
//! Run with: cargo run --example with_regex

use oxide_route_tree::{
    Context, Method, Next, Pipeline, Regex, Request, Result, RouteNode, Router, handler, logger,
};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

async fn reply(mut ctx: Context, next: Next, text: &str) -> Context {
    ctx.text(text);
    next.run(ctx).await
}

/// Handlers for `/user/profile`.
fn profile_api(profile: &mut RouteNode) -> Result<()> {
    profile
        .get(handler(|ctx, next| reply(ctx, next, "GET profile")))?
        .post(handler(|ctx, next| reply(ctx, next, "POST profile")))?;
    Ok(())
}

fn users_api(router: &mut Router) -> Result<()> {
    let users = router.route(Regex::new(r"/user/?").expect("valid regex"))?;
    users
        .get(handler(|ctx, next| reply(ctx, next, "from get")))?
        .post(handler(|ctx, next| reply(ctx, next, "from post")))?
        .put(handler(|ctx, next| reply(ctx, next, "from put")))?
        .nested_with(Regex::new(r"/profile").expect("valid regex"), profile_api)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let mut router = Router::new();
    users_api(&mut router)?;

    let app = Pipeline::new()
        .middleware(logger())
        .middleware(router.into_middleware());

    for (method, path) in [
        (Method::Get, "/user"),
        (Method::Put, "/user/"),
        (Method::Post, "/user/profile"),
        (Method::Delete, "/user/profile"),
    ] {
        let ctx = app.handle(Request::new(method.clone(), path)).await;
        info!(
            %method,
            path,
            status = ctx.response.status,
            body = %ctx.response.body_string().unwrap_or_default(),
            "response"
        );
    }

    Ok(())
}
