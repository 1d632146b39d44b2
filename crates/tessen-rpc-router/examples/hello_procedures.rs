//! Minimal procedure server: registers a few procedures and feeds raw
//! JSON-RPC payloads through the router.
//!
//! Run with: `cargo run --example hello-procedures`

use serde_json::json;
use tessen_rpc_router::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let mut router = RpcRouter::new();

    router.procedure_fn("hello_world", |_parameters, _request| {
        Box::pin(async { Ok(json!({"message": "Hello, World!"}).into()) })
    });

    router.procedure_fn("hello.{name}", |parameters, _request| {
        Box::pin(async move {
            let name = parameters.get_str("name").unwrap_or("stranger").to_string();
            Ok(json!({"greeting": format!("Hello, {}", name)}).into())
        })
    });

    // An empty result still encodes as `{}` on the wire.
    router.procedure_fn("ping", |_parameters, _request| {
        Box::pin(async { Ok(json!({}).into()) })
    });

    router.ensure_compiled()?;

    let payloads = [
        r#"{"jsonrpc":"2.0","id":1,"method":"hello.World","params":{}}"#,
        r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
        r#"{"jsonrpc":"2.0","id":3,"method":"nope"}"#,
        r#"{"jsonrpc":"2.0","method":"ping"}"#, // notification: no reply
    ];

    for payload in payloads {
        println!("--> {}", payload);
        match router.handle_payload(payload).await {
            Some(reply) => println!("<-- {}", reply),
            None => println!("<-- (notification, no reply)"),
        }
    }

    Ok(())
}
