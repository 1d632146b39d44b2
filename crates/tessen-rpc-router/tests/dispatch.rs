//! End-to-end dispatch pipeline tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use tessen_json_rpc::{
    MessageId, RpcErrorCode, RpcErrorObject, RpcFault, RpcMessage, RpcRequest, RpcResponse,
};
use tessen_rpc_router::middleware::{
    DispatchContext, MiddlewareError, MiddlewareOutcome, RpcMiddleware,
};
use tessen_rpc_router::{ErrorExposure, RpcRouter};

fn request(id: i64, method: &str) -> RpcRequest {
    RpcRequest::new_no_params(MessageId::Number(id), method.to_string())
}

fn greeting_router() -> RpcRouter {
    let mut router = RpcRouter::new();
    router.procedure_fn("hello.{name}", |parameters, _request| {
        Box::pin(async move {
            let name = parameters.get_str("name").unwrap_or("stranger").to_string();
            Ok(json!({"greeting": format!("Hello, {}", name)}).into())
        })
    });
    router
}

#[tokio::test]
async fn dispatch_binds_method_parameter_into_result() {
    let router = greeting_router();
    let response = router.dispatch(&request(1, "hello.World")).await;

    assert_eq!(
        response.to_wire(),
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"greeting": "Hello, World"}
        })
    );
}

#[tokio::test]
async fn unregistered_method_yields_method_not_found() {
    let router = greeting_router();
    let response = router.dispatch(&request(5, "nope")).await;

    let wire = response.to_wire();
    assert_eq!(wire["id"], 5);
    assert_eq!(wire["error"]["code"], -32601);
    assert!(
        wire["error"]["message"]
            .as_str()
            .unwrap()
            .contains("not found")
    );
    assert!(wire.get("result").is_none());
}

#[tokio::test]
async fn exact_method_beats_earlier_pattern() {
    let mut router = RpcRouter::new();
    router.procedure_fn("users.{action}", |_, _| {
        Box::pin(async { Ok(json!({"via": "pattern"}).into()) })
    });
    router.procedure_fn("users.list", |_, _| {
        Box::pin(async { Ok(json!({"via": "exact"}).into()) })
    });

    let response = router.dispatch(&request(1, "users.list")).await;
    assert_eq!(response.to_wire()["result"]["via"], "exact");
}

#[tokio::test]
async fn fallback_registered_first_still_loses() {
    let mut router = RpcRouter::new();
    router
        .procedure_fn("{anything}", |_, _| {
            Box::pin(async { Ok(json!({"via": "fallback"}).into()) })
        })
        .fallback();
    router.procedure_fn("ping", |_, _| {
        Box::pin(async { Ok(json!({"via": "ping"}).into()) })
    });

    let response = router.dispatch(&request(1, "ping")).await;
    assert_eq!(response.to_wire()["result"]["via"], "ping");

    let response = router.dispatch(&request(2, "anything.else")).await;
    // "anything.else" has a dot, so the single-segment fallback misses it...
    assert_eq!(response.to_wire()["error"]["code"], -32601);

    let response = router.dispatch(&request(3, "pong")).await;
    assert_eq!(response.to_wire()["result"]["via"], "fallback");
}

#[tokio::test]
async fn optional_parameter_absent_from_bindings() {
    let mut router = RpcRouter::new();
    router.procedure_fn("search.{query}.{page?}", |parameters, _| {
        Box::pin(async move {
            let mut result = serde_json::Map::new();
            for (name, value) in parameters.iter() {
                result.insert(name.clone(), value.clone());
            }
            Ok(result.into())
        })
    });

    let response = router.dispatch(&request(1, "search.foo")).await;
    assert_eq!(response.to_wire()["result"], json!({"query": "foo"}));

    let response = router.dispatch(&request(2, "search.foo.2")).await;
    assert_eq!(
        response.to_wire()["result"],
        json!({"query": "foo", "page": "2"})
    );
}

#[tokio::test]
async fn empty_result_serializes_as_object() {
    let mut router = RpcRouter::new();
    router.procedure_fn("ping", |_, _| {
        Box::pin(async { Ok(serde_json::Map::new().into()) })
    });

    let wire = router.dispatch(&request(1, "ping")).await.to_wire_string();
    assert!(wire.contains(r#""result":{}"#));
    assert!(!wire.contains(r#""result":[]"#));
}

#[tokio::test]
async fn notification_is_computed_but_not_answered() {
    let mut router = RpcRouter::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    router.procedure_fn("ping", move |_, _| {
        let seen = seen.clone();
        Box::pin(async move {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(json!({}).into())
        })
    });

    let message = RpcMessage::parse(r#"{"jsonrpc":"2.0","method":"ping","params":{}}"#).unwrap();
    let notification = match message {
        RpcMessage::Notification(notification) => notification,
        other => panic!("expected notification, got {:?}", other),
    };

    // The pipeline still runs and computes a response with a null id.
    let response = router.dispatch_notification(&notification).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(response.to_wire()["id"], serde_json::Value::Null);

    // The transport-facing surface discards it.
    assert!(
        router
            .handle_payload(r#"{"jsonrpc":"2.0","method":"ping","params":{}}"#)
            .await
            .is_none()
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

struct RejectingMiddleware;

#[async_trait]
impl RpcMiddleware for RejectingMiddleware {
    async fn before_dispatch(
        &self,
        ctx: &mut DispatchContext<'_>,
    ) -> Result<MiddlewareOutcome, MiddlewareError> {
        Ok(MiddlewareOutcome::Respond(RpcResponse::error(
            ctx.id().clone(),
            RpcErrorObject::new(RpcErrorCode::ServerError, Some("gated".to_string()), None),
        )))
    }
}

#[tokio::test]
async fn middleware_short_circuit_skips_handler() {
    let mut router = RpcRouter::builder()
        .register_middleware("gate", RejectingMiddleware)
        .build()
        .unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    router
        .procedure_fn("guarded", move |_, _| {
            let seen = seen.clone();
            Box::pin(async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(json!({}).into())
            })
        })
        .middleware(["gate"]);

    let response = router.dispatch(&request(1, "guarded")).await;
    assert_eq!(response.to_wire()["error"]["message"], "gated");
    assert_eq!(calls.load(Ordering::SeqCst), 0, "handler must not run");
}

struct ParamsGuard;

#[async_trait]
impl RpcMiddleware for ParamsGuard {
    async fn before_dispatch(
        &self,
        ctx: &mut DispatchContext<'_>,
    ) -> Result<MiddlewareOutcome, MiddlewareError> {
        match ctx.params() {
            Some(_) => Ok(MiddlewareOutcome::Continue),
            None => Err(MiddlewareError::invalid_params("params object required")),
        }
    }
}

#[tokio::test]
async fn middleware_error_code_propagates_unchanged() {
    let mut router = RpcRouter::builder()
        .register_middleware("params-guard", ParamsGuard)
        .build()
        .unwrap();
    router
        .procedure_fn("strict", |_, _| Box::pin(async { Ok(json!({}).into()) }))
        .middleware(["params-guard"]);

    let response = router.dispatch(&request(1, "strict")).await;
    let wire = response.to_wire();
    assert_eq!(wire["error"]["code"], -32602);
    assert_eq!(wire["error"]["message"], "params object required");
}

struct StampingMiddleware;

#[async_trait]
impl RpcMiddleware for StampingMiddleware {
    async fn before_dispatch(
        &self,
        _ctx: &mut DispatchContext<'_>,
    ) -> Result<MiddlewareOutcome, MiddlewareError> {
        Ok(MiddlewareOutcome::Continue)
    }

    async fn after_dispatch(
        &self,
        ctx: &DispatchContext<'_>,
        response: &mut RpcResponse,
    ) -> Result<(), MiddlewareError> {
        if !response.is_error() {
            let mut payload = response.payload().cloned().unwrap_or(json!({}));
            if let Some(object) = payload.as_object_mut() {
                object.insert("matched".to_string(), json!(ctx.matched_pattern()));
            }
            *response = RpcResponse::result(ctx.id().clone(), payload);
        }
        Ok(())
    }
}

#[tokio::test]
async fn after_hooks_can_transform_the_response() {
    let mut router = RpcRouter::builder()
        .register_middleware("stamp", StampingMiddleware)
        .build()
        .unwrap();
    router
        .procedure_fn("echo.{word}", |parameters, _| {
            Box::pin(async move {
                Ok(json!({"word": parameters.get_str("word").unwrap_or("")}).into())
            })
        })
        .middleware(["stamp"]);

    let response = router.dispatch(&request(1, "echo.hi")).await;
    let wire = response.to_wire();
    assert_eq!(wire["result"]["word"], "hi");
    assert_eq!(wire["result"]["matched"], "echo.{word}");
}

#[tokio::test]
async fn handler_fault_is_sanitized_by_default() {
    let mut router = RpcRouter::new();
    router.procedure_fn("boom", |_, _| {
        Box::pin(async {
            Err(RpcFault::unexpected(std::io::Error::other(
                "db password leaked",
            )))
        })
    });

    let wire = router.dispatch(&request(1, "boom")).await.to_wire();
    assert_eq!(wire["error"]["code"], -32603);
    assert!(wire["error"].get("data").is_none());
}

#[tokio::test]
async fn handler_fault_details_surface_when_exposed() {
    let mut router = RpcRouter::builder()
        .error_exposure(ErrorExposure::Expose)
        .build()
        .unwrap();
    router.procedure_fn("boom", |_, _| {
        Box::pin(async { Err(RpcFault::unexpected(std::io::Error::other("disk full"))) })
    });

    let wire = router.dispatch(&request(1, "boom")).await.to_wire();
    assert_eq!(wire["error"]["code"], -32603);
    assert_eq!(wire["error"]["data"], "disk full");
}

#[tokio::test]
async fn operational_fault_maps_to_server_error() {
    let mut router = RpcRouter::new();
    router.procedure_fn("flaky", |_, _| {
        Box::pin(async { Err(RpcFault::server("upstream unavailable")) })
    });

    let wire = router.dispatch(&request(1, "flaky")).await.to_wire();
    assert_eq!(wire["error"]["code"], -32000);
    assert_eq!(wire["error"]["message"], "upstream unavailable");
}

#[tokio::test]
async fn handler_may_return_an_explicit_error_response() {
    let mut router = RpcRouter::new();
    router.procedure_fn("teapot", |_, request| {
        Box::pin(async move {
            Ok(RpcResponse::error(
                request.id().clone(),
                RpcErrorObject::new(
                    RpcErrorCode::InvalidParams,
                    Some("cannot brew".to_string()),
                    Some(json!({"pot": "short and stout"})),
                ),
            )
            .into())
        })
    });

    let wire = router.dispatch(&request(7, "teapot")).await.to_wire();
    assert_eq!(wire["id"], 7);
    assert_eq!(wire["error"]["code"], -32602);
    assert_eq!(wire["error"]["data"]["pot"], "short and stout");
}

#[tokio::test]
async fn handle_payload_rejects_invalid_json() {
    let router = greeting_router();
    let reply = router.handle_payload("{not json").await.unwrap();
    let wire: serde_json::Value = serde_json::from_str(&reply).unwrap();
    assert_eq!(wire["error"]["code"], -32700);
    assert_eq!(wire["id"], serde_json::Value::Null);
}

#[tokio::test]
async fn handle_payload_rejects_call_without_method() {
    let router = greeting_router();
    let reply = router
        .handle_payload(r#"{"jsonrpc":"2.0","id":1}"#)
        .await
        .unwrap();
    let wire: serde_json::Value = serde_json::from_str(&reply).unwrap();
    assert_eq!(wire["error"]["code"], -32600);
}

#[tokio::test]
async fn handle_payload_round_trip() {
    let router = greeting_router();
    let reply = router
        .handle_payload(r#"{"jsonrpc":"2.0","id":1,"method":"hello.World","params":{}}"#)
        .await
        .unwrap();
    let wire: serde_json::Value = serde_json::from_str(&reply).unwrap();
    assert_eq!(wire["result"]["greeting"], "Hello, World");
}

#[tokio::test]
async fn concurrent_dispatches_do_not_bleed_parameters() {
    let mut router = RpcRouter::new();
    router.procedure_fn("echo.{word}", |parameters, _| {
        Box::pin(async move {
            // Yield so concurrent dispatches interleave.
            tokio::task::yield_now().await;
            Ok(json!({"word": parameters.get_str("word").unwrap_or("")}).into())
        })
    });

    let router = Arc::new(router);
    let mut handles = Vec::new();
    for index in 0..32 {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            let word = format!("w{}", index);
            let response = router
                .dispatch(&request(index, &format!("echo.{}", word)))
                .await;
            (word, response.to_wire())
        }));
    }

    for handle in handles {
        let (word, wire) = handle.await.unwrap();
        assert_eq!(wire["result"]["word"], json!(word));
    }
}
