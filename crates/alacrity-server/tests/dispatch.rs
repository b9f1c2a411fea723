//! Dispatcher integration tests.
//!
//! Drives the full per-request flow through [`App::dispatch`]: stage
//! ordering, error short-circuiting, the halt signal, frozen pre-route
//! steps, idempotent body reads, and route removal.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alacrity_core::{
    boxed, BoxFuture, BoxedHandler, Error, Flow, Handler, HandlerResult, RequestContext,
};
use alacrity_middleware::stages::ParseQueryParams;
use alacrity_middleware::Stage;
use alacrity_server::{App, ErrorResponder};
use bytes::Bytes;
use http::{Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};

type Log = Arc<Mutex<Vec<&'static str>>>;

#[derive(Clone, Copy)]
enum StepResult {
    Continue,
    Halt,
    Fail,
}

/// Appends its name to a shared log, then resolves to its configured result.
struct Step {
    name: &'static str,
    log: Log,
    result: StepResult,
}

impl Handler for Step {
    fn call<'a>(&'a self, _ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            self.log.lock().unwrap().push(self.name);
            match self.result {
                StepResult::Continue => Ok(Flow::Continue),
                StepResult::Halt => Ok(Flow::Halt),
                StepResult::Fail => Err(Error::internal(format!("{} failed", self.name))),
            }
        })
    }
}

fn step(name: &'static str, log: &Log, result: StepResult) -> BoxedHandler {
    boxed(Step {
        name,
        log: Arc::clone(log),
        result,
    })
}

/// Sends a fixed 200 response, logging itself first.
struct Respond {
    name: &'static str,
    log: Log,
    body: &'static str,
}

impl Handler for Respond {
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            self.log.lock().unwrap().push(self.name);
            ctx.send(StatusCode::OK, self.body);
            Ok(Flow::Continue)
        })
    }
}

fn respond(name: &'static str, log: &Log, body: &'static str) -> BoxedHandler {
    boxed(Respond {
        name,
        log: Arc::clone(log),
        body,
    })
}

fn request(method: Method, target: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .method(method)
        .uri(target)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn request_with_body(method: Method, target: &str, body: &'static str) -> Request<Full<Bytes>> {
    Request::builder()
        .method(method)
        .uri(target)
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap()
}

async fn body_text(response: alacrity_core::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Counts invocations, then writes the default-shaped error response.
struct CountingResponder {
    count: Arc<AtomicUsize>,
}

impl ErrorResponder for CountingResponder {
    fn respond<'a>(&'a self, ctx: &'a mut RequestContext, error: &'a Error) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.count.fetch_add(1, Ordering::SeqCst);
            ctx.send(error.status_code(), error.to_string());
        })
    }
}

#[tokio::test]
async fn test_successful_request_runs_stages_in_order() {
    let log: Log = Arc::default();
    let mut app = App::new();

    app.add_stage_boxed(Stage::Setup, step("s1", &log, StepResult::Continue));
    app.add_stage_boxed(Stage::Setup, step("s2", &log, StepResult::Continue));
    app.add_stage_boxed(Stage::Pre, step("u1", &log, StepResult::Continue));
    app.add_stage_boxed(Stage::Pre, step("u2", &log, StepResult::Continue));
    app.add_stage_boxed(Stage::After, step("a1", &log, StepResult::Continue));
    app.add_stage_boxed(Stage::After, step("a2", &log, StepResult::Continue));
    app.add_stage_boxed(Stage::Finally, step("f1", &log, StepResult::Continue));
    app.add_stage_boxed(Stage::Finally, step("f2", &log, StepResult::Continue));

    app.get(
        "/go",
        vec![
            step("h1", &log, StepResult::Continue),
            respond("h2", &log, "done"),
        ],
    )
    .unwrap();

    let response = app.dispatch(request(Method::GET, "/go")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "done");
    assert_eq!(
        *log.lock().unwrap(),
        vec!["s1", "s2", "u1", "u2", "h1", "h2", "a1", "a2", "f1", "f2"]
    );
}

#[tokio::test]
async fn test_stage_error_skips_after_but_runs_finally() {
    let log: Log = Arc::default();
    let count = Arc::new(AtomicUsize::new(0));
    let mut app = App::new();
    app.set_error_responder(CountingResponder {
        count: Arc::clone(&count),
    });

    app.add_stage_boxed(Stage::Pre, step("u1", &log, StepResult::Fail));
    app.add_stage_boxed(Stage::Pre, step("u2", &log, StepResult::Continue));
    app.add_stage_boxed(Stage::After, step("a1", &log, StepResult::Continue));
    app.add_stage_boxed(Stage::Finally, step("f1", &log, StepResult::Continue));

    app.get("/go", vec![respond("h1", &log, "unreachable")]).unwrap();

    let response = app.dispatch(request(Method::GET, "/go")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(*log.lock().unwrap(), vec!["u1", "f1"]);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_halt_after_sending_is_success() {
    let log: Log = Arc::default();
    let count = Arc::new(AtomicUsize::new(0));
    let mut app = App::new();
    app.set_error_responder(CountingResponder {
        count: Arc::clone(&count),
    });

    // A caching middleware that answers from its cache and halts.
    struct CacheHit {
        log: Log,
    }
    impl Handler for CacheHit {
        fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async move {
                self.log.lock().unwrap().push("cache");
                ctx.send(StatusCode::OK, "cached");
                Ok(Flow::Halt)
            })
        }
    }

    app.add_stage_boxed(Stage::Pre, boxed(CacheHit { log: Arc::clone(&log) }));
    app.add_stage_boxed(Stage::After, step("a1", &log, StepResult::Continue));
    app.add_stage_boxed(Stage::Finally, step("f1", &log, StepResult::Continue));
    app.get("/item", vec![respond("h1", &log, "fresh")]).unwrap();

    let response = app.dispatch(request(Method::GET, "/item")).await.unwrap();
    assert_eq!(body_text(response).await, "cached");
    // Route handler and `after` skipped; `finally` ran; no error responder.
    assert_eq!(*log.lock().unwrap(), vec!["cache", "f1"]);
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_halt_without_response_yields_none() {
    let log: Log = Arc::default();
    let mut app = App::new();
    app.get("/quiet", vec![step("h1", &log, StepResult::Halt)]).unwrap();

    let response = app.dispatch(request(Method::GET, "/quiet")).await;
    assert!(response.is_none());
}

#[tokio::test]
async fn test_incomplete_chain_yields_none() {
    let log: Log = Arc::default();
    let mut app = App::new();
    app.add_stage_boxed(Stage::Finally, step("f1", &log, StepResult::Continue));
    app.get("/forgot", vec![step("h1", &log, StepResult::Continue)]).unwrap();

    let response = app.dispatch(request(Method::GET, "/forgot")).await;
    // The dispatcher never force-closes; the transport owns the timeout.
    assert!(response.is_none());
    assert_eq!(*log.lock().unwrap(), vec!["h1", "f1"]);
}

#[tokio::test]
async fn test_unrouted_request_is_405_and_still_finalizes() {
    let log: Log = Arc::default();
    let mut app = App::new();
    app.add_stage_boxed(Stage::Finally, step("f1", &log, StepResult::Continue));
    app.get("/known", vec![respond("h1", &log, "ok")]).unwrap();

    let response = app.dispatch(request(Method::GET, "/unknown")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(body_text(response).await.contains("route not mapped"));
    assert_eq!(*log.lock().unwrap(), vec!["f1"]);
}

#[tokio::test]
async fn test_setup_failure_skips_routing() {
    let log: Log = Arc::default();
    let mut app = App::new();

    app.add_stage_boxed(Stage::Setup, step("s1", &log, StepResult::Fail));
    app.add_stage_boxed(Stage::Finally, step("f1", &log, StepResult::Continue));
    app.get("/go", vec![respond("h1", &log, "ok")]).unwrap();

    let response = app.dispatch(request(Method::GET, "/go")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(*log.lock().unwrap(), vec!["s1", "f1"]);
}

#[tokio::test]
async fn test_pre_route_steps_frozen_at_registration() {
    let log: Log = Arc::default();
    let mut app = App::new();

    app.add_stage_boxed(Stage::Pre, step("u1", &log, StepResult::Continue));
    app.add_stage_boxed(Stage::Pre, step("u2", &log, StepResult::Continue));
    app.get("/frozen", vec![respond("h1", &log, "ok")]).unwrap();

    // Registered after the route: must never run for it.
    app.add_stage_boxed(Stage::Pre, step("u3", &log, StepResult::Continue));

    app.dispatch(request(Method::GET, "/frozen")).await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["u1", "u2", "h1"]);

    log.lock().unwrap().clear();
    app.dispatch(request(Method::GET, "/frozen")).await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["u1", "u2", "h1"]);
}

#[tokio::test]
async fn test_route_registered_later_sees_more_steps() {
    let log: Log = Arc::default();
    let mut app = App::new();

    app.add_stage_boxed(Stage::Pre, step("u1", &log, StepResult::Continue));
    app.get("/early", vec![respond("e", &log, "ok")]).unwrap();
    app.add_stage_boxed(Stage::Pre, step("u2", &log, StepResult::Continue));
    app.get("/late", vec![respond("l", &log, "ok")]).unwrap();

    app.dispatch(request(Method::GET, "/early")).await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["u1", "e"]);

    log.lock().unwrap().clear();
    app.dispatch(request(Method::GET, "/late")).await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["u1", "u2", "l"]);
}

#[tokio::test]
async fn test_route_vars_raw_and_query_overwrites() {
    let mut app = App::new();
    app.add_stage(Stage::Pre, ParseQueryParams);

    struct Echo;
    impl Handler for Echo {
        fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async move {
                let uid = ctx.param("uid").unwrap_or("-").to_string();
                let x = ctx.param("x").unwrap_or("-").to_string();
                ctx.send(StatusCode::OK, format!("{uid}|{x}"));
                Ok(Flow::Continue)
            })
        }
    }

    app.get("/users/:uid", vec![boxed(Echo)]).unwrap();

    let response = app
        .dispatch(request(Method::GET, "/users/a%20b?x=1"))
        .await
        .unwrap();
    // The captured variable stays raw; the query param is decoded.
    assert_eq!(body_text(response).await, "a%20b|1");
}

#[tokio::test]
async fn test_remove_route_then_re_register() {
    let log: Log = Arc::default();
    let mut app = App::new();

    let handle = app.get("/w/:x", vec![respond("one", &log, "one")]).unwrap();
    let response = app.dispatch(request(Method::GET, "/w/5")).await.unwrap();
    assert_eq!(body_text(response).await, "one");

    assert!(app.remove_route(&handle));
    let response = app.dispatch(request(Method::GET, "/w/5")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    app.get("/w/:x", vec![respond("two", &log, "two")]).unwrap();
    let response = app.dispatch(request(Method::GET, "/w/5")).await.unwrap();
    assert_eq!(body_text(response).await, "two");
}

#[tokio::test]
async fn test_body_read_is_idempotent_within_a_request() {
    let mut app = App::new();

    struct ReadTwice;
    impl Handler for ReadTwice {
        fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async move {
                let first = ctx.read_body().await?.clone();
                let second = ctx.read_body().await?.clone();
                assert_eq!(first, second);
                ctx.send(StatusCode::OK, format!("{}", first.len()));
                Ok(Flow::Continue)
            })
        }
    }

    app.post("/submit", vec![boxed(ReadTwice)]).unwrap();

    let response = app
        .dispatch(request_with_body(Method::POST, "/submit", "hello"))
        .await
        .unwrap();
    assert_eq!(body_text(response).await, "5");
}

#[tokio::test]
async fn test_custom_error_responder_formats_response() {
    let mut app = App::new();

    struct TeapotResponder;
    impl ErrorResponder for TeapotResponder {
        fn respond<'a>(
            &'a self,
            ctx: &'a mut RequestContext,
            error: &'a Error,
        ) -> BoxFuture<'a, ()> {
            Box::pin(async move {
                let _ = ctx.send_json(
                    StatusCode::IM_A_TEAPOT,
                    &serde_json::json!({ "message": error.to_string() }),
                );
            })
        }
    }

    app.set_error_responder(TeapotResponder);
    let log: Log = Arc::default();
    app.get("/fails", vec![step("h1", &log, StepResult::Fail)]).unwrap();

    let response = app.dispatch(request(Method::GET, "/fails")).await.unwrap();
    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert!(body_text(response).await.contains("h1 failed"));
}

#[tokio::test]
async fn test_method_string_registration_normalizes_case() {
    let log: Log = Arc::default();
    let mut app = App::new();
    app.route("get", "/lower", vec![respond("h", &log, "ok")]).unwrap();

    let response = app.dispatch(request(Method::GET, "/lower")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_panicking_handler_becomes_500() {
    let mut app = App::new();

    struct Panics;
    impl Handler for Panics {
        fn call<'a>(&'a self, _ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async { panic!("deliberate test panic") })
        }
    }

    app.get("/boom", vec![boxed(Panics)]).unwrap();

    let response = app.dispatch(request(Method::GET, "/boom")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
