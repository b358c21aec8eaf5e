//! End-to-end dispatch flows: groups, middleware, fallback chains, and
//! reverse routing through the context.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bramble::handler::handler;
use bramble::{HttpError, Router};
use http::{Method, StatusCode};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn group_prefix_and_middleware_order() {
    init_tracing();
    let mut router = Router::new();
    {
        let mut api = router.group("/api");
        api.use_middleware(handler(|ctx| {
            ctx.next()?;
            let tagged = format!("[{}]", String::from_utf8_lossy(ctx.body()));
            ctx.set_body(tagged.into_bytes());
            Ok(())
        }));
        let mut v1 = api.group("/v1");
        v1.get(
            "/users/{id}",
            handler(|ctx| {
                let id = ctx.param("id").unwrap_or("").to_owned();
                ctx.text(StatusCode::OK, id);
                Ok(())
            }),
        )
        .unwrap();
    }

    let res = router.handle(&Method::GET, "/api/v1/users/9");
    assert_eq!(res.status, StatusCode::OK);
    // The group middleware wraps the endpoint output.
    assert_eq!(res.body, b"[9]");

    // The prefix is part of the pattern.
    let res = router.handle(&Method::GET, "/v1/users/9");
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[test]
fn root_middleware_applies_to_fallback_chain() {
    let mut router = Router::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    router.use_middleware(handler(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));
    router.get("/here", handler(|_| Ok(()))).unwrap();

    router.handle(&Method::GET, "/here");
    router.handle(&Method::GET, "/gone");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn middleware_abort_skips_endpoint() {
    let mut router = Router::new();
    {
        let mut admin = router.group("/admin");
        admin.use_middleware(handler(|ctx| {
            ctx.text(StatusCode::UNAUTHORIZED, "no token");
            ctx.abort();
            Ok(())
        }));
        admin
            .get(
                "/panel",
                handler(|ctx| {
                    ctx.text(StatusCode::OK, "panel");
                    Ok(())
                }),
            )
            .unwrap();
    }

    let res = router.handle(&Method::GET, "/admin/panel");
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body, b"no token");
}

#[test]
fn custom_not_found_chain() {
    let mut router = Router::new();
    router.not_found(vec![handler(|ctx| {
        ctx.text(StatusCode::NOT_FOUND, "nothing here");
        Ok(())
    })]);

    let res = router.handle(&Method::GET, "/anything");
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, b"nothing here");
}

#[test]
fn handler_errors_become_responses() {
    let mut router = Router::new();
    router
        .get(
            "/teapot",
            handler(|_| Err(HttpError::new(StatusCode::IM_A_TEAPOT, "short and stout"))),
        )
        .unwrap();

    let res = router.handle(&Method::GET, "/teapot");
    assert_eq!(res.status, StatusCode::IM_A_TEAPOT);
    assert_eq!(res.body, b"short and stout");
}

#[test]
fn reverse_routing_from_context() {
    let mut router = Router::new();
    router
        .get(
            "/users/{id}",
            handler(|ctx| {
                ctx.text(StatusCode::OK, "user");
                Ok(())
            }),
        )
        .unwrap()
        .name("user.show");
    router
        .get(
            "/whoami",
            handler(|ctx| {
                let location = ctx.url("user.show", [("id", 7)]).unwrap_or_default();
                ctx.text(StatusCode::OK, location);
                Ok(())
            }),
        )
        .unwrap();

    let res = router.handle(&Method::GET, "/whoami");
    assert_eq!(res.body, b"/users/7");
}

#[test]
fn pooled_buffers_outlive_the_request_path() {
    let mut router = Router::new();
    router
        .get("/orders/{id}/items/{item}", handler(|_| Ok(())))
        .unwrap();

    let pool = router.param_pool();
    let captured = {
        // The request path is dropped before the captures are read back.
        let path = String::from("/orders/15/items/7");
        let mut values = vec![""; router.max_params()];
        let matched = router.find(&Method::GET, &path, &mut values);
        assert!(matched.matched);
        let mut guard = pool.checkout();
        guard.fill(&values);
        guard
    };
    assert_eq!(&captured[0], "15");
    assert_eq!(&captured[1], "7");
}

#[test]
fn head_and_get_are_distinct_trees() {
    let mut router = Router::new();
    router
        .get(
            "/doc",
            handler(|ctx| {
                ctx.text(StatusCode::OK, "body");
                Ok(())
            }),
        )
        .unwrap();
    router
        .head(
            "/doc",
            handler(|ctx| {
                ctx.set_status(StatusCode::OK);
                Ok(())
            }),
        )
        .unwrap();

    assert_eq!(router.handle(&Method::GET, "/doc").body, b"body");
    assert!(router.handle(&Method::HEAD, "/doc").body.is_empty());
}
