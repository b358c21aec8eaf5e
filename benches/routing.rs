use std::hint::black_box;

use bramble::handler::handler;
use bramble::Router;
use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;

fn build_router() -> Router {
    let mut router = Router::new();
    let noop = || handler(|_| Ok(()));
    router.get("/", noop()).unwrap();
    router.get("/about/team", noop()).unwrap();
    router.get("/users/{id}", noop()).unwrap();
    router.get("/users/{id}/posts/{slug}", noop()).unwrap();
    router.get("/orders/{id:[0-9]+}", noop()).unwrap();
    router.get("/archive/{year}-{month}", noop()).unwrap();
    router.get("/files/{path*}", noop()).unwrap();
    router.post("/users/{id}", noop()).unwrap();
    for i in 0..50 {
        router.get(&format!("/svc/{i}/status"), noop()).unwrap();
    }
    router
}

fn bench_find(c: &mut Criterion) {
    let router = build_router();
    let mut group = c.benchmark_group("find");

    let cases = [
        ("static", "/about/team"),
        ("one_param", "/users/12345"),
        ("two_params", "/users/12345/posts/hello-world"),
        ("regex", "/orders/98765"),
        ("multi_token", "/archive/2024-06"),
        ("wildcard", "/files/a/b/c/d/e.txt"),
        ("miss", "/nope/nothing/here"),
    ];

    for (name, path) in cases {
        group.bench_function(name, |b| {
            let mut values = vec![""; router.max_params()];
            b.iter(|| {
                let m = router.find(&Method::GET, black_box(path), &mut values);
                black_box(m.matched)
            });
        });
    }
    group.finish();
}

fn bench_handle(c: &mut Criterion) {
    let router = build_router();
    c.bench_function("handle/one_param", |b| {
        b.iter(|| black_box(router.handle(&Method::GET, black_box("/users/12345"))))
    });
}

criterion_group!(benches, bench_find, bench_handle);
criterion_main!(benches);
