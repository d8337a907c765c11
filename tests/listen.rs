//! Serving over a real socket with graceful shutdown.

mod common;

use std::time::Duration;

use serde_json::{json, Value};
use tokio::net::TcpListener;

use courier::{Actions, NavigateResult, Shutdown};

#[tokio::test]
async fn test_serve_and_shut_down() {
    let mut app = common::app("");
    app.add_route("/status", "status/view").unwrap();
    app.add_module(
        "status",
        Actions::new().on("view", |route, _ctx| {
            let verbose = route.query().contains_key("verbose");
            Box::pin(async move {
                Ok(NavigateResult::data(json!({ "status": "ok", "verbose": verbose })).into())
            })
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = app.server().unwrap();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let response = client
        .get(format!("http://{addr}/status?verbose=1"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "status": "ok", "verbose": true }));

    let response = client
        .get(format!("http://{addr}/unknown"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
