//! Runs the storage service on an ephemeral port and drives it through the
//! HTTP gateway over real gRPC.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use kvstore::gateway::protocol::{DeleteValueResponse, GetValueResponse, SetValueResponse};
use kvstore::gateway::{KvBackend, RpcBackend, build_router};
use kvstore::server::Server;
use serde::de::DeserializeOwned;
use tokio::sync::oneshot;
use tower::util::ServiceExt;

struct Harness {
    addr: SocketAddr,
    backend: RpcBackend,
    shutdown: oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<()>,
}

impl Harness {
    async fn start() -> Self {
        let server = Server::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr();
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            server
                .run_until(async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        let backend = RpcBackend::connect(&format!("http://{}", addr)).await.unwrap();
        Self {
            addr,
            backend,
            shutdown: tx,
            handle,
        }
    }

    fn router(&self) -> Router {
        build_router(Arc::new(self.backend.clone()))
    }

    async fn stop(self) {
        let Harness {
            backend,
            shutdown,
            handle,
            ..
        } = self;
        drop(backend);

        let _ = shutdown.send(());
        handle.await.unwrap();
    }
}

async fn call<T: DeserializeOwned>(app: &Router, method: Method, uri: &str, body: Option<String>) -> (StatusCode, T) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: &Router, key: &str) -> GetValueResponse {
    let (status, resp) = call(app, Method::GET, &format!("/getValue/{}", key), None).await;
    assert_eq!(status, StatusCode::OK);
    resp
}

async fn set(app: &Router, key: &str, value: &str) -> String {
    let body = serde_json::json!({ "key": key, "value": value }).to_string();
    let (status, resp): (_, SetValueResponse) = call(app, Method::POST, "/setValue", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    resp.response
}

async fn delete(app: &Router, key: &str) -> String {
    let (status, resp): (_, DeleteValueResponse) =
        call(app, Method::DELETE, &format!("/deleteValue/{}", key), None).await;
    assert_eq!(status, StatusCode::OK);
    resp.response
}

#[tokio::test]
async fn test_get_set_update_delete_lifecycle() {
    let harness = Harness::start().await;
    let app = harness.router();

    let resp = get(&app, "testKey1").await;
    assert!(!resp.found);
    assert_eq!(resp.value, "");

    assert_eq!(
        set(&app, "testKey1", "testValue1").await,
        "New key testKey1 added with value testValue1"
    );
    assert_eq!(get(&app, "testKey1").await.value, "testValue1");

    assert_eq!(
        set(&app, "testKey1", "testValue2").await,
        "Key testKey1 existed with value testValue1. Now updated with value testValue2"
    );
    assert_eq!(get(&app, "testKey1").await.value, "testValue2");

    assert_eq!(
        delete(&app, "testKey1").await,
        "Key testKey1 existed and is now deleted"
    );
    assert_eq!(delete(&app, "testKey1").await, "Key testKey1 does not exist");

    drop(app);
    harness.stop().await;
}

#[tokio::test]
async fn test_delete_never_set() {
    let harness = Harness::start().await;
    let app = harness.router();

    assert_eq!(
        delete(&app, "nonExistentKey").await,
        "Key nonExistentKey does not exist"
    );

    let reply = harness
        .backend
        .delete_value("nonExistentKey".to_string())
        .await
        .unwrap();
    assert!(!reply.existed);

    drop(app);
    harness.stop().await;
}

#[tokio::test]
async fn test_empty_value_over_rpc() {
    // The gateway refuses empty values, the storage service does not.
    let harness = Harness::start().await;

    let reply = harness
        .backend
        .set_value("testKey".to_string(), String::new())
        .await
        .unwrap();
    assert!(!reply.existed);

    let reply = harness.backend.get_value("testKey".to_string()).await.unwrap();
    assert!(reply.found);
    assert_eq!(reply.value, "");

    let reply = harness.backend.get_value("neverSet".to_string()).await.unwrap();
    assert!(!reply.found);
    assert_eq!(reply.value, "");

    harness.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sets_leave_one_value() {
    let harness = Harness::start().await;

    let mut tasks = Vec::new();
    for i in 0..32 {
        let backend = harness.backend.clone();
        tasks.push(tokio::spawn(async move {
            let value = format!("value-{}", i);
            let reply = backend
                .set_value("shared".to_string(), value.clone())
                .await
                .unwrap();
            (value, reply.existed)
        }));
    }

    let mut written = Vec::new();
    let mut new_key_count = 0;
    for task in tasks {
        let (value, existed) = task.await.unwrap();
        if !existed {
            new_key_count += 1;
        }
        written.push(value);
    }
    assert_eq!(new_key_count, 1);

    let reply = harness.backend.get_value("shared".to_string()).await.unwrap();
    assert!(reply.found);
    assert!(written.contains(&reply.value));

    harness.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_gets_complete() {
    let harness = Harness::start().await;
    harness
        .backend
        .set_value("k".to_string(), "v".to_string())
        .await
        .unwrap();

    let mut tasks = Vec::new();
    for _ in 0..64 {
        let backend = harness.backend.clone();
        tasks.push(tokio::spawn(async move {
            backend.get_value("k".to_string()).await.unwrap().value
        }));
    }

    let all = tokio::time::timeout(std::time::Duration::from_secs(10), async {
        let mut values = Vec::new();
        for task in tasks {
            values.push(task.await.unwrap());
        }
        values
    })
    .await
    .unwrap();
    assert!(all.iter().all(|v| v == "v"));

    harness.stop().await;
}

#[tokio::test]
async fn test_server_stops_on_shutdown() {
    let harness = Harness::start().await;
    let addr = harness.addr;
    harness.stop().await;

    let backend = RpcBackend::connect_lazy(&format!("http://{}", addr)).unwrap();
    assert!(backend.get_value("k".to_string()).await.is_err());
}
