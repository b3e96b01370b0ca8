//! Registration endpoint tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use regproxy::config::ProxyConfig;
use sdk_rust::client::ProxyClient;

mod common;

#[tokio::test]
async fn reregistering_a_name_replaces_the_callback() {
    let proxy_addr: SocketAddr = "127.0.0.1:29101".parse().unwrap();
    let (registry, shutdown) = common::start_proxy(proxy_addr, ProxyConfig::default()).await;

    let client = ProxyClient::new(&format!("http://{}", proxy_addr));
    client.register("a", "http://h1:1").await.unwrap();
    client.register("a", "http://h2:2").await.unwrap();

    let snapshot = registry.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].name, "a");
    assert_eq!(snapshot[0].callback.as_str(), "http://h2:2/");

    shutdown.trigger();
}

#[tokio::test]
async fn registration_acknowledges_with_empty_body() {
    let proxy_addr: SocketAddr = "127.0.0.1:29111".parse().unwrap();
    let (_registry, shutdown) = common::start_proxy(proxy_addr, ProxyConfig::default()).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .put(format!("http://{}/register", proxy_addr))
        .json(&serde_json::json!({ "name": "app", "callback": "http://h1:1" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "");

    shutdown.trigger();
}

#[tokio::test]
async fn malformed_registrations_are_rejected() {
    let proxy_addr: SocketAddr = "127.0.0.1:29121".parse().unwrap();
    let (registry, shutdown) = common::start_proxy(proxy_addr, ProxyConfig::default()).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let register_url = format!("http://{}/register", proxy_addr);

    // Not JSON at all.
    let res = client
        .put(&register_url)
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await
        .unwrap();
    assert!(res.status().is_client_error());

    // Empty name.
    let res = client
        .put(&register_url)
        .json(&serde_json::json!({ "name": "  ", "callback": "http://h1:1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    // Callback that is not a URL.
    let res = client
        .put(&register_url)
        .json(&serde_json::json!({ "name": "app", "callback": "not a url" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    // Scheme the proxy cannot forward to.
    let res = client
        .put(&register_url)
        .json(&serde_json::json!({ "name": "app", "callback": "ftp://h1:1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    // None of the rejected payloads reached the registry.
    assert!(registry.is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn non_put_methods_on_register_are_proxied() {
    let proxy_addr: SocketAddr = "127.0.0.1:29131".parse().unwrap();
    let (_registry, shutdown) = common::start_proxy(proxy_addr, ProxyConfig::default()).await;

    // With an empty registry, a proxied request fails with 503 — proving
    // GET /register went to the dispatcher, not the registration handler.
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .get(format!("http://{}/register", proxy_addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 503);

    shutdown.trigger();
}

#[tokio::test]
async fn replaced_upstream_no_longer_receives_traffic() {
    let old_addr: SocketAddr = "127.0.0.1:29141".parse().unwrap();
    let new_addr: SocketAddr = "127.0.0.1:29142".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:29143".parse().unwrap();

    let old_hits = Arc::new(AtomicU32::new(0));
    let oh = old_hits.clone();
    common::start_programmable_upstream(old_addr, move || {
        let oh = oh.clone();
        async move {
            oh.fetch_add(1, Ordering::SeqCst);
            (200, "old".into(), Duration::ZERO)
        }
    })
    .await;

    let new_hits = Arc::new(AtomicU32::new(0));
    let nh = new_hits.clone();
    common::start_programmable_upstream(new_addr, move || {
        let nh = nh.clone();
        async move {
            nh.fetch_add(1, Ordering::SeqCst);
            (200, "new".into(), Duration::ZERO)
        }
    })
    .await;

    let (_registry, shutdown) = common::start_proxy(proxy_addr, ProxyConfig::default()).await;

    let client = ProxyClient::new(&format!("http://{}", proxy_addr));
    client
        .register("app", &format!("http://{}", old_addr))
        .await
        .unwrap();
    client
        .register("app", &format!("http://{}", new_addr))
        .await
        .unwrap();

    let res = client.proxy_get("/ping").await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "new");

    assert_eq!(old_hits.load(Ordering::SeqCst), 0);
    assert_eq!(new_hits.load(Ordering::SeqCst), 1);

    shutdown.trigger();
}
