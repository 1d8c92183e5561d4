//! Integration Tests for the HTTP Transport
//!
//! Runs two nodes on loopback listeners and checks that gets and deletes
//! reach the node owning each key.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use peercache::{
    create_router, AppState, CacheError, Group, GroupRegistry, HttpPool, Loaded, LoaderFn,
};
use tokio::net::TcpListener;

// == Test Harness ==

struct Node {
    addr: String,
    pool: Arc<HttpPool>,
    group: Arc<Group>,
    loads: Arc<AtomicUsize>,
}

/// Starts `count` nodes that all share the same membership.
async fn start_cluster(count: usize) -> Vec<Node> {
    start_cluster_with_views(count, |all, _| all.to_vec()).await
}

/// Starts `count` nodes; `view(all, index)` picks the members node `index` sees.
async fn start_cluster_with_views(
    count: usize,
    view: impl Fn(&[String], usize) -> Vec<String>,
) -> Vec<Node> {
    let mut listeners = Vec::new();
    for _ in 0..count {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());
        listeners.push((addr, listener));
    }
    let members: Vec<String> = listeners.iter().map(|(addr, _)| addr.clone()).collect();

    let mut nodes = Vec::new();
    for (index, (addr, listener)) in listeners.into_iter().enumerate() {
        let loads = Arc::new(AtomicUsize::new(0));
        let loader_calls = loads.clone();
        let registry = Arc::new(GroupRegistry::new());
        let group = registry.new_group(
            "scores",
            1 << 20,
            LoaderFn(move |key: &str| {
                loader_calls.fetch_add(1, Ordering::SeqCst);
                (!key.starts_with("missing")).then(|| Loaded::new(format!("node{index}:{key}")))
            }),
        );

        let pool = Arc::new(HttpPool::new(addr.as_str()));
        pool.set_peers(view(&members, index)).unwrap();
        group.register_peers(pool.clone()).unwrap();

        let app = create_router(AppState::new(registry));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        nodes.push(Node {
            addr,
            pool,
            group,
            loads,
        });
    }
    nodes
}

/// Finds a key with the given prefix owned by `owner`.
fn key_owned_by(pool: &HttpPool, owner: &str, prefix: &str) -> String {
    (0..10_000)
        .map(|i| format!("{prefix}{i}"))
        .find(|key| pool.owner(key).as_deref() == Some(owner))
        .expect("some key maps to every member")
}

// == Tests ==

#[tokio::test]
async fn test_remote_get_is_served_by_owner() {
    let nodes = start_cluster(2).await;
    let key = key_owned_by(&nodes[0].pool, &nodes[1].addr, "user");

    let value = nodes[0].group.get(&key).await.unwrap();

    assert_eq!(value.to_string(), format!("node1:{key}"));
    assert_eq!(nodes[0].loads.load(Ordering::SeqCst), 0);
    assert_eq!(nodes[1].loads.load(Ordering::SeqCst), 1);
    assert_eq!(nodes[0].group.stats().peer_loads, 1);
    assert_eq!(nodes[0].group.cache_stats().total_entries, 0);
    assert_eq!(nodes[1].group.cache_stats().total_entries, 1);

    // The owner now answers from its store.
    nodes[0].group.get(&key).await.unwrap();
    assert_eq!(nodes[1].loads.load(Ordering::SeqCst), 1);
    assert_eq!(nodes[1].group.stats().cache_hits, 1);
}

#[tokio::test]
async fn test_disagreeing_views_do_not_loop() {
    // node0 sees both members, node1 only knows node0.
    let nodes = start_cluster_with_views(2, |all, index| match index {
        0 => all.to_vec(),
        _ => vec![all[0].clone()],
    })
    .await;
    let key = key_owned_by(&nodes[0].pool, &nodes[1].addr, "user");
    assert_eq!(nodes[1].pool.owner(&key).as_deref(), Some(nodes[0].addr.as_str()));

    let value = tokio::time::timeout(Duration::from_secs(5), nodes[0].group.get(&key))
        .await
        .expect("get must not hang on a routing loop")
        .unwrap();

    // node1 answers forwarded requests itself.
    assert_eq!(value.to_string(), format!("node1:{key}"));
    assert_eq!(nodes[0].loads.load(Ordering::SeqCst), 0);
    assert_eq!(nodes[1].loads.load(Ordering::SeqCst), 1);

    let removed = tokio::time::timeout(Duration::from_secs(5), nodes[0].group.delete(&key))
        .await
        .expect("delete must not hang on a routing loop");
    assert_eq!(removed, Ok(true));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_crossed_views_resolve_concurrent_gets() {
    // Each node believes the other one owns every key.
    let nodes = start_cluster_with_views(2, |all, index| vec![all[1 - index].clone()]);
    let nodes = nodes.await;

    let (first, second) = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(nodes[0].group.get("shared"), nodes[1].group.get("shared"))
    })
    .await
    .expect("crossed routing must not deadlock");

    assert_eq!(first.unwrap().to_string(), "node1:shared");
    assert_eq!(second.unwrap().to_string(), "node0:shared");
}

#[tokio::test]
async fn test_local_get_stays_local() {
    let nodes = start_cluster(2).await;
    let key = key_owned_by(&nodes[0].pool, &nodes[0].addr, "user");

    let value = nodes[0].group.get(&key).await.unwrap();

    assert_eq!(value.to_string(), format!("node0:{key}"));
    assert_eq!(nodes[0].loads.load(Ordering::SeqCst), 1);
    assert_eq!(nodes[1].loads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_remote_delete_reaches_owner() {
    let nodes = start_cluster(2).await;
    let key = key_owned_by(&nodes[0].pool, &nodes[1].addr, "user");

    nodes[0].group.get(&key).await.unwrap();
    assert_eq!(nodes[0].group.delete(&key).await, Ok(true));
    assert_eq!(nodes[1].group.cache_stats().total_entries, 0);

    // Nothing left to remove.
    assert_eq!(nodes[0].group.delete(&key).await, Ok(false));

    // The owner reloads on the next get.
    nodes[0].group.get(&key).await.unwrap();
    assert_eq!(nodes[1].loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_missing_key_is_not_found_across_nodes() {
    let nodes = start_cluster(2).await;
    let key = key_owned_by(&nodes[0].pool, &nodes[1].addr, "missing");

    let err = nodes[0].group.get(&key).await.unwrap_err();

    // The owner reports the miss as an error; the caller then tries its own loader.
    assert!(matches!(err, CacheError::NotFound(_)));
    assert_eq!(nodes[0].group.stats().peer_errors, 1);
    assert_eq!(nodes[0].loads.load(Ordering::SeqCst), 1);
    assert_eq!(nodes[1].loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unreachable_owner_falls_back_to_local_loader() {
    let nodes = start_cluster(1).await;
    let node = &nodes[0];

    // Port 9 (discard) is not served on loopback.
    let dead = "http://127.0.0.1:9";
    node.pool.add_peer(dead).unwrap();
    let key = key_owned_by(&node.pool, dead, "user");

    let value = node.group.get(&key).await.unwrap();

    assert_eq!(value.to_string(), format!("node0:{key}"));
    assert_eq!(node.group.stats().peer_errors, 1);

    // Deletes do not fall back.
    let err = node.group.delete(&key).await.unwrap_err();
    assert!(matches!(err, CacheError::PeerCommunication(_)));
}

#[tokio::test]
async fn test_stats_endpoint_over_http() {
    let nodes = start_cluster(1).await;
    nodes[0].group.get("user").await.unwrap();

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let stats: serde_json::Value = client
        .get(format!("{}/stats/scores", nodes[0].addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["group"], "scores");
    assert_eq!(stats["group_stats"]["local_loads"], 1);
    assert_eq!(stats["cache_stats"]["total_entries"], 1);

    let response = client
        .get(format!("{}/stats/unknown", nodes[0].addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}
