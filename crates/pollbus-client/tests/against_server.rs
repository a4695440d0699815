use pollbus_client::{BusClient, ClientConfig, ClientError};
use pollbus_core::{BusConfig, Cursor, MemoryStore, MessageId, StaleCursorPolicy};
use pollbus_server::{config::AppState, router, serve};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

fn quick_bus() -> BusConfig {
    BusConfig {
        capacity: 5,
        poll_timeout: Duration::from_millis(400),
        sleep_interval: Duration::from_millis(20),
        ..Default::default()
    }
}

async fn start_server(bus: BusConfig) -> (SocketAddr, AppState) {
    let state = AppState::new(Arc::new(MemoryStore::new()), &bus)
        .await
        .unwrap();
    let app = router(state.clone(), None);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, app, std::future::pending()));
    (addr, state)
}

fn client_for(addr: SocketAddr) -> BusClient {
    let config = ClientConfig::new(&format!("http://{}/chat", addr))
        .unwrap()
        .with_request_timeout(Duration::from_secs(5))
        .with_retry_delay(Duration::from_millis(20));
    BusClient::new(config).unwrap()
}

#[tokio::test]
async fn test_post_and_poll() {
    let (addr, _state) = start_server(quick_bus()).await;
    let client = client_for(addr);

    client.post("hi", "alice").await.unwrap();
    client.post("yo", "bob").await.unwrap();

    let messages = client.poll(&Cursor::Start).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].m, "hi");
    assert_eq!(messages[1].u, "bob");

    let started = Instant::now();
    let nothing = client.poll(&Cursor::After(messages[1].t)).await.unwrap();
    assert!(nothing.is_empty());
    assert!(started.elapsed() >= Duration::from_millis(400));
}

#[tokio::test]
async fn test_dump_and_clear() {
    let (addr, _state) = start_server(quick_bus()).await;
    let client = client_for(addr);

    client.post("one", "a").await.unwrap();
    let dump = client.dump().await.unwrap();
    assert_eq!(dump.len(), 1);
    assert_eq!(dump[0].id, MessageId::new(1));

    client.clear().await.unwrap();
    assert!(client.dump().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_subscription_follows_new_posts() {
    let (addr, state) = start_server(quick_bus()).await;
    let client = client_for(addr);
    let messages = client.subscribe(Cursor::Start);

    for i in 0..3 {
        tokio::time::sleep(Duration::from_millis(150)).await;
        state.log.append(format!("update {}", i), "feed").await.unwrap();
    }

    for i in 0..3 {
        let message = tokio::time::timeout(Duration::from_secs(3), messages.recv())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(message.m, format!("update {}", i));
    }
}

#[tokio::test]
async fn test_subscription_resyncs_after_history_dropped() {
    let bus = BusConfig {
        stale_cursor: StaleCursorPolicy::Reject,
        ..quick_bus()
    };
    let (addr, state) = start_server(bus).await;
    let client = client_for(addr);

    state.log.append("current", "a").await.unwrap();

    let err = client
        .poll(&Cursor::After(MessageId::new(999)))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::HistoryDropped));

    let messages = client.subscribe(Cursor::After(MessageId::new(999)));
    let message = tokio::time::timeout(Duration::from_secs(3), messages.recv())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(message.m, "current");
}

#[tokio::test]
async fn test_subscription_gives_up_on_dead_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::new(&format!("http://{}/chat", addr))
        .unwrap()
        .with_retry_delay(Duration::from_millis(10))
        .with_max_retries(2);
    let client = BusClient::new(config).unwrap();

    let messages = client.subscribe(Cursor::Start);
    let last = tokio::time::timeout(Duration::from_secs(5), messages.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(last.unwrap_err().is_retryable());
    assert!(messages.recv().await.is_err());
}
