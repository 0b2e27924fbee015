//! Integration tests for the dashboard price feed

use std::time::Duration;

use rust_decimal_macros::dec;
use serde_json::json;

use pulse_feed::client::{BackoffPolicy, ClientConfig, ConnectionState};
use pulse_feed::feed::DashboardFeed;

use crate::support::{spawn_feed_server, track_states, wait_for_state, ServerCommand};

#[tokio::test]
async fn test_subscribe_delivers_typed_updates() {
    let mut server = spawn_feed_server().await;
    let config = ClientConfig::new(server.url())
        .backoff(BackoffPolicy::new().initial_delay(Duration::from_millis(50)));

    let feed = DashboardFeed::new(config);
    let (client, mut updates) = feed.subscribe();
    let mut states = track_states(&client);

    client.connect();
    wait_for_state(&mut states, ConnectionState::Connected).await;
    server.wait_for_session().await;

    let payload = json!({
        "type": "price_update",
        "data": {
            "eth": {"price": 2280.12, "last_updated": "2024-01-15T10:30:00.123456"},
            "btc": {"price": 43521.5, "last_updated": "2024-01-15T10:30:00.123456"}
        },
        "timestamp": "2024-01-15T10:30:01.000000"
    });
    server
        .commands
        .send(ServerCommand::Send(payload.to_string()))
        .unwrap();

    let update = tokio::time::timeout(Duration::from_secs(5), updates.recv())
        .await
        .expect("timed out waiting for a price update")
        .expect("update channel closed");

    assert_eq!(update.quotes.len(), 2);
    assert_eq!(update.quotes[0].symbol, "btc");
    assert_eq!(update.quotes[0].price, dec!(43521.5));
    assert_eq!(update.quotes[1].symbol, "eth");
    assert_eq!(update.quotes[1].price, dec!(2280.12));
    assert!(update.server_ts.is_some());

    client.close();
}

#[tokio::test]
async fn test_non_price_messages_produce_no_updates() {
    let mut server = spawn_feed_server().await;
    let feed = DashboardFeed::new(ClientConfig::new(server.url()));
    let (client, mut updates) = feed.subscribe();
    let mut states = track_states(&client);

    client.connect();
    wait_for_state(&mut states, ConnectionState::Connected).await;
    server.wait_for_session().await;

    server
        .commands
        .send(ServerCommand::Send(r#"{"type":"pong"}"#.to_string()))
        .unwrap();
    server
        .commands
        .send(ServerCommand::Send(
            json!({
                "type": "price_update",
                "data": {"btc": {"price": 100.5, "last_updated": null}}
            })
            .to_string(),
        ))
        .unwrap();

    // The pong is routed away; only the price update lands
    let update = tokio::time::timeout(Duration::from_secs(5), updates.recv())
        .await
        .expect("timed out waiting for a price update")
        .expect("update channel closed");
    assert_eq!(update.quotes.len(), 1);
    assert_eq!(update.quotes[0].symbol, "btc");
    assert!(updates.try_recv().is_err());

    client.close();
}
