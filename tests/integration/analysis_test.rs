//! Analysis refresh tests against a live HTTP endpoint

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use pulse_feed::analysis::{AnalysisClient, AnalysisClientConfig, AnalysisSource, AnalysisTracker};

const ANALYSIS_BODY: &str = r#"{
    "last_updated": "2024-01-15T06:00:00.000000",
    "btc": {
        "price": 43521.5,
        "technical_analysis": {
            "sma_20": 43100.25,
            "sma_50": 42800.10,
            "rsi": 72.5,
            "summary": "BTC stretched above both moving averages."
        },
        "news_sentiment": {
            "overall_sentiment": "positive",
            "summary": "ETF inflows continue.",
            "headlines": ["Bitcoin ETF sees record inflows"]
        }
    }
}"#;

/// Serve one HTTP request with the given JSON body, then release the port
async fn spawn_oneshot_analysis_server(body: &'static str) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().expect("no local addr");
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept failed");
        // The request head fits in one read on loopback
        let mut buf = [0u8; 1024];
        let _ = stream.read(&mut buf).await;
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
             content-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream
            .write_all(response.as_bytes())
            .await
            .expect("write failed");
        let _ = stream.shutdown().await;
    });
    (addr, handle)
}

fn analysis_client(addr: SocketAddr) -> AnalysisClient {
    AnalysisClient::with_config(AnalysisClientConfig {
        url: format!("http://{}/analysis.json", addr),
        timeout: Duration::from_secs(5),
    })
}

#[tokio::test]
async fn test_refresh_fetches_live_document() {
    let (addr, server) = spawn_oneshot_analysis_server(ANALYSIS_BODY).await;
    let tracker = AnalysisTracker::new(analysis_client(addr));

    assert!(tracker.latest().await.is_none());
    tracker.refresh().await.expect("refresh failed");
    server.await.expect("server task panicked");

    let doc = tracker.latest().await.expect("no document after refresh");
    let btc = doc.asset("btc").expect("btc entry missing");
    assert_eq!(btc.technical_analysis.rsi, 72.5);
    // Naive backend timestamps read as UTC
    let ts = doc.last_updated.expect("timestamp missing");
    assert_eq!(ts.to_rfc3339(), "2024-01-15T06:00:00+00:00");
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_document() {
    let (addr, server) = spawn_oneshot_analysis_server(ANALYSIS_BODY).await;
    let tracker = AnalysisTracker::new(analysis_client(addr));

    tracker.refresh().await.expect("first refresh failed");
    // The one-shot server is gone; the port now refuses connections
    server.await.expect("server task panicked");
    assert!(tracker.refresh().await.is_err());

    let doc = tracker.latest().await.expect("document was dropped");
    assert_eq!(doc.asset("btc").unwrap().technical_analysis.rsi, 72.5);
}
