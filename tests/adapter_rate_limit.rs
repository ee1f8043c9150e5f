// tests/adapter_rate_limit.rs
// Rate-limit behavior against a real socket: a 429 gets exactly one retry
// after the fixed delay; persistent failure degrades to an empty list.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use technews_aggregator::fetch::reddit::RedditAdapter;
use technews_aggregator::fetch::SourceAdapter;

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Serve one canned response per accepted connection, then stop.
async fn serve(listener: TcpListener, responses: Vec<String>, hits: Arc<AtomicUsize>) {
    for resp in responses {
        let (mut sock, _) = match listener.accept().await {
            Ok(conn) => conn,
            Err(_) => return,
        };
        hits.fetch_add(1, Ordering::SeqCst);
        let mut buf = [0u8; 4096];
        let _ = sock.read(&mut buf).await;
        let _ = sock.write_all(resp.as_bytes()).await;
        let _ = sock.shutdown().await;
    }
}

const LISTING: &str = r#"{"data":{"children":[{"data":{"id":"ok1","title":"t","score":3,"subreddit":"rust"}}]}}"#;

async fn adapter_against(responses: Vec<String>) -> (Vec<technews_aggregator::RawItem>, usize) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let server = tokio::spawn(serve(listener, responses, hits.clone()));

    let adapter = RedditAdapter::with_base_url(reqwest::Client::new(), format!("http://{addr}"));
    let items = adapter.fetch_recent("rust", 10).await;

    server.abort();
    (items, hits.load(Ordering::SeqCst))
}

#[tokio::test]
async fn a_429_is_retried_once_and_the_second_attempt_wins() {
    let (items, hits) = adapter_against(vec![
        http_response("429 Too Many Requests", ""),
        http_response("200 OK", LISTING),
    ])
    .await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "ok1");
    assert_eq!(hits, 2);
}

#[tokio::test]
async fn a_second_429_gives_up_with_an_empty_list() {
    let (items, hits) = adapter_against(vec![
        http_response("429 Too Many Requests", ""),
        http_response("429 Too Many Requests", ""),
        // never reached; the retry is bounded to one
        http_response("200 OK", LISTING),
    ])
    .await;
    assert!(items.is_empty());
    assert_eq!(hits, 2);
}

#[tokio::test]
async fn a_server_error_is_not_retried() {
    let (items, hits) = adapter_against(vec![http_response("500 Internal Server Error", "")]).await;
    assert!(items.is_empty());
    assert_eq!(hits, 1);
}

#[tokio::test]
async fn a_malformed_body_degrades_to_an_empty_list() {
    let (items, hits) = adapter_against(vec![http_response("200 OK", "not json at all")]).await;
    assert!(items.is_empty());
    assert_eq!(hits, 1);
}
