//! HTTP retrieval of listing pages.

use reqwest::Client;
use std::time::Duration;
use tracing::{info, instrument};

/// Why a listing page could not be retrieved.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout { url: url.to_string() }
        } else {
            FetchError::Request {
                url: url.to_string(),
                source: err.without_url(),
            }
        }
    }
}

/// Build the HTTP client shared by the fetcher and the Telegram sender.
///
/// Every request made through it is bounded by `timeout`.
pub fn build_client(timeout: Duration, user_agent: &str) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
}

/// GET a listing page and return its body.
///
/// # Arguments
///
/// * `client` - Client from [`build_client`]; its timeout bounds the request
/// * `url` - Absolute listing page URL
///
/// # Returns
///
/// The response body as text. Timeouts, connection failures and non-2xx
/// answers are reported as [`FetchError`]; redirects are followed.
#[instrument(level = "info", skip(client))]
pub async fn fetch_listing(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;
    info!(bytes = body.len(), "Fetched listing page");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;

    async fn spawn_test_server() -> (String, tokio::task::JoinHandle<()>) {
        let app = Router::new()
            .route("/ok", get(|| async { "<html><body>listing</body></html>" }))
            .route(
                "/broken",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "temporary failure") }),
            )
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "too late"
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let address = listener.local_addr().expect("local addr should exist");
        let join_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server should run");
        });
        (format!("http://{address}"), join_handle)
    }

    fn client(timeout: Duration) -> Client {
        build_client(timeout, "india_news_relay-test").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_listing_ok() {
        let (base, server) = spawn_test_server().await;
        let body = fetch_listing(&client(Duration::from_secs(5)), &format!("{base}/ok"))
            .await
            .unwrap();
        assert!(body.contains("listing"));
        server.abort();
    }

    #[tokio::test]
    async fn test_fetch_listing_http_error() {
        let (base, server) = spawn_test_server().await;
        let err = fetch_listing(&client(Duration::from_secs(5)), &format!("{base}/broken"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
        server.abort();
    }

    #[tokio::test]
    async fn test_fetch_listing_timeout() {
        let (base, server) = spawn_test_server().await;
        let err = fetch_listing(&client(Duration::from_millis(200)), &format!("{base}/slow"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }));
        server.abort();
    }

    #[tokio::test]
    async fn test_fetch_listing_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);
        let err = fetch_listing(&client(Duration::from_secs(5)), &format!("http://{address}/"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
    }
}
