use std::future::Future;
use std::time::Duration;

use log::debug;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};

use crate::FetchError;

/// The network seam of the pipeline. Both calls resolve to the response
/// body, treating any non-success status as an error.
pub trait HttpSource {
    fn get_text(&self, url: &str, user_agent: &str) -> impl Future<Output = Result<String, FetchError>> + Send;

    fn post_json(
        &self,
        url: &str,
        user_agent: &str,
        body: &serde_json::Value,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// reqwest-backed source where every call is bounded by a fixed timeout
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    async fn read(&self, request: reqwest::RequestBuilder) -> Result<String, FetchError> {
        let call = async {
            let resp = request.send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }
            Ok(resp.text().await?)
        };

        // Dropping the future on timeout aborts the in-flight request.
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))?
    }
}

impl HttpSource for HttpClient {
    async fn get_text(&self, url: &str, user_agent: &str) -> Result<String, FetchError> {
        debug!("GET {url}");
        self.read(self.client.get(url).header(USER_AGENT, user_agent)).await
    }

    async fn post_json(&self, url: &str, user_agent: &str, body: &serde_json::Value) -> Result<String, FetchError> {
        debug!("POST {url}");
        let request = self
            .client
            .post(url)
            .header(USER_AGENT, user_agent)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        self.read(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn local_client(timeout: Duration) -> HttpClient {
        HttpClient {
            client: reqwest::Client::builder().no_proxy().build().unwrap(),
            timeout,
        }
    }

    #[tokio::test]
    async fn test_stalled_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections but never answer them.
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let timeout = Duration::from_millis(200);
        let client = local_client(timeout);
        let err = client.get_text(&format!("http://{addr}/"), "test").await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout(d) if d == timeout));
    }

    #[tokio::test]
    async fn test_error_status_is_fetch_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let _ = stream
                    .write_all(b"HTTP/1.1 429 Too Many Requests\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                    .await;
            }
        });

        let client = local_client(Duration::from_secs(5));
        let err = client.get_text(&format!("http://{addr}/"), "test").await.unwrap_err();
        assert!(matches!(err, FetchError::Status(429)));
    }
}
