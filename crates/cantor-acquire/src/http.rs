use crate::error::Result;
use std::time::Duration;

/// Browser-like user agent; several catalogs serve stripped pages to unknown clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/41.0.2228.0 Safari/537.36";

/// Settings shared by every client built for a session, proxied or not.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Per-request timeout. `None` waits as long as the transport does.
    pub timeout: Option<Duration>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

/// A fetched page. The body is kept even for non-2xx statuses because
/// presence predicates, not status codes, decide whether a page is real.
#[derive(Debug, Clone)]
pub struct Page {
    pub status: u16,
    pub body: String,
}

/// GET-only client, cheap to clone and safe to share across pooled workers.
///
/// A proxied client is a distinct value: after a circuit rotation a new one
/// is built and handed forward instead of mutating the old one.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    proxy: Option<String>,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Self::build(config, None)
    }

    /// A client whose traffic goes through a SOCKS5 proxy. Host names are
    /// resolved by the proxy.
    pub fn with_socks_proxy(config: &HttpConfig, ip: &str, port: u16) -> Result<Self> {
        Self::build(config, Some(format!("socks5h://{ip}:{port}")))
    }

    fn build(config: &HttpConfig, proxy: Option<String>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(proxy_url) = &proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }
        Ok(Self {
            client: builder.build()?,
            proxy,
        })
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn is_proxied(&self) -> bool {
        self.proxy.is_some()
    }

    /// Fetch `url`. Any transport failure (DNS, refused connection, timeout,
    /// TLS) is logged and turned into `None`.
    pub async fn get(&self, url: &str) -> Option<Page> {
        tracing::debug!(url = %url, proxied = self.is_proxied(), "GET");

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Unable to download url");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "Non-success status");
        }

        match response.text().await {
            Ok(body) => Some(Page {
                status: status.as_u16(),
                body,
            }),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to read response body");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeSite;

    #[test]
    fn test_socks_proxy_address() {
        let client = HttpClient::with_socks_proxy(&HttpConfig::default(), "127.0.0.1", 9050).unwrap();
        assert_eq!(client.proxy(), Some("socks5h://127.0.0.1:9050"));
        assert!(client.is_proxied());
        assert!(!HttpClient::new(&HttpConfig::default()).unwrap().is_proxied());
    }

    #[tokio::test]
    async fn test_refused_connection_is_none() {
        let client = HttpClient::new(&HttpConfig {
            timeout: Some(Duration::from_secs(5)),
            ..HttpConfig::default()
        })
        .unwrap();
        assert!(client.get("http://127.0.0.1:1/nothing").await.is_none());
    }

    #[tokio::test]
    async fn test_get_keeps_body_of_missing_page() {
        let site = FakeSite::new().page("/wiki/Found", "<p>here</p>").serve().await;
        let client = HttpClient::new(&HttpConfig::default()).unwrap();

        let found = client.get(&site.url("/wiki/Found")).await.unwrap();
        assert_eq!(found.status, 200);
        assert_eq!(found.body, "<p>here</p>");

        let missing = client.get(&site.url("/wiki/Missing")).await.unwrap();
        assert_eq!(missing.status, 404);
        assert!(missing.body.contains("noarticletext"));
    }

    #[tokio::test]
    async fn test_shared_across_tasks() {
        let site = FakeSite::new().page("/a", "alpha").serve().await;
        let client = HttpClient::new(&HttpConfig::default()).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let client = client.clone();
                let url = site.url("/a");
                tokio::spawn(async move { client.get(&url).await.map(|p| p.body) })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().as_deref(), Some("alpha"));
        }
    }
}
