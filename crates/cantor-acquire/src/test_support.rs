//! A tiny in-process HTTP server serving canned pages, so adapters and the
//! fetcher can be exercised without touching the network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Body served for unknown paths, shaped like a MediaWiki "no article" page.
pub const NOT_FOUND_BODY: &str =
    r#"<html><body><div class="noarticletext">There is currently no text in this page.</div></body></html>"#;

#[derive(Default)]
pub struct FakeSite {
    pages: HashMap<String, String>,
}

pub struct RunningSite {
    base: String,
    hits: Arc<AtomicUsize>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page. `path` includes the query string, if any.
    pub fn page(mut self, path: &str, body: &str) -> Self {
        self.pages.insert(path.to_string(), body.to_string());
        self
    }

    pub async fn serve(self) -> RunningSite {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake site");
        let addr = listener.local_addr().expect("local addr");
        let pages = Arc::new(self.pages);
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let pages = Arc::clone(&pages);
                let counter = Arc::clone(&counter);
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }
                    counter.fetch_add(1, Ordering::SeqCst);

                    let head = String::from_utf8_lossy(&request);
                    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    let (status, body) = match pages.get(&path) {
                        Some(body) => ("200 OK", body.as_str()),
                        None => ("404 Not Found", NOT_FOUND_BODY),
                    };
                    let response = format!(
                        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\n\
                         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        RunningSite {
            base: format!("http://{addr}"),
            hits,
        }
    }
}

impl RunningSite {
    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}
