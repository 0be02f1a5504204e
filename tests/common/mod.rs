//! Shared utilities for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use market_cache_proxy::cache::{CacheKey, CacheStore, StoreError};
use market_cache_proxy::config::{CacheFamily, CacheablePathConfig, ProxyConfig, UpstreamConfig};
use market_cache_proxy::pipeline::Pipeline;
use market_cache_proxy::upstream::{Upstream, UpstreamError, UpstreamResponse};

/// Store double that counts calls and can be told to fail.
#[derive(Default)]
pub struct FakeStore {
    entries: Mutex<HashMap<CacheKey, String>>,
    pub gets: AtomicUsize,
    pub puts: AtomicUsize,
    pub fail_get: AtomicBool,
    pub fail_put: AtomicBool,
}

impl FakeStore {
    pub fn seed(&self, key: CacheKey, body: &str) {
        self.entries.lock().unwrap().insert(key, body.to_string());
    }

    pub fn body(&self, key: &CacheKey) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for FakeStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(self.body(key))
    }

    async fn put(&self, key: &CacheKey, body: String) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("throughput exceeded".into()));
        }
        self.entries.lock().unwrap().insert(key.clone(), body);
        Ok(())
    }
}

/// Upstream double returning a scripted result and recording requested URLs.
pub struct FakeUpstream {
    result: Mutex<Result<UpstreamResponse, UpstreamError>>,
    urls: Mutex<Vec<String>>,
}

impl FakeUpstream {
    pub fn ok(status: u16, body: &str) -> Self {
        Self::with_result(Ok(UpstreamResponse {
            status,
            body: body.to_string(),
        }))
    }

    pub fn err(error: UpstreamError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(result: Result<UpstreamResponse, UpstreamError>) -> Self {
        Self {
            result: Mutex::new(result),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(&self, status: u16, body: &str) {
        *self.result.lock().unwrap() = Ok(UpstreamResponse {
            status,
            body: body.to_string(),
        });
    }

    pub fn calls(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn fetch(&self, url: &str) -> Result<UpstreamResponse, UpstreamError> {
        self.urls.lock().unwrap().push(url.to_string());
        self.result.lock().unwrap().clone()
    }
}

/// Pipeline over the default upstream table with the given doubles.
pub fn pipeline(store: &Arc<FakeStore>, upstream: &Arc<FakeUpstream>) -> Pipeline {
    Pipeline::new(&UpstreamConfig::default(), store.clone(), upstream.clone())
}

/// Config that allowlists the mock upstream and proxies to it over plain HTTP.
pub fn config_for(backend: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    let domain = backend.to_string();
    config.upstream.allowed_domains = vec![domain.clone()];
    config.upstream.cacheable_paths = vec![
        CacheablePathConfig {
            prefix: format!("{}/api/historical", domain),
            family: CacheFamily::HistoricalRates,
        },
        CacheablePathConfig {
            prefix: format!("{}/eod", domain),
            family: CacheFamily::EndOfDay,
        },
    ];
    config.upstream.scheme = "http".into();
    config.upstream.timeout_secs = 1;
    config
}

/// Start a programmable mock upstream on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 8192];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let head = String::from_utf8_lossy(&buf[..n]).to_string();
                        let target = head
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .to_string();

                        let (status, body) = f(target).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
