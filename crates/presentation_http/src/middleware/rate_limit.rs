//! Request counter middleware
//!
//! Fixed-window counter per client IP. Every response carries the standard
//! `RateLimit-Limit`, `RateLimit-Remaining` and `RateLimit-Reset` headers.
//! Clients over the limit are logged, never rejected.

use std::{
    collections::HashMap,
    future::Future,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request},
    http::{HeaderName, HeaderValue},
    response::Response,
};
use infrastructure::RateLimitConfig;
use tokio::{sync::RwLock, task::JoinHandle};
use tower::{Layer, Service};
use tracing::{debug, warn};

const LIMIT_HEADER: HeaderName = HeaderName::from_static("ratelimit-limit");
const REMAINING_HEADER: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RESET_HEADER: HeaderName = HeaderName::from_static("ratelimit-reset");

/// Request counter configuration
#[derive(Clone, Debug)]
pub struct RateLimiterConfig {
    /// Requests allowed per window before a client is reported
    pub max_requests: u32,
    /// Window length
    pub window: Duration,
    /// Count requests and emit headers
    pub enabled: bool,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::from(&RateLimitConfig::default())
    }
}

impl From<&RateLimitConfig> for RateLimiterConfig {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: Duration::from_millis(config.window_ms),
            enabled: config.enabled,
        }
    }
}

/// Counter for one client in the current window
#[derive(Debug, Clone)]
struct WindowEntry {
    count: u32,
    started: Instant,
}

/// Snapshot of a client's window after counting a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStatus {
    pub limit: u32,
    pub remaining: u32,
    /// Whole seconds until the window resets
    pub reset_secs: u64,
    pub exceeded: bool,
}

/// Shared counter state
#[derive(Debug)]
pub struct RateLimiterState {
    windows: RwLock<HashMap<IpAddr, WindowEntry>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiterState {
    /// Create a new counter state
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    /// Count a request from `ip` and report the window status
    pub async fn record(&self, ip: IpAddr) -> WindowStatus {
        self.record_at(ip, Instant::now()).await
    }

    async fn record_at(&self, ip: IpAddr, now: Instant) -> WindowStatus {
        let mut windows = self.windows.write().await;

        let entry = windows.entry(ip).or_insert(WindowEntry {
            count: 0,
            started: now,
        });
        if now.duration_since(entry.started) >= self.window {
            entry.count = 0;
            entry.started = now;
        }
        entry.count = entry.count.saturating_add(1);

        let elapsed = now.duration_since(entry.started);
        let reset = self.window.saturating_sub(elapsed);
        WindowStatus {
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(entry.count),
            reset_secs: reset.as_secs() + u64::from(reset.subsec_nanos() > 0),
            exceeded: entry.count > self.max_requests,
        }
    }

    /// Drop windows that have already expired
    pub async fn cleanup(&self) {
        let mut windows = self.windows.write().await;
        let before = windows.len();
        let window = self.window;
        windows.retain(|_, entry| entry.started.elapsed() < window);
        debug!(removed = before - windows.len(), "Request counter cleanup");
    }

    /// Number of clients with a live window
    pub async fn tracked_clients(&self) -> usize {
        self.windows.read().await.len()
    }
}

/// Periodically evict expired windows
pub fn spawn_cleanup_task(state: Arc<RateLimiterState>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            state.cleanup().await;
        }
    })
}

/// Layer that applies the request counter
#[derive(Clone, Debug)]
pub struct RateLimiterLayer {
    state: Arc<RateLimiterState>,
    enabled: bool,
    excluded_paths: Vec<String>,
}

impl RateLimiterLayer {
    /// Create a new counter layer
    #[must_use]
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            state: Arc::new(RateLimiterState::new(config.max_requests, config.window)),
            enabled: config.enabled,
            excluded_paths: vec!["/health".to_string()],
        }
    }

    /// Get a reference to the counter state for cleanup tasks
    #[must_use]
    pub fn state(&self) -> Arc<RateLimiterState> {
        Arc::clone(&self.state)
    }
}

impl<S> Layer<S> for RateLimiterLayer {
    type Service = RateLimiter<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimiter {
            inner,
            state: Arc::clone(&self.state),
            enabled: self.enabled,
            excluded_paths: self.excluded_paths.clone(),
        }
    }
}

/// Middleware service for the request counter
#[derive(Clone, Debug)]
pub struct RateLimiter<S> {
    inner: S,
    state: Arc<RateLimiterState>,
    enabled: bool,
    excluded_paths: Vec<String>,
}

impl<S> Service<Request> for RateLimiter<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let enabled = self.enabled;
        let state = Arc::clone(&self.state);
        let excluded_paths = self.excluded_paths.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if !enabled {
                return inner.call(req).await;
            }

            let path = req.uri().path().to_string();
            if excluded_paths.iter().any(|p| path.starts_with(p.as_str())) {
                return inner.call(req).await;
            }

            let client_ip = extract_client_ip(&req);
            let status = state.record(client_ip).await;
            if status.exceeded {
                warn!(
                    client = %client_ip,
                    path = %path,
                    limit = status.limit,
                    "Client exceeded request limit"
                );
            }

            let mut response = inner.call(req).await?;
            let headers = response.headers_mut();
            headers.insert(LIMIT_HEADER, HeaderValue::from(status.limit));
            headers.insert(REMAINING_HEADER, HeaderValue::from(status.remaining));
            headers.insert(RESET_HEADER, HeaderValue::from(status.reset_secs));
            Ok(response)
        })
    }
}

fn extract_client_ip(req: &Request) -> IpAddr {
    // Reverse proxies put the original client first
    if let Some(ip) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse::<IpAddr>().ok())
    {
        return ip;
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(IpAddr::V4(Ipv4Addr::LOCALHOST), |ConnectInfo(addr)| {
            addr.ip()
        })
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, http::StatusCode, routing::get};
    use tower::ServiceExt;

    use super::*;

    async fn test_handler() -> &'static str {
        "ok"
    }

    fn create_test_router(enabled: bool, max_requests: u32) -> Router {
        let config = RateLimiterConfig {
            enabled,
            max_requests,
            window: Duration::from_secs(60),
        };
        Router::new()
            .route("/test", get(test_handler))
            .route("/health", get(test_handler))
            .layer(RateLimiterLayer::new(&config))
    }

    async fn get_path(app: &Router, uri: &str, forwarded: &str) -> Response {
        app.clone()
            .oneshot(
                axum::http::Request::builder()
                    .uri(uri)
                    .header("x-forwarded-for", forwarded)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    fn header(response: &Response, name: &str) -> Option<String> {
        response
            .headers()
            .get(name)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn disabled_counter_emits_no_headers() {
        let app = create_test_router(false, 1);
        let response = get_path(&app, "/test", "10.0.0.1").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(header(&response, "ratelimit-limit").is_none());
    }

    #[tokio::test]
    async fn headers_count_down() {
        let app = create_test_router(true, 5);

        let first = get_path(&app, "/test", "10.0.0.1").await;
        assert_eq!(header(&first, "ratelimit-limit").as_deref(), Some("5"));
        assert_eq!(header(&first, "ratelimit-remaining").as_deref(), Some("4"));
        assert_eq!(header(&first, "ratelimit-reset").as_deref(), Some("60"));

        let second = get_path(&app, "/test", "10.0.0.1").await;
        assert_eq!(header(&second, "ratelimit-remaining").as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn excess_requests_are_not_blocked() {
        let app = create_test_router(true, 2);

        for _ in 0..5 {
            let response = get_path(&app, "/test", "10.0.0.2").await;
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = get_path(&app, "/test", "10.0.0.2").await;
        assert_eq!(header(&response, "ratelimit-remaining").as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn clients_are_counted_separately() {
        let app = create_test_router(true, 3);
        get_path(&app, "/test", "10.0.0.3").await;
        let other = get_path(&app, "/test", "10.0.0.4").await;
        assert_eq!(header(&other, "ratelimit-remaining").as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn health_endpoint_not_counted() {
        let app = create_test_router(true, 1);
        let response = get_path(&app, "/health", "10.0.0.5").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(header(&response, "ratelimit-limit").is_none());
    }

    #[tokio::test]
    async fn window_resets_after_expiry() {
        let state = RateLimiterState::new(2, Duration::from_secs(10));
        let ip: IpAddr = "192.168.1.1".parse().unwrap();
        let start = Instant::now();

        state.record_at(ip, start).await;
        state.record_at(ip, start).await;
        let over = state.record_at(ip, start).await;
        assert!(over.exceeded);
        assert_eq!(over.remaining, 0);

        let later = state.record_at(ip, start + Duration::from_secs(11)).await;
        assert!(!later.exceeded);
        assert_eq!(later.remaining, 1);
    }

    #[tokio::test]
    async fn cleanup_removes_expired_windows() {
        let state = RateLimiterState::new(10, Duration::ZERO);
        state.record("192.168.1.1".parse().unwrap()).await;
        state.cleanup().await;
        assert_eq!(state.tracked_clients().await, 0);

        let state = RateLimiterState::new(10, Duration::from_secs(3600));
        state.record("192.168.1.1".parse().unwrap()).await;
        state.cleanup().await;
        assert_eq!(state.tracked_clients().await, 1);
    }

    #[test]
    fn config_from_app_settings() {
        let config = RateLimiterConfig::from(&RateLimitConfig::default());
        assert_eq!(config.max_requests, 100);
        assert_eq!(config.window, Duration::from_millis(900_000));
        assert!(config.enabled);
    }
}
