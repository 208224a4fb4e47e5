//! HTTP client for remotely hosted plan templates.
//!
//! Templates are plain JSON documents in the tree format. The fetcher:
//! - Accepts only `http`/`https` URLs
//! - Follows share links that carry the real document URL in a `data` query parameter
//! - Requires a 2xx status and an `application/json` content type
//! - Retries 429s and transport errors with exponential backoff
//! - Fetches several templates with bounded concurrency

use log::{debug, info, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Result, TrainingError};
use crate::plan::ZeppTemplate;

/// Configuration for [`PlanFetcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    /// Default: 30
    pub timeout_secs: u64,

    /// Maximum templates in flight in [`PlanFetcher::fetch_templates`].
    /// Default: 8
    pub max_concurrency: u32,

    /// Retries after a 429 or a transport error.
    /// Default: 3
    pub max_retries: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_concurrency: 8,
            max_retries: 3,
        }
    }
}

/// Progress callback type: (completed, total)
pub type ProgressCallback = Arc<dyn Fn(u32, u32) + Send + Sync>;

/// Fetches plan templates over HTTP.
pub struct PlanFetcher {
    client: Client,
    config: FetchConfig,
}

impl PlanFetcher {
    /// Create a fetcher with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(FetchConfig::default())
    }

    /// Create a fetcher with custom configuration.
    pub fn with_config(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .tcp_keepalive(Duration::from_secs(30))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TrainingError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Fetch and parse one template.
    pub async fn fetch_template(&self, url: &str) -> Result<ZeppTemplate> {
        let url = resolve_template_url(url)?;
        let req_start = Instant::now();
        let mut retries = 0;

        loop {
            match self.client.get(url.clone()).send().await {
                Ok(resp) => {
                    let status = resp.status();

                    if status == StatusCode::TOO_MANY_REQUESTS && retries < self.config.max_retries {
                        retries += 1;
                        let wait = backoff(500, retries);
                        warn!("[PlanFetcher] 429 from {}, retry {} in {:?}", url, retries, wait);
                        tokio::time::sleep(wait).await;
                        continue;
                    }

                    if !status.is_success() {
                        return Err(TrainingError::HttpStatus(status.as_u16()));
                    }

                    let content_type = resp
                        .headers()
                        .get(CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    ensure_json_content_type(content_type.as_deref())?;

                    let bytes = resp
                        .bytes()
                        .await
                        .map_err(|e| TrainingError::Request(format!("Body download error: {}", e)))?;

                    info!(
                        "[PlanFetcher] {} -> {:.1}KB in {:?}",
                        url,
                        bytes.len() as f64 / 1024.0,
                        req_start.elapsed()
                    );

                    return parse_template_body(&bytes);
                }
                Err(e) => {
                    if retries >= self.config.max_retries {
                        return Err(TrainingError::Request(e.to_string()));
                    }
                    retries += 1;
                    let wait = backoff(200, retries);
                    warn!("[PlanFetcher] {} failed: {}, retry {} in {:?}", url, e, retries, wait);
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Fetch several templates concurrently. Results keep the order of `urls`.
    pub async fn fetch_templates(
        &self,
        urls: Vec<String>,
        on_progress: Option<ProgressCallback>,
    ) -> Vec<Result<ZeppTemplate>> {
        use futures::stream::{self, StreamExt};

        let total = urls.len() as u32;
        let completed = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let results: Vec<Result<ZeppTemplate>> = stream::iter(urls)
            .map(|url| {
                let completed = Arc::clone(&completed);
                let callback = on_progress.clone();
                async move {
                    let result = self.fetch_template(&url).await;
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    debug!("[PlanFetcher] {}/{} done ({})", done, total, url);
                    if let Some(ref cb) = callback {
                        cb(done, total);
                    }
                    result
                }
            })
            .buffered(self.config.max_concurrency.max(1) as usize)
            .collect()
            .await;

        info!(
            "[PlanFetcher] fetched {} templates in {:.2}s ({} errors)",
            total,
            start.elapsed().as_secs_f64(),
            results.iter().filter(|r| r.is_err()).count()
        );

        results
    }
}

fn backoff(base_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(base_ms * (1 << attempt.min(3)))
}

/// Validate a template URL and unwrap `?data=<url>` share links.
pub fn resolve_template_url(raw: &str) -> Result<Url> {
    let parsed = parse_http_url(raw.trim())?;

    let inner = parsed
        .query_pairs()
        .find(|(key, _)| key == "data")
        .map(|(_, value)| value.into_owned());

    match inner {
        Some(data) => parse_http_url(&data),
        None => Ok(parsed),
    }
}

fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| TrainingError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(TrainingError::InvalidUrl(format!(
            "unsupported scheme '{}' in {}",
            other, raw
        ))),
    }
}

/// Accept `application/json` (with or without parameters) and `+json` types.
pub fn ensure_json_content_type(content_type: Option<&str>) -> Result<()> {
    let value = content_type.unwrap_or("");
    let essence = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();

    if essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json")) {
        Ok(())
    } else {
        Err(TrainingError::ContentType(value.to_string()))
    }
}

/// Parse a template body, surfacing an `error` field reported by the host.
pub fn parse_template_body(bytes: &[u8]) -> Result<ZeppTemplate> {
    let value: Value = serde_json::from_slice(bytes)?;

    match value.get("error") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => {}
        Some(Value::String(message)) => return Err(TrainingError::Remote(message.clone())),
        Some(other) => return Err(TrainingError::Remote(other.to_string())),
    }

    Ok(serde_json::from_value(value)?)
}

/// Synchronous wrapper for FFI - runs the async fetch on a tokio runtime
#[cfg(feature = "ffi")]
pub fn fetch_template_sync(url: &str) -> Result<ZeppTemplate> {
    use tokio::runtime::Builder;

    let rt = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| TrainingError::Request(format!("Runtime error: {}", e)))?;

    let fetcher = PlanFetcher::new()?;
    rt.block_on(fetcher.fetch_template(url))
}
