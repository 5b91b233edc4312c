//! Execution host: where the page lives and how a fresh snapshot of it is
//! obtained. Extraction jobs are run against each snapshot.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{COOKIE, USER_AGENT};
use tracing::{debug, warn};

use crate::error::HostError;
use crate::parser::Page;

const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;
const CLIENT_USER_AGENT: &str = concat!("activity_summary/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait PageHost: Send + Sync {
    /// Address of the page, if known. Checked by the gate before extraction.
    fn location(&self) -> Option<&str>;

    /// Current HTML of the page, including anything rendered since the last call.
    async fn snapshot(&self) -> Result<String, HostError>;
}

/// Run a synchronous extraction job against a fresh snapshot of the page.
pub async fn execute<H, T, F>(host: &H, job: F) -> Result<T, HostError>
where
    H: PageHost + ?Sized,
    F: FnOnce(&Page) -> T,
{
    let html = host.snapshot().await?;
    let page = Page::parse(&html);
    Ok(job(&page))
}

/// Live page fetched over HTTP. Activity pages usually need a logged-in
/// session cookie.
pub struct HttpHost {
    client: reqwest::Client,
    url: String,
    cookie: Option<String>,
}

impl HttpHost {
    pub fn new(url: impl Into<String>, cookie: Option<String>) -> Result<Self, HostError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(HttpHost {
            client,
            url: url.into(),
            cookie,
        })
    }

    async fn fetch_once(&self) -> Result<String, HostError> {
        let mut request = self.client.get(&self.url).header(USER_AGENT, CLIENT_USER_AGENT);
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }

        let start = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        debug!(
            "GET {} -> {} in {}ms",
            self.url,
            status.as_u16(),
            start.elapsed().as_millis()
        );
        if !status.is_success() {
            return Err(HostError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

fn should_retry(err: &HostError) -> bool {
    matches!(err, HostError::Status { status } if *status == 429 || (500..=599).contains(status))
}

#[async_trait]
impl PageHost for HttpHost {
    fn location(&self) -> Option<&str> {
        Some(&self.url)
    }

    async fn snapshot(&self) -> Result<String, HostError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once().await {
                Err(e) if should_retry(&e) && attempt < MAX_RETRIES => {
                    let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
                    warn!(
                        "{} on {} (attempt {}/{}), backing off {:.1}s",
                        e,
                        self.url,
                        attempt + 1,
                        MAX_RETRIES,
                        backoff.as_secs_f64()
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

/// Saved page on disk, re-read on every snapshot so later rewrites of the
/// file show up as late-rendered content.
pub struct FileHost {
    path: PathBuf,
    location: Option<String>,
}

impl FileHost {
    pub fn new(path: impl Into<PathBuf>, location: Option<String>) -> Self {
        FileHost {
            path: path.into(),
            location,
        }
    }
}

#[async_trait]
impl PageHost for FileHost {
    fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    async fn snapshot(&self) -> Result<String, HostError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| HostError::Io {
                path: self.path.clone(),
                source,
            })
    }
}
