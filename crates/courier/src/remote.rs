use async_trait::async_trait;
use futures::io::{AsyncReadExt, AsyncWriteExt};
use log::debug;
use rio_core::config::GalleryConfig;
use rio_core::{GalleryError, RemoteAssetDescriptor, Result};
use std::path::Path;
use surf::http::headers::{LOCATION, USER_AGENT};

const MAX_REDIRECTS: u8 = 5;
const COPY_BUF_SIZE: usize = 64 * 1024;

/// Where assets come from. The synchronizer only ever talks to this trait.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Lists every entry of the remote source, containers or not.
    async fn list(&self) -> Result<Vec<RemoteAssetDescriptor>>;

    /// Streams the asset behind `locator` into `dest`, returning the byte count.
    async fn fetch(&self, locator: &str, dest: &Path) -> Result<u64>;
}

/// A remote source served over HTTP: one JSON listing URL plus per-asset
/// download URLs.
pub struct HttpRemote {
    listing_url: String,
    user_agent: String,
    client: surf::Client,
}

impl HttpRemote {
    pub fn new(listing_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            listing_url: listing_url.into(),
            user_agent: user_agent.into(),
            client: surf::Client::new().with(RedirectMiddleware::new(MAX_REDIRECTS)),
        }
    }

    pub fn from_config(config: &GalleryConfig) -> Self {
        Self::new(config.listing_url.clone(), config.user_agent.clone())
    }

    async fn get(&self, url: &str) -> Result<surf::Response> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .await
            .map_err(|e| GalleryError::RemoteUnavailable(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GalleryError::RemoteUnavailable(format!(
                "GET {} returned status {}",
                url, status
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl RemoteSource for HttpRemote {
    async fn list(&self) -> Result<Vec<RemoteAssetDescriptor>> {
        let mut response = self.get(&self.listing_url).await?;
        let listing: Vec<RemoteAssetDescriptor> = response.body_json().await.map_err(|e| {
            GalleryError::RemoteUnavailable(format!("undecodable listing: {}", e))
        })?;
        debug!("remote listing has {} entries", listing.len());
        Ok(listing)
    }

    async fn fetch(&self, locator: &str, dest: &Path) -> Result<u64> {
        let mut response = self.get(locator).await?;

        let mut file = async_std::fs::File::create(dest)
            .await
            .map_err(|e| GalleryError::write_failed(dest, e))?;

        // Read and write errors are told apart, so no futures::io::copy here.
        let mut buf = vec![0u8; COPY_BUF_SIZE];
        let mut written = 0u64;
        loop {
            let n = response.read(&mut buf).await.map_err(|e| {
                GalleryError::RemoteUnavailable(format!("download of {} interrupted: {}", locator, e))
            })?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n])
                .await
                .map_err(|e| GalleryError::write_failed(dest, e))?;
            written += n as u64;
        }
        file.flush()
            .await
            .map_err(|e| GalleryError::write_failed(dest, e))?;

        Ok(written)
    }
}

struct RedirectMiddleware {
    max_attempts: u8,
}

impl RedirectMiddleware {
    pub fn new(max_attempts: u8) -> Self {
        Self { max_attempts }
    }
}

#[surf::utils::async_trait]
impl surf::middleware::Middleware for RedirectMiddleware {
    async fn handle(
        &self,
        req: surf::Request,
        client: surf::Client,
        next: surf::middleware::Next<'_>,
    ) -> surf::Result<surf::Response> {
        let mut attempts = 0;
        let mut current_req = req;

        loop {
            if attempts > self.max_attempts {
                return Err(surf::Error::from_str(
                    surf::StatusCode::LoopDetected,
                    "Too many redirects",
                ));
            }

            let response = next.run(current_req.clone(), client.clone()).await?;

            if !response.status().is_redirection() {
                return Ok(response);
            }
            let location = match response.header(LOCATION) {
                Some(location) => location.last().as_str().to_string(),
                None => return Ok(response),
            };

            // Raw download hosts answer with absolute locations, but relative
            // ones are legal.
            let new_url = match surf::Url::parse(&location) {
                Ok(url) => url,
                Err(_) => current_req.url().join(&location).map_err(|_| {
                    surf::Error::from_str(surf::StatusCode::BadGateway, "Invalid redirect location")
                })?,
            };

            let mut next_req = surf::Request::new(current_req.method(), new_url);
            if let Some(agent) = current_req.header(USER_AGENT) {
                next_req.insert_header(USER_AGENT, agent.last().as_str().to_string());
            }
            current_req = next_req;
            attempts += 1;
        }
    }
}
