//! HTTP access for release APIs, vendor pages and artifact downloads.

use chrono::{DateTime, Utc};
use futures::StreamExt;
use log::debug;
use reqwest::header::{
    AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_LENGTH, DATE, HeaderMap, LAST_MODIFIED,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::error::{Result, SyncError};

/// Header facts about a remote artifact
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteFileInfo {
    pub content_length: Option<u64>,
    /// `Last-Modified`, falling back to `Date`
    pub last_modified: Option<DateTime<Utc>>,
    pub content_disposition: Option<String>,
}

impl RemoteFileInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let text = |name| headers.get(name).and_then(|v| v.to_str().ok());
        let last_modified = text(LAST_MODIFIED)
            .or_else(|| text(DATE))
            .and_then(parse_http_date);
        Self {
            content_length: text(CONTENT_LENGTH).and_then(|v| v.trim().parse().ok()),
            last_modified,
            content_disposition: text(CONTENT_DISPOSITION).map(str::to_string),
        }
    }
}

/// Parse an RFC 7231 date such as `Wed, 21 Oct 2015 07:28:00 GMT`
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Shared HTTP client
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }

    async fn send(&self, url: &str, token: Option<&str>) -> Result<Response> {
        debug!("GET {}", url);
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SyncError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }

    /// Fetch and decode a JSON document, optionally authenticated
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: Option<&str>,
    ) -> Result<T> {
        let body = self.send(url, token).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch a page as text
    pub async fn get_text(&self, url: &str) -> Result<String> {
        Ok(self.send(url, None).await?.text().await?)
    }

    /// Read the response headers of an artifact without fetching its body
    pub async fn probe(&self, url: &str) -> Result<RemoteFileInfo> {
        let response = self.send(url, None).await?;
        Ok(RemoteFileInfo::from_headers(response.headers()))
    }

    /// Stream an artifact into `dir/file_name`.
    ///
    /// The body is written to a `.part` file first and renamed once complete,
    /// so an interrupted transfer never leaves a truncated artifact behind.
    pub async fn download(&self, url: &str, dir: &Path, file_name: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let target = dir.join(file_name);
        let partial = dir.join(format!("{}.part", file_name));

        let response = self.send(url, None).await.map_err(|e| match e {
            SyncError::HttpStatus { url, status } => {
                SyncError::Download(format!("status code {} for {}", status, url))
            }
            other => other,
        })?;

        let mut file = tokio::fs::File::create(&partial).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    drop(file);
                    let _ = tokio::fs::remove_file(&partial).await;
                    return Err(SyncError::Download(format!("{}: {}", url, e)));
                }
            };
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&partial, &target).await?;
        debug!("Downloaded {} bytes to {}", written, target.display());
        Ok(target)
    }
}
