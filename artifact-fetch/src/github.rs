use crate::config::{Config, Credential};
use crate::retry::RetryPolicy;
use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// An entry of the GitHub Actions artifact listing.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Artifact {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub archive_download_url: String,
    #[serde(default)]
    pub size_in_bytes: u64,
    #[serde(default)]
    pub expired: bool,
}

impl Artifact {
    pub fn new(name: impl Into<String>, archive_download_url: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            archive_download_url: archive_download_url.into(),
            size_in_bytes: 0,
            expired: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ArtifactList {
    #[serde(default)]
    pub total_count: u64,
    pub artifacts: Vec<Artifact>,
}

impl ArtifactList {
    pub fn parse(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }
}

pub struct GithubClient {
    client: Client,
    api_url: String,
    per_page: u32,
    credential: Credential,
    retry: RetryPolicy,
}

impl GithubClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            per_page: config.per_page,
            credential: config.credential.clone(),
            retry: config.retry,
        })
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Lists the most recent artifacts. The listing is public, so no
    /// credential is sent.
    pub fn list_artifacts(&self) -> Result<Vec<Artifact>> {
        self.retry.run("listing artifacts", || {
            tracing::debug!(url = %self.api_url, per_page = self.per_page, "GET");
            let body = self
                .client
                .get(&self.api_url)
                .query(&[("per_page", self.per_page)])
                .send()
                .and_then(|resp| resp.error_for_status())
                .and_then(|resp| resp.text())
                .with_context(|| format!("GET {}", self.api_url))?;
            let list = ArtifactList::parse(&body)
                .with_context(|| format!("unexpected response from {}", self.api_url))?;
            tracing::debug!(
                total = list.total_count,
                received = list.artifacts.len(),
                "artifact listing"
            );
            Ok(list.artifacts)
        })
    }

    /// Starts an authorized download of `url`. The caller consumes the body.
    pub fn open_download(&self, url: &str) -> Result<Response> {
        tracing::debug!(url, "GET");
        self.client
            .get(url)
            .header(AUTHORIZATION, self.credential.header_value())
            .send()
            .and_then(|resp| resp.error_for_status())
            .with_context(|| format!("GET {}", url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_listing() -> Result<()> {
        let list = ArtifactList::parse(
            r#"{
                "total_count": 2,
                "artifacts": [
                    {
                        "id": 11,
                        "node_id": "MDg6QXJ0aWZhY3QxMQ==",
                        "name": "Altseed2-abc",
                        "size_in_bytes": 556,
                        "url": "https://api.github.com/repos/o/r/actions/artifacts/11",
                        "archive_download_url": "https://api.github.com/repos/o/r/actions/artifacts/11/zip",
                        "expired": false
                    },
                    {
                        "name": "Altseed2-def",
                        "archive_download_url": "https://example.com/def.zip"
                    }
                ]
            }"#,
        )?;
        assert_eq!(list.total_count, 2);
        assert_eq!(list.artifacts.len(), 2);
        assert_eq!(list.artifacts[0].id, 11);
        assert_eq!(list.artifacts[0].size_in_bytes, 556);
        assert_eq!(
            list.artifacts[1],
            Artifact::new("Altseed2-def", "https://example.com/def.zip")
        );
        Ok(())
    }

    #[test]
    fn listing_without_artifacts_is_an_error() {
        assert!(ArtifactList::parse(r#"{"message": "Not Found"}"#).is_err());
        assert!(ArtifactList::parse(r#"{"artifacts": [{"name": "x"}]}"#).is_err());
        assert!(ArtifactList::parse("<html>").is_err());
    }
}
