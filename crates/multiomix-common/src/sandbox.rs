use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::MultiomixError;

/// Default request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// An HTTP client that only allows requests to approved domains.
/// Enrichment lookups are the only outbound traffic of a run.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a new SandboxClient with the default allowlist.
    pub fn new() -> Result<Self, MultiomixError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, MultiomixError> {
        let mut allowlist = HashSet::new();
        let domains = vec![
            "maayanlab.cloud", // Enrichr
            "localhost",
            "127.0.0.1",
        ];

        for d in domains {
            allowlist.insert(d.to_string());
        }

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("multiomix/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MultiomixError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Allows the host of a configured service root (e.g. a self-hosted Enrichr).
    pub fn allow_url(&mut self, url: &str) -> Result<(), MultiomixError> {
        let parsed = Url::parse(url)
            .map_err(|e| MultiomixError::Config(format!("invalid URL {url}: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| MultiomixError::Config(format!("URL has no host: {url}")))?;
        self.allow_domain(host);
        Ok(())
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                // Exact match or subdomain of an allowed domain
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn check(&self, url: &str) -> Result<(), MultiomixError> {
        if self.is_allowed(url) {
            Ok(())
        } else {
            Err(MultiomixError::Security(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )))
        }
    }

    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, MultiomixError> {
        self.check(url)?;
        Ok(self.client.get(url))
    }

    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, MultiomixError> {
        self.check(url)?;
        Ok(self.client.post(url))
    }
}
