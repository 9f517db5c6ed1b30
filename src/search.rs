//! Candidate discovery via the Custom Search JSON API
//!
//! Asks the search API where an entity's official website lives and boils
//! the raw hits down to an ordered list of plausible hosts:
//! - each item's `link` host extracted (lowercased, `www.` stripped)
//! - known directory/social/aggregator hosts filtered out
//! - deduplicated preserving first-seen order
//!
//! A fixed polite pause runs ahead of every request to stay friendly with
//! API quotas. Request failures propagate; the resolver decides what a
//! failed search means for the entity.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::domain_utils;

/// Production endpoint of the Custom Search JSON API.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Hosts that are never an entity's own website: social networks, review
/// directories, business-data aggregators, and the search engine itself.
static NON_OFFICIAL_HOSTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "facebook.com",
        "m.facebook.com",
        "instagram.com",
        "linkedin.com",
        "yelp.com",
        "yellowpages.com",
        "bbb.org",
        "mapquest.com",
        "opencorporates.com",
        "crunchbase.com",
        "bloomberg.com",
        "dnb.com",
        "google.com",
    ])
});

/// Opaque credential pair for the search API.
#[derive(Debug, Clone)]
pub struct SearchCredentials {
    /// API key (`key` query parameter).
    pub api_key: String,
    /// Programmable engine id (`cx` query parameter).
    pub cx: String,
}

impl SearchCredentials {
    pub fn new(api_key: impl Into<String>, cx: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            cx: cx.into(),
        }
    }
}

/// Client for the Custom Search JSON API.
pub struct CandidateSearchProvider {
    client: Client,
    credentials: SearchCredentials,
    endpoint: String,
    pause: Duration,
}

impl CandidateSearchProvider {
    pub fn new(
        credentials: SearchCredentials,
        api_timeout: Duration,
        pause: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        Self::with_endpoint(
            credentials,
            api_timeout,
            pause,
            user_agent,
            DEFAULT_SEARCH_ENDPOINT,
        )
    }

    /// Build a provider against a custom endpoint, primarily so tests can
    /// point it at a local mock server.
    pub fn with_endpoint(
        credentials: SearchCredentials,
        api_timeout: Duration,
        pause: Duration,
        user_agent: &str,
        endpoint: &str,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(api_timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            credentials,
            endpoint: endpoint.to_string(),
            pause,
        })
    }

    /// Query the search API and return candidate hosts, filtered and
    /// deduplicated in first-seen order.
    ///
    /// `max_results` is clamped to the API's 1..=10 window. A response
    /// without an `items` array is an empty result, not an error. Non-2xx
    /// statuses and malformed bodies are errors for the caller to absorb.
    pub async fn search(&self, query: &str, max_results: u8) -> Result<Vec<String>> {
        let num = max_results.clamp(1, 10).to_string();

        // Cooperative rate limiting: fixed pause ahead of every call.
        tokio::time::sleep(self.pause).await;

        debug!("Search API query: {:?} (num={})", query, num);

        let query_params = [
            ("key", self.credentials.api_key.as_str()),
            ("cx", self.credentials.cx.as_str()),
            ("q", query),
            ("num", num.as_str()),
        ];

        let body = self
            .client
            .get(&self.endpoint)
            .query(&query_params)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        let hosts = candidate_hosts(&body);
        debug!("Search API returned {} usable host(s)", hosts.len());
        Ok(hosts)
    }
}

/// Reduce a search API response body to an ordered, deduplicated host list.
fn candidate_hosts(body: &Value) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut hosts = Vec::new();

    let items = match body["items"].as_array() {
        Some(items) => items,
        None => return hosts,
    };

    for item in items {
        let link = match item["link"].as_str() {
            Some(link) => link,
            None => continue,
        };
        let host = match domain_utils::extract_host(link) {
            Some(host) => host,
            None => {
                debug!("Skipping unparseable search result link: {}", link);
                continue;
            }
        };
        if NON_OFFICIAL_HOSTS.contains(host.as_str()) {
            debug!("Skipping non-official host: {}", host);
            continue;
        }
        if seen.insert(host.clone()) {
            hosts.push(host);
        }
    }

    hosts
}
