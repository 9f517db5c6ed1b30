//! Entity-to-website resolution
//!
//! The pipeline behind every output row: build the search query, assemble an
//! ordered candidate list (search hits first, heuristic guesses second, each
//! host tried as https then http), probe candidates in order, first live one
//! wins. Resolution never fails: a search outage degrades the entity to
//! guess-only, and total verification failure is a `none` row that still
//! carries the full audit of what was tried.

use std::fmt;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain_utils;
use crate::liveness::{LivenessChecker, DEFAULT_USER_AGENT};
use crate::normalizer;
use crate::search::{CandidateSearchProvider, SearchCredentials, DEFAULT_SEARCH_ENDPOINT};

/// How many search hits feed the candidate list.
const SEARCH_RESULT_CAP: u8 = 5;

/// TLD ladder for guessed domains, tried in order.
pub const DEFAULT_TLDS: &[&str] = &["com", "org", "net"];

/// Per-request liveness timeout when the caller does not override it.
pub const DEFAULT_TIMEOUT_SECS: u64 = 8;

/// Origin of a candidate URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateMethod {
    Search,
    Guess,
}

impl CandidateMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateMethod::Search => "search",
            CandidateMethod::Guess => "guess",
        }
    }
}

impl fmt::Display for CandidateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a result was obtained, `None` when nothing was live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMethod {
    Search,
    Guess,
    None,
}

impl ResolutionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionMethod::Search => "search",
            ResolutionMethod::Guess => "guess",
            ResolutionMethod::None => "none",
        }
    }
}

impl fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<CandidateMethod> for ResolutionMethod {
    fn from(method: CandidateMethod) -> Self {
        match method {
            CandidateMethod::Search => ResolutionMethod::Search,
            CandidateMethod::Guess => ResolutionMethod::Guess,
        }
    }
}

/// A proposed URL tagged with how it was produced. List order is the
/// evaluation order and is deterministic for a given query and search
/// response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub method: CandidateMethod,
    pub url: String,
}

impl Candidate {
    fn new(method: CandidateMethod, url: String) -> Self {
        Self { method, url }
    }
}

/// Everything that was considered for one entity, winner or not. Attached
/// to the result so a failed row still shows what was tried.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateAudit {
    /// Hosts the search API produced, in provider order.
    pub search_domains: Vec<String>,
    /// Guessed `base.tld` hosts, in configured TLD order.
    pub guessed_domains: Vec<String>,
}

/// One output row. Created once per entity and never mutated afterwards;
/// downstream code only groups and serializes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub location_hint: String,
    pub entity_name: String,
    /// The literal query string sent to the search provider, recorded even
    /// in guess-only mode as the identity of what was searched for.
    pub search_query: String,
    pub best_domain: String,
    pub best_url: String,
    /// String-encoded so "no status" exports as an empty cell.
    pub best_http_status: String,
    pub method: ResolutionMethod,
    pub other_candidates: CandidateAudit,
}

/// Immutable input for one entity resolution.
#[derive(Debug, Clone)]
pub struct ResolutionQuery {
    /// Non-empty by contract; callers skip rows without a name.
    pub entity_name: String,
    /// Weak geographic hint (area code, state). Callers substitute their
    /// sentinel for empty hints before resolution.
    pub location_hint: String,
    /// Present enables the search path, absent means guess-only.
    pub search_credentials: Option<SearchCredentials>,
    /// TLDs for guessed domains, tried in order.
    pub candidate_tlds: Vec<String>,
    /// Per-request liveness timeout.
    pub timeout: Duration,
}

impl ResolutionQuery {
    pub fn new(entity_name: impl Into<String>, location_hint: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            location_hint: location_hint.into(),
            search_credentials: None,
            candidate_tlds: DEFAULT_TLDS.iter().map(|t| t.to_string()).collect(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_credentials(mut self, credentials: SearchCredentials) -> Self {
        self.search_credentials = Some(credentials);
        self
    }

    pub fn with_tlds(mut self, tlds: Vec<String>) -> Self {
        self.candidate_tlds = tlds;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Tunables shared by every resolution in a batch.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub user_agent: String,
    /// Search API endpoint, swappable so tests can aim at a mock server.
    pub search_endpoint: String,
    /// Fixed polite pause ahead of each search request.
    pub search_pause: Duration,
    /// Timeout for search API requests (distinct from liveness timeouts).
    pub search_timeout: Duration,
    /// Results requested per search query, clamped by the provider to 1..=10.
    pub search_max_results: u8,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            search_pause: Duration::from_millis(200),
            search_timeout: Duration::from_secs(15),
            search_max_results: SEARCH_RESULT_CAP,
        }
    }
}

/// Orchestrates search, guessing, and verification for single entities.
pub struct EntityResolver {
    checker: LivenessChecker,
    settings: ResolverSettings,
}

impl EntityResolver {
    pub fn new(settings: ResolverSettings) -> Result<Self> {
        let checker = LivenessChecker::new(&settings.user_agent)?;
        Ok(Self { checker, settings })
    }

    /// Resolve one entity to its most probable official website.
    ///
    /// Infallible by design: network problems only narrow the candidate
    /// list, and a batch never aborts because one entity misbehaved. The
    /// returned row always carries the verbatim search query and the full
    /// candidate audit, even when `method` is `none`.
    pub async fn resolve(&self, query: &ResolutionQuery) -> ResolutionResult {
        let search_query = build_search_query(&query.entity_name, &query.location_hint);

        let mut audit = CandidateAudit::default();
        let mut candidates: Vec<Candidate> = Vec::new();

        if let Some(credentials) = &query.search_credentials {
            match self.search_hosts(credentials, &search_query).await {
                Ok(hosts) => {
                    candidates.extend(search_candidates(&hosts));
                    audit.search_domains = hosts;
                }
                Err(e) => {
                    // Search trouble costs this entity its search
                    // candidates, nothing more.
                    warn!(
                        "Search failed for {:?}, continuing with guesses only: {}",
                        query.entity_name, e
                    );
                }
            }
        }

        let base = normalizer::domain_base(&query.entity_name);
        if base.is_empty() {
            debug!(
                "Name {:?} normalized to nothing, skipping guessed domains",
                query.entity_name
            );
        } else {
            let (guessed, guesses) = guess_candidates(&base, &query.candidate_tlds);
            audit.guessed_domains = guessed;
            candidates.extend(guesses);
        }

        for candidate in &candidates {
            let outcome = self.checker.check(&candidate.url, query.timeout).await;
            debug!(
                "{} candidate {} -> live={} status={:?}",
                candidate.method, candidate.url, outcome.is_live, outcome.status_code
            );
            if !outcome.is_live {
                continue;
            }

            // Live responses normally carry a final URL; fall back to the
            // candidate URL if one ever does not.
            let best_url = outcome
                .final_url
                .unwrap_or_else(|| candidate.url.clone());
            let best_domain = domain_utils::extract_host(&best_url).unwrap_or_default();
            let best_http_status = outcome
                .status_code
                .map(|s| s.to_string())
                .unwrap_or_default();

            return ResolutionResult {
                location_hint: query.location_hint.clone(),
                entity_name: query.entity_name.clone(),
                search_query,
                best_domain,
                best_url,
                best_http_status,
                method: candidate.method.into(),
                other_candidates: audit,
            };
        }

        ResolutionResult {
            location_hint: query.location_hint.clone(),
            entity_name: query.entity_name.clone(),
            search_query,
            best_domain: String::new(),
            best_url: String::new(),
            best_http_status: String::new(),
            method: ResolutionMethod::None,
            other_candidates: audit,
        }
    }

    async fn search_hosts(
        &self,
        credentials: &SearchCredentials,
        search_query: &str,
    ) -> Result<Vec<String>> {
        let provider = CandidateSearchProvider::with_endpoint(
            credentials.clone(),
            self.settings.search_timeout,
            self.settings.search_pause,
            &self.settings.user_agent,
            &self.settings.search_endpoint,
        )?;
        provider
            .search(search_query, self.settings.search_max_results)
            .await
    }
}

/// Build the quoted search query. The location hint rides along unquoted;
/// an empty hint leaves no trailing whitespace behind.
fn build_search_query(entity_name: &str, location_hint: &str) -> String {
    format!("\"{entity_name}\" official website {location_hint}")
        .trim()
        .to_string()
}

/// Expand search hosts into candidates, https before http per host, in
/// provider order.
fn search_candidates(hosts: &[String]) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(hosts.len() * 2);
    for host in hosts {
        candidates.push(Candidate::new(
            CandidateMethod::Search,
            format!("https://{host}/"),
        ));
        candidates.push(Candidate::new(
            CandidateMethod::Search,
            format!("http://{host}/"),
        ));
    }
    candidates
}

/// Expand a normalized base into guessed hosts and their candidates, one
/// https/http pair per TLD in the given order. Returns the guessed hosts
/// separately for the audit record.
fn guess_candidates(base: &str, tlds: &[String]) -> (Vec<String>, Vec<Candidate>) {
    let mut guessed = Vec::with_capacity(tlds.len());
    let mut candidates = Vec::with_capacity(tlds.len() * 2);
    for tld in tlds {
        let host = format!("{base}.{tld}");
        candidates.push(Candidate::new(
            CandidateMethod::Guess,
            format!("https://{host}/"),
        ));
        candidates.push(Candidate::new(
            CandidateMethod::Guess,
            format!("http://{host}/"),
        ));
        guessed.push(host);
    }
    (guessed, candidates)
}
