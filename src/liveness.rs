//! Candidate URL liveness verification
//!
//! Decides whether a candidate URL serves a reachable website:
//! - HEAD probe first (no body transfer)
//! - Single GET fallback when the probe completes with an error status
//!   (403/405 are the classic reject-HEAD-but-serve-GET codes)
//! - Redirects are followed and the post-redirect URL is reported
//!
//! Transport failures (DNS, connect, TLS, timeout) mean "not live" for that
//! candidate, never an error: the resolver simply moves on to the next one.

use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, Response};
use tracing::debug;

/// How the tool identifies itself to probed sites and the search API.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; sitefinder/1.0; +https://github.com/your-org/sitefinder)";

/// Outcome of probing one candidate URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    /// True iff a response was obtained with status in [200, 400).
    pub is_live: bool,
    /// Final status code, absent when no response was obtained at all.
    pub status_code: Option<u16>,
    /// Redirect-resolved URL of the response, absent without a response.
    pub final_url: Option<String>,
}

impl VerificationOutcome {
    fn dead() -> Self {
        Self {
            is_live: false,
            status_code: None,
            final_url: None,
        }
    }

    fn from_response(status: u16, final_url: String) -> Self {
        Self {
            is_live: (200..400).contains(&status),
            status_code: Some(status),
            final_url: Some(final_url),
        }
    }
}

/// HTTP prober with an identifying user agent. Timeouts are passed per
/// check, since they belong to the resolution query rather than the client.
pub struct LivenessChecker {
    client: Client,
}

impl LivenessChecker {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }

    /// Check whether `url` points at a live website.
    ///
    /// Issues a HEAD probe; if the probe completes with any error status
    /// (>= 400), issues one GET and uses that response instead. A transport
    /// failure on whichever request would have produced the answer is
    /// terminal for the candidate. The fallback fires only on a completed
    /// probe, never after a transport failure.
    pub async fn check(&self, url: &str, timeout: Duration) -> VerificationOutcome {
        let probe = match self.client.head(url).timeout(timeout).send().await {
            Ok(resp) => resp,
            Err(e) => {
                debug!("HEAD {} failed: {}", url, e);
                return VerificationOutcome::dead();
            }
        };

        let probe_status = probe.status().as_u16();
        if probe_status >= 400 {
            debug!("HEAD {} returned {}, retrying with GET", url, probe_status);
            return match self.client.get(url).timeout(timeout).send().await {
                Ok(resp) => outcome_of(resp),
                Err(e) => {
                    debug!("GET {} failed: {}", url, e);
                    VerificationOutcome::dead()
                }
            };
        }

        outcome_of(probe)
    }
}

fn outcome_of(resp: Response) -> VerificationOutcome {
    VerificationOutcome::from_response(resp.status().as_u16(), resp.url().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_window_boundaries() {
        let live = |status: u16| {
            VerificationOutcome::from_response(status, "https://x.test/".to_string()).is_live
        };

        assert!(live(200));
        assert!(live(204));
        assert!(live(301));
        assert!(live(399));

        assert!(!live(400));
        assert!(!live(403));
        assert!(!live(404));
        assert!(!live(500));
        assert!(!live(503));
    }

    #[test]
    fn test_dead_outcome_carries_no_details() {
        let outcome = VerificationOutcome::dead();
        assert!(!outcome.is_live);
        assert_eq!(outcome.status_code, None);
        assert_eq!(outcome.final_url, None);
    }

    #[test]
    fn test_response_outcome_keeps_status_and_url() {
        let outcome =
            VerificationOutcome::from_response(404, "https://acme.com/missing".to_string());
        assert!(!outcome.is_live);
        assert_eq!(outcome.status_code, Some(404));
        assert_eq!(outcome.final_url.as_deref(), Some("https://acme.com/missing"));
    }
}
