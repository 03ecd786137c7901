use serde::{Deserialize, Serialize};
use thiserror::Error;
use ureq::{Agent, AgentBuilder};

/// A lookup didn't produce usable data. Logged by the form workflow and
/// otherwise absorbed; never blocks submission, never retried.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EnrichmentFailure {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("service reported status {0:?}")]
    Rejected(String),
    #[error("response missing expected data")]
    Incomplete,
}

impl From<ureq::Error> for EnrichmentFailure {
    fn from(error: ureq::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

impl From<std::io::Error> for EnrichmentFailure {
    fn from(error: std::io::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanOutcome {
    Verified { full_name: String },
    Unverified,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locality {
    pub city: String,
    pub state: String,
}

pub trait VerifyPan {
    fn verify(&self, pan: &str) -> Result<PanOutcome, EnrichmentFailure>;
}

pub trait ResolvePostcode {
    fn resolve(&self, postcode: &str) -> Result<Locality, EnrichmentFailure>;
}

/// Blocking client for both enrichment services.
pub struct HttpLookup {
    agent: Agent,
    verify_url: String,
    postcode_url: String,
}

impl HttpLookup {
    pub fn new(verify_url: &str, postcode_url: &str) -> Self {
        Self {
            agent: AgentBuilder::new().user_agent("customers/0.1").build(),
            verify_url: verify_url.to_string(),
            postcode_url: postcode_url.to_string(),
        }
    }
}

impl VerifyPan for HttpLookup {
    fn verify(&self, pan: &str) -> Result<PanOutcome, EnrichmentFailure> {
        let raw: RawVerification = self
            .agent
            .post(&self.verify_url)
            .send_json(PanRequest { pan_number: pan })?
            .into_json()?;
        raw.refine()
    }
}

impl ResolvePostcode for HttpLookup {
    fn resolve(&self, postcode: &str) -> Result<Locality, EnrichmentFailure> {
        let raw: RawResolution = self
            .agent
            .post(&self.postcode_url)
            .send_json(PostcodeRequest { postcode })?
            .into_json()?;
        raw.refine()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PanRequest<'a> {
    pan_number: &'a str,
}

#[derive(Serialize)]
struct PostcodeRequest<'a> {
    postcode: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerification {
    status: String,
    #[serde(default)]
    is_valid: bool,
    #[serde(default)]
    full_name: Option<String>,
}

impl RawVerification {
    fn refine(self) -> Result<PanOutcome, EnrichmentFailure> {
        if self.status != "Success" {
            return Err(EnrichmentFailure::Rejected(self.status));
        }
        if !self.is_valid {
            return Ok(PanOutcome::Unverified);
        }
        match self.full_name {
            Some(full_name) if !full_name.is_empty() => Ok(PanOutcome::Verified { full_name }),
            _ => Err(EnrichmentFailure::Incomplete),
        }
    }
}

#[derive(Deserialize)]
struct RawResolution {
    status: String,
    #[serde(default)]
    city: Vec<NamedEntry>,
    #[serde(default)]
    state: Vec<NamedEntry>,
}

#[derive(Deserialize)]
struct NamedEntry {
    name: String,
}

impl RawResolution {
    // first entry of each candidate list wins
    fn refine(mut self) -> Result<Locality, EnrichmentFailure> {
        if self.status != "Success" {
            return Err(EnrichmentFailure::Rejected(self.status));
        }
        if self.city.is_empty() || self.state.is_empty() {
            return Err(EnrichmentFailure::Incomplete);
        }
        Ok(Locality {
            city: self.city.remove(0).name,
            state: self.state.remove(0).name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_refines_to_name() {
        let raw: RawVerification = serde_json::from_str(
            r#"{"status": "Success", "isValid": true, "fullName": "Jane Doe"}"#,
        )
        .unwrap();
        assert_eq!(
            raw.refine(),
            Ok(PanOutcome::Verified {
                full_name: "Jane Doe".to_string()
            })
        );
    }

    #[test]
    fn negative_verification_is_unverified() {
        let raw: RawVerification =
            serde_json::from_str(r#"{"status": "Success", "isValid": false}"#).unwrap();
        assert_eq!(raw.refine(), Ok(PanOutcome::Unverified));
    }

    #[test]
    fn failed_verification_is_rejected() {
        let raw: RawVerification = serde_json::from_str(r#"{"status": "Error"}"#).unwrap();
        assert_eq!(
            raw.refine(),
            Err(EnrichmentFailure::Rejected("Error".to_string()))
        );
    }

    #[test]
    fn resolution_takes_first_candidates() {
        let raw: RawResolution = serde_json::from_str(
            r#"{
                "status": "Success",
                "city": [{"name": "Mumbai"}, {"name": "Mumbai GPO"}],
                "state": [{"name": "Maharashtra"}]
            }"#,
        )
        .unwrap();
        assert_eq!(
            raw.refine(),
            Ok(Locality {
                city: "Mumbai".to_string(),
                state: "Maharashtra".to_string(),
            })
        );
    }

    #[test]
    fn empty_candidate_lists_are_incomplete() {
        let raw: RawResolution =
            serde_json::from_str(r#"{"status": "Success", "city": [], "state": []}"#).unwrap();
        assert_eq!(raw.refine(), Err(EnrichmentFailure::Incomplete));
    }
}
