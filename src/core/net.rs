// src/core/net.rs
// Blocking HTTP GET via ureq; transport errors are classified into the
// per-province failure taxonomy here so callers never see ureq types.

use std::io::ErrorKind;
use std::time::Duration;

use ureq::Agent;

use crate::error::FetchFailure;

pub fn agent(timeout: Duration, user_agent: &str) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .user_agent(user_agent)
        .build()
        .into()
}

/// GET `url` and return the decoded body.
pub fn http_get(agent: &Agent, url: &str) -> Result<String, FetchFailure> {
    let mut resp = agent.get(url).call().map_err(classify)?;
    resp.body_mut().read_to_string().map_err(classify)
}

fn classify(e: ureq::Error) -> FetchFailure {
    match e {
        ureq::Error::StatusCode(404 | 410) => FetchFailure::NotFound,
        ureq::Error::StatusCode(code) => FetchFailure::Network(format!("HTTP status {code}")),
        ureq::Error::Timeout(_) => FetchFailure::Timeout,
        ureq::Error::Io(ref io) if io.kind() == ErrorKind::TimedOut => FetchFailure::Timeout,
        other => FetchFailure::Network(other.to_string()),
    }
}
