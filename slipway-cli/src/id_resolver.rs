//! ID resolver module
//!
//! Lets users pass a short, unambiguous prefix instead of a full job UUID.
//! Prefixes are matched against the jobs and workspaces the worker lists.

use std::fmt;

use anyhow::{Context, Result, anyhow};
use slipway_client::WorkerClient;
use slipway_core::dto::job::ListJobsQuery;
use slipway_core::dto::worker::ListWorkspacesQuery;
use uuid::Uuid;

/// Identifier that is either a full UUID or a prefix of one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdOrPrefix {
    Full(Uuid),
    Prefix(String),
}

impl IdOrPrefix {
    pub fn parse(input: &str) -> Self {
        match Uuid::parse_str(input) {
            Ok(uuid) => IdOrPrefix::Full(uuid),
            Err(_) => IdOrPrefix::Prefix(input.trim().to_lowercase()),
        }
    }
}

impl fmt::Display for IdOrPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdOrPrefix::Full(uuid) => write!(f, "{}", uuid),
            IdOrPrefix::Prefix(prefix) => write!(f, "{}", prefix),
        }
    }
}

/// Pick the single candidate starting with `prefix`
fn match_prefix(kind: &str, prefix: &str, candidates: impl IntoIterator<Item = Uuid>) -> Result<Uuid> {
    if prefix.is_empty() {
        return Err(anyhow!("Empty {} ID", kind));
    }

    let matches: Vec<Uuid> = candidates
        .into_iter()
        .filter(|id| id.to_string().starts_with(prefix))
        .collect();

    match matches.as_slice() {
        [] => Err(anyhow!("No {} found with ID starting with '{}'", kind, prefix)),
        [id] => Ok(*id),
        _ => {
            let ids: Vec<String> = matches.iter().map(Uuid::to_string).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple {}s: {}",
                prefix,
                kind,
                ids.join(", ")
            ))
        }
    }
}

/// Resolve a job ID or prefix to a full UUID
pub async fn resolve_job_id(client: &WorkerClient, input: &str) -> Result<Uuid> {
    let prefix = match IdOrPrefix::parse(input) {
        IdOrPrefix::Full(uuid) => return Ok(uuid),
        IdOrPrefix::Prefix(prefix) => prefix,
    };

    let jobs = client
        .list_jobs(&ListJobsQuery::default())
        .await
        .context("Failed to fetch jobs for ID resolution")?;

    match_prefix("job", &prefix, jobs.jobs.iter().map(|j| j.id))
}

/// Resolve a workspace (job) ID or prefix to a full UUID
pub async fn resolve_workspace_id(client: &WorkerClient, input: &str) -> Result<Uuid> {
    let prefix = match IdOrPrefix::parse(input) {
        IdOrPrefix::Full(uuid) => return Ok(uuid),
        IdOrPrefix::Prefix(prefix) => prefix,
    };

    let page = client
        .list_workspaces(&ListWorkspacesQuery::default())
        .await
        .context("Failed to fetch workspaces for ID resolution")?;

    match_prefix("workspace", &prefix, page.workspaces.iter().map(|w| w.job_id))
}
