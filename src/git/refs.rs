//! Reference probing and default-branch discovery.

use futures::StreamExt;
use futures::stream::FuturesOrdered;

use crate::error::{Error, Result};
use crate::git::repository::Repository;
use crate::models::Reference;

impl Repository {
    /// Like `get_branch`, but any failure just means "not there".
    pub async fn try_get_branch(&self, name: &str) -> Option<Reference> {
        match self.get_branch(name).await {
            Ok(branch) => Some(branch),
            Err(err) => {
                tracing::debug!("branch probe {} missed: {}", name, err);
                None
            }
        }
    }

    /// First configured candidate branch that exists.
    ///
    /// Candidates are probed concurrently, but results are taken in list
    /// order: a later candidate never wins over an earlier one that exists,
    /// whichever lookup finishes first. Probes still in flight once a
    /// winner is known are dropped.
    pub async fn get_default_branch(&self) -> Result<Reference> {
        let candidates = self.config().qualified_candidates();

        let mut probes: FuturesOrdered<_> = candidates
            .iter()
            .map(|name| self.try_get_branch(name))
            .collect();

        while let Some(probe) = probes.next().await {
            if let Some(branch) = probe {
                tracing::info!("default branch of {} is {}", self.path(), branch.name);
                return Ok(branch);
            }
        }
        drop(probes);

        Err(Error::DefaultBranchUndetectable {
            path: self.path().to_string(),
            candidates,
        })
    }
}
