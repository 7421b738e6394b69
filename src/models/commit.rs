use chrono::{DateTime, FixedOffset, Offset, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::git::Repository;
use crate::git::store::RawCommit;
use crate::models::{ObjectId, Tree};

/// Identity plus timestamp, as recorded in a commit or tag header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    /// Seconds since the Unix epoch.
    pub when: i64,
    /// Timezone offset from UTC in minutes.
    pub offset_minutes: i32,
}

impl Signature {
    /// Timestamp in the signer's own timezone.
    pub fn time(&self) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(self.offset_minutes * 60).unwrap_or_else(|| Utc.fix());
        utc_from_seconds(self.when).with_timezone(&offset)
    }
}

/// 1970-01-01T00:00:00Z.
pub fn unix_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

pub(crate) fn utc_from_seconds(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or_else(unix_epoch)
}

#[derive(Debug, Clone, Serialize)]
pub struct Commit {
    #[serde(skip)]
    repo: Repository,
    pub id: ObjectId,
    pub tree_id: ObjectId,
    pub parent_ids: Vec<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

impl Commit {
    pub(crate) fn from_raw(repo: Repository, raw: RawCommit) -> Self {
        Self {
            repo,
            id: raw.id,
            tree_id: raw.tree_id,
            parent_ids: raw.parent_ids,
            author: raw.author,
            committer: raw.committer,
            message: raw.message,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Committer time. This is the time history ordering is based on.
    pub fn time(&self) -> DateTime<Utc> {
        utc_from_seconds(self.committer.when)
    }

    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }

    pub async fn tree(&self) -> Result<Tree> {
        self.repo.find_tree(&self.tree_id).await
    }

    /// Parent commits, in the order recorded in the commit.
    pub async fn parents(&self) -> Result<Vec<Commit>> {
        try_join_all(self.parent_ids.iter().map(|id| self.repo.find_commit(id))).await
    }
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.tree_id == other.tree_id
            && self.parent_ids == other.parent_ids
            && self.author == other.author
            && self.committer == other.committer
            && self.message == other.message
    }
}

impl Eq for Commit {}
