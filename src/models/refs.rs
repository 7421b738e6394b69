use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::git::Repository;
use crate::git::store::{RawReference, RawTag};
use crate::models::{Commit, ObjectId, ObjectKind, Signature};

/// Tag objects can point at other tags; give up after this many hops.
pub const MAX_TAG_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Branch,
    Remote,
    Tag,
    Note,
    Other,
}

impl ReferenceKind {
    pub fn from_name(name: &str) -> Self {
        if name.starts_with("refs/heads/") {
            ReferenceKind::Branch
        } else if name.starts_with("refs/tags/") {
            ReferenceKind::Tag
        } else if name.starts_with("refs/remotes/") {
            ReferenceKind::Remote
        } else if name.starts_with("refs/notes/") {
            ReferenceKind::Note
        } else {
            ReferenceKind::Other
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Reference {
    #[serde(skip)]
    repo: Repository,
    pub name: String,
    pub target: ObjectId,
    pub kind: ReferenceKind,
}

impl Reference {
    pub(crate) fn from_raw(repo: Repository, raw: RawReference) -> Self {
        let kind = ReferenceKind::from_name(&raw.name);
        Self {
            repo,
            name: raw.name,
            target: raw.target,
            kind,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn is_branch(&self) -> bool {
        self.kind == ReferenceKind::Branch
    }

    pub fn is_tag(&self) -> bool {
        self.kind == ReferenceKind::Tag
    }

    /// Name without its namespace prefix, e.g. `master` for `refs/heads/master`.
    pub fn short_name(&self) -> &str {
        let prefix = match self.kind {
            ReferenceKind::Branch => "refs/heads/",
            ReferenceKind::Tag => "refs/tags/",
            ReferenceKind::Remote => "refs/remotes/",
            ReferenceKind::Note => "refs/notes/",
            ReferenceKind::Other => "",
        };
        self.name.strip_prefix(prefix).unwrap_or(&self.name)
    }

    /// Commit this reference ultimately points at.
    ///
    /// Tag references may point at an annotated tag object; those are
    /// peeled until a commit is reached.
    pub async fn target_commit(&self) -> Result<Commit> {
        if self.kind == ReferenceKind::Tag {
            match self.repo.find_tag(&self.target).await {
                Ok(tag) => return tag.target_commit().await,
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err),
            }
        }
        self.repo.find_commit(&self.target).await
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.target == other.target && self.kind == other.kind
    }
}

impl Eq for Reference {}

/// Annotated tag object.
#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    #[serde(skip)]
    repo: Repository,
    pub id: ObjectId,
    pub name: String,
    pub message: String,
    pub target: ObjectId,
    pub target_kind: ObjectKind,
    pub tagger: Option<Signature>,
}

impl Tag {
    pub(crate) fn from_raw(repo: Repository, raw: RawTag) -> Self {
        Self {
            repo,
            id: raw.id,
            name: raw.name,
            message: raw.message,
            target: raw.target,
            target_kind: raw.target_kind,
            tagger: raw.tagger,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub async fn target_commit(&self) -> Result<Commit> {
        let mut target = self.target.clone();
        let mut kind = self.target_kind;
        for _ in 0..MAX_TAG_DEPTH {
            match kind {
                ObjectKind::Tag => {
                    let next = self.repo.find_tag(&target).await?;
                    target = next.target;
                    kind = next.target_kind;
                }
                _ => return self.repo.find_commit(&target).await,
            }
        }
        Err(Error::NotFound {
            operation: "tag_target_commit",
            target: self.id.to_string(),
            path: self.repo.path().to_string(),
        })
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.message == other.message
            && self.target == other.target
            && self.target_kind == other.target_kind
            && self.tagger == other.tagger
    }
}

impl Eq for Tag {}
