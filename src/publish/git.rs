//! Git collaborator for publishing: stage, commit, push

use std::path::Path;

use git2::{Cred, PushOptions, RemoteCallbacks, Repository, Signature};
use tracing::{debug, info};

use crate::config::PublishConfig;
use crate::error::{ChaparralError, Result};

/// The narrow git surface the publish flow depends on.
pub trait GitCollaborator {
    /// Stage exactly `paths` (relative to `repo`), commit with
    /// [`commit_message`], and push the current branch.
    ///
    /// Returns [`ChaparralError::NothingToCommit`] when staging leaves the tree
    /// identical to `HEAD`.
    fn commit_and_push(&self, repo: &Path, paths: &[String], version: &str) -> Result<()>;

    /// URL of the configured remote, for display before publishing.
    fn remote_url(&self, repo: &Path) -> Result<String>;
}

#[must_use]
pub fn commit_message(version: &str) -> String {
    format!("publish marketplace v{version}")
}

/// [`GitCollaborator`] backed by libgit2.
#[derive(Debug, Clone)]
pub struct Git2Collaborator {
    config: PublishConfig,
}

impl Git2Collaborator {
    #[must_use]
    pub const fn new(config: PublishConfig) -> Self {
        Self { config }
    }

    fn open(repo: &Path) -> Result<Repository> {
        Repository::open(repo).map_err(|err| {
            ChaparralError::Git(git2::Error::from_str(&format!(
                "opening repo at {}: {}",
                repo.display(),
                err.message()
            )))
        })
    }

    fn commit(&self, repo: &Repository, paths: &[String], version: &str) -> Result<git2::Oid> {
        let mut index = repo.index()?;
        for path in paths {
            index.add_path(Path::new(path))?;
        }
        index.write()?;
        let tree_id = index.write_tree()?;

        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };
        let unchanged = parent
            .as_ref()
            .map_or(index.is_empty(), |parent| parent.tree_id() == tree_id);
        if unchanged {
            return Err(ChaparralError::NothingToCommit);
        }

        let tree = repo.find_tree(tree_id)?;
        let signature = Signature::now(&self.config.author_name, &self.config.author_email)?;
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let oid = repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &commit_message(version),
            &tree,
            &parents,
        )?;
        info!(commit = %oid, version, "created publish commit");
        Ok(oid)
    }

    fn push(&self, repo: &Repository) -> Result<()> {
        let token = std::env::var(&self.config.token_env)
            .ok()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ChaparralError::MissingCredentials(format!(
                    "{} is not set; needed to push",
                    self.config.token_env
                ))
            })?;

        let head = repo.head()?;
        let refname = head
            .name()
            .ok_or_else(|| ChaparralError::Config("HEAD is not a valid UTF-8 ref".to_string()))?
            .to_string();
        let mut remote = repo.find_remote(&self.config.remote)?;

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |_url, _username, _allowed| {
            Cred::userpass_plaintext("token", &token)
        });
        callbacks.push_update_reference(|refname, status| match status {
            Some(message) => Err(git2::Error::from_str(&format!(
                "push rejected for {refname}: {message}"
            ))),
            None => Ok(()),
        });

        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);
        debug!(remote = %self.config.remote, %refname, "pushing");
        remote.push(&[format!("{refname}:{refname}")], Some(&mut options))?;
        Ok(())
    }
}

impl GitCollaborator for Git2Collaborator {
    fn commit_and_push(&self, repo: &Path, paths: &[String], version: &str) -> Result<()> {
        let repository = Self::open(repo)?;
        self.commit(&repository, paths, version)?;
        self.push(&repository)
    }

    fn remote_url(&self, repo: &Path) -> Result<String> {
        let repository = Self::open(repo)?;
        let remote = repository.find_remote(&self.config.remote).map_err(|err| {
            ChaparralError::Config(format!("no {} remote: {}", self.config.remote, err.message()))
        })?;
        remote.url().map(ToString::to_string).ok_or_else(|| {
            ChaparralError::Config(format!("{} remote has no URL", self.config.remote))
        })
    }
}
