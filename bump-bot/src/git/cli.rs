//! `git` subprocess implementation of [`Vcs`].

use super::{GitError, Vcs};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Credential helper reading the username and token from the child's environment.
const CREDENTIAL_HELPER: &str = "!f() { test \"$1\" = get && echo \"username=$BUMP_BOT_GIT_USER\" && echo \"password=$BUMP_BOT_GIT_TOKEN\"; }; f";

/// Name and email recorded on commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

/// Runs the `git` executable.
///
/// Authorship is passed through `GIT_AUTHOR_*`/`GIT_COMMITTER_*` and the
/// token through a credential helper that reads it from the child's
/// environment, so neither touches repository config, argv or URLs.
#[derive(Clone)]
pub struct GitCli {
    identity: CommitIdentity,
    token: Option<String>,
}

impl std::fmt::Debug for GitCli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitCli")
            .field("identity", &self.identity)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GitCli {
    #[must_use]
    pub fn new(identity: CommitIdentity) -> Self {
        Self {
            identity,
            token: None,
        }
    }

    /// Authenticates pushes as the identity's name with `token`.
    #[must_use]
    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    fn command(&self, path: &Path, args: &[&str]) -> Command {
        let mut command = Command::new("git");
        command
            .args(args)
            .current_dir(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_AUTHOR_NAME", &self.identity.name)
            .env("GIT_AUTHOR_EMAIL", &self.identity.email)
            .env("GIT_COMMITTER_NAME", &self.identity.name)
            .env("GIT_COMMITTER_EMAIL", &self.identity.email);

        if let Some(token) = &self.token {
            command
                .env("GIT_CONFIG_COUNT", "1")
                .env("GIT_CONFIG_KEY_0", "credential.helper")
                .env("GIT_CONFIG_VALUE_0", CREDENTIAL_HELPER)
                .env("BUMP_BOT_GIT_USER", &self.identity.name)
                .env("BUMP_BOT_GIT_TOKEN", token);
        }
        command
    }

    /// Runs a git command, failing on a non-zero exit.
    async fn run_git_command(&self, path: &Path, args: &[&str]) -> Result<(), GitError> {
        debug!(command = %args.join(" "), "Running git");

        let output = self
            .command(path, args)
            .output()
            .await
            .map_err(|e| GitError::SpawnFailed {
                command: args.join(" "),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(())
    }

    /// Runs a git command, returning whether it exited successfully.
    async fn git_status(&self, path: &Path, args: &[&str]) -> Result<bool, GitError> {
        let status = self
            .command(path, args)
            .status()
            .await
            .map_err(|e| GitError::SpawnFailed {
                command: args.join(" "),
                source: e,
            })?;
        Ok(status.success())
    }
}

#[async_trait]
impl Vcs for GitCli {
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        debug!(url, "Cloning repository");
        self.run_git_command(dest, &["clone", url, "."]).await
    }

    async fn checkout_new(&self, workdir: &Path, branch: &str) -> Result<(), GitError> {
        self.run_git_command(workdir, &["checkout", "-b", branch])
            .await
    }

    async fn checkout_existing(&self, workdir: &Path, branch: &str) -> Result<(), GitError> {
        self.run_git_command(workdir, &["checkout", branch]).await
    }

    async fn delete_branch(&self, workdir: &Path, branch: &str) -> Result<(), GitError> {
        self.run_git_command(workdir, &["push", "--delete", "origin", branch])
            .await?;

        let local_ref = format!("refs/heads/{branch}");
        if self
            .git_status(workdir, &["rev-parse", "--verify", "--quiet", &local_ref])
            .await?
        {
            self.run_git_command(workdir, &["branch", "-D", branch])
                .await?;
        }
        Ok(())
    }

    async fn pull(&self, workdir: &Path, url: &str, branch: &str) -> Result<(), GitError> {
        self.run_git_command(workdir, &["pull", "--no-rebase", url, branch])
            .await
    }

    async fn commit(
        &self,
        workdir: &Path,
        files: &[PathBuf],
        message: &str,
    ) -> Result<(), GitError> {
        for file in files {
            let file = file.to_string_lossy();
            self.run_git_command(workdir, &["add", "--", &file]).await?;
        }
        self.run_git_command(workdir, &["commit", "-m", message])
            .await
    }

    async fn push(&self, workdir: &Path, url: &str, branch: &str) -> Result<(), GitError> {
        self.run_git_command(workdir, &["push", url, branch]).await
    }
}
