//! In-memory hosting platform, version source and VCS sharing one world.

#![allow(dead_code)]

use async_trait::async_trait;
use bump_bot::{
    BotConfig, DependencyId, GitError, GitHost, GitHostError, OpenPullRequest,
    PublishedPullRequest, PullRequestDraft, RepoRef, Runner, RunnerConfig, SearchHit, SourceError,
    Vcs, VersionSource,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const R2D_LIVE: &str = "2023.06.0-41.g57d229e";
pub const R2D_LATEST: &str = "2023.06.0-48.g3b2f1aa";
pub const R2D_NEWER: &str = "2023.06.0-52.gc0ffee1";
pub const BHUB_LIVE: &str = "1.0.0-0.dev.git.3128.h7a6b4d7";
pub const BHUB_LATEST: &str = "1.0.0-0.dev.git.3140.h9e8f7d6";

pub const FORK_URL: &str = "https://github.com/henchbot/mybinder.org-deploy";
pub const DEPLOY_URL: &str = "https://github.com/jupyterhub/mybinder.org-deploy.git";

/// Repository contents: path relative to the root mapped to file content.
pub type Tree = BTreeMap<String, String>;

pub fn fixture_tree() -> Tree {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let mut tree = Tree::new();
    for (name, path) in [
        ("values.yaml", "mybinder/values.yaml"),
        ("requirements.yaml", "mybinder/requirements.yaml"),
    ] {
        let content = std::fs::read_to_string(root.join(name)).unwrap();
        tree.insert(path.to_string(), content);
    }
    tree
}

#[derive(Debug, Clone)]
pub struct Fork {
    pub default: Tree,
    pub branches: HashMap<String, Tree>,
}

#[derive(Debug, Default)]
pub struct State {
    /// Deployment repository default branch.
    pub upstream: Tree,
    pub fork: Option<Fork>,
    pub open_prs: Vec<OpenPullRequest>,
    pub drafts: HashMap<u64, PullRequestDraft>,
    pub next_pr: u64,
    /// Versions as (live, latest); a missing entry makes the source fail.
    pub versions: HashMap<DependencyId, (String, String)>,
    /// Upstream compare ranges keyed by "owner/name base...head".
    pub compares: HashMap<String, Vec<String>>,
    pub searches: HashMap<String, Vec<SearchHit>>,
    /// Merged PRs as "owner/name#number".
    pub merged: HashSet<String>,
    /// SHAs whose search request fails.
    pub failing_searches: HashSet<String>,
    /// Merge lookups that fail, as "owner/name#number".
    pub failing_merges: HashSet<String>,
    /// Mutating calls in order.
    pub calls: Vec<String>,
}

#[derive(Debug, Default)]
pub struct World {
    state: Mutex<State>,
}

impl World {
    pub fn new() -> Arc<Self> {
        let world = Self::default();
        {
            let mut state = world.state.lock().unwrap();
            state.upstream = fixture_tree();
            state.next_pr = 1;
            state.versions.insert(
                DependencyId::Repo2docker,
                (R2D_LIVE.to_string(), R2D_LIVE.to_string()),
            );
            state.versions.insert(
                DependencyId::Binderhub,
                (BHUB_LIVE.to_string(), BHUB_LIVE.to_string()),
            );
        }
        Arc::new(world)
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn set_latest(&self, id: DependencyId, latest: &str) {
        self.with(|s| {
            if let Some(entry) = s.versions.get_mut(&id) {
                entry.1 = latest.to_string();
            }
        });
    }

    pub fn set_live(&self, id: DependencyId, live: &str) {
        self.with(|s| {
            if let Some(entry) = s.versions.get_mut(&id) {
                entry.0 = live.to_string();
            }
        });
    }

    /// Creates the fork as it would look after an earlier run.
    pub fn seed_fork(&self, branches: &[&str]) {
        self.with(|s| {
            let default = s.upstream.clone();
            s.fork = Some(Fork {
                branches: branches
                    .iter()
                    .map(|b| ((*b).to_string(), default.clone()))
                    .collect(),
                default,
            });
        });
    }

    pub fn open_pr(&self, title: &str, author: &str) -> u64 {
        self.with(|s| {
            let number = s.next_pr;
            s.next_pr += 1;
            s.open_prs.push(OpenPullRequest {
                number,
                title: title.to_string(),
                author: author.to_string(),
            });
            number
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.with(|s| s.calls.clone())
    }

    pub fn fork_branch(&self, branch: &str) -> Option<Tree> {
        self.with(|s| s.fork.as_ref().and_then(|f| f.branches.get(branch).cloned()))
    }

    pub fn draft(&self, number: u64) -> Option<PullRequestDraft> {
        self.with(|s| s.drafts.get(&number).cloned())
    }

    fn record(&self, call: String) {
        self.with(|s| s.calls.push(call));
    }
}

fn request_failed(message: &str) -> GitHostError {
    GitHostError::RequestFailed {
        message: message.to_string(),
    }
}

fn command_failed(command: &str, stderr: &str) -> GitError {
    GitError::CommandFailed {
        command: command.to_string(),
        stderr: stderr.to_string(),
    }
}

pub struct FakeHost(pub Arc<World>);

#[async_trait]
impl GitHost for FakeHost {
    async fn open_pull_requests(&self) -> Result<Vec<OpenPullRequest>, GitHostError> {
        Ok(self.0.with(|s| s.open_prs.clone()))
    }

    async fn fork_exists(&self) -> Result<bool, GitHostError> {
        Ok(self.0.with(|s| s.fork.is_some()))
    }

    async fn create_fork(&self) -> Result<(), GitHostError> {
        self.0.record("create_fork".to_string());
        self.0.with(|s| {
            s.fork = Some(Fork {
                default: s.upstream.clone(),
                branches: HashMap::new(),
            });
        });
        Ok(())
    }

    async fn delete_fork(&self) -> Result<(), GitHostError> {
        self.0.record("delete_fork".to_string());
        self.0.with(|s| s.fork = None);
        Ok(())
    }

    async fn fork_has_branch(&self, branch: &str) -> Result<bool, GitHostError> {
        self.0.with(|s| match &s.fork {
            Some(fork) => Ok(fork.branches.contains_key(branch)),
            None => Err(request_failed("fork not found")),
        })
    }

    async fn compare_commits(
        &self,
        repo: &RepoRef,
        base: &str,
        head: &str,
    ) -> Result<Vec<String>, GitHostError> {
        let key = format!("{repo} {base}...{head}");
        self.0
            .with(|s| s.compares.get(&key).cloned())
            .ok_or_else(|| request_failed("no common ancestor"))
    }

    async fn search_commit(&self, sha: &str) -> Result<Vec<SearchHit>, GitHostError> {
        self.0.with(|s| {
            if s.failing_searches.contains(sha) {
                return Err(request_failed("search unavailable"));
            }
            Ok(s.searches.get(sha).cloned().unwrap_or_default())
        })
    }

    async fn is_merged(&self, repo: &RepoRef, number: u64) -> Result<bool, GitHostError> {
        let key = format!("{repo}#{number}");
        self.0.with(|s| {
            if s.failing_merges.contains(&key) {
                return Err(request_failed("pull request lookup failed"));
            }
            Ok(s.merged.contains(&key))
        })
    }

    async fn create_pull_request(
        &self,
        draft: &PullRequestDraft,
    ) -> Result<PublishedPullRequest, GitHostError> {
        self.0.record(format!("create_pr:{}", draft.title));
        if !draft.head.starts_with("henchbot:") {
            return Err(request_failed("head is not fork-qualified"));
        }
        let number = self.0.open_pr(&draft.title, "henchbot");
        self.0.with(|s| s.drafts.insert(number, draft.clone()));
        Ok(PublishedPullRequest {
            number,
            url: format!("https://github.com/jupyterhub/mybinder.org-deploy/pull/{number}"),
        })
    }

    async fn update_pull_request(
        &self,
        number: u64,
        draft: &PullRequestDraft,
    ) -> Result<PublishedPullRequest, GitHostError> {
        self.0.record(format!("update_pr:{number}:{}", draft.title));
        self.0.with(|s| {
            let pr = s
                .open_prs
                .iter_mut()
                .find(|pr| pr.number == number)
                .ok_or_else(|| request_failed("pull request not found"))?;
            pr.title = draft.title.clone();
            s.drafts.insert(number, draft.clone());
            Ok(PublishedPullRequest {
                number,
                url: format!("https://github.com/jupyterhub/mybinder.org-deploy/pull/{number}"),
            })
        })
    }
}

pub struct FakeSource(pub Arc<World>);

impl FakeSource {
    fn versions(&self, id: DependencyId) -> Result<(String, String), SourceError> {
        self.0
            .with(|s| s.versions.get(&id).cloned())
            .ok_or_else(|| SourceError::Unavailable {
                what: format!("{id} versions"),
                reason: "404 Not Found".to_string(),
            })
    }
}

#[async_trait]
impl VersionSource for FakeSource {
    async fn fetch_live(&self, id: DependencyId) -> Result<String, SourceError> {
        Ok(self.versions(id)?.0)
    }

    async fn fetch_latest(&self, id: DependencyId) -> Result<String, SourceError> {
        Ok(self.versions(id)?.1)
    }
}

pub struct FakeVcs(pub Arc<World>);

fn write_tree(dest: &Path, tree: &Tree) {
    for (path, content) in tree {
        let target = dest.join(path);
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(target, content).unwrap();
    }
}

fn read_tree(dest: &Path, paths: impl Iterator<Item = String>) -> Tree {
    paths
        .map(|path| {
            let content = std::fs::read_to_string(dest.join(&path)).unwrap();
            (path, content)
        })
        .collect()
}

#[async_trait]
impl Vcs for FakeVcs {
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        self.0.record(format!("clone:{url}"));
        let tree = self
            .0
            .with(|s| s.fork.as_ref().map(|f| f.default.clone()))
            .filter(|_| url == FORK_URL)
            .ok_or_else(|| command_failed("clone", "repository not found"))?;
        write_tree(dest, &tree);
        Ok(())
    }

    async fn checkout_new(&self, _workdir: &Path, branch: &str) -> Result<(), GitError> {
        self.0.record(format!("checkout_new:{branch}"));
        Ok(())
    }

    async fn checkout_existing(&self, workdir: &Path, branch: &str) -> Result<(), GitError> {
        self.0.record(format!("checkout_existing:{branch}"));
        let tree = self
            .0
            .fork_branch(branch)
            .ok_or_else(|| command_failed("checkout", "pathspec did not match"))?;
        write_tree(workdir, &tree);
        Ok(())
    }

    async fn delete_branch(&self, _workdir: &Path, branch: &str) -> Result<(), GitError> {
        self.0.record(format!("delete_branch:{branch}"));
        self.0.with(|s| {
            if let Some(fork) = s.fork.as_mut() {
                fork.branches.remove(branch);
            }
        });
        Ok(())
    }

    async fn pull(&self, workdir: &Path, url: &str, branch: &str) -> Result<(), GitError> {
        self.0.record(format!("pull:{url}:{branch}"));
        let tree = self.0.with(|s| s.upstream.clone());
        write_tree(workdir, &tree);
        Ok(())
    }

    async fn commit(
        &self,
        workdir: &Path,
        files: &[PathBuf],
        message: &str,
    ) -> Result<(), GitError> {
        if files.iter().any(|f| !workdir.join(f).is_file()) {
            return Err(command_failed("add", "pathspec did not match any files"));
        }
        self.0.record(format!("commit:{message}"));
        Ok(())
    }

    async fn push(&self, workdir: &Path, url: &str, branch: &str) -> Result<(), GitError> {
        self.0.record(format!("push:{branch}"));
        if url != FORK_URL {
            return Err(command_failed("push", "permission denied"));
        }
        let paths = self.0.with(|s| s.upstream.keys().cloned().collect::<Vec<_>>());
        let tree = read_tree(workdir, paths.into_iter());
        self.0.with(|s| match s.fork.as_mut() {
            Some(fork) => {
                fork.branches.insert(branch.to_string(), tree);
                Ok(())
            }
            None => Err(command_failed("push", "repository not found")),
        })
    }
}

pub fn test_config() -> BotConfig {
    BotConfig {
        fork_deletion_delay_secs: 0,
        search_delay_secs: 0,
        ..BotConfig::default()
    }
}

pub fn runner(world: &Arc<World>, dry_run: bool) -> Runner<FakeHost, FakeSource, FakeVcs> {
    Runner::new(
        RunnerConfig::new(test_config(), dry_run),
        FakeHost(world.clone()),
        FakeSource(world.clone()),
        FakeVcs(world.clone()),
    )
}
