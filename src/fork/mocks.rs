// In-memory remote for tests - no network, records every call

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::github::{
    GitHubError, GitRef, RemoteRepository, RepoIdentity, RepoPermissions, RepositoryMetadata,
    RepositorySummary,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    GetRepository(String),
    ListHeads(String),
    Create { reference: String, sha: String },
    Update { reference: String, sha: String, force: bool },
    Delete { reference: String },
    ListUserRepositories,
}

impl RemoteCall {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            RemoteCall::Create { .. } | RemoteCall::Update { .. } | RemoteCall::Delete { .. }
        )
    }
}

#[derive(Debug, Default)]
pub struct MockRemote {
    repositories: HashMap<String, RepositoryMetadata>,
    refs: Mutex<HashMap<String, Vec<GitRef>>>,
    user_repositories: Vec<RepositorySummary>,
    failing_listings: HashSet<String>,
    failing_refs: HashSet<String>,
    mutation_delay: Option<Duration>,
    calls: Mutex<Vec<RemoteCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

fn key(owner: &str, name: &str) -> String {
    format!("{owner}/{name}")
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(mut self, owner: &str, name: &str) -> Self {
        self.repositories.insert(
            key(owner, name),
            RepositoryMetadata {
                identity: RepoIdentity::new(owner, name),
                parent: None,
                permissions: Some(RepoPermissions {
                    admin: true,
                    push: true,
                    pull: true,
                }),
            },
        );
        self
    }

    pub fn with_fork(self, owner: &str, name: &str, parent_owner: &str, parent_name: &str) -> Self {
        let mut mock = self
            .with_repository(owner, name)
            .with_repository(parent_owner, parent_name);
        if let Some(fork) = mock.repositories.get_mut(&key(owner, name)) {
            fork.parent = Some(RepoIdentity::new(parent_owner, parent_name));
        }
        mock
    }

    pub fn with_heads(self, owner: &str, name: &str, heads: &[(&str, &str)]) -> Self {
        let refs = heads
            .iter()
            .map(|(branch, sha)| GitRef::branch(branch, *sha))
            .collect();
        self.with_refs(owner, name, refs)
    }

    pub fn with_refs(self, owner: &str, name: &str, refs: Vec<GitRef>) -> Self {
        self.refs
            .lock()
            .unwrap()
            .entry(key(owner, name))
            .or_default()
            .extend(refs);
        self
    }

    pub fn with_user_repository(mut self, summary: RepositorySummary) -> Self {
        self.user_repositories.push(summary);
        self
    }

    pub fn failing_listing(mut self, owner: &str, name: &str) -> Self {
        self.failing_listings.insert(key(owner, name));
        self
    }

    /// Any create/update/delete of this reference path fails.
    pub fn failing_ref(mut self, reference: &str) -> Self {
        self.failing_refs.insert(reference.to_string());
        self
    }

    pub fn with_mutation_delay(mut self, delay: Duration) -> Self {
        self.mutation_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<RemoteCall> {
        self.calls().into_iter().filter(RemoteCall::is_mutation).collect()
    }

    pub fn max_concurrent_mutations(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Current `refs/heads/*` of a repository as (branch, sha), sorted.
    pub fn branch_heads(&self, owner: &str, name: &str) -> Vec<(String, String)> {
        let mut heads: Vec<_> = self
            .refs_with_prefix(owner, name, "refs/heads/")
            .into_iter()
            .map(|r| (r.branch_name().to_string(), r.object.sha))
            .collect();
        heads.sort();
        heads
    }

    pub fn refs_with_prefix(&self, owner: &str, name: &str, prefix: &str) -> Vec<GitRef> {
        self.refs
            .lock()
            .unwrap()
            .get(&key(owner, name))
            .map(|refs| {
                refs.iter()
                    .filter(|r| r.name.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn record(&self, call: RemoteCall) {
        self.calls.lock().unwrap().push(call);
    }

    async fn mutate<T>(
        &self,
        reference: &str,
        apply: impl FnOnce(&mut Vec<GitRef>) -> Result<T, GitHubError>,
        repo_key: String,
    ) -> Result<T, GitHubError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.mutation_delay {
            tokio::time::sleep(delay).await;
        }

        let result = if self.failing_refs.contains(reference) {
            Err(GitHubError::NetworkError(format!("connection reset while writing {reference}")))
        } else {
            let mut refs = self.refs.lock().unwrap();
            apply(refs.entry(repo_key).or_default())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl RemoteRepository for MockRemote {
    async fn get_repository(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<RepositoryMetadata, GitHubError> {
        self.record(RemoteCall::GetRepository(key(owner, name)));
        self.repositories
            .get(&key(owner, name))
            .cloned()
            .ok_or_else(|| GitHubError::NetworkError(format!("{owner}/{name} not found")))
    }

    async fn list_branch_heads(&self, owner: &str, name: &str) -> Result<Vec<GitRef>, GitHubError> {
        self.record(RemoteCall::ListHeads(key(owner, name)));
        if self.failing_listings.contains(&key(owner, name)) {
            return Err(GitHubError::NetworkError("listing refs timed out".to_string()));
        }
        Ok(self.refs_with_prefix(owner, name, "refs/heads/"))
    }

    async fn create_ref(
        &self,
        owner: &str,
        name: &str,
        ref_path: &str,
        sha: &str,
    ) -> Result<GitRef, GitHubError> {
        self.record(RemoteCall::Create {
            reference: ref_path.to_string(),
            sha: sha.to_string(),
        });
        self.mutate(
            ref_path,
            |refs| {
                if refs.iter().any(|r| r.name == ref_path) {
                    return Err(GitHubError::NetworkError(format!("{ref_path} already exists")));
                }
                let created = GitRef::new(ref_path, "commit", sha);
                refs.push(created.clone());
                Ok(created)
            },
            key(owner, name),
        )
        .await
    }

    async fn update_ref(
        &self,
        owner: &str,
        name: &str,
        ref_path: &str,
        sha: &str,
        force: bool,
    ) -> Result<GitRef, GitHubError> {
        self.record(RemoteCall::Update {
            reference: ref_path.to_string(),
            sha: sha.to_string(),
            force,
        });
        self.mutate(
            ref_path,
            |refs| match refs.iter_mut().find(|r| r.name == ref_path) {
                Some(existing) => {
                    existing.object.sha = sha.to_string();
                    Ok(existing.clone())
                }
                None => Err(GitHubError::NetworkError(format!("{ref_path} does not exist"))),
            },
            key(owner, name),
        )
        .await
    }

    async fn delete_ref(&self, owner: &str, name: &str, ref_path: &str) -> Result<(), GitHubError> {
        self.record(RemoteCall::Delete {
            reference: ref_path.to_string(),
        });
        self.mutate(
            ref_path,
            |refs| {
                let before = refs.len();
                refs.retain(|r| r.name != ref_path);
                if refs.len() == before {
                    Err(GitHubError::NetworkError(format!("{ref_path} does not exist")))
                } else {
                    Ok(())
                }
            },
            key(owner, name),
        )
        .await
    }

    async fn list_user_repositories(&self) -> Result<Vec<RepositorySummary>, GitHubError> {
        self.record(RemoteCall::ListUserRepositories);
        Ok(self.user_repositories.clone())
    }
}
