use async_trait::async_trait;
use octocrab::{Octocrab, Page};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::json;
use tracing::{debug, info};

use super::errors::GitHubError;
use super::types::{GitRef, RawRepository, RepositoryMetadata, RepositorySummary};
use crate::config::GitHubConfig;
use crate::http::RateLimitedHttpClient;
use crate::observability::api_metrics;

/// GitHub caps list endpoints at 100 entries per page.
pub const PAGE_SIZE: u8 = 100;

/// Remote repository operations the reconciliation engine depends on.
///
/// Implemented by [`GitHubClient`] against the REST API and by in-memory
/// mocks in tests. Reference paths are always full paths such as
/// `refs/heads/main` or `refs/backups/20240101120000/main`.
#[async_trait]
pub trait RemoteRepository: Send + Sync {
    async fn get_repository(&self, owner: &str, name: &str)
        -> Result<RepositoryMetadata, GitHubError>;

    /// All `refs/heads/*` references of a repository, every page fetched.
    async fn list_branch_heads(&self, owner: &str, name: &str) -> Result<Vec<GitRef>, GitHubError>;

    async fn create_ref(
        &self,
        owner: &str,
        name: &str,
        ref_path: &str,
        sha: &str,
    ) -> Result<GitRef, GitHubError>;

    async fn update_ref(
        &self,
        owner: &str,
        name: &str,
        ref_path: &str,
        sha: &str,
        force: bool,
    ) -> Result<GitRef, GitHubError>;

    async fn delete_ref(&self, owner: &str, name: &str, ref_path: &str) -> Result<(), GitHubError>;

    /// Repositories of the authenticated user, all affiliations.
    async fn list_user_repositories(&self) -> Result<Vec<RepositorySummary>, GitHubError>;
}

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: RateLimitedHttpClient,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHubError> {
        let token = config
            .token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                GitHubError::TokenNotFound(
                    "GitHub token not found. Set UPSTREAM_RESET_GITHUB_TOKEN or GITHUB_TOKEN, \
                     or add github.token to upstream-reset.toml."
                        .to_string(),
                )
            })?;

        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if let Some(api_base) = config.api_base.as_deref() {
            builder = builder.base_uri(api_base)?;
        }
        let octocrab = builder.build()?;

        Ok(Self {
            http: RateLimitedHttpClient::new(octocrab, &config.rate_limit)?,
        })
    }

    fn octocrab(&self) -> &Octocrab {
        self.http.octocrab()
    }

    async fn fetch_all<T>(&self, first: Page<T>) -> Result<Vec<T>, GitHubError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut page = first;
        let mut items = page.take_items();
        loop {
            if page.next.is_none() {
                return Ok(items);
            }
            self.http.until_ready().await;
            api_metrics().record_request();
            match self.octocrab().get_page::<T>(&page.next).await {
                Ok(Some(mut next)) => {
                    items.extend(next.take_items());
                    page = next;
                }
                Ok(None) => return Ok(items),
                Err(e) => {
                    api_metrics().record_error();
                    return Err(e.into());
                }
            }
        }
    }
}

fn tracked<T>(result: Result<T, octocrab::Error>) -> Result<T, GitHubError> {
    api_metrics().record_request();
    result.map_err(|e| {
        api_metrics().record_error();
        GitHubError::from(e)
    })
}

/// Characters kept as-is inside one ref path segment; `#`, `%`, `?` and the
/// rest are escaped so the URL still names the same ref.
const REF_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// `refs/heads/fix#1` -> `/repos/{owner}/{name}/git/refs/heads/fix%231`
fn ref_route(owner: &str, name: &str, ref_path: &str) -> String {
    let short = ref_path.strip_prefix("refs/").unwrap_or(ref_path);
    let encoded: Vec<String> = short
        .split('/')
        .map(|segment| utf8_percent_encode(segment, REF_SEGMENT).to_string())
        .collect();
    format!("/repos/{owner}/{name}/git/refs/{}", encoded.join("/"))
}

#[async_trait]
impl RemoteRepository for GitHubClient {
    async fn get_repository(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<RepositoryMetadata, GitHubError> {
        self.http.until_ready().await;
        let raw: RawRepository = tracked(
            self.octocrab()
                .get(format!("/repos/{owner}/{name}"), None::<&()>)
                .await,
        )?;
        debug!(
            owner,
            name,
            parent = ?raw.parent.as_ref().map(|p| &p.name),
            "Fetched repository metadata"
        );
        Ok(raw.into())
    }

    async fn list_branch_heads(&self, owner: &str, name: &str) -> Result<Vec<GitRef>, GitHubError> {
        self.http.until_ready().await;
        let first: Result<Page<GitRef>, octocrab::Error> = self
            .octocrab()
            .get(
                format!("/repos/{owner}/{name}/git/matching-refs/heads"),
                Some(&json!({ "per_page": PAGE_SIZE })),
            )
            .await;

        let first = match first {
            Ok(page) => {
                api_metrics().record_request();
                page
            }
            // GitHub answers 409 for a repository without any commits
            Err(octocrab::Error::GitHub { source, .. }) if source.status_code.as_u16() == 409 => {
                api_metrics().record_request();
                debug!(owner, name, "Repository is empty, no branch heads");
                return Ok(Vec::new());
            }
            Err(e) => return tracked(Err(e)),
        };

        let heads = self.fetch_all(first).await?;
        debug!(owner, name, count = heads.len(), "Listed branch heads");
        Ok(heads)
    }

    async fn create_ref(
        &self,
        owner: &str,
        name: &str,
        ref_path: &str,
        sha: &str,
    ) -> Result<GitRef, GitHubError> {
        self.http.until_ready().await;
        api_metrics().record_mutation();
        let created: GitRef = tracked(
            self.octocrab()
                .post(
                    format!("/repos/{owner}/{name}/git/refs"),
                    Some(&json!({ "ref": ref_path, "sha": sha })),
                )
                .await,
        )?;
        info!(owner, name, reference = ref_path, sha, "Created reference");
        Ok(created)
    }

    async fn update_ref(
        &self,
        owner: &str,
        name: &str,
        ref_path: &str,
        sha: &str,
        force: bool,
    ) -> Result<GitRef, GitHubError> {
        self.http.until_ready().await;
        api_metrics().record_mutation();
        let updated: GitRef = tracked(
            self.octocrab()
                .patch(
                    ref_route(owner, name, ref_path),
                    Some(&json!({ "sha": sha, "force": force })),
                )
                .await,
        )?;
        info!(owner, name, reference = ref_path, sha, force, "Updated reference");
        Ok(updated)
    }

    async fn delete_ref(&self, owner: &str, name: &str, ref_path: &str) -> Result<(), GitHubError> {
        self.http.until_ready().await;
        api_metrics().record_mutation();
        let result = match self
            .octocrab()
            ._delete(ref_route(owner, name, ref_path), None::<&()>)
            .await
        {
            Ok(response) => octocrab::map_github_error(response).await.map(drop),
            Err(e) => Err(e),
        };
        tracked(result)?;
        info!(owner, name, reference = ref_path, "Deleted reference");
        Ok(())
    }

    async fn list_user_repositories(&self) -> Result<Vec<RepositorySummary>, GitHubError> {
        self.http.until_ready().await;
        let first: Page<RawRepository> = tracked(
            self.octocrab()
                .get(
                    "/user/repos",
                    Some(&json!({ "type": "all", "per_page": PAGE_SIZE })),
                )
                .await,
        )?;
        let repositories = self.fetch_all(first).await?;
        Ok(repositories.into_iter().map(RepositorySummary::from).collect())
    }
}
