use octocrab::Octocrab;
use octocrab::models::CommentId;
use octocrab::models::issues::Comment;
use serde::Serialize;

use crate::error::{GithubError, GithubResult};
use crate::types::{CombinedStatus, PullRequestData};

const PAGE_SIZE: usize = 100;

#[derive(Serialize)]
struct ListPullsParams {
    state: &'static str,
    per_page: usize,
    page: u32,
}

/// GitHub API client scoped to one repository
pub struct GithubApiClient {
    client: Octocrab,
    owner: String,
    repo: String,
}

impl GithubApiClient {
    /// Create a new client with personal access token authentication
    pub fn new(token: String, owner: String, repo: String) -> GithubResult<Self> {
        let client = Octocrab::builder()
            .personal_token(token)
            .build()
            .map_err(|e| {
                GithubError::ApiError(format!("Failed to create octocrab client: {}", e))
            })?;

        Ok(Self {
            client,
            owner,
            repo,
        })
    }

    /// Create client from an existing octocrab instance
    pub fn from_octocrab(client: Octocrab, owner: String, repo: String) -> Self {
        Self {
            client,
            owner,
            repo,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// List all open pull requests in the repository.
    ///
    /// Note that the list endpoint omits mergeability; use
    /// [`Self::get_pull_request`] for the full record.
    pub async fn list_open_pull_requests(&self) -> GithubResult<Vec<PullRequestData>> {
        let route = format!("/repos/{}/{}/pulls", self.owner, self.repo);
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            let params = ListPullsParams {
                state: "open",
                per_page: PAGE_SIZE,
                page,
            };
            let batch: Vec<PullRequestData> =
                self.client.get(&route, Some(&params)).await.map_err(|e| {
                    GithubError::ApiError(format!("Failed to list pull requests: {}", e))
                })?;
            let last_page = batch.len() < PAGE_SIZE;
            all.extend(batch);
            if last_page {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    /// Fetch a single pull request, including its mergeability
    pub async fn get_pull_request(&self, number: u64) -> GithubResult<PullRequestData> {
        let route = format!("/repos/{}/{}/pulls/{}", self.owner, self.repo, number);
        self.client
            .get(&route, None::<&()>)
            .await
            .map_err(|e| GithubError::ApiError(format!("Failed to fetch PR #{}: {}", number, e)))
    }

    /// Fetch the combined commit status for a ref
    pub async fn combined_status(&self, git_ref: &str) -> GithubResult<CombinedStatus> {
        let route = format!(
            "/repos/{}/{}/commits/{}/status",
            self.owner, self.repo, git_ref
        );
        self.client.get(route, None::<&()>).await.map_err(|e| {
            GithubError::ApiError(format!(
                "Failed to fetch combined status for {}: {}",
                git_ref, e
            ))
        })
    }

    /// Add a comment to an issue or pull request
    pub async fn add_comment(&self, number: u64, body: &str) -> GithubResult<CommentId> {
        let comment = self
            .client
            .issues(&self.owner, &self.repo)
            .create_comment(number, body)
            .await
            .map_err(|e| {
                GithubError::ApiError(format!("Failed to add comment to #{}: {}", number, e))
            })?;

        Ok(comment.id)
    }

    /// List all comments on an issue or pull request
    pub async fn list_comments(&self, number: u64) -> GithubResult<Vec<Comment>> {
        let page = self
            .client
            .issues(&self.owner, &self.repo)
            .list_comments(number)
            .per_page(100)
            .send()
            .await
            .map_err(|e| {
                GithubError::ApiError(format!("Failed to list comments on #{}: {}", number, e))
            })?;

        self.client
            .all_pages(page)
            .await
            .map_err(|e| {
                GithubError::ApiError(format!("Failed to page comments on #{}: {}", number, e))
            })
    }

    /// Delete a comment
    pub async fn delete_comment(&self, id: CommentId) -> GithubResult<()> {
        self.client
            .issues(&self.owner, &self.repo)
            .delete_comment(id)
            .await
            .map_err(|e| {
                GithubError::ApiError(format!("Failed to delete comment {:?}: {}", id, e))
            })
    }
}
