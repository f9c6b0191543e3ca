//! # agentwatch-github
//!
//! GitHub REST integration for agentwatch.
//!
//! The dispatcher and the agents never talk to GitHub directly; they go
//! through the [`GitHubApi`] trait, which covers the handful of calls the
//! system needs: file contents at a PR head, PR metadata, changed files,
//! comments, labels, and replies. [`GitHubClient`] is the reqwest-backed
//! implementation; tests substitute an in-memory mock.
//!
//! ## Key Types
//!
//! - [`GitHubApi`] - The API seam used by the dispatcher and agents
//! - [`GitHubClient`] - reqwest implementation against the REST v3 API
//! - [`RepoRef`] - `owner/name` pair identifying a repository
//! - [`ChangedFile`] - One entry from the PR file listing, with its patch
//!
//! ## Patches
//!
//! Changed files arrive with their unified-diff `patch` text when GitHub
//! can produce one (absent for binary files). [`added_lines`] maps a patch
//! to the destination line numbers introduced by the change.

mod api;
mod client;
mod patch;

pub use api::{
    pull_head_ref, ChangedFile, FileContent, GitHubApi, GitHubError, IssueComment,
    PullRequestInfo, RepoRef, ReviewComment,
};
pub use client::{GitHubClient, DEFAULT_API_URL};
pub use patch::added_lines;
