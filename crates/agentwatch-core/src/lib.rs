//! # agentwatch-core
//!
//! The dispatch and file-watch core.
//!
//! Two inbound event flows share one [`WatchDispatcher`]:
//!
//! - **Tag flow** - a new review comment carries an `@agentwatch` command:
//!   label the PR, run the agent, post a confirmation reply.
//! - **Rescan flow** - a push updated the PR: re-derive the watch set from
//!   the existing review comments, match watched paths against the changed
//!   files, and re-run each matching agent.
//!
//! The system holds no state of its own. The watch set is recomputed from
//! GitHub's comment and label history on every event, so there is nothing
//! to drift and nothing to lose across restarts.

mod command;
mod dispatcher;
mod error;
mod event;
pub mod messages;

pub use command::WatchCommand;
pub use dispatcher::{RescanOutcome, TagOutcome, WatchDispatcher, LABEL_PREFIX};
pub use error::DispatchError;
pub use event::{
    CommentPayload, LabelPayload, OwnerPayload, PullRequestEvent, PullRequestPayload,
    RepositoryPayload, ReviewCommentEvent,
};
