//! Contracts for the host platform's content and media services.
//!
//! The host's post CRUD, metadata table, and attachment pipeline are opaque services;
//! the bridge only reaches them through the traits below.

// self
use crate::{
	_prelude::*,
	auth::{ContentId, JobId},
	store::StoreFuture,
};

/// Publication state of a host content record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
	/// Visible only in the host's admin surface.
	Draft,
	/// Publicly visible.
	Published,
}

/// A persisted article/page entity on the host platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
	/// Host-side identifier.
	pub id: ContentId,
	/// Display title.
	pub title: String,
	/// HTML body.
	pub body: String,
	/// Publication state.
	pub status: ContentStatus,
}

/// Content about to be persisted; `id` absent means insert, present means update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentDraft {
	/// Existing record to update, when known.
	pub id: Option<ContentId>,
	/// Display title.
	pub title: String,
	/// HTML body.
	pub body: String,
	/// Publication state to persist.
	pub status: ContentStatus,
}

/// Host-platform content storage contract.
pub trait ContentStore
where
	Self: Send + Sync,
{
	/// Fetches a record by identifier.
	fn fetch<'a>(&'a self, id: &'a ContentId) -> StoreFuture<'a, Option<ContentRecord>>;

	/// Persists the draft, inserting or updating based on `draft.id`, and returns the
	/// record's identifier.
	fn save(&self, draft: ContentDraft) -> StoreFuture<'_, ContentId>;

	/// Resolves each job to the content records previously imported from it.
	fn content_ids_for_jobs<'a>(
		&'a self,
		jobs: &'a [JobId],
	) -> StoreFuture<'a, HashMap<JobId, Vec<ContentId>>>;

	/// Returns the job linked to a record through persistent metadata, if any.
	fn job_for_content<'a>(&'a self, id: &'a ContentId) -> StoreFuture<'a, Option<JobId>>;

	/// Attaches the job as persistent metadata: added when absent, updated otherwise.
	fn link_job<'a>(&'a self, id: &'a ContentId, job: &'a JobId) -> StoreFuture<'a, ()>;

	/// Public permalink of a record, when the host can compute one.
	fn permalink<'a>(&'a self, id: &'a ContentId) -> StoreFuture<'a, Option<String>>;

	/// Admin edit URL for a record.
	fn edit_url<'a>(&'a self, id: &'a ContentId) -> StoreFuture<'a, String>;
}

/// Host-platform media storage contract.
///
/// `resolve` returns the local URL of a stored copy of `source_url`, importing it when
/// no attachment with the given filename exists yet. The filename doubles as the dedup
/// key, so repeated imports of the same source reuse the first copy.
pub trait ImageStore
where
	Self: Send + Sync,
{
	/// Resolves a remote image to the URL of its locally stored copy.
	fn resolve<'a>(&'a self, file_name: &'a str, source_url: &'a str) -> StoreFuture<'a, String>;
}
