//! Job import flow: materialize a marketplace job as host content.
//!
//! The three public operations back the host's admin callbacks (preview, create draft,
//! refresh). Internal failures are translated at this boundary into an HTTP-like
//! status + message pair instead of leaking the crate's error type to the browser.

// self
use crate::{
	_prelude::*,
	auth::{ContentId, JobId},
	format,
	gateway::{FetchOptions, Gateway},
	host::{ContentDraft, ContentStatus, ContentStore, ImageStore},
	http::{ApiHttpClient, Verb},
	jobs::{Job, decode_value},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::StoreError,
};

/// Status + message pair returned to the host's admin surface when a callback fails.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{message}")]
pub struct TaskError {
	/// HTTP-like status code for the response.
	pub status: u16,
	/// Message rendered to the browser.
	pub message: String,
}
impl TaskError {
	fn unauthorized() -> Self {
		Self { status: 401, message: "Marketplace access token is not authorized.".into() }
	}

	fn unavailable(message: &str) -> Self {
		Self { status: 400, message: message.into() }
	}

	fn from_error(e: &Error) -> Self {
		if e.is_unauthorized() {
			Self::unauthorized()
		} else {
			Self { status: 500, message: e.to_string() }
		}
	}

	fn from_storage(e: StoreError) -> Self {
		Self { status: 500, message: e.to_string() }
	}
}

/// Imports marketplace jobs as host content records.
#[derive(Clone)]
pub struct Importer<C>
where
	C: ?Sized + ApiHttpClient,
{
	gateway: Gateway<C>,
	content: Arc<dyn ContentStore>,
	images: Arc<dyn ImageStore>,
}
impl<C> Importer<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates an importer around the gateway and the host's content + media services.
	pub fn new(
		gateway: Gateway<C>,
		content: Arc<dyn ContentStore>,
		images: Arc<dyn ImageStore>,
	) -> Self {
		Self { gateway, content, images }
	}

	/// Returns the finished job's formatted HTML body for an admin preview dialog.
	pub async fn preview_job(&self, job_id: &JobId) -> Result<String, TaskError> {
		const KIND: FlowKind = FlowKind::Preview;

		let span = FlowSpan::new(KIND, "preview_job");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				match self.job_as_draft(job_id, None).await {
					Ok(Some(draft)) => Ok(draft.body),
					Ok(None) => Err(TaskError::unavailable("Unable to preview job")),
					Err(e) => Err(TaskError::from_error(&e)),
				}
			})
			.await;

		record_outcome(KIND, &result);

		result
	}

	/// Converts a job into a content record and returns the record's admin edit URL.
	///
	/// Reuses the content record already linked to the job when one exists; otherwise a
	/// new record is created. The job id is attached as persistent metadata either way.
	pub async fn create_draft(&self, job_id: &JobId, publish: bool) -> Result<String, TaskError> {
		const KIND: FlowKind = FlowKind::CreateDraft;

		let span = FlowSpan::new(KIND, "create_draft");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut draft = match self.job_as_draft(job_id, None).await {
					Ok(Some(draft)) => draft,
					Ok(None) => return Err(TaskError::unavailable("Unable to create draft")),
					Err(e) => return Err(TaskError::from_error(&e)),
				};

				draft.status =
					if publish { ContentStatus::Published } else { ContentStatus::Draft };

				let id = self.content.save(draft).await.map_err(TaskError::from_storage)?;

				self.content.link_job(&id, job_id).await.map_err(TaskError::from_storage)?;
				self.content.edit_url(&id).await.map_err(TaskError::from_storage)
			})
			.await;

		record_outcome(KIND, &result);

		result
	}

	/// Re-imports a job into its previously linked content record and returns the
	/// record's admin edit URL. The record's publication state is preserved.
	pub async fn refresh_content(
		&self,
		content_id: &ContentId,
		job_id: &JobId,
	) -> Result<String, TaskError> {
		const KIND: FlowKind = FlowKind::RefreshContent;

		let span = FlowSpan::new(KIND, "refresh_content");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let draft = match self.job_as_draft(job_id, Some(content_id.clone())).await {
					Ok(Some(draft)) => draft,
					Ok(None) => return Err(TaskError::unavailable("Unable to refresh content")),
					Err(e) => return Err(TaskError::from_error(&e)),
				};
				let id = self.content.save(draft).await.map_err(TaskError::from_storage)?;

				self.content.edit_url(&id).await.map_err(TaskError::from_storage)
			})
			.await;

		record_outcome(KIND, &result);

		result
	}

	/// Fetches job metadata + HTML and coerces them into a draft for the host.
	///
	/// `None` when the marketplace has no such job or no finished HTML yet. When the
	/// API returns the HTML under a plural shape, the first element is used.
	async fn job_as_draft(
		&self,
		job_id: &JobId,
		content_id: Option<ContentId>,
	) -> Result<Option<ContentDraft>> {
		let job_payload =
			self.gateway.fetch(&format!("jobs/{job_id}"), Verb::Get, FetchOptions::new()).await?;
		let html_payload = self
			.gateway
			.fetch(&format!("jobs/{job_id}/html_contents"), Verb::Get, FetchOptions::new())
			.await?;
		let (Some(job_payload), Some(html_payload)) = (job_payload, html_payload) else {
			return Ok(None);
		};
		let job: Job = decode_value(job_payload)?;
		let Some(html) = extract_html(&html_payload) else {
			return Ok(None);
		};
		let content_id = match content_id {
			Some(id) => Some(id),
			None => self.linked_content(job_id).await?,
		};
		let existing = match &content_id {
			Some(id) => self.content.fetch(id).await?,
			None => None,
		};
		let title = format::trim_quotes(job.topic.as_deref().unwrap_or_default()).to_owned();
		let body = format::rewrite_content_images(html, self.images.as_ref()).await;
		let status = existing.as_ref().map_or(ContentStatus::Draft, |record| record.status);

		Ok(Some(ContentDraft { id: existing.map(|record| record.id), title, body, status }))
	}

	async fn linked_content(&self, job_id: &JobId) -> Result<Option<ContentId>> {
		let mut matches =
			self.content.content_ids_for_jobs(std::slice::from_ref(job_id)).await?;

		Ok(matches.remove(job_id).and_then(|ids| ids.into_iter().next()))
	}
}
impl<C> Debug for Importer<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Importer").field("gateway", &self.gateway).finish()
	}
}

fn record_outcome<T>(kind: FlowKind, result: &Result<T, TaskError>) {
	match result {
		Ok(_) => obs::record_flow_outcome(kind, FlowOutcome::Success),
		Err(_) => obs::record_flow_outcome(kind, FlowOutcome::Failure),
	}
}

/// Resolves the `html_contents` field, taking the first element of a plural shape.
fn extract_html(payload: &JsonValue) -> Option<&str> {
	let contents = payload.get("html_contents")?;
	let contents = match contents {
		JsonValue::Array(items) => items.first()?,
		other => other,
	};

	contents.as_str().filter(|html| !html.is_empty())
}
