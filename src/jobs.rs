//! Job models and the listing flow behind the admin jobs view.

pub mod filter;

pub use filter::*;

// crates.io
use serde::de::DeserializeOwned;
use serde_json::Map;
// self
use crate::{
	_prelude::*,
	auth::{ContentId, JobId},
	gateway::{FetchOptions, Gateway},
	host::ContentStore,
	http::{ApiHttpClient, Verb},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// A unit of outsourced writing work tracked by the marketplace.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Job {
	/// Marketplace identifier.
	pub id: JobId,
	/// Writing topic, used as the imported content's title.
	#[serde(default)]
	pub topic: Option<String>,
	/// Remaining marketplace fields, passed through untouched for template layers.
	#[serde(flatten)]
	pub extra: Map<String, JsonValue>,
}

/// One page of jobs plus the pagination metadata the marketplace wraps around it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JobPage {
	/// Jobs on this page.
	pub data: Vec<Job>,
	/// Total number of jobs matching the query, when the marketplace reports one.
	#[serde(default)]
	pub total_count: Option<u64>,
	/// Cursor for the next page, when more results exist.
	#[serde(default)]
	pub next_cursor: Option<String>,
}

/// Query inputs for the jobs listing: a status filter slug and a pagination cursor.
#[derive(Clone, Debug, Default)]
pub struct JobQuery {
	/// Filter slug; empty or absent means "All".
	pub filter: Option<String>,
	/// Pagination cursor from the previous page.
	pub cursor: Option<String>,
}
impl JobQuery {
	/// Creates an unfiltered first-page query.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the filter slug.
	pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
		self.filter = Some(filter.into());

		self
	}

	/// Sets the pagination cursor.
	pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
		self.cursor = Some(cursor.into());

		self
	}

	/// Builds the API-relative path, `jobs[/<filter>]?next_cursor=<cursor>`.
	///
	/// The cursor parameter is always present, empty on the first page, so the full
	/// URL—and therefore the cache key—stays stable across equivalent requests.
	pub fn path(&self) -> String {
		let mut path = String::from("jobs");

		if let Some(filter) = self.filter.as_deref().filter(|slug| !slug.is_empty()) {
			path.push('/');
			path.push_str(filter);
		}

		let query = url::form_urlencoded::Serializer::new(String::new())
			.append_pair("next_cursor", self.cursor.as_deref().unwrap_or(""))
			.finish();

		path.push('?');
		path.push_str(&query);

		path
	}
}

/// Listing result: the fetched page (absent when unauthorized) and the mapping from
/// job id to previously imported content.
#[derive(Clone, Debug, Default)]
pub struct JobListing {
	/// Fetched page; `None` when the credentials were rejected and the view should
	/// render without job data.
	pub page: Option<JobPage>,
	/// First imported content record per job, for "already imported" affordances.
	pub linked_content: HashMap<JobId, ContentId>,
}

/// Produces a page of jobs for the admin list view.
///
/// Authorization failures are swallowed: the listing renders empty and the host's
/// notice surface is responsible for telling the user their credentials are invalid.
/// Every other failure propagates.
pub async fn list_jobs<C>(
	gateway: &Gateway<C>,
	content: &dyn ContentStore,
	query: &JobQuery,
) -> Result<JobListing>
where
	C: ?Sized + ApiHttpClient,
{
	const KIND: FlowKind = FlowKind::JobsList;

	let span = FlowSpan::new(KIND, "list_jobs");

	obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

	let result = span
		.instrument(async move {
			let payload = match gateway.fetch(&query.path(), Verb::Get, FetchOptions::new()).await
			{
				Ok(payload) => payload,
				Err(e) if e.is_unauthorized() => {
					obs::log_swallowed_error(KIND, &e);

					return Ok(JobListing::default());
				},
				Err(e) => return Err(e),
			};
			let Some(payload) = payload else {
				return Ok(JobListing::default());
			};
			let page = decode_page(payload)?;
			let job_ids: Vec<JobId> = page.data.iter().map(|job| job.id.clone()).collect();
			let mut matches = content.content_ids_for_jobs(&job_ids).await?;
			let linked_content = matches
				.drain()
				.filter_map(|(job, ids)| ids.into_iter().next().map(|id| (job, id)))
				.collect();

			Ok(JobListing { page: Some(page), linked_content })
		})
		.await;

	match &result {
		Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
		Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
	}

	result
}

/// Decodes a listing payload, accepting both the paginated envelope and a bare array.
fn decode_page(payload: JsonValue) -> Result<JobPage> {
	if payload.is_array() {
		let data = decode_value(payload)?;

		return Ok(JobPage { data, ..JobPage::default() });
	}

	decode_value(payload)
}

/// Decodes a payload value into a typed model, tracking the JSON path on failure.
pub(crate) fn decode_value<T>(payload: JsonValue) -> Result<T>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(payload).map_err(Error::from)
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn paths_compose_filter_and_cursor() {
		assert_eq!(JobQuery::new().path(), "jobs?next_cursor=");
		assert_eq!(JobQuery::new().with_filter("finished").path(), "jobs/finished?next_cursor=");
		assert_eq!(
			JobQuery::new().with_filter("").with_cursor("abc 123").path(),
			"jobs?next_cursor=abc+123",
			"An empty filter means All and the cursor is form-encoded.",
		);
	}

	#[test]
	fn pages_decode_from_envelope_and_bare_array() {
		let envelope = json!({
			"data": [{ "id": "job-1", "topic": "Title" }],
			"total_count": 1,
			"next_cursor": "cursor-2",
		});
		let page = decode_page(envelope).expect("Envelope page should decode.");

		assert_eq!(page.data.len(), 1);
		assert_eq!(page.total_count, Some(1));
		assert_eq!(page.next_cursor.as_deref(), Some("cursor-2"));

		let bare = json!([{ "id": "job-2", "word_count": 1200 }]);
		let page = decode_page(bare).expect("Bare array page should decode.");

		assert_eq!(page.data[0].id.as_ref(), "job-2");
		assert_eq!(page.data[0].extra["word_count"], json!(1200));
		assert_eq!(page.total_count, None);
	}

	#[test]
	fn malformed_pages_surface_the_json_path() {
		let envelope = json!({ "data": [{ "topic": "missing id" }], "total_count": 1 });
		let err = decode_page(envelope).expect_err("A job without an id should fail decoding.");

		assert!(matches!(err, Error::Decode(_)));
		assert!(err.source().is_some());
	}
}
