//! Best-effort publish notifications to an external pub/sub topic.
//!
//! Publish-event handling must never block or fail the surrounding publish operation,
//! so every failure here is absorbed: unmet preconditions suppress the notification
//! silently and delivery failures are logged and swallowed.

// self
use crate::{
	_prelude::*,
	auth::{JobId, OrgKey},
	host::{ContentRecord, ContentStore},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	settings::Settings,
};

/// Long-lived credential pair for the pub/sub publisher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublisherCredentials {
	/// Access key identifier.
	pub access_key: String,
	/// Access secret.
	pub secret: String,
}

/// Error produced by [`TopicPublisher`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Publish failed: {message}.")]
pub struct PublishError {
	/// Human-readable error payload.
	pub message: String,
}

/// Future returned by [`TopicPublisher::publish`].
pub type PublishFuture<'a> = Pin<Box<dyn Future<Output = Result<(), PublishError>> + 'a + Send>>;

/// Outbound pub/sub contract: one message per publish event to a named topic.
pub trait TopicPublisher
where
	Self: Send + Sync,
{
	/// Delivers a single JSON message to the topic.
	fn publish<'a>(
		&'a self,
		credentials: &'a PublisherCredentials,
		topic: &'a str,
		message: &'a str,
	) -> PublishFuture<'a>;
}

/// What became of a publish notification; returned for tests and metrics, never an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotifyOutcome {
	/// Message handed to the publisher successfully.
	Delivered,
	/// A precondition was unmet; no delivery was attempted.
	Suppressed,
	/// The publisher reported a failure; logged and swallowed.
	Failed,
}

/// Emits a message to the configured topic when host content is published.
#[derive(Clone)]
pub struct Notifier {
	settings: Settings,
	content: Arc<dyn ContentStore>,
	publisher: Arc<dyn TopicPublisher>,
}
impl Notifier {
	/// Creates a notifier around the settings facade, the host's content store, and a
	/// publisher implementation.
	pub fn new(
		settings: Settings,
		content: Arc<dyn ContentStore>,
		publisher: Arc<dyn TopicPublisher>,
	) -> Self {
		Self { settings, content, publisher }
	}

	/// Handles a content-publish event.
	///
	/// Delivery happens only when the full conjunction holds: the record is linked to a
	/// job, the org key is configured, both publisher credential fields are present, and
	/// a topic is configured. Any single missing piece suppresses the notification
	/// entirely—there is no partial send and no error.
	pub async fn content_published(&self, content: &ContentRecord) -> NotifyOutcome {
		const KIND: FlowKind = FlowKind::Notify;

		let span = FlowSpan::new(KIND, "content_published");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let outcome = span
			.instrument(async move {
				let preconditions = match self.preconditions(content).await {
					Ok(Some(preconditions)) => preconditions,
					Ok(None) => return NotifyOutcome::Suppressed,
					Err(e) => {
						obs::log_swallowed_error(KIND, &e);

						return NotifyOutcome::Suppressed;
					},
				};
				let message = compose_message(content, &preconditions);

				match self
					.publisher
					.publish(&preconditions.credentials, &preconditions.topic, &message)
					.await
				{
					Ok(()) => NotifyOutcome::Delivered,
					Err(e) => {
						obs::log_swallowed_error(KIND, &e);

						NotifyOutcome::Failed
					},
				}
			})
			.await;

		match outcome {
			NotifyOutcome::Failed => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
			_ => obs::record_flow_outcome(KIND, FlowOutcome::Success),
		}

		outcome
	}

	async fn preconditions(&self, content: &ContentRecord) -> Result<Option<Preconditions>> {
		let Some(job_id) = self.content.job_for_content(&content.id).await? else {
			return Ok(None);
		};
		let Some(org_key) = self.settings.org_key().await? else {
			return Ok(None);
		};
		let Some(access_key) = self.settings.publisher_access_key().await? else {
			return Ok(None);
		};
		let Some(secret) = self.settings.publisher_access_secret().await? else {
			return Ok(None);
		};
		let Some(topic) = self.settings.publish_topic().await? else {
			return Ok(None);
		};
		let permalink = self.content.permalink(&content.id).await?;

		Ok(Some(Preconditions {
			job_id,
			org_key,
			credentials: PublisherCredentials { access_key, secret },
			topic,
			permalink,
		}))
	}
}
impl Debug for Notifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Notifier(..)")
	}
}

struct Preconditions {
	job_id: JobId,
	org_key: OrgKey,
	credentials: PublisherCredentials,
	topic: String,
	permalink: Option<String>,
}

/// Serializes the full content record with the three computed fields added.
fn compose_message(content: &ContentRecord, preconditions: &Preconditions) -> String {
	let mut payload = serde_json::json!(content);

	if let Some(object) = payload.as_object_mut() {
		object.insert("org_key".into(), preconditions.org_key.as_ref().into());
		object.insert("job_id".into(), preconditions.job_id.as_ref().into());
		object.insert(
			"permalink".into(),
			preconditions.permalink.as_deref().map_or(JsonValue::Null, Into::into),
		);
	}

	payload.to_string()
}
