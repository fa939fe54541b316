// crates.io
use serde_json::json;
// self
use draftbridge::{
	_preludet::*,
	auth::{ContentId, JobId},
	host::{ContentRecord, ContentStatus, ContentStore},
	notify::{Notifier, NotifyOutcome, TopicPublisher},
	settings::Settings,
	store::{MemoryContent, MemorySettings, SettingsStore},
};

const ORG_KEY: &str = "org-notify";
const TOPIC: &str = "content-published";

async fn seeded_settings() -> Settings {
	let settings = Settings::new(Arc::new(MemorySettings::default()) as Arc<dyn SettingsStore>);

	settings.set_org_key(ORG_KEY).await.expect("Seeding the org key should succeed.");
	settings
		.set_publisher_access_key("pub-key")
		.await
		.expect("Seeding the publisher access key should succeed.");
	settings
		.set_publisher_access_secret("pub-secret")
		.await
		.expect("Seeding the publisher secret should succeed.");
	settings.set_publish_topic(TOPIC).await.expect("Seeding the publish topic should succeed.");

	settings
}

fn linked_record(content: &MemoryContent) -> ContentRecord {
	let record = ContentRecord {
		id: ContentId::new("content-5").expect("Content identifier fixture should be valid."),
		title: "Ten Garden Tips".into(),
		body: "<p>Tips</p>".into(),
		status: ContentStatus::Published,
	};

	content.insert_linked(
		record.clone(),
		Some(JobId::new("job-5").expect("Job identifier fixture should be valid.")),
	);

	record
}

fn notifier(
	settings: Settings,
	content: Arc<MemoryContent>,
	publisher: Arc<RecordingPublisher>,
) -> Notifier {
	Notifier::new(
		settings,
		content as Arc<dyn ContentStore>,
		publisher as Arc<dyn TopicPublisher>,
	)
}

#[tokio::test]
async fn publishing_linked_content_delivers_the_full_payload() {
	let settings = seeded_settings().await;
	let content = Arc::new(MemoryContent::default());
	let record = linked_record(&content);
	let publisher = Arc::new(RecordingPublisher::default());
	let outcome =
		notifier(settings, content, publisher.clone()).content_published(&record).await;

	assert_eq!(outcome, NotifyOutcome::Delivered);

	let deliveries = publisher.deliveries();

	assert_eq!(deliveries.len(), 1);

	let (topic, message) = &deliveries[0];

	assert_eq!(topic, TOPIC);

	let payload: JsonValue =
		serde_json::from_str(message).expect("The delivered message should be JSON.");

	assert_eq!(payload["org_key"], json!(ORG_KEY));
	assert_eq!(payload["job_id"], json!("job-5"));
	assert_eq!(payload["permalink"], json!("https://host.example/content-5"));
	assert_eq!(payload["id"], json!("content-5"));
	assert_eq!(payload["title"], json!("Ten Garden Tips"));
	assert_eq!(payload["status"], json!("published"));
}

#[tokio::test]
async fn a_missing_topic_suppresses_the_notification() {
	let settings = seeded_settings().await;

	settings
		.set_publish_topic("")
		.await
		.expect("Blanking the publish topic should succeed.");

	let content = Arc::new(MemoryContent::default());
	let record = linked_record(&content);
	let publisher = Arc::new(RecordingPublisher::default());
	let outcome =
		notifier(settings, content, publisher.clone()).content_published(&record).await;

	assert_eq!(outcome, NotifyOutcome::Suppressed);
	assert!(publisher.deliveries().is_empty(), "No delivery may be attempted.");
}

#[tokio::test]
async fn unlinked_content_suppresses_the_notification() {
	let settings = seeded_settings().await;
	let content = Arc::new(MemoryContent::default());
	let record = ContentRecord {
		id: ContentId::new("content-manual").expect("Content identifier fixture should be valid."),
		title: "Hand-written".into(),
		body: "<p>Manual</p>".into(),
		status: ContentStatus::Published,
	};

	content.insert_linked(record.clone(), None);

	let publisher = Arc::new(RecordingPublisher::default());
	let outcome =
		notifier(settings, content, publisher.clone()).content_published(&record).await;

	assert_eq!(outcome, NotifyOutcome::Suppressed);
	assert!(publisher.deliveries().is_empty());
}

#[tokio::test]
async fn delivery_failures_are_swallowed() {
	let settings = seeded_settings().await;
	let content = Arc::new(MemoryContent::default());
	let record = linked_record(&content);
	let publisher = Arc::new(RecordingPublisher::failing());
	let outcome =
		notifier(settings, content, publisher.clone()).content_published(&record).await;

	assert_eq!(outcome, NotifyOutcome::Failed, "A publisher fault never propagates.");
	assert!(publisher.deliveries().is_empty());
}
