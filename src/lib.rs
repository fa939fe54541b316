//! Bridge between a content-management host and a freelance-writing marketplace—an
//! authenticated API gateway with response caching, job listing/import flows, and best-effort
//! publish notifications.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod format;
pub mod gateway;
pub mod host;
pub mod http;
pub mod import;
pub mod jobs;
pub mod notify;
pub mod obs;
pub mod settings;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		gateway::Gateway,
		host::{ContentStore, ImageStore},
		http::ReqwestHttpClient,
		import::Importer,
		notify::{PublishError, PublishFuture, PublisherCredentials, TopicPublisher},
		settings::{SettingKey, Settings},
		store::{
			MemoryCache, MemoryContent, MemorySettings, ResponseCache, SettingsStore, StoreError,
			StoreFuture,
		},
	};

	/// Gateway type alias used by reqwest-backed integration tests.
	pub type ReqwestTestGateway = Gateway<ReqwestHttpClient>;

	/// Backends wired into a test gateway, returned alongside it for inspection.
	pub struct TestBackends {
		/// Settings backend seeded by [`seed_credentials`].
		pub settings: Arc<MemorySettings>,
		/// Response cache backend.
		pub cache: Arc<MemoryCache>,
	}

	/// Builds a reqwest HTTP client suitable for talking to `httpmock` servers.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client =
			ReqwestClient::builder().build().expect("Failed to build Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`Gateway`] backed by in-memory settings + cache and the reqwest transport
	/// used across integration tests.
	pub fn build_reqwest_test_gateway(base_api_url: &str) -> (ReqwestTestGateway, TestBackends) {
		let settings_backend = Arc::new(MemorySettings::default());
		let cache_backend = Arc::new(MemoryCache::default());
		let settings = Settings::new(settings_backend.clone() as Arc<dyn SettingsStore>);
		let cache: Arc<dyn ResponseCache> = cache_backend.clone();
		let base = Url::parse(base_api_url).expect("Failed to parse test base API URL.");
		let gateway = Gateway::new(base, settings, cache, test_reqwest_http_client());

		(gateway, TestBackends { settings: settings_backend, cache: cache_backend })
	}

	/// Stores an org key + access token pair into the provided settings backend.
	pub async fn seed_credentials(settings: &MemorySettings, org_key: &str, access_token: &str) {
		settings
			.set(SettingKey::OrgKey.as_str(), org_key)
			.await
			.expect("Failed to seed org key into test settings.");
		settings
			.set(SettingKey::AccessToken.as_str(), access_token)
			.await
			.expect("Failed to seed access token into test settings.");
	}

	/// Constructs an [`Importer`] around the provided gateway plus an in-memory content store
	/// and a passthrough image store.
	pub fn build_test_importer(
		gateway: ReqwestTestGateway,
	) -> (Importer<ReqwestHttpClient>, Arc<MemoryContent>) {
		let content_backend = Arc::new(MemoryContent::default());
		let content: Arc<dyn ContentStore> = content_backend.clone();
		let images: Arc<dyn ImageStore> =
			Arc::new(PrefixImageStore::new("https://cdn.host.test/media"));
		let importer = Importer::new(gateway, content, images);

		(importer, content_backend)
	}

	/// Image store double that maps every source to `<prefix>/<file_name>`.
	#[derive(Clone, Debug)]
	pub struct PrefixImageStore {
		prefix: String,
	}
	impl PrefixImageStore {
		/// Creates a store that rewrites sources under the provided URL prefix.
		pub fn new(prefix: impl Into<String>) -> Self {
			Self { prefix: prefix.into() }
		}
	}
	impl ImageStore for PrefixImageStore {
		fn resolve<'a>(
			&'a self,
			file_name: &'a str,
			_source_url: &'a str,
		) -> StoreFuture<'a, String> {
			Box::pin(async move { Ok(format!("{}/{file_name}", self.prefix)) })
		}
	}

	/// Image store double whose resolutions always fail, for degrade-path tests.
	#[derive(Clone, Copy, Debug, Default)]
	pub struct FailingImageStore;
	impl ImageStore for FailingImageStore {
		fn resolve<'a>(
			&'a self,
			_file_name: &'a str,
			_source_url: &'a str,
		) -> StoreFuture<'a, String> {
			Box::pin(async move {
				Err(StoreError::Backend { message: "image backend offline".into() })
			})
		}
	}

	/// Publisher double that records each delivery and optionally fails.
	#[derive(Debug, Default)]
	pub struct RecordingPublisher {
		deliveries: Mutex<Vec<(String, String)>>,
		fail: bool,
	}
	impl RecordingPublisher {
		/// Creates a publisher whose deliveries always fail.
		pub fn failing() -> Self {
			Self { deliveries: Mutex::new(Vec::new()), fail: true }
		}

		/// Returns the recorded (topic, message) pairs.
		pub fn deliveries(&self) -> Vec<(String, String)> {
			self.deliveries.lock().clone()
		}
	}
	impl TopicPublisher for RecordingPublisher {
		fn publish<'a>(
			&'a self,
			_credentials: &'a PublisherCredentials,
			topic: &'a str,
			message: &'a str,
		) -> PublishFuture<'a> {
			Box::pin(async move {
				if self.fail {
					return Err(PublishError { message: "broker unreachable".into() });
				}

				self.deliveries.lock().push((topic.to_owned(), message.to_owned()));

				Ok(())
			})
		}
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
#[cfg(test)] use draftbridge as _;
