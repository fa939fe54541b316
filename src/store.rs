//! Storage contracts for the host-provided key/value collaborators.
//!
//! The host platform owns settings persistence, the response cache, and content storage;
//! this crate only talks to them through the traits below. Backends are assumed to provide
//! their own internal consistency, so no cross-request locking happens here.

pub mod file;
pub mod memory;

pub use file::FileSettings;
pub use memory::{MemoryCache, MemoryContent, MemorySettings};

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, OrgKey},
};

/// Future type shared by every storage contract in the crate.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Key/value persistence for plugin settings (org key, access token, publisher
/// credentials, topic identifier).
///
/// Keys are the stable storage strings from [`SettingKey::as_str`](crate::settings::SettingKey);
/// the typed facade lives in [`Settings`](crate::settings::Settings).
pub trait SettingsStore
where
	Self: Send + Sync,
{
	/// Fetches a setting value, `None` when absent.
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

	/// Persists or replaces a setting value.
	fn set<'a>(&'a self, key: &'a str, value: &'a str) -> StoreFuture<'a, ()>;

	/// Removes a setting, succeeding silently when it was already absent.
	fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;
}

/// TTL-based cache mapping a request fingerprint to a previously fetched response body.
pub trait ResponseCache
where
	Self: Send + Sync,
{
	/// Returns the cached payload when present and not expired.
	fn get<'a>(&'a self, key: &'a CacheKey) -> StoreFuture<'a, Option<JsonValue>>;

	/// Stores a payload under the key for `ttl`; entries are never partially updated.
	fn set<'a>(
		&'a self,
		key: &'a CacheKey,
		value: &'a JsonValue,
		ttl: Duration,
	) -> StoreFuture<'a, ()>;

	/// Invalidates a single entry.
	fn remove<'a>(&'a self, key: &'a CacheKey) -> StoreFuture<'a, ()>;

	/// Drops every entry.
	fn flush(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by store implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Request fingerprint used to key cache entries.
///
/// Derived from the exact credential set and the full request URL, so changing the page
/// cursor, filter, or either credential naturally produces a distinct entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);
impl CacheKey {
	/// Builds a key binding the credential pair to the full request URL.
	pub fn new(org_key: &OrgKey, access_token: &AccessToken, url: &Url) -> Self {
		Self(format!("{org_key}::{access_token}::{url}"))
	}

	/// Returns the underlying fingerprint string.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
