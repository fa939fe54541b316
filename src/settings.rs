//! Typed facade over the host's settings storage.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, OrgKey},
	store::SettingsStore,
};

/// Named settings persisted through the host's [`SettingsStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettingKey {
	/// Tenant identifier for the remote marketplace account.
	OrgKey,
	/// Bearer credential for the remote marketplace API.
	AccessToken,
	/// Long-lived access key for the pub/sub publisher.
	PublisherAccessKey,
	/// Long-lived secret for the pub/sub publisher.
	PublisherAccessSecret,
	/// Topic identifier targeted by publish notifications.
	PublishTopic,
}
impl SettingKey {
	/// Every key managed by the bridge, in declaration order.
	pub const ALL: [SettingKey; 5] = [
		SettingKey::OrgKey,
		SettingKey::AccessToken,
		SettingKey::PublisherAccessKey,
		SettingKey::PublisherAccessSecret,
		SettingKey::PublishTopic,
	];

	/// Returns the stable storage-key string.
	pub const fn as_str(self) -> &'static str {
		match self {
			SettingKey::OrgKey => "_draftbridge_org_key",
			SettingKey::AccessToken => "_draftbridge_api_key",
			SettingKey::PublisherAccessKey => "_draftbridge_publisher_access_key",
			SettingKey::PublisherAccessSecret => "_draftbridge_publisher_access_secret",
			SettingKey::PublishTopic => "_draftbridge_publish_topic",
		}
	}
}
impl Display for SettingKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Storage keys left behind by previous releases, deleted by [`Settings::scrub_legacy`].
pub const LEGACY_SETTING_KEYS: &[&str] = &["_draftbridge_id", "_draftbridge_access_token"];

/// Typed settings service wrapping an injected [`SettingsStore`].
#[derive(Clone)]
pub struct Settings {
	store: Arc<dyn SettingsStore>,
}
impl Settings {
	/// Wraps the provided store backend.
	pub fn new(store: Arc<dyn SettingsStore>) -> Self {
		Self { store }
	}

	/// Currently configured organization key, `None` when absent or empty.
	pub async fn org_key(&self) -> Result<Option<OrgKey>> {
		let raw = self.store.get(SettingKey::OrgKey.as_str()).await?;

		Ok(raw.and_then(|value| OrgKey::new(value).ok()))
	}

	/// Updates the organization key after sanitization.
	pub async fn set_org_key(&self, value: &str) -> Result<()> {
		Ok(self.store.set(SettingKey::OrgKey.as_str(), &sanitize(value)).await?)
	}

	/// Currently configured access token, `None` when absent or empty.
	pub async fn access_token(&self) -> Result<Option<AccessToken>> {
		let raw = self.store.get(SettingKey::AccessToken.as_str()).await?;

		Ok(raw.and_then(|value| AccessToken::new(value).ok()))
	}

	/// Updates the access token after sanitization.
	pub async fn set_access_token(&self, value: &str) -> Result<()> {
		Ok(self.store.set(SettingKey::AccessToken.as_str(), &sanitize(value)).await?)
	}

	/// Currently configured publisher access key, `None` when absent or empty.
	pub async fn publisher_access_key(&self) -> Result<Option<String>> {
		self.get_non_empty(SettingKey::PublisherAccessKey).await
	}

	/// Updates the publisher access key after sanitization.
	pub async fn set_publisher_access_key(&self, value: &str) -> Result<()> {
		Ok(self.store.set(SettingKey::PublisherAccessKey.as_str(), &sanitize(value)).await?)
	}

	/// Currently configured publisher secret, `None` when absent or empty.
	pub async fn publisher_access_secret(&self) -> Result<Option<String>> {
		self.get_non_empty(SettingKey::PublisherAccessSecret).await
	}

	/// Updates the publisher secret after sanitization.
	pub async fn set_publisher_access_secret(&self, value: &str) -> Result<()> {
		Ok(self.store.set(SettingKey::PublisherAccessSecret.as_str(), &sanitize(value)).await?)
	}

	/// Currently configured publish topic, `None` when absent or empty.
	pub async fn publish_topic(&self) -> Result<Option<String>> {
		self.get_non_empty(SettingKey::PublishTopic).await
	}

	/// Updates the publish topic after sanitization.
	pub async fn set_publish_topic(&self, value: &str) -> Result<()> {
		Ok(self.store.set(SettingKey::PublishTopic.as_str(), &sanitize(value)).await?)
	}

	/// True when both the org key and access token are configured.
	pub async fn can_connect(&self) -> Result<bool> {
		Ok(self.org_key().await?.is_some() && self.access_token().await?.is_some())
	}

	/// Seeds empty credential slots so the host's admin surface can render the form.
	pub async fn activate(&self) -> Result<()> {
		for key in [SettingKey::OrgKey, SettingKey::AccessToken] {
			if self.store.get(key.as_str()).await?.is_none() {
				self.store.set(key.as_str(), "").await?;
			}
		}

		Ok(())
	}

	/// Removes the credential pair on deactivation.
	pub async fn deactivate(&self) -> Result<()> {
		self.store.remove(SettingKey::AccessToken.as_str()).await?;
		self.store.remove(SettingKey::OrgKey.as_str()).await?;

		Ok(())
	}

	/// Deletes storage keys left behind by previous releases.
	pub async fn scrub_legacy(&self) -> Result<()> {
		for key in LEGACY_SETTING_KEYS {
			self.store.remove(key).await?;
		}

		Ok(())
	}

	async fn get_non_empty(&self, key: SettingKey) -> Result<Option<String>> {
		let raw = self.store.get(key.as_str()).await?;

		Ok(raw.filter(|value| !value.is_empty()))
	}
}
impl Debug for Settings {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Settings(..)")
	}
}

/// Normalizes untrusted form input: strips control characters, collapses whitespace
/// runs to a single space, and trims the ends.
pub fn sanitize(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	let mut pending_space = false;

	for c in value.trim().chars() {
		if c.is_control() || c.is_whitespace() {
			pending_space = true;

			continue;
		}
		if pending_space && !out.is_empty() {
			out.push(' ');
		}

		pending_space = false;

		out.push(c);
	}

	out
}
