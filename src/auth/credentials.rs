//! Credential resolution shared by every outbound marketplace call.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, OrgKey},
	settings::Settings,
};

/// Resolved credential pair required for any outbound API call.
///
/// Both fields must be present before a request is built; absence of either is
/// [`Error::MissingCredentials`], a distinct failure from a remote rejection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
	/// Tenant identifier for the remote marketplace account.
	pub org_key: OrgKey,
	/// Bearer credential for the remote marketplace API.
	pub access_token: AccessToken,
}
impl Credentials {
	/// Resolves credentials from per-call overrides, falling back to the settings store.
	///
	/// Returns [`Error::MissingCredentials`] without touching the network when either
	/// value is absent.
	pub async fn resolve(
		org_key: Option<OrgKey>,
		access_token: Option<AccessToken>,
		settings: &Settings,
	) -> Result<Self> {
		let org_key = match org_key {
			Some(value) => Some(value),
			None => settings.org_key().await?,
		};
		let access_token = match access_token {
			Some(value) => Some(value),
			None => settings.access_token().await?,
		};

		match (org_key, access_token) {
			(Some(org_key), Some(access_token)) => Ok(Self { org_key, access_token }),
			_ => Err(Error::MissingCredentials),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::{MemorySettings, SettingsStore};

	fn settings() -> (Settings, Arc<MemorySettings>) {
		let backend = Arc::new(MemorySettings::default());

		(Settings::new(backend.clone() as Arc<dyn SettingsStore>), backend)
	}

	#[tokio::test]
	async fn overrides_win_over_settings() {
		let (settings, _) = settings();
		let org = OrgKey::new("override-org").expect("Org key fixture should be valid.");
		let token = AccessToken::new("override-token").expect("Token fixture should be valid.");
		let resolved = Credentials::resolve(Some(org.clone()), Some(token.clone()), &settings)
			.await
			.expect("Overrides alone should satisfy resolution.");

		assert_eq!(resolved.org_key, org);
		assert_eq!(resolved.access_token, token);
	}

	#[tokio::test]
	async fn missing_either_side_is_a_distinct_failure() {
		let (settings, backend) = settings();
		let err = Credentials::resolve(None, None, &settings)
			.await
			.expect_err("Empty settings should fail resolution.");

		assert!(matches!(err, Error::MissingCredentials));

		backend
			.set(crate::settings::SettingKey::OrgKey.as_str(), "org-1")
			.await
			.expect("Seeding the org key should succeed.");

		let err = Credentials::resolve(None, None, &settings)
			.await
			.expect_err("A lone org key should still fail resolution.");

		assert!(matches!(err, Error::MissingCredentials));
	}
}
