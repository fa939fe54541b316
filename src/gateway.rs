//! Authenticated, cached access to the remote marketplace API.
//!
//! [`Gateway::fetch`] is the single entry point for outbound calls: it resolves
//! credentials, consults the response cache, performs at most one HTTP request,
//! unwraps the marketplace's response envelope, and surfaces every failure as the
//! unified authorization signal (see [`Error::is_unauthorized`]).

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Credentials, OrgKey},
	http::{ApiHttpClient, ApiRequest, Verb},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	settings::Settings,
	store::{CacheKey, ResponseCache},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Fixed lifetime of cached response payloads.
pub const DEFAULT_CACHE_TTL: Duration = Duration::seconds(600);

/// Per-call options for [`Gateway::fetch`].
#[derive(Clone, Debug, Default)]
pub struct FetchOptions {
	/// Overrides the stored organization key for this call.
	pub org_key: Option<OrgKey>,
	/// Overrides the stored access token for this call.
	pub access_token: Option<AccessToken>,
	/// Invalidates the matching cache entry before the lookup, forcing a live fetch.
	pub clear_cache: bool,
	/// Request body attached to POST calls; POST without a body is rejected.
	pub body: Option<JsonValue>,
}
impl FetchOptions {
	/// Creates empty options: stored credentials, warm cache, no body.
	pub fn new() -> Self {
		Self::default()
	}

	/// Overrides the organization key.
	pub fn with_org_key(mut self, org_key: OrgKey) -> Self {
		self.org_key = Some(org_key);

		self
	}

	/// Overrides the access token.
	pub fn with_access_token(mut self, access_token: AccessToken) -> Self {
		self.access_token = Some(access_token);

		self
	}

	/// Forces cache invalidation before the lookup.
	pub fn clear_cache(mut self) -> Self {
		self.clear_cache = true;

		self
	}

	/// Attaches a POST body.
	pub fn with_body(mut self, body: JsonValue) -> Self {
		self.body = Some(body);

		self
	}
}

/// Authenticated marketplace API client with response caching.
///
/// Dependencies are explicit: the settings facade, the response cache, and the HTTP
/// transport are all injected, so hosts can substitute their own backends and tests
/// can run against in-memory doubles.
#[derive(Clone)]
pub struct Gateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// HTTP client wrapper used for every outbound marketplace request.
	pub http_client: Arc<C>,
	settings: Settings,
	cache: Arc<dyn ResponseCache>,
	base_api_url: Url,
}
impl<C> Gateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a gateway around the caller-provided transport and store backends.
	pub fn new(
		base_api_url: Url,
		settings: Settings,
		cache: Arc<dyn ResponseCache>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self { http_client: http_client.into(), settings, cache, base_api_url }
	}

	/// Settings facade shared with the flows built on top of this gateway.
	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	/// Response cache backend, exposed so hosts can flush it wholesale.
	pub fn cache(&self) -> &Arc<dyn ResponseCache> {
		&self.cache
	}

	/// Performs a single authenticated, optionally cached call and returns the unwrapped
	/// payload.
	///
	/// `path` is API-relative with no leading slash and may carry a query string. The
	/// call resolves credentials first and fails with [`Error::MissingCredentials`]
	/// before any network I/O when either is absent. A cache hit returns the stored
	/// payload verbatim; a miss performs exactly one HTTP request. Non-2xx statuses and
	/// transport failures are never cached. An empty or non-envelope body yields
	/// `Ok(None)` and nothing is cached.
	pub async fn fetch(
		&self,
		path: &str,
		verb: Verb,
		options: FetchOptions,
	) -> Result<Option<JsonValue>> {
		let credentials =
			Credentials::resolve(options.org_key, options.access_token, &self.settings).await?;
		let url = self.endpoint_url(&credentials.org_key, path)?;
		let key = CacheKey::new(&credentials.org_key, &credentials.access_token, &url);

		if options.clear_cache {
			self.cache.remove(&key).await?;
		}
		if let Some(hit) = self.cache.get(&key).await? {
			return Ok(Some(hit));
		}

		let body = match verb {
			Verb::Get => None,
			Verb::Post => {
				let body = options.body.ok_or_else(|| Error::InvalidRequest {
					reason: "POST requires an explicit request body".into(),
				})?;

				Some(body.to_string())
			},
		};
		let request = ApiRequest {
			verb,
			url,
			bearer_token: credentials.access_token.as_ref().to_owned(),
			body,
		};
		let response = self
			.http_client
			.execute(request)
			.await
			.map_err(|source| Error::Transport { source })?;

		if response.is_error() {
			return Err(Error::RemoteRejected { status: response.status, reason: response.reason });
		}

		let Some(payload) = unwrap_envelope(&response.body) else {
			return Ok(None);
		};

		self.cache.set(&key, &payload, DEFAULT_CACHE_TTL).await?;

		Ok(Some(payload))
	}

	/// Validates the configured (or overridden) credential pair against the
	/// `business_user` endpoint, bypassing the cache so stale entries cannot mask a
	/// revoked token.
	pub async fn verify_credentials(&self, options: FetchOptions) -> Result<Option<JsonValue>> {
		const KIND: FlowKind = FlowKind::VerifyCredentials;

		let span = FlowSpan::new(KIND, "verify_credentials");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut options = options;

				options.clear_cache = true;

				self.fetch("business_user", Verb::Get, options).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	fn endpoint_url(&self, org_key: &OrgKey, path: &str) -> Result<Url> {
		let base = self.base_api_url.as_str().trim_end_matches('/');
		let full = format!("{base}/{org_key}/v1/{path}");

		Url::parse(&full).map_err(|e| Error::InvalidRequest {
			reason: format!("endpoint path `{path}` produced an invalid URL: {e}"),
		})
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestHttpClient> {
	/// Creates a gateway that provisions its own reqwest-backed transport.
	pub fn with_defaults(
		base_api_url: Url,
		settings: Settings,
		cache: Arc<dyn ResponseCache>,
	) -> Self {
		Self::new(base_api_url, settings, cache, ReqwestHttpClient::default())
	}
}
impl<C> Debug for Gateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway").field("base_api_url", &self.base_api_url.as_str()).finish()
	}
}

/// Unwraps the marketplace's response envelope.
///
/// `{data, total_count}` is returned whole so pagination metadata survives; `{data}`
/// collapses to the inner value; anything else (empty body, non-JSON, missing or null
/// `data` field) is `None`.
pub(crate) fn unwrap_envelope(body: &[u8]) -> Option<JsonValue> {
	if body.is_empty() {
		return None;
	}

	let value: JsonValue = serde_json::from_slice(body).ok()?;
	let object = value.as_object()?;

	// A JSON-null `data` counts as absent, same as no field at all.
	if object.get("data").is_none_or(JsonValue::is_null) {
		return None;
	}
	if object.contains_key("total_count") {
		return Some(value);
	}

	object.get("data").cloned()
}
