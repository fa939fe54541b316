// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use draftbridge::{
	_preludet::*,
	auth::{AccessToken, OrgKey},
	gateway::FetchOptions,
	http::Verb,
	store::{CacheKey, ResponseCache},
};

const ORG_KEY: &str = "org-gateway";
const ACCESS_TOKEN: &str = "token-gateway";

async fn seeded_gateway(server: &MockServer) -> (ReqwestTestGateway, TestBackends) {
	let (gateway, backends) = build_reqwest_test_gateway(&server.base_url());

	seed_credentials(&backends.settings, ORG_KEY, ACCESS_TOKEN).await;

	(gateway, backends)
}

#[tokio::test]
async fn fetch_serves_repeat_calls_from_cache() {
	let server = MockServer::start_async().await;
	let (gateway, _backends) = seeded_gateway(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(format!("/{ORG_KEY}/v1/business_user"))
				.header("authorization", format!("Bearer {ACCESS_TOKEN}"));
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"data":{"name":"Acme"}}"#);
		})
		.await;
	let first = gateway
		.fetch("business_user", Verb::Get, FetchOptions::new())
		.await
		.expect("First fetch should succeed.");
	let second = gateway
		.fetch("business_user", Verb::Get, FetchOptions::new())
		.await
		.expect("Second fetch should succeed.");

	assert_eq!(first, Some(json!({ "name": "Acme" })));
	assert_eq!(second, first, "A cache hit should return the stored payload verbatim.");
	assert_eq!(mock.hits_async().await, 1, "The second call should never reach the network.");
}

#[tokio::test]
async fn clear_cache_forces_a_live_fetch() {
	let server = MockServer::start_async().await;
	let (gateway, _backends) = seeded_gateway(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("/{ORG_KEY}/v1/business_user"));
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"data":{"name":"Acme"}}"#);
		})
		.await;

	gateway
		.fetch("business_user", Verb::Get, FetchOptions::new())
		.await
		.expect("Warm-up fetch should succeed.");
	gateway
		.fetch("business_user", Verb::Get, FetchOptions::new().clear_cache())
		.await
		.expect("Cache-clearing fetch should succeed.");

	assert_eq!(mock.hits_async().await, 2);
}

#[tokio::test]
async fn missing_credentials_fail_before_any_network_io() {
	let server = MockServer::start_async().await;
	let (gateway, _backends) = build_reqwest_test_gateway(&server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(GET);
			then.status(200).body(r#"{"data":{}}"#);
		})
		.await;
	let e = gateway
		.fetch("business_user", Verb::Get, FetchOptions::new())
		.await
		.expect_err("Fetch without stored credentials should fail.");

	assert!(matches!(e, Error::MissingCredentials));
	assert!(e.is_unauthorized());
	assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn remote_rejection_is_unauthorized_and_never_cached() {
	let server = MockServer::start_async().await;
	let (gateway, backends) = seeded_gateway(&server).await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("/{ORG_KEY}/v1/business_user"));
			then.status(403).body(r#"{"error":"forbidden"}"#);
		})
		.await;
	let e = gateway
		.fetch("business_user", Verb::Get, FetchOptions::new())
		.await
		.expect_err("A 403 response should surface as an error.");

	assert!(matches!(e, Error::RemoteRejected { status: 403, .. }));
	assert!(e.is_unauthorized());

	let org = OrgKey::new(ORG_KEY).expect("Org key fixture should be valid.");
	let token = AccessToken::new(ACCESS_TOKEN).expect("Token fixture should be valid.");
	let url = Url::parse(&server.url(format!("/{ORG_KEY}/v1/business_user")))
		.expect("Endpoint URL fixture should parse.");
	let cached = backends
		.cache
		.get(&CacheKey::new(&org, &token, &url))
		.await
		.expect("Cache lookup should succeed.");

	assert_eq!(cached, None, "Failed responses should never be cached.");
}

#[tokio::test]
async fn bodies_without_a_data_field_yield_none_and_skip_the_cache() {
	let server = MockServer::start_async().await;
	let (gateway, _backends) = seeded_gateway(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("/{ORG_KEY}/v1/business_user"));
			then.status(200).header("content-type", "application/json").body(r#"{"ok":true}"#);
		})
		.await;
	let first = gateway
		.fetch("business_user", Verb::Get, FetchOptions::new())
		.await
		.expect("Fetch of a shapeless body should not error.");
	let second = gateway
		.fetch("business_user", Verb::Get, FetchOptions::new())
		.await
		.expect("Repeat fetch of a shapeless body should not error.");

	assert_eq!(first, None);
	assert_eq!(second, None);
	assert_eq!(mock.hits_async().await, 2, "A `None` payload leaves nothing in the cache.");
}

#[tokio::test]
async fn envelope_with_total_count_survives_whole() {
	let server = MockServer::start_async().await;
	let (gateway, _backends) = seeded_gateway(&server).await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("/{ORG_KEY}/v1/jobs"));
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"data":[{"id":"job-1"}],"total_count":41}"#);
		})
		.await;
	let payload = gateway
		.fetch("jobs", Verb::Get, FetchOptions::new())
		.await
		.expect("Fetch should succeed.")
		.expect("A paginated envelope should produce a payload.");

	assert_eq!(payload, json!({ "data": [{ "id": "job-1" }], "total_count": 41 }));
}

#[tokio::test]
async fn post_forwards_the_json_body() {
	let server = MockServer::start_async().await;
	let (gateway, _backends) = seeded_gateway(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(format!("/{ORG_KEY}/v1/jobs"))
				.header("authorization", format!("Bearer {ACCESS_TOKEN}"))
				.header("content-type", "application/json")
				.json_body(json!({ "topic": "New article" }));
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"data":{"id":"job-9"}}"#);
		})
		.await;
	let payload = gateway
		.fetch("jobs", Verb::Post, FetchOptions::new().with_body(json!({ "topic": "New article" })))
		.await
		.expect("POST should succeed.");

	assert_eq!(payload, Some(json!({ "id": "job-9" })));
	assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn post_without_a_body_is_rejected_locally() {
	let server = MockServer::start_async().await;
	let (gateway, _backends) = seeded_gateway(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST);
			then.status(200).body(r#"{"data":{}}"#);
		})
		.await;
	let e = gateway
		.fetch("jobs", Verb::Post, FetchOptions::new())
		.await
		.expect_err("POST without a body should be rejected.");

	assert!(matches!(e, Error::InvalidRequest { .. }));
	assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn credential_verification_bypasses_the_cache() {
	let server = MockServer::start_async().await;
	let (gateway, _backends) = seeded_gateway(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("/{ORG_KEY}/v1/business_user"));
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"data":{"name":"Acme"}}"#);
		})
		.await;

	gateway
		.fetch("business_user", Verb::Get, FetchOptions::new())
		.await
		.expect("Warm-up fetch should succeed.");

	let payload = gateway
		.verify_credentials(FetchOptions::new())
		.await
		.expect("Verification against valid credentials should succeed.");

	assert_eq!(payload, Some(json!({ "name": "Acme" })));
	assert_eq!(mock.hits_async().await, 2, "Verification must not trust a warm cache entry.");
}

#[tokio::test]
async fn credential_overrides_take_precedence_over_stored_values() {
	let server = MockServer::start_async().await;
	let (gateway, _backends) = seeded_gateway(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/org-override/v1/business_user")
				.header("authorization", "Bearer token-override");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"data":{"name":"Override"}}"#);
		})
		.await;
	let options = FetchOptions::new()
		.with_org_key(OrgKey::new("org-override").expect("Override org key should be valid."))
		.with_access_token(
			AccessToken::new("token-override").expect("Override token should be valid."),
		);
	let payload = gateway
		.verify_credentials(options)
		.await
		.expect("Verification with overrides should succeed.");

	assert_eq!(payload, Some(json!({ "name": "Override" })));
	assert_eq!(mock.hits_async().await, 1);
}
