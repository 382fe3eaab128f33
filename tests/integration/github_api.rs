//! GitHub API client behavior against a mock server.

use crate::common::release_json;
use ghrab::core::GhrabError;
use ghrab::github::GithubClient;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, token: Option<&str>) -> GithubClient {
    GithubClient::new(token.map(String::from))
        .unwrap()
        .with_api_base(server.uri())
}

#[tokio::test]
async fn latest_tag_uses_the_latest_release_route() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases/latest"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(release_json(&server.uri(), "v2.0.0", &[(1, "widget.zip")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let release = client(&server, None).resolve_release("acme/widget", "latest").await.unwrap();
    assert_eq!(release.tag_name, "v2.0.0");
    assert_eq!(release.assets.len(), 1);
}

#[tokio::test]
async fn explicit_tag_uses_the_tag_route() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases/tags/v1.1.0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(release_json(&server.uri(), "v1.1.0", &[(1, "widget.zip")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let release = client(&server, None).resolve_release("acme/widget", "v1.1.0").await.unwrap();
    assert_eq!(release.tag_name, "v1.1.0");
}

#[tokio::test]
async fn wildcard_tag_searches_the_release_list() {
    let server = MockServer::start().await;
    let releases = serde_json::json!([
        release_json(&server.uri(), "nightly-2024", &[(1, "n.zip")]),
        release_json(&server.uri(), "v1.9.0", &[(2, "w.zip")]),
        release_json(&server.uri(), "v1.8.0", &[(3, "w.zip")]),
    ]);
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(releases))
        .expect(1)
        .mount(&server)
        .await;

    let release = client(&server, None).resolve_release("acme/widget", "v1.*").await.unwrap();
    assert_eq!(release.tag_name, "v1.9.0", "first matching release in listing order wins");
}

#[tokio::test]
async fn wildcard_tag_without_match_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let err =
        client(&server, None).resolve_release("acme/widget", "v9.*").await.unwrap_err();
    assert_eq!(err.downcast::<GhrabError>().unwrap().kind(), "not-found");
}

#[tokio::test]
async fn bearer_token_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/private/releases/latest"))
        .and(header("authorization", "Bearer t0k3n"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(release_json(&server.uri(), "v1.0.0", &[(1, "p.zip")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    client(&server, Some("t0k3n")).resolve_release("acme/private", "latest").await.unwrap();
}

#[tokio::test]
async fn missing_release_maps_to_not_found() {
    let server = MockServer::start().await;
    // Unmatched requests get wiremock's default 404, the same status GitHub
    // sends for missing and for inaccessible repositories.
    let err = client(&server, None).resolve_release("acme/ghost", "latest").await.unwrap_err();
    assert_eq!(err.downcast::<GhrabError>().unwrap().kind(), "not-found");
}

#[tokio::test]
async fn rejected_credential_maps_to_auth() {
    let server = MockServer::start().await;
    for status in [401u16, 403] {
        Mock::given(method("GET"))
            .and(path(format!("/repos/acme/locked{status}/releases/latest")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let err = client(&server, Some("expired"))
            .resolve_release(&format!("acme/locked{status}"), "latest")
            .await
            .unwrap_err();
        assert_eq!(err.downcast::<GhrabError>().unwrap().kind(), "auth", "status {status}");
    }
}

#[tokio::test]
async fn server_error_maps_to_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases/latest"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client(&server, None).resolve_release("acme/widget", "latest").await.unwrap_err();
    assert_eq!(err.downcast::<GhrabError>().unwrap().kind(), "transport");
}

#[tokio::test]
async fn authenticated_download_uses_the_asset_api() {
    let server = MockServer::start().await;
    let release = release_json(&server.uri(), "v1.0.0", &[(7, "widget.bin")]);

    Mock::given(method("GET"))
        .and(path("/repos/acme/private/releases/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(release))
        .mount(&server)
        .await;
    // The asset API endpoint (not the browser URL) with octet-stream accept.
    Mock::given(method("GET"))
        .and(path("/api-download/7"))
        .and(header("authorization", "Bearer t0k3n"))
        .and(header("accept", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"BINARY".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, Some("t0k3n"));
    let release = client.resolve_release("acme/private", "latest").await.unwrap();
    let selection = ghrab::github::select_asset(
        &release,
        "acme/private",
        &ghrab::pattern::AssetPattern::new("widget.bin"),
        ghrab::github::MatchPolicy::FirstMatch,
    )
    .unwrap();

    let fetched = client.download_asset("acme/private", &selection).await.unwrap();
    assert_eq!(fetched.name, "widget.bin");
    assert_eq!(fetched.bytes, b"BINARY");
}

#[tokio::test]
async fn unauthenticated_download_uses_the_browser_url() {
    let server = MockServer::start().await;
    let release = release_json(&server.uri(), "v1.0.0", &[(7, "widget.bin")]);

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(release))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dl/widget.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PUBLIC".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, None);
    let release = client.resolve_release("acme/widget", "latest").await.unwrap();
    let selection = ghrab::github::select_asset(
        &release,
        "acme/widget",
        &ghrab::pattern::AssetPattern::new("*.bin"),
        ghrab::github::MatchPolicy::FirstMatch,
    )
    .unwrap();

    let fetched = client.download_asset("acme/widget", &selection).await.unwrap();
    assert_eq!(fetched.bytes, b"PUBLIC");
}

#[tokio::test]
async fn credential_rejection_during_download_maps_to_auth() {
    let server = MockServer::start().await;
    let release = release_json(&server.uri(), "v1.0.0", &[(7, "widget.bin")]);

    Mock::given(method("GET"))
        .and(path("/repos/acme/private/releases/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(release))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api-download/7"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = client(&server, Some("expiring"));
    let release = client.resolve_release("acme/private", "latest").await.unwrap();
    let selection = ghrab::github::select_asset(
        &release,
        "acme/private",
        &ghrab::pattern::AssetPattern::new("*"),
        ghrab::github::MatchPolicy::FirstMatch,
    )
    .unwrap();

    let err = client.download_asset("acme/private", &selection).await.unwrap_err();
    assert_eq!(err.downcast::<GhrabError>().unwrap().kind(), "auth");
}
