//! HTTP vendor-discovery client against a mocked endpoint.

use assert_matches::assert_matches;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use procure_api::config::VendorSearchConfig;
use procure_api::errors::ServiceError;
use procure_api::services::vendor_search::{HttpVendorDirectory, VendorDirectory};

fn config(server: &MockServer) -> VendorSearchConfig {
    VendorSearchConfig {
        endpoint: format!("{}/search", server.uri()),
        api_key: None,
        timeout_secs: 5,
    }
}

#[tokio::test]
async fn parses_candidates_from_prose_wrapped_response() {
    let server = MockServer::start().await;
    let body = concat!(
        "Here are the top matches for your query:\n",
        "```json\n",
        r#"[{"name": "Industrial Motors Pro", "link": "www.industrialmotorspro.com", "phone": "(215) 555-0123"},"#,
        r#" {"name": "CNC Solutions Inc", "email": "info@cncsolutions.com"}]"#,
        "\n```\nLet me know if you need anything else."
    );
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let directory = HttpVendorDirectory::new(&config(&server)).unwrap();
    let candidates = directory.search("spindle motors").await.unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].name, "Industrial Motors Pro");
    assert_eq!(
        candidates[0].website.as_deref(),
        Some("www.industrialmotorspro.com")
    );
    assert_eq!(candidates[1].email.as_deref(), Some("info@cncsolutions.com"));
}

#[tokio::test]
async fn upstream_error_is_a_search_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let directory = HttpVendorDirectory::new(&config(&server)).unwrap();
    assert_matches!(
        directory.search("ball bearings").await,
        Err(ServiceError::VendorSearchFailed(_))
    );
}

#[tokio::test]
async fn unparseable_body_is_a_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("Sorry, I couldn't find any vendors for that."),
        )
        .mount(&server)
        .await;

    let directory = HttpVendorDirectory::new(&config(&server)).unwrap();
    assert_matches!(
        directory.search("unobtainium").await,
        Err(ServiceError::ParseFailure(_))
    );
}
