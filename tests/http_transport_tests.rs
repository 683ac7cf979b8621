//! End-to-end tests for the reqwest transport against a mock server.

use serde_json::json;
use sparkpost_client::{
    ListTransmissionsParams, SendOptions, SparkPostClient, SparkPostError, Transmission,
};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client(server: &MockServer) -> SparkPostClient {
    SparkPostClient::builder()
        .api_key("test-api-key")
        .origin(server.uri())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_send_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/transmissions"))
        .and(header("Authorization", "test-api-key"))
        .and(header("Content-Type", "application/json"))
        .and(query_param("num_rcpt_errors", "2"))
        .and(body_json(json!({
            "recipients": [
                { "address": { "email": "bob@example.com", "name": "Bob" } },
                { "address": { "email": "carol@example.com", "header_to": "\"Bob\" <bob@example.com>" } }
            ],
            "content": { "headers": { "CC": "carol@example.com" }, "subject": "Hi" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": {
                "id": "84383392948324",
                "total_accepted_recipients": 2,
                "total_rejected_recipients": 0
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transmission = Transmission::builder()
        .recipient("\"Bob\" <bob@example.com>")
        .cc("carol@example.com")
        .content(sparkpost_client::Content::new().with_subject("Hi"))
        .build();

    let response = client(&server)
        .await
        .transmissions()
        .send(&transmission, &SendOptions::new().num_rcpt_errors(2))
        .await
        .unwrap();

    assert_eq!(response.results.id, "84383392948324");
    assert_eq!(response.results.total_accepted_recipients, 2);
}

#[tokio::test]
async fn test_list_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/transmissions"))
        .and(query_param("campaign_id", "spring sale"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": "1", "campaign_id": "spring sale", "state": "submitted" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .await
        .transmissions()
        .list(&ListTransmissionsParams::new().campaign_id("spring sale"))
        .await
        .unwrap();

    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].state.as_deref(), Some("submitted"));
}

#[tokio::test]
async fn test_get_with_custom_api_version() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/transmissions/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": { "transmission": { "id": "42" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SparkPostClient::builder()
        .api_key("test-api-key")
        .origin(format!("{}/", server.uri()))
        .api_version("v2")
        .build()
        .unwrap();

    let response = client.transmissions().get("42").await.unwrap();
    assert_eq!(response.results.transmission.id, "42");
}

#[tokio::test]
async fn test_get_id_stays_under_transmissions() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/transmissions/..%2Ftemplates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": { "transmission": { "id": "../templates" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .await
        .transmissions()
        .get("../templates")
        .await
        .unwrap();
    assert_eq!(response.results.transmission.id, "../templates");
}

#[tokio::test]
async fn test_error_body_mapped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/transmissions"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": [{
                "message": "Invalid header",
                "description": "Header CC is invalid",
                "code": "7001"
            }]
        })))
        .mount(&server)
        .await;

    let result = client(&server)
        .await
        .transmissions()
        .send(
            &Transmission::builder().recipient("bob@example.com").build(),
            &SendOptions::default(),
        )
        .await;

    match result {
        Err(SparkPostError::Api {
            status,
            message,
            errors,
        }) => {
            assert_eq!(status, 422);
            assert_eq!(message, "Invalid header: Header CC is invalid");
            assert_eq!(errors[0].code.as_deref(), Some("7001"));
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/transmissions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errors": [{ "message": "Unauthorized." }]
        })))
        .mount(&server)
        .await;

    let result = client(&server)
        .await
        .transmissions()
        .list(&ListTransmissionsParams::default())
        .await;

    assert!(matches!(result, Err(SparkPostError::Authentication { .. })));
}

#[tokio::test]
async fn test_request_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/transmissions/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = SparkPostClient::builder()
        .api_key("test-api-key")
        .origin(server.uri())
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let result = client.transmissions().get("slow").await;
    assert!(matches!(result, Err(SparkPostError::Timeout { .. })));
}
