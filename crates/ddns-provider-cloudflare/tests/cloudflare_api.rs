//! Integration Test: Cloudflare provider over a real HTTP transport
//!
//! Runs the provider and the engine against a wiremock server standing in
//! for both the Cloudflare API and the "what is my IP" endpoint.

use ddns_core::config::{DomainTarget, EngineConfig, RecordTarget};
use ddns_core::engine::ReconciliationOutcome;
use ddns_core::traits::{DnsProvider, RecordRequest, SearchOutcome, Transport};
use ddns_core::{DdnsEngine, Error};
use ddns_http::{HttpIpSource, ReqwestTransport};
use ddns_provider_cloudflare::CloudflareProvider;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "cf-test-token";

fn transport() -> Arc<dyn Transport> {
    Arc::new(ReqwestTransport::new(Duration::from_secs(5)).unwrap())
}

fn provider(server: &MockServer, transport: Arc<dyn Transport>) -> CloudflareProvider {
    CloudflareProvider::new_live(TOKEN, transport)
        .unwrap()
        .with_base_url(format!("{}/client/v4", server.uri()))
}

fn envelope(result: serde_json::Value) -> serde_json::Value {
    json!({"success": true, "errors": [], "messages": [], "result": result})
}

#[tokio::test]
async fn error_status_with_envelope_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/client/v4/zones/bad/dns_records"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "errors": [{"code": 7003, "message": "Could not route to /zones/bad/dns_records, perhaps your object identifier is invalid?"}],
            "messages": [],
            "result": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider(&server, transport())
        .search_record("bad", "home.example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoRouteMatches { code: 7003, .. }), "got {:?}", err);
}

#[tokio::test]
async fn search_sends_bearer_token_and_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/client/v4/zones/Z1/dns_records"))
        .and(query_param("type", "A"))
        .and(query_param("name", "home.example.com"))
        .and(header("Authorization", "Bearer cf-test-token"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{
            "id": "rec-1",
            "zone_id": "Z1",
            "name": "home.example.com",
            "type": "A",
            "content": "198.51.100.4",
            "proxied": false,
            "ttl": 120
        }]))))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = provider(&server, transport())
        .search_record("Z1", "home.example.com")
        .await
        .unwrap();

    assert!(matches!(outcome, SearchOutcome::Found(ref r) if r.id == "rec-1"));
}

#[tokio::test]
async fn patch_reaches_record_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/client/v4/zones/Z1/dns_records/rec-1"))
        .and(body_json(json!({
            "content": "203.0.113.7",
            "name": "home.example.com",
            "proxied": true,
            "type": "A",
            "comment": "",
            "tags": null,
            "ttl": 300
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": "rec-1",
            "zone_id": "Z1",
            "name": "home.example.com",
            "type": "A",
            "content": "203.0.113.7",
            "proxied": true,
            "ttl": 300
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let body = RecordRequest::address("home.example.com", "203.0.113.7", 300, true);
    let result = provider(&server, transport())
        .update_record("Z1", "rec-1", &body)
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.record.unwrap().content, "203.0.113.7");
}

#[tokio::test]
async fn full_run_creates_missing_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.7\n"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/client/v4/zones/Z1/dns_records"))
        .and(query_param("type", "A"))
        .and(query_param("name", "home.example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/client/v4/zones/Z1/dns_records"))
        .and(body_json(json!({
            "content": "203.0.113.7",
            "name": "home.example.com",
            "proxied": false,
            "type": "A",
            "comment": "",
            "tags": null,
            "ttl": 120
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": "created-1",
            "zone_id": "Z1",
            "name": "home.example.com",
            "type": "A",
            "content": "203.0.113.7",
            "proxied": false,
            "ttl": 120
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport();
    let ip_source = HttpIpSource::new(transport.clone(), Some(format!("{}/ip", server.uri())));
    let engine = DdnsEngine::new(
        Box::new(ip_source),
        Arc::new(provider(&server, transport)),
        vec![
            DomainTarget::new("example.com", "Z1")
                .with_record(RecordTarget::new("home.example.com").with_ttl(0)),
        ],
        &EngineConfig::default(),
    );

    let report = engine.run().await.unwrap();

    assert_eq!(
        report.outcome_for("home.example.com"),
        Some(&ReconciliationOutcome::Created {
            record_id: Some("created-1".to_string())
        })
    );
}

#[tokio::test]
async fn dry_run_sends_no_writes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/client/v4/zones/Z1/dns_records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = CloudflareProvider::new_dry_run(TOKEN, transport())
        .unwrap()
        .with_base_url(format!("{}/client/v4", server.uri()));

    assert_eq!(
        provider.search_record("Z1", "home.example.com").await.unwrap(),
        SearchOutcome::NotFound
    );
    let body = RecordRequest::address("home.example.com", "203.0.113.7", 120, false);
    assert!(provider.create_record("Z1", &body).await.unwrap().success);
}

#[tokio::test]
async fn hostname_is_percent_encoded_in_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/client/v4/zones/Z1/dns_records"))
        .and(query_param("type", "A"))
        .and(query_param("name", "odd name&type=AAAA.example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = provider(&server, transport())
        .search_record("Z1", "odd name&type=AAAA.example.com")
        .await
        .unwrap();

    assert_eq!(outcome, SearchOutcome::NotFound);
}
