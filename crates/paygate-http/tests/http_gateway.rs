// crates/paygate-http/tests/http_gateway.rs
// ============================================================================
// Module: HTTP Gateway Tests
// Description: Wire-level tests against a local tiny_http gateway.
// Purpose: Validate routes, headers, status mapping, and body limits.
// ============================================================================

//! ## Overview
//! Each test starts a local server that answers a scripted sequence of
//! responses and records what the client sent.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::net::TcpListener;
use std::thread;

use paygate_core::CancelRequest;
use paygate_core::EngineConfig;
use paygate_core::GatewayError;
use paygate_core::GatewayProbe;
use paygate_core::IdempotencyKey;
use paygate_core::InMemoryMappingStore;
use paygate_core::OrderReference;
use paygate_core::PaymentGateway;
use paygate_core::PaymentId;
use paygate_core::PaymentStatus;
use paygate_core::ProbeResult;
use paygate_core::ReconciliationEngine;
use paygate_core::ResolutionSource;
use paygate_core::ResolveRequest;
use paygate_core::RetryPolicy;
use paygate_http::HttpGateway;
use paygate_http::HttpGatewayConfig;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Request observed by the local server.
#[derive(Debug)]
struct Captured {
    method: String,
    url: String,
    authorization: Option<String>,
    idempotency_key: Option<String>,
    body: String,
}

/// Serves the scripted responses in order and returns what was received.
fn serve(responses: Vec<(u16, String)>) -> (String, thread::JoinHandle<Vec<Captured>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let handle = thread::spawn(move || {
        let mut captured = Vec::new();
        for (status, body) in responses {
            let Ok(mut request) = server.recv() else {
                break;
            };
            let header = |name: &str| {
                request
                    .headers()
                    .iter()
                    .find(|header| header.field.as_str().as_str().eq_ignore_ascii_case(name))
                    .map(|header| header.value.as_str().to_string())
            };
            let authorization = header("Authorization");
            let idempotency_key = header("Idempotency-Key");
            let method = request.method().to_string();
            let url = request.url().to_string();
            let mut payload = String::new();
            request.as_reader().read_to_string(&mut payload).unwrap();
            captured.push(Captured {
                method,
                url,
                authorization,
                idempotency_key,
                body: payload,
            });
            let _ = request.respond(Response::from_string(body).with_status_code(status));
        }
        captured
    });
    (format!("http://{addr}"), handle)
}

fn gateway(base_url: &str) -> HttpGateway {
    let config = HttpGatewayConfig {
        allow_http: true,
        timeout_ms: 5_000,
        ..HttpGatewayConfig::new(base_url, "test_secret")
    };
    HttpGateway::new(config).unwrap()
}

fn record_json(id: &str, status: &str, amount: u64) -> String {
    format!(r#"{{"id":"{id}","status":"{status}","amount":{amount},"currency":"KRW"}}"#)
}

// ============================================================================
// SECTION: Reads
// ============================================================================

#[test]
fn probe_sends_credentials_and_parses_record() {
    let (base, handle) = serve(vec![(200, record_json("pay_abc", "PAID", 1_000))]);
    let result = gateway(&base).probe("pay_abc").unwrap();
    let captured = handle.join().unwrap();

    assert!(result.valid);
    let record = result.record.unwrap();
    assert_eq!(record.status, PaymentStatus::Paid);
    assert_eq!(record.amount, 1_000);
    assert_eq!(captured[0].method, "GET");
    assert_eq!(captured[0].url, "/payments/pay_abc");
    assert_eq!(captured[0].authorization.as_deref(), Some("PortOne test_secret"));
}

#[test]
fn probe_not_found_is_negative_result() {
    let (base, handle) = serve(vec![(404, r#"{"type":"PAYMENT_NOT_FOUND"}"#.to_string())]);
    let result = gateway(&base).probe("pay_missing").unwrap();
    handle.join().unwrap();

    assert!(!result.valid);
    assert!(result.record.is_none());
}

#[test]
fn path_segments_are_percent_encoded() {
    let (base, handle) = serve(vec![(404, String::new())]);
    gateway(&base).probe("a b/c?d").unwrap();
    let captured = handle.join().unwrap();

    assert_eq!(captured[0].url, "/payments/a%20b%2Fc%3Fd");
}

#[test]
fn dot_segments_are_never_sent() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let gateway = gateway(&format!("http://{addr}"));

    for id in ["", ".", ".."] {
        assert_eq!(gateway.probe(id).unwrap(), ProbeResult::not_found());
    }
    let request = CancelRequest {
        reason: "duplicate".to_string(),
        amount: None,
    };
    let err = gateway
        .cancel(&PaymentId::new(".."), &request, &IdempotencyKey::generate())
        .unwrap_err();

    assert!(matches!(err, GatewayError::InvalidRequest(_)));
}

#[test]
fn dotted_identifier_keeps_its_own_segment() {
    let (base, handle) = serve(vec![(404, String::new())]);
    gateway(&base).probe("..pay").unwrap();
    let captured = handle.join().unwrap();

    assert_eq!(captured[0].url, "/payments/..pay");
}

#[test]
fn base_path_prefix_is_preserved() {
    let (base, handle) = serve(vec![(404, String::new())]);
    gateway(&format!("{base}/v2")).probe("pay_x").unwrap();
    let captured = handle.join().unwrap();

    assert_eq!(captured[0].url, "/v2/payments/pay_x");
}

#[test]
fn server_error_is_transient_with_body() {
    let (base, handle) = serve(vec![(503, "maintenance".to_string())]);
    let err = gateway(&base).probe("pay_abc").unwrap_err();
    handle.join().unwrap();

    assert!(err.is_transient());
    assert!(matches!(
        err,
        GatewayError::Unreachable { body: Some(ref body), .. } if body == "maintenance"
    ));
}

#[test]
fn redirect_is_not_followed() {
    let (base, handle) = serve(vec![(302, String::new())]);
    let err = gateway(&base).probe("pay_abc").unwrap_err();
    let captured = handle.join().unwrap();

    assert_eq!(captured.len(), 1);
    assert!(matches!(err, GatewayError::InvalidResponse { .. }));
}

#[test]
fn oversized_body_is_rejected() {
    let (base, handle) = serve(vec![(200, "x".repeat(4_096))]);
    let config = HttpGatewayConfig {
        allow_http: true,
        max_response_bytes: 1_024,
        ..HttpGatewayConfig::new(&base, "test_secret")
    };
    let err = HttpGateway::new(config).unwrap().probe("pay_abc").unwrap_err();
    handle.join().unwrap();

    assert!(matches!(err, GatewayError::InvalidResponse { .. }));
}

#[test]
fn closed_port_is_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = gateway(&format!("http://{addr}")).probe("pay_abc").unwrap_err();

    assert!(err.is_transient());
}

#[test]
fn order_lookup_takes_first_item() {
    let body = format!(
        r#"{{"items":[{},{}]}}"#,
        record_json("pay_first", "PAID", 10),
        record_json("pay_second", "PAID", 20)
    );
    let (base, handle) = serve(vec![(200, body), (200, r#"{"items":[]}"#.to_string())]);
    let gateway = gateway(&base);
    let order = OrderReference::new("order 42");

    let found = gateway.probe_order(&order).unwrap();
    let empty = gateway.probe_order(&order).unwrap();
    let captured = handle.join().unwrap();

    assert_eq!(found.record.unwrap().id, "pay_first");
    assert!(!empty.valid);
    assert_eq!(captured[0].url, "/payments?order_id=order+42");
}

// ============================================================================
// SECTION: Cancel
// ============================================================================

#[test]
fn cancel_sends_idempotency_key_and_body() {
    let (base, handle) = serve(vec![(200, record_json("pay_abc", "CANCELLED", 1_000))]);
    let key = IdempotencyKey::generate();
    let request = CancelRequest {
        reason: "customer request".to_string(),
        amount: Some(500),
    };

    let record = gateway(&base).cancel(&PaymentId::new("pay_abc"), &request, &key).unwrap();
    let captured = handle.join().unwrap();

    assert_eq!(record.status, PaymentStatus::Cancelled);
    assert_eq!(captured[0].method, "POST");
    assert_eq!(captured[0].url, "/payments/pay_abc/cancel");
    assert_eq!(captured[0].idempotency_key.as_deref(), Some(key.as_str()));
    let sent: CancelRequest = serde_json::from_str(&captured[0].body).unwrap();
    assert_eq!(sent, request);
}

#[test]
fn cancel_rejection_keeps_code_and_body() {
    let body = r#"{"type":"PAYMENT_ALREADY_CANCELLED","message":"already cancelled"}"#;
    let (base, handle) = serve(vec![(409, body.to_string())]);
    let request = CancelRequest {
        reason: "duplicate".to_string(),
        amount: None,
    };

    let err = gateway(&base)
        .cancel(&PaymentId::new("pay_abc"), &request, &IdempotencyKey::generate())
        .unwrap_err();
    handle.join().unwrap();

    let GatewayError::Rejected(rejection) = err else {
        panic!("expected rejection, got {err:?}");
    };
    assert_eq!(rejection.status, 409);
    assert_eq!(rejection.code.as_deref(), Some("PAYMENT_ALREADY_CANCELLED"));
    assert_eq!(rejection.body, body);
    assert!(rejection.is_already_cancelled());
}

#[test]
fn cancel_server_error_is_sent_once() {
    let (base, handle) = serve(vec![(502, "<html>bad gateway</html>".to_string())]);
    let request = CancelRequest {
        reason: "duplicate".to_string(),
        amount: None,
    };

    let err = gateway(&base)
        .cancel(&PaymentId::new("pay_abc"), &request, &IdempotencyKey::generate())
        .unwrap_err();
    let captured = handle.join().unwrap();

    assert_eq!(captured.len(), 1);
    assert!(matches!(err, GatewayError::Unreachable { body: Some(_), .. }));
}

// ============================================================================
// SECTION: Engine Over HTTP
// ============================================================================

#[test]
fn engine_resolves_conformant_id_with_one_request() {
    let id = "pay_0196b31525b427a5c4205a";
    let (base, handle) = serve(vec![(200, record_json(id, "PAID", 5_000))]);
    let config = EngineConfig {
        retry: RetryPolicy::no_retry(),
        ..EngineConfig::default()
    };
    let engine = ReconciliationEngine::new(gateway(&base), InMemoryMappingStore::new(), config);

    let resolution = engine.resolve(&ResolveRequest::new(id)).unwrap();
    let captured = handle.join().unwrap();

    assert_eq!(resolution.source, ResolutionSource::Normalized);
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].url, format!("/payments/{id}"));
}
