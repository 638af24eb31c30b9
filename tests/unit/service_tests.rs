/*!
 * Tests for request routing without a socket
 */

use eduart_aligner::app_config::{Config, CorsConfig};
use eduart_aligner::errors::HttpError;
use eduart_aligner::http::{HttpRequest, HttpResponse};
use eduart_aligner::server::AlignService;
use serde_json::{json, Value};

fn service() -> AlignService {
    AlignService::from_config(&Config::default())
}

fn body_json(response: &HttpResponse) -> Value {
    serde_json::from_slice(&response.body).expect("response body should be JSON")
}

fn align_request(body: &str) -> HttpRequest {
    HttpRequest::new("POST", "/api/align")
        .with_header("Content-Type", "application/json")
        .with_body(body.as_bytes().to_vec())
}

#[test]
fn test_handle_validPost_shouldReturnAlignedRows() {
    let response = service().handle(&align_request(r#"{"kor_text": "안녕\n반가워", "eng_text": "Hi\nNice to meet you"}"#));

    assert_eq!(response.status, 200);
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    assert_eq!(
        body_json(&response),
        json!({"data": [
            {"id": 1, "kor": "안녕", "eng": "Hi"},
            {"id": 2, "kor": "반가워", "eng": "Nice to meet you"}
        ]})
    );
}

#[test]
fn test_handle_missingField_shouldReturn422WithDetail() {
    let response = service().handle(&align_request(r#"{"kor_text": "안녕"}"#));

    assert_eq!(response.status, 422);
    let detail = body_json(&response)["detail"].as_str().unwrap_or_default().to_string();
    assert!(detail.contains("eng_text"), "detail was: {}", detail);
}

#[test]
fn test_handle_emptyBody_shouldReturn422() {
    let response = service().handle(&HttpRequest::new("POST", "/api/align"));
    assert_eq!(response.status, 422);
}

#[test]
fn test_handle_unknownPath_shouldReturn404() {
    let response = service().handle(&HttpRequest::new("POST", "/api/other"));
    assert_eq!(response.status, 404);
    assert_eq!(body_json(&response), json!({"detail": "Not Found"}));
}

#[test]
fn test_handle_wrongMethod_shouldReturn405WithAllow() {
    let response = service().handle(&HttpRequest::new("GET", "/api/align"));
    assert_eq!(response.status, 405);
    assert_eq!(response.header("Allow"), Some("POST, OPTIONS"));
}

#[test]
fn test_handle_postWithOrigin_shouldCarryCorsHeaders() {
    let request = align_request(r#"{"kor_text": "", "eng_text": ""}"#).with_header("Origin", "http://localhost:5173");
    let response = service().handle(&request);

    assert_eq!(response.status, 200);
    assert_eq!(body_json(&response), json!({"data": []}));
    assert_eq!(response.header("Access-Control-Allow-Origin"), Some("http://localhost:5173"));
    assert_eq!(response.header("Access-Control-Allow-Credentials"), Some("true"));
}

#[test]
fn test_handle_rejectedRequestWithOrigin_shouldStillCarryCorsHeaders() {
    let request = align_request("{}").with_header("Origin", "http://localhost:5173");
    let response = service().handle(&request);

    assert_eq!(response.status, 422);
    assert!(response.header("Access-Control-Allow-Origin").is_some());
}

#[test]
fn test_handle_preflight_shouldAllowAnyMethodAndHeaders() {
    let request = HttpRequest::new("OPTIONS", "/api/align")
        .with_header("Origin", "https://player.example.com")
        .with_header("Access-Control-Request-Method", "POST")
        .with_header("Access-Control-Request-Headers", "content-type");
    let response = service().handle(&request);

    assert_eq!(response.status, 200);
    assert_eq!(response.header("Access-Control-Allow-Origin"), Some("https://player.example.com"));
    assert_eq!(response.header("Access-Control-Allow-Headers"), Some("content-type"));
    assert!(response.header("Access-Control-Allow-Methods").unwrap_or_default().contains("POST"));
}

#[test]
fn test_handle_preflightOnOtherPath_shouldBeAnsweredBeforeRouting() {
    let request = HttpRequest::new("OPTIONS", "/somewhere/else")
        .with_header("Origin", "https://player.example.com")
        .with_header("Access-Control-Request-Method", "POST");
    let response = service().handle(&request);

    assert_eq!(response.status, 200);
    assert_eq!(response.header("Access-Control-Allow-Origin"), Some("https://player.example.com"));

    let plain_options = service().handle(&HttpRequest::new("OPTIONS", "/somewhere/else"));
    assert_eq!(plain_options.status, 404);
}

#[test]
fn test_handle_preflightFromUnlistedOrigin_shouldReturn400() {
    let mut config = Config::default();
    config.cors = CorsConfig {
        allow_all_origins: false,
        allowed_origins: vec!["https://player.example.com".to_string()],
        ..CorsConfig::default()
    };
    let service = AlignService::from_config(&config);

    let request = HttpRequest::new("OPTIONS", "/api/align")
        .with_header("Origin", "https://elsewhere.example.com")
        .with_header("Access-Control-Request-Method", "POST");
    let response = service.handle(&request);

    assert_eq!(response.status, 400);
    assert_eq!(response.body, b"Disallowed CORS origin");
    assert!(response.header("Access-Control-Allow-Origin").is_none());
}

#[test]
fn test_handle_customRoute_shouldBeHonored() {
    let mut config = Config::default();
    config.server.route = "/align".to_string();
    let service = AlignService::from_config(&config);

    let request = HttpRequest::new("POST", "/align").with_body(br#"{"kor_text": "a", "eng_text": "b"}"#.to_vec());
    assert_eq!(service.handle(&request).status, 200);
    assert_eq!(service.handle(&align_request("{}")).status, 404);
}

#[test]
fn test_errorResponse_shouldMapReadErrors() {
    let response = AlignService::error_response(&HttpError::PayloadTooLarge { limit: 1, actual: 2 }).unwrap();
    assert_eq!(response.status, 413);
    assert!(AlignService::error_response(&HttpError::ConnectionClosed).is_none());
}
