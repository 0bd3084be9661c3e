mod common;

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use slipocr::config::OcrConfig;
use slipocr::ocr::{decode_image, RecognitionBackend, Recognizer, RemoteOcrBackend};

fn config(max_retries: u32) -> OcrConfig {
    OcrConfig {
        timeout_secs: 5,
        max_retries,
        ..OcrConfig::default()
    }
}

fn backend(server: &MockServer, max_retries: u32) -> RemoteOcrBackend {
    RemoteOcrBackend::new("paddle", &format!("{}/ocr", server.uri()), &config(max_retries))
        .unwrap()
}

#[tokio::test]
async fn test_remote_recognition() {
    common::init_test_logger();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ocr"))
        .and(body_partial_json(json!({"languages": "tha+eng"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"text": "ธนาคารกสิกรไทย", "confidence": 0.98},
                {"text": "   ", "confidence": 0.1},
                {"text": "จำนวนเงิน: 1,500.00 บาท", "confidence": 1.7}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let image = decode_image(&common::create_test_png(60, 60)).unwrap();
    let spans = backend(&server, 3).recognize(&image).await.unwrap();

    assert_eq!(spans.len(), 3);
    assert_eq!(spans[0].text, "ธนาคารกสิกรไทย");
    assert_eq!(spans[2].confidence, 1.0);
}

#[tokio::test]
async fn test_remote_confidence_averages_every_reported_span() {
    common::init_test_logger();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ocr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"text": "", "confidence": 0.25},
                {"text": "฿1,500.00", "confidence": 0.75}
            ]
        })))
        .mount(&server)
        .await;

    let recognizer = Recognizer::new(vec![Arc::new(backend(&server, 3))]);
    let image = decode_image(&common::create_test_png(60, 60)).unwrap();
    let outcome = recognizer.process(&image, None).await;

    assert_eq!(outcome.engine, "paddle");
    assert_eq!(outcome.confidence, 0.5);
    assert!(outcome.text.contains("฿1,500.00"));
}

#[tokio::test]
async fn test_remote_retries_server_errors() {
    common::init_test_logger();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ocr"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ocr"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": [{"text": "฿99.00", "confidence": 0.8}]})),
        )
        .mount(&server)
        .await;

    let image = decode_image(&common::create_test_png(60, 60)).unwrap();
    let spans = backend(&server, 3).recognize(&image).await.unwrap();

    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].text, "฿99.00");
}

#[tokio::test]
async fn test_remote_client_error_is_not_retried() {
    common::init_test_logger();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ocr"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad image"))
        .expect(1)
        .mount(&server)
        .await;

    let image = decode_image(&common::create_test_png(60, 60)).unwrap();
    let err = backend(&server, 3).recognize(&image).await.unwrap_err();

    let message = err.to_string();
    assert!(message.contains("400"), "{message}");
    assert!(message.contains("bad image"), "{message}");
}

#[tokio::test]
async fn test_remote_gives_up_after_max_retries() {
    common::init_test_logger();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ocr"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let image = decode_image(&common::create_test_png(60, 60)).unwrap();
    let err = backend(&server, 2).recognize(&image).await.unwrap_err();

    assert!(err.to_string().contains("after 2 retries"));
}
