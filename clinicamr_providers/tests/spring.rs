use std::time::Duration;

use clinicamr_core::AmrParser;
use clinicamr_providers::SpringAmrParser;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn parser(server: &MockServer) -> SpringAmrParser {
    SpringAmrParser::new(server.uri(), "spring", Duration::from_secs(5))
        .unwrap()
        .with_retry(vec![Duration::from_millis(1)], 1)
}

#[tokio::test]
async fn parses_graphs_and_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/parse"))
        .and(body_json(json!({"sents": ["He denies fever.", "???"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "amrs": [
                {"sent": "He denies fever.", "graph": "# ::snt He denies fever.\n(d / deny-01\n   :ARG0 (h / he)\n   :ARG1 (f / fever))"},
                {"sent": "???", "error": "empty graph"}
            ]
        })))
        .mount(&server)
        .await;

    let sents = vec!["He denies fever.".to_string(), "???".to_string()];
    let amrs = parser(&server).parse(&sents).await.unwrap();
    assert_eq!(amrs.len(), 2);
    assert_eq!(amrs[0].metadata.get("snt"), Some("He denies fever."));
    assert_eq!(amrs[0].graph().unwrap().concept("f"), Some("fever"));
    assert!(amrs[1].is_failure());
    assert_eq!(amrs[1].metadata.get("parse_error"), Some("empty graph"));
    assert_eq!(amrs[1].metadata.get("snt"), Some("???"));
}

#[tokio::test]
async fn retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/parse"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/parse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "amrs": [{"sent": "Afebrile.", "graph": "(f / fever :polarity -)"}]
        })))
        .mount(&server)
        .await;

    let amrs = parser(&server)
        .parse(&["Afebrile.".to_string()])
        .await
        .unwrap();
    assert_eq!(amrs[0].metadata.get("snt"), Some("Afebrile."));
    assert!(!amrs[0].is_failure());
}

#[tokio::test]
async fn count_mismatch_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/parse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"amrs": []})))
        .mount(&server)
        .await;

    let err = parser(&server)
        .parse(&["Afebrile.".to_string()])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("0 graphs for 1 sentences"));
}
