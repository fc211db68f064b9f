//! Verify encoding and comparison against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Encoding vectors pin exact wire bytes. Comparison vectors pin the exact
//! mismatch lines produced for a given expectation and observed response.

use hit_core::{Body, EncodeError, FormBody, Header, HttpResponse, JsonBody, MultipartBody, Response};
use serde_json::Value;

fn strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

fn form_from(input: &Value) -> FormBody {
    input
        .as_object()
        .unwrap()
        .iter()
        .map(|(k, v)| (k.clone(), strings(v)))
        .collect()
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

#[test]
fn encoding_test_vectors() {
    let raw = include_str!("../../test-vectors/encoding.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = case["input"].clone();

        let body: Box<dyn Body> = match case["kind"].as_str().unwrap() {
            "form" => Box::new(form_from(&input)),
            "json" => Box::new(JsonBody::new(input)),
            "multipart" => match MultipartBody::from_json(input) {
                Ok(body) => Box::new(body),
                Err(err) => {
                    let expected = case["expected_error"].as_str().unwrap_or_else(|| {
                        panic!("{name}: unexpected error {err}");
                    });
                    match expected {
                        "UnsupportedPart" => assert!(
                            matches!(err, EncodeError::UnsupportedPart { .. }),
                            "{name}: expected UnsupportedPart"
                        ),
                        other => panic!("{name}: unknown expected_error: {other}"),
                    }
                    continue;
                }
            },
            other => panic!("{name}: unknown kind: {other}"),
        };

        assert!(case.get("expected_error").is_none(), "{name}: expected an error");
        assert_eq!(body.content_type(), case["content_type"].as_str().unwrap(), "{name}: content type");
        let encoded = String::from_utf8(body.encode().unwrap()).unwrap();
        assert_eq!(encoded, case["expected"].as_str().unwrap(), "{name}: encoded bytes");
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

fn response_from(expected: &Value) -> Response {
    let mut want = Response::status(expected["status"].as_u64().unwrap() as u16);
    if let Some(header) = expected.get("header") {
        want = want.with_header(
            header
                .as_object()
                .unwrap()
                .iter()
                .map(|(k, v)| (k.clone(), strings(v)))
                .collect::<Header>(),
        );
    }
    if let Some(body) = expected.get("body") {
        want = want.with_body(body.clone());
    }
    want
}

fn observed_from(observed: &Value) -> HttpResponse {
    HttpResponse {
        status: observed["status"].as_u64().unwrap() as u16,
        headers: observed["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let pair = strings(h);
                (pair[0].clone(), pair[1].clone())
            })
            .collect(),
        body: observed["body"].as_str().unwrap().as_bytes().to_vec(),
    }
}

#[test]
fn compare_test_vectors() {
    let raw = include_str!("../../test-vectors/compare.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let want = response_from(&case["expected"]);
        let observed = observed_from(&case["observed"]);
        let expected_checks = strings(&case["expected_checks"]);

        let lines: Vec<String> = match want.compare(&observed) {
            Ok(()) => Vec::new(),
            Err(report) => report.checks().iter().map(ToString::to_string).collect(),
        };
        assert_eq!(lines, expected_checks, "{name}: checks");
    }
}
