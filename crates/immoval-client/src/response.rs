//! Classification of raw prediction API responses into [`ApiOutcome`].
//!
//! Kept apart from the transport so every status/body combination can be
//! exercised without a server.

use immoval_core::{ApiOutcome, SchemaViolation};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct SuccessBody {
    data: PredictionData,
}

#[derive(Deserialize)]
struct PredictionData {
    prediction: f64,
}

#[derive(Deserialize)]
struct ValidationBody {
    detail: Detail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Entries(Vec<DetailEntry>),
    Message(String),
}

#[derive(Deserialize)]
struct DetailEntry {
    #[serde(default)]
    loc: Vec<Value>,
    msg: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Body of the server status check (`GET <base_url>`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerStatus {
    pub message: String,
}

/// Map an HTTP status and body to an outcome.
pub fn classify(status: u16, body: &str) -> ApiOutcome {
    match status {
        200..=299 => classify_success(body),
        422 => match serde_json::from_str::<ValidationBody>(body) {
            Ok(parsed) => ApiOutcome::ValidationError {
                violations: violations(parsed.detail),
            },
            Err(_) => fallback(status, body),
        },
        500 => match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => ApiOutcome::ServerError {
                message: parsed.error,
            },
            Err(_) => fallback(status, body),
        },
        _ => fallback(status, body),
    }
}

fn classify_success(body: &str) -> ApiOutcome {
    match serde_json::from_str::<SuccessBody>(body) {
        Ok(parsed) if parsed.data.prediction.is_finite() && parsed.data.prediction > 0.0 => {
            ApiOutcome::Success {
                predicted_price: parsed.data.prediction,
            }
        }
        Ok(parsed) => ApiOutcome::ServerError {
            message: format!(
                "prediction service returned a non-positive price: {}",
                parsed.data.prediction
            ),
        },
        Err(_) => ApiOutcome::ServerError {
            message: format!("unexpected response body: {}", body.trim()),
        },
    }
}

fn violations(detail: Detail) -> Vec<SchemaViolation> {
    match detail {
        Detail::Entries(entries) => entries
            .into_iter()
            .map(|entry| SchemaViolation {
                loc: entry.loc.iter().map(segment).collect(),
                message: entry.msg,
            })
            .collect(),
        Detail::Message(message) => vec![SchemaViolation {
            loc: Vec::new(),
            message,
        }],
    }
}

/// Path segments are strings or list indices.
fn segment(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn fallback(status: u16, body: &str) -> ApiOutcome {
    ApiOutcome::ServerError {
        message: format!("{status}: {}", body.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_error(message: &str) -> ApiOutcome {
        ApiOutcome::ServerError {
            message: message.to_string(),
        }
    }

    fn success(price: f64) -> ApiOutcome {
        ApiOutcome::Success {
            predicted_price: price,
        }
    }

    #[test]
    fn success_with_prediction() {
        let outcome = classify(200, r#"{"data": {"prediction": 345000.5}}"#);
        assert_eq!(outcome, success(345000.5));
    }

    #[test]
    fn success_with_integer_prediction() {
        let body = r#"{"data": {"prediction": 250000}, "status_code": 200}"#;
        assert_eq!(classify(201, body), success(250000.0));
    }

    #[test]
    fn success_without_prediction_is_server_error() {
        let outcome = classify(200, r#"{"data": {}}"#);
        let ApiOutcome::ServerError { message } = outcome else {
            panic!("expected server error");
        };
        assert!(message.starts_with("unexpected response body"), "{message}");

        let outcome = classify(200, r#"{"data": {"prediction": "lots"}}"#);
        assert!(matches!(outcome, ApiOutcome::ServerError { .. }));
    }

    #[test]
    fn non_positive_prediction_is_server_error() {
        let outcome = classify(200, r#"{"data": {"prediction": -12.0}}"#);
        let expected = "prediction service returned a non-positive price: -12";
        assert_eq!(outcome, server_error(expected));
    }

    #[test]
    fn validation_error_keeps_order_and_paths() {
        let body = r#"{"detail": [
            {"loc": ["body", "data", "province"], "msg": "Value error, invalid"},
            {"loc": ["body", "data", "features", 3], "msg": "Input should be a valid boolean"},
            {"loc": ["body"], "msg": "Field required", "type": "missing"}
        ]}"#;
        let ApiOutcome::ValidationError { violations } = classify(422, body) else {
            panic!("expected validation error");
        };
        assert_eq!(violations.len(), 3);
        assert_eq!(violations[0].loc, vec!["body", "data", "province"]);
        assert_eq!(violations[0].message, "Value error, invalid");
        assert_eq!(violations[1].loc[3], "3");
        assert_eq!(violations[2].field(), None);
    }

    #[test]
    fn validation_detail_as_plain_string() {
        let outcome = classify(422, r#"{"detail": "subtype does not match type"}"#);
        let violation = SchemaViolation {
            loc: vec![],
            message: "subtype does not match type".into(),
        };
        assert_eq!(
            outcome,
            ApiOutcome::ValidationError {
                violations: vec![violation],
            }
        );
    }

    #[test]
    fn unparseable_validation_body_falls_back() {
        let outcome = classify(422, "Unprocessable");
        assert_eq!(outcome, server_error("422: Unprocessable"));
    }

    #[test]
    fn server_error_message() {
        let outcome = classify(500, r#"{"error": "model file missing"}"#);
        assert_eq!(outcome, server_error("model file missing"));
    }

    #[test]
    fn server_error_without_error_field_falls_back() {
        let outcome = classify(500, "Internal Server Error\n");
        assert_eq!(outcome, server_error("500: Internal Server Error"));
    }

    #[test]
    fn other_status_falls_back() {
        let outcome = classify(404, r#"{"detail": "Not Found"}"#);
        assert_eq!(outcome, server_error(r#"404: {"detail": "Not Found"}"#));
        assert_eq!(classify(503, ""), server_error("503: "));
    }

    #[test]
    fn server_status_body() {
        let status: ServerStatus = serde_json::from_str(r#"{"message": "alive"}"#).unwrap();
        assert_eq!(status.message, "alive");
    }
}
