//! Valuation pipeline: normalize → gate → submit → interpret → geocode.

use anyhow::Context;
use immoval_client::PredictionClient;
use immoval_core::{ApiOutcome, FieldViolation, RawPropertyInput, Summary, interpret, normalize};
use immoval_geo::{GeoCoordinate, GeocodeResolver};
use tracing::{info, warn};

/// Result of looking up the submitted postcode.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationLookup {
    Found {
        postcode: u16,
        coordinate: GeoCoordinate,
    },
    NotFound {
        postcode: u16,
    },
    /// The dataset could not be loaded; shown as a warning.
    Unavailable {
        postcode: u16,
        reason: String,
    },
}

/// Everything the front end needs to render one valuation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ValuationReport {
    /// Blocked locally; nothing was sent.
    Rejected {
        violations: Vec<FieldViolation>,
    },
    Submitted(Submission),
}

/// A request that reached the prediction service, whatever it answered.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub outcome: ApiOutcome,
    pub summary: Summary,
    pub location: Option<LocationLookup>,
}

/// Run one valuation attempt.
///
/// Errors only on a vocabulary defect. Every user-facing failure (missing
/// fields, API rejections, unreachable server, unknown postcode) is carried
/// in the report.
pub async fn run_valuation(
    client: &PredictionClient,
    resolver: &GeocodeResolver,
    raw: &RawPropertyInput,
) -> anyhow::Result<ValuationReport> {
    let normalization = normalize(raw).context("normalizing property input")?;

    let request = match normalization.into_submittable() {
        Ok(request) => request,
        Err(violations) => {
            info!(count = violations.len(), "blocked by local validation");
            return Ok(ValuationReport::Rejected { violations });
        }
    };

    let outcome = client.submit(&request).await;
    let summary = interpret(&outcome);
    let location = request
        .post_code()
        .map(|postcode| resolve_location(resolver, postcode));

    Ok(ValuationReport::Submitted(Submission {
        outcome,
        summary,
        location,
    }))
}

/// Geocode a postcode, folding a dataset failure into the lookup result.
pub fn resolve_location(resolver: &GeocodeResolver, postcode: u16) -> LocationLookup {
    match resolver.resolve(u32::from(postcode)) {
        Ok(Some(coordinate)) => LocationLookup::Found {
            postcode,
            coordinate,
        },
        Ok(None) => LocationLookup::NotFound { postcode },
        Err(e) => {
            warn!(postcode, error = %e, "geocode dataset unavailable");
            LocationLookup::Unavailable {
                postcode,
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};
    use immoval_client::ClientConfig;
    use immoval_core::{Feature, RequiredField};
    use immoval_geo::{DatasetFormat, PostcodeTable};
    use serde_json::{Value, json};

    const DATA: &str = "\
Post code;Municipality;Geo Point
9000;Gent;51.0543, 3.7174
9000;Sint-Denijs-Westrem;51.0243, 3.6740
";

    fn resolver() -> GeocodeResolver {
        let table = PostcodeTable::from_reader(DATA.as_bytes(), &DatasetFormat::default()).unwrap();
        GeocodeResolver::from_table(table)
    }

    fn raw() -> RawPropertyInput {
        RawPropertyInput {
            property_type: Some("Apartment".into()),
            subtype: Some("Duplex".into()),
            province: Some("East Flanders".into()),
            post_code: Some(9000),
            epc_score: Some("A".into()),
            habitable_surface: Some(120.0),
            bedroom_count: Some(3),
            bathroom_count: Some(1),
            toilet_count: Some(2),
            features: [Feature::Lift].into(),
            ..Default::default()
        }
    }

    async fn serve(router: Router) -> PredictionClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        PredictionClient::new(ClientConfig::new(format!("http://{addr}"))).unwrap()
    }

    async fn predict(Json(_): Json<Value>) -> Json<Value> {
        Json(json!({"data": {"prediction": 345000.5}}))
    }

    async fn refused_client() -> PredictionClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        PredictionClient::new(ClientConfig::new(format!("http://{addr}"))).unwrap()
    }

    #[tokio::test]
    async fn full_pipeline_success() {
        let client = serve(Router::new().route("/predict", post(predict))).await;

        let report = run_valuation(&client, &resolver(), &raw()).await.unwrap();
        let ValuationReport::Submitted(submission) = report else {
            panic!("expected submission");
        };
        assert!(submission.outcome.is_success());
        assert_eq!(submission.summary.messages(), vec!["€345,000.50"]);
        assert!(matches!(
            submission.location,
            Some(LocationLookup::Found { postcode: 9000, .. })
        ));
        let Some(LocationLookup::Found { coordinate, .. }) = submission.location else {
            panic!("expected geocode hit");
        };
        assert!((coordinate.latitude - 51.0393).abs() < 1e-9);
    }

    #[tokio::test]
    async fn missing_fields_block_submission() {
        let mut input = raw();
        input.epc_score = None;
        input.toilet_count = None;

        // A refused port would yield a transport error if anything were sent.
        let report = run_valuation(&refused_client().await, &resolver(), &input)
            .await
            .unwrap();
        assert_eq!(
            report,
            ValuationReport::Rejected {
                violations: vec![
                    FieldViolation::Missing(RequiredField::EpcScore),
                    FieldViolation::Missing(RequiredField::ToiletCount),
                ],
            }
        );
    }

    #[tokio::test]
    async fn transport_failure_still_geocodes() {
        let report = run_valuation(&refused_client().await, &resolver(), &raw())
            .await
            .unwrap();
        let ValuationReport::Submitted(submission) = report else {
            panic!("expected submission");
        };
        let outcome = &submission.outcome;
        assert!(matches!(outcome, ApiOutcome::TransportError { .. }));
        let location = &submission.location;
        assert!(matches!(location, Some(LocationLookup::Found { .. })));
    }

    #[tokio::test]
    async fn vocabulary_defect_is_an_error() {
        let mut input = raw();
        input.subtype = Some("Castle".into());
        let err = run_valuation(&refused_client().await, &resolver(), &input)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("normalizing property input"));
    }

    #[test]
    fn unknown_postcode_is_not_found() {
        assert_eq!(
            resolve_location(&resolver(), 1000),
            LocationLookup::NotFound { postcode: 1000 }
        );
    }

    #[test]
    fn missing_dataset_is_unavailable() {
        let resolver = GeocodeResolver::new("/nonexistent/postcodes.csv", DatasetFormat::default());
        assert!(matches!(
            resolve_location(&resolver, 9000),
            LocationLookup::Unavailable { postcode: 9000, .. }
        ));
    }
}
