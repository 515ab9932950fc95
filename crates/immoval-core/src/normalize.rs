//! Local, pre-network normalisation of raw property input.
//!
//! [`normalize`] converts display labels into API tokens, copies numbers
//! through unchanged and expands the selected features into sixteen explicit
//! flags. It then checks the mandatory fields. The request is always built;
//! callers must not submit it while [`Normalization::violations`] is non-empty.

use std::fmt;
use std::ops::RangeInclusive;

use thiserror::Error;
use tracing::debug;

use crate::VocabularyError;
use crate::property::{FeatureFlags, NormalizedPropertyRequest, RawPropertyInput};
use crate::vocabulary::{PropertyType, Vocabulary, to_token};

/// Valid Belgian postcodes.
pub const POSTCODE_RANGE: RangeInclusive<u16> = 1000..=9999;

/// Fields a request cannot be submitted without, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    HabitableSurface,
    PropertyType,
    Subtype,
    Province,
    PostCode,
    EpcScore,
    BedroomCount,
    BathroomCount,
    ToiletCount,
}

impl RequiredField {
    pub const ALL: [RequiredField; 9] = [
        RequiredField::HabitableSurface,
        RequiredField::PropertyType,
        RequiredField::Subtype,
        RequiredField::Province,
        RequiredField::PostCode,
        RequiredField::EpcScore,
        RequiredField::BedroomCount,
        RequiredField::BathroomCount,
        RequiredField::ToiletCount,
    ];

    /// Payload field name.
    pub fn name(self) -> &'static str {
        match self {
            RequiredField::HabitableSurface => "habitableSurface",
            RequiredField::PropertyType => "type",
            RequiredField::Subtype => "subtype",
            RequiredField::Province => "province",
            RequiredField::PostCode => "postCode",
            RequiredField::EpcScore => "epcScore",
            RequiredField::BedroomCount => "bedroomCount",
            RequiredField::BathroomCount => "bathroomCount",
            RequiredField::ToiletCount => "toiletCount",
        }
    }

    fn provided(self, raw: &RawPropertyInput) -> bool {
        match self {
            RequiredField::HabitableSurface => raw.habitable_surface.is_some(),
            RequiredField::PropertyType => raw.property_type.is_some(),
            RequiredField::Subtype => raw.subtype.is_some(),
            RequiredField::Province => raw.province.is_some(),
            RequiredField::PostCode => raw.post_code.is_some(),
            RequiredField::EpcScore => raw.epc_score.is_some(),
            RequiredField::BedroomCount => raw.bedroom_count.is_some(),
            RequiredField::BathroomCount => raw.bathroom_count.is_some(),
            RequiredField::ToiletCount => raw.toilet_count.is_some(),
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A problem found before anything is sent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldViolation {
    #[error("{0}: field required")]
    Missing(RequiredField),

    #[error("{field}: {reason}")]
    OutOfRange {
        field: &'static str,
        reason: String,
    },
}

impl FieldViolation {
    pub fn field(&self) -> &'static str {
        match self {
            FieldViolation::Missing(field) => field.name(),
            FieldViolation::OutOfRange { field, .. } => field,
        }
    }
}

/// Result of [`normalize`]: the request plus everything that blocks it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalization {
    pub request: NormalizedPropertyRequest,
    /// Missing fields in [`RequiredField::ALL`] order, then out-of-range values.
    pub violations: Vec<FieldViolation>,
}

impl Normalization {
    pub fn is_submittable(&self) -> bool {
        self.violations.is_empty()
    }

    /// Names of the missing mandatory fields, in reporting order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.violations
            .iter()
            .filter_map(|v| match v {
                FieldViolation::Missing(field) => Some(field.name()),
                FieldViolation::OutOfRange { .. } => None,
            })
            .collect()
    }

    /// The request, only if nothing blocks submission.
    pub fn into_submittable(self) -> Result<NormalizedPropertyRequest, Vec<FieldViolation>> {
        if self.violations.is_empty() {
            Ok(self.request)
        } else {
            Err(self.violations)
        }
    }
}

/// Build the canonical request from raw input.
///
/// Fails only when a label is not in the vocabulary tables, or when the
/// subtype does not belong to the selected type. Both are caller defects.
pub fn normalize(raw: &RawPropertyInput) -> Result<Normalization, VocabularyError> {
    let property_type = raw
        .property_type
        .as_deref()
        .map(PropertyType::from_label)
        .transpose()?;
    let subtype = raw
        .subtype
        .as_deref()
        .map(|label| subtype_token(property_type, label))
        .transpose()?;
    let province = raw
        .province
        .as_deref()
        .map(|label| to_token(Vocabulary::Province, label))
        .transpose()?;
    let epc_score = raw
        .epc_score
        .as_deref()
        .map(|label| to_token(Vocabulary::EpcScore, label))
        .transpose()?;

    let mut out_of_range = Vec::new();
    let post_code = raw.post_code.and_then(|code| {
        let valid = u16::try_from(code)
            .ok()
            .filter(|c| POSTCODE_RANGE.contains(c));
        if valid.is_none() {
            out_of_range.push(FieldViolation::OutOfRange {
                field: "postCode",
                reason: format!(
                    "{code} is outside {}..={}",
                    POSTCODE_RANGE.start(),
                    POSTCODE_RANGE.end()
                ),
            });
        }
        valid
    });
    let habitable_surface = surface("habitableSurface", raw.habitable_surface, &mut out_of_range);
    let terrace_surface = surface("terraceSurface", raw.terrace_surface, &mut out_of_range);
    let garden_surface = surface("gardenSurface", raw.garden_surface, &mut out_of_range);

    let request = NormalizedPropertyRequest {
        habitable_surface,
        property_type,
        subtype,
        province,
        post_code,
        epc_score,
        bedroom_count: raw.bedroom_count,
        bathroom_count: raw.bathroom_count,
        toilet_count: raw.toilet_count,
        terrace_surface,
        garden_surface,
        features: FeatureFlags::from_selected(&raw.features),
    };

    let mut violations: Vec<FieldViolation> = RequiredField::ALL
        .into_iter()
        .filter(|field| !field.provided(raw))
        .map(FieldViolation::Missing)
        .collect();
    violations.extend(out_of_range);

    debug!(
        violations = violations.len(),
        features = raw.features.len(),
        "normalized property input"
    );
    Ok(Normalization {
        request,
        violations,
    })
}

fn subtype_token(
    property_type: Option<PropertyType>,
    label: &str,
) -> Result<String, VocabularyError> {
    let token = to_token(Vocabulary::Subtype, label)?;
    let label = label.trim();
    if let Some(property_type) = property_type
        && !property_type.subtypes().iter().any(|s| *s == label)
    {
        return Err(VocabularyError::SubtypeMismatch {
            subtype: label.to_string(),
            property_type,
        });
    }
    Ok(token)
}

fn surface(
    field: &'static str,
    value: Option<f64>,
    out_of_range: &mut Vec<FieldViolation>,
) -> Option<f64> {
    let value = value?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        out_of_range.push(FieldViolation::OutOfRange {
            field,
            reason: format!("{value} is not a non-negative surface"),
        });
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::{FEATURE_COUNT, Feature};
    use std::collections::BTreeSet;

    fn complete_input() -> RawPropertyInput {
        RawPropertyInput {
            property_type: Some("Apartment".into()),
            subtype: Some("Ground Floor".into()),
            province: Some("East Flanders".into()),
            post_code: Some(9000),
            epc_score: Some("B".into()),
            habitable_surface: Some(92.5),
            terrace_surface: Some(12.0),
            garden_surface: None,
            bedroom_count: Some(2),
            bathroom_count: Some(1),
            toilet_count: Some(1),
            features: BTreeSet::from([Feature::Terrace]),
        }
    }

    fn clear(raw: &mut RawPropertyInput, field: RequiredField) {
        match field {
            RequiredField::HabitableSurface => raw.habitable_surface = None,
            RequiredField::PropertyType => raw.property_type = None,
            RequiredField::Subtype => raw.subtype = None,
            RequiredField::Province => raw.province = None,
            RequiredField::PostCode => raw.post_code = None,
            RequiredField::EpcScore => raw.epc_score = None,
            RequiredField::BedroomCount => raw.bedroom_count = None,
            RequiredField::BathroomCount => raw.bathroom_count = None,
            RequiredField::ToiletCount => raw.toilet_count = None,
        }
    }

    #[test]
    fn complete_input_has_no_violations() {
        let n = normalize(&complete_input()).unwrap();
        assert!(n.is_submittable());
        assert!(n.violations.is_empty());

        let r = &n.request;
        assert_eq!(r.property_type(), Some(PropertyType::Apartment));
        assert_eq!(r.subtype(), Some("GROUND_FLOOR"));
        assert_eq!(r.province(), Some("EAST_FLANDERS"));
        assert_eq!(r.post_code(), Some(9000));
        assert_eq!(r.epc_score(), Some("B"));
        assert_eq!(r.habitable_surface(), Some(92.5));
        assert_eq!(r.garden_surface(), None);
        assert!(r.features().get(Feature::Terrace));
    }

    #[test]
    fn removing_one_field_reports_exactly_that_field() {
        for field in RequiredField::ALL {
            let mut raw = complete_input();
            clear(&mut raw, field);
            let n = normalize(&raw).unwrap();
            assert_eq!(n.missing_fields(), vec![field.name()], "{field}");
            assert!(!n.is_submittable());
        }
    }

    #[test]
    fn missing_fields_follow_fixed_order() {
        let n = normalize(&RawPropertyInput::default()).unwrap();
        assert_eq!(
            n.missing_fields(),
            vec![
                "habitableSurface",
                "type",
                "subtype",
                "province",
                "postCode",
                "epcScore",
                "bedroomCount",
                "bathroomCount",
                "toiletCount",
            ]
        );
    }

    #[test]
    fn zero_is_not_absent() {
        let mut raw = complete_input();
        raw.bedroom_count = Some(0);
        raw.habitable_surface = Some(0.0);
        let n = normalize(&raw).unwrap();
        assert!(n.is_submittable());
        assert_eq!(n.request.bedroom_count(), Some(0));

        let json = serde_json::to_value(&n.request).unwrap();
        assert_eq!(json["bedroomCount"], 0);
        assert!(json["gardenSurface"].is_null());
    }

    #[test]
    fn flags_always_present_for_any_selection_size() {
        for count in 0..=FEATURE_COUNT {
            let mut raw = complete_input();
            raw.features = Feature::ALL.into_iter().take(count).collect();
            let n = normalize(&raw).unwrap();
            let json = serde_json::to_value(&n.request).unwrap();
            let set = Feature::ALL
                .into_iter()
                .filter(|f| json[f.key()].as_bool().expect("boolean flag"))
                .count();
            assert_eq!(set, count);
        }
    }

    #[test]
    fn payload_field_names() {
        let n = normalize(&complete_input()).unwrap();
        let json = serde_json::to_value(&n.request).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "habitableSurface",
            "type",
            "subtype",
            "province",
            "postCode",
            "epcScore",
            "bedroomCount",
            "bathroomCount",
            "toiletCount",
            "terraceSurface",
            "gardenSurface",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj.len(), 11 + FEATURE_COUNT);
        assert_eq!(json["type"], "APARTMENT");
    }

    #[test]
    fn exceptional_property_valid_for_both_types() {
        for label in ["Apartment", "House"] {
            let mut raw = complete_input();
            raw.property_type = Some(label.into());
            raw.subtype = Some("Exceptional Property".into());
            let n = normalize(&raw).unwrap();
            assert_eq!(n.request.subtype(), Some("EXCEPTIONAL_PROPERTY"));
        }
    }

    #[test]
    fn subtype_of_other_type_is_a_mismatch() {
        let mut raw = complete_input();
        raw.subtype = Some("Villa".into());
        let err = normalize(&raw).unwrap_err();
        assert_eq!(
            err,
            VocabularyError::SubtypeMismatch {
                subtype: "Villa".into(),
                property_type: PropertyType::Apartment,
            }
        );
    }

    #[test]
    fn subtype_without_type_is_accepted() {
        let mut raw = complete_input();
        raw.property_type = None;
        raw.subtype = Some("Villa".into());
        let n = normalize(&raw).unwrap();
        assert_eq!(n.request.subtype(), Some("VILLA"));
        assert_eq!(n.missing_fields(), vec!["type"]);
    }

    #[test]
    fn unknown_label_is_a_vocabulary_error() {
        let mut raw = complete_input();
        raw.province = Some("Zeeland".into());
        assert!(matches!(
            normalize(&raw),
            Err(VocabularyError::InvalidVocabularyToken {
                vocabulary: Vocabulary::Province,
                ..
            })
        ));
    }

    #[test]
    fn out_of_range_postcode_is_reported_not_missing() {
        let mut raw = complete_input();
        raw.post_code = Some(999);
        raw.toilet_count = None;
        let n = normalize(&raw).unwrap();
        assert_eq!(n.request.post_code(), None);
        assert_eq!(n.missing_fields(), vec!["toiletCount"]);
        assert_eq!(n.violations.len(), 2);
        assert_eq!(n.violations[1].field(), "postCode");
        let message = n.violations[1].to_string();
        assert_eq!(message, "postCode: 999 is outside 1000..=9999");
    }

    #[test]
    fn negative_surface_is_rejected() {
        let mut raw = complete_input();
        raw.terrace_surface = Some(-4.0);
        let n = normalize(&raw).unwrap();
        assert_eq!(n.request.terrace_surface(), None);
        assert_eq!(n.violations.len(), 1);
        assert_eq!(n.violations[0].field(), "terraceSurface");
    }

    #[test]
    fn into_submittable_gates_on_violations() {
        let complete = normalize(&complete_input()).unwrap();
        assert!(complete.into_submittable().is_ok());

        let violations = normalize(&RawPropertyInput::default())
            .unwrap()
            .into_submittable()
            .unwrap_err();
        assert_eq!(violations.len(), RequiredField::ALL.len());
        let first = violations[0].to_string();
        assert_eq!(first, "habitableSurface: field required");
    }
}
