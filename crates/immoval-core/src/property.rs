//! Property input shapes: the raw form capture and the canonical request.

use std::collections::BTreeSet;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::vocabulary::{FEATURE_COUNT, Feature, PropertyType};

/// Unvalidated property attributes as entered by the user.
///
/// Categorical fields hold display labels ("Flat Studio"). Any field may be
/// absent; an absent number is not the same as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPropertyInput {
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub subtype: Option<String>,
    pub province: Option<String>,
    pub post_code: Option<i64>,
    pub epc_score: Option<String>,
    pub habitable_surface: Option<f64>,
    pub terrace_surface: Option<f64>,
    pub garden_surface: Option<f64>,
    pub bedroom_count: Option<u32>,
    pub bathroom_count: Option<u32>,
    pub toilet_count: Option<u32>,
    pub features: BTreeSet<Feature>,
}

/// All sixteen amenity flags, each explicitly true or false.
///
/// Serialises as a map of every feature key, so an unset flag reaches the
/// API as `false` rather than being omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags([bool; FEATURE_COUNT]);

impl FeatureFlags {
    pub fn from_selected<'a>(selected: impl IntoIterator<Item = &'a Feature>) -> Self {
        let mut flags = Self::default();
        for feature in selected {
            flags.0[feature.index()] = true;
        }
        flags
    }

    pub fn get(&self, feature: Feature) -> bool {
        self.0[feature.index()]
    }

    /// `(feature, value)` for every feature, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, bool)> + '_ {
        Feature::ALL.into_iter().map(|f| (f, self.get(f)))
    }

    /// Features that are set, in table order.
    pub fn selected(&self) -> impl Iterator<Item = Feature> + '_ {
        self.iter().filter(|(_, on)| *on).map(|(f, _)| f)
    }
}

impl Serialize for FeatureFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature.key(), &value)?;
        }
        map.end()
    }
}

/// Canonical request payload for the prediction API.
///
/// Only [`normalize`](crate::normalize) builds one, so the vocabulary and range
/// invariants hold for every instance. Absent fields serialise as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPropertyRequest {
    pub(crate) habitable_surface: Option<f64>,
    #[serde(rename = "type")]
    pub(crate) property_type: Option<PropertyType>,
    pub(crate) subtype: Option<String>,
    pub(crate) province: Option<String>,
    pub(crate) post_code: Option<u16>,
    pub(crate) epc_score: Option<String>,
    pub(crate) bedroom_count: Option<u32>,
    pub(crate) bathroom_count: Option<u32>,
    pub(crate) toilet_count: Option<u32>,
    pub(crate) terrace_surface: Option<f64>,
    pub(crate) garden_surface: Option<f64>,
    #[serde(flatten)]
    pub(crate) features: FeatureFlags,
}

impl NormalizedPropertyRequest {
    pub fn habitable_surface(&self) -> Option<f64> {
        self.habitable_surface
    }

    pub fn property_type(&self) -> Option<PropertyType> {
        self.property_type
    }

    pub fn subtype(&self) -> Option<&str> {
        self.subtype.as_deref()
    }

    pub fn province(&self) -> Option<&str> {
        self.province.as_deref()
    }

    pub fn post_code(&self) -> Option<u16> {
        self.post_code
    }

    pub fn epc_score(&self) -> Option<&str> {
        self.epc_score.as_deref()
    }

    pub fn bedroom_count(&self) -> Option<u32> {
        self.bedroom_count
    }

    pub fn bathroom_count(&self) -> Option<u32> {
        self.bathroom_count
    }

    pub fn toilet_count(&self) -> Option<u32> {
        self.toilet_count
    }

    pub fn terrace_surface(&self) -> Option<f64> {
        self.terrace_surface
    }

    pub fn garden_surface(&self) -> Option<f64> {
        self.garden_surface
    }

    pub fn features(&self) -> &FeatureFlags {
        &self.features
    }
}
