//! Static vocabulary tables for the valuation API.
//!
//! Every categorical field has a human-facing display label ("Ground Floor")
//! and a canonical API token ("GROUND_FLOOR"). The two forms are related by a
//! pair of pure transforms:
//!
//! - display → token: uppercase, spaces become underscores
//! - token → display: underscores become spaces, each word title-cased
//!
//! The tables below are written in display form and every entry survives a
//! token round trip unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::VocabularyError;

// ── Tables ──

pub const PROPERTY_TYPES: &[&str] = &["Apartment", "House"];

pub const APARTMENT_SUBTYPES: &[&str] = &[
    "Apartment",
    "Flat Studio",
    "Duplex",
    "Penthouse",
    "Ground Floor",
    "Apartment Block",
    "Kot",
    "Exceptional Property",
    "Mixed Use Building",
    "Triplex",
    "Loft",
    "Service Flat",
];

pub const HOUSE_SUBTYPES: &[&str] = &[
    "House",
    "Villa",
    "Town House",
    "Chalet",
    "Manor House",
    "Mansion",
    "Bungalow",
    "Country Cottage",
    "Other Property",
    "Castle",
    "Pavilion",
    "Exceptional Property",
];

pub const PROVINCES: &[&str] = &[
    "Brussels",
    "Luxembourg",
    "Antwerp",
    "Flemish Brabant",
    "East Flanders",
    "West Flanders",
    "Liège",
    "Walloon Brabant",
    "Limburg",
    "Namur",
    "Hainaut",
];

/// Energy-performance ratings. Token and display form are identical.
pub const EPC_SCORES: &[&str] = &["A+", "A", "B", "C", "D", "E", "F", "G"];

// ── Transforms ──

/// Display label → canonical token ("Flat Studio" → "FLAT_STUDIO").
pub fn label_to_token(label: &str) -> String {
    label.trim().to_uppercase().replace(' ', "_")
}

/// Canonical token → display label ("FLAT_STUDIO" → "Flat Studio").
pub fn token_to_label(token: &str) -> String {
    token
        .trim()
        .split('_')
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

// ── Vocabularies ──

/// One of the categorical vocabularies the API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vocabulary {
    PropertyType,
    Subtype,
    Province,
    EpcScore,
}

impl Vocabulary {
    pub const ALL: [Vocabulary; 4] = [
        Vocabulary::PropertyType,
        Vocabulary::Subtype,
        Vocabulary::Province,
        Vocabulary::EpcScore,
    ];

    /// All display labels of this vocabulary, in presentation order.
    ///
    /// For [`Vocabulary::Subtype`] the apartment list comes first, followed by
    /// the house entries not already listed.
    pub fn labels(self) -> Vec<&'static str> {
        match self {
            Vocabulary::PropertyType => PROPERTY_TYPES.to_vec(),
            Vocabulary::Subtype => {
                let mut all = APARTMENT_SUBTYPES.to_vec();
                for label in HOUSE_SUBTYPES {
                    if !all.contains(label) {
                        all.push(label);
                    }
                }
                all
            }
            Vocabulary::Province => PROVINCES.to_vec(),
            Vocabulary::EpcScore => EPC_SCORES.to_vec(),
        }
    }

    pub fn contains(self, label: &str) -> bool {
        self.labels().iter().any(|l| *l == label)
    }

    /// Case-insensitive match of free text against the table, returning the
    /// label exactly as the table spells it.
    pub fn match_label(self, input: &str) -> Option<&'static str> {
        let wanted = input.trim().to_lowercase();
        self.labels()
            .into_iter()
            .find(|label| label.to_lowercase() == wanted)
    }

    fn name(self) -> &'static str {
        match self {
            Vocabulary::PropertyType => "property type",
            Vocabulary::Subtype => "subtype",
            Vocabulary::Province => "province",
            Vocabulary::EpcScore => "EPC score",
        }
    }
}

impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Convert a display label from `vocabulary` into its canonical token.
pub fn to_token(vocabulary: Vocabulary, label: &str) -> Result<String, VocabularyError> {
    let label = label.trim();
    if !vocabulary.contains(label) {
        return Err(VocabularyError::InvalidVocabularyToken {
            vocabulary,
            value: label.to_string(),
        });
    }
    Ok(label_to_token(label))
}

/// Convert a canonical token from `vocabulary` back into its display label.
pub fn to_display(vocabulary: Vocabulary, token: &str) -> Result<String, VocabularyError> {
    let label = token_to_label(token);
    if !vocabulary.contains(&label) {
        return Err(VocabularyError::InvalidVocabularyToken {
            vocabulary,
            value: token.trim().to_string(),
        });
    }
    Ok(label)
}

// ── Property type ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    Apartment,
    House,
}

impl PropertyType {
    pub const ALL: [PropertyType; 2] = [PropertyType::Apartment, PropertyType::House];

    pub fn token(self) -> &'static str {
        match self {
            PropertyType::Apartment => "APARTMENT",
            PropertyType::House => "HOUSE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PropertyType::Apartment => "Apartment",
            PropertyType::House => "House",
        }
    }

    /// Valid subtype display labels for this type, in presentation order.
    pub fn subtypes(self) -> &'static [&'static str] {
        match self {
            PropertyType::Apartment => APARTMENT_SUBTYPES,
            PropertyType::House => HOUSE_SUBTYPES,
        }
    }

    pub fn from_label(label: &str) -> Result<Self, VocabularyError> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.label() == label)
            .ok_or_else(|| VocabularyError::InvalidVocabularyToken {
                vocabulary: Vocabulary::PropertyType,
                value: label.to_string(),
            })
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Subtype display labels valid for `property_type`.
pub fn subtypes_for(property_type: PropertyType) -> &'static [&'static str] {
    property_type.subtypes()
}

// ── Feature flags ──

/// The sixteen boolean amenities the API accepts.
///
/// Serialised as the API key (`hasAirConditioning`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Feature {
    Attic,
    Garden,
    AirConditioning,
    ArmoredDoor,
    Visiophone,
    Terrace,
    Office,
    SwimmingPool,
    Fireplace,
    Basement,
    DressingRoom,
    DiningRoom,
    Lift,
    HeatPump,
    PhotovoltaicPanels,
    LivingRoom,
}

pub const FEATURE_COUNT: usize = 16;

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Attic,
        Feature::Garden,
        Feature::AirConditioning,
        Feature::ArmoredDoor,
        Feature::Visiophone,
        Feature::Terrace,
        Feature::Office,
        Feature::SwimmingPool,
        Feature::Fireplace,
        Feature::Basement,
        Feature::DressingRoom,
        Feature::DiningRoom,
        Feature::Lift,
        Feature::HeatPump,
        Feature::PhotovoltaicPanels,
        Feature::LivingRoom,
    ];

    /// Payload key.
    pub fn key(self) -> &'static str {
        match self {
            Feature::Attic => "hasAttic",
            Feature::Garden => "hasGarden",
            Feature::AirConditioning => "hasAirConditioning",
            Feature::ArmoredDoor => "hasArmoredDoor",
            Feature::Visiophone => "hasVisiophone",
            Feature::Terrace => "hasTerrace",
            Feature::Office => "hasOffice",
            Feature::SwimmingPool => "hasSwimmingPool",
            Feature::Fireplace => "hasFireplace",
            Feature::Basement => "hasBasement",
            Feature::DressingRoom => "hasDressingRoom",
            Feature::DiningRoom => "hasDiningRoom",
            Feature::Lift => "hasLift",
            Feature::HeatPump => "hasHeatPump",
            Feature::PhotovoltaicPanels => "hasPhotovoltaicPanels",
            Feature::LivingRoom => "hasLivingRoom",
        }
    }

    /// Display label: the key without its `has` prefix, camel case split.
    pub fn label(self) -> &'static str {
        match self {
            Feature::Attic => "Attic",
            Feature::Garden => "Garden",
            Feature::AirConditioning => "Air Conditioning",
            Feature::ArmoredDoor => "Armored Door",
            Feature::Visiophone => "Visiophone",
            Feature::Terrace => "Terrace",
            Feature::Office => "Office",
            Feature::SwimmingPool => "Swimming Pool",
            Feature::Fireplace => "Fireplace",
            Feature::Basement => "Basement",
            Feature::DressingRoom => "Dressing Room",
            Feature::DiningRoom => "Dining Room",
            Feature::Lift => "Lift",
            Feature::HeatPump => "Heat Pump",
            Feature::PhotovoltaicPanels => "Photovoltaic Panels",
            Feature::LivingRoom => "Living Room",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl From<Feature> for String {
    fn from(feature: Feature) -> Self {
        feature.key().to_string()
    }
}

impl TryFrom<String> for Feature {
    type Error = String;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        Feature::from_key(&key).ok_or_else(|| format!("unknown feature key: {key}"))
    }
}
