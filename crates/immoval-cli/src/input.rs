//! `predict` arguments → [`RawPropertyInput`].
//!
//! Categorical labels, whether given as flags or in the input file, are
//! matched case-insensitively against the vocabulary tables and stored in the
//! table's own spelling. The subtype must belong to the chosen type. Only known
//! labels ever reach the normaliser.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Args;
use immoval_core::{Feature, PropertyType, RawPropertyInput, Vocabulary, subtypes_for};

#[derive(Args, Debug, Default)]
pub struct PredictArgs {
    /// JSON file with raw property input; flags below override its fields.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Property type (Apartment, House).
    #[arg(long = "type", value_parser = label_parser(Vocabulary::PropertyType))]
    pub property_type: Option<String>,

    /// Detailed subtype, e.g. "Ground Floor".
    #[arg(long, value_parser = label_parser(Vocabulary::Subtype))]
    pub subtype: Option<String>,

    #[arg(long, value_parser = label_parser(Vocabulary::Province))]
    pub province: Option<String>,

    #[arg(long)]
    pub postcode: Option<i64>,

    /// EPC score (A+ through G).
    #[arg(long, value_parser = label_parser(Vocabulary::EpcScore))]
    pub epc: Option<String>,

    /// Habitable surface in m².
    #[arg(long)]
    pub habitable_surface: Option<f64>,

    #[arg(long)]
    pub terrace_surface: Option<f64>,

    #[arg(long)]
    pub garden_surface: Option<f64>,

    #[arg(long)]
    pub bedrooms: Option<u32>,

    #[arg(long)]
    pub bathrooms: Option<u32>,

    #[arg(long)]
    pub toilets: Option<u32>,

    /// Amenity, by key (hasLift) or label ("Swimming Pool"). Repeatable.
    #[arg(long = "feature", value_parser = parse_feature)]
    pub features: Vec<Feature>,
}

impl PredictArgs {
    /// Merge the optional JSON file with the inline flags, then canonicalise
    /// the categorical labels of the result.
    pub fn into_raw(self) -> anyhow::Result<RawPropertyInput> {
        let mut raw = match &self.input {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str::<RawPropertyInput>(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => RawPropertyInput::default(),
        };

        override_with(&mut raw.property_type, self.property_type);
        override_with(&mut raw.subtype, self.subtype);
        override_with(&mut raw.province, self.province);
        override_with(&mut raw.post_code, self.postcode);
        override_with(&mut raw.epc_score, self.epc);
        override_with(&mut raw.habitable_surface, self.habitable_surface);
        override_with(&mut raw.terrace_surface, self.terrace_surface);
        override_with(&mut raw.garden_surface, self.garden_surface);
        override_with(&mut raw.bedroom_count, self.bedrooms);
        override_with(&mut raw.bathroom_count, self.bathrooms);
        override_with(&mut raw.toilet_count, self.toilets);
        raw.features.extend(self.features);

        canonicalize(Vocabulary::PropertyType, &mut raw.property_type)?;
        canonicalize(Vocabulary::Subtype, &mut raw.subtype)?;
        canonicalize(Vocabulary::Province, &mut raw.province)?;
        canonicalize(Vocabulary::EpcScore, &mut raw.epc_score)?;
        check_subtype(&raw)?;

        Ok(raw)
    }
}

fn override_with<T>(field: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *field = value;
    }
}

fn canonicalize(vocabulary: Vocabulary, field: &mut Option<String>) -> anyhow::Result<()> {
    if let Some(value) = field.as_deref() {
        let label = vocabulary
            .match_label(value)
            .ok_or_else(|| anyhow::Error::msg(unknown_label(vocabulary, value)))?;
        *field = Some(label.to_string());
    }
    Ok(())
}

/// Expects canonical labels.
fn check_subtype(raw: &RawPropertyInput) -> anyhow::Result<()> {
    let (Some(ty), Some(subtype)) = (&raw.property_type, &raw.subtype) else {
        return Ok(());
    };
    let ty = PropertyType::from_label(ty)?;
    let allowed = subtypes_for(ty);
    if !allowed.iter().any(|s| *s == subtype.as_str()) {
        bail!(
            "subtype {subtype:?} does not belong to {}; expected one of: {}",
            ty.label(),
            allowed.join(", ")
        );
    }
    Ok(())
}

fn unknown_label(vocabulary: Vocabulary, input: &str) -> String {
    format!(
        "unknown {vocabulary} {input:?}; expected one of: {}",
        vocabulary.labels().join(", ")
    )
}

fn label_parser(
    vocabulary: Vocabulary,
) -> impl Fn(&str) -> Result<String, String> + Clone + Send + Sync + 'static {
    move |input| {
        vocabulary
            .match_label(input)
            .map(str::to_string)
            .ok_or_else(|| unknown_label(vocabulary, input))
    }
}

fn parse_feature(input: &str) -> Result<Feature, String> {
    let wanted = input.trim().replace(' ', "");
    Feature::ALL
        .into_iter()
        .find(|f| {
            f.key().eq_ignore_ascii_case(&wanted)
                || f.label().replace(' ', "").eq_ignore_ascii_case(&wanted)
        })
        .ok_or_else(|| format!("unknown feature {input:?}"))
}
