//! Terminal rendering for the `immoval` commands.
//!
//! Everything returns a `String` so the layout can be checked in tests;
//! `main` decides where it goes.

use std::fmt::{Display, Write};

use immoval_core::{Feature, FieldViolation, PropertyType, RawPropertyInput, Summary, Vocabulary};
use immoval_geo::{GeoCoordinate, LoadSummary};

use crate::pipeline::{LocationLookup, ValuationReport};

const LABEL_WIDTH: usize = 18;

// ── Selection ──

/// The "Your Selection" card echoed before submitting.
pub fn render_selection(raw: &RawPropertyInput) -> String {
    let mut out = String::from("Your Selection\n");
    row(&mut out, "Type", raw.property_type.as_deref());
    row(&mut out, "Subtype", raw.subtype.as_deref());
    row(&mut out, "Province", raw.province.as_deref());
    row(&mut out, "Postcode", raw.post_code);
    row(&mut out, "EPC score", raw.epc_score.as_deref());
    row(&mut out, "Habitable surface", area(raw.habitable_surface));
    row(&mut out, "Terrace surface", area(raw.terrace_surface));
    row(&mut out, "Garden surface", area(raw.garden_surface));
    row(&mut out, "Bedrooms", raw.bedroom_count);
    row(&mut out, "Bathrooms", raw.bathroom_count);
    row(&mut out, "Toilets", raw.toilet_count);

    let features = if raw.features.is_empty() {
        "none".to_string()
    } else {
        raw.features
            .iter()
            .map(|f| f.label())
            .collect::<Vec<_>>()
            .join(", ")
    };
    row(&mut out, "Features", Some(&features));
    out
}

fn row<T: Display>(out: &mut String, label: &str, value: Option<T>) {
    match value {
        Some(value) => pair(out, label, value),
        None => pair(out, label, "-"),
    }
}

fn pair(out: &mut String, left: &str, right: impl Display) {
    let _ = writeln!(out, "  {left:<LABEL_WIDTH$} {right}");
}

fn area(value: Option<f64>) -> Option<String> {
    value.map(|v| format!("{v} m²"))
}

// ── Report ──

pub fn render_report(report: &ValuationReport) -> String {
    let mut out = String::new();
    match report {
        ValuationReport::Rejected { violations } => {
            out.push_str("Not submitted: please fill in all required fields\n");
            for violation in violations {
                let _ = writeln!(out, "  - {}", violation_line(violation));
            }
        }
        ValuationReport::Submitted(submission) => {
            render_summary(&mut out, &submission.summary);
            if let Some(location) = &submission.location {
                out.push_str(&render_location(location));
            }
        }
    }
    out
}

fn violation_line(violation: &FieldViolation) -> String {
    match violation {
        FieldViolation::Missing(field) => format!("{} is required", field.name()),
        FieldViolation::OutOfRange { .. } => violation.to_string(),
    }
}

fn render_summary(out: &mut String, summary: &Summary) {
    match summary {
        Summary::Price { formatted } => {
            let _ = writeln!(out, "Estimated price: {formatted}");
        }
        Summary::Violations { messages } => {
            out.push_str("The prediction service rejected the request:\n");
            for message in messages {
                let _ = writeln!(out, "  - {message}");
            }
        }
        Summary::ServerFailure { message } => {
            let _ = writeln!(out, "Prediction failed: {message}");
        }
        Summary::Unreachable { message } => {
            let _ = writeln!(out, "Error: {message}");
        }
    }
}

pub fn render_location(location: &LocationLookup) -> String {
    match location {
        LocationLookup::Found {
            postcode,
            coordinate,
        } => format!("Location {postcode}: {}\n", coordinate_text(coordinate)),
        LocationLookup::NotFound { postcode } => {
            format!("Warning: no coordinates found for postcode {postcode}\n")
        }
        LocationLookup::Unavailable { postcode, reason } => {
            format!("Warning: cannot locate postcode {postcode}: {reason}\n")
        }
    }
}

fn coordinate_text(coordinate: &GeoCoordinate) -> String {
    format!("{:.5}, {:.5}", coordinate.latitude, coordinate.longitude)
}

// ── Diagnostics ──

pub fn render_load_summary(summary: &LoadSummary) -> String {
    let mut out = String::new();
    pair(&mut out, "Rows read", summary.rows);
    pair(&mut out, "Rows skipped", summary.skipped);
    pair(&mut out, "Postcodes", summary.postcodes);
    out
}

pub fn render_vocab() -> String {
    let mut out = String::new();
    out.push_str("Property types\n");
    for ty in PropertyType::ALL {
        pair(&mut out, ty.label(), ty.token());
    }

    for ty in PropertyType::ALL {
        let _ = writeln!(out, "\n{} subtypes", ty.label());
        list(&mut out, ty.subtypes());
    }

    let tables = [
        ("Provinces", Vocabulary::Province),
        ("EPC scores", Vocabulary::EpcScore),
    ];
    for (header, vocabulary) in tables {
        let _ = writeln!(out, "\n{header}");
        list(&mut out, &vocabulary.labels());
    }

    out.push_str("\nFeatures\n");
    for feature in Feature::ALL {
        pair(&mut out, feature.label(), feature.key());
    }
    out
}

fn list(out: &mut String, labels: &[&str]) {
    for label in labels {
        let _ = writeln!(out, "  {label}");
    }
}
