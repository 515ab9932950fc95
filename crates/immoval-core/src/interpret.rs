//! Turn an [`ApiOutcome`] into messages a front end can show as-is.

use crate::outcome::{ApiOutcome, SchemaViolation};

pub const CURRENCY_SYMBOL: &str = "€";

const VALUE_ERROR_PREFIX: &str = "Value error,";

/// Caller-facing rendering of an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    /// Predicted price, e.g. `€345,000.50`.
    Price {
        formatted: String,
    },
    /// One message per server-reported violation, in server order.
    Violations {
        messages: Vec<String>,
    },
    ServerFailure {
        message: String,
    },
    Unreachable {
        message: String,
    },
}

impl Summary {
    pub fn is_success(&self) -> bool {
        matches!(self, Summary::Price { .. })
    }

    pub fn messages(&self) -> Vec<&str> {
        match self {
            Summary::Price { formatted } => vec![formatted.as_str()],
            Summary::Violations { messages } => messages.iter().map(String::as_str).collect(),
            Summary::ServerFailure { message } | Summary::Unreachable { message } => {
                vec![message.as_str()]
            }
        }
    }
}

pub fn interpret(outcome: &ApiOutcome) -> Summary {
    match outcome {
        ApiOutcome::Success { predicted_price } => Summary::Price {
            formatted: format_price(*predicted_price),
        },
        ApiOutcome::ValidationError { violations } => Summary::Violations {
            messages: violations.iter().map(violation_message).collect(),
        },
        ApiOutcome::ServerError { message } => Summary::ServerFailure {
            message: message.clone(),
        },
        ApiOutcome::TransportError { cause } => Summary::Unreachable {
            message: format!("could not reach the prediction service: {cause}"),
        },
    }
}

/// `"<field>: <message>"` when the path names a field, else the bare message.
/// A leading `Value error,` is dropped in both cases.
pub fn violation_message(violation: &SchemaViolation) -> String {
    let message = violation
        .message
        .strip_prefix(VALUE_ERROR_PREFIX)
        .map(str::trim_start)
        .unwrap_or(violation.message.as_str());
    match violation.field() {
        Some(field) => format!("{field}: {message}"),
        None => message.to_string(),
    }
}

/// Two decimals, comma thousands separators, leading euro sign.
///
/// Rounds through the float's own decimal expansion, so magnitudes beyond
/// `u64` keep every digit.
pub fn format_price(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let nonzero = fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));
    let sign = if value < 0.0 && nonzero { "-" } else { "" };
    format!("{sign}{CURRENCY_SYMBOL}{grouped}.{frac}")
}
