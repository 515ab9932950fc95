//! Outcome of a single submission to the prediction API.

/// What came back from one submission attempt. Exactly one variant applies.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome {
    /// 2xx with a usable prediction.
    Success {
        predicted_price: f64,
    },
    /// 422: the server rejected the payload schema.
    ValidationError {
        violations: Vec<SchemaViolation>,
    },
    /// 500, an unexpected status, or an unusable body.
    ServerError {
        message: String,
    },
    /// No response was obtained (refused, timed out, DNS failure).
    TransportError {
        cause: String,
    },
}

impl ApiOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ApiOutcome::Success { .. })
    }

    /// Short variant name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiOutcome::Success { .. } => "success",
            ApiOutcome::ValidationError { .. } => "validation_error",
            ApiOutcome::ServerError { .. } => "server_error",
            ApiOutcome::TransportError { .. } => "transport_error",
        }
    }
}

/// One server-reported schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Location path, e.g. `["body", "data", "province"]`.
    pub loc: Vec<String>,
    pub message: String,
}

impl SchemaViolation {
    /// The offending field, when the path is deep enough to name one.
    pub fn field(&self) -> Option<&str> {
        if self.loc.len() > 2 {
            Some(&self.loc[2])
        } else {
            None
        }
    }
}
