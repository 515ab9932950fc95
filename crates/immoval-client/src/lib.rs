//! Client side of the prediction API: response classification and, with the
//! `http` feature, the reqwest transport.

pub mod response;

#[cfg(feature = "http")]
pub mod http;

pub use response::{ServerStatus, classify};

#[cfg(feature = "http")]
pub use http::{ClientConfig, ClientError, PredictionClient};
