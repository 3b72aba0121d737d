//! Centralized error types for the Scry core library.
//!
//! Connection-gating failures are classified here and converted into the
//! machine's active error; they are never propagated to callers as `Err`.
//! Fallback-resolution failures live next to the resolver in
//! [`crate::assets`] and are re-exported from the crate root.

use thiserror::Error;

use crate::assets::ResolutionError;

/// Trait for error types that provide machine-readable error codes.
///
/// Implement this trait to provide consistent error codes across the
/// different failure paths that end up in serialized events.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;
}

/// Why a connect attempt was rejected.
///
/// The display strings are the user-facing messages; they are wrapped in the
/// `"An error occurred: "` prefix when they become the active error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// The submitted URL does not start with `http://` or `https://`.
    #[error("Please enter a valid URL")]
    InvalidUrl,

    /// The probe could not get a 2xx response from the URL.
    #[error("The provided URL is not valid or the stream is down")]
    Unreachable,
}

impl ErrorCode for ConnectError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::Unreachable => "stream_unreachable",
        }
    }
}

impl ErrorCode for ResolutionError {
    fn code(&self) -> &'static str {
        match self {
            Self::Empty => "asset_dir_empty",
            Self::Io(_) => "asset_listing_failed",
        }
    }
}
