//! Error types for parameter validation.
//!
//! The diffing core itself is total: decoration, vectorization, and
//! matching cannot fail on well-typed inputs. The only fallible
//! surface is the validated construction of [`crate::DiffParams`].
//!
//! When the `diagnostics` feature is enabled, errors implement
//! [`miette::Diagnostic`] for rich reporting.

use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Invalid pipeline parameters.
#[derive(Debug, Error, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ParamError {
    #[error("feature dimension must be at least 1")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(cambium::zero_dimension)))]
    ZeroDimension,
}
