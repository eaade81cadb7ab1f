//! Mathscribe Core Library
//!
//! Recognition pipeline for handwritten math: image normalisation, prompt
//! construction, the generative model client and response parsing.

pub mod calculator;
pub mod error;

pub use error::{CalcError, CalcResult};
