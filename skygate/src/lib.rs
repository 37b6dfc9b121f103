//! Shared night-sky admissibility gate.
//!
//! Contains the luminance sampler, the threshold gate, and the wire types
//! exchanged between the upload client and the analysis server. The client
//! pre-check and the server re-check both compile this crate, so the two
//! call sites can never drift apart on policy. Everything here must stay
//! WASM-compatible.

pub mod gate;
pub mod luminance;
mod types;

pub use gate::{gate_image_bytes, GateDecision, GateError};
pub use luminance::{LuminanceStats, SampleError};
pub use types::{Constellation, Star};
