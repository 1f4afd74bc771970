//! nq-core: stable foundation for neurouq.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - interpolate (piecewise-linear interpolants for result alignment)
//! - error (shared error types)

pub mod error;
pub mod interpolate;
pub mod numeric;

pub use error::{CoreError, CoreResult};
pub use interpolate::Interpolant;
pub use numeric::*;
