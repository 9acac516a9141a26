// src/params/mod.rs

//! Launch parameters.
//!
//! - [`value`]: the scalar [`ParameterValue`].
//! - [`set`]: the immutable, ordered [`ParameterSet`] and its builder.
//! - [`shared`]: [`SharedConfig`], the knobs several processes must agree on.
//! - [`resolver`]: [`ParameterResolver`], which derives every role's set from
//!   one `SharedConfig`.

pub mod resolver;
pub mod set;
pub mod shared;
pub mod value;

pub use resolver::{names, ParameterResolver, ResolvedParameters, SHARED_PARAMETERS};
pub use set::{ParameterSet, ParameterSetBuilder};
pub use shared::SharedConfig;
pub use value::ParameterValue;
