#![allow(clippy::single_match)]
#![allow(clippy::too_many_arguments)]

//! `lite-lower` lowers a traced neural-network computation graph into an
//! equivalent operator graph expressed in a flat, statically shaped, quantized
//! tensor representation, as consumed by mobile inference runtimes.
//!
//! The crate is built around a per-node conversion contract: an external
//! driver walks the traced graph in topological order and hands each node to a
//! [`convert::Registry`], which resolves tensor bindings, optionally
//! materializes output values through an injected [`eval::Evaluator`], and
//! emits target operators through a structural transform library (layout
//! transposes, rank reshapes, dequantize/quantize boundaries, explicit
//! padding, quantization rescaling).
//!
//! Out of scope: model tracing and loading, the binary container writer for
//! the target format, training and differentiation.

#[macro_use]
extern crate derive_new;

pub mod convert;
pub mod error;
pub mod eval;
pub mod ir;
pub mod lite;
pub mod schema;
pub mod value;

mod logger;

pub use error::Error;
pub use logger::init_log;
