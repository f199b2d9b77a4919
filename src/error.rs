//! Errors raised while lowering a traced graph.
//!
//! All variants except [`Error::NoConstant`] are fatal: a failure during any
//! node aborts the whole conversion. `NoConstant` is recoverable and means
//! the attribute should be treated as absent by the caller.

use crate::eval::EvalError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An input name could not be resolved in the current tensor map.
    #[error("`{0}` is not found in the tensor map")]
    MissingTensor(String),

    /// The attribute kind cannot be turned into a constant. Recoverable.
    #[error("no constant can be generated for attribute `{name}` of kind `{kind}`")]
    NoConstant { name: String, kind: String },

    /// No operator schema matched the bound input arity.
    #[error("cannot find the schema for {kind} ({output})")]
    NoMatchingSchema { kind: String, output: String },

    /// The node kind is deliberately unhandled by the active lowering.
    #[error("no lowering implemented for `{0}`")]
    Unimplemented(String),

    /// Reference evaluation failed after both calling conventions.
    #[error("reference evaluation of `{kind}` failed")]
    Eval {
        kind: String,
        #[source]
        source: EvalError,
    },
}
