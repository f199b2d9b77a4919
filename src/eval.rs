//! Reference-evaluator capability interface.
//!
//! Shape, dtype and value inference is done by actually executing the
//! original op semantics on the concrete input values. The runtime doing that
//! execution is injected behind the [`Evaluator`] trait so the lowering
//! engine can be driven by a deterministic fake in tests.
//!
//! Two calling conventions are supported: modern positional invocation, and a
//! legacy convention that binds inputs to schema argument names. When the
//! positional form reports an unsupported signature, execution falls back to
//! the name-bound form. One quirk is preserved from the runtimes this was
//! built against: if the name-bound call fails for an op expecting a
//! non-default `device` argument, it is retried once with the canonical
//! default device before giving up. This single substitution is deliberately
//! not generalized to other keyword arguments.

use crate::error::Error;
use crate::ir::Node;
use crate::schema::{bind_arguments, OpSchema};
use crate::value::TensorValue;

/// Canonical default device substituted in the retry path.
pub const DEFAULT_DEVICE: i64 = 0;

const DEVICE_ARG: &str = "device";

/// Errors surfaced by an [`Evaluator`] implementation.
#[derive(thiserror::Error, Debug)]
pub enum EvalError {
    /// The calling convention does not fit the op's signature.
    #[error("unsupported signature")]
    UnsupportedSignature,

    /// Execution was attempted and failed.
    #[error("{0}")]
    Failed(String),
}

/// Executes original op semantics on concrete tensors.
pub trait Evaluator {
    /// Positional invocation: one input value per positional argument.
    fn execute(&self, kind: &str, inputs: &[TensorValue]) -> Result<Vec<TensorValue>, EvalError>;

    /// Legacy name-bound invocation.
    fn execute_named(
        &self,
        kind: &str,
        inputs: &[(String, TensorValue)],
    ) -> Result<Vec<TensorValue>, EvalError>;

    /// Declared schemas for an op kind.
    fn schemas(&self, kind: &str) -> Vec<OpSchema>;
}

/// Execute a node's op, trying the positional convention first and falling
/// back to the legacy name-bound convention.
pub fn execute_with_fallback(
    evaluator: &dyn Evaluator,
    node: &Node,
    inputs: &[TensorValue],
) -> Result<Vec<TensorValue>, Error> {
    match evaluator.execute(&node.kind, inputs) {
        Ok(outputs) => return Ok(outputs),
        Err(EvalError::UnsupportedSignature) => {
            log::debug!("{} has no positional signature, binding by name", node.kind);
        }
        Err(source) => {
            return Err(Error::Eval {
                kind: node.kind.clone(),
                source,
            })
        }
    }

    let bindings = bind_arguments(node, &evaluator.schemas(&node.kind), inputs.len())?;
    let named: Vec<(String, TensorValue)> = bindings
        .iter()
        .map(|(name, idx)| (name.clone(), inputs[*idx].clone()))
        .collect();

    match evaluator.execute_named(&node.kind, &named) {
        Ok(outputs) => Ok(outputs),
        Err(source) => {
            let device = named.iter().position(|(name, _)| name == DEVICE_ARG);
            match device {
                Some(idx) => {
                    let mut retry = named;
                    retry[idx].1 = TensorValue::scalar_i64(DEFAULT_DEVICE);
                    evaluator
                        .execute_named(&node.kind, &retry)
                        .map_err(|source| Error::Eval {
                            kind: node.kind.clone(),
                            source,
                        })
                }
                None => Err(Error::Eval {
                    kind: node.kind.clone(),
                    source,
                }),
            }
        }
    }
}
