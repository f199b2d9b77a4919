//! Operator schemas and argument-name binding.
//!
//! The legacy evaluator calling convention takes keyword-bound inputs, so the
//! lowering must recover argument names from the op kind's declared schemas.
//! Binding is by arity: a schema matches when its declared argument count
//! equals the number of bound input tensors.

use crate::error::Error;
use crate::ir::Node;

/// A declared signature of an op kind.
#[derive(Debug, Clone, new)]
pub struct OpSchema {
    /// Base operator name.
    pub name: String,
    /// Overload tag, empty for the canonical signature.
    pub overload: String,
    /// Declared argument names, in call order.
    pub arguments: Vec<String>,
}

/// Ordered argument-binding table: argument name to input position.
#[derive(Debug, Clone, Default)]
pub struct ArgBindings {
    entries: Vec<(String, usize)>,
}

impl ArgBindings {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, usize)> {
        self.entries.iter()
    }

    /// Position of the input bound to `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, idx)| *idx)
    }
}

impl FromIterator<(String, usize)> for ArgBindings {
    fn from_iter<T: IntoIterator<Item = (String, usize)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Bind argument names to input positions for a node.
///
/// Overload-qualified schemas are excluded; of the remaining candidates only
/// those whose declared argument count equals `num_inputs` are kept. Zero
/// matches is fatal. Multiple matches are tolerated: the first candidate is
/// picked deterministically.
pub fn bind_arguments(
    node: &Node,
    schemas: &[OpSchema],
    num_inputs: usize,
) -> Result<ArgBindings, Error> {
    if num_inputs == 0 || node.is_structural() {
        return Ok(ArgBindings::default());
    }

    let candidates: Vec<&OpSchema> = schemas
        .iter()
        .filter(|schema| schema.overload.is_empty())
        .filter(|schema| schema.arguments.len() == num_inputs)
        .collect();

    let schema = match candidates.first() {
        Some(schema) => schema,
        None => {
            return Err(Error::NoMatchingSchema {
                kind: node.kind.clone(),
                output: node.first_output().to_string(),
            })
        }
    };
    if candidates.len() > 1 {
        log::debug!(
            "{} matches {} schemas with {} arguments, picking the first",
            node.kind,
            candidates.len(),
            num_inputs
        );
    }

    Ok(schema
        .arguments
        .iter()
        .cloned()
        .zip(0..num_inputs)
        .collect())
}
