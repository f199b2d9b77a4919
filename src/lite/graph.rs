//! Target-graph builder.

use std::collections::HashMap;

use super::{Operator, Tensor};

/// Accumulates the lowered operator graph.
///
/// The lowering core only reads from the tensor map and appends operators;
/// it never removes. Serialization into the binary container format is a
/// separate concern outside this crate.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    /// Bindings registered so far, by name.
    pub tensor_map: HashMap<String, Tensor>,
    /// Operators in emission order.
    pub operators: Vec<Operator>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.tensor_map.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tensor_map.contains_key(name)
    }

    /// Append an operator, registering its outputs in the tensor map so later
    /// nodes can resolve them by name.
    pub fn add_operator(&mut self, op: Operator) {
        for tensor in op.outputs.iter() {
            self.tensor_map.insert(tensor.name.clone(), tensor.clone());
        }
        self.operators.push(op);
    }
}
