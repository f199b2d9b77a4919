//! Source-graph intermediate representation.
//!
//! A traced graph is a topologically ordered list of [`Node`]s. Each node
//! carries an op-kind tag, ordered input/output value names, and a typed
//! attribute map. Attribute extraction turns the traced attribute set into
//! constants the lowering can consume, downcasting where the target format
//! requires it and signalling `NoConstant` for kinds it cannot represent.

use std::collections::HashMap;

use crate::error::Error;
use crate::value::TensorValue;

/// Namespace tag of graph-structural symbolic ops (control constructs, list
/// packing). These never reach the reference evaluator.
pub const STRUCTURAL_NAMESPACE: &str = "prim::";

/// A node of the traced source graph.
#[derive(Debug, Clone)]
pub struct Node {
    /// Op kind tag, e.g. `aten::relu` or `prim::ListConstruct`.
    pub kind: String,
    /// Ordered input value names.
    pub inputs: Vec<String>,
    /// Ordered output value names.
    pub outputs: Vec<String>,
    /// Attribute mapping.
    pub attrs: Attributes,
}

impl Node {
    /// Whether this node is a purely graph-structural symbolic op.
    pub fn is_structural(&self) -> bool {
        self.kind.starts_with(STRUCTURAL_NAMESPACE)
    }

    /// Name of the node's first output, used to scope auxiliary tensor names.
    pub fn first_output(&self) -> &str {
        &self.outputs[0]
    }
}

/// The type of an attribute literal.
#[derive(Debug, Clone)]
pub enum AttributeValue {
    Int64(i64),
    Float32(f32),
    String(String),
    Tensor(TensorValue),
    Int64s(Vec<i64>),
    Float32s(Vec<f32>),
    /// An attribute kind the trace could not resolve to a literal. The
    /// original kind tag is retained for diagnostics.
    Unresolved(String),
}

pub type Attributes = HashMap<String, AttributeValue>;

/// The kind tag of an [`AttributeValue`], used for expected-kind extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Int64,
    Float32,
    String,
    Tensor,
    Int64s,
    Float32s,
    Unresolved,
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeValue::Int64(_) => AttributeKind::Int64,
            AttributeValue::Float32(_) => AttributeKind::Float32,
            AttributeValue::String(_) => AttributeKind::String,
            AttributeValue::Tensor(_) => AttributeKind::Tensor,
            AttributeValue::Int64s(_) => AttributeKind::Int64s,
            AttributeValue::Float32s(_) => AttributeKind::Float32s,
            AttributeValue::Unresolved(_) => AttributeKind::Unresolved,
        }
    }

    pub fn into_i64(self) -> i64 {
        if let AttributeValue::Int64(elem) = self {
            elem
        } else {
            panic!("Expected Int64, got {self:?}");
        }
    }

    pub fn into_f32(self) -> f32 {
        if let AttributeValue::Float32(elem) = self {
            elem
        } else {
            panic!("Expected Float32, got {self:?}");
        }
    }

    pub fn into_string(self) -> String {
        if let AttributeValue::String(elem) = self {
            elem
        } else {
            panic!("Expected String, got {self:?}");
        }
    }

    pub fn into_tensor(self) -> TensorValue {
        if let AttributeValue::Tensor(elem) = self {
            elem
        } else {
            panic!("Expected Tensor, got {self:?}");
        }
    }

    pub fn into_i64s(self) -> Vec<i64> {
        if let AttributeValue::Int64s(elem) = self {
            elem
        } else {
            panic!("Expected Int64s, got {self:?}");
        }
    }

    pub fn into_f32s(self) -> Vec<f32> {
        if let AttributeValue::Float32s(elem) = self {
            elem
        } else {
            panic!("Expected Float32s, got {self:?}");
        }
    }
}

/// Extract one attribute as a constant.
///
/// Float64 tensors are downcast to float32 with a recoverable warning since
/// the target format cannot represent them. [`AttributeKind::Unresolved`]
/// kinds yield [`Error::NoConstant`], letting the caller treat the attribute
/// as absent.
pub fn extract_attr(
    node: &Node,
    name: &str,
    value: &AttributeValue,
) -> Result<AttributeValue, Error> {
    match value {
        AttributeValue::Tensor(tensor @ TensorValue::Float64(_)) => {
            log::warn!(
                "{} is of type float64, which is unsupported in the target format, \
                 trying to downcast to float32",
                node.first_output()
            );
            Ok(AttributeValue::Tensor(tensor.to_f32()))
        }
        AttributeValue::Unresolved(kind) => Err(Error::NoConstant {
            name: name.to_string(),
            kind: kind.clone(),
        }),
        other => Ok(other.clone()),
    }
}

/// Extract one attribute only when it matches the expected kind.
pub fn extract_attr_expecting(
    node: &Node,
    name: &str,
    expected: AttributeKind,
) -> Option<AttributeValue> {
    let value = node.attrs.get(name)?;
    if value.kind() != expected {
        return None;
    }
    extract_attr(node, name, value).ok()
}

/// Extract every declared attribute of a node.
///
/// Unresolvable attributes are skipped with a warning so callers see them as
/// absent.
pub fn fetch_all_attrs(node: &Node) -> Attributes {
    let mut attrs = Attributes::new();
    for (name, value) in node.attrs.iter() {
        match extract_attr(node, name, value) {
            Ok(extracted) => {
                attrs.insert(name.clone(), extracted);
            }
            Err(Error::NoConstant { kind, .. }) => {
                log::warn!(
                    "Skip unsupported constant generation for {}, type: {}",
                    node.first_output(),
                    kind
                );
            }
            Err(err) => {
                log::warn!("Skip attribute {name}: {err}");
            }
        }
    }
    attrs
}

/// Builder for traced nodes.
///
/// Tracing and model loading are outside this crate, so drivers assemble
/// nodes directly; the builder keeps that assembly readable.
#[derive(Debug, Default)]
pub struct NodeBuilder {
    kind: String,
    inputs: Vec<String>,
    outputs: Vec<String>,
    attrs: Attributes,
}

impl NodeBuilder {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..Default::default()
        }
    }

    pub fn input(mut self, name: &str) -> Self {
        self.inputs.push(name.to_string());
        self
    }

    pub fn output(mut self, name: &str) -> Self {
        self.outputs.push(name.to_string());
        self
    }

    pub fn attr_int(mut self, name: &str, value: i64) -> Self {
        self.attrs
            .insert(name.to_string(), AttributeValue::Int64(value));
        self
    }

    pub fn attr_float(mut self, name: &str, value: f32) -> Self {
        self.attrs
            .insert(name.to_string(), AttributeValue::Float32(value));
        self
    }

    pub fn attr_string(mut self, name: &str, value: &str) -> Self {
        self.attrs
            .insert(name.to_string(), AttributeValue::String(value.to_string()));
        self
    }

    pub fn attr_ints(mut self, name: &str, value: Vec<i64>) -> Self {
        self.attrs
            .insert(name.to_string(), AttributeValue::Int64s(value));
        self
    }

    pub fn attr_floats(mut self, name: &str, value: Vec<f32>) -> Self {
        self.attrs
            .insert(name.to_string(), AttributeValue::Float32s(value));
        self
    }

    pub fn attr_tensor(mut self, name: &str, value: TensorValue) -> Self {
        self.attrs
            .insert(name.to_string(), AttributeValue::Tensor(value));
        self
    }

    pub fn attr_unresolved(mut self, name: &str, kind: &str) -> Self {
        self.attrs
            .insert(name.to_string(), AttributeValue::Unresolved(kind.to_string()));
        self
    }

    pub fn build(self) -> Node {
        Node {
            kind: self.kind,
            inputs: self.inputs,
            outputs: self.outputs,
            attrs: self.attrs,
        }
    }
}
