//! Per-node conversion contract.
//!
//! A [`NodeConverter`] is transient: built for one node, it resolves the
//! node's input values from the driver-supplied tensor map, optionally
//! materializes output values through the reference evaluator, emits target
//! operators, and is discarded. No state crosses nodes except through the
//! [`GraphBuilder`] being written into, so auxiliary-tensor naming counters
//! are private per instance and cannot race.
//!
//! Dispatch is an explicit registration table from op-kind tag to a
//! [`Lowering`] factory, populated at process start. Two terminal lowerings
//! are built in: opaque-execute (reference run only, for ops intentionally
//! left unconverted) and structural (graph-structural symbolic ops that never
//! reach the evaluator).

mod quantize;
mod transform;

pub use quantize::*;
pub use transform::*;

use std::collections::HashMap;

use crate::error::Error;
use crate::eval::{execute_with_fallback, Evaluator};
use crate::ir::{fetch_all_attrs, Attributes, Node, STRUCTURAL_NAMESPACE};
use crate::lite::{FakeQuantValue, GraphBuilder, Operator, Quantization, Tensor};
use crate::schema::{bind_arguments, ArgBindings};
use crate::value::TensorValue;

/// Buffer-flag policy for [`NodeConverter::to_lite_tensors`].
#[derive(Debug, Clone)]
pub enum BufferSpec {
    /// Reuse existing graph bindings by name; create the rest with the
    /// `missing_as_buffer` default.
    Infer,
    /// Force the same flag on every binding.
    All(bool),
    /// Force a per-binding flag.
    Each(Vec<bool>),
}

/// Transient per-node lowering state.
#[derive(Debug)]
pub struct NodeConverter {
    input_names: Vec<String>,
    output_names: Vec<String>,
    input_values: Vec<TensorValue>,
    output_values: Vec<TensorValue>,
    ops: Vec<Operator>,
    attr_count: usize,
    transform_count: usize,
    asymmetric: bool,
}

impl NodeConverter {
    /// Build the converter for a node, resolving every input name in the
    /// current tensor map. Unresolvable names are fatal.
    pub fn new(
        node: &Node,
        tensor_map: &HashMap<String, TensorValue>,
        asymmetric: bool,
    ) -> Result<Self, Error> {
        let input_values = node
            .inputs
            .iter()
            .map(|name| {
                tensor_map
                    .get(name)
                    .cloned()
                    .ok_or_else(|| Error::MissingTensor(name.clone()))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Self {
            input_names: node.inputs.clone(),
            output_names: node.outputs.clone(),
            input_values,
            output_values: Vec::new(),
            ops: Vec::new(),
            attr_count: 0,
            transform_count: 0,
            asymmetric,
        })
    }

    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    pub fn input_values(&self) -> &[TensorValue] {
        &self.input_values
    }

    pub fn output_values(&self) -> &[TensorValue] {
        &self.output_values
    }

    pub fn num_inputs(&self) -> usize {
        self.input_values.len()
    }

    /// Whether scalar quantization uses the asymmetric (unsigned, nonzero
    /// zero-point) mode.
    pub fn asymmetric(&self) -> bool {
        self.asymmetric
    }

    /// Record output values directly. Structural lowerings use this since
    /// they never invoke the reference evaluator.
    pub fn set_output_values(&mut self, values: Vec<TensorValue>) {
        self.output_values = values;
    }

    /// Materialize this node's outputs by reference execution.
    pub fn run(&mut self, node: &Node, evaluator: &dyn Evaluator) -> Result<(), Error> {
        let outputs = execute_with_fallback(evaluator, node, &self.input_values)?;
        self.output_values.extend(outputs);
        debug_assert_eq!(
            self.output_values.len(),
            self.output_names.len(),
            "reference run must produce one value per declared output"
        );
        Ok(())
    }

    fn unique_attr_name(&mut self) -> String {
        let name = if self.attr_count == 0 {
            format!("{}_attr", self.output_names[0])
        } else {
            format!("{}_attr_{}", self.output_names[0], self.attr_count)
        };
        self.attr_count += 1;
        name
    }

    fn unique_transform_name(&mut self) -> String {
        let name = if self.transform_count == 0 {
            format!("{}_transform", self.output_names[0])
        } else {
            format!("{}_transform_{}", self.output_names[0], self.transform_count)
        };
        self.transform_count += 1;
        name
    }

    /// Buffer-backed auxiliary tensor holding a literal parameter.
    pub fn create_attr_tensor(&mut self, value: TensorValue) -> Tensor {
        let name = self.unique_attr_name();
        Tensor::new(value, &name, true)
    }

    /// Buffer-backed auxiliary tensor carrying quantized data.
    pub fn create_quantized_attr_tensor(&mut self, value: FakeQuantValue) -> Tensor {
        let name = self.unique_attr_name();
        let quantization = value.quantization();
        Tensor::new(value.value, &name, true).with_quantization(Some(quantization))
    }

    /// Computed auxiliary tensor produced by an inserted transform op.
    pub fn create_transform_tensor(
        &mut self,
        value: TensorValue,
        quantization: Option<Quantization>,
    ) -> Tensor {
        let name = self.unique_transform_name();
        Tensor::new(value, &name, false).with_quantization(quantization)
    }

    /// Find the binding registered for input `idx`, or materialize a
    /// buffer-backed binding from its concrete value.
    pub fn find_or_create_input(&self, idx: usize, graph: &GraphBuilder) -> Tensor {
        let name = &self.input_names[idx];
        if let Some(tensor) = graph.get(name) {
            return tensor.clone();
        }
        Tensor::new(self.input_values[idx].clone(), name, true)
    }

    /// Produce bindings for a list of names and values.
    pub fn to_lite_tensors(
        &self,
        names: &[String],
        values: &[TensorValue],
        spec: &BufferSpec,
        graph: Option<&GraphBuilder>,
        missing_as_buffer: bool,
    ) -> Vec<Tensor> {
        assert_eq!(names.len(), values.len());
        let flags: Vec<Option<bool>> = match spec {
            BufferSpec::Infer => vec![None; names.len()],
            BufferSpec::All(flag) => vec![Some(*flag); names.len()],
            BufferSpec::Each(flags) => {
                assert_eq!(flags.len(), names.len());
                flags.iter().copied().map(Some).collect()
            }
        };

        names
            .iter()
            .zip(values.iter())
            .zip(flags)
            .map(|((name, value), flag)| match flag {
                Some(has_buffer) => Tensor::new(value.clone(), name, has_buffer),
                None => match graph.and_then(|g| g.get(name)) {
                    Some(tensor) => tensor.clone(),
                    None => Tensor::new(value.clone(), name, missing_as_buffer),
                },
            })
            .collect()
    }

    /// Bindings for all declared outputs of this node.
    pub fn output_tensors(&self) -> Vec<Tensor> {
        self.to_lite_tensors(
            &self.output_names,
            &self.output_values,
            &BufferSpec::Infer,
            None,
            false,
        )
    }

    /// Stage an operator for emission after `parse` returns.
    pub fn emit(&mut self, op: Operator) {
        self.ops.push(op);
    }

    /// Stage a sequence of operators in order.
    pub fn emit_all(&mut self, ops: Vec<Operator>) {
        self.ops.extend(ops);
    }

    pub fn take_ops(&mut self) -> Vec<Operator> {
        std::mem::take(&mut self.ops)
    }

    fn into_outputs(self) -> Vec<(String, TensorValue)> {
        self.output_names
            .into_iter()
            .zip(self.output_values)
            .collect()
    }

    /// Surface the full node context for diagnosis, then fail.
    pub fn unimplemented(&self, node: &Node, attrs: &Attributes, args: &ArgBindings) -> Error {
        log::debug!("node: {node:?}");
        log::debug!("inputs:");
        for (name, value) in self.input_names.iter().zip(self.input_values.iter()) {
            log::debug!("name: {name}");
            log::debug!("tensor: {value:?}");
            log::debug!("shape: {:?}", value.shape());
            log::debug!("dtype: {}", value.elem_type());
            log::debug!("{}", "-".repeat(60));
        }
        log::debug!("outputs:");
        for (name, value) in self.output_names.iter().zip(self.output_values.iter()) {
            log::debug!("name: {name}");
            log::debug!("tensor: {value:?}");
            log::debug!("shape: {:?}", value.shape());
            log::debug!("dtype: {}", value.elem_type());
            log::debug!("{}", "-".repeat(60));
        }
        log::debug!("attrs: {attrs:?}");
        log::debug!("args: {args:?}");
        Error::Unimplemented(node.kind.clone())
    }
}

/// One op-kind lowering unit.
pub trait Lowering {
    /// Whether output values are materialized through the reference
    /// evaluator before `parse` runs.
    fn runs_reference(&self) -> bool {
        true
    }

    /// Emit zero or more target operators for the node.
    fn parse(
        &self,
        cx: &mut NodeConverter,
        node: &Node,
        attrs: &Attributes,
        args: &ArgBindings,
        graph: &mut GraphBuilder,
    ) -> Result<(), Error>;
}

/// Opaque-execute lowering: runs the reference evaluator to record outputs
/// and emits no target op. A placeholder for ops intentionally left
/// unconverted, to be eliminated or specially handled downstream.
pub struct ExecuteLowering;

impl Lowering for ExecuteLowering {
    fn parse(
        &self,
        _cx: &mut NodeConverter,
        _node: &Node,
        _attrs: &Attributes,
        _args: &ArgBindings,
        _graph: &mut GraphBuilder,
    ) -> Result<(), Error> {
        Ok(())
    }
}

/// Lowering for purely graph-structural symbolic ops (control constructs).
/// Never invokes the reference evaluator.
pub struct StructuralLowering;

impl Lowering for StructuralLowering {
    fn runs_reference(&self) -> bool {
        false
    }

    fn parse(
        &self,
        _cx: &mut NodeConverter,
        _node: &Node,
        _attrs: &Attributes,
        _args: &ArgBindings,
        _graph: &mut GraphBuilder,
    ) -> Result<(), Error> {
        Ok(())
    }
}

/// Factory producing a lowering unit for one node.
pub type LoweringFactory = fn() -> Box<dyn Lowering>;

/// Graph-structural kinds registered by default.
const STRUCTURAL_KINDS: [&str; 8] = [
    "prim::Constant",
    "prim::GetAttr",
    "prim::If",
    "prim::ListConstruct",
    "prim::ListUnpack",
    "prim::Loop",
    "prim::TupleConstruct",
    "prim::TupleUnpack",
];

/// Explicit registration table from op-kind tag to lowering factory.
pub struct Registry {
    table: HashMap<String, LoweringFactory>,
    asymmetric: bool,
}

impl Registry {
    /// Registry with the built-in structural kinds registered. Unregistered
    /// kinds fall back to structural or opaque-execute by namespace.
    pub fn new(asymmetric: bool) -> Self {
        let mut registry = Self {
            table: HashMap::new(),
            asymmetric,
        };
        for kind in STRUCTURAL_KINDS {
            registry.register(kind, || Box::new(StructuralLowering));
        }
        registry
    }

    pub fn register(&mut self, kind: &str, factory: LoweringFactory) {
        self.table.insert(kind.to_string(), factory);
    }

    /// Resolve the lowering factory for an op kind.
    pub fn factory(&self, kind: &str) -> LoweringFactory {
        if let Some(factory) = self.table.get(kind) {
            return *factory;
        }
        if kind.starts_with(STRUCTURAL_NAMESPACE) {
            || Box::new(StructuralLowering)
        } else {
            || Box::new(ExecuteLowering)
        }
    }

    /// Drive one node end to end: build the converter, extract attributes,
    /// bind arguments, materialize outputs, parse, and append the emitted
    /// operators to the graph.
    ///
    /// Returns the node's named output values so the driver can extend its
    /// tensor map. Any failure aborts the conversion.
    pub fn lower_node(
        &self,
        node: &Node,
        tensor_map: &HashMap<String, TensorValue>,
        evaluator: &dyn Evaluator,
        graph: &mut GraphBuilder,
    ) -> Result<Vec<(String, TensorValue)>, Error> {
        let lowering = (self.factory(&node.kind))();
        let mut cx = NodeConverter::new(node, tensor_map, self.asymmetric)?;

        let attrs = fetch_all_attrs(node);
        let args = if node.is_structural() || cx.num_inputs() == 0 {
            ArgBindings::default()
        } else {
            bind_arguments(node, &evaluator.schemas(&node.kind), cx.num_inputs())?
        };

        if lowering.runs_reference() {
            cx.run(node, evaluator)?;
        }
        lowering.parse(&mut cx, node, &attrs, &args, graph)?;

        for op in cx.take_ops() {
            graph.add_operator(op);
        }
        Ok(cx.into_outputs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::NodeBuilder;
    use crate::value::TensorValue;

    fn converter_for(node: &Node) -> NodeConverter {
        let mut tensor_map = HashMap::new();
        for name in node.inputs.iter() {
            tensor_map.insert(name.clone(), TensorValue::f32s(&[1.0]));
        }
        NodeConverter::new(node, &tensor_map, true).unwrap()
    }

    #[test]
    fn unique_names_are_scoped_to_the_first_output() {
        let node = NodeBuilder::new("aten::relu").input("x").output("relu1").build();
        let mut cx = converter_for(&node);

        let first = cx.create_attr_tensor(TensorValue::i32s(&[0]));
        let second = cx.create_attr_tensor(TensorValue::i32s(&[1]));
        let third = cx.create_attr_tensor(TensorValue::i32s(&[2]));
        assert_eq!(first.name, "relu1_attr");
        assert_eq!(second.name, "relu1_attr_1");
        assert_eq!(third.name, "relu1_attr_2");

        let transform = cx.create_transform_tensor(TensorValue::f32s(&[0.0]), None);
        let transform_1 = cx.create_transform_tensor(TensorValue::f32s(&[0.0]), None);
        assert_eq!(transform.name, "relu1_transform");
        assert_eq!(transform_1.name, "relu1_transform_1");
    }

    #[test]
    fn consecutive_names_are_distinct() {
        let node = NodeBuilder::new("aten::relu").input("x").output("out").build();
        let mut cx = converter_for(&node);

        let mut names: Vec<String> = (0..8)
            .map(|_| cx.create_attr_tensor(TensorValue::i32s(&[0])).name)
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 8);
    }

    #[test]
    fn missing_input_is_fatal() {
        let node = NodeBuilder::new("aten::relu").input("ghost").output("out").build();
        let err = NodeConverter::new(&node, &HashMap::new(), true).unwrap_err();
        assert!(matches!(err, Error::MissingTensor(name) if name == "ghost"));
    }

    #[test]
    fn find_or_create_prefers_registered_bindings() {
        let node = NodeBuilder::new("aten::relu").input("x").output("out").build();
        let cx = converter_for(&node);

        let mut graph = GraphBuilder::new();
        let created = cx.find_or_create_input(0, &graph);
        assert!(created.has_buffer);

        graph
            .tensor_map
            .insert("x".to_string(), Tensor::new(TensorValue::f32s(&[1.0]), "x", false));
        let found = cx.find_or_create_input(0, &graph);
        assert!(!found.has_buffer);
    }

    #[test]
    fn registry_dispatches_by_namespace() {
        let registry = Registry::new(true);
        assert!(!(registry.factory("prim::TupleIndex"))().runs_reference());
        assert!((registry.factory("aten::softmax"))().runs_reference());
    }
}
