//! Structural transform library.
//!
//! Each transform consumes and returns a sequence of already-built target
//! operators, rewriting endpoints in place: wrapping transforms bracket a
//! subsequence with adapter ops (layout transposes, rank reshapes,
//! dequantize/quantize boundaries) and rewire the bracketed ops' designated
//! input/output to freshly created transform tensors, leaving the original
//! tensors as the outer boundary.

use super::NodeConverter;
use crate::lite::{FakeQuantValue, GraphBuilder, OpKind, Operator, Pool2dParams};
use crate::value::{Fill, TensorValue};

/// Permutation taking channel-first (NCHW) data to channel-last (NHWC).
pub const NCHW_TO_NHWC: [usize; 4] = [0, 2, 3, 1];
/// Inverse permutation, restoring channel-first order.
pub const NHWC_TO_NCHW: [usize; 4] = [0, 3, 1, 2];

fn to_i32_shape(shape: &[usize]) -> Vec<i32> {
    shape.iter().map(|dim| *dim as i32).collect()
}

impl NodeConverter {
    /// Generic identity lowering for metadata-only ops whose input shape
    /// equals the output shape: emits a single reshape to that shape.
    pub fn passthrough(&mut self, graph: &mut GraphBuilder) {
        assert!(self.input_values.len() >= self.output_values.len());

        for i in 0..self.output_values.len() {
            let shape = to_i32_shape(self.input_values[i].shape());
            let input = self.find_or_create_input(i, graph);
            let shape_attr = self.create_attr_tensor(TensorValue::i32s(&shape));
            let outputs = self.to_lite_tensors(
                &self.output_names[i..=i],
                &self.output_values[i..=i],
                &super::BufferSpec::Infer,
                None,
                false,
            );

            graph.add_operator(Operator::new(
                OpKind::Reshape { new_shape: shape },
                vec![input, shape_attr],
                outputs,
            ));
        }
    }

    /// Emit a unary elementwise op. Emission is skipped entirely when the
    /// input is buffer-backed: the computation is folded at compile time,
    /// not lowered.
    pub fn elementwise_unary(&mut self, kind: OpKind, graph: &mut GraphBuilder) {
        let input = self.find_or_create_input(0, graph);
        if !input.has_buffer {
            let outputs = self.output_tensors();
            graph.add_operator(Operator::new(kind, vec![input], outputs));
        }
    }

    /// Emit a binary elementwise op, skipping emission when both inputs are
    /// buffer-backed.
    pub fn elementwise_binary(&mut self, kind: OpKind, graph: &mut GraphBuilder) {
        let inputs = vec![
            self.find_or_create_input(0, graph),
            self.find_or_create_input(1, graph),
        ];
        if !inputs.iter().all(|tensor| tensor.has_buffer) {
            let outputs = self.output_tensors();
            graph.add_operator(Operator::new(kind, inputs, outputs));
        }
    }

    /// Emit a reshape to the literal traced output shape.
    pub fn reshape(&mut self, graph: &mut GraphBuilder) {
        let new_shape = to_i32_shape(self.output_values[0].shape());
        let input = self.find_or_create_input(0, graph);
        let shape_attr = self.create_attr_tensor(TensorValue::i32s(&new_shape));
        let outputs = self.output_tensors();

        graph.add_operator(Operator::new(
            OpKind::Reshape { new_shape },
            vec![input, shape_attr],
            outputs,
        ));
    }

    /// Bracket ops that only operate in floating point with a dequantize
    /// before and a quantize after. The original quantized tensors stay as
    /// the outer boundary; the bracketed sequence is rewired to new
    /// floating-point transform tensors.
    pub fn wrap_with_dequant_quant(
        &mut self,
        mut ops: Vec<Operator>,
        input_idx: usize,
        output_idx: usize,
    ) -> Vec<Operator> {
        let last = ops.len() - 1;
        let orig_input = ops[0].inputs[input_idx].clone();
        let orig_output = ops[last].outputs[output_idx].clone();

        let new_input = self.create_transform_tensor(orig_input.value.to_f32(), None);
        let new_output = self.create_transform_tensor(orig_output.value.to_f32(), None);

        let dequant = Operator::new(OpKind::Dequantize, vec![orig_input], vec![new_input.clone()]);
        let quant = Operator::new(OpKind::Quantize, vec![new_output.clone()], vec![orig_output]);

        ops[0].inputs[input_idx] = new_input;
        ops[last].outputs[output_idx] = new_output;

        let mut wrapped = vec![dequant];
        wrapped.extend(ops);
        wrapped.push(quant);
        wrapped
    }

    /// Bracket ops expecting a lower rank than the surrounding graph with a
    /// reshape dropping the leading batch-like dimension and a reshape
    /// restoring it at the boundary.
    pub fn wrap_with_rank_reshape(
        &mut self,
        mut ops: Vec<Operator>,
        input_idx: usize,
        output_idx: usize,
    ) -> Vec<Operator> {
        let last = ops.len() - 1;
        let orig_input = ops[0].inputs[input_idx].clone();
        let orig_output = ops[last].outputs[output_idx].clone();

        let input_shape: Vec<usize> = orig_input.shape()[1..].to_vec();
        let output_shape: Vec<usize> = orig_output.shape().to_vec();

        let input_shape_attr = self.create_attr_tensor(TensorValue::i32s(&to_i32_shape(&input_shape)));
        let output_shape_attr =
            self.create_attr_tensor(TensorValue::i32s(&to_i32_shape(&output_shape)));

        let new_input = self.create_transform_tensor(
            orig_input.value.reshaped(&input_shape),
            orig_input.quantization.clone(),
        );
        let new_output = self.create_transform_tensor(
            orig_output.value.reshaped(&output_shape[1..]),
            orig_output.quantization.clone(),
        );

        let reshape_in = Operator::new(
            OpKind::Reshape {
                new_shape: to_i32_shape(&input_shape),
            },
            vec![orig_input, input_shape_attr],
            vec![new_input.clone()],
        );
        let reshape_out = Operator::new(
            OpKind::Reshape {
                new_shape: to_i32_shape(&output_shape),
            },
            vec![new_output.clone(), output_shape_attr],
            vec![orig_output],
        );

        ops[0].inputs[input_idx] = new_input;
        ops[last].outputs[output_idx] = new_output;

        let mut wrapped = vec![reshape_in];
        wrapped.extend(ops);
        wrapped.push(reshape_out);
        wrapped
    }

    /// Bracket ops whose kernel requires channel-last layout with a
    /// transpose into NHWC before and its inverse after. The two
    /// permutations compose to the identity.
    pub fn wrap_with_layout_transpose(
        &mut self,
        mut ops: Vec<Operator>,
        input_idx: usize,
        output_idx: usize,
    ) -> Vec<Operator> {
        let last = ops.len() - 1;
        let orig_input = ops[0].inputs[input_idx].clone();
        let orig_output = ops[last].outputs[output_idx].clone();

        let nhwc_to_nchw_attr = self.create_attr_tensor(TensorValue::i32s(&to_i32_shape(
            &NHWC_TO_NCHW,
        )));
        let nchw_to_nhwc_attr = self.create_attr_tensor(TensorValue::i32s(&to_i32_shape(
            &NCHW_TO_NHWC,
        )));

        let new_input = self.create_transform_tensor(
            orig_input.value.permuted(&NCHW_TO_NHWC),
            orig_input.quantization.clone(),
        );
        let new_output = self.create_transform_tensor(
            orig_output.value.permuted(&NCHW_TO_NHWC),
            orig_output.quantization.clone(),
        );

        let enter = Operator::new(
            OpKind::Transpose,
            vec![orig_input, nchw_to_nhwc_attr],
            vec![new_input.clone()],
        );
        let leave = Operator::new(
            OpKind::Transpose,
            vec![new_output.clone(), nhwc_to_nchw_attr],
            vec![orig_output],
        );

        ops[0].inputs[input_idx] = new_input;
        ops[last].outputs[output_idx] = new_output;

        let mut wrapped = vec![enter];
        wrapped.extend(ops);
        wrapped.push(leave);
        wrapped
    }

    /// Insert explicit padding ahead of a windowed op.
    ///
    /// With nonzero base padding, a symmetric zero pad is inserted
    /// immediately before `ops[pad_op_index]`, applied to the two spatial
    /// dimensions of the channel-last data. With `ceil_mode`, when the naive
    /// padding under-covers the window, a second pad filled with the most
    /// negative representable value (so it cannot win a max) is inserted
    /// after the first, sized by the extra ceil-padding amount. The spatial
    /// input size is read from the channel-first input of `ops[0]`.
    pub fn handle_padding(
        &mut self,
        pad_h: usize,
        pad_w: usize,
        pad_op_index: usize,
        ops: &mut Vec<Operator>,
        ceil_mode: bool,
    ) {
        let mut ceil_pad: Option<[usize; 2]> = None;
        if ceil_mode {
            let input_tensor = ops[0].inputs[0].clone();
            let params = pool_params(&ops[pad_op_index]);
            let kernel = [params.filter_height, params.filter_width];
            let stride = [params.stride_h, params.stride_w];
            let padding = [pad_h, pad_w];
            let input_size = [input_tensor.shape()[2], input_tensor.shape()[3]];

            let covered = input_size
                .iter()
                .zip(padding)
                .zip(kernel)
                .zip(stride)
                .all(|(((i, p), k), t)| (*i as i64 + 2 * p as i64 - k as i64) % t as i64 == 0);
            if !covered {
                assert!(
                    matches!(ops[pad_op_index].kind, OpKind::MaxPool2d(_)),
                    "extra ceil padding is only supported for max pooling"
                );
                let extra = pool_ceil_padding(input_size, kernel, stride, padding);
                ceil_pad = Some([extra[0] + padding[0], extra[1] + padding[1]]);
            }
        }

        if pad_h + pad_w > 0 {
            let pads = [[0, 0], [pad_h, pad_h], [pad_w, pad_w], [0, 0]];
            let pad_attr = self.create_attr_tensor(TensorValue::i32_pairs(&[
                [0, 0],
                [pad_h as i32, pad_h as i32],
                [pad_w as i32, pad_w as i32],
                [0, 0],
            ]));

            let pad_input = ops[pad_op_index - 1].outputs[0].clone();
            let padded = pad_input.value.padded(&pads, Fill::Zero);
            let pad_out = self.create_transform_tensor(padded, pad_input.quantization.clone());
            ops[pad_op_index].inputs[0] = pad_out.clone();

            let pad_op = Operator::new(OpKind::Pad, vec![pad_input, pad_attr], vec![pad_out]);
            ops.insert(pad_op_index, pad_op);
        }

        if let Some(extra) = ceil_pad {
            let index = if pad_h + pad_w > 0 {
                pad_op_index + 1
            } else {
                pad_op_index
            };
            let pads = [[0, 0], [0, extra[0]], [0, extra[1]], [0, 0]];
            let pad_attr = self.create_attr_tensor(TensorValue::i32_pairs(&[
                [0, 0],
                [0, extra[0] as i32],
                [0, extra[1] as i32],
                [0, 0],
            ]));

            let pad_input = ops[index - 1].outputs[0].clone();
            let fill_attr = match &pad_input.quantization {
                Some(q) => self.create_quantized_attr_tensor(FakeQuantValue::new(
                    TensorValue::zeros(q.elem_type, &[1]),
                    q.scale,
                    q.zero_point,
                )),
                None => self.create_attr_tensor(TensorValue::f32s(&[f32::MIN])),
            };

            let padded = pad_input.value.padded(&pads, Fill::Lowest);
            let pad_out = self.create_transform_tensor(padded, pad_input.quantization.clone());
            ops[index].inputs[0] = pad_out.clone();

            let pad_op = Operator::new(
                OpKind::PadV2,
                vec![pad_input, pad_attr, fill_attr],
                vec![pad_out],
            );
            ops.insert(index, pad_op);
        }
    }
}

fn pool_params(op: &Operator) -> Pool2dParams {
    match &op.kind {
        OpKind::MaxPool2d(params) | OpKind::AvgPool2d(params) => *params,
        other => panic!("ceil_mode padding requires a pooling operator, got {:?}", other.name()),
    }
}

/// Extra end padding required so that ceil-mode pooling windows cover the
/// whole input, per spatial dimension.
///
/// The output size rounds up; the last window must still start inside the
/// input; the extra padding never exceeds `kernel - 1`.
pub fn pool_ceil_padding(
    input_size: [usize; 2],
    kernel: [usize; 2],
    stride: [usize; 2],
    padding: [usize; 2],
) -> [usize; 2] {
    let mut extra = [0usize; 2];
    for i in 0..2 {
        let (s, k, t, p) = (
            input_size[i] as i64,
            kernel[i] as i64,
            stride[i] as i64,
            padding[i] as i64,
        );

        let mut out = ((s + 2 * p - k) as f64 / t as f64).ceil() as i64 + 1;
        // ensure the last window starts inside the input
        if (out - 1) * t >= s + p {
            out -= 1;
        }

        let pad = if t == 1 {
            0
        } else {
            k - (s + 2 * p - ((out - 1) * t + 1))
        };
        // never pad beyond the window
        let pad = if pad + 2 * p >= k { pad.min(k - 1) } else { pad };

        assert!(pad >= 0, "negative ceil padding");
        extra[i] = pad as usize;
    }
    extra
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::convert::NodeConverter;
    use crate::ir::{Node, NodeBuilder};
    use crate::lite::{ElementwiseKind, Quantization, Tensor};
    use crate::value::ElementType;

    fn converter_with_values(
        node: &Node,
        inputs: Vec<TensorValue>,
        outputs: Vec<TensorValue>,
    ) -> NodeConverter {
        let tensor_map: HashMap<String, TensorValue> =
            node.inputs.iter().cloned().zip(inputs).collect();
        let mut cx = NodeConverter::new(node, &tensor_map, true).unwrap();
        cx.set_output_values(outputs);
        cx
    }

    fn unary_node() -> Node {
        NodeBuilder::new("aten::relu").input("x").output("y").build()
    }

    fn quantized(name: &str, shape: &[usize]) -> Tensor {
        Tensor::new(TensorValue::zeros(ElementType::UInt8, shape), name, false)
            .with_quantization(Some(Quantization::new(0.5, 128, ElementType::UInt8)))
    }

    fn float_op(kind: OpKind, in_name: &str, out_name: &str, shape: &[usize]) -> Operator {
        Operator::new(
            kind,
            vec![Tensor::new(
                TensorValue::zeros(ElementType::Float32, shape),
                in_name,
                false,
            )],
            vec![Tensor::new(
                TensorValue::zeros(ElementType::Float32, shape),
                out_name,
                false,
            )],
        )
    }

    #[test]
    fn passthrough_emits_a_single_reshape_with_the_input_shape() {
        let node = unary_node();
        let value = TensorValue::zeros(ElementType::Float32, &[2, 3, 4]);
        let mut cx = converter_with_values(&node, vec![value.clone()], vec![value]);

        let mut graph = GraphBuilder::new();
        cx.passthrough(&mut graph);

        assert_eq!(graph.operators.len(), 1);
        let op = &graph.operators[0];
        assert_eq!(op.kind, OpKind::Reshape { new_shape: vec![2, 3, 4] });
        assert_eq!(op.outputs[0].name, "y");
    }

    #[test]
    fn elementwise_unary_skips_buffer_backed_inputs() {
        let node = unary_node();
        let value = TensorValue::f32s(&[1.0, -1.0]);
        let mut cx = converter_with_values(&node, vec![value.clone()], vec![value.clone()]);

        // no graph binding, so the input materializes as a constant
        let mut graph = GraphBuilder::new();
        cx.elementwise_unary(OpKind::Elementwise(ElementwiseKind::Relu), &mut graph);
        assert!(graph.operators.is_empty());

        // a registered computed binding is lowered
        let mut graph = GraphBuilder::new();
        graph
            .tensor_map
            .insert("x".to_string(), Tensor::new(value.clone(), "x", false));
        let mut cx = converter_with_values(&node, vec![value.clone()], vec![value]);
        cx.elementwise_unary(OpKind::Elementwise(ElementwiseKind::Relu), &mut graph);
        assert_eq!(graph.operators.len(), 1);
    }

    #[test]
    fn elementwise_binary_emits_unless_fully_constant() {
        let node = NodeBuilder::new("aten::add")
            .input("a")
            .input("b")
            .output("sum")
            .build();
        let value = TensorValue::f32s(&[1.0]);

        let mut graph = GraphBuilder::new();
        graph
            .tensor_map
            .insert("a".to_string(), Tensor::new(value.clone(), "a", false));
        let mut cx =
            converter_with_values(&node, vec![value.clone(), value.clone()], vec![value.clone()]);
        cx.elementwise_binary(OpKind::Elementwise(ElementwiseKind::Add), &mut graph);
        assert_eq!(graph.operators.len(), 1);

        let mut graph = GraphBuilder::new();
        let mut cx = converter_with_values(&node, vec![value.clone(), value.clone()], vec![value]);
        cx.elementwise_binary(OpKind::Elementwise(ElementwiseKind::Add), &mut graph);
        assert!(graph.operators.is_empty());
    }

    #[test]
    fn dequant_quant_wrap_keeps_quantized_boundary() {
        let node = unary_node();
        let value = TensorValue::zeros(ElementType::UInt8, &[2, 2]);
        let mut cx = converter_with_values(&node, vec![value.clone()], vec![value]);

        let mut op = float_op(
            OpKind::Elementwise(ElementwiseKind::Exp),
            "ignored",
            "ignored_out",
            &[2, 2],
        );
        op.inputs[0] = quantized("q_in", &[2, 2]);
        op.outputs[0] = quantized("q_out", &[2, 2]);

        let wrapped = cx.wrap_with_dequant_quant(vec![op], 0, 0);
        assert_eq!(wrapped.len(), 3);

        assert_eq!(wrapped[0].kind, OpKind::Dequantize);
        assert_eq!(wrapped[0].inputs[0].name, "q_in");
        assert_eq!(wrapped[2].kind, OpKind::Quantize);
        assert_eq!(wrapped[2].outputs[0].name, "q_out");

        // the inner op now runs on fresh floating-point transform tensors
        let inner = &wrapped[1];
        assert_ne!(inner.inputs[0].name, "q_in");
        assert_ne!(inner.outputs[0].name, "q_out");
        assert_eq!(inner.inputs[0].elem_type(), ElementType::Float32);
        assert_eq!(inner.outputs[0].elem_type(), ElementType::Float32);
        assert_eq!(wrapped[0].outputs[0].name, inner.inputs[0].name);
        assert_eq!(wrapped[2].inputs[0].name, inner.outputs[0].name);
    }

    #[test]
    fn rank_reshape_wrap_drops_and_restores_the_leading_dim() {
        let node = unary_node();
        let value = TensorValue::zeros(ElementType::Float32, &[1, 4, 8]);
        let mut cx = converter_with_values(&node, vec![value.clone()], vec![value]);

        let op = float_op(
            OpKind::Elementwise(ElementwiseKind::Tanh),
            "outer_in",
            "outer_out",
            &[1, 4, 8],
        );
        let wrapped = cx.wrap_with_rank_reshape(vec![op], 0, 0);

        assert_eq!(wrapped.len(), 3);
        assert_eq!(wrapped[0].outputs[0].shape(), &[4, 8]);
        assert_eq!(wrapped[1].inputs[0].shape(), &[4, 8]);
        assert_eq!(wrapped[1].outputs[0].shape(), &[4, 8]);
        assert_eq!(wrapped[2].outputs[0].name, "outer_out");
        assert_eq!(wrapped[2].outputs[0].shape(), &[1, 4, 8]);
    }

    #[test]
    fn layout_transpose_wrap_round_trips() {
        let node = unary_node();
        let value = TensorValue::zeros(ElementType::Float32, &[1, 3, 5, 7]);
        let mut cx = converter_with_values(&node, vec![value.clone()], vec![value]);

        let op = float_op(
            OpKind::Elementwise(ElementwiseKind::Relu),
            "outer_in",
            "outer_out",
            &[1, 3, 5, 7],
        );
        let wrapped = cx.wrap_with_layout_transpose(vec![op], 0, 0);

        assert_eq!(wrapped.len(), 3);
        assert_eq!(wrapped[0].kind, OpKind::Transpose);
        assert_eq!(wrapped[2].kind, OpKind::Transpose);
        // the inner op sees channel-last data
        assert_eq!(wrapped[1].inputs[0].shape(), &[1, 5, 7, 3]);
        assert_eq!(wrapped[2].outputs[0].shape(), &[1, 3, 5, 7]);

        // the two permutations compose to the identity
        let composed: Vec<usize> = (0..4).map(|i| NCHW_TO_NHWC[NHWC_TO_NCHW[i]]).collect();
        assert_eq!(composed, vec![0, 1, 2, 3]);
    }

    fn pool_ops(input_shape: [usize; 4], kernel: [usize; 2], stride: [usize; 2]) -> Vec<Operator> {
        // entry transpose from channel-first, then the pool in channel-last
        let nchw = Tensor::new(TensorValue::zeros(ElementType::Float32, &input_shape), "in", false);
        let nhwc_shape = [input_shape[0], input_shape[2], input_shape[3], input_shape[1]];
        let nhwc = Tensor::new(TensorValue::zeros(ElementType::Float32, &nhwc_shape), "in_t", false);
        let out = Tensor::new(TensorValue::zeros(ElementType::Float32, &nhwc_shape), "out", false);

        vec![
            Operator::new(OpKind::Transpose, vec![nchw], vec![nhwc.clone()]),
            Operator::new(
                OpKind::MaxPool2d(Pool2dParams::new(kernel[0], kernel[1], stride[0], stride[1])),
                vec![nhwc],
                vec![out],
            ),
        ]
    }

    #[test]
    fn handle_padding_inserts_a_symmetric_zero_pad() {
        let node = unary_node();
        let value = TensorValue::zeros(ElementType::Float32, &[1, 1, 4, 4]);
        let mut cx = converter_with_values(&node, vec![value.clone()], vec![value]);

        let mut ops = pool_ops([1, 1, 4, 4], [2, 2], [2, 2]);
        cx.handle_padding(1, 1, 1, &mut ops, false);

        assert_eq!(ops.len(), 3);
        assert_eq!(ops[1].kind, OpKind::Pad);
        // the pool consumes the padded tensor
        assert_eq!(ops[2].inputs[0].name, ops[1].outputs[0].name);
        assert_eq!(ops[1].outputs[0].shape(), &[1, 6, 6, 1]);
    }

    #[test]
    fn handle_padding_ceil_mode_adds_a_fill_value_pad() {
        let node = unary_node();
        let value = TensorValue::zeros(ElementType::Float32, &[1, 1, 6, 6]);
        let mut cx = converter_with_values(&node, vec![value.clone()], vec![value]);

        // 6 with kernel 3, stride 2: windows at 0/2/4 need one past the edge
        let mut ops = pool_ops([1, 1, 6, 6], [3, 3], [2, 2]);
        cx.handle_padding(0, 0, 1, &mut ops, true);

        assert_eq!(ops.len(), 3);
        assert_eq!(ops[1].kind, OpKind::PadV2);
        assert_eq!(ops[2].inputs[0].name, ops[1].outputs[0].name);
        // fill value is the most negative float so it cannot win a max
        let fill = &ops[1].inputs[2];
        assert_eq!(fill.value, TensorValue::f32s(&[f32::MIN]));
        assert_eq!(ops[1].outputs[0].shape(), &[1, 8, 8, 1]);
    }

    #[test]
    fn handle_padding_ceil_mode_skips_covered_inputs() {
        let node = unary_node();
        let value = TensorValue::zeros(ElementType::Float32, &[1, 1, 5, 5]);
        let mut cx = converter_with_values(&node, vec![value.clone()], vec![value]);

        // (5 - 3) divides evenly by the stride, no extra padding required
        let mut ops = pool_ops([1, 1, 5, 5], [3, 3], [2, 2]);
        cx.handle_padding(0, 0, 1, &mut ops, true);
        assert_eq!(ops.len(), 2);
    }

    #[test]
    #[should_panic(expected = "only supported for max pooling")]
    fn handle_padding_ceil_mode_rejects_average_pooling() {
        let node = unary_node();
        let value = TensorValue::zeros(ElementType::Float32, &[1, 1, 6, 6]);
        let mut cx = converter_with_values(&node, vec![value.clone()], vec![value]);

        let mut ops = pool_ops([1, 1, 6, 6], [3, 3], [2, 2]);
        ops[1].kind = OpKind::AvgPool2d(Pool2dParams::new(3, 3, 2, 2));
        cx.handle_padding(0, 0, 1, &mut ops, true);
    }

    #[test]
    fn ceil_padding_window_past_the_edge() {
        assert_eq!(pool_ceil_padding([5, 5], [3, 3], [2, 2], [0, 0]), [1, 1]);
    }

    #[test]
    fn ceil_padding_stride_one_needs_nothing() {
        assert_eq!(pool_ceil_padding([4, 4], [2, 2], [1, 1], [0, 0]), [0, 0]);
    }

    #[test]
    fn ceil_padding_clamps_to_the_window() {
        // out = ceil(9/3)+1 = 4; last window starts at 9 < 11; extra
        // = 3 - (12 - 10) = 1, and 1 + 2*1 >= 3 caps it at kernel - 1
        assert_eq!(pool_ceil_padding([10, 10], [3, 3], [3, 3], [1, 1]), [1, 1]);
    }
}
