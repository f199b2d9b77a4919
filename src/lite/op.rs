//! Target operators.

use strum::Display;

use super::Tensor;

/// Elementwise op codes of the target kernel set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ElementwiseKind {
    Add,
    Sub,
    Mul,
    Div,
    Abs,
    Neg,
    Exp,
    Log,
    Logistic,
    Relu,
    Sqrt,
    Rsqrt,
    Tanh,
    Minimum,
    Maximum,
}

/// Windowed-op parameters shared by the 2-d pooling kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct Pool2dParams {
    pub filter_height: usize,
    pub filter_width: usize,
    pub stride_h: usize,
    pub stride_w: usize,
}

/// The closed operator set of the target format.
///
/// Permutations and pad amounts travel as constant input tensors, following
/// the target format's convention; `Reshape` additionally carries the new
/// shape as an op parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum OpKind {
    Reshape { new_shape: Vec<i32> },
    Transpose,
    Pad,
    /// Pad with an explicit fill value (third input).
    PadV2,
    Dequantize,
    Quantize,
    MaxPool2d(Pool2dParams),
    AvgPool2d(Pool2dParams),
    Elementwise(ElementwiseKind),
}

impl OpKind {
    /// Display tag of the op kind.
    pub fn name(&self) -> String {
        match self {
            OpKind::Reshape { .. } => "Reshape".to_string(),
            OpKind::Transpose => "Transpose".to_string(),
            OpKind::Pad => "Pad".to_string(),
            OpKind::PadV2 => "PadV2".to_string(),
            OpKind::Dequantize => "Dequantize".to_string(),
            OpKind::Quantize => "Quantize".to_string(),
            OpKind::MaxPool2d(_) => "MaxPool2d".to_string(),
            OpKind::AvgPool2d(_) => "AvgPool2d".to_string(),
            OpKind::Elementwise(kind) => kind.to_string(),
        }
    }
}

/// One operator of the target graph: ordered input and output bindings plus
/// op-specific parameters.
#[derive(Debug, Clone, new)]
pub struct Operator {
    pub kind: OpKind,
    pub inputs: Vec<Tensor>,
    pub outputs: Vec<Tensor>,
}
