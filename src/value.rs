//! Concrete tensor values carried through the lowering pipeline.
//!
//! Every binding in the target graph is backed by a materialized value: traced
//! constants keep their original data, while computed intermediates carry the
//! value produced by reference evaluation. Transform insertion relies on these
//! values to derive the shapes and contents of auxiliary tensors.

use core::fmt;
use std::fmt::Formatter;

use ndarray::{ArrayD, IxDyn, SliceInfoElem};
use strum::Display;

/// Element types representable in the target tensor format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ElementType {
    Float32,
    Float64,
    Int32,
    Int64,
    UInt8,
    Int8,
    Bool,
}

impl ElementType {
    /// Inclusive integer range of the type, `None` for non-integer types.
    pub fn integer_bounds(&self) -> Option<(i64, i64)> {
        match self {
            ElementType::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            ElementType::Int64 => Some((i64::MIN, i64::MAX)),
            ElementType::UInt8 => Some((u8::MIN as i64, u8::MAX as i64)),
            ElementType::Int8 => Some((i8::MIN as i64, i8::MAX as i64)),
            _ => None,
        }
    }
}

/// Fill value used when padding a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Zero,
    /// The most negative representable value of the element type.
    Lowest,
}

/// A concrete, dynamically typed tensor value.
#[derive(Clone, PartialEq)]
pub enum TensorValue {
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
    UInt8(ArrayD<u8>),
    Int8(ArrayD<i8>),
    Bool(ArrayD<bool>),
}

macro_rules! on_value {
    ($value:expr, $arr:ident => $body:expr) => {
        match $value {
            TensorValue::Float32($arr) => $body,
            TensorValue::Float64($arr) => $body,
            TensorValue::Int32($arr) => $body,
            TensorValue::Int64($arr) => $body,
            TensorValue::UInt8($arr) => $body,
            TensorValue::Int8($arr) => $body,
            TensorValue::Bool($arr) => $body,
        }
    };
}

macro_rules! map_value {
    ($value:expr, $arr:ident => $body:expr) => {
        match $value {
            TensorValue::Float32($arr) => TensorValue::Float32($body),
            TensorValue::Float64($arr) => TensorValue::Float64($body),
            TensorValue::Int32($arr) => TensorValue::Int32($body),
            TensorValue::Int64($arr) => TensorValue::Int64($body),
            TensorValue::UInt8($arr) => TensorValue::UInt8($body),
            TensorValue::Int8($arr) => TensorValue::Int8($body),
            TensorValue::Bool($arr) => TensorValue::Bool($body),
        }
    };
}

impl TensorValue {
    /// 1-D int32 tensor from a literal sequence. Used for permutations and
    /// reshape targets.
    pub fn i32s(values: &[i32]) -> Self {
        TensorValue::Int32(ArrayD::from_shape_vec(IxDyn(&[values.len()]), values.to_vec()).unwrap())
    }

    /// `[n, 2]` int32 tensor from before/after pairs. Used for pad amounts.
    pub fn i32_pairs(pairs: &[[i32; 2]]) -> Self {
        let flat: Vec<i32> = pairs.iter().flatten().copied().collect();
        TensorValue::Int32(ArrayD::from_shape_vec(IxDyn(&[pairs.len(), 2]), flat).unwrap())
    }

    /// 1-D float32 tensor from a literal sequence.
    pub fn f32s(values: &[f32]) -> Self {
        TensorValue::Float32(
            ArrayD::from_shape_vec(IxDyn(&[values.len()]), values.to_vec()).unwrap(),
        )
    }

    /// 0-dimensional int64 scalar.
    pub fn scalar_i64(value: i64) -> Self {
        TensorValue::Int64(ArrayD::from_elem(IxDyn(&[]), value))
    }

    /// 0-dimensional float32 scalar.
    pub fn scalar_f32(value: f32) -> Self {
        TensorValue::Float32(ArrayD::from_elem(IxDyn(&[]), value))
    }

    /// Zero-filled tensor of the given element type and shape.
    pub fn zeros(elem_type: ElementType, shape: &[usize]) -> Self {
        let dim = IxDyn(shape);
        match elem_type {
            ElementType::Float32 => TensorValue::Float32(ArrayD::zeros(dim)),
            ElementType::Float64 => TensorValue::Float64(ArrayD::zeros(dim)),
            ElementType::Int32 => TensorValue::Int32(ArrayD::zeros(dim)),
            ElementType::Int64 => TensorValue::Int64(ArrayD::zeros(dim)),
            ElementType::UInt8 => TensorValue::UInt8(ArrayD::zeros(dim)),
            ElementType::Int8 => TensorValue::Int8(ArrayD::zeros(dim)),
            ElementType::Bool => TensorValue::Bool(ArrayD::from_elem(dim, false)),
        }
    }

    pub fn shape(&self) -> &[usize] {
        on_value!(self, a => a.shape())
    }

    pub fn rank(&self) -> usize {
        on_value!(self, a => a.ndim())
    }

    pub fn num_elements(&self) -> usize {
        on_value!(self, a => a.len())
    }

    pub fn elem_type(&self) -> ElementType {
        match self {
            TensorValue::Float32(_) => ElementType::Float32,
            TensorValue::Float64(_) => ElementType::Float64,
            TensorValue::Int32(_) => ElementType::Int32,
            TensorValue::Int64(_) => ElementType::Int64,
            TensorValue::UInt8(_) => ElementType::UInt8,
            TensorValue::Int8(_) => ElementType::Int8,
            TensorValue::Bool(_) => ElementType::Bool,
        }
    }

    /// The single element of a one-element float tensor.
    pub fn scalar(&self) -> Option<f32> {
        if self.num_elements() != 1 {
            return None;
        }
        self.as_f32_array().first().copied()
    }

    /// Materialize the value as a float32 array, converting elements lossily
    /// where needed.
    pub fn as_f32_array(&self) -> ArrayD<f32> {
        match self {
            TensorValue::Float32(a) => a.clone(),
            TensorValue::Float64(a) => a.mapv(|v| v as f32),
            TensorValue::Int32(a) => a.mapv(|v| v as f32),
            TensorValue::Int64(a) => a.mapv(|v| v as f32),
            TensorValue::UInt8(a) => a.mapv(|v| v as f32),
            TensorValue::Int8(a) => a.mapv(|v| v as f32),
            TensorValue::Bool(a) => a.mapv(|v| v as u8 as f32),
        }
    }

    /// The same value in float32.
    pub fn to_f32(&self) -> TensorValue {
        TensorValue::Float32(self.as_f32_array())
    }

    /// The value with its axes permuted, in standard layout.
    pub fn permuted(&self, perm: &[usize]) -> TensorValue {
        assert_eq!(perm.len(), self.rank(), "permutation rank mismatch");
        map_value!(self, a => {
            let permuted = a.clone().permuted_axes(IxDyn(perm));
            permuted.as_standard_layout().to_owned()
        })
    }

    /// The value reshaped to `shape`. The element count must be preserved.
    pub fn reshaped(&self, shape: &[usize]) -> TensorValue {
        map_value!(self, a => {
            a.as_standard_layout()
                .to_owned()
                .into_shape(IxDyn(shape))
                .unwrap_or_else(|_| {
                    panic!("cannot reshape {:?} into {:?}", a.shape(), shape)
                })
        })
    }

    /// The value padded with per-dimension before/after amounts.
    pub fn padded(&self, pads: &[[usize; 2]], fill: Fill) -> TensorValue {
        assert_eq!(pads.len(), self.rank(), "padding rank mismatch");
        match self {
            TensorValue::Float32(a) => TensorValue::Float32(pad_array(
                a,
                pads,
                match fill {
                    Fill::Zero => 0.0,
                    Fill::Lowest => f32::MIN,
                },
            )),
            TensorValue::Float64(a) => TensorValue::Float64(pad_array(
                a,
                pads,
                match fill {
                    Fill::Zero => 0.0,
                    Fill::Lowest => f64::MIN,
                },
            )),
            TensorValue::Int32(a) => TensorValue::Int32(pad_array(
                a,
                pads,
                match fill {
                    Fill::Zero => 0,
                    Fill::Lowest => i32::MIN,
                },
            )),
            TensorValue::Int64(a) => TensorValue::Int64(pad_array(
                a,
                pads,
                match fill {
                    Fill::Zero => 0,
                    Fill::Lowest => i64::MIN,
                },
            )),
            TensorValue::UInt8(a) => TensorValue::UInt8(pad_array(
                a,
                pads,
                match fill {
                    Fill::Zero => 0,
                    Fill::Lowest => u8::MIN,
                },
            )),
            TensorValue::Int8(a) => TensorValue::Int8(pad_array(
                a,
                pads,
                match fill {
                    Fill::Zero => 0,
                    Fill::Lowest => i8::MIN,
                },
            )),
            TensorValue::Bool(a) => TensorValue::Bool(pad_array(a, pads, false)),
        }
    }
}

fn pad_array<T: Copy>(array: &ArrayD<T>, pads: &[[usize; 2]], fill: T) -> ArrayD<T> {
    let shape: Vec<usize> = array
        .shape()
        .iter()
        .zip(pads)
        .map(|(dim, pad)| dim + pad[0] + pad[1])
        .collect();
    let mut out = ArrayD::from_elem(IxDyn(&shape), fill);

    let interior: Vec<SliceInfoElem> = pads
        .iter()
        .zip(array.shape())
        .map(|(pad, dim)| SliceInfoElem::Slice {
            start: pad[0] as isize,
            end: Some((pad[0] + dim) as isize),
            step: 1,
        })
        .collect();
    out.slice_mut(interior.as_slice()).assign(array);
    out
}

/// Shorten the value for debug display.
impl fmt::Debug for TensorValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.elem_type(), self.shape())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permuted_composes_to_identity() {
        let value = TensorValue::Int64(
            ArrayD::from_shape_vec(IxDyn(&[1, 2, 3, 4]), (0..24).collect()).unwrap(),
        );
        let roundtrip = value.permuted(&[0, 2, 3, 1]).permuted(&[0, 3, 1, 2]);
        assert_eq!(roundtrip, value);
    }

    #[test]
    fn reshaped_preserves_elements() {
        let value = TensorValue::f32s(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let reshaped = value.reshaped(&[2, 3]);
        assert_eq!(reshaped.shape(), &[2, 3]);
        assert_eq!(reshaped.num_elements(), 6);
    }

    #[test]
    fn padded_zero_extends_spatial_dims() {
        let value = TensorValue::zeros(ElementType::Float32, &[1, 2, 2, 1]);
        let padded = value.padded(&[[0, 0], [1, 1], [1, 1], [0, 0]], Fill::Zero);
        assert_eq!(padded.shape(), &[1, 4, 4, 1]);
    }

    #[test]
    fn padded_lowest_uses_most_negative_value() {
        let value = TensorValue::f32s(&[1.0]);
        let padded = value.padded(&[[0, 1]], Fill::Lowest);
        assert_eq!(padded, TensorValue::f32s(&[1.0, f32::MIN]));
    }

    #[test]
    fn scalar_reads_single_element() {
        assert_eq!(TensorValue::scalar_f32(-2.5).scalar(), Some(-2.5));
        assert_eq!(TensorValue::f32s(&[1.0, 2.0]).scalar(), None);
    }
}
