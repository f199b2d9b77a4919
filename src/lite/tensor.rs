//! Tensor bindings of the target graph.

use crate::value::{ElementType, TensorValue};

/// Affine per-tensor quantization parameters.
///
/// A real value is represented as `round(v / scale) + zero_point` in
/// `elem_type`.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantization {
    pub scale: f32,
    pub zero_point: i32,
    pub elem_type: ElementType,
}

impl Quantization {
    pub fn new(scale: f32, zero_point: i32, elem_type: ElementType) -> Self {
        assert!(scale > 0.0, "quantization scale must be positive");
        let (min, max) = elem_type
            .integer_bounds()
            .unwrap_or_else(|| panic!("{elem_type} is not a quantized storage type"));
        assert!(
            (min..=max).contains(&(zero_point as i64)),
            "zero point {zero_point} is out of range for {elem_type}"
        );
        Self {
            scale,
            zero_point,
            elem_type,
        }
    }
}

/// A tensor binding in the target graph.
///
/// `has_buffer` distinguishes concrete constants (weights, literal
/// parameters) from computed values. Names are unique within one target
/// graph.
#[derive(Debug, Clone)]
pub struct Tensor {
    pub name: String,
    pub value: TensorValue,
    pub has_buffer: bool,
    pub quantization: Option<Quantization>,
}

impl Tensor {
    pub fn new(value: TensorValue, name: &str, has_buffer: bool) -> Self {
        Self {
            name: name.to_string(),
            value,
            has_buffer,
            quantization: None,
        }
    }

    pub fn with_quantization(mut self, quantization: Option<Quantization>) -> Self {
        self.quantization = quantization;
        self
    }

    pub fn shape(&self) -> &[usize] {
        self.value.shape()
    }

    pub fn elem_type(&self) -> ElementType {
        self.value.elem_type()
    }
}

/// Affinely quantized data together with the parameters that produced it.
#[derive(Debug, Clone, new)]
pub struct FakeQuantValue {
    pub value: TensorValue,
    pub scale: f32,
    pub zero_point: i32,
}

impl FakeQuantValue {
    pub fn quantization(&self) -> Quantization {
        Quantization::new(self.scale, self.zero_point, self.value.elem_type())
    }
}
