//! Quantization helpers: affine quantization of concrete values, scalar
//! parameter selection, and backend-constrained weight rescaling.

use ndarray::ArrayD;

use super::NodeConverter;
use crate::lite::{FakeQuantValue, Tensor};
use crate::value::{ElementType, TensorValue};

/// Affinely quantize a floating tensor as `round(value / scale) + zero_point`
/// cast to `elem_type`.
///
/// Values outside the representable range produce a non-fatal warning and
/// are clamped by the cast; range violations never block conversion.
pub fn quantize(
    value: &TensorValue,
    scale: f32,
    zero_point: i32,
    elem_type: ElementType,
) -> FakeQuantValue {
    let codes: ArrayD<f32> = value
        .as_f32_array()
        .mapv(|v| (v / scale).round() + zero_point as f32);

    let (min, max) = elem_type
        .integer_bounds()
        .unwrap_or_else(|| panic!("cannot quantize into {elem_type}"));
    if codes.iter().any(|&code| code > max as f32) {
        log::warn!("Overflow while quantizing the tensor");
    }
    if codes.iter().any(|&code| code < min as f32) {
        log::warn!("Underflow while quantizing the tensor");
    }

    let quantized = match elem_type {
        ElementType::UInt8 => TensorValue::UInt8(codes.mapv(|code| code as u8)),
        ElementType::Int8 => TensorValue::Int8(codes.mapv(|code| code as i8)),
        ElementType::Int32 => TensorValue::Int32(codes.mapv(|code| code as i32)),
        ElementType::Int64 => TensorValue::Int64(codes.mapv(|code| code as i64)),
        other => panic!("cannot quantize into {other}"),
    };
    FakeQuantValue::new(quantized, scale, zero_point)
}

/// Choose quantization parameters for a single scalar by sign and quantize
/// it.
///
/// Zero maps to a fixed half-unit scale; negative scalars put the code at
/// the top of the unsigned range; positive scalars anchor the zero point at
/// zero regardless of symmetry mode.
pub fn quantize_scalar(value: f32, asymmetric: bool) -> FakeQuantValue {
    let tensor = TensorValue::scalar_f32(value);
    let elem_type = if asymmetric {
        ElementType::UInt8
    } else {
        ElementType::Int8
    };

    if value == 0.0 {
        let zero_point = if asymmetric { 128 } else { 0 };
        quantize(&tensor, 0.5, zero_point, elem_type)
    } else if value < 0.0 {
        let zero_point = if asymmetric { 255 } else { 0 };
        quantize(&tensor, -value / 127.0, zero_point, elem_type)
    } else {
        quantize(&tensor, value / 127.0, 0, elem_type)
    }
}

impl NodeConverter {
    /// [`quantize_scalar`] in this converter's symmetry mode.
    pub fn quantize_scalar_value(&self, value: f32) -> FakeQuantValue {
        quantize_scalar(value, self.asymmetric())
    }
}

/// Grow a weight scale until the combined multiplier
/// `input.scale * weight.scale / output.scale` is expressible by the
/// backend's sub-32 right shift.
///
/// The shift is derived from the multiplier's binary32 exponent field; while
/// it stays at or above 32 the weight scale is multiplied by 10 and the
/// check repeated. The scale only ever grows, so the loop terminates. The
/// weight tensor's quantization is mutated in place: callers must
/// re-quantize the weight data with the returned scale, not the original.
pub fn rescale_weight_for_backend(input: &Tensor, weight: &mut Tensor, output: &Tensor) -> f32 {
    let input_scale = expect_quantized(input).scale;
    let output_scale = expect_quantized(output).scale;
    let weight_q = match weight.quantization.as_mut() {
        Some(q) => q,
        None => panic!("weight tensor `{}` is not quantized", weight.name),
    };

    let orig_scale = weight_q.scale;
    let mut updated = false;
    loop {
        let input_product_scale = input_scale * weight_q.scale;
        let scale = input_product_scale / output_scale;
        let shift = 127 + 31 - 32 - (scale.to_bits() >> 23) as i32;
        if shift >= 32 {
            updated = true;
            weight_q.scale *= 10.0;
        } else {
            break;
        }
    }

    if updated {
        log::info!(
            "rescale quantized weight of {}: {:.8}->{:.8}",
            weight.name,
            orig_scale,
            weight_q.scale
        );
    }
    weight_q.scale
}

fn expect_quantized(tensor: &Tensor) -> &crate::lite::Quantization {
    match tensor.quantization.as_ref() {
        Some(q) => q,
        None => panic!("tensor `{}` is not quantized", tensor.name),
    }
}
