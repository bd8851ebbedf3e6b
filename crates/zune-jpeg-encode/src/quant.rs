/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use crate::tables::{BASE_CHROMA_QUANT_TABLE, BASE_LUMA_QUANT_TABLE, ZIGZAG_ORDER};

/// A quantization table, natural (row-major) order.
#[derive(Copy, Clone)]
pub(crate) struct QuantTable {
    pub(crate) natural: [u16; 64]
}

impl QuantTable {
    /// Materialize this table in zig-zag order, as required by the `DQT` segment.
    pub(crate) fn zigzag(&self) -> [u16; 64] {
        let mut out = [0u16; 64];
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = self.natural[ZIGZAG_ORDER[k]];
        }
        out
    }
}

/// Scale the Annex K example tables to the requested quality, per the
/// `s = (quality < 50) ? 5000/quality : 200 - 2*quality` formula.
pub(crate) fn build_quant_tables(quality: u8) -> (QuantTable, QuantTable) {
    let quality = quality.clamp(1, 100) as u32;
    let scale = if quality < 50 {
        5000 / quality
    } else {
        200 - 2 * quality
    };

    let scale_table = |base: &[u16; 64]| {
        let mut out = [0u16; 64];
        for (slot, &base_entry) in out.iter_mut().zip(base.iter()) {
            let scaled = (scale * u32::from(base_entry) + 50) / 100;
            // quality == 100 drives scale to 0; floor at 1 to avoid a zero divisor downstream.
            *slot = scaled.clamp(1, 255) as u16;
        }
        QuantTable { natural: out }
    };

    (
        scale_table(&BASE_LUMA_QUANT_TABLE),
        scale_table(&BASE_CHROMA_QUANT_TABLE)
    )
}

/// Divide-and-round each coefficient of a natural-order DCT block by its
/// corresponding quantization table entry.
///
/// Rounding is "to nearest, ties away from zero", matching the encoder's
/// rounding rule for both the DCT-to-quantized step and the scaling
/// above.
pub(crate) fn quantize_block(coeffs: &[f32; 64], table: &QuantTable) -> [i32; 64] {
    let mut out = [0i32; 64];
    for i in 0..64 {
        out[i] = round_half_away_from_zero(coeffs[i] / f32::from(table.natural[i]));
    }
    out
}

fn round_half_away_from_zero(v: f32) -> i32 {
    if v >= 0.0 {
        (v + 0.5).floor() as i32
    } else {
        (v - 0.5).ceil() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_100_is_identity_after_rounding() {
        let (luma, chroma) = build_quant_tables(100);
        assert!(luma.natural.iter().all(|&v| v == 1));
        assert!(chroma.natural.iter().all(|&v| v == 1));
    }

    #[test]
    fn quality_1_clamps_to_255_or_floors_at_1() {
        let (luma, _) = build_quant_tables(1);
        assert!(luma.natural.iter().all(|&v| v == 255 || v == 1));
    }

    #[test]
    fn zigzag_materialization_matches_order() {
        let table = QuantTable {
            natural: core::array::from_fn(|i| i as u16)
        };
        let zz = table.zigzag();
        for (k, &v) in zz.iter().enumerate() {
            assert_eq!(v as usize, ZIGZAG_ORDER[k]);
        }
    }

    #[test]
    fn quantize_rounds_ties_away_from_zero() {
        let table = QuantTable {
            natural: [2; 64]
        };
        let mut coeffs = [0.0f32; 64];
        coeffs[0] = 3.0; // 3/2 = 1.5 -> rounds to 2
        coeffs[1] = -3.0; // -1.5 -> rounds to -2
        let q = quantize_block(&coeffs, &table);
        assert_eq!(q[0], 2);
        assert_eq!(q[1], -2);
    }
}
