/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::sync::OnceLock;

use crate::block::Block;

const PI: f32 = core::f32::consts::PI;

/// `COS_TABLE[x][u] = cos((2x + 1) * u * pi / 16)`, the basis used by
/// both passes of the separable 2-D DCT-II.
fn cos_table() -> &'static [[f32; 8]; 8] {
    static TABLE: OnceLock<[[f32; 8]; 8]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [[0.0f32; 8]; 8];
        for (x, row) in table.iter_mut().enumerate() {
            for (u, slot) in row.iter_mut().enumerate() {
                *slot = ((2 * x + 1) as f32 * u as f32 * PI / 16.0).cos();
            }
        }
        table
    })
}

fn alpha(u: usize) -> f32 {
    if u == 0 { core::f32::consts::FRAC_1_SQRT_2 } else { 1.0 }
}

/// Apply the forward 2-D DCT-II to a level-shifted 8x8 block, producing
/// natural-order (row-major) frequency coefficients.
///
/// Implemented as two passes of the separable 1-D transform (rows, then
/// columns) rather than a direct 4-nested-loop O(N^4) sum.
pub(crate) fn forward_dct(block: &Block) -> [f32; 64] {
    let cos = cos_table();
    let mut rows = [0.0f32; 64];

    // Pass 1: transform each row.
    for y in 0..8 {
        for u in 0..8 {
            let mut sum = 0.0f32;
            for x in 0..8 {
                sum += block.0[y * 8 + x] as f32 * cos[x][u];
            }
            rows[y * 8 + u] = 0.5 * alpha(u) * sum;
        }
    }

    // Pass 2: transform each column of the row-transformed intermediate.
    let mut out = [0.0f32; 64];
    for u in 0..8 {
        for v in 0..8 {
            let mut sum = 0.0f32;
            for y in 0..8 {
                sum += rows[y * 8 + u] * cos[y][v];
            }
            out[v * 8 + u] = 0.5 * alpha(v) * sum;
        }
    }

    out
}
