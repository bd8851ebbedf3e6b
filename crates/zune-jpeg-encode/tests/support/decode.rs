/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A small baseline-sequential JPEG decoder, written only to let the
//! integration tests verify that this crate's encoder output actually
//! reconstructs the source image. Not part of the published crate.
//!
//! Supports exactly what `zune_jpeg_encode::encode` ever emits: SOI,
//! APP0, one DQT segment, SOF0 (3 components, 8-bit), one DHT segment
//! carrying up to four tables, one non-interleaved-scan SOS header, and
//! non-progressive, non-arithmetic entropy coding. Anything else panics.

use std::collections::HashMap;

const ZIGZAG_ORDER: [usize; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27, 20,
    13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58, 59,
    52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63
];

pub struct DecodedImage {
    pub width:  usize,
    pub height: usize,
    pub r:      Vec<u8>,
    pub g:      Vec<u8>,
    pub b:      Vec<u8>
}

/// Canonical Huffman decode table, built from a DHT table's `(bits,
/// huffval)` definition using the standard mincode/maxcode/valptr
/// scheme (JPEG Annex F.2.2.3).
struct HuffDecodeTable {
    mincode: [i32; 17],
    maxcode: [i32; 17],
    valptr:  [usize; 17],
    huffval: Vec<u8>
}

impl HuffDecodeTable {
    fn build(bits: &[u8; 16], huffval: Vec<u8>) -> Self {
        let mut mincode = [0i32; 17];
        let mut maxcode = [-1i32; 17];
        let mut valptr = [0usize; 17];

        let mut code: i32 = 0;
        let mut k: usize = 0;
        for l in 1..=16usize {
            let count = bits[l - 1] as i32;
            if count == 0 {
                maxcode[l] = -1;
            } else {
                valptr[l] = k;
                mincode[l] = code;
                code += count;
                k += count as usize;
                maxcode[l] = code - 1;
            }
            code <<= 1;
        }

        HuffDecodeTable { mincode, maxcode, valptr, huffval }
    }

    fn decode(&self, bits: &mut BitReader) -> u8 {
        let mut code = bits.next_bit() as i32;
        let mut l = 1usize;
        while l <= 16 && self.maxcode[l] < code {
            code = (code << 1) | bits.next_bit() as i32;
            l += 1;
        }
        let idx = self.valptr[l] + (code - self.mincode[l]) as usize;
        self.huffval[idx]
    }
}

struct BitReader<'a> {
    data:     &'a [u8],
    byte_pos: usize,
    bit_pos:  u8
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        BitReader { data, byte_pos: 0, bit_pos: 0 }
    }

    fn next_bit(&mut self) -> u8 {
        if self.byte_pos >= self.data.len() {
            return 0;
        }
        let byte = self.data[self.byte_pos];
        let bit = (byte >> (7 - self.bit_pos)) & 1;
        self.bit_pos += 1;
        if self.bit_pos == 8 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }
        bit
    }

    fn next_bits(&mut self, n: u8) -> u16 {
        let mut v = 0u16;
        for _ in 0..n {
            v = (v << 1) | u16::from(self.next_bit());
        }
        v
    }
}

/// Invert the encoder's `amplitude_bits`: recover the signed value a
/// `size`-bit amplitude field represents (JPEG's "EXTEND" procedure).
fn extend(raw: u16, size: u8) -> i32 {
    if size == 0 {
        return 0;
    }
    let half = 1i32 << (size - 1);
    let raw = raw as i32;
    if raw < half {
        raw - (1 << size) + 1
    } else {
        raw
    }
}

fn cos_table() -> [[f32; 8]; 8] {
    let mut table = [[0.0f32; 8]; 8];
    for (x, row) in table.iter_mut().enumerate() {
        for (u, slot) in row.iter_mut().enumerate() {
            *slot = ((2 * x + 1) as f32 * u as f32 * core::f32::consts::PI / 16.0).cos();
        }
    }
    table
}

fn alpha(u: usize) -> f32 {
    if u == 0 { core::f32::consts::FRAC_1_SQRT_2 } else { 1.0 }
}

/// Inverse of the encoder's separable forward DCT-II: recovers spatial
/// samples from natural-order (row-major) frequency coefficients.
fn inverse_dct(coeff: &[f32; 64]) -> [f32; 64] {
    let cos = cos_table();

    let mut tmp = [0.0f32; 64];
    for x in 0..8 {
        for v in 0..8 {
            let mut sum = 0.0f32;
            for u in 0..8 {
                sum += alpha(u) * coeff[v * 8 + u] * cos[x][u];
            }
            tmp[x * 8 + v] = 0.5 * sum;
        }
    }

    let mut out = [0.0f32; 64];
    for x in 0..8 {
        for y in 0..8 {
            let mut sum = 0.0f32;
            for v in 0..8 {
                sum += alpha(v) * tmp[x * 8 + v] * cos[y][v];
            }
            out[y * 8 + x] = 0.5 * sum;
        }
    }

    out
}

fn round_up_to_multiple(n: usize, multiple: usize) -> usize {
    (n + multiple - 1) / multiple * multiple
}

struct Component {
    id: u8,
    h:  usize,
    v:  usize,
    tq: usize
}

/// Decode a baseline JPEG produced by this crate's own encoder.
///
/// Panics on anything it doesn't recognize; this is a test harness, not
/// a general-purpose decoder.
pub fn decode_jpeg(bytes: &[u8]) -> DecodedImage {
    assert_eq!(&bytes[0..2], &[0xFF, 0xD8], "missing SOI");

    let mut pos = 2usize;
    let mut qtables: [[u16; 64]; 2] = [[0; 64]; 2];
    let mut width = 0usize;
    let mut height = 0usize;
    let mut components: Vec<Component> = Vec::new();
    let mut huff: HashMap<(u8, u8), HuffDecodeTable> = HashMap::new();
    let mut scan_components: Vec<(u8, u8, u8)> = Vec::new();

    loop {
        assert_eq!(bytes[pos], 0xFF, "expected marker prefix");
        let marker = bytes[pos + 1];
        pos += 2;

        match marker {
            0xE0 => {
                let len = u16::from_be_bytes([bytes[pos], bytes[pos + 1]]) as usize;
                pos += len;
            }
            0xDB => {
                let len = u16::from_be_bytes([bytes[pos], bytes[pos + 1]]) as usize;
                let seg_end = pos + len;
                let mut p = pos + 2;
                while p < seg_end {
                    let tq = bytes[p];
                    p += 1;
                    let id = (tq & 0x0F) as usize;
                    let mut table = [0u16; 64];
                    for (k, slot) in table.iter_mut().enumerate() {
                        *slot = u16::from(bytes[p + k]);
                    }
                    p += 64;
                    qtables[id] = table;
                }
                pos = seg_end;
            }
            0xC0 => {
                let len = u16::from_be_bytes([bytes[pos], bytes[pos + 1]]) as usize;
                let seg_end = pos + len;
                let mut p = pos + 2;
                let precision = bytes[p];
                p += 1;
                assert_eq!(precision, 8, "only 8-bit precision is supported");
                height = u16::from_be_bytes([bytes[p], bytes[p + 1]]) as usize;
                p += 2;
                width = u16::from_be_bytes([bytes[p], bytes[p + 1]]) as usize;
                p += 2;
                let ncomp = bytes[p];
                p += 1;
                for _ in 0..ncomp {
                    let id = bytes[p];
                    let hv = bytes[p + 1];
                    let tq = bytes[p + 2];
                    p += 3;
                    components.push(Component {
                        id,
                        h: (hv >> 4) as usize,
                        v: (hv & 0x0F) as usize,
                        tq: tq as usize
                    });
                }
                pos = seg_end;
            }
            0xC4 => {
                let len = u16::from_be_bytes([bytes[pos], bytes[pos + 1]]) as usize;
                let seg_end = pos + len;
                let mut p = pos + 2;
                while p < seg_end {
                    let class_id = bytes[p];
                    p += 1;
                    let class = class_id >> 4;
                    let id = class_id & 0x0F;
                    let mut bits = [0u8; 16];
                    bits.copy_from_slice(&bytes[p..p + 16]);
                    p += 16;
                    let total: usize = bits.iter().map(|&b| b as usize).sum();
                    let huffval = bytes[p..p + total].to_vec();
                    p += total;
                    huff.insert((class, id), HuffDecodeTable::build(&bits, huffval));
                }
                pos = seg_end;
            }
            0xDA => {
                let mut p = pos + 2;
                let ncomp = bytes[p];
                p += 1;
                for _ in 0..ncomp {
                    let id = bytes[p];
                    let sel = bytes[p + 1];
                    p += 2;
                    scan_components.push((id, sel >> 4, sel & 0x0F));
                }
                p += 3; // Ss, Se, Ah/Al
                pos = p;
                break;
            }
            other => panic!("unsupported marker FF{other:02X}")
        }
    }

    let mut scan = Vec::new();
    loop {
        let b = bytes[pos];
        if b == 0xFF {
            let next = bytes[pos + 1];
            if next == 0x00 {
                scan.push(0xFFu8);
                pos += 2;
            } else {
                break; // EOI
            }
        } else {
            scan.push(b);
            pos += 1;
        }
    }

    let hmax = components.iter().map(|c| c.h).max().unwrap();
    let vmax = components.iter().map(|c| c.v).max().unwrap();
    let mcu_w = 8 * hmax;
    let mcu_h = 8 * vmax;
    let pad_w = round_up_to_multiple(width, mcu_w);
    let pad_h = round_up_to_multiple(height, mcu_h);
    let mcus_wide = pad_w / mcu_w;
    let mcus_high = pad_h / mcu_h;

    let y_comp = components.iter().find(|c| c.id == 1).unwrap();
    let cb_comp = components.iter().find(|c| c.id == 2).unwrap();
    let cr_comp = components.iter().find(|c| c.id == 3).unwrap();
    let sel = |id: u8| scan_components.iter().find(|c| c.0 == id).map(|c| (c.1, c.2)).unwrap();
    let (y_dc_id, y_ac_id) = sel(1);
    let (cb_dc_id, cb_ac_id) = sel(2);
    let (cr_dc_id, cr_ac_id) = sel(3);

    let cb_w = pad_w / hmax;
    let cb_h = pad_h / vmax;

    let mut y_plane = vec![0u8; pad_w * pad_h];
    let mut cb_plane = vec![0u8; cb_w * cb_h];
    let mut cr_plane = vec![0u8; cb_w * cb_h];

    let mut reader = BitReader::new(&scan);
    let mut y_dc_pred = 0i32;
    let mut cb_dc_pred = 0i32;
    let mut cr_dc_pred = 0i32;

    let decode_block = |reader: &mut BitReader,
                         dc_table: &HuffDecodeTable,
                         ac_table: &HuffDecodeTable,
                         quant: &[u16; 64],
                         dc_pred: &mut i32|
     -> [u8; 64] {
        let size = dc_table.decode(reader);
        let diff = if size == 0 { 0 } else { extend(reader.next_bits(size), size) };
        *dc_pred += diff;

        let mut zz = [0i32; 64];
        zz[0] = *dc_pred;

        let mut k = 1usize;
        while k < 64 {
            let symbol = ac_table.decode(reader);
            let run = symbol >> 4;
            let size = symbol & 0x0F;
            if size == 0 {
                if run == 15 {
                    k += 16;
                    continue;
                }
                break; // EOB
            }
            k += run as usize;
            if k >= 64 {
                break;
            }
            zz[k] = extend(reader.next_bits(size), size);
            k += 1;
        }

        let mut natural = [0.0f32; 64];
        for (k, &coeff) in zz.iter().enumerate() {
            natural[ZIGZAG_ORDER[k]] = (coeff * i32::from(quant[k])) as f32;
        }

        let spatial = inverse_dct(&natural);
        let mut out = [0u8; 64];
        for (slot, &s) in out.iter_mut().zip(spatial.iter()) {
            *slot = (s.round() + 128.0).clamp(0.0, 255.0) as u8;
        }
        out
    };

    let place_block = |plane: &mut [u8], plane_w: usize, block: &[u8; 64], bx: usize, by: usize| {
        for row in 0..8 {
            let dst_start = (by * 8 + row) * plane_w + bx * 8;
            plane[dst_start..dst_start + 8].copy_from_slice(&block[row * 8..row * 8 + 8]);
        }
    };

    for mcu_row in 0..mcus_high {
        for mcu_col in 0..mcus_wide {
            for by in 0..vmax {
                for bx in 0..hmax {
                    let block = decode_block(
                        &mut reader,
                        huff.get(&(0, y_dc_id)).unwrap(),
                        huff.get(&(1, y_ac_id)).unwrap(),
                        &qtables[y_comp.tq],
                        &mut y_dc_pred
                    );
                    let block_col = mcu_col * hmax + bx;
                    let block_row = mcu_row * vmax + by;
                    place_block(&mut y_plane, pad_w, &block, block_col, block_row);
                }
            }

            let cb_block = decode_block(
                &mut reader,
                huff.get(&(0, cb_dc_id)).unwrap(),
                huff.get(&(1, cb_ac_id)).unwrap(),
                &qtables[cb_comp.tq],
                &mut cb_dc_pred
            );
            place_block(&mut cb_plane, cb_w, &cb_block, mcu_col, mcu_row);

            let cr_block = decode_block(
                &mut reader,
                huff.get(&(0, cr_dc_id)).unwrap(),
                huff.get(&(1, cr_ac_id)).unwrap(),
                &qtables[cr_comp.tq],
                &mut cr_dc_pred
            );
            place_block(&mut cr_plane, cb_w, &cr_block, mcu_col, mcu_row);
        }
    }

    let cb_up = upsample(&cb_plane, cb_w, cb_h, hmax, vmax);
    let cr_up = upsample(&cr_plane, cb_w, cb_h, hmax, vmax);

    let mut r = vec![0u8; width * height];
    let mut g = vec![0u8; width * height];
    let mut b = vec![0u8; width * height];

    for y in 0..height {
        for x in 0..width {
            let yv = f32::from(y_plane[y * pad_w + x]);
            let cb = f32::from(cb_up[y * pad_w + x]) - 128.0;
            let cr = f32::from(cr_up[y * pad_w + x]) - 128.0;

            let idx = y * width + x;
            r[idx] = (yv + 1.402 * cr).round().clamp(0.0, 255.0) as u8;
            g[idx] = (yv - 0.344136 * cb - 0.714136 * cr).round().clamp(0.0, 255.0) as u8;
            b[idx] = (yv + 1.772 * cb).round().clamp(0.0, 255.0) as u8;
        }
    }

    DecodedImage { width, height, r, g, b }
}

fn upsample(plane: &[u8], sub_w: usize, sub_h: usize, group_w: usize, group_h: usize) -> Vec<u8> {
    let out_w = sub_w * group_w;
    let out_h = sub_h * group_h;
    let mut out = vec![0u8; out_w * out_h];
    for y in 0..out_h {
        for x in 0..out_w {
            out[y * out_w + x] = plane[(y / group_h) * sub_w + (x / group_w)];
        }
    }
    out
}

/// Peak signal-to-noise ratio between two equal-length byte buffers,
/// in dB. Returns `f64::INFINITY` for a bit-exact match.
pub fn psnr(a: &[u8], b: &[u8]) -> f64 {
    assert_eq!(a.len(), b.len());
    let mse: f64 =
        a.iter().zip(b.iter()).map(|(&x, &y)| { let d = f64::from(x) - f64::from(y); d * d }).sum::<f64>()
            / a.len() as f64;
    if mse == 0.0 {
        return f64::INFINITY;
    }
    10.0 * (255.0 * 255.0 / mse).log10()
}

/// Largest per-sample absolute difference between two equal-length
/// byte buffers.
pub fn max_abs_diff(a: &[u8], b: &[u8]) -> u8 {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(&x, &y)| x.abs_diff(y)).max().unwrap_or(0)
}
