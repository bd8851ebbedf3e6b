/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::vec::Vec;

use crate::bitwriter::BitWriter;
use crate::block::{extract_blocks, Block};
use crate::color_convert::rgb_to_ycbcr;
use crate::dct::forward_dct;
use crate::entropy::{encode_ac_run_length, magnitude_size, DcPredictor};
use crate::errors::JpegEncodeErrors;
use crate::huffman::{amplitude_bits, HuffmanTable, HuffmanTables};
use crate::options::JpegEncoderOptions;
use crate::plane::{pad_plane, round_up_to_multiple, Plane};
use crate::quant::{build_quant_tables, quantize_block, QuantTable};
use crate::rgb::RgbImage;
use crate::subsample::subsample_plane;
use crate::segments;
use crate::zigzag::zigzag_scan;

/// Compress `image` into a baseline sequential JPEG byte stream
/// conforming to the JFIF 1.02 profile.
///
/// This is the crate's single entry point; every other module is a
/// pipeline stage this function drives in order: color conversion,
/// MCU-aligned padding, chroma subsampling, block extraction, forward
/// DCT, quantization, zig-zag, DC prediction, AC run-length coding,
/// Huffman bit-packing, and segment assembly.
pub fn encode(image: &RgbImage, options: &JpegEncoderOptions) -> Result<Vec<u8>, JpegEncodeErrors> {
    let ycbcr = rgb_to_ycbcr(image);

    let (hmax, vmax) = options.sampling().max_factors();
    let (hmax, vmax) = (hmax as usize, vmax as usize);
    let mcu_w = 8 * hmax;
    let mcu_h = 8 * vmax;

    // All three planes are padded to the same MCU-aligned size before
    // subsampling; dividing an MCU-aligned dimension by its sampling
    // factor always lands on a multiple of 8, so the chroma planes
    // never need a second padding pass after being averaged down.
    let pad_w = round_up_to_multiple(ycbcr.width, mcu_w);
    let pad_h = round_up_to_multiple(ycbcr.height, mcu_h);

    let y_plane = pad_plane(&ycbcr.y, ycbcr.width, ycbcr.height, pad_w, pad_h);
    let cb_full = pad_plane(&ycbcr.cb, ycbcr.width, ycbcr.height, pad_w, pad_h);
    let cr_full = pad_plane(&ycbcr.cr, ycbcr.width, ycbcr.height, pad_w, pad_h);

    let cb_plane = subsample_plane(&cb_full, hmax, vmax);
    let cr_plane = subsample_plane(&cr_full, hmax, vmax);

    let y_blocks = extract_blocks(&y_plane);
    let cb_blocks = extract_blocks(&cb_plane);
    let cr_blocks = extract_blocks(&cr_plane);

    let (luma_quant, chroma_quant) = build_quant_tables(options.quality());
    let huffman_tables = HuffmanTables::build();

    let mcus_wide = pad_w / mcu_w;
    let mcus_high = pad_h / mcu_h;
    let y_blocks_wide = y_plane.width / 8;

    let mut writer = BitWriter::new();
    let mut y_dc = DcPredictor::new();
    let mut cb_dc = DcPredictor::new();
    let mut cr_dc = DcPredictor::new();

    for mcu_row in 0..mcus_high {
        for mcu_col in 0..mcus_wide {
            for by in 0..vmax {
                for bx in 0..hmax {
                    let row = mcu_row * vmax + by;
                    let col = mcu_col * hmax + bx;
                    let block = &y_blocks[row * y_blocks_wide + col];
                    encode_block(
                        block,
                        &luma_quant,
                        &mut y_dc,
                        &huffman_tables.dc_luma,
                        &huffman_tables.ac_luma,
                        &mut writer
                    );
                }
            }

            let chroma_index = mcu_row * mcus_wide + mcu_col;
            encode_block(
                &cb_blocks[chroma_index],
                &chroma_quant,
                &mut cb_dc,
                &huffman_tables.dc_chroma,
                &huffman_tables.ac_chroma,
                &mut writer
            );
            encode_block(
                &cr_blocks[chroma_index],
                &chroma_quant,
                &mut cr_dc,
                &huffman_tables.dc_chroma,
                &huffman_tables.ac_chroma,
                &mut writer
            );
        }
    }

    let scan_payload = writer.finish();

    let mut out = Vec::new();
    segments::write_soi(&mut out);
    segments::write_app0(&mut out);
    segments::write_dqt(&mut out, &luma_quant, &chroma_quant);
    segments::write_sof0(&mut out, image.width() as u16, image.height() as u16, options.sampling());
    segments::write_dht(&mut out, &huffman_tables);
    segments::write_sos_header(&mut out);
    out.extend_from_slice(&scan_payload);
    segments::write_eoi(&mut out);

    Ok(out)
}

fn encode_block(
    block: &Block, quant: &QuantTable, dc_pred: &mut DcPredictor, dc_huff: &HuffmanTable,
    ac_huff: &HuffmanTable, writer: &mut BitWriter
) {
    let coeffs = forward_dct(block);
    let quantized = quantize_block(&coeffs, quant);
    let zz = zigzag_scan(&quantized);

    let dc_diff = dc_pred.next_diff(zz[0]);
    let dc_size = magnitude_size(dc_diff);
    let (code, len) = dc_huff.code_for(dc_size);
    writer.put_bits(code, len);
    writer.put_bits(amplitude_bits(dc_diff, dc_size), dc_size);

    let mut ac = [0i32; 63];
    ac.copy_from_slice(&zz[1..64]);
    for symbol in encode_ac_run_length(&ac) {
        let byte = (symbol.run << 4) | symbol.size;
        let (code, len) = ac_huff.code_for(byte);
        writer.put_bits(code, len);
        if symbol.size > 0 {
            writer.put_bits(amplitude_bits(symbol.amplitude, symbol.size), symbol.size);
        }
    }
}
