/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use zune_jpeg_encode::{encode, JpegEncoderOptions, RgbImage, Sampling};

mod support;
use support::decode::{decode_jpeg, max_abs_diff, psnr};

fn solid(width: usize, height: usize, value: u8) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let len = width * height;
    (vec![value; len], vec![value; len], vec![value; len])
}

/// S1: a solid-color image should encode and decode back to a valid
/// JPEG byte stream with the mandatory markers in place.
#[test]
fn s1_solid_color_produces_a_well_formed_file() {
    let (r, g, b) = solid(16, 16, 128);
    let image = RgbImage::new(16, 16, &r, &g, &b).unwrap();
    let options = JpegEncoderOptions::new(50, Sampling::S444);
    let bytes = encode(&image, &options).unwrap();

    assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    assert!(bytes.windows(2).any(|w| w == [0xFF, 0xDB])); // DQT present
    assert!(bytes.windows(2).any(|w| w == [0xFF, 0xC0])); // SOF0 present
    assert!(bytes.windows(2).any(|w| w == [0xFF, 0xC4])); // DHT present
    assert!(bytes.windows(2).any(|w| w == [0xFF, 0xDA])); // SOS present
}

/// S2: an 8x8 checkerboard is exactly one MCU under 4:4:4 and should
/// still produce a valid file with room for non-trivial AC energy.
#[test]
fn s2_checkerboard_single_block() {
    let mut r = vec![0u8; 64];
    for y in 0..8 {
        for x in 0..8 {
            if (x + y) % 2 == 0 {
                r[y * 8 + x] = 255;
            }
        }
    }
    let g = r.clone();
    let b = r.clone();
    let image = RgbImage::new(8, 8, &r, &g, &b).unwrap();
    let options = JpegEncoderOptions::new(75, Sampling::S444);
    let bytes = encode(&image, &options).unwrap();

    assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);

    // The decoded image must reconstruct the checkerboard within ±10
    // per channel per pixel, even with a quantization step applied.
    let decoded = decode_jpeg(&bytes);
    assert_eq!(decoded.width, 8);
    assert_eq!(decoded.height, 8);
    assert!(max_abs_diff(&decoded.r, &r) <= 10, "R channel drifted beyond tolerance");
    assert!(max_abs_diff(&decoded.g, &g) <= 10, "G channel drifted beyond tolerance");
    assert!(max_abs_diff(&decoded.b, &b) <= 10, "B channel drifted beyond tolerance");
}

/// S3: non-MCU-aligned dimensions under 4:2:0 must still encode
/// without panicking or producing a truncated file, and the decoded
/// image must reproduce the gradient shape in the original 17x9 region.
#[test]
fn s3_non_multiple_of_eight_gradient() {
    let width = 17;
    let height = 9;
    let mut r = vec![0u8; width * height];
    for (x, slot) in r.iter_mut().enumerate() {
        *slot = ((x % width) as u8).wrapping_mul(15);
    }
    let g = r.clone();
    let b = r.clone();
    let image = RgbImage::new(width, height, &r, &g, &b).unwrap();
    let options = JpegEncoderOptions::new(50, Sampling::S420);
    let bytes = encode(&image, &options).unwrap();

    assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);

    let decoded = decode_jpeg(&bytes);
    assert_eq!(decoded.width, width);
    assert_eq!(decoded.height, height);

    // The gradient rises left-to-right; every decoded row should
    // preserve that ordering even where chroma subsampling and
    // quantization have smoothed the exact values.
    for y in 0..height {
        let row = &decoded.r[y * width..(y + 1) * width];
        assert!(row[width - 1] as i32 - row[0] as i32 > 50, "gradient shape lost on row {y}");
    }
    assert!(psnr(&decoded.r, &r) > 20.0, "gradient PSNR too low: {}", psnr(&decoded.r, &r));
}

/// S4: quality extremes must both still produce valid files.
#[test]
fn s4_quality_boundaries_both_encode() {
    let (r, g, b) = solid(64, 64, 90);
    let image = RgbImage::new(64, 64, &r, &g, &b).unwrap();

    for quality in [1u8, 100u8] {
        let options = JpegEncoderOptions::new(quality, Sampling::S444);
        let bytes = encode(&image, &options).unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }
}

/// S5: the same image under all three sampling modes should generally
/// get smaller as chroma is subsampled more aggressively.
#[test]
fn s5_sampling_parity_file_sizes() {
    let width = 32;
    let height = 32;
    let mut r = vec![0u8; width * height];
    for (i, slot) in r.iter_mut().enumerate() {
        *slot = ((i * 7) % 256) as u8;
    }
    let g = r.clone();
    let b = r.clone();
    let image = RgbImage::new(width, height, &r, &g, &b).unwrap();

    let size_of = |sampling| {
        let options = JpegEncoderOptions::new(80, sampling);
        encode(&image, &options).unwrap().len()
    };

    let s444 = size_of(Sampling::S444);
    let s422 = size_of(Sampling::S422);
    let s420 = size_of(Sampling::S420);

    assert!(s444 >= s422);
    assert!(s422 >= s420);

    // Every sampling mode must still round-trip to something recognizably
    // close to the source, not just "a valid file".
    for sampling in [Sampling::S444, Sampling::S422, Sampling::S420] {
        let options = JpegEncoderOptions::new(80, sampling);
        let bytes = encode(&image, &options).unwrap();
        let decoded = decode_jpeg(&bytes);
        assert_eq!(decoded.width, width);
        assert_eq!(decoded.height, height);
        assert!(psnr(&decoded.r, &r) > 25.0, "{sampling:?} PSNR too low");
    }
}

/// S6: a scan whose bit pattern produces a literal `0xFF` byte in the
/// entropy-coded payload must carry it as `FF 00`, and decoding must
/// strip the stuff byte and recover the original block.
#[test]
fn s6_byte_stuffing_round_trips_through_decode() {
    // High quality plus noisy high-frequency content reliably drives the
    // entropy coder's bit accumulator through a byte value of 0xFF.
    let width = 16;
    let height = 16;
    let mut r = vec![0u8; width * height];
    for (i, v) in r.iter_mut().enumerate() {
        *v = ((i * 37) % 256) as u8;
    }
    let g = r.clone();
    let b = r.clone();
    let image = RgbImage::new(width, height, &r, &g, &b).unwrap();
    let options = JpegEncoderOptions::new(90, Sampling::S444);
    let bytes = encode(&image, &options).unwrap();

    let sos_pos = bytes.windows(2).position(|w| w == [0xFF, 0xDA]).unwrap();
    let scan_start = sos_pos + 2 + 2 + 1 + 6 + 3;
    let eoi_pos = bytes.len() - 2;
    let scan = &bytes[scan_start..eoi_pos];
    assert!(
        scan.windows(2).any(|w| w == [0xFF, 0x00]),
        "scenario didn't actually produce a stuffed byte"
    );

    let decoded = decode_jpeg(&bytes);
    assert_eq!(decoded.width, width);
    assert_eq!(decoded.height, height);
    assert!(psnr(&decoded.r, &r) > 25.0, "stuffed scan failed to decode cleanly");
}

/// Property 9: round-tripping through a conforming baseline decoder
/// must reproduce the image with a PSNR floor that rises with quality.
#[test]
fn property_9_psnr_floor_rises_with_quality() {
    let width = 32;
    let height = 32;
    let mut r = vec![0u8; width * height];
    for (i, slot) in r.iter_mut().enumerate() {
        *slot = ((i * 13) % 256) as u8;
    }
    let g = r.clone();
    let b = r.clone();
    let image = RgbImage::new(width, height, &r, &g, &b).unwrap();

    let psnr_at = |quality| {
        let options = JpegEncoderOptions::new(quality, Sampling::S444);
        let bytes = encode(&image, &options).unwrap();
        let decoded = decode_jpeg(&bytes);
        psnr(&decoded.r, &r)
    };

    let low = psnr_at(20);
    let mid = psnr_at(60);
    let high = psnr_at(95);

    assert!(low < mid, "PSNR didn't rise from quality 20 ({low}) to 60 ({mid})");
    assert!(mid < high, "PSNR didn't rise from quality 60 ({mid}) to 95 ({high})");
}

/// Rejects planes whose length doesn't match `width * height`.
#[test]
fn mismatched_plane_length_is_rejected() {
    let r = vec![0u8; 10];
    let g = vec![0u8; 9];
    let b = vec![0u8; 10];
    assert!(RgbImage::new(5, 2, &r, &g, &b).is_err());
}

/// Encoding twice with identical input yields byte-identical output.
#[test]
fn encoding_is_deterministic_across_calls() {
    let (r, g, b) = solid(24, 24, 77);
    let image = RgbImage::new(24, 24, &r, &g, &b).unwrap();
    let options = JpegEncoderOptions::new(60, Sampling::S422);

    let first = encode(&image, &options).unwrap();
    let second = encode(&image, &options).unwrap();
    assert_eq!(first, second);
}
