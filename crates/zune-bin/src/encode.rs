/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

use clap::ArgMatches;
use log::info;
use zune_core::bytestream::ZCursor;
use zune_bmp::{BmpDecoder, BmpPixelFormat};
use zune_jpeg_encode::{encode, JpegEncoderOptions, RgbImage};

use crate::cmd_args::CliSampling;

/// Everything that can go wrong driving the BMP-to-JPEG workflow from
/// the command line; distinct from [`zune_jpeg_encode::JpegEncodeErrors`]
/// since failures here can also originate in the BMP collaborator or
/// the output sink.
pub enum WorkflowError {
    Bmp(zune_bmp::BmpDecoderErrors),
    UnsupportedBmp(BmpPixelFormat),
    MissingDimensions,
    Encode(zune_jpeg_encode::JpegEncodeErrors),
    Io(std::io::Error)
}

impl Debug for WorkflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowError::Bmp(e) => writeln!(f, "error reading BMP: {e:?}"),
            WorkflowError::UnsupportedBmp(fmt) => {
                writeln!(f, "unsupported BMP pixel format {fmt:?}, only 24-bit uncompressed BMPs are supported")
            }
            WorkflowError::MissingDimensions => {
                writeln!(f, "could not determine BMP dimensions after reading headers")
            }
            WorkflowError::Encode(e) => writeln!(f, "{e:?}"),
            WorkflowError::Io(e) => writeln!(f, "I/O error: {e}")
        }
    }
}

/// Run the `encode <input.bmp> <output.jpg> <quality> <sampling>` workflow.
pub fn run_encode(options: &ArgMatches) -> Result<(), WorkflowError> {
    let input = options.get_one::<std::ffi::OsString>("in").unwrap();
    let output = options.get_one::<std::ffi::OsString>("out").unwrap();
    let quality = *options.get_one::<u8>("quality").unwrap();
    let sampling = options.get_one::<CliSampling>("sampling").unwrap().into_sampling();

    info!("Reading {}", Path::new(input).display());
    let raw = fs::read(input).map_err(WorkflowError::Io)?;

    let mut decoder = BmpDecoder::new(ZCursor::new(raw));
    decoder.decode_headers().map_err(WorkflowError::Bmp)?;

    // `colorspace()` alone can't tell a true 24-bit file apart from a
    // 16-bit RGB555/RGB565 or an 8-bit PAL8 source expanded to RGB, since
    // all of them project onto `ColorSpace::RGB`. Gate on the exact
    // pixel format instead.
    match decoder.pixel_format() {
        Some(BmpPixelFormat::RGB) => {}
        Some(other) => return Err(WorkflowError::UnsupportedBmp(other)),
        None => return Err(WorkflowError::UnsupportedBmp(BmpPixelFormat::None))
    }

    let (width, height) = decoder
        .dimensions()
        .ok_or(WorkflowError::MissingDimensions)?;
    let pixels = decoder.decode().map_err(WorkflowError::Bmp)?;

    let len = width * height;
    let mut r = vec![0u8; len];
    let mut g = vec![0u8; len];
    let mut b = vec![0u8; len];
    for i in 0..len {
        r[i] = pixels[i * 3];
        g[i] = pixels[i * 3 + 1];
        b[i] = pixels[i * 3 + 2];
    }

    let image = RgbImage::new(width, height, &r, &g, &b).map_err(WorkflowError::Encode)?;
    let options = JpegEncoderOptions::new(quality, sampling);

    info!("Encoding {width}x{height} image at quality {quality}");
    let jpeg = encode(&image, &options).map_err(WorkflowError::Encode)?;

    fs::write(output, jpeg).map_err(WorkflowError::Io)?;
    info!("Wrote {}", Path::new(output).display());

    Ok(())
}
