/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//#![no_std]
#![forbid(unsafe_code)]
#![macro_use]
extern crate alloc;

//! A baseline, sequential JFIF/JPEG encoder.
//!
//! This crate turns an in-memory 24-bit RGB raster into a byte stream
//! conforming to the sequential, baseline DCT process of the JPEG
//! standard with a JFIF `APP0` segment.
//!
//! Supported:
//!  - 4:4:4, 4:2:2 and 4:2:0 chroma subsampling
//!  - Quality-scaled quantization tables derived from the JPEG Annex K
//!    example tables
//!  - Canonical Huffman codes derived at encode time from the Annex K
//!    `bits`/`huffval` tables
//!
//! Not supported (see the crate's design notes): progressive or
//! hierarchical JPEG, arithmetic coding, restart markers, optimized
//! (custom) Huffman tables, embedded color profiles or EXIF.
//!
//! # Example
//! ```no_run
//! use zune_jpeg_encode::{encode, JpegEncoderOptions, RgbImage, Sampling};
//!
//! fn main() -> Result<(), zune_jpeg_encode::JpegEncodeErrors> {
//!     let (width, height) = (16, 16);
//!     let r = vec![128u8; width * height];
//!     let g = vec![128u8; width * height];
//!     let b = vec![128u8; width * height];
//!
//!     let image = RgbImage::new(width, height, &r, &g, &b)?;
//!     let options = JpegEncoderOptions::new(50, Sampling::S444);
//!
//!     let jpeg_bytes = encode(&image, &options)?;
//!     println!("Encoded {} bytes", jpeg_bytes.len());
//!     Ok(())
//! }
//! ```

pub use crate::color_convert::YCbCrImage;
pub use crate::encoder::encode;
pub use crate::errors::JpegEncodeErrors;
pub use crate::options::{JpegEncoderOptions, Sampling};
pub use crate::rgb::RgbImage;

mod bitwriter;
mod block;
mod color_convert;
mod dct;
mod encoder;
mod entropy;
mod errors;
mod huffman;
mod options;
mod plane;
mod quant;
mod rgb;
mod segments;
mod subsample;
mod tables;
mod zigzag;
