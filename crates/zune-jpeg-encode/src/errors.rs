/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::string::String;
use core::fmt::{Debug, Formatter};

use zune_core::bytestream::ZByteIoError;

/// Errors that can occur while encoding a JPEG.
#[non_exhaustive]
pub enum JpegEncodeErrors {
    /// The image dimensions or plane lengths are not self consistent,
    /// e.g. width or height is zero, or a plane's length isn't `width*height`.
    InvalidInput(&'static str),
    /// The sampling mode is not one of the three supported variants.
    InvalidParams(&'static str),
    /// Writing the encoded bytes to the output sink failed.
    Io(ZByteIoError),
    /// An invariant the encoder relies on internally was violated.
    ///
    /// Reaching this is a bug in the encoder, not a consequence of bad input.
    Internal(String)
}

impl Debug for JpegEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidInput(reason) => {
                writeln!(f, "Invalid input: {}", reason)
            }
            Self::InvalidParams(reason) => {
                writeln!(f, "Invalid parameters: {}", reason)
            }
            Self::Io(err) => {
                writeln!(f, "I/O error: {:?}", err)
            }
            Self::Internal(reason) => {
                writeln!(f, "Internal encoder error (this is a bug): {}", reason)
            }
        }
    }
}

impl From<ZByteIoError> for JpegEncodeErrors {
    fn from(value: ZByteIoError) -> Self {
        JpegEncodeErrors::Io(value)
    }
}
