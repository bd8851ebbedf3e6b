/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use zune_core::log::warn;

/// Chroma subsampling mode.
///
/// The variant names follow the conventional `J:a:b` shorthand written
/// without colons (`S444`, `S422`, `S420`).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Sampling {
    /// No subsampling; Cb/Cr share the luma plane's dimensions.
    S444,
    /// Horizontal-only subsampling; Cb/Cr are half as wide as luma.
    S422,
    /// Both axes subsampled; Cb/Cr are half as wide and half as tall as luma.
    S420
}

impl Sampling {
    /// Maximum horizontal/vertical sampling factors `(Hmax, Vmax)` for this mode.
    pub const fn max_factors(self) -> (u8, u8) {
        match self {
            Sampling::S444 => (1, 1),
            Sampling::S422 => (2, 1),
            Sampling::S420 => (2, 2)
        }
    }

    /// Per-component `(H, V)` sampling factors for `(luma, chroma)`.
    pub const fn component_factors(self) -> ((u8, u8), (u8, u8)) {
        match self {
            Sampling::S444 => ((1, 1), (1, 1)),
            Sampling::S422 => ((2, 1), (1, 1)),
            Sampling::S420 => ((2, 2), (1, 1))
        }
    }

    /// Decode a CLI-style numeric id: `0=S444, 1=S422, 2=S420`.
    pub fn from_id(id: u8) -> Option<Sampling> {
        match id {
            0 => Some(Sampling::S444),
            1 => Some(Sampling::S422),
            2 => Some(Sampling::S420),
            _ => None
        }
    }
}

/// The quality value substituted whenever a caller supplies one outside
/// `[1, 100]`. Per the encoder's error handling rules this is a clamp
/// with a recorded warning, not an error.
const DEFAULT_QUALITY: u8 = 50;

/// Options controlling how [`encode`](crate::encode) compresses an image.
///
/// Every field here is actually consumed by the pipeline; this type
/// intentionally does not carry progressive/optimized-Huffman/metadata
/// knobs since the encoder never implements those features.
#[derive(Debug, Copy, Clone)]
pub struct JpegEncoderOptions {
    quality:  u8,
    sampling: Sampling
}

impl JpegEncoderOptions {
    /// Create new encoder options, clamping an out-of-range `quality` to
    /// [`DEFAULT_QUALITY`] and logging a warning when that happens.
    pub fn new(quality: u8, sampling: Sampling) -> JpegEncoderOptions {
        JpegEncoderOptions {
            quality: Self::clamp_quality(quality),
            sampling
        }
    }

    fn clamp_quality(quality: u8) -> u8 {
        if (1..=100).contains(&quality) {
            quality
        } else {
            warn!(
                "Quality {} is outside the valid range [1,100], clamping to {}",
                quality, DEFAULT_QUALITY
            );
            DEFAULT_QUALITY
        }
    }

    pub const fn quality(&self) -> u8 {
        self.quality
    }
    pub const fn sampling(&self) -> Sampling {
        self.sampling
    }

    pub fn set_quality(mut self, quality: u8) -> Self {
        self.quality = Self::clamp_quality(quality);
        self
    }
    pub fn set_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }
}

impl Default for JpegEncoderOptions {
    fn default() -> Self {
        JpegEncoderOptions {
            quality:  DEFAULT_QUALITY,
            sampling: Sampling::S444
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_in_range_is_preserved() {
        assert_eq!(JpegEncoderOptions::new(1, Sampling::S444).quality(), 1);
        assert_eq!(JpegEncoderOptions::new(100, Sampling::S444).quality(), 100);
        assert_eq!(JpegEncoderOptions::new(75, Sampling::S444).quality(), 75);
    }

    #[test]
    fn out_of_range_quality_clamps_to_fifty() {
        assert_eq!(JpegEncoderOptions::new(0, Sampling::S444).quality(), 50);
        assert_eq!(JpegEncoderOptions::new(101, Sampling::S444).quality(), 50);
        assert_eq!(JpegEncoderOptions::new(255, Sampling::S444).quality(), 50);
    }

    #[test]
    fn sampling_from_id_roundtrips() {
        assert_eq!(Sampling::from_id(0), Some(Sampling::S444));
        assert_eq!(Sampling::from_id(1), Some(Sampling::S422));
        assert_eq!(Sampling::from_id(2), Some(Sampling::S420));
        assert_eq!(Sampling::from_id(3), None);
    }
}
