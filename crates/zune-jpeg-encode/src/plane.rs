/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::vec;
use alloc::vec::Vec;

/// A flat, strided 8-bit sample grid.
///
/// Represented as a flat buffer with an implicit row stride equal to
/// `width`, per this crate's design notes: this eliminates the ragged
/// pointer-to-pointer ownership the original source used and makes
/// bounds checks cheap.
pub(crate) struct Plane {
    pub(crate) data:   Vec<u8>,
    pub(crate) width:  usize,
    pub(crate) height: usize
}

/// Round `n` up to the nearest multiple of `multiple`.
pub(crate) const fn round_up_to_multiple(n: usize, multiple: usize) -> usize {
    (n + multiple - 1) / multiple * multiple
}

/// Round `n` up to the nearest multiple of 8.
pub(crate) const fn pad8(n: usize) -> usize {
    round_up_to_multiple(n, 8)
}

/// Pad a `src_w x src_h` plane up to `pad_w x pad_h` by replicating the
/// last column/row into the extended region (edge extension).
///
/// Edge extension keeps DC offsets continuous across the padding
/// boundary and avoids the high-frequency ringing a zero-fill would
/// introduce into the DCT.
pub(crate) fn pad_plane(src: &[u8], src_w: usize, src_h: usize, pad_w: usize, pad_h: usize) -> Plane {
    debug_assert!(pad_w >= src_w && pad_h >= src_h);
    debug_assert_eq!(src.len(), src_w * src_h);

    let mut data = vec![0u8; pad_w * pad_h];

    for y in 0..pad_h {
        let src_y = y.min(src_h - 1);
        let src_row = &src[src_y * src_w..src_y * src_w + src_w];
        let dst_row = &mut data[y * pad_w..y * pad_w + pad_w];

        dst_row[..src_w].copy_from_slice(src_row);
        if pad_w > src_w {
            let last = src_row[src_w - 1];
            dst_row[src_w..].fill(last);
        }
    }

    Plane {
        data,
        width: pad_w,
        height: pad_h
    }
}
