/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::vec::Vec;

use crate::tables::{HuffmanSpec, AC_CHROMA, AC_LUMA, DC_CHROMA, DC_LUMA};

/// A `(code, length)` pair for one Huffman symbol, MSB-first: only the
/// low `length` bits of `code` are meaningful.
#[derive(Copy, Clone, Default)]
struct Code {
    bits: u16,
    len:  u8
}

/// Canonical Huffman codes for all 256 possible byte symbols, derived
/// once from a table's `(bits, huffval)` definition per Annex C.2
/// rather than carried as pre-encoded literals, per this crate's design
/// notes.
pub(crate) struct HuffmanTable {
    codes: [Option<Code>; 256]
}

impl HuffmanTable {
    fn build(spec: &HuffmanSpec) -> HuffmanTable {
        let mut sizes = Vec::new();
        for (len_idx, &count) in spec.bits.iter().enumerate() {
            let len = (len_idx + 1) as u8;
            for _ in 0..count {
                sizes.push(len);
            }
        }

        let mut codes_by_position = alloc::vec![0u16; sizes.len()];
        let mut code: u16 = 0;
        let mut size_idx = 0usize;
        while size_idx < sizes.len() {
            let current_size = sizes[size_idx];
            while size_idx < sizes.len() && sizes[size_idx] == current_size {
                codes_by_position[size_idx] = code;
                code += 1;
                size_idx += 1;
            }
            code <<= 1;
        }

        let mut codes = [None; 256];
        for (i, &symbol) in spec.huffval.iter().enumerate() {
            codes[symbol as usize] = Some(Code {
                bits: codes_by_position[i],
                len:  sizes[i]
            });
        }

        HuffmanTable { codes }
    }

    /// The `(code, length)` pair for `symbol`. Panics if the table has
    /// no code for it, which would mean a stage upstream produced a
    /// `size` category or run/size byte outside the default tables'
    /// coverage — a violated invariant, not a recoverable condition.
    pub(crate) fn code_for(&self, symbol: u8) -> (u16, u8) {
        let code = self.codes[symbol as usize].unwrap_or_else(|| {
            panic!("no Huffman code for symbol {symbol:#04x}: encoder invariant violated")
        });
        (code.bits, code.len)
    }
}

/// The four default Annex K Huffman tables, codes derived once per encode.
pub(crate) struct HuffmanTables {
    pub(crate) dc_luma:   HuffmanTable,
    pub(crate) ac_luma:   HuffmanTable,
    pub(crate) dc_chroma: HuffmanTable,
    pub(crate) ac_chroma: HuffmanTable
}

impl HuffmanTables {
    pub(crate) fn build() -> HuffmanTables {
        HuffmanTables {
            dc_luma:   HuffmanTable::build(&DC_LUMA),
            ac_luma:   HuffmanTable::build(&AC_LUMA),
            dc_chroma: HuffmanTable::build(&DC_CHROMA),
            ac_chroma: HuffmanTable::build(&AC_CHROMA)
        }
    }
}

/// Encode the `size`-bit amplitude field for a DC difference or AC
/// coefficient, per §4.11: non-negative values are written as-is;
/// negative values are written as `v - 1` truncated to `size` bits
/// (the decoder recovers the sign from the field's MSB).
pub(crate) fn amplitude_bits(v: i32, size: u8) -> u16 {
    if size == 0 {
        return 0;
    }
    let field = if v >= 0 { v } else { v - 1 };
    (field as u32 & ((1u32 << size) - 1)) as u16
}
