//! Per-scanline dirty tracking.
//!
//! One bit per backbuffer row. Flushing walks the set bits, so an idle frame
//! costs a scan of `height / 64` words.

use alloc::vec::Vec;

use crate::error::GfxError;

pub struct DirtyLines {
    words: Vec<u64>,
    lines: usize,
}

impl DirtyLines {
    pub fn new(lines: usize) -> Result<Self, GfxError> {
        let len = lines.div_ceil(64);
        let mut words = Vec::new();
        words
            .try_reserve_exact(len)
            .map_err(|_| GfxError::ResourceExhausted)?;
        words.resize(len, 0);
        Ok(Self { words, lines })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }

    #[inline]
    pub fn set(&mut self, y: usize) {
        if y < self.lines {
            self.words[y / 64] |= 1 << (y % 64);
        }
    }

    /// Mark `y0..y1`, clamped to the tracked range.
    pub fn set_range(&mut self, y0: usize, y1: usize) {
        for y in y0..y1.min(self.lines) {
            self.set(y);
        }
    }

    #[inline]
    pub fn is_set(&self, y: usize) -> bool {
        y < self.lines && self.words[y / 64] & (1 << (y % 64)) != 0
    }

    pub fn any(&self) -> bool {
        self.words.iter().any(|w| *w != 0)
    }

    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    /// Rows currently marked, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let mut bits = word;
            core::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(i * 64 + bit)
            })
        })
    }
}
