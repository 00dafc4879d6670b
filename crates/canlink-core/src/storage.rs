//! Logical octet streams over word-addressable payload storage.
//!
//! Some targets (notably C2000-class DSPs) address memory in 16-bit
//! units, so a buffer of N words holds 2N protocol octets packed two per
//! word. The state machines never care: they talk to the buffers through
//! the [`Storage`] trait, whose two primitives move octets in and out of
//! word storage. [`ByteStorage`] is the ordinary 8-bit backing where both
//! primitives degenerate to a copy; [`WordStorage`] packs two octets per
//! 16-bit word, low octet first.
//!
//! # Invariants
//!
//! - Round trip: packing what was unpacked restores the affected octet
//!   range exactly.
//! - Foreign bits: [`pack16`] is read-modify-write; bits of destination
//!   words outside the written octet range are left untouched.

use core::fmt::Debug;

/// Read `dst.len()` logical octets out of packed 16-bit storage,
/// starting at `src_offset` (an octet offset, not a word index).
///
/// Octet `2k` lives in the low half of word `k`, octet `2k + 1` in the
/// high half.
pub fn unpack16(dst: &mut [u8], src: &[u16], src_offset: usize) {
    for (i, octet) in dst.iter_mut().enumerate() {
        let at = src_offset + i;
        let word = src[at / 2];
        *octet = if at % 2 == 0 { word as u8 } else { (word >> 8) as u8 };
    }
}

/// Write `src.len()` logical octets into packed 16-bit storage, starting
/// at octet offset `dst_offset`.
///
/// Read-modify-write: the other half of a partially written word keeps
/// its previous value.
pub fn pack16(dst: &mut [u16], dst_offset: usize, src: &[u8]) {
    for (i, &octet) in src.iter().enumerate() {
        let at = dst_offset + i;
        let word = &mut dst[at / 2];
        *word = if at % 2 == 0 {
            (*word & 0xFF00) | u16::from(octet)
        } else {
            (*word & 0x00FF) | (u16::from(octet) << 8)
        };
    }
}

/// Backing store for the link's payload arenas.
///
/// Chosen once per link, by the host, to match its addressable width.
/// All offsets and sizes at the trait boundary are octets; only the
/// arena slices themselves are in words.
pub trait Storage {
    /// The addressable unit of the arena.
    type Word: Copy + Default + PartialEq + Debug;

    /// Octets per word.
    const WIDTH: usize;

    /// Read `dst.len()` octets from the arena starting at an octet
    /// offset.
    fn unpack(words: &[Self::Word], octet_offset: usize, dst: &mut [u8]);

    /// Write `src.len()` octets into the arena starting at an octet
    /// offset, preserving word bits outside the written range.
    fn pack(words: &mut [Self::Word], octet_offset: usize, src: &[u8]);

    /// Words needed to hold `octets` logical octets.
    #[must_use]
    fn words_for(octets: usize) -> usize {
        octets.div_ceil(Self::WIDTH)
    }
}

/// Ordinary 8-bit-addressable backing: one octet per word.
#[derive(Debug, Clone, Copy)]
pub enum ByteStorage {}

impl Storage for ByteStorage {
    type Word = u8;
    const WIDTH: usize = 1;

    fn unpack(words: &[u8], octet_offset: usize, dst: &mut [u8]) {
        dst.copy_from_slice(&words[octet_offset..octet_offset + dst.len()]);
    }

    fn pack(words: &mut [u8], octet_offset: usize, src: &[u8]) {
        words[octet_offset..octet_offset + src.len()].copy_from_slice(src);
    }
}

/// 16-bit-addressable backing: two octets per word, low octet first.
#[derive(Debug, Clone, Copy)]
pub enum WordStorage {}

impl Storage for WordStorage {
    type Word = u16;
    const WIDTH: usize = 2;

    fn unpack(words: &[u16], octet_offset: usize, dst: &mut [u8]) {
        unpack16(dst, words, octet_offset);
    }

    fn pack(words: &mut [u16], octet_offset: usize, src: &[u8]) {
        pack16(words, octet_offset, src);
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn pack_at_even_offset() {
        let mut packed = [0u16; 5];
        pack16(&mut packed, 0, &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(packed, [0x0201, 0x0403, 0x0605, 0x0807, 0]);

        let mut restored = [0u8; 8];
        unpack16(&mut restored, &packed, 0);
        assert_eq!(restored, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn pack_at_word_aligned_offset() {
        let mut packed = [0u16; 6];
        pack16(&mut packed, 2, &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(packed, [0, 0x0201, 0x0403, 0x0605, 0x0807, 0]);

        let mut restored = [0u8; 8];
        unpack16(&mut restored, &packed, 2);
        assert_eq!(restored, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn pack_preserves_surrounding_words() {
        let mut packed = [0x4242u16, 0, 0, 0, 0, 0x4343];
        pack16(&mut packed, 2, &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(packed, [0x4242, 0x0201, 0x0403, 0x0605, 0x0807, 0x4343]);
    }

    #[test]
    fn pack_at_odd_offset() {
        let mut packed = [0u16; 6];
        pack16(&mut packed, 1, &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(packed, [0x0100, 0x0302, 0x0504, 0x0706, 0x0008, 0]);

        let mut restored = [0u8; 8];
        unpack16(&mut restored, &packed, 1);
        assert_eq!(restored, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn odd_offset_keeps_half_words_intact() {
        let mut packed = [0x0042u16, 0, 0, 0, 0x4300, 0];
        pack16(&mut packed, 1, &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(packed, [0x0142, 0x0302, 0x0504, 0x0706, 0x4308, 0]);
    }

    #[test]
    fn single_octet_low_half() {
        let mut packed = [0x4242u16, 0xDEAD];
        pack16(&mut packed, 0, &[1]);
        assert_eq!(packed, [0x4201, 0xDEAD]);

        let mut restored = [0u8; 1];
        unpack16(&mut restored, &packed, 0);
        assert_eq!(restored, [1]);
    }

    #[test]
    fn single_octet_high_half() {
        let mut packed = [0x4242u16, 0xDEAD];
        pack16(&mut packed, 1, &[1]);
        assert_eq!(packed, [0x0142, 0xDEAD]);

        let mut restored = [0u8; 1];
        unpack16(&mut restored, &packed, 1);
        assert_eq!(restored, [1]);
    }

    #[test]
    fn octet_pair_straddling_words() {
        let mut packed = [0x4242u16, 0x4343, 0xDEAD];
        pack16(&mut packed, 1, &[1, 2]);
        assert_eq!(packed, [0x0142, 0x4302, 0xDEAD]);

        let mut restored = [0u8; 2];
        unpack16(&mut restored, &packed, 1);
        assert_eq!(restored, [1, 2]);
    }

    #[test]
    fn byte_storage_is_a_copy() {
        let mut arena = [0u8; 8];
        ByteStorage::pack(&mut arena, 3, &[9, 8, 7]);
        assert_eq!(arena, [0, 0, 0, 9, 8, 7, 0, 0]);

        let mut out = [0u8; 3];
        ByteStorage::unpack(&arena, 3, &mut out);
        assert_eq!(out, [9, 8, 7]);
    }

    #[test]
    fn words_for_rounds_up() {
        assert_eq!(WordStorage::words_for(0), 0);
        assert_eq!(WordStorage::words_for(1), 1);
        assert_eq!(WordStorage::words_for(2), 1);
        assert_eq!(WordStorage::words_for(7), 4);
        assert_eq!(ByteStorage::words_for(7), 7);
    }

    proptest! {
        #[test]
        fn pack_unpack_round_trip(
            words in prop::collection::vec(any::<u16>(), 1..32),
            octets in prop::collection::vec(any::<u8>(), 1..16),
            offset in 0usize..16,
        ) {
            let capacity = words.len() * 2;
            prop_assume!(offset + octets.len() <= capacity);

            let mut packed = words.clone();
            pack16(&mut packed, offset, &octets);

            // The written range reads back exactly.
            let mut restored = vec![0u8; octets.len()];
            unpack16(&mut restored, &packed, offset);
            prop_assert_eq!(&restored, &octets);

            // Every octet outside the written range is bitwise unchanged.
            let mut before = vec![0u8; capacity];
            unpack16(&mut before, &words, 0);
            let mut after = vec![0u8; capacity];
            unpack16(&mut after, &packed, 0);
            for at in 0..capacity {
                if at < offset || at >= offset + octets.len() {
                    prop_assert_eq!(before[at], after[at], "octet {} disturbed", at);
                }
            }
        }
    }
}
