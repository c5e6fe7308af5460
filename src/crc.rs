//! CRC-32 matching the STM32 hardware CRC peripheral
//!
//! The peripheral consumes 32-bit words, so the checksum here walks the input
//! four bytes at a time and feeds each word most-significant byte first. A
//! trailing partial word is byte-reversed and zero-padded before it is fed,
//! which is what the firmware's bootloader does with odd-length images.

/// Generator polynomial (non-reflected form)
pub const CRC_POLY: u32 = 0x04C1_1DB7;

/// Initial CRC value
pub const CRC_SEED: u32 = 0xFFFF_FFFF;

const LOOKUP_TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut rr = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            rr = if rr & 0x8000_0000 != 0 {
                (rr << 1) ^ CRC_POLY
            } else {
                rr << 1
            };
            bit += 1;
        }
        table[i] = rr;
        i += 1;
    }
    table
}

#[inline]
fn feed_byte(crc: u32, byte: u8) -> u32 {
    (crc << 8) ^ LOOKUP_TABLE[((crc >> 24) as u8 ^ byte) as usize]
}

fn process_word(word: &[u8], mut crc: u32) -> u32 {
    if word.len() < 4 {
        // reversed then padded, then fed back-to-front like a full word
        let mut padded = [0u8; 4];
        for (dst, src) in padded.iter_mut().zip(word.iter().rev()) {
            *dst = *src;
        }
        for &b in padded.iter().rev() {
            crc = feed_byte(crc, b);
        }
        return crc;
    }
    for &b in word.iter().rev() {
        crc = feed_byte(crc, b);
    }
    crc
}

/// Compute the CRC of `data` continuing from `seed`
pub fn crc32_with_seed(data: &[u8], seed: u32) -> u32 {
    data.chunks(4)
        .fold(seed, |crc, word| process_word(word, crc))
}

/// Compute the CRC of `data` with the default seed
pub fn crc32(data: &[u8]) -> u32 {
    crc32_with_seed(data, CRC_SEED)
}
