//! Общие константы формата (page header, records, limits).

// -------- Size helpers --------
pub const KIB: u32 = 1024;
pub const MIB: u32 = 1024 * KIB;

// -------- Page files --------
pub const MAGIC: &[u8; 7] = b"RUMCASK";
pub const VERSION: u8 = 1;
pub const PAGE_EXT: &str = "rcp";
pub const PAGE_HEADER_LEN: u32 = 128; // [MAGIC7][version u8][written u32][deleted u32][reserved 112]
pub const LOCK_FILE: &str = "LOCK";

// -------- Limits --------
// Maximum number of pages per directory: 65535
pub const MAX_PAGE_COUNT: u32 = (1 << 16) - 1;
// Maximum size of each page file: <512M
pub const MAX_PAGE_SIZE: u32 = 512 * MIB - 1;
// Maximum key length: 511 bytes
pub const MAX_KEY_LEN: usize = 511;
// Maximum value length: <64M
pub const MAX_VALUE_LEN: usize = (64 * MIB - 1) as usize;

// Формат записи (record):
// Layout:
// [klen u16]    -- длина ключа; старший бит старшего байта = tombstone
// [vlen u32]    -- длина значения
// [key]
// [value]
// [crc u16]     -- CRC-16 по key ++ value
//
// Все числа little-endian. Total overhead = 2 + 4 + 2 = 8 bytes.
pub const OH_KEY: u32 = 2;
pub const OH_VAL: u32 = 4;
pub const OH_CSUM: u32 = 2;
pub const OH_KV: u32 = OH_KEY + OH_VAL;
pub const OH_FULL: u32 = OH_KV + OH_CSUM;

// Tombstone: старший бит старшего байта klen (offset + 1).
// MAX_KEY_LEN (511) занимает 9 бит, бит 15 всегда свободен.
// Держите MAX_KEY_LEN < 32768, иначе трюк ломается.
pub const TOMBSTONE_BIT: u8 = 0x80;
