//! page/checksum — CRC-16 записей страницы.
//!
//! Алгоритм: CRC-16/XMODEM (poly 0x1021, init 0x0000, без отражения).
//! Writer и reader обязаны совпадать; контрольный вектор:
//! CRC16("123456789") == 12739.

use crc::{Crc, CRC_16_XMODEM};

const CRC16_ALG: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// CRC-16 одного буфера.
#[inline]
pub fn crc16(bytes: &[u8]) -> u16 {
    CRC16_ALG.checksum(bytes)
}

/// CRC-16 по key ++ value без промежуточной конкатенации.
#[inline]
pub fn crc16_pair(key: &[u8], value: &[u8]) -> u16 {
    let mut digest = CRC16_ALG.digest();
    digest.update(key);
    digest.update(value);
    digest.finalize()
}
