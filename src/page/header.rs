//! page/header — фиксированный 128-байтовый заголовок страницы.
//!
//! Layout:
//! [MAGIC 7]["RUMCASK"][version u8][written u32][deleted u32][reserved 112 zero]
//!
//! Счётчики written/deleted — атомарные и приблизительные: фоновый флашер
//! пишет их раз в секунду и один раз при закрытии, без fsync. Decode
//! статистики lenient: короткий буфер оставляет нулевые значения
//! (совместимость с заголовками, усечёнными посреди записи).

use byteorder::{ByteOrder, LittleEndian};
use std::fs::File;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::consts::{MAGIC, PAGE_HEADER_LEN, VERSION};
use crate::errors::{Error, Result};
use crate::util::{read_at, write_at};

/// Снимок счётчиков страницы.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageStats {
    /// Approximate number of total entries written to the page.
    pub written: u32,
    /// Approximate number of deleted entries in the page.
    pub deleted: u32,
}

impl PageStats {
    pub fn decode(b: &[u8]) -> Self {
        let mut s = Self::default();
        if b.len() > 3 {
            s.written = LittleEndian::read_u32(&b[0..4]);
        }
        if b.len() > 7 {
            s.deleted = LittleEndian::read_u32(&b[4..8]);
        }
        s
    }

    pub fn encode(&self) -> [u8; 8] {
        let mut buf = [0u8; 8];
        LittleEndian::write_u32(&mut buf[0..4], self.written);
        LittleEndian::write_u32(&mut buf[4..8], self.deleted);
        buf
    }
}

/// Заголовок страницы; живёт в Arc, разделяется с флашером статистики.
#[derive(Debug)]
pub struct PageHeader {
    written: AtomicU32,
    deleted: AtomicU32,
}

impl PageHeader {
    pub fn new() -> Self {
        Self {
            written: AtomicU32::new(0),
            deleted: AtomicU32::new(0),
        }
    }

    pub fn stats(&self) -> PageStats {
        PageStats {
            written: self.written.load(Ordering::Relaxed),
            deleted: self.deleted.load(Ordering::Relaxed),
        }
    }

    pub fn set_stats(&self, stats: PageStats) {
        self.written.store(stats.written, Ordering::Relaxed);
        self.deleted.store(stats.deleted, Ordering::Relaxed);
    }

    pub fn rec_written(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rec_deleted(&self) {
        self.deleted.fetch_add(1, Ordering::Relaxed);
    }

    /// Прочитать и провалидировать заголовок с offset 0.
    /// Короткое чтение уходит наверх как UnexpectedEof; несовпадение
    /// magic или version -> PageBadHeader.
    pub fn read(&self, file: &File) -> Result<()> {
        let mut buf = [0u8; PAGE_HEADER_LEN as usize];
        read_at(file, 0, &mut buf)?;
        if &buf[..7] != MAGIC {
            return Err(Error::PageBadHeader);
        }
        if buf[7] != VERSION {
            return Err(Error::PageBadHeader);
        }
        self.set_stats(PageStats::decode(&buf[8..16]));
        Ok(())
    }

    /// Записать свежий заголовок целиком (magic, version, stats, нули).
    pub fn write(&self, file: &File) -> Result<()> {
        let mut buf = [0u8; PAGE_HEADER_LEN as usize];
        buf[..7].copy_from_slice(MAGIC);
        buf[7] = VERSION;
        buf[8..16].copy_from_slice(&self.stats().encode());
        write_at(file, 0, &buf)
    }

    /// Записать только 8 байт статистики (offset 8), не трогая magic/version.
    pub fn write_stats(&self, file: &File) -> Result<()> {
        write_at(file, 8, &self.stats().encode())
    }
}

impl Default for PageHeader {
    fn default() -> Self {
        Self::new()
    }
}
