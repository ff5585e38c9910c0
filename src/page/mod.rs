//! page — сегментные файлы БД (NNNNNNNN.rcp).
//!
//! Формат: 128-байтовый заголовок (magic/version/stats), дальше плотный
//! поток записей [klen][vlen][key][value][crc16]. См. consts.rs.

mod checksum;
mod core;
mod header;

pub use self::checksum::{crc16, crc16_pair};
pub use self::core::Page;
pub use self::header::{PageHeader, PageStats};

/// Локатор записи: id страницы + байтовый offset внутри неё.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageRef {
    pub id: u32,
    pub offset: u32,
}
