//! rumcask — встраиваемое append-only KV-хранилище (модель Bitcask).
//!
//! Каталог страниц NNNNNNNN.rcp + in-memory индекс key -> PageRef.
//! Один процесс держит эксклюзивный LOCK; внутри процесса один писатель
//! и много читателей работают параллельно.

// Базовые модули
pub mod consts;
pub mod errors;
pub mod lock;
pub mod util;

// Страницы и индекс
pub mod keys; // src/keys/{mod,btree/{mod,tree}}.rs
pub mod page; // src/page/{mod,header,checksum,core}.rs

// Высокоуровневое API
pub mod db; // src/db/{mod,core,open,kv}.rs

// Удобные реэкспорты
pub use db::Db;
pub use errors::{Error, Result};
pub use keys::{btree::BTreeKeyStore, HashKeyStore, KeyStore};
pub use page::{Page, PageRef, PageStats};
