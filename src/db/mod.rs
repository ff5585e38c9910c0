//! db — высокоуровневое API: open/get/set/delete/rotate/close.

mod core;
mod kv;
mod open;

pub use self::core::Db;
