//! db/kv — одиночные операции get/set/delete.
//!
//! Порядок внутри commit mutex: append завершается до публикации ref'а
//! в индексе, публикация — до инкремента deleted у вытесненной страницы.
//! Читатель между append и публикацией видит старое значение, после
//! публикации новое; рваных состояний нет.

use crate::consts::{MAX_KEY_LEN, MAX_VALUE_LEN};
use crate::errors::{Error, Result};
use crate::keys::KeyStore;
use crate::page::PageRef;

use super::core::Db;

impl<K: KeyStore> Db<K> {
    /// Прочитать значение по ключу.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        let pos = self.keys.fetch(key).ok_or(Error::NotFound)?;
        // По инварианту индекса страница существует; отсутствие
        // трактуем как NotFound (защитная ветка).
        let page = self.page(pos.id).ok_or(Error::NotFound)?;
        page.read_key(key, pos.offset)
    }

    /// Записать пару. Возвращает true, если ключ был заменён,
    /// false, если ключ новый.
    pub fn set(&self, key: &[u8], value: &[u8]) -> Result<bool> {
        if key.is_empty() {
            return Err(Error::KeyBlank);
        }
        if key.len() > MAX_KEY_LEN {
            return Err(Error::KeyTooLong);
        }
        if value.is_empty() {
            return Err(Error::ValueBlank);
        }
        if value.len() > MAX_VALUE_LEN {
            return Err(Error::ValueTooLong);
        }

        let _commit = self.commit.lock().unwrap();

        let (id, offset) = self.write(key, value)?;
        match self.keys.store(key, PageRef { id, offset }) {
            Some(prev) => {
                // Старая версия ключа вытеснена: её страница копит мусор.
                if let Some(page) = self.page(prev.id) {
                    page.note_deleted();
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Удалить ключ. Возвращает true, если ключ хранился,
    /// false, если его не было.
    pub fn delete(&self, key: &[u8]) -> Result<bool> {
        let _commit = self.commit.lock().unwrap();

        let Some(prev) = self.keys.delete(key) else {
            return Ok(false);
        };
        if let Some(page) = self.page(prev.id) {
            page.mark_deleted(prev.offset)?;
        }
        Ok(true)
    }

    /// Дописать пару в текущую страницу, с ротацией при нехватке места.
    fn write(&self, key: &[u8], value: &[u8]) -> Result<(u32, u32)> {
        if !self.current_page().can_write(key.len() + value.len()) {
            self.next_page()?;
        }
        let current = self.current_page();
        let offset = current.append(key, value)?;
        Ok((current.id(), offset))
    }
}
