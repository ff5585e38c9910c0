//! keys — подключаемый in-memory индекс key -> PageRef.
//!
//! Движок видит индекс как абстрактное отображение с тремя операциями;
//! владение индексом разделяется с вызывающим кодом (Arc), чтобы тот мог
//! инспектировать содержимое или итерировать упорядоченный вариант.

pub mod btree;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::page::PageRef;

/// Контракт key index. Реализации синхронизируются сами.
pub trait KeyStore: Send + Sync {
    /// Получить PageRef ключа; None, если ключ не хранится.
    fn fetch(&self, key: &[u8]) -> Option<PageRef>;

    /// Безусловно записать ключ. Возвращает вытесненный PageRef, если
    /// ключ уже хранился: вызывающий код уведомляет старую страницу.
    fn store(&self, key: &[u8], pos: PageRef) -> Option<PageRef>;

    /// Удалить ключ. Возвращает прежний PageRef, если ключ хранился.
    fn delete(&self, key: &[u8]) -> Option<PageRef>;
}

/// Простейший индекс: HashMap под mutex. Ключи копируются, порядок
/// не поддерживается.
#[derive(Debug, Default)]
pub struct HashKeyStore {
    refs: Mutex<HashMap<Vec<u8>, PageRef>>,
}

impl HashKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Число ключей в индексе.
    pub fn len(&self) -> usize {
        self.refs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Обойти все пары (key, ref) в произвольном порядке.
    pub fn for_each<F: FnMut(&[u8], PageRef)>(&self, mut f: F) {
        for (key, pos) in self.refs.lock().unwrap().iter() {
            f(key.as_slice(), *pos);
        }
    }
}

impl KeyStore for HashKeyStore {
    fn fetch(&self, key: &[u8]) -> Option<PageRef> {
        self.refs.lock().unwrap().get(key).copied()
    }

    fn store(&self, key: &[u8], pos: PageRef) -> Option<PageRef> {
        self.refs.lock().unwrap().insert(key.to_vec(), pos)
    }

    fn delete(&self, key: &[u8]) -> Option<PageRef> {
        self.refs.lock().unwrap().remove(key)
    }
}
