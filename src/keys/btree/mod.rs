//! keys/btree — упорядоченный KeyStore поверх B-дерева.
//!
//! Ключи итерируемы в лексикографическом порядке; именно этот вариант
//! индекса даёт range-сканы на вызывающей стороне. БД корректна с любым
//! KeyStore, порядок ей не нужен.

mod tree;

use std::sync::RwLock;

use crate::page::PageRef;

use self::tree::BTree;
use super::KeyStore;

pub struct BTreeKeyStore {
    tree: RwLock<BTree>,
}

impl BTreeKeyStore {
    /// Создать пустой индекс с данным branching degree (>= 2).
    pub fn new(degree: usize) -> Self {
        Self {
            tree: RwLock::new(BTree::new(degree)),
        }
    }

    /// Число ключей в индексе.
    pub fn len(&self) -> usize {
        self.tree.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Обойти пары с min <= key < max по возрастанию ключа; обход
    /// останавливается, когда each возвращает false.
    pub fn iterate<F>(&self, min: &[u8], max: &[u8], mut each: F)
    where
        F: FnMut(&[u8], PageRef) -> bool,
    {
        self.tree.read().unwrap().ascend_range(min, max, &mut each);
    }
}

impl KeyStore for BTreeKeyStore {
    fn fetch(&self, key: &[u8]) -> Option<PageRef> {
        self.tree.read().unwrap().get(key)
    }

    fn store(&self, key: &[u8], pos: PageRef) -> Option<PageRef> {
        self.tree.write().unwrap().replace_or_insert(key, pos)
    }

    fn delete(&self, key: &[u8]) -> Option<PageRef> {
        self.tree.write().unwrap().delete(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_fetch_delete() {
        let subject = BTreeKeyStore::new(3);

        assert_eq!(subject.fetch(b"key1"), None);

        assert_eq!(
            subject.store(b"key1", PageRef { id: 1, offset: 1024 }),
            None
        );
        assert_eq!(
            subject.store(b"key2", PageRef { id: 7, offset: 8096 }),
            None
        );

        assert_eq!(
            subject.store(b"key1", PageRef { id: 2, offset: 2048 }),
            Some(PageRef { id: 1, offset: 1024 })
        );
        assert_eq!(
            subject.fetch(b"key1"),
            Some(PageRef { id: 2, offset: 2048 })
        );

        assert_eq!(
            subject.delete(b"key2"),
            Some(PageRef { id: 7, offset: 8096 })
        );
        assert_eq!(subject.delete(b"key2"), None);
    }

    #[test]
    fn has_len() {
        let subject = BTreeKeyStore::new(3);
        let _ = subject.store(b"key1", PageRef { id: 1, offset: 1024 });
        assert_eq!(subject.len(), 1);
        let _ = subject.store(b"key2", PageRef { id: 7, offset: 8096 });
        assert_eq!(subject.len(), 2);
    }

    #[test]
    fn iterates_in_order() {
        let subject = BTreeKeyStore::new(2);
        // Вставка в произвольном порядке
        for k in ["key4", "key1", "key5", "key3", "key2"] {
            let _ = subject.store(k.as_bytes(), PageRef { id: 0, offset: 0 });
        }

        let mut seen = Vec::new();
        subject.iterate(b"key2", b"key5", |key, _| {
            seen.push(key.to_vec());
            true
        });
        assert_eq!(seen, vec![b"key2".to_vec(), b"key3".to_vec(), b"key4".to_vec()]);

        // Ранний выход
        let mut seen = 0;
        subject.iterate(b"key1", b"key9", |_, _| {
            seen += 1;
            false
        });
        assert_eq!(seen, 1);
    }
}
