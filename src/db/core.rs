//! db/core — ядро high-level API: структура Db, реестр страниц,
//! ротация, close.
//!
//! Блокировки:
//! - commit (Mutex): линеаризует всех писателей (set/delete/rotate).
//! - pages (RwLock): защищает реестр страниц; читатели shared, писатель
//!   exclusive только при установке свежей страницы. Записи из реестра
//!   никогда не удаляются в нормальной работе.
//! - current (RwLock): указатель на страницу-приёмник append'ов;
//!   меняется только под commit mutex.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use crate::consts::PAGE_EXT;
use crate::errors::Result;
use crate::keys::KeyStore;
use crate::lock::LockGuard;
use crate::page::{Page, PageStats};

#[derive(Debug)]
pub struct Db<K: KeyStore> {
    pub(crate) root: PathBuf,
    pub(crate) keys: Arc<K>,
    pub(crate) pages: RwLock<HashMap<u32, Arc<Page>>>,
    pub(crate) current: RwLock<Arc<Page>>,
    pub(crate) commit: Mutex<()>,
    pub(crate) _lock: LockGuard, // держим LOCK до Drop
}

impl<K: KeyStore> Db<K> {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Индекс, переданный в open. БД не владеет им эксклюзивно:
    /// вызывающий код может держать свой Arc для инспекции.
    pub fn keys(&self) -> &Arc<K> {
        &self.keys
    }

    pub fn page_count(&self) -> usize {
        self.pages.read().unwrap().len()
    }

    /// Id текущей страницы-приёмника; максимальный среди известных.
    pub fn current_id(&self) -> u32 {
        self.current.read().unwrap().id()
    }

    /// Позиция записи текущей страницы (заполненность сегмента).
    pub fn current_pos(&self) -> u32 {
        self.current.read().unwrap().pos()
    }

    /// Снимок счётчиков страницы id, если она известна.
    pub fn page_stats(&self, id: u32) -> Option<PageStats> {
        self.page(id).map(|p| p.stats())
    }

    /// Принудительная ротация: следующий set пойдёт в свежую страницу.
    pub fn rotate(&self) -> Result<()> {
        let _commit = self.commit.lock().unwrap();
        self.next_page()
    }

    /// Закрыть все страницы (собирая последнюю ошибку) и отпустить LOCK.
    pub fn close(self) -> Result<()> {
        self.close_pages()
        // _lock дропается при выходе, освобождая каталог
    }

    pub(crate) fn page(&self, id: u32) -> Option<Arc<Page>> {
        self.pages.read().unwrap().get(&id).cloned()
    }

    pub(crate) fn current_page(&self) -> Arc<Page> {
        self.current.read().unwrap().clone()
    }

    /// Создать страницу current.id + 1 и сделать её текущей.
    /// Вызывается только под commit mutex.
    pub(crate) fn next_page(&self) -> Result<()> {
        let id = self.current_id() + 1;
        let page = Arc::new(Page::open(&page_path(&self.root, id))?);
        log::debug!("rotated {} to page {:08}", self.root.display(), id);
        self.make_current(page);
        Ok(())
    }

    pub(crate) fn make_current(&self, page: Arc<Page>) {
        self.pages.write().unwrap().insert(page.id(), page.clone());
        *self.current.write().unwrap() = page;
    }

    fn close_pages(&self) -> Result<()> {
        let mut last = None;
        for page in self.pages.read().unwrap().values() {
            if let Err(e) = page.close() {
                last = Some(e);
            }
        }
        match last {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<K: KeyStore> Drop for Db<K> {
    fn drop(&mut self) {
        // Идемпотентно: после явного close() это no-op.
        let _ = self.close_pages();
    }
}

/// Имя файла страницы: восьмизначный десятичный id + .rcp.
pub(crate) fn page_path(root: &Path, id: u32) -> PathBuf {
    root.join(format!("{:08}.{}", id, PAGE_EXT))
}
