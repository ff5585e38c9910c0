//! db/open — открытие БД: каталог, эксклюзивный LOCK, replay страниц.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use crate::consts::{LOCK_FILE, PAGE_EXT};
use crate::errors::Result;
use crate::keys::KeyStore;
use crate::lock;
use crate::page::Page;

use super::core::{page_path, Db};

impl<K: KeyStore> Db<K> {
    /// Открыть БД в каталоге root (создаётся при отсутствии).
    ///
    /// Последовательность: lock -> скан *.rcp в отсортированном порядке ->
    /// replay каждой страницы в индекс -> текущей становится страница с
    /// максимальным id (последняя по сортировке). Пустой каталог получает
    /// страницу 00000000.rcp.
    ///
    /// Ошибка после захвата LOCK закрывает уже открытые страницы и
    /// отпускает LOCK (Drop guard'а) до возврата.
    pub fn open(root: &Path, keys: Arc<K>) -> Result<Self> {
        fs::create_dir_all(root)?;
        let guard = lock::acquire_exclusive(&root.join(LOCK_FILE))?;

        let mut pages: HashMap<u32, Arc<Page>> = HashMap::new();
        let mut current: Option<Arc<Page>> = None;

        for path in page_files(root)? {
            let page = Page::open(&path)?;
            page.parse(keys.as_ref())?;
            let page = Arc::new(page);
            pages.insert(page.id(), page.clone());
            current = Some(page);
        }

        let current = match current {
            Some(page) => page,
            None => {
                let page = Arc::new(Page::open(&page_path(root, 0))?);
                pages.insert(page.id(), page.clone());
                page
            }
        };

        log::info!(
            "opened database {} ({} pages, current {:08})",
            root.display(),
            pages.len(),
            current.id()
        );

        Ok(Db {
            root: root.to_path_buf(),
            keys,
            pages: RwLock::new(pages),
            current: RwLock::new(current),
            commit: Mutex::new(()),
            _lock: guard,
        })
    }
}

/// Файлы страниц каталога, отсортированные по имени. Нулевое дополнение
/// имени делает сортировку по имени сортировкой по id.
fn page_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == PAGE_EXT) {
            names.push(path);
        }
    }
    names.sort();
    Ok(names)
}
