use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use rumcask::{Db, Error, HashKeyStore};

#[test]
fn smoke_open_set_get_close() -> Result<()> {
    let root = unique_root("smoke");

    // 1) writer: три ключа в страницу 0
    let keys = Arc::new(HashKeyStore::new());
    let db = Db::open(&root, keys.clone())?;

    assert!(!db.set(b"key1", b"val1")?);
    assert!(!db.set(b"key2", b"val2")?);
    assert!(!db.set(b"key3", b"val3")?);

    assert_eq!(db.page_count(), 1);
    assert_eq!(db.current_id(), 0);

    // 2) чтение
    assert_eq!(db.get(b"key1")?, b"val1");
    assert_eq!(db.get(b"key2")?, b"val2");
    assert_eq!(db.get(b"key3")?, b"val3");
    assert!(matches!(db.get(b"key9").unwrap_err(), Error::NotFound));

    // 3) на диске ровно LOCK и страница 0
    let mut names: Vec<String> = std::fs::read_dir(&root)?
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["00000000.rcp".to_string(), "LOCK".to_string()]);

    db.close()?;

    // 4) reopen с тем же индексом: значения на месте
    let db = Db::open(&root, keys)?;
    assert_eq!(db.get(b"key2")?, b"val2");
    db.close()?;

    let _ = std::fs::remove_dir_all(&root);
    Ok(())
}

#[test]
fn validates_arguments() -> Result<()> {
    let root = unique_root("validate");
    let db = Db::open(&root, Arc::new(HashKeyStore::new()))?;

    assert!(matches!(
        db.set(b"", b"val1").unwrap_err(),
        Error::KeyBlank
    ));
    assert!(matches!(
        db.set(b"key1", b"").unwrap_err(),
        Error::ValueBlank
    ));
    let long_key = vec![b'k'; 512];
    assert!(matches!(
        db.set(&long_key, b"val1").unwrap_err(),
        Error::KeyTooLong
    ));

    db.close()?;
    let _ = std::fs::remove_dir_all(&root);
    Ok(())
}

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("rumcask-{}-{}-{}", prefix, pid, t))
}
