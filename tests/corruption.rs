use anyhow::Result;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rumcask::{Db, Error, HashKeyStore};

fn flip_byte(path: &Path, offset: u64) -> Result<()> {
    let f = std::fs::OpenOptions::new().read(true).write(true).open(path)?;
    let mut b = [0u8; 1];
    f.read_exact_at(&mut b, offset)?;
    b[0] ^= 0xFF;
    f.write_all_at(&b, offset)?;
    Ok(())
}

#[test]
fn replay_rejects_corrupted_record() -> Result<()> {
    let root = unique_root("crc");
    {
        let db = Db::open(&root, Arc::new(HashKeyStore::new()))?;
        db.set(b"key1", b"data")?;
        db.close()?;
    }

    // Запись key1/data лежит на 128..144, значение начинается на 138.
    flip_byte(&root.join("00000000.rcp"), 138)?;

    let err = Db::open(&root, Arc::new(HashKeyStore::new())).unwrap_err();
    assert!(matches!(err, Error::BadChecksum), "got {:?}", err);

    let _ = std::fs::remove_dir_all(&root);
    Ok(())
}

#[test]
fn open_rejects_corrupted_header() -> Result<()> {
    let root = unique_root("hdr");
    {
        let db = Db::open(&root, Arc::new(HashKeyStore::new()))?;
        db.close()?;
    }

    // Портим магию
    flip_byte(&root.join("00000000.rcp"), 1)?;

    let err = Db::open(&root, Arc::new(HashKeyStore::new())).unwrap_err();
    assert!(matches!(err, Error::PageBadHeader), "got {:?}", err);

    let _ = std::fs::remove_dir_all(&root);
    Ok(())
}

#[test]
fn open_rejects_unparseable_page_name() -> Result<()> {
    let root = unique_root("name");
    {
        let db = Db::open(&root, Arc::new(HashKeyStore::new()))?;
        db.close()?;
    }

    std::fs::write(root.join("BAD.rcp"), b"")?;

    let err = Db::open(&root, Arc::new(HashKeyStore::new())).unwrap_err();
    assert!(matches!(err, Error::PageInvalid), "got {:?}", err);

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
