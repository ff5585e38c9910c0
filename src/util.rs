//! util — позиционный ввод/вывод поверх общего файлового дескриптора.
//!
//! Один fd страницы делят читатели, писатель и фоновый флашер статистики,
//! поэтому seek недопустим: pread/pwrite не двигают курсор файла.

use std::fs::File;
use std::os::unix::fs::FileExt;

use crate::errors::Result;

pub fn read_at(f: &File, offset: u64, buf: &mut [u8]) -> Result<()> {
    f.read_exact_at(buf, offset)?;
    Ok(())
}

pub fn write_at(f: &File, offset: u64, buf: &[u8]) -> Result<()> {
    f.write_all_at(buf, offset)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn unique_path(prefix: &str) -> PathBuf {
        let pid = std::process::id();
        let t = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("rumcask-{}-{}-{}", prefix, pid, t))
    }

    #[test]
    fn positional_roundtrip() {
        let path = unique_path("util");
        let f = std::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();

        write_at(&f, 10, b"hello").unwrap();
        let mut buf = [0u8; 5];
        read_at(&f, 10, &mut buf).unwrap();
        assert_eq!(&buf, b"hello");

        // Короткое чтение за концом файла -> UnexpectedEof
        let mut long = [0u8; 32];
        let err = read_at(&f, 10, &mut long).unwrap_err();
        assert!(err.is_eof());

        drop(f);
        let _ = std::fs::remove_file(&path);
    }
}
