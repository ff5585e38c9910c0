//! errors — типизированная таксономия ошибок движка.
//!
//! Вызывающий код матчится на варианты (DbLocked, NotFound, BadChecksum, ...),
//! ошибки файловой системы проходят насквозь через Io.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // -------- DB --------
    #[error("database directory is locked by another process")]
    DbLocked,

    // -------- Page --------
    #[error("invalid page")]
    PageInvalid,
    #[error("invalid page header")]
    PageBadHeader,

    // -------- KV --------
    #[error("not found")]
    NotFound,
    #[error("invalid offset")]
    BadOffset,
    #[error("invalid checksum")]
    BadChecksum,
    #[error("key cannot be blank")]
    KeyBlank,
    #[error("key length exceeds limit")]
    KeyTooLong,
    #[error("value cannot be blank")]
    ValueBlank,
    #[error("value length exceeds limit")]
    ValueTooLong,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// true, если ошибка — io::ErrorKind::UnexpectedEof (короткое чтение).
    /// Replay использует это как признак конца страницы.
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            Error::DbLocked.to_string(),
            "database directory is locked by another process"
        );
        assert_eq!(Error::NotFound.to_string(), "not found");
        assert_eq!(Error::BadChecksum.to_string(), "invalid checksum");
        assert_eq!(Error::KeyTooLong.to_string(), "key length exceeds limit");
    }

    #[test]
    fn eof_detection() {
        let eof = Error::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "short read",
        ));
        assert!(eof.is_eof());
        assert!(!Error::NotFound.is_eof());
    }
}
