//! page/core — одиночный append-only файл страницы.
//!
//! Что внутри:
//! - open: парсинг id из имени файла, создание/валидация заголовка,
//!   курсор в конец файла, запуск фонового флашера статистики.
//! - append: одна позиционная запись, атомарный сдвиг курсора.
//! - read_key / read: чтение записи с проверкой CRC.
//! - mark_deleted: tombstone-бит in-place (идемпотентно).
//! - parse: replay всех живых записей в key index при открытии БД.
//!
//! Страница не сериализует своих писателей: атомарный курсор держит
//! только консистентность позиции. Взаимное исключение записей —
//! ответственность Db (commit mutex).

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use byteorder::{ByteOrder, LittleEndian};

use crate::consts::{
    MAX_KEY_LEN, MAX_PAGE_SIZE, MAX_VALUE_LEN, OH_FULL, PAGE_HEADER_LEN, TOMBSTONE_BIT,
};
use crate::errors::{Error, Result};
use crate::keys::KeyStore;
use crate::util::{read_at, write_at};

use super::checksum::{crc16, crc16_pair};
use super::header::{PageHeader, PageStats};
use super::PageRef;

/// Период сброса статистики заголовка на диск.
const STATS_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Одиночный файл страницы. Потокобезопасен для позиционного чтения и
/// одного писателя; дескриптор разделяется с флашером статистики и
/// освобождается при Drop.
#[derive(Debug)]
pub struct Page {
    id: u32,
    path: PathBuf,
    file: Arc<File>,
    header: Arc<PageHeader>,
    pos: AtomicU32,

    // None после close(); Sender дропается как сигнал остановки флашера.
    shutdown: Mutex<Option<Sender<()>>>,
    flusher: Mutex<Option<JoinHandle<()>>>,
}

impl Page {
    /// Открыть (или создать) файл страницы. Id берётся из имени файла:
    /// не-числовая основа имени -> PageInvalid.
    pub fn open(path: &Path) -> Result<Self> {
        let id = parse_page_id(path)?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)?;
        let size = file.metadata()?.len();

        let file = Arc::new(file);
        let header = Arc::new(PageHeader::new());

        let pos = if size == 0 {
            header.write(&file)?;
            PAGE_HEADER_LEN
        } else {
            header.read(&file)?;
            size as u32
        };

        let (tx, rx) = mpsc::channel();
        let flusher = spawn_flusher(id, file.clone(), header.clone(), rx)?;

        Ok(Self {
            id,
            path: path.to_path_buf(),
            file,
            header,
            pos: AtomicU32::new(pos),
            shutdown: Mutex::new(Some(tx)),
            flusher: Mutex::new(Some(flusher)),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Текущая позиция записи (atomic).
    pub fn pos(&self) -> u32 {
        self.pos.load(Ordering::SeqCst)
    }

    /// Снимок счётчиков заголовка.
    pub fn stats(&self) -> PageStats {
        self.header.stats()
    }

    /// true, если запись key/value ещё помещается в страницу.
    pub fn can_write(&self, kv_len: usize) -> bool {
        (self.pos() as u64) + kv_len as u64 + (OH_FULL as u64) < MAX_PAGE_SIZE as u64
    }

    /// Дописать запись, вернуть её стартовый offset.
    ///
    /// Курсор читается атомарно, буфер пишется одним pwrite, затем курсор
    /// сдвигается. Два конкурентных append могут увидеть один курсор —
    /// вызывающий код обязан держать commit mutex БД.
    pub fn append(&self, key: &[u8], value: &[u8]) -> Result<u32> {
        let (klen, vlen) = (key.len(), value.len());
        if klen > MAX_KEY_LEN {
            return Err(Error::KeyTooLong);
        }
        if vlen > MAX_VALUE_LEN {
            return Err(Error::ValueTooLong);
        }

        // [klen u16][vlen u32][key][value][crc u16]
        let mut data = vec![0u8; klen + vlen + OH_FULL as usize];
        LittleEndian::write_u16(&mut data[0..2], klen as u16);
        LittleEndian::write_u32(&mut data[2..6], vlen as u32);
        data[6..6 + klen].copy_from_slice(key);
        data[6 + klen..6 + klen + vlen].copy_from_slice(value);
        LittleEndian::write_u16(&mut data[6 + klen + vlen..], crc16_pair(key, value));

        let offset = self.pos();
        write_at(&self.file, offset as u64, &data)?;
        self.pos.fetch_add(data.len() as u32, Ordering::SeqCst);
        self.header.rec_written();
        Ok(offset)
    }

    /// Прочитать значение записи с известным ключом по offset.
    ///
    /// Длина ключа берётся от вызывающего; CRC заодно подтверждает, что по
    /// offset действительно лежит запись с этим ключом.
    pub fn read_key(&self, key: &[u8], offset: u32) -> Result<Vec<u8>> {
        let mut lenbuf = [0u8; 4];
        read_at(&self.file, offset as u64 + 2, &mut lenbuf)?;

        let vlen = LittleEndian::read_u32(&lenbuf) as usize;
        if vlen > MAX_VALUE_LEN {
            return Err(Error::BadOffset);
        }

        let mut rest = vec![0u8; vlen + 2];
        read_at(&self.file, offset as u64 + key.len() as u64 + 6, &mut rest)?;

        let (value, csum) = rest.split_at(vlen);
        if crc16_pair(key, value) != LittleEndian::read_u16(csum) {
            return Err(Error::BadChecksum);
        }
        Ok(value.to_vec())
    }

    /// Полное чтение записи по offset: (key, value, deleted).
    pub fn read(&self, offset: u32) -> Result<(Vec<u8>, Vec<u8>, bool)> {
        let mut lens = [0u8; 6];
        read_at(&self.file, offset as u64, &mut lens)?;

        // Tombstone живёт в старшем бите старшего байта klen.
        let deleted = lens[1] & TOMBSTONE_BIT != 0;
        lens[1] &= !TOMBSTONE_BIT;

        let klen = LittleEndian::read_u16(&lens[0..2]) as usize;
        if klen > MAX_KEY_LEN {
            return Err(Error::BadOffset);
        }
        let vlen = LittleEndian::read_u32(&lens[2..6]) as usize;
        if vlen > MAX_VALUE_LEN {
            return Err(Error::BadOffset);
        }

        let mut rest = vec![0u8; klen + vlen + 2];
        read_at(&self.file, offset as u64 + 6, &mut rest)?;

        let (pair, csum) = rest.split_at(klen + vlen);
        if crc16(pair) != LittleEndian::read_u16(csum) {
            return Err(Error::BadChecksum);
        }
        Ok((pair[..klen].to_vec(), pair[klen..].to_vec(), deleted))
    }

    /// Пометить запись по offset как удалённую. Идемпотентно: повторная
    /// пометка не инкрементирует счётчик. Бит пишется одним байтом,
    /// конкурентный читатель видит либо старое, либо новое значение.
    pub fn mark_deleted(&self, offset: u32) -> Result<()> {
        let mpos = offset as u64 + 1; // старший байт klen
        let mut marker = [0u8; 1];
        read_at(&self.file, mpos, &mut marker)?;

        if marker[0] & TOMBSTONE_BIT != 0 {
            return Ok(());
        }

        marker[0] |= TOMBSTONE_BIT;
        write_at(&self.file, mpos, &marker)?;
        self.header.rec_deleted();
        Ok(())
    }

    /// Запись этой страницы вытеснена новой версией ключа в другой
    /// странице: учитываем только счётчик, бит не трогаем.
    pub fn note_deleted(&self) {
        self.header.rec_deleted();
    }

    /// Replay страницы: опубликовать все живые записи в key index.
    /// Tombstone-записи пропускаются. Конец файла завершает обход чисто;
    /// BAD_OFFSET/BAD_CHECKSUM посреди файла — фатальны.
    pub fn parse<K: KeyStore + ?Sized>(&self, store: &K) -> Result<()> {
        let mut pos = PAGE_HEADER_LEN;
        loop {
            match self.read(pos) {
                Ok((key, value, deleted)) => {
                    if !deleted {
                        store.store(
                            &key,
                            PageRef {
                                id: self.id,
                                offset: pos,
                            },
                        );
                    }
                    pos += (key.len() + value.len()) as u32 + OH_FULL;
                }
                Err(err) if err.is_eof() => return Ok(()),
                Err(err) => return Err(err),
            }
        }
    }

    /// Остановить флашер и дождаться его финальной записи статистики.
    /// Идемпотентно. Дескриптор файла освобождается при Drop страницы.
    pub fn close(&self) -> Result<()> {
        let tx = self.shutdown.lock().unwrap().take();
        if tx.is_none() {
            return Ok(());
        }
        drop(tx); // флашер проснётся с Disconnected

        if let Some(handle) = self.flusher.lock().unwrap().take() {
            // Финальный write_stats происходит до выхода потока.
            let _ = handle.join();
        }
        Ok(())
    }

    /// Закрыть страницу и удалить файл.
    pub fn unlink(&self) -> Result<()> {
        self.close()?;
        std::fs::remove_file(&self.path)?;
        Ok(())
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Id страницы = базовое имя файла без расширения, десятичный u32.
fn parse_page_id(path: &Path) -> Result<u32> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or(Error::PageInvalid)?;
    stem.parse::<u32>().map_err(|_| Error::PageInvalid)
}

fn spawn_flusher(
    id: u32,
    file: Arc<File>,
    header: Arc<PageHeader>,
    rx: Receiver<()>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("rumcask-flush-{:08}", id))
        .spawn(move || stats_flush_loop(file, header, rx))
}

/// Персистенция счётчиков: раз в секунду и один раз перед выходом.
/// Ошибки записи игнорируются, счётчики приблизительны по контракту.
fn stats_flush_loop(file: Arc<File>, header: Arc<PageHeader>, rx: Receiver<()>) {
    loop {
        match rx.recv_timeout(STATS_FLUSH_INTERVAL) {
            Err(RecvTimeoutError::Timeout) => {
                let _ = header.write_stats(&file);
            }
            // Disconnected (или явный сигнал) = close
            _ => break,
        }
    }
    let _ = header.write_stats(&file);
}
