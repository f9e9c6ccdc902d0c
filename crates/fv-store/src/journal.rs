use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs2::FileExt;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::table::Mutation;

/// When journal writes are forced to stable storage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// `fdatasync` after every record.
    EveryWrite,
    /// Hand each record to the OS and let it schedule the disk write.
    #[default]
    OsDefault,
}

#[derive(Clone, Debug, Default)]
pub struct JournalConfig {
    pub sync_mode: SyncMode,
}

/// Record prefix: payload length then payload CRC32, both `u32` LE.
const HEADER_SIZE: usize = 8;

/// Append-only log of table mutations.
///
/// Each record is `[len][crc32][bincode Mutation]`. The journal holds an
/// exclusive lock on `<path>.lock` for its lifetime, so a second process
/// (or a second handle in this one) cannot append to or compact it.
pub struct Journal {
    path: PathBuf,
    writer: Mutex<JournalWriter<File>>,
    config: JournalConfig,
    _lock: File,
}

impl Journal {
    /// Open or create the journal at `path`.
    ///
    /// Fails with [`StoreError::Locked`] if another handle has it open. A
    /// partially written record at the end of the file is cut off so later
    /// appends stay readable.
    pub fn open(path: &Path, config: JournalConfig) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let lock = acquire_lock(path)?;

        let file = OpenOptions::new().create(true).read(true).append(true).open(path)?;
        let len = file.metadata()?.len();

        let mut frames = FrameReader::new(BufReader::new(File::open(path)?), len);
        for frame in frames.by_ref() {
            frame?;
        }
        let end = frames.offset;
        if end < len {
            warn!(path = %path.display(), kept = end, dropped = len - end, "trimming torn journal tail");
            file.set_len(end)?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(JournalWriter::new(file, end)),
            config,
            _lock: lock,
        })
    }

    /// Append one mutation and return the offset it was written at.
    pub fn append(&self, mutation: &Mutation) -> StoreResult<u64> {
        let record = encode_record(mutation)?;
        let mut w = self.writer.lock().expect("journal mutex poisoned");
        if w.failed {
            return Err(StoreError::JournalFailed(self.path.clone()));
        }
        let at = w.append(&record, self.config.sync_mode)?;
        debug!(offset = at, len = record.len(), "journal append");
        Ok(at)
    }

    /// Every readable mutation, in write order. Records failing their
    /// checksum or decoding are skipped with a warning.
    pub fn recover(&self) -> StoreResult<Vec<Mutation>> {
        let len = fs::metadata(&self.path)?.len();
        let mut mutations = Vec::new();
        for frame in FrameReader::new(BufReader::new(File::open(&self.path)?), len) {
            let (offset, frame) = frame?;
            match frame {
                Frame::Intact(payload) => match bincode::deserialize::<Mutation>(&payload) {
                    Ok(mutation) => mutations.push(mutation),
                    Err(e) => warn!(offset, error = %e, "undecodable journal record skipped"),
                },
                Frame::Corrupt { expected, actual } => {
                    warn!(offset, expected, actual, "journal record failed its checksum; skipped")
                }
            }
        }
        debug!(recovered = mutations.len(), "journal read");
        Ok(mutations)
    }

    /// Replace the journal contents with `mutations`.
    ///
    /// Records go to a temp file beside the journal, which is synced and
    /// renamed over it. A crash leaves either the old or the new journal.
    pub fn rewrite(&self, mutations: &[Mutation]) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut w = self.writer.lock().expect("journal mutex poisoned");

        let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
        let mut written = 0u64;
        {
            let mut out = BufWriter::new(temp.as_file_mut());
            for mutation in mutations {
                let record = encode_record(mutation)?;
                out.write_all(&record)?;
                written += record.len() as u64;
            }
            out.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| StoreError::Compaction {
            path: self.path.clone(),
            reason: e.error.to_string(),
        })?;

        let file = OpenOptions::new().read(true).append(true).open(&self.path)?;
        *w = JournalWriter::new(file, written);

        debug!(records = mutations.len(), bytes = written, "journal rewritten");
        Ok(())
    }

    /// Byte length of the committed journal.
    pub fn offset(&self) -> u64 {
        self.writer.lock().expect("journal mutex poisoned").offset
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal")
            .field("path", &self.path)
            .field("sync_mode", &self.config.sync_mode)
            .finish()
    }
}

/// `<journal>.lock`. A sidecar file, because compaction replaces the
/// journal's inode and a lock on it would go with the old one.
fn lock_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

fn acquire_lock(path: &Path) -> StoreResult<File> {
    let lock_path = lock_path(path);
    let lock = OpenOptions::new().create(true).write(true).open(&lock_path)?;
    lock.try_lock_exclusive().map_err(|e| {
        debug!(path = %lock_path.display(), error = %e, "journal lock held elsewhere");
        StoreError::Locked(path.to_path_buf())
    })?;
    Ok(lock)
}

/// File operations the writer needs beyond [`Write`].
trait JournalFile: Write {
    fn truncate(&self, len: u64) -> io::Result<()>;
    fn sync(&self) -> io::Result<()>;
}

impl JournalFile for File {
    fn truncate(&self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&self) -> io::Result<()> {
        self.sync_data()
    }
}

/// Unbuffered append side of the journal.
///
/// A failed append never leaves bytes behind for a later append to commit:
/// the file is cut back to the last committed record, and if even that
/// fails the writer refuses all further appends.
struct JournalWriter<F> {
    file: F,
    /// End of the last committed record.
    offset: u64,
    failed: bool,
}

impl<F: JournalFile> JournalWriter<F> {
    fn new(file: F, offset: u64) -> Self {
        Self {
            file,
            offset,
            failed: false,
        }
    }

    fn append(&mut self, record: &[u8], sync_mode: SyncMode) -> io::Result<u64> {
        let at = self.offset;
        let result = self.file.write_all(record).and_then(|()| match sync_mode {
            SyncMode::EveryWrite => self.file.sync(),
            SyncMode::OsDefault => Ok(()),
        });
        if let Err(e) = result {
            if let Err(cut) = self.file.truncate(at) {
                warn!(offset = at, error = %cut, "could not discard failed journal append; journal disabled");
                self.failed = true;
            }
            return Err(e);
        }
        self.offset = at + record.len() as u64;
        Ok(at)
    }
}

fn encode_record(mutation: &Mutation) -> StoreResult<Vec<u8>> {
    let payload = bincode::serialize(mutation).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let length = u32::try_from(payload.len())
        .map_err(|_| StoreError::Serialization(format!("record of {} bytes is too large", payload.len())))?;

    let mut record = Vec::with_capacity(HEADER_SIZE + payload.len());
    record.extend_from_slice(&length.to_le_bytes());
    record.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    record.extend_from_slice(&payload);
    Ok(record)
}

enum Frame {
    Intact(Vec<u8>),
    Corrupt { expected: u32, actual: u32 },
}

/// Reads framed records front to back, yielding `(offset, frame)`.
///
/// Iteration ends at the first record that does not fit in the file;
/// `offset` is then the end of the last complete record.
struct FrameReader<R> {
    inner: R,
    offset: u64,
    len: u64,
}

impl<R: Read> FrameReader<R> {
    fn new(inner: R, len: u64) -> Self {
        Self { inner, offset: 0, len }
    }

    fn read_frame(&mut self) -> StoreResult<Option<(u64, Frame)>> {
        let remaining = self.len - self.offset;
        if remaining == 0 {
            return Ok(None);
        }
        if remaining < HEADER_SIZE as u64 {
            warn!(offset = self.offset, remaining, "journal ends inside a record header");
            return Ok(None);
        }

        let mut header = [0u8; HEADER_SIZE];
        self.inner.read_exact(&mut header)?;
        let [l0, l1, l2, l3, c0, c1, c2, c3] = header;
        let length = u32::from_le_bytes([l0, l1, l2, l3]);
        let expected = u32::from_le_bytes([c0, c1, c2, c3]);

        let end = self.offset + HEADER_SIZE as u64 + u64::from(length);
        if length == 0 || end > self.len {
            warn!(offset = self.offset, length, len = self.len, "journal ends inside a record");
            return Ok(None);
        }

        let mut payload = vec![0u8; length as usize];
        self.inner.read_exact(&mut payload)?;
        let at = std::mem::replace(&mut self.offset, end);

        let actual = crc32fast::hash(&payload);
        let frame = if actual == expected {
            Frame::Intact(payload)
        } else {
            Frame::Corrupt { expected, actual }
        };
        Ok(Some((at, frame)))
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = StoreResult<(u64, Frame)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_frame().transpose()
    }
}
