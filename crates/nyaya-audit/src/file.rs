//! # File-Backed Case Store
//!
//! One JSONL journal per case at `<root>/<caseId>.jsonl`. A journal is
//! replayed into memory the first time its case is touched; afterwards
//! the cache is authoritative and every append goes to disk first.
//!
//! ## Durability
//!
//! Each append writes one complete line, then `sync_data`. Only after the
//! sync succeeds is the record folded into the cache, so a failed write
//! leaves no in-memory trace and the caller sees the error.
//!
//! The cache also remembers the byte length of the last committed record.
//! A failed write or sync truncates the file back to it. Bytes found past
//! it at the next append (a rollback that itself failed) are cut before
//! writing, so a partial line never ends up in the middle of the journal.
//!
//! ## Recovery
//!
//! - A final line with no trailing newline that does not parse is a torn
//!   write from a crash. It is truncated away and logged.
//! - A final line with no trailing newline that does parse was fully
//!   written before the crash; the newline is restored.
//! - Any other line that fails to parse, belongs to another case or breaks
//!   sequence order is corruption. The journal is refused.
//!
//! The store assumes it is the only writer of its directory. The one
//! concession to other processes is [`TransferLedger::transfer_marker`]:
//! while no marker is cached, complete records appended by another writer
//! are folded in, so a process following a countdown sees a transfer
//! completed elsewhere.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use nyaya_core::{CaseId, StationId, Timestamp};

use crate::error::AuditError;
use crate::record::{CaseJournal, JournalRecord, OverrideAuditEntry, OverrideDraft, TransferMarker};
use crate::{AuditLog, TransferLedger};

const JOURNAL_EXTENSION: &str = "jsonl";

/// Durable case store over a directory of JSONL journals.
#[derive(Debug)]
pub struct FileCaseStore {
    root: PathBuf,
    journals: Mutex<HashMap<CaseId, CachedJournal>>,
}

/// A replayed journal and the file length its records occupy.
#[derive(Debug)]
struct CachedJournal {
    journal: CaseJournal,
    committed_len: u64,
}

impl FileCaseStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, AuditError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            journals: Mutex::new(HashMap::new()),
        })
    }

    /// Directory holding the journals.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the journal for `case_id`.
    pub fn journal_path(&self, case_id: &CaseId) -> PathBuf {
        self.root
            .join(format!("{}.{JOURNAL_EXTENSION}", case_id.as_str()))
    }

    /// Apply `f` to the cached journal of `case_id`, replaying it from disk
    /// on first use. The store lock is held for the whole call.
    fn with_journal<T>(
        &self,
        case_id: &CaseId,
        f: impl FnOnce(&Path, &mut CachedJournal) -> Result<T, AuditError>,
    ) -> Result<T, AuditError> {
        let mut journals = self.journals.lock();
        let path = self.journal_path(case_id);
        if !journals.contains_key(case_id) {
            let journal = replay(case_id, &path)?;
            let committed_len = match fs::metadata(&path) {
                Ok(meta) => meta.len(),
                Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
                Err(e) => return Err(e.into()),
            };
            journals.insert(
                case_id.clone(),
                CachedJournal {
                    journal,
                    committed_len,
                },
            );
        }
        match journals.get_mut(case_id) {
            Some(journal) => f(&path, journal),
            None => Err(AuditError::CorruptEntry {
                case_id: case_id.to_string(),
                line: 0,
                reason: "journal missing from cache after replay".to_string(),
            }),
        }
    }
}

/// File operations an append needs. Lets tests inject write faults.
trait JournalFile: Write {
    fn byte_len(&self) -> io::Result<u64>;
    fn sync(&mut self) -> io::Result<()>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl JournalFile for File {
    fn byte_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Append `line` at `committed_len`, or leave the file at that length.
fn append_line(
    case_id: &CaseId,
    file: &mut impl JournalFile,
    committed_len: u64,
    line: &[u8],
) -> Result<(), AuditError> {
    let len = file.byte_len()?;
    if len < committed_len {
        return Err(AuditError::CorruptEntry {
            case_id: case_id.to_string(),
            line: 0,
            reason: format!("journal shrank from {committed_len} to {len} bytes"),
        });
    }
    if len > committed_len {
        tracing::warn!(
            case_id = %case_id,
            stray_bytes = len - committed_len,
            "cutting uncommitted bytes from case journal"
        );
        file.truncate(committed_len)?;
    }

    if let Err(e) = file.write_all(line).and_then(|()| file.sync()) {
        tracing::error!(case_id = %case_id, error = %e, "journal append failed; rolling back");
        if let Err(rollback) = file.truncate(committed_len).and_then(|()| file.sync()) {
            tracing::error!(case_id = %case_id, error = %rollback, "journal rollback failed");
        }
        return Err(e.into());
    }
    Ok(())
}

/// Write one record durably, then fold it into the cached journal.
fn commit(path: &Path, cached: &mut CachedJournal, record: JournalRecord) -> Result<(), AuditError> {
    let mut line = serde_json::to_vec(&record)?;
    line.push(b'\n');

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    append_line(record.case_id(), &mut file, cached.committed_len, &line)?;
    cached.committed_len += line.len() as u64;

    let case_id = record.case_id().to_string();
    cached
        .journal
        .apply(record)
        .map_err(|reason| AuditError::CorruptEntry {
            case_id,
            line: 0,
            reason,
        })
}

/// Fold complete records written past `committed_len` by another writer.
/// An unterminated tail may still be in flight and is left alone.
fn catch_up(case_id: &CaseId, path: &Path, cached: &mut CachedJournal) -> Result<(), AuditError> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    if file.metadata()?.len() <= cached.committed_len {
        return Ok(());
    }
    file.seek(SeekFrom::Start(cached.committed_len))?;
    let mut raw = Vec::new();
    file.read_to_end(&mut raw)?;

    let corrupt = |reason: String| {
        tracing::error!(case_id = %case_id, reason = %reason, "foreign journal record rejected");
        AuditError::CorruptEntry {
            case_id: case_id.to_string(),
            line: 0,
            reason,
        }
    };
    for chunk in raw.split_inclusive(|b| *b == b'\n') {
        if !chunk.ends_with(b"\n") {
            break;
        }
        let record: JournalRecord =
            serde_json::from_slice(chunk).map_err(|e| corrupt(e.to_string()))?;
        if record.case_id() != case_id {
            return Err(corrupt(format!("record belongs to case {}", record.case_id())));
        }
        cached.journal.apply(record).map_err(corrupt)?;
        cached.committed_len += chunk.len() as u64;
        tracing::debug!(case_id = %case_id, "folded record from another writer");
    }
    Ok(())
}

/// Rebuild a case journal from its file. A missing file is an empty journal.
fn replay(case_id: &CaseId, path: &Path) -> Result<CaseJournal, AuditError> {
    let mut journal = CaseJournal::default();
    let mut raw = String::new();
    match File::open(path) {
        Ok(mut file) => {
            file.read_to_string(&mut raw)?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(journal),
        Err(e) => return Err(e.into()),
    }

    let corrupt = |line: usize, reason: String| {
        tracing::error!(case_id = %case_id, line, reason = %reason, "case journal is corrupt");
        AuditError::CorruptEntry {
            case_id: case_id.to_string(),
            line,
            reason,
        }
    };

    let mut offset = 0usize;
    let lines: Vec<&str> = raw.split_inclusive('\n').collect();
    let total = lines.len();
    for (idx, chunk) in lines.into_iter().enumerate() {
        let line_no = idx + 1;
        let terminated = chunk.ends_with('\n');
        let body = chunk.trim_end_matches(['\n', '\r']);
        let is_tail = line_no == total && !terminated;

        if body.trim().is_empty() {
            if is_tail {
                repair_torn_tail(case_id, path, offset as u64)?;
                break;
            }
            offset += chunk.len();
            continue;
        }

        let record: JournalRecord = match serde_json::from_str(body) {
            Ok(record) => record,
            Err(e) if is_tail => {
                tracing::warn!(
                    case_id = %case_id,
                    line = line_no,
                    error = %e,
                    "truncating torn final journal line"
                );
                repair_torn_tail(case_id, path, offset as u64)?;
                break;
            }
            Err(e) => return Err(corrupt(line_no, e.to_string())),
        };

        if record.case_id() != case_id {
            return Err(corrupt(
                line_no,
                format!("record belongs to case {}", record.case_id()),
            ));
        }
        journal
            .apply(record)
            .map_err(|reason| corrupt(line_no, reason))?;

        if is_tail {
            let mut file = OpenOptions::new().append(true).open(path)?;
            file.write_all(b"\n")?;
            file.sync_data()?;
        }
        offset += chunk.len();
    }

    Ok(journal)
}

fn repair_torn_tail(case_id: &CaseId, path: &Path, keep: u64) -> Result<(), AuditError> {
    let file = OpenOptions::new().write(true).open(path)?;
    file.set_len(keep)?;
    file.sync_data()?;
    tracing::warn!(case_id = %case_id, bytes = keep, "case journal truncated to last complete record");
    Ok(())
}

impl AuditLog for FileCaseStore {
    fn append(&self, draft: OverrideDraft) -> Result<OverrideAuditEntry, AuditError> {
        let case_id = draft.case_id.clone();
        self.with_journal(&case_id, |path, cached| {
            let entry = cached.journal.prepare_override(draft)?;
            commit(path, cached, JournalRecord::Override(entry.clone()))?;
            Ok(entry)
        })
    }

    fn for_case(&self, case_id: &CaseId) -> Result<Vec<OverrideAuditEntry>, AuditError> {
        self.with_journal(case_id, |_, cached| Ok(cached.journal.overrides().to_vec()))
    }
}

impl TransferLedger for FileCaseStore {
    fn mark_transferred(
        &self,
        case_id: &CaseId,
        at: Timestamp,
        target_station: Option<StationId>,
    ) -> Result<TransferMarker, AuditError> {
        self.with_journal(case_id, |path, cached| {
            let marker = cached.journal.prepare_transfer(case_id, at, target_station)?;
            commit(path, cached, JournalRecord::TransferCompleted(marker.clone()))?;
            Ok(marker)
        })
    }

    fn transfer_marker(&self, case_id: &CaseId) -> Result<Option<TransferMarker>, AuditError> {
        self.with_journal(case_id, |path, cached| {
            if cached.journal.transfer().is_none() {
                catch_up(case_id, path, cached)?;
            }
            Ok(cached.journal.transfer().cloned())
        })
    }
}
