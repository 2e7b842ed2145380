//! Transcript persistence — one JSON Lines file per thread id.
//!
//! Files managed under the memory directory:
//! - `<thread_id>.jsonl` — one `{"role", "content", "ts"}` object per line,
//!   oldest first. `ts` is when the message was first persisted.
//!
//! Every write persists the complete transcript, never a diff. The new
//! content goes to a temporary sibling that is then renamed over the
//! target, so a reader sees either the previous or the new transcript.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;
use crate::message::{Message, Role};

const TRANSCRIPT_EXT: &str = "jsonl";

/// On-disk shape of one transcript line.
#[derive(Serialize, Deserialize)]
struct TranscriptLine {
    role: Role,
    content: String,
    /// RFC 3339 timestamp of the write that first stored this message.
    ts: String,
}

impl TranscriptLine {
    fn stamped(m: &Message, ts: &str) -> Self {
        Self { role: m.role, content: m.content.clone(), ts: ts.to_string() }
    }

    fn matches(&self, m: &Message) -> bool {
        self.role == m.role && self.content == m.content
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[derive(Debug, Clone)]
pub struct TranscriptStore {
    dir: PathBuf,
}

impl TranscriptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, thread_id: &str) -> PathBuf {
        self.dir.join(format!("{thread_id}.{TRANSCRIPT_EXT}"))
    }

    /// Overwrite the thread's transcript with `messages`. Creates the memory
    /// directory if it does not exist yet.
    ///
    /// Messages that match the stored line at the same position keep their
    /// stored timestamp.
    pub fn write(&self, thread_id: &str, messages: &[Message]) -> Result<PathBuf, AppError> {
        // Old timestamps are best effort; an unreadable file is replaced.
        let existing = self.read_lines(thread_id).unwrap_or_default();
        let ts = now();
        let lines: Vec<TranscriptLine> = messages
            .iter()
            .enumerate()
            .map(|(i, m)| match existing.get(i) {
                Some(old) if old.matches(m) => TranscriptLine::stamped(m, &old.ts),
                _ => TranscriptLine::stamped(m, &ts),
            })
            .collect();
        self.write_lines(thread_id, &lines)
    }

    /// Add `messages` to the end of the thread's stored transcript. Earlier
    /// lines are kept unchanged, timestamps included.
    pub fn append(&self, thread_id: &str, messages: &[Message]) -> Result<PathBuf, AppError> {
        let mut lines = self.read_lines(thread_id)?;
        let ts = now();
        lines.extend(messages.iter().map(|m| TranscriptLine::stamped(m, &ts)));
        self.write_lines(thread_id, &lines)
    }

    /// Read the thread's transcript. A thread that was never written has an
    /// empty transcript.
    pub fn read(&self, thread_id: &str) -> Result<Vec<Message>, AppError> {
        Ok(self
            .read_lines(thread_id)?
            .into_iter()
            .map(|l| Message { role: l.role, content: l.content })
            .collect())
    }

    fn read_lines(&self, thread_id: &str) -> Result<Vec<TranscriptLine>, AppError> {
        let path = self.path_for(thread_id);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::Memory(format!("cannot read {}: {e}", path.display())));
            }
        };

        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str::<TranscriptLine>(line).map_err(|e| {
                    AppError::Memory(format!("malformed {} line {}: {e}", path.display(), i + 1))
                })
            })
            .collect()
    }

    fn write_lines(&self, thread_id: &str, lines: &[TranscriptLine]) -> Result<PathBuf, AppError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            AppError::Memory(format!("cannot create {}: {e}", self.dir.display()))
        })?;

        let mut out = String::new();
        for line in lines {
            let json = serde_json::to_string(line)
                .map_err(|e| AppError::Memory(format!("serialise transcript line: {e}")))?;
            out.push_str(&json);
            out.push('\n');
        }

        let path = self.path_for(thread_id);
        let tmp = path.with_extension(format!("{TRANSCRIPT_EXT}.tmp"));
        let result = fs::File::create(&tmp)
            .and_then(|mut f| f.write_all(out.as_bytes()).and_then(|_| f.sync_all()))
            .map_err(|e| AppError::Memory(format!("cannot write {}: {e}", tmp.display())))
            .and_then(|_| {
                fs::rename(&tmp, &path).map_err(|e| {
                    AppError::Memory(format!("cannot replace {}: {e}", path.display()))
                })
            });
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result?;

        debug!(path = %path.display(), messages = lines.len(), "transcript written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, TranscriptStore) {
        let dir = TempDir::new().unwrap();
        let store = TranscriptStore::new(dir.path().join("memory"));
        (dir, store)
    }

    #[test]
    fn write_then_read_round_trip() {
        let (_dir, store) = setup();
        let messages = vec![
            Message::user("Hello"),
            Message::assistant("Hi there"),
            Message::user("multi\nline\n### with a header"),
            Message::user("Hello"),
        ];
        store.write("1", &messages).unwrap();
        assert_eq!(store.read("1").unwrap(), messages);
    }

    #[test]
    fn write_creates_directory_idempotently() {
        let (_dir, store) = setup();
        assert!(!store.dir().exists());
        store.write("1", &[Message::user("a")]).unwrap();
        store.write("1", &[Message::user("a")]).unwrap();
        assert!(store.dir().is_dir());
    }

    #[test]
    fn write_overwrites_with_complete_transcript() {
        let (_dir, store) = setup();
        store.write("1", &[Message::user("a"), Message::assistant("b")]).unwrap();
        store.write("1", &[Message::user("c")]).unwrap();
        assert_eq!(store.read("1").unwrap(), vec![Message::user("c")]);
    }

    #[test]
    fn no_temp_file_left_behind() {
        let (_dir, store) = setup();
        store.write("1", &[Message::user("a")]).unwrap();
        let names: Vec<_> = fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["1.jsonl".to_string()]);
    }

    #[test]
    fn threads_use_separate_files() {
        let (_dir, store) = setup();
        store.write("a", &[Message::user("for a")]).unwrap();
        store.write("b", &[Message::user("for b")]).unwrap();
        assert_eq!(store.read("a").unwrap(), vec![Message::user("for a")]);
        assert_eq!(store.path_for("b"), store.dir().join("b.jsonl"));
    }

    #[test]
    fn missing_transcript_is_empty() {
        let (_dir, store) = setup();
        assert!(store.read("never-written").unwrap().is_empty());
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let (_dir, store) = setup();
        store.write("1", &[Message::user("ok")]).unwrap();
        let path = store.path_for("1");
        let mut text = fs::read_to_string(&path).unwrap();
        text.push_str("not json\n");
        fs::write(&path, text).unwrap();

        let msg = store.read("1").unwrap_err().to_string();
        assert!(msg.contains("line 2"), "got: {msg}");
    }

    #[test]
    fn lines_carry_timestamp() {
        let (_dir, store) = setup();
        store.write("1", &[Message::user("a")]).unwrap();
        let text = fs::read_to_string(store.path_for("1")).unwrap();
        let v: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(v["role"], "user");
        assert!(v["ts"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn append_keeps_earlier_lines_and_timestamps() {
        let (_dir, store) = setup();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(
            store.path_for("1"),
            "{\"role\":\"user\",\"content\":\"old\",\"ts\":\"2020-01-01T00:00:00Z\"}\n",
        )
        .unwrap();

        store.append("1", &[Message::user("new"), Message::assistant("reply")]).unwrap();

        assert_eq!(
            store.read("1").unwrap(),
            vec![Message::user("old"), Message::user("new"), Message::assistant("reply")]
        );
        let text = fs::read_to_string(store.path_for("1")).unwrap();
        let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first["ts"], "2020-01-01T00:00:00Z");
    }

    #[test]
    fn rewrite_keeps_timestamps_of_unchanged_prefix() {
        let (_dir, store) = setup();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(
            store.path_for("1"),
            "{\"role\":\"user\",\"content\":\"a\",\"ts\":\"2020-01-01T00:00:00Z\"}\n",
        )
        .unwrap();

        store.write("1", &[Message::user("a"), Message::assistant("b")]).unwrap();

        let text = fs::read_to_string(store.path_for("1")).unwrap();
        let stamps: Vec<String> = text
            .lines()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["ts"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(stamps[0], "2020-01-01T00:00:00Z");
        assert_ne!(stamps[1], "2020-01-01T00:00:00Z");
    }

    #[test]
    fn append_refuses_to_clobber_malformed_file() {
        let (_dir, store) = setup();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.path_for("1"), "not json\n").unwrap();

        let err = store.append("1", &[Message::user("a")]).unwrap_err();
        assert!(matches!(err, AppError::Memory(_)));
        assert_eq!(fs::read_to_string(store.path_for("1")).unwrap(), "not json\n");
    }

    #[test]
    fn failed_replace_removes_temp_file() {
        let (_dir, store) = setup();
        // A directory where the transcript file should be makes the rename fail.
        fs::create_dir_all(store.path_for("1").join("occupied")).unwrap();

        let err = store.write("1", &[Message::user("a")]).unwrap_err();
        assert!(matches!(err, AppError::Memory(_)));
        assert!(!store.path_for("1").with_extension("jsonl.tmp").exists());
    }

    #[test]
    fn unwritable_directory_is_memory_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let store = TranscriptStore::new(blocker.join("memory"));
        let err = store.write("1", &[Message::user("a")]).unwrap_err();
        assert!(matches!(err, AppError::Memory(_)));
    }
}
