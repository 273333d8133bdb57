use anyhow::Result;
use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{create_dir_all, OpenOptions};
use std::io::{BufReader, Seek, SeekFrom, Write};
use std::path::Path;

/// Whole-file JSON array queues on the node-local disk.
///
/// Unlike the shared folder, these files are touched by two processes on the
/// same machine (the CLI enqueues while the agent drains), so every
/// read-modify-write holds an exclusive advisory lock.
pub fn append<T: Serialize + DeserializeOwned>(path: &Path, item: T) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)?;
    file.lock_exclusive()?;

    file.seek(SeekFrom::Start(0))?;
    // Same policy as read_all: a malformed queue is an error, never a reset.
    let mut items: Vec<T> = match serde_json::from_reader(BufReader::new(&mut file)) {
        Ok(items) => items,
        Err(e) if e.is_eof() => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    items.push(item);

    let json = serde_json::to_string_pretty(&items)?;
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Reads the queue without consuming it. Missing or empty files are an empty
/// queue; a malformed file is an error so the caller leaves it for retry.
pub fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = match OpenOptions::new().read(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    file.lock_shared()?;
    match serde_json::from_reader(BufReader::new(&file)) {
        Ok(items) => Ok(items),
        Err(e) if e.is_eof() => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Overwrites the queue with `[]`. Only called after every item has been
/// handed off, so a crash before this point re-delivers (at-least-once).
pub fn clear(path: &Path) -> Result<()> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)?;
    file.lock_exclusive()?;
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(b"[]")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn append_read_clear_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("MESSAGES").join("outbound_queue.json");

        append(&path, json!({"subject": "one"})).unwrap();
        append(&path, json!({"subject": "two"})).unwrap();

        let items: Vec<Value> = read_all(&path).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["subject"], "one");

        clear(&path).unwrap();
        let items: Vec<Value> = read_all(&path).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn missing_queue_reads_empty() {
        let dir = TempDir::new().unwrap();
        let items: Vec<Value> = read_all(&dir.path().join("nope.json")).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn malformed_queue_is_an_error_not_a_reset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("outbound_queue.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(read_all::<Value>(&path).is_err());
        assert!(append(&path, json!({"subject": "late"})).is_err());
        // still on disk for the next attempt, from either side
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }
}
