use super::StoreError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An append-only collection of JSON documents, one per line.
///
/// All documents are held in memory; the file (when there is one) is only
/// appended to, and truncated when a pending append has to be rolled back.
#[derive(Debug)]
pub struct JsonlCollection<T> {
    path: Option<PathBuf>,
    docs: Vec<T>,
}

/// Position of a collection before an append, used to undo it.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    len: usize,
    file_len: u64,
}

impl<T> JsonlCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Collection that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            docs: Vec::new(),
        }
    }

    /// Open (or create) the collection backed by `path`, loading every line.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let docs = if path.exists() {
            load(&path)?
        } else {
            File::create(&path)?;
            Vec::new()
        };

        info!(path = %path.display(), documents = docs.len(), "Opened collection");

        Ok(Self {
            path: Some(path),
            docs,
        })
    }

    pub fn all(&self) -> &[T] {
        &self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn get(&self, offset: usize) -> Option<&T> {
        self.docs.get(offset)
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn checkpoint(&self) -> Result<Checkpoint, StoreError> {
        let file_len = match &self.path {
            Some(path) => std::fs::metadata(path)?.len(),
            None => 0,
        };
        Ok(Checkpoint {
            len: self.docs.len(),
            file_len,
        })
    }

    /// Append a document. It becomes visible only once the line is flushed.
    ///
    /// A write that fails partway is cut back off the file, so a failed
    /// append never leaves a torn line behind.
    pub fn append(&mut self, doc: T) -> Result<usize, StoreError> {
        if let Some(path) = &self.path {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let start = file.metadata()?.len();

            if let Err(e) = write_line(&file, &doc) {
                if let Err(truncate) = file.set_len(start) {
                    return Err(StoreError::Rollback {
                        cause: Box::new(e),
                        rollback: Box::new(truncate.into()),
                    });
                }
                debug!(path = %path.display(), len = start, "Discarded partial line");
                return Err(e);
            }
        }

        self.docs.push(doc);
        Ok(self.docs.len() - 1)
    }

    /// Drop everything appended after `checkpoint`, in memory and on disk.
    pub fn rollback(&mut self, checkpoint: Checkpoint) -> Result<(), StoreError> {
        self.docs.truncate(checkpoint.len);

        if let Some(path) = &self.path {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(checkpoint.file_len)?;
            debug!(path = %path.display(), len = checkpoint.file_len, "Rolled back collection");
        }

        Ok(())
    }
}

fn write_line<T: Serialize>(file: &File, doc: &T) -> Result<(), StoreError> {
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, doc)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let reader = BufReader::new(File::open(path)?);
    let mut docs = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc = serde_json::from_str(&line).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;
        docs.push(doc);
    }

    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    use serde::ser::{Error as _, SerializeStruct, Serializer};

    #[derive(Debug, PartialEq, Deserialize)]
    struct Doc {
        name: String,
    }

    /// Fails halfway through a document named "torn", after some of it has
    /// already been written.
    impl Serialize for Doc {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut state = serializer.serialize_struct("Doc", 2)?;
            state.serialize_field("name", &self.name)?;
            if self.name == "torn" {
                return Err(S::Error::custom("serializer gave up"));
            }
            state.end()
        }
    }

    fn doc(name: &str) -> Doc {
        Doc {
            name: name.to_string(),
        }
    }

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("jsonl-{tag}-{}", uuid::Uuid::new_v4()))
            .join("docs.jsonl")
    }

    #[test]
    fn documents_survive_reopen() {
        let path = temp_path("reopen");
        let mut docs = JsonlCollection::open(&path).unwrap();
        docs.append(doc("first")).unwrap();
        docs.append(doc("second")).unwrap();

        let reopened: JsonlCollection<Doc> = JsonlCollection::open(&path).unwrap();
        assert_eq!(reopened.all(), &[doc("first"), doc("second")]);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn rollback_truncates_file_and_memory() {
        let path = temp_path("rollback");
        let mut docs = JsonlCollection::open(&path).unwrap();
        docs.append(doc("kept")).unwrap();

        let checkpoint = docs.checkpoint().unwrap();
        docs.append(doc("dropped")).unwrap();
        docs.rollback(checkpoint).unwrap();

        assert_eq!(docs.all(), &[doc("kept")]);
        let reopened: JsonlCollection<Doc> = JsonlCollection::open(&path).unwrap();
        assert_eq!(reopened.all(), &[doc("kept")]);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn corrupt_line_reports_its_position() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{\"name\":\"ok\"}\nnot json\n").unwrap();

        let err = JsonlCollection::<Doc>::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { line: 2, .. }));

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn failed_append_leaves_file_readable() {
        let path = temp_path("torn");
        let mut docs = JsonlCollection::open(&path).unwrap();
        docs.append(doc("kept")).unwrap();
        let len_before = std::fs::metadata(&path).unwrap().len();

        assert!(docs.append(doc("torn")).is_err());
        assert_eq!(docs.all(), &[doc("kept")]);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), len_before);

        docs.append(doc("after")).unwrap();
        let reopened: JsonlCollection<Doc> = JsonlCollection::open(&path).unwrap();
        assert_eq!(reopened.all(), &[doc("kept"), doc("after")]);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn checkpoint_of_missing_file_is_an_error() {
        let path = temp_path("vanished");
        let docs: JsonlCollection<Doc> = JsonlCollection::open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(docs.checkpoint(), Err(StoreError::Io(_))));

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn in_memory_collection_never_touches_disk() {
        let mut docs = JsonlCollection::in_memory();
        let checkpoint = docs.checkpoint().unwrap();
        assert_eq!(docs.append(doc("a")).unwrap(), 0);
        assert_eq!(docs.len(), 1);
        docs.rollback(checkpoint).unwrap();
        assert_eq!(docs.len(), 0);
    }
}
