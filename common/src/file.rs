//! A [`Store`] that keeps every intermediate artifact on the local filesystem.
//!
//! Layout under the root directory:
//!
//! ```text
//! split/split-{n}.txt                       input chunks
//! mapper-end/mapper-{i}.txt                 raw pairs emitted by mapper i
//! mapper-end/combinator-end/mapper-{i}.txt  combined output of mapper i
//! shuffle/shuffle-partition-{i}.txt         reducer partition i
//! reducer-end/reducer-{i}.txt               output of reducer i
//! result.txt                                final sorted result
//! ```

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Error};
use async_trait::async_trait;
use bytes::Bytes;
use glob::glob;
use tokio::fs;
use tracing::{debug, info};

use crate::codec::{decode_lines, encode_lines};
use crate::store::Store;
use crate::utils::{chunk_lines, string_from_bytes};
use crate::{CombinedRecord, InputUnit, KeyValue, ReducedRecord, ShuffleGroup, ShuffleHandle};

const SPLIT_DIR: &str = "split";
const MAPPER_DIR: &str = "mapper-end";
const COMBINED_DIR: &str = "mapper-end/combinator-end";
const SHUFFLE_DIR: &str = "shuffle";
const REDUCER_DIR: &str = "reducer-end";
const RESULT_FILE: &str = "result.txt";

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    lines_per_split: usize,
}

impl FileStore {
    /// Create a store rooted at `root`. Input files are cut into chunks of
    /// `lines_per_split` lines.
    pub fn new(root: impl Into<PathBuf>, lines_per_split: usize) -> Self {
        Self {
            root: root.into(),
            lines_per_split: lines_per_split.max(1),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the final result file.
    pub fn result_path(&self) -> PathBuf {
        self.root.join(RESULT_FILE)
    }

    /// Remove the artifacts of a previous run and recreate the directory tree.
    pub async fn prepare(&self) -> Result<(), Error> {
        for dir in [SPLIT_DIR, MAPPER_DIR, SHUFFLE_DIR, REDUCER_DIR] {
            let path = self.root.join(dir);
            if fs::try_exists(&path).await? {
                fs::remove_dir_all(&path).await?;
            }
        }
        for dir in [SPLIT_DIR, COMBINED_DIR, SHUFFLE_DIR, REDUCER_DIR] {
            fs::create_dir_all(self.root.join(dir)).await?;
        }
        info!("Prepared data directory {}", self.root.display());
        Ok(())
    }

    async fn write(&self, path: PathBuf, contents: String) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, contents)
            .await
            .with_context(|| format!("failed writing {}", path.display()))?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    async fn read(&self, path: &Path) -> Result<String, Error> {
        fs::read_to_string(path)
            .await
            .with_context(|| format!("failed reading {}", path.display()))
    }
}

#[async_trait]
impl Store for FileStore {
    async fn split_input(&self, source: &str) -> Result<Vec<InputUnit>, Error> {
        let mut sources = glob(source)
            .map_err(|e| anyhow!("invalid input pattern `{source}`: {e}"))?
            .flatten()
            .filter(|path| path.is_file())
            .collect::<Vec<_>>();
        sources.sort();

        if sources.is_empty() {
            return Err(anyhow!("no input files match `{source}`"));
        }

        let mut units = Vec::new();
        for path in sources {
            let contents = string_from_bytes(Bytes::from(fs::read(&path).await?))
                .with_context(|| format!("input {} is not valid UTF-8", path.display()))?;
            for chunk in chunk_lines(&contents, self.lines_per_split) {
                let split = self
                    .root
                    .join(SPLIT_DIR)
                    .join(format!("split-{}.txt", units.len() + 1));
                self.write(split.clone(), chunk).await?;
                units.push(InputUnit::new(split.to_string_lossy()));
            }
        }

        info!(
            "Split input `{source}` into {} files of up to {} lines",
            units.len(),
            self.lines_per_split
        );
        Ok(units)
    }

    async fn materialize(&self, unit: &InputUnit) -> Result<Bytes, Error> {
        let data = fs::read(unit.as_str())
            .await
            .with_context(|| format!("failed reading input unit {unit}"))?;
        Ok(Bytes::from(data))
    }

    async fn persist_emitted(&self, pairs: &[KeyValue], worker: usize) -> Result<(), Error> {
        let path = self.root.join(MAPPER_DIR).join(format!("mapper-{worker}.txt"));
        self.write(path, encode_lines(pairs)?).await
    }

    async fn persist_mapper_output(&self, record: &CombinedRecord, worker: usize) -> Result<(), Error> {
        let path = self.root.join(COMBINED_DIR).join(format!("mapper-{worker}.txt"));
        let entries = record.iter().collect::<Vec<_>>();
        self.write(path, encode_lines(&entries)?).await
    }

    async fn retrieve_mapper_outputs(&self, num_mappers: usize) -> Result<Vec<CombinedRecord>, Error> {
        let mut records = Vec::with_capacity(num_mappers);
        for worker in 0..num_mappers {
            let path = self.root.join(COMBINED_DIR).join(format!("mapper-{worker}.txt"));
            let entries: Vec<(String, u64)> = decode_lines(&self.read(&path).await?)?;
            records.push(entries.into_iter().collect());
        }
        Ok(records)
    }

    async fn persist_shuffle_bucket(&self, group: &ShuffleGroup, bucket: usize) -> Result<ShuffleHandle, Error> {
        let path = self
            .root
            .join(SHUFFLE_DIR)
            .join(format!("shuffle-partition-{bucket}.txt"));
        let entries = group.iter().collect::<Vec<_>>();
        self.write(path.clone(), encode_lines(&entries)?).await?;
        Ok(ShuffleHandle::new(path.to_string_lossy()))
    }

    async fn materialize_shuffle_bucket(&self, handle: &ShuffleHandle) -> Result<ShuffleGroup, Error> {
        let entries: Vec<(String, Vec<u64>)> = decode_lines(&self.read(Path::new(handle.as_str())).await?)?;
        Ok(entries.into_iter().collect())
    }

    async fn persist_reducer_output(&self, record: &ReducedRecord, worker: usize) -> Result<(), Error> {
        let path = self.root.join(REDUCER_DIR).join(format!("reducer-{worker}.txt"));
        let entries = record.iter().collect::<Vec<_>>();
        self.write(path, encode_lines(&entries)?).await
    }

    async fn persist_final_result(&self, result: &[KeyValue]) -> Result<(), Error> {
        let mut contents = String::new();
        for kv in result {
            contents.push_str(&kv.to_string());
            contents.push('\n');
        }
        self.write(self.result_path(), contents).await
    }
}
