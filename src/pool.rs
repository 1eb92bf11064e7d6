use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to read candidate file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("candidate file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

// The candidate file is either a bare array or wrapped:
// { "options": [ "...", ... ] }
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PoolFile {
    Wrapped { options: Vec<String> },
    Plain(Vec<String>),
}

/// The texts a board can be filled with.
///
/// Texts are kept byte-for-byte as given. Exact repeats collapse to their
/// first occurrence, so any 25 entries drawn from the pool are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidatePool {
    texts: Vec<String>,
}

impl CandidatePool {
    pub fn new<I, T>(texts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut pool = CandidatePool::default();
        for text in texts {
            let text: String = text.into();
            if !pool.contains(&text) {
                pool.texts.push(text);
            }
        }
        pool
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PoolError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PoolError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed: PoolFile =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| PoolError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        let texts = match parsed {
            PoolFile::Wrapped { options } => options,
            PoolFile::Plain(texts) => texts,
        };
        let pool = CandidatePool::new(texts);
        tracing::debug!(path = %path.display(), size = pool.len(), "loaded candidate pool");
        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.texts.iter().any(|t| t == text)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.texts
    }
}
