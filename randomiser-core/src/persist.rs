use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::spawn::Distribution;
use crate::{RandomiserError, Result};

/// Where a finished distribution goes, and where it is read back from.
pub trait Persistence {
    fn save(&mut self, distribution: &Distribution) -> Result<()>;
    fn load(&self) -> Result<Distribution>;
}

/// Keeps the last saved distribution in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Option<Distribution>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Option<&Distribution> {
        self.saved.as_ref()
    }
}

impl Persistence for MemoryStore {
    fn save(&mut self, distribution: &Distribution) -> Result<()> {
        self.saved = Some(distribution.clone());
        Ok(())
    }

    fn load(&self) -> Result<Distribution> {
        self.saved
            .clone()
            .ok_or_else(|| RandomiserError::Config("no distribution has been saved".to_string()))
    }
}

/// Gzip-compressed JSON save file.
#[derive(Debug, Clone)]
pub struct GzJsonFile {
    path: PathBuf,
}

impl GzJsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for GzJsonFile {
    fn save(&mut self, distribution: &Distribution) -> Result<()> {
        let json = serde_json::to_vec(distribution)?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        let bytes = encoder.finish()?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn load(&self) -> Result<Distribution> {
        let bytes = fs::read(&self.path)?;
        let mut decoder = GzDecoder::new(bytes.as_slice());
        let mut json = Vec::new();
        decoder.read_to_end(&mut json)?;
        Ok(serde_json::from_slice(&json)?)
    }
}
