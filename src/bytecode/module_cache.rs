use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{module::Module, verify::verify};

/// Bumped whenever the cache layout or bytecode format changes.
const FORMAT_VERSION: u32 = 1;
const COMPILER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    format_version: u32,
    compiler_version: String,
    source_hash: String,
    module: Module,
}

/// Compiled modules stored as JSON, keyed by a hash of the source text.
///
/// Anything unreadable, stale or structurally invalid is treated as a miss.
#[derive(Debug, Clone)]
pub struct ModuleCache {
    dir: PathBuf,
}

impl ModuleCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load(&self, source_path: &Path, source: &str) -> Option<Module> {
        let key = cache_key(source);
        let path = self.cache_path(source_path, &key);
        let module = read_entry(&path, &key);
        match &module {
            Some(_) => debug!(target: "ember::cache", path = %path.display(), "cache hit"),
            None => debug!(target: "ember::cache", path = %path.display(), "cache miss"),
        }
        module
    }

    pub fn store(&self, source_path: &Path, source: &str, module: &Module) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let key = cache_key(source);
        let path = self.cache_path(source_path, &key);
        let entry = CacheEntry {
            format_version: FORMAT_VERSION,
            compiler_version: COMPILER_VERSION.to_string(),
            source_hash: to_hex(&key),
            module: module.clone(),
        };
        let json = serde_json::to_string(&entry).map_err(io::Error::other)?;
        fs::write(&path, json)?;
        debug!(target: "ember::cache", path = %path.display(), "stored module");
        Ok(())
    }

    fn cache_path(&self, source_path: &Path, key: &[u8; 32]) -> PathBuf {
        let stem = source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("module");
        self.dir.join(format!("{}-{}.json", stem, to_hex(key)))
    }
}

fn read_entry(path: &Path, key: &[u8; 32]) -> Option<Module> {
    let text = fs::read_to_string(path).ok()?;
    let entry: CacheEntry = serde_json::from_str(&text).ok()?;
    if entry.format_version != FORMAT_VERSION
        || entry.compiler_version != COMPILER_VERSION
        || entry.source_hash != to_hex(key)
    {
        return None;
    }
    verify(&entry.module).ok()?;
    Some(entry.module)
}

/// Hash of the compiler version and the source text.
pub fn cache_key(source: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(COMPILER_VERSION.as_bytes());
    hasher.update([0u8]);
    hasher.update(source.as_bytes());
    hasher.finalize().into()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_bytes(bytes: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hasher.finalize().into()
    }

    #[test]
    fn hash_bytes_matches_known_digest() {
        assert_eq!(
            to_hex(&hash_bytes(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn cache_key_depends_on_source() {
        assert_ne!(cache_key("let a = 1;"), cache_key("let a = 2;"));
        assert_eq!(cache_key("x;"), cache_key("x;"));
    }
}
