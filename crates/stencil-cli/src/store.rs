//! In-memory [`ResourceStore`] that saves downloads to a directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use stencil_core::{ResourceError, ResourceStore};

/// Keeps acquired resources in memory; `save_as` writes one to disk.
#[derive(Debug)]
pub struct FileStore {
    output_dir: PathBuf,
    next: u64,
    blobs: HashMap<u64, Vec<u8>>,
}

impl FileStore {
    #[must_use]
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            next: 0,
            blobs: HashMap::new(),
        }
    }

    /// Where `filename` would be written. Any directory part of the
    /// name is dropped so downloads stay inside the output directory.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Io`] for names with no file name at all,
    /// such as `/` or `..`.
    pub fn target(&self, filename: &str) -> Result<PathBuf, ResourceError> {
        let base = Path::new(filename)
            .file_name()
            .ok_or_else(|| ResourceError::Io(format!("{filename:?} does not name a file")))?;
        Ok(self.output_dir.join(base))
    }
}

impl ResourceStore for FileStore {
    type Handle = u64;

    fn acquire(&mut self, bytes: &[u8], mime: &str) -> Result<u64, ResourceError> {
        let id = self.next;
        self.next += 1;
        self.blobs.insert(id, bytes.to_vec());
        log::debug!("holding {} bytes of {mime} as #{id}", bytes.len());
        Ok(id)
    }

    fn release(&mut self, handle: u64) {
        self.blobs.remove(&handle);
    }

    fn save_as(&self, handle: &u64, filename: &str) -> Result<(), ResourceError> {
        let bytes = self
            .blobs
            .get(handle)
            .ok_or_else(|| ResourceError::Io(format!("resource #{handle} was released")))?;
        let path = self.target(filename)?;
        std::fs::write(&path, bytes)?;
        log::info!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("stencil-cli-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn target_strips_directories() {
        let store = FileStore::new(PathBuf::from("out"));
        assert_eq!(
            store.target("../../etc/stencil.png").unwrap(),
            Path::new("out").join("stencil.png")
        );
        assert_eq!(
            store.target("stencil-tatuaje.png").unwrap(),
            Path::new("out").join("stencil-tatuaje.png")
        );
    }

    #[test]
    fn names_without_a_file_part_are_refused() {
        let store = FileStore::new(PathBuf::from("out"));
        for name in ["/", "..", "."] {
            assert!(
                matches!(store.target(name), Err(ResourceError::Io(_))),
                "{name:?} accepted"
            );
        }
    }

    #[test]
    fn save_writes_bytes_verbatim() {
        let dir = scratch_dir("save");
        let mut store = FileStore::new(dir.clone());
        let handle = store.acquire(&[1, 2, 3, 255], "image/png").unwrap();
        store.save_as(&handle, "stencil-tatuaje.png").unwrap();
        assert_eq!(
            std::fs::read(dir.join("stencil-tatuaje.png")).unwrap(),
            vec![1, 2, 3, 255]
        );
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn released_handle_cannot_be_saved() {
        let mut store = FileStore::new(PathBuf::from("unused"));
        let handle = store.acquire(b"x", "image/png").unwrap();
        store.release(handle);
        assert!(store.blobs.is_empty());
        assert!(matches!(store.save_as(&handle, "x.png"), Err(ResourceError::Io(_))));
    }
}
