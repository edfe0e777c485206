//! In-memory FileSystem for execution tests

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use assetplan::domain::ports::{FileSystem, FsError, FsResult};

#[derive(Debug, Default)]
pub struct MemFs {
    pub files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
    /// Operations in the order they ran
    pub log: RefCell<Vec<String>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, path: &Path) -> Option<String> {
        self.files
            .borrow()
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl FileSystem for MemFs {
    fn copy(&self, from: &Path, to: &Path) -> FsResult<u64> {
        let bytes = std::fs::read(from).map_err(|e| FsError::from_io(from, e))?;
        let len = bytes.len() as u64;
        self.log
            .borrow_mut()
            .push(format!("copy {}", to.file_name().unwrap().to_string_lossy()));
        self.files.borrow_mut().insert(to.to_path_buf(), bytes);
        Ok(len)
    }

    fn write(&self, path: &Path, content: &[u8]) -> FsResult<()> {
        self.log
            .borrow_mut()
            .push(format!("write {}", path.file_name().unwrap().to_string_lossy()));
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }
}
