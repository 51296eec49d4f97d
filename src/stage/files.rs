//! Load-directory layout.
//!
//! For a table `T` the extraction stage writes `T_count.txt` holding the
//! number of pages, pages `T_0.json` .. `T_<n-1>.json`, and optionally a
//! supplementary `T_test.json`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::error::{StageError, StageResult};

/// Suffix of the page-count file.
pub const COUNT_SUFFIX: &str = "_count.txt";

/// Suffix of the supplementary test-data file.
pub const TEST_SUFFIX: &str = "_test.json";

/// One file to read during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFile {
    Page { index: u64, path: PathBuf },
    Test { path: PathBuf },
}

impl PageFile {
    pub fn path(&self) -> &Path {
        match self {
            PageFile::Page { path, .. } | PageFile::Test { path } => path,
        }
    }

    /// Label used in logs.
    pub fn label(&self) -> String {
        match self {
            PageFile::Page { index, .. } => format!("page {index}"),
            PageFile::Test { .. } => "test file".to_string(),
        }
    }
}

/// A directory of extracted pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadDir {
    root: PathBuf,
}

impl LoadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn count_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}{COUNT_SUFFIX}"))
    }

    pub fn page_path(&self, table: &str, page: u64) -> PathBuf {
        self.root.join(format!("{table}_{page}.json"))
    }

    pub fn test_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}{TEST_SUFFIX}"))
    }

    /// Read the declared page count of `table`.
    ///
    /// Returns `None` (after a warning) when the count file does not exist.
    /// A count file that exists but does not start with a number is an error.
    pub fn read_page_count(&self, table: &str) -> StageResult<Option<u64>> {
        let path = self.count_path(table);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(table, path = %path.display(), "file not found");
                return Ok(None);
            }
            Err(e) => {
                return Err(StageError::PageCount {
                    path,
                    message: e.to_string(),
                })
            }
        };

        parse_page_count(&text)
            .map(Some)
            .ok_or_else(|| StageError::PageCount {
                path,
                message: "no page count found".to_string(),
            })
    }

    /// Files to read in one pass, in order.
    ///
    /// The page count comes from an extracted file, so paths are produced on
    /// demand rather than collected up front.
    pub fn page_files(&self, table: &str, count: u64, include_test: bool) -> PageFiles {
        let test = Some(self.test_path(table)).filter(|path| include_test && path.exists());
        PageFiles {
            load_dir: self.clone(),
            table: table.to_string(),
            count,
            test,
        }
    }
}

/// The files of one table, numbered pages first, then the test file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFiles {
    load_dir: LoadDir,
    table: String,
    count: u64,
    test: Option<PathBuf>,
}

impl PageFiles {
    /// Number of files, the test file included.
    pub fn len(&self) -> u64 {
        self.count.saturating_add(u64::from(self.test.is_some()))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = PageFile> + '_ {
        (0..self.count)
            .map(|index| PageFile::Page {
                index,
                path: self.load_dir.page_path(&self.table, index),
            })
            .chain(self.test.iter().map(|path| PageFile::Test { path: path.clone() }))
    }
}

/// Leading unsigned integer after optional whitespace.
fn parse_page_count(text: &str) -> Option<u64> {
    let trimmed = text.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}
