use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Something the builder can read a document's text from.
///
/// Reading is a bounded synchronous call that either yields all lines or fails.
pub trait DocumentSource {
    /// Label used for display and in warnings.
    fn name(&self) -> String;
    fn read_lines(&self) -> io::Result<Vec<String>>;
}

impl<S: DocumentSource + ?Sized> DocumentSource for &S {
    fn name(&self) -> String { (**self).name() }
    fn read_lines(&self) -> io::Result<Vec<String>> { (**self).read_lines() }
}

/// A newline-delimited text file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path { &self.path }
}

impl DocumentSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn read_lines(&self) -> io::Result<Vec<String>> {
        let reader = BufReader::new(File::open(&self.path)?);
        reader.lines().collect()
    }
}

/// In-memory document text.
#[derive(Debug, Clone)]
pub struct TextSource {
    name: String,
    text: String,
}

impl TextSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { name: name.into(), text: text.into() }
    }
}

impl DocumentSource for TextSource {
    fn name(&self) -> String { self.name.clone() }

    fn read_lines(&self) -> io::Result<Vec<String>> {
        Ok(self.text.lines().map(str::to_string).collect())
    }
}
