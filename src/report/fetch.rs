// Access to the workbooks, and the memoization of the fetched files.

use std::collections::HashMap;
use std::io::ErrorKind;

use crate::report::*;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum FileType {
    /// The responses of one event.
    Data,
    /// The archive workbook, or the summary table of a CSV archive.
    Archive,
    /// The NPS breakdown table of a CSV archive.
    ArchiveBreakdown,
}

impl FileType {
    pub fn name(&self) -> &'static str {
        match self {
            FileType::Data => "data",
            FileType::Archive => "archive",
            FileType::ArchiveBreakdown => "archive breakdown",
        }
    }
}

/// The parameters of a request. Two requests with the same key return the
/// same file.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct FetchKey {
    pub file_type: FileType,
    pub year: Option<i32>,
    pub event: Option<String>,
    pub unit: Option<String>,
}

impl FetchKey {
    pub fn data(selection: &Selection) -> FetchKey {
        FetchKey {
            file_type: FileType::Data,
            year: Some(selection.year),
            event: Some(selection.event.clone()),
            unit: Some(selection.unit.clone()),
        }
    }

    pub fn archive(file_type: FileType) -> FetchKey {
        FetchKey {
            file_type,
            year: None,
            event: None,
            unit: None,
        }
    }
}

/// The content of a file, with the name it was read from (for messages).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Fetched {
    pub name: String,
    pub bytes: Vec<u8>,
}

pub trait WorkbookSource {
    /// Returns `Ok(None)` when there is no file for this key. Errors are
    /// reserved to files that exist but cannot be read.
    fn fetch(&mut self, key: &FetchKey) -> ReportResult<Option<Fetched>>;
}

/// Reads the files from the local file system.
///
/// Each file type is associated with a path template relative to the root
/// directory, in which `{year}`, `{event}` and `{unit}` are replaced by the
/// values of the key.
pub struct DirectorySource {
    root: PathBuf,
    templates: HashMap<FileType, String>,
}

impl DirectorySource {
    pub fn new(root: &Path) -> DirectorySource {
        DirectorySource {
            root: root.to_path_buf(),
            templates: HashMap::new(),
        }
    }

    pub fn with_template(mut self, file_type: FileType, template: &str) -> DirectorySource {
        self.templates.insert(file_type, template.to_string());
        self
    }

    pub fn from_settings(settings: &ReportSettings) -> DirectorySource {
        let mut source = DirectorySource::new(&settings.root_directory)
            .with_template(FileType::Data, &settings.data_path);
        if let Some(p) = settings.archive_path.as_ref() {
            source = source.with_template(FileType::Archive, p);
        }
        if let Some(p) = settings.archive_breakdown_path.as_ref() {
            source = source.with_template(FileType::ArchiveBreakdown, p);
        }
        source
    }

    pub fn resolve(&self, key: &FetchKey) -> Option<PathBuf> {
        let template = self.templates.get(&key.file_type)?;
        let filled = template
            .replace(
                "{year}",
                &key.year.map(|y| y.to_string()).unwrap_or_default(),
            )
            .replace("{event}", key.event.as_deref().unwrap_or_default())
            .replace("{unit}", key.unit.as_deref().unwrap_or_default());
        Some(self.root.join(filled))
    }
}

impl WorkbookSource for DirectorySource {
    fn fetch(&mut self, key: &FetchKey) -> ReportResult<Option<Fetched>> {
        let path = match self.resolve(key) {
            Some(p) => p,
            None => {
                debug!("DirectorySource: no location for {:?}", key.file_type);
                return Ok(None);
            }
        };
        let name = path.display().to_string();
        info!("Attempting to read {} file {:?}", key.file_type.name(), name);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(Fetched { name, bytes })),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("DirectorySource: file not found: {:?}", name);
                Ok(None)
            }
            Err(e) => Err(e).context(ReadingFileSnafu { path: name }),
        }
    }
}

/// Memoizes the results of another source, keyed by the request parameters.
///
/// Absent files are memoized as well. Errors are not: the next request with
/// the same key reaches the inner source again. Entries stay until the
/// caller removes them.
pub struct CachedSource<S> {
    inner: S,
    entries: HashMap<FetchKey, Option<Fetched>>,
    hits: usize,
}

impl<S: WorkbookSource> CachedSource<S> {
    pub fn new(inner: S) -> CachedSource<S> {
        CachedSource {
            inner,
            entries: HashMap::new(),
            hits: 0,
        }
    }

    /// Forgets one key. Returns true if it was present.
    pub fn invalidate(&mut self, key: &FetchKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }
}

impl<S: WorkbookSource> WorkbookSource for CachedSource<S> {
    fn fetch(&mut self, key: &FetchKey) -> ReportResult<Option<Fetched>> {
        if let Some(cached) = self.entries.get(key) {
            debug!("CachedSource: hit for {:?}", key);
            self.hits += 1;
            return Ok(cached.clone());
        }
        let res = self.inner.fetch(key)?;
        self.entries.insert(key.clone(), res.clone());
        Ok(res)
    }
}
