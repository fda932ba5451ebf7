//! Directory indexing and class inference.

use crate::common::*;
use std::collections::HashSet;

/// Image file extensions accepted by the indexer. Matching is case-sensitive.
pub const ALLOWLIST_FORMATS: &[&str] = &[".bmp", ".gif", ".jpeg", ".jpg", ".png", ".JPEG"];

/// Where the labels of the indexed files come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Labels {
    /// One class per immediate subdirectory of the root.
    Inferred,
    /// No labels at all.
    None,
    /// One label per file, in alphanumeric path order.
    Explicit(Vec<usize>),
}

impl Labels {
    pub fn is_inferred(&self) -> bool {
        matches!(self, Self::Inferred)
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::Inferred
    }
}

impl Serialize for Labels {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Inferred => serializer.serialize_str("inferred"),
            Self::None => serializer.serialize_none(),
            Self::Explicit(labels) => labels.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Labels {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Name(String),
            List(Vec<usize>),
        }

        let labels = match Option::<Repr>::deserialize(deserializer)? {
            None => Self::None,
            Some(Repr::Name(name)) if name == "inferred" => Self::Inferred,
            Some(Repr::Name(name)) => {
                return Err(D::Error::custom(ConfigurationError::UnknownLabelsValue {
                    name,
                }))
            }
            Some(Repr::List(labels)) => Self::Explicit(labels),
        };
        Ok(labels)
    }
}

/// An image file and its class index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRecord {
    pub path: PathBuf,
    pub label: Option<usize>,
}

/// Options of [index_directory].
#[derive(Debug, Clone)]
pub struct IndexOptions<'a> {
    pub labels: &'a Labels,
    pub formats: &'a [&'a str],
    /// Explicit class order. Only valid with [Labels::Inferred].
    pub class_names: Option<&'a [String]>,
    pub shuffle: bool,
    pub seed: u64,
    pub follow_links: bool,
}

/// The outcome of indexing a directory.
#[derive(Debug, Clone)]
pub struct DirectoryIndex {
    pub records: Vec<ImageRecord>,
    pub class_names: IndexSet<String>,
}

impl DirectoryIndex {
    pub fn num_classes(&self) -> usize {
        self.class_names.len()
    }
}

/// Build an ordered class table, rejecting duplicated names.
pub fn class_table<S>(names: impl IntoIterator<Item = S>) -> Result<IndexSet<String>>
where
    S: AsRef<str>,
{
    let mut table = IndexSet::new();
    for name in names {
        let name = name.as_ref();
        if !table.insert(name.to_owned()) {
            return Err(ConfigurationError::DuplicateClassName {
                name: name.to_owned(),
            }
            .into());
        }
    }
    Ok(table)
}

/// Find image files under `dir` and attach labels to them.
///
/// The records are sorted by path, then permuted with `seed` if `shuffle` is set.
pub fn index_directory(dir: impl AsRef<Path>, options: &IndexOptions<'_>) -> Result<DirectoryIndex> {
    let dir = dir.as_ref();
    let IndexOptions {
        labels,
        formats,
        class_names,
        shuffle,
        seed,
        follow_links,
    } = *options;

    if class_names.is_some() && !labels.is_inferred() {
        return Err(ConfigurationError::ClassNamesWithoutInferredLabels.into());
    }
    if !dir.is_dir() {
        return Err(InputDataError::NotADirectory {
            path: dir.to_owned(),
        }
        .into());
    }

    let (mut records, class_names) = match labels {
        Labels::Inferred => {
            let subdirs = list_subdirs(dir)?;
            let class_names = match class_names {
                Some(given) => {
                    let table = class_table(given)?;
                    let found: HashSet<&str> = subdirs.iter().map(|name| name.as_str()).collect();
                    let matched = table.len() == found.len()
                        && table.iter().all(|name| found.contains(name.as_str()));
                    if !matched {
                        return Err(InputDataError::ClassNameMismatch {
                            given: given.to_vec(),
                            found: subdirs,
                        }
                        .into());
                    }
                    table
                }
                None => subdirs.into_iter().collect(),
            };

            let mut records = vec![];
            for (class_index, class_name) in class_names.iter().enumerate() {
                let files = list_image_files(&dir.join(class_name), formats, follow_links)?;
                records.extend(files.into_iter().map(|path| ImageRecord {
                    path,
                    label: Some(class_index),
                }));
            }
            records.sort_by(|lhs, rhs| lhs.path.cmp(&rhs.path));

            (records, class_names)
        }
        Labels::None => {
            let records = list_image_files(dir, formats, follow_links)?
                .into_iter()
                .map(|path| ImageRecord { path, label: None })
                .collect();
            (records, IndexSet::new())
        }
        Labels::Explicit(labels) => {
            let files = list_image_files(dir, formats, follow_links)?;
            if files.len() != labels.len() {
                return Err(InputDataError::LabelCountMismatch {
                    num_labels: labels.len(),
                    num_files: files.len(),
                }
                .into());
            }

            let records = files
                .into_iter()
                .zip(labels.iter())
                .map(|(path, &label)| ImageRecord {
                    path,
                    label: Some(label),
                })
                .collect();
            let num_classes = labels.iter().max().map(|&max| max + 1).unwrap_or(0);
            let class_names = (0..num_classes).map(|index| index.to_string()).collect();

            (records, class_names)
        }
    };

    if records.is_empty() {
        return Err(InputDataError::EmptyDirectory {
            dir: dir.to_owned(),
            formats: formats.iter().map(|&format| format.to_owned()).collect(),
        }
        .into());
    }

    if shuffle {
        let mut rng = StdRng::seed_from_u64(seed);
        records.shuffle(&mut rng);
    }

    if labels.is_inferred() {
        info!(
            "found {} files belonging to {} classes",
            records.len(),
            class_names.len()
        );
    } else {
        info!("found {} files", records.len());
    }

    Ok(DirectoryIndex {
        records,
        class_names,
    })
}

/// Sorted names of the immediate subdirectories of `dir`.
fn list_subdirs(dir: &Path) -> Result<Vec<String>> {
    let names = read_dir_sorted(dir)?
        .into_iter()
        .filter(|path| path.is_dir())
        .filter_map(|path| Some(path.file_name()?.to_str()?.to_owned()))
        .sorted()
        .collect();
    Ok(names)
}

/// Recursively collect files under `dir` whose names end with one of `formats`.
fn list_image_files(dir: &Path, formats: &[&str], follow_links: bool) -> Result<Vec<PathBuf>> {
    let mut visited = HashSet::new();
    let mut files = vec![];
    walk(dir, formats, follow_links, &mut visited, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(
    dir: &Path,
    formats: &[&str],
    follow_links: bool,
    visited: &mut HashSet<PathBuf>,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    let canonical = fs::canonicalize(dir).map_err(|source| InputDataError::Io {
        path: dir.to_owned(),
        source,
    })?;
    if !visited.insert(canonical) {
        return Ok(());
    }

    for path in read_dir_sorted(dir)? {
        let file_type = fs::symlink_metadata(&path)
            .map_err(|source| InputDataError::Io {
                path: path.clone(),
                source,
            })?
            .file_type();

        // symlinks are resolved for files, but only descended into on request
        let is_dir = if file_type.is_symlink() {
            path.is_dir()
        } else {
            file_type.is_dir()
        };

        if is_dir {
            if !file_type.is_symlink() || follow_links {
                walk(&path, formats, follow_links, visited, files)?;
            }
        } else if has_allowed_extension(&path, formats) && path.is_file() {
            files.push(path);
        }
    }

    Ok(())
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_error = |source| InputDataError::Io {
        path: dir.to_owned(),
        source,
    };
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<io::Result<_>>()
        .map_err(io_error)?;
    paths.sort();
    Ok(paths)
}

fn has_allowed_extension(path: &Path, formats: &[&str]) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| formats.iter().any(|format| name.ends_with(format)))
        .unwrap_or(false)
}
