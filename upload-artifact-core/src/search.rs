//! Glob-based discovery of the files to upload.
//!
//! A search path holds one pattern per line. Lines starting with `!` exclude
//! matches. A pattern without glob characters names a file, or a directory
//! whose files are all included. Globs are matched against absolute paths, so
//! `*` stays within one path segment and `**` crosses segments. Relative
//! patterns are anchored at the working directory, whose own name is never read
//! as a glob. A search path with only exclude lines matches nothing.
//!
//! The root directory of a result is the deepest directory shared by the
//! literal prefixes of all include patterns, or the parent directory when the
//! search names a single file.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use globset::{GlobBuilder, GlobMatcher, GlobSetBuilder};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::contract::{BoxError, FileFinder, SearchResult};

const GLOB_CHARS: &[char] = &['*', '?', '[', '{'];

/// One line of a search path, split where its first glob-bearing component starts.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SearchPattern {
    /// `search_root` followed by `tail`.
    pattern: PathBuf,
    /// Literal prefix of the pattern, where the walk starts.
    search_root: PathBuf,
    /// Components from the first glob-bearing one onwards.
    tail: Vec<String>,
}

impl SearchPattern {
    /// Relative lines are anchored at `working_dir`, which is always taken literally.
    fn new(working_dir: &Path, line: &str) -> Self {
        let line = Path::new(line);
        let mut search_root = if line.is_absolute() {
            PathBuf::new()
        } else {
            normalize(working_dir)
        };
        let mut tail: Vec<String> = Vec::new();
        for component in line.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if tail.pop().is_none() {
                        search_root.pop();
                    }
                }
                Component::Normal(part) => {
                    let part = part.to_string_lossy();
                    if tail.is_empty() && !part.contains(GLOB_CHARS) {
                        search_root.push(&*part);
                    } else {
                        tail.push(part.into_owned());
                    }
                }
                other => search_root.push(other),
            }
        }
        let pattern = tail.iter().fold(search_root.clone(), |path, part| path.join(part));
        Self {
            pattern,
            search_root,
            tail,
        }
    }

    fn literal(&self) -> bool {
        self.tail.is_empty()
    }

    /// Glob source with the literal prefix escaped.
    fn glob(&self) -> String {
        let root = globset::escape(&self.search_root.to_string_lossy());
        if self.literal() {
            return root;
        }
        format!("{}/{}", root.trim_end_matches('/'), self.tail.join("/"))
    }

    fn matcher(&self) -> Result<GlobMatcher, globset::Error> {
        Ok(GlobBuilder::new(&self.glob())
            .literal_separator(true)
            .build()?
            .compile_matcher())
    }
}

/// [`FileFinder`] over the local filesystem.
#[derive(Debug, Clone)]
pub struct GlobFinder {
    working_dir: PathBuf,
}

impl GlobFinder {
    /// Resolves relative patterns against the process working directory.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self::with_working_dir(std::env::current_dir()?))
    }

    pub fn with_working_dir(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// Blocking discovery; [`FileFinder::find_files_to_upload`] runs this off the async runtime.
    pub fn find(&self, search_path: &str) -> Result<SearchResult, BoxError> {
        let mut includes = Vec::new();
        let mut excludes = GlobSetBuilder::new();
        for line in search_path.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match line.strip_prefix('!') {
                Some(exclude) => {
                    let exclude = SearchPattern::new(&self.working_dir, exclude.trim()).glob();
                    for pattern in [format!("{}/**", exclude.trim_end_matches('/')), exclude] {
                        excludes.add(GlobBuilder::new(&pattern).literal_separator(true).build()?);
                    }
                }
                None => includes.push(SearchPattern::new(&self.working_dir, line)),
            }
        }
        if includes.is_empty() {
            debug!(search_path, "Search path has no include patterns");
            return Ok(SearchResult {
                files_to_upload: Vec::new(),
                root_directory: normalize(&self.working_dir),
            });
        }
        let excludes = excludes.build()?;

        let mut seen = HashSet::new();
        let mut files_to_upload = Vec::new();
        for include in &includes {
            for file in matches_for(include)? {
                if excludes.is_match(&file) {
                    debug!(file = %file.display(), "Excluded by search path");
                    continue;
                }
                if seen.insert(file.clone()) {
                    files_to_upload.push(file);
                }
            }
        }

        let single_file = includes.len() == 1
            && includes[0].literal()
            && files_to_upload.len() == 1
            && files_to_upload[0] == includes[0].pattern;
        let root_directory = match (single_file, files_to_upload.first()) {
            (true, Some(file)) => file.parent().map(Path::to_path_buf).unwrap_or_default(),
            _ => common_ancestor(includes.iter().map(|i| i.search_root.as_path()))
                .ok_or("Search paths do not share a common root directory")?,
        };

        warn_case_conflicts(&files_to_upload, &root_directory);
        info!(
            matched = files_to_upload.len(),
            root_directory = %root_directory.display(),
            "Search complete"
        );
        Ok(SearchResult {
            files_to_upload,
            root_directory,
        })
    }
}

#[async_trait]
impl FileFinder for GlobFinder {
    async fn find_files_to_upload(&self, search_path: &str) -> Result<SearchResult, BoxError> {
        let finder = self.clone();
        let search_path = search_path.to_owned();
        tokio::task::spawn_blocking(move || finder.find(&search_path)).await?
    }
}

/// Files under one include pattern, in walk order.
fn matches_for(include: &SearchPattern) -> Result<Vec<PathBuf>, BoxError> {
    if !include.search_root.exists() {
        debug!(search_root = %include.search_root.display(), "Search root does not exist");
        return Ok(Vec::new());
    }
    if include.literal() && include.pattern.is_file() {
        return Ok(vec![include.pattern.clone()]);
    }

    let matcher = if include.literal() {
        None
    } else {
        Some(include.matcher()?)
    };
    let mut files = Vec::new();
    for entry in WalkDir::new(&include.search_root)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry during search");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        // A directory matched by the glob brings in everything beneath it.
        let matched = match &matcher {
            None => true,
            Some(matcher) => entry
                .path()
                .ancestors()
                .take_while(|p| p.starts_with(&include.search_root))
                .any(|p| matcher.is_match(p)),
        };
        if matched {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Lexically resolves `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn common_ancestor<'a>(mut paths: impl Iterator<Item = &'a Path>) -> Option<PathBuf> {
    let mut common: Vec<Component<'a>> = paths.next()?.components().collect();
    for path in paths {
        let shared = common
            .iter()
            .zip(path.components())
            .take_while(|(a, b)| *a == b)
            .count();
        common.truncate(shared);
    }
    if common.is_empty() {
        return None;
    }
    Some(common.iter().collect())
}

fn warn_case_conflicts(files: &[PathBuf], root: &Path) {
    let mut by_lowercase: HashMap<String, &Path> = HashMap::new();
    for file in files {
        let relative = file.strip_prefix(root).unwrap_or(file);
        let key = relative.to_string_lossy().to_lowercase();
        if let Some(existing) = by_lowercase.insert(key, file) {
            warn!(
                first = %existing.display(),
                second = %file.display(),
                "Files differ only by case; a case-insensitive artifact store will overwrite one of them"
            );
        }
    }
}
