//! Class and plugin indexing over jar archives

use crate::error::{Error, Result};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zip::ZipArchive;

const CLASS_SUFFIX: &str = ".class";
const MULTI_RELEASE_PREFIX: &str = "META-INF/versions/";
const PLUGIN_DESCRIPTOR_DIR: &str = "META-INF/gradle-plugins/";
const PLUGIN_DESCRIPTOR_SUFFIX: &str = ".properties";

/// Reads the entry table of jar archives
pub struct ArchiveIndexer;

impl ArchiveIndexer {
    /// Fully-qualified names of every class stored in the archive
    pub fn class_names_of(archive: &Path) -> Result<BTreeSet<String>> {
        let entries = Self::entry_names(archive)?;
        let classes: BTreeSet<String> = entries
            .iter()
            .filter_map(|entry| class_name_from_entry(entry))
            .collect();
        debug!("Indexed {} classes in {}", classes.len(), archive.display());
        Ok(classes)
    }

    /// Plugin ids declared through `META-INF/gradle-plugins/<id>.properties`
    pub fn plugin_ids_of(archive: &Path) -> Result<BTreeSet<String>> {
        let entries = Self::entry_names(archive)?;
        Ok(entries
            .iter()
            .filter_map(|entry| {
                entry
                    .strip_prefix(PLUGIN_DESCRIPTOR_DIR)?
                    .strip_suffix(PLUGIN_DESCRIPTOR_SUFFIX)
                    .filter(|id| !id.is_empty() && !id.contains('/'))
                    .map(str::to_string)
            })
            .collect())
    }

    fn entry_names(archive: &Path) -> Result<Vec<String>> {
        let read_error = |reason: String| Error::ArchiveReadError {
            path: archive.to_path_buf(),
            reason,
        };

        let file = File::open(archive).map_err(|e| read_error(e.to_string()))?;
        let zip = ZipArchive::new(file).map_err(|e| read_error(e.to_string()))?;
        Ok(zip.file_names().map(str::to_string).collect())
    }
}

/// Converts a jar entry like `a/b/C.class` into `a.b.C`.
///
/// Module and package descriptors are not classes; multi-release entries map
/// to the same name as their base version.
pub fn class_name_from_entry(entry: &str) -> Option<String> {
    let stem = entry.strip_suffix(CLASS_SUFFIX)?;
    let stem = match stem.strip_prefix(MULTI_RELEASE_PREFIX) {
        Some(versioned) => versioned.split_once('/')?.1,
        None => stem,
    };

    if stem.is_empty() || stem.ends_with("module-info") || stem.ends_with("package-info") {
        return None;
    }
    Some(stem.replace('/', "."))
}

/// Relative path of the class file for a fully-qualified class name
pub fn class_file_path(class_name: &str) -> PathBuf {
    PathBuf::from(format!("{}{}", class_name.replace('.', "/"), CLASS_SUFFIX))
}

/// Lazily built archive → class names index.
///
/// Owned by a single lookup; archives may change between lookups so nothing
/// is shared or persisted. Unreadable archives are logged once and skipped.
#[derive(Debug, Default)]
pub struct ArchiveClassIndex {
    entries: HashMap<PathBuf, BTreeSet<String>>,
    unreadable: HashSet<PathBuf>,
}

impl ArchiveClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Class names of `archive`, or `None` when it cannot be read
    pub fn classes(&mut self, archive: &Path) -> Option<&BTreeSet<String>> {
        if self.unreadable.contains(archive) {
            return None;
        }
        if !self.entries.contains_key(archive) {
            match ArchiveIndexer::class_names_of(archive) {
                Ok(classes) => {
                    self.entries.insert(archive.to_path_buf(), classes);
                }
                Err(e) => {
                    warn!("Skipping archive: {}", e);
                    self.unreadable.insert(archive.to_path_buf());
                    return None;
                }
            }
        }
        self.entries.get(archive)
    }

    pub fn contains(&mut self, archive: &Path, class_name: &str) -> bool {
        self.classes(archive)
            .is_some_and(|classes| classes.contains(class_name))
    }

    pub fn indexed_count(&self) -> usize {
        self.entries.len()
    }

    pub fn unreadable(&self) -> impl Iterator<Item = &Path> {
        self.unreadable.iter().map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use tempfile::TempDir;

    fn write_jar(dir: &Path, name: &str, entries: &[&str]) -> PathBuf {
        test_support::write_jar(&dir.join(name), entries)
    }

    #[test]
    fn test_class_names_of_synthetic_archive() {
        let temp_dir = TempDir::new().unwrap();
        let jar = write_jar(
            temp_dir.path(),
            "a.jar",
            &["META-INF/MANIFEST.MF", "a/B.class", "a/C.class", "a/readme.txt"],
        );

        let classes = ArchiveIndexer::class_names_of(&jar).unwrap();
        assert_eq!(
            classes,
            BTreeSet::from(["a.B".to_string(), "a.C".to_string()])
        );
    }

    #[test]
    fn test_class_name_from_entry() {
        assert_eq!(class_name_from_entry("com/x/Y.class"), Some("com.x.Y".to_string()));
        assert_eq!(
            class_name_from_entry("com/x/Y$Inner.class"),
            Some("com.x.Y$Inner".to_string())
        );
        assert_eq!(
            class_name_from_entry("META-INF/versions/11/com/x/Y.class"),
            Some("com.x.Y".to_string())
        );
        assert_eq!(class_name_from_entry("Top.class"), Some("Top".to_string()));
        // only the suffix is stripped
        assert_eq!(
            class_name_from_entry("com/classy/Foo.class"),
            Some("com.classy.Foo".to_string())
        );
        assert_eq!(class_name_from_entry("module-info.class"), None);
        assert_eq!(class_name_from_entry("com/x/package-info.class"), None);
        assert_eq!(class_name_from_entry("com/x/Y.java"), None);
    }

    #[test]
    fn test_class_file_path() {
        assert_eq!(class_file_path("com.x.Y"), PathBuf::from("com/x/Y.class"));
    }

    #[test]
    fn test_plugin_ids_of() {
        let temp_dir = TempDir::new().unwrap();
        let jar = write_jar(
            temp_dir.path(),
            "plugin.jar",
            &[
                "META-INF/gradle-plugins/com.example.greeting.properties",
                "META-INF/gradle-plugins/kotlin-android.properties",
                "META-INF/gradle-plugins/nested/ignored.properties",
                "com/example/GreetingPlugin.class",
            ],
        );

        let ids = ArchiveIndexer::plugin_ids_of(&jar).unwrap();
        assert_eq!(
            ids,
            BTreeSet::from([
                "com.example.greeting".to_string(),
                "kotlin-android".to_string()
            ])
        );
    }

    #[test]
    fn test_corrupt_archive_is_a_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let bogus = temp_dir.path().join("bogus.jar");
        std::fs::write(&bogus, b"definitely not a zip").unwrap();

        let err = ArchiveIndexer::class_names_of(&bogus).unwrap_err();
        assert!(matches!(err, Error::ArchiveReadError { ref path, .. } if *path == bogus));

        let missing = temp_dir.path().join("missing.jar");
        assert!(matches!(
            ArchiveIndexer::class_names_of(&missing),
            Err(Error::ArchiveReadError { .. })
        ));
    }

    #[test]
    fn test_index_skips_unreadable_archives() {
        let temp_dir = TempDir::new().unwrap();
        let good = write_jar(temp_dir.path(), "good.jar", &["a/B.class"]);
        let bad = temp_dir.path().join("bad.jar");
        std::fs::write(&bad, b"garbage").unwrap();

        let mut index = ArchiveClassIndex::new();
        assert!(!index.contains(&bad, "a.B"));
        assert!(!index.contains(&bad, "a.B"));
        assert!(index.contains(&good, "a.B"));
        assert!(!index.contains(&good, "a.C"));

        assert_eq!(index.indexed_count(), 1);
        assert_eq!(index.unreadable().collect::<Vec<_>>(), vec![bad.as_path()]);
    }
}
