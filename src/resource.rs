//! Resource: one translation document's in-memory tree plus its file-path and
//! format identity.
//!
//! A resource owns a single hierarchical document. Leaves are strings; every
//! other node is a namespace (an ordered mapping). The flattened view joins
//! namespace keys with `.`, so `nav: {home: "Home"}` yields `nav.home`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use tracing::debug;

use crate::format::ResourceFormat;

/// An ordered mapping from key to translation value.
pub type Namespace = IndexMap<String, Translation>;

/// A translation value: either a text leaf or a nested namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum Translation {
    Text(String),
    Namespace(Namespace),
}

/// One translation document.
///
/// Identity within a bundle is the relative path plus the serialization
/// format, both fixed at construction time.
#[derive(Debug, Clone)]
pub struct Resource {
    relpath: PathBuf,
    format: ResourceFormat,
    root: Namespace,

    /// Roots registered ahead of content via [`Resource::add_root`]. These let
    /// file-layout decisions be made before the first key is written.
    extra_roots: BTreeSet<String>,
}

impl Resource {
    /// Create an empty resource with the given relative path and format.
    pub fn empty(relpath: impl Into<PathBuf>, format: ResourceFormat) -> Resource {
        Resource {
            relpath: relpath.into(),
            format,
            root: Namespace::new(),
            extra_roots: BTreeSet::new(),
        }
    }

    /// Create a resource from an already-built document tree.
    pub fn with_root(relpath: impl Into<PathBuf>, format: ResourceFormat, root: Namespace) -> Resource {
        Resource {
            relpath: relpath.into(),
            format,
            root,
            extra_roots: BTreeSet::new(),
        }
    }

    /// Load a resource from a document file.
    ///
    /// The format is inferred from the file extension; an unrecognized
    /// extension is a fatal error. Non-string, non-mapping values in the
    /// document are skipped (explicitly, not an error).
    pub async fn load(relpath: impl Into<PathBuf>, file_path: &Path) -> Result<Resource> {
        let relpath = relpath.into();
        let format = ResourceFormat::from_path(file_path)?;

        let raw = tokio::fs::read_to_string(file_path)
            .await
            .with_context(|| format!("Failed to read resource file {}", file_path.display()))?;
        let root = format
            .decode(&raw)
            .with_context(|| format!("Failed to decode resource file {}", file_path.display()))?;

        debug!("Loaded resource {} ({:?})", relpath.display(), format);
        Ok(Resource {
            relpath,
            format,
            root,
            extra_roots: BTreeSet::new(),
        })
    }

    /// The path of this resource relative to its bundle.
    pub fn relpath(&self) -> &Path {
        &self.relpath
    }

    /// The serialization format of this resource.
    pub fn format(&self) -> ResourceFormat {
        self.format
    }

    /// The document tree root.
    pub fn root(&self) -> &Namespace {
        &self.root
    }

    // ==================== Flattened view ====================

    /// The flattened dotted-key view of this document.
    ///
    /// Keys appear in document order.
    pub fn flattened(&self) -> IndexMap<String, String> {
        let mut flat = IndexMap::new();
        flatten_into(&self.root, None, &mut flat);
        flat
    }

    /// All flattened keys, in document order.
    pub fn flat_keys(&self) -> Vec<String> {
        self.flattened().into_keys().collect()
    }

    /// All flattened key/value pairs, in document order.
    pub fn flat_entries(&self) -> Vec<(String, String)> {
        self.flattened().into_iter().collect()
    }

    // ==================== Roots ====================

    /// The sorted, deduplicated set of this document's top-level keys,
    /// including roots registered via [`Resource::add_root`].
    pub fn roots(&self) -> Vec<String> {
        let mut roots: BTreeSet<String> = self.root.keys().cloned().collect();
        roots.extend(self.extra_roots.iter().cloned());
        roots.into_iter().collect()
    }

    /// Register a top-level namespace before any of its content exists.
    pub fn add_root(&mut self, name: impl Into<String>) {
        self.extra_roots.insert(name.into());
    }

    // ==================== Get & set ====================

    /// Read the text leaf at a dotted key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        let mut current = &self.root;
        let mut segments = key.split('.').peekable();

        while let Some(segment) = segments.next() {
            match current.get(segment)? {
                Translation::Text(text) => {
                    return if segments.peek().is_none() { Some(text) } else { None };
                }
                Translation::Namespace(child) => {
                    if segments.peek().is_none() {
                        return None;
                    }
                    current = child;
                }
            }
        }
        None
    }

    /// Write a text leaf at a dotted key, creating intermediate namespaces as
    /// needed.
    ///
    /// A non-namespace value found at an intermediate segment is overwritten
    /// with a namespace. This is destructive and defined behavior.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let segments: Vec<&str> = key.split('.').collect();
        let (last, intermediate) = match segments.split_last() {
            Some(parts) => parts,
            None => return,
        };

        let mut current = &mut self.root;
        for segment in intermediate {
            let entry = current
                .entry((*segment).to_string())
                .or_insert_with(|| Translation::Namespace(Namespace::new()));
            if !matches!(entry, Translation::Namespace(_)) {
                *entry = Translation::Namespace(Namespace::new());
            }
            current = match entry {
                Translation::Namespace(child) => child,
                Translation::Text(_) => unreachable!("intermediate was just made a namespace"),
            };
        }
        current.insert((*last).to_string(), Translation::Text(value.into()));
    }

    /// Remove the leaf at a dotted key.
    ///
    /// Missing segments are a silent no-op. Now-empty ancestor namespaces are
    /// not pruned.
    pub fn remove(&mut self, key: &str) {
        let segments: Vec<&str> = key.split('.').collect();
        let (last, intermediate) = match segments.split_last() {
            Some(parts) => parts,
            None => return,
        };

        let mut current = &mut self.root;
        for segment in intermediate {
            match current.get_mut(*segment) {
                Some(Translation::Namespace(child)) => current = child,
                _ => return,
            }
        }
        current.shift_remove(*last);
    }

    // ==================== Merge ====================

    /// Copy every flat key from `other` that is absent locally.
    ///
    /// Existing local values are never overwritten (first-write-wins).
    pub fn merge_defaults_from(&mut self, other: &Resource) {
        for (key, value) in other.flat_entries() {
            if self.get(&key).is_none() {
                self.set(&key, value);
            }
        }
    }

    // ==================== Writing ====================

    /// Serialize this document using its own format.
    pub fn encode(&self) -> Result<String> {
        self.format.encode(&self.root)
    }

    /// Write this document to `<bundle_path>/<relpath>`, creating parent
    /// directories as needed.
    pub async fn write(&self, bundle_path: &Path) -> Result<()> {
        let file_path = bundle_path.join(&self.relpath);
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let encoded = self.encode()?;
        tokio::fs::write(&file_path, encoded)
            .await
            .with_context(|| format!("Failed to write resource file {}", file_path.display()))?;

        debug!("Wrote resource {}", file_path.display());
        Ok(())
    }
}

fn flatten_into(namespace: &Namespace, prefix: Option<&str>, out: &mut IndexMap<String, String>) {
    for (key, value) in namespace {
        let full_key = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key.clone(),
        };
        match value {
            Translation::Text(text) => {
                out.insert(full_key, text.clone());
            }
            Translation::Namespace(child) => flatten_into(child, Some(&full_key), out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ==================== Test Helpers ====================

    fn text(value: &str) -> Translation {
        Translation::Text(value.to_string())
    }

    fn sample_resource() -> Resource {
        let mut nav = Namespace::new();
        nav.insert("home".to_string(), text("Home"));
        nav.insert("about".to_string(), text("About"));

        let mut root = Namespace::new();
        root.insert("greeting".to_string(), text("Hello"));
        root.insert("nav".to_string(), Translation::Namespace(nav));

        Resource::with_root("common.yml", ResourceFormat::Yaml, root)
    }

    // ==================== Flattening Tests ====================

    #[test]
    fn test_flattened_joins_keys_with_dots() {
        let resource = sample_resource();
        let flat = resource.flattened();

        assert_eq!(flat.get("greeting").map(String::as_str), Some("Hello"));
        assert_eq!(flat.get("nav.home").map(String::as_str), Some("Home"));
        assert_eq!(flat.get("nav.about").map(String::as_str), Some("About"));
        assert_eq!(flat.len(), 3);
    }

    #[test]
    fn test_flattened_preserves_document_order() {
        let resource = sample_resource();
        let keys = resource.flat_keys();
        assert_eq!(keys, vec!["greeting", "nav.home", "nav.about"]);
    }

    #[test]
    fn test_flattened_empty_resource() {
        let resource = Resource::empty("empty.yml", ResourceFormat::Yaml);
        assert!(resource.flattened().is_empty());
        assert!(resource.flat_keys().is_empty());
    }

    // ==================== Get Tests ====================

    #[test]
    fn test_get_leaf() {
        let resource = sample_resource();
        assert_eq!(resource.get("greeting"), Some("Hello"));
        assert_eq!(resource.get("nav.home"), Some("Home"));
    }

    #[test]
    fn test_get_missing_key() {
        let resource = sample_resource();
        assert_eq!(resource.get("missing"), None);
        assert_eq!(resource.get("nav.missing"), None);
        assert_eq!(resource.get("nav.home.too.deep"), None);
    }

    #[test]
    fn test_get_namespace_is_not_a_leaf() {
        let resource = sample_resource();
        assert_eq!(resource.get("nav"), None);
    }

    // ==================== Set Tests ====================

    #[test]
    fn test_set_creates_intermediate_namespaces() {
        let mut resource = Resource::empty("common.yml", ResourceFormat::Yaml);
        resource.set("a.b.c", "deep");

        assert_eq!(resource.get("a.b.c"), Some("deep"));
        assert_eq!(resource.flat_keys(), vec!["a.b.c"]);
    }

    #[test]
    fn test_set_overwrites_existing_leaf() {
        let mut resource = sample_resource();
        resource.set("greeting", "Hi");
        assert_eq!(resource.get("greeting"), Some("Hi"));
    }

    #[test]
    fn test_set_overwrites_non_namespace_intermediate() {
        let mut resource = sample_resource();

        // "greeting" is a leaf; writing below it replaces the leaf with a namespace.
        resource.set("greeting.formal", "Good day");

        assert_eq!(resource.get("greeting"), None);
        assert_eq!(resource.get("greeting.formal"), Some("Good day"));
    }

    // ==================== Remove Tests ====================

    #[test]
    fn test_remove_leaf() {
        let mut resource = sample_resource();
        resource.remove("nav.home");

        assert_eq!(resource.get("nav.home"), None);
        assert_eq!(resource.get("nav.about"), Some("About"));
    }

    #[test]
    fn test_remove_missing_key_is_silent() {
        let mut resource = sample_resource();
        resource.remove("does.not.exist");
        resource.remove("nav.missing");
        assert_eq!(resource.flat_keys().len(), 3);
    }

    #[test]
    fn test_remove_does_not_prune_empty_namespaces() {
        let mut resource = sample_resource();
        resource.remove("nav.home");
        resource.remove("nav.about");

        // The now-empty "nav" namespace stays behind.
        assert!(resource.root().contains_key("nav"));
        assert_eq!(resource.flat_keys(), vec!["greeting"]);
    }

    // ==================== Root Tests ====================

    #[test]
    fn test_roots_are_sorted_and_deduplicated() {
        let resource = sample_resource();
        assert_eq!(resource.roots(), vec!["greeting", "nav"]);
    }

    #[test]
    fn test_add_root_registers_without_content() {
        let mut resource = Resource::empty("common.yml", ResourceFormat::Yaml);
        resource.add_root("settings");

        assert_eq!(resource.roots(), vec!["settings"]);
        assert!(resource.flattened().is_empty());
    }

    #[test]
    fn test_add_root_merges_with_content_roots() {
        let mut resource = sample_resource();
        resource.add_root("settings");
        resource.add_root("greeting"); // duplicate of a content root

        assert_eq!(resource.roots(), vec!["greeting", "nav", "settings"]);
    }

    // ==================== Merge Tests ====================

    #[test]
    fn test_merge_defaults_copies_absent_keys() {
        let mut target = Resource::empty("common.yml", ResourceFormat::Yaml);
        target.set("greeting", "Hola");

        target.merge_defaults_from(&sample_resource());

        // Existing value untouched, missing keys backfilled.
        assert_eq!(target.get("greeting"), Some("Hola"));
        assert_eq!(target.get("nav.home"), Some("Home"));
        assert_eq!(target.get("nav.about"), Some("About"));
    }

    #[test]
    fn test_merge_defaults_never_overwrites() {
        let mut target = sample_resource();
        let mut other = Resource::empty("common.yml", ResourceFormat::Yaml);
        other.set("greeting", "SHOULD NOT WIN");

        target.merge_defaults_from(&other);
        assert_eq!(target.get("greeting"), Some("Hello"));
    }

    // ==================== Clone Tests ====================

    #[test]
    fn test_clone_is_independent_deep_copy() {
        let original = sample_resource();
        let mut clone = original.clone();

        clone.set("greeting", "changed");
        clone.remove("nav.home");

        assert_eq!(original.get("greeting"), Some("Hello"));
        assert_eq!(original.get("nav.home"), Some("Home"));
        assert_eq!(clone.relpath(), original.relpath());
        assert_eq!(clone.format(), original.format());
    }

    // ==================== Flatten/Unflatten Property ====================

    fn arb_translation() -> impl Strategy<Value = Translation> {
        let leaf = "[ -~]{0,12}".prop_map(Translation::Text);
        leaf.prop_recursive(3, 24, 4, |inner| {
            proptest::collection::vec(("[a-z]{1,6}", inner), 1..4)
                .prop_map(|entries| Translation::Namespace(entries.into_iter().collect()))
        })
    }

    fn arb_namespace() -> impl Strategy<Value = Namespace> {
        proptest::collection::vec(("[a-z]{1,6}", arb_translation()), 0..4)
            .prop_map(|entries| entries.into_iter().collect())
    }

    proptest! {
        /// Rebuilding a document from its flattened view reproduces the
        /// original tree, for any tree with only string leaves.
        #[test]
        fn prop_flatten_then_set_roundtrips(root in arb_namespace()) {
            let original = Resource::with_root("doc.yml", ResourceFormat::Yaml, root);

            let mut rebuilt = Resource::empty("doc.yml", ResourceFormat::Yaml);
            for (key, value) in original.flat_entries() {
                rebuilt.set(&key, value);
            }

            prop_assert_eq!(rebuilt.root(), original.root());
        }
    }
}
