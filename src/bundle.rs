//! Bundle: the ordered collection of resources holding all translations for
//! one language.
//!
//! A bundle routes key-level reads and writes to the resource owning the
//! key's root (its first dotted segment) and exposes a flattened
//! whole-bundle view. Duplicate flattened keys across resources are not an
//! error; the last resource in iteration order wins in the aggregate view.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::format::ResourceFormat;
use crate::language::Language;
use crate::patch::Patch;
use crate::resource::Resource;
use crate::translator::{TranslateOptions, TranslationProvider, Translator};

/// All translation resources for one language, rooted at one storage path.
#[derive(Debug, Clone)]
pub struct Bundle {
    language: Language,
    path: PathBuf,
    default_format: ResourceFormat,
    resources: Vec<Resource>,
}

impl Bundle {
    /// Create an empty bundle with the YAML default format.
    pub fn new(language: Language, path: impl Into<PathBuf>) -> Bundle {
        Bundle::with_default_format(language, path, ResourceFormat::Yaml)
    }

    /// Create an empty bundle with an explicit default format for
    /// auto-created resources.
    pub fn with_default_format(
        language: Language,
        path: impl Into<PathBuf>,
        default_format: ResourceFormat,
    ) -> Bundle {
        Bundle {
            language,
            path: path.into(),
            default_format,
            resources: Vec::new(),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn default_format(&self) -> ResourceFormat {
        self.default_format
    }

    // ==================== Loading ====================

    /// Load a single bundle from a directory of resource files.
    ///
    /// Files with the known extensions (`.yml`, `.yaml`, `.json`) are loaded
    /// recursively; traversal is sorted so resource order is deterministic.
    pub async fn load(
        language: Language,
        bundle_path: impl Into<PathBuf>,
        default_format: ResourceFormat,
    ) -> Result<Bundle> {
        let bundle_path = bundle_path.into();
        let mut bundle = Bundle::with_default_format(language, &bundle_path, default_format);

        let mut file_paths = Vec::new();
        for entry in walkdir::WalkDir::new(&bundle_path).sort_by_file_name() {
            let entry = entry
                .with_context(|| format!("Failed to scan bundle directory {}", bundle_path.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if ResourceFormat::from_path(entry.path()).is_ok() {
                file_paths.push(entry.path().to_path_buf());
            }
        }

        for file_path in file_paths {
            let relpath = file_path
                .strip_prefix(&bundle_path)
                .with_context(|| format!("Resource path {} escapes its bundle", file_path.display()))?
                .to_path_buf();
            let resource = Resource::load(relpath, &file_path).await?;
            bundle.add_resource(resource);
        }

        debug!(
            "Loaded bundle {} with {} resources from {}",
            language,
            bundle.resources.len(),
            bundle_path.display()
        );
        Ok(bundle)
    }

    /// Load every bundle under a root directory.
    ///
    /// Subdirectory names are taken as language codes; a subdirectory whose
    /// name is not a known code is skipped with a warning. Non-directories
    /// are ignored.
    pub async fn load_many(root: &Path, default_format: ResourceFormat) -> Result<Vec<Bundle>> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(root)
            .await
            .with_context(|| format!("Failed to read locales directory {}", root.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            if !file_type.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();

        let mut bundles = Vec::new();
        for name in names {
            let Ok(language) = Language::from_code(&name) else {
                warn!("Skipping unknown language code: {}", name);
                continue;
            };
            let bundle = Bundle::load(language, root.join(&name), default_format).await?;
            bundles.push(bundle);
        }
        Ok(bundles)
    }

    // ==================== Resources ====================

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// The resource at a bundle-relative path, if any.
    pub fn resource_at(&self, relpath: &Path) -> Option<&Resource> {
        self.resources.iter().find(|r| r.relpath() == relpath)
    }

    pub fn resource_at_mut(&mut self, relpath: &Path) -> Option<&mut Resource> {
        self.resources.iter_mut().find(|r| r.relpath() == relpath)
    }

    pub fn add_resource(&mut self, resource: Resource) -> &mut Resource {
        self.resources.push(resource);
        let index = self.resources.len() - 1;
        &mut self.resources[index]
    }

    /// Add an empty resource.
    ///
    /// A bare name (no dot) gets the extension of the chosen format: the one
    /// given, else the format of the bundle's first resource, else the
    /// configured default. A name containing a dot is used as a relative path
    /// verbatim.
    pub fn add_empty_resource(
        &mut self,
        name_or_relpath: &str,
        format: Option<ResourceFormat>,
    ) -> &mut Resource {
        let format = format
            .or_else(|| self.resources.first().map(Resource::format))
            .unwrap_or(self.default_format);

        let relpath = if name_or_relpath.contains('.') {
            PathBuf::from(name_or_relpath)
        } else {
            PathBuf::from(format!("{}.{}", name_or_relpath, format.extension()))
        };
        self.add_resource(Resource::empty(relpath, format))
    }

    // ==================== Accessors ====================

    /// The aggregate flattened view across all resources.
    ///
    /// Later resources override earlier ones on key collision.
    pub fn flattened(&self) -> IndexMap<String, String> {
        let mut flat = IndexMap::new();
        for resource in &self.resources {
            flat.extend(resource.flattened());
        }
        flat
    }

    pub fn flat_keys(&self) -> Vec<String> {
        self.flattened().into_keys().collect()
    }

    pub fn flat_entries(&self) -> Vec<(String, String)> {
        self.flattened().into_iter().collect()
    }

    /// Read a key from the aggregate view.
    pub fn get(&self, key: &str) -> Option<String> {
        self.flattened().get(key).cloned()
    }

    // ==================== Get & set ====================

    /// Write a leaf, routing by the key's root segment.
    ///
    /// If no resource claims the root, a new resource named after the root is
    /// auto-created. This is how a brand-new top-level namespace acquires its
    /// own file.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let root = key.split('.').next().unwrap_or(key);
        let index = self
            .resources
            .iter()
            .position(|resource| resource.roots().iter().any(|r| r == root));

        let resource = match index {
            Some(index) => &mut self.resources[index],
            None => self.add_empty_resource(root, None),
        };
        resource.set(key, value);
    }

    /// Remove a key from every resource holding it.
    ///
    /// The remove is broadcast; resources lacking the key ignore it.
    pub fn remove(&mut self, key: &str) {
        for resource in &mut self.resources {
            resource.remove(key);
        }
    }

    // ==================== Merge ====================

    /// Backfill structure and content from another bundle.
    ///
    /// For every resource in `other`, the same-relpath local resource is
    /// found or created, then merged first-write-wins at the resource level.
    pub fn merge_defaults_from(&mut self, other: &Bundle) {
        for source in other.resources() {
            let index = self
                .resources
                .iter()
                .position(|r| r.relpath() == source.relpath());
            let target = match index {
                Some(index) => &mut self.resources[index],
                None => self.add_resource(Resource::empty(source.relpath(), source.format())),
            };
            target.merge_defaults_from(source);
        }
    }

    // ==================== Diffing & translating ====================

    /// Synchronize this bundle from an authoritative source bundle.
    ///
    /// Computes the incremental key set (source keys absent here, unless
    /// `incremental` is off, in which case every current key is reselected),
    /// translates it through `provider`, appends a `Remove` for every stale
    /// key, and applies the resulting patch to a clone of this bundle. The
    /// clone is returned; this bundle is never touched.
    pub async fn translate_from<P: TranslationProvider>(
        &self,
        source: &Bundle,
        provider: &P,
        mut options: TranslateFromOptions<'_>,
    ) -> Result<Bundle> {
        let their_keys = source.flat_keys();
        let our_keys = self.flat_keys();

        let ours: HashSet<&str> = our_keys.iter().map(String::as_str).collect();
        let theirs: HashSet<&str> = their_keys.iter().map(String::as_str).collect();

        let mut keys: Vec<String> = if options.incremental {
            their_keys
                .iter()
                .filter(|key| !ours.contains(key.as_str()))
                .cloned()
                .collect()
        } else {
            our_keys.clone()
        };
        if let Some(filter) = &options.filter {
            keys.retain(|key| filter.is_match(key));
        }

        info!(
            "Translating {} keys from {} to {}",
            keys.len(),
            source.language(),
            self.language()
        );

        let translator = Translator::new(source, self, provider);
        let mut patch = translator.translate(&keys, &options.translate).await?;

        for key in our_keys.iter().filter(|key| !theirs.contains(key.as_str())) {
            patch.remove(key.clone());
        }

        let mut clone = self.clone();
        if let Some(hook) = options.on_pre_apply.as_mut() {
            hook(&mut clone, &mut patch);
        }
        patch.apply(&mut clone, Some(source));
        if let Some(hook) = options.on_post_apply.as_mut() {
            hook(&mut clone, &patch);
        }
        Ok(clone)
    }

    // ==================== Writing ====================

    /// Write every resource to storage.
    ///
    /// Writes target distinct file paths, so they run concurrently and
    /// unordered.
    pub async fn write(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.path)
            .await
            .with_context(|| format!("Failed to create bundle directory {}", self.path.display()))?;

        let writes = self.resources.iter().map(|resource| resource.write(&self.path));
        futures::future::try_join_all(writes).await?;
        Ok(())
    }

    // ==================== Dump ====================

    /// Write a human-readable listing of every resource and its flat entries.
    pub fn dump(&self, out: &mut impl io::Write) -> io::Result<()> {
        for resource in &self.resources {
            writeln!(out, "{}", resource.relpath().display())?;
            for (key, value) in resource.flat_entries() {
                writeln!(out, "  {} = {:?}", key, value)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

/// Options for [`Bundle::translate_from`].
pub struct TranslateFromOptions<'a> {
    /// Translate only keys present in the source but absent here (default).
    /// When off, every key currently in this bundle is reselected.
    pub incremental: bool,

    /// Optional restriction of the key set.
    pub filter: Option<regex::Regex>,

    /// Options forwarded to the translator.
    pub translate: TranslateOptions,

    /// Fires after the patch is computed, before it is applied to the clone.
    pub on_pre_apply: Option<Box<dyn FnMut(&mut Bundle, &mut Patch) + 'a>>,

    /// Fires after the patch has been applied to the clone.
    pub on_post_apply: Option<Box<dyn FnMut(&mut Bundle, &Patch) + 'a>>,
}

impl Default for TranslateFromOptions<'_> {
    fn default() -> Self {
        TranslateFromOptions {
            incremental: true,
            filter: None,
            translate: TranslateOptions::default(),
            on_pre_apply: None,
            on_post_apply: None,
        }
    }
}
