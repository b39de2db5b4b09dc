//! Patch: an ordered, inspectable list of pending edits describing a
//! transition between two bundle states.
//!
//! Modifications are applied in authorship order, so application is not
//! commutative in general: later writes to the same key win.

use std::io;

use crate::bundle::Bundle;
use crate::language::Language;
use crate::resource::Resource;

/// One pending edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Modification {
    /// Add or replace the leaf at `key`.
    Set { key: String, value: String },

    /// Remove the leaf at `key` from every resource holding it.
    Remove { key: String },

    /// Diagnostic record of a key awaiting translation. Has no effect on
    /// application.
    Translate {
        key: String,
        from_language: Language,
        from_value: String,
    },
}

/// An ordered edit record.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    modifications: Vec<Modification>,
}

impl Patch {
    pub fn new() -> Patch {
        Patch::default()
    }

    /// The recorded modifications, in authorship order.
    pub fn modifications(&self) -> &[Modification] {
        &self.modifications
    }

    /// True iff no modifications were recorded.
    pub fn is_empty(&self) -> bool {
        self.modifications.is_empty()
    }

    // ==================== Building ====================

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.modifications.push(Modification::Set {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn remove(&mut self, key: impl Into<String>) {
        self.modifications.push(Modification::Remove { key: key.into() });
    }

    pub fn translate(
        &mut self,
        key: impl Into<String>,
        from_language: Language,
        from_value: impl Into<String>,
    ) {
        self.modifications.push(Modification::Translate {
            key: key.into(),
            from_language,
            from_value: from_value.into(),
        });
    }

    // ==================== Application ====================

    /// Apply the recorded modifications to `target`, in authorship order.
    ///
    /// When a `source` bundle is supplied, each `Set` first mirrors the
    /// source's file layout: the target resource at the same relative path as
    /// the source resource owning the key's root is found or created, and the
    /// root is registered on it before the value is written. Newly introduced
    /// namespaces therefore land in the same file as in the source instead of
    /// collapsing into one catch-all file.
    pub fn apply(&self, target: &mut Bundle, source: Option<&Bundle>) {
        for modification in &self.modifications {
            match modification {
                Modification::Set { key, value } => {
                    if let Some(source) = source {
                        mirror_layout(target, source, key);
                    }
                    target.set(key, value.clone());
                }
                Modification::Remove { key } => {
                    target.remove(key);
                }
                Modification::Translate { .. } => {}
            }
        }
    }

    // ==================== Dump ====================

    /// Write a human-readable listing of the recorded modifications.
    pub fn dump(&self, out: &mut impl io::Write) -> io::Result<()> {
        for modification in &self.modifications {
            match modification {
                Modification::Set { key, value } => {
                    writeln!(out, "+ {} = {:?}", key, value)?;
                }
                Modification::Remove { key } => {
                    writeln!(out, "- {}", key)?;
                }
                Modification::Translate {
                    key,
                    from_language,
                    from_value,
                } => {
                    writeln!(out, "~ {} = {:?} (from {})", key, from_value, from_language)?;
                }
            }
        }
        Ok(())
    }
}

/// Ensure the target bundle routes `key` to a resource at the same relative
/// path as the source resource owning the key's root.
fn mirror_layout(target: &mut Bundle, source: &Bundle, key: &str) {
    let Some(root) = key.split('.').next() else {
        return;
    };
    let Some(source_resource) = source
        .resources()
        .iter()
        .find(|resource| resource.roots().iter().any(|r| r == root))
    else {
        return;
    };

    let relpath = source_resource.relpath().to_path_buf();
    if target.resource_at(&relpath).is_none() {
        target.add_resource(Resource::empty(&relpath, source_resource.format()));
    }
    if let Some(resource) = target.resource_at_mut(&relpath) {
        resource.add_root(root);
    }
}
