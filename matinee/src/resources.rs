// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The resource registry: fonts, syntax definitions, and code themes.
//!
//! This is a thin adapter over the renderer's actual font database and
//! highlighter; the core only tracks what exists so references can be
//! validated. Resources are loaded at deck construction and read-only
//! afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::Error;

/// The code themes every backend ships with.
const BUILTIN_THEMES: [&str; 7] = [
    "base16-ocean.dark",
    "base16-eighties.dark",
    "base16-mocha.dark",
    "base16-ocean.light",
    "InspiredGitHub",
    "Solarized (dark)",
    "Solarized (light)",
];

const FONT_EXTENSIONS: [&str; 3] = ["ttf", "otf", "ttc"];

/// Fonts, syntaxes, and themes available to a deck.
#[derive(Clone, Debug)]
pub struct Resources {
    families: BTreeSet<String>,
    generic: BTreeMap<String, String>,
    syntaxes: BTreeSet<String>,
    themes: BTreeSet<String>,
}

impl Resources {
    pub fn new() -> Self {
        let generic = ["sans-serif", "serif", "monospace"]
            .into_iter()
            .map(|kind| (kind.to_owned(), kind.to_owned()))
            .collect();
        Self {
            families: BTreeSet::new(),
            generic,
            syntaxes: BTreeSet::new(),
            themes: BUILTIN_THEMES.iter().map(|t| (*t).to_owned()).collect(),
        }
    }

    /// Maps a generic family (`sans-serif`, `serif`, `monospace`) to a
    /// concrete font family.
    pub fn set_generic_family(&mut self, kind: &str, family: &str) {
        self.generic.insert(kind.to_owned(), family.to_owned());
    }

    /// Registers every font file in a directory; the family name is
    /// taken from the file stem. Returns how many were added.
    pub fn load_fonts_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, Error> {
        let before = self.families.len();
        for entry in self.read_dir(dir.as_ref())? {
            if let Some((stem, ext)) = split_name(&entry) {
                if FONT_EXTENSIONS.contains(&ext.as_str()) {
                    self.families.insert(stem);
                }
            }
        }
        Ok(self.families.len() - before)
    }

    /// Registers every syntax definition in a directory.
    pub fn load_code_syntax_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, Error> {
        let before = self.syntaxes.len();
        for entry in self.read_dir(dir.as_ref())? {
            if let Some((stem, ext)) = split_name(&entry) {
                if ext == "sublime-syntax" {
                    self.syntaxes.insert(stem);
                }
            }
        }
        Ok(self.syntaxes.len() - before)
    }

    /// Registers every code theme in a directory.
    pub fn load_code_theme_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, Error> {
        let before = self.themes.len();
        for entry in self.read_dir(dir.as_ref())? {
            if let Some((stem, ext)) = split_name(&entry) {
                if ext == "tmTheme" {
                    self.themes.insert(stem);
                }
            }
        }
        Ok(self.themes.len() - before)
    }

    pub fn syntaxes(&self) -> impl Iterator<Item = &str> {
        self.syntaxes.iter().map(String::as_str)
    }

    pub fn themes(&self) -> impl Iterator<Item = &str> {
        self.themes.iter().map(String::as_str)
    }

    /// Whether a family reference can be satisfied. Generic families
    /// always can; explicit families only once fonts have been loaded.
    /// An empty registry is permissive so decks can be built without
    /// any font directory.
    pub fn has_font(&self, family: &str) -> bool {
        self.generic.contains_key(family)
            || self.families.contains(family)
            || self.families.is_empty()
    }

    pub fn has_theme(&self, name: &str) -> bool {
        self.themes.contains(name)
    }

    fn read_dir(&self, dir: &Path) -> Result<Vec<std::path::PathBuf>, Error> {
        let entries = std::fs::read_dir(dir).map_err(|source| Error::Io {
            path: dir.to_owned(),
            source,
        })?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| Error::Io {
                path: dir.to_owned(),
                source,
            })?;
            paths.push(entry.path());
        }
        Ok(paths)
    }
}

impl Default for Resources {
    fn default() -> Self {
        Self::new()
    }
}

fn split_name(path: &Path) -> Option<(String, String)> {
    let stem = path.file_stem()?.to_str()?.to_owned();
    let ext = path.extension()?.to_str()?.to_owned();
    Some((stem, ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_families_always_resolve() {
        let resources = Resources::new();
        assert!(resources.has_font("sans-serif"));
        assert!(resources.has_font("monospace"));
    }

    #[test]
    fn loaded_fonts_make_the_registry_strict() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Inter.ttf"), b"stub").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"not a font").unwrap();

        let mut resources = Resources::new();
        assert!(resources.has_font("Nope"));
        let added = resources.load_fonts_dir(dir.path()).unwrap();
        assert_eq!(added, 1);
        assert!(resources.has_font("Inter"));
        assert!(!resources.has_font("Nope"));
    }

    #[test]
    fn builtin_themes_are_present() {
        let resources = Resources::new();
        assert!(resources.has_theme("InspiredGitHub"));
        assert_eq!(resources.themes().count(), 7);
    }
}
