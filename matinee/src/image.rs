// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Image content, the shared image table, and step contribution from
//! SVG markers.
//!
//! Decoding proper is a renderer concern; the core reads the bytes,
//! sniffs what it needs (PNG dimensions, SVG step markers), and caches
//! everything once during step discovery. The cache is read-only while
//! pages render.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use hashbrown::HashMap;
use matinee_core::{parse_step_selector, CollectSteps, Step, Value};
use regex::Regex;

use crate::raw::RawImage;
use crate::Error;

/// The image container formats the pipeline accepts.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Svg,
    Ora,
}

impl ImageFormat {
    /// Maps a file extension (lowercased, without dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "svg" => Some(Self::Svg),
            "ora" => Some(Self::Ora),
            _ => None,
        }
    }
}

/// Where an image comes from: a file path or in-memory bytes.
#[derive(Clone, Debug)]
pub enum ImageSource {
    Path(PathBuf),
    Memory {
        data: Arc<Vec<u8>>,
        format: ImageFormat,
    },
}

impl ImageSource {
    pub(crate) fn key(&self) -> ImageKey {
        match self {
            Self::Path(path) => ImageKey::Path(path.clone()),
            Self::Memory { data, .. } => ImageKey::Memory(Arc::as_ptr(data) as usize),
        }
    }
}

impl From<&str> for ImageSource {
    fn from(value: &str) -> Self {
        Self::Path(PathBuf::from(value))
    }
}

impl From<PathBuf> for ImageSource {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&str> for Value<ImageSource> {
    fn from(value: &str) -> Self {
        Self::Const(ImageSource::from(value))
    }
}

impl From<PathBuf> for Value<ImageSource> {
    fn from(value: PathBuf) -> Self {
        Self::Const(ImageSource::from(value))
    }
}

impl CollectSteps for ImageSource {
    fn collect_steps(&self, _out: &mut BTreeSet<Step>) {}
}

/// Identity of a loaded image in the shared table.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) enum ImageKey {
    Path(PathBuf),
    Memory(usize),
}

/// Image content attached to a box.
#[derive(Clone, Debug)]
pub struct ImageContent {
    pub source: Value<ImageSource>,
    /// Let embedded step markers contribute to the slide's steps.
    pub enable_steps: bool,
    /// Shift the image's contributed steps forward.
    pub shift_steps: u32,
}

impl ImageContent {
    pub(crate) fn to_raw(&self, step: &Step, images: &ImageManager) -> Option<RawImage> {
        let source = self.source.get(step)?;
        let loaded = images.get(&source.key())?;
        Some(RawImage {
            format: loaded.format,
            data: loaded.data.clone(),
            width: loaded.width,
            height: loaded.height,
            step: step.unshift(self.shift_steps),
        })
    }

    /// Loads every referenced image into the shared table and adds the
    /// (shifted) steps it contributes.
    pub(crate) fn discover(
        &self,
        images: &mut ImageManager,
        out: &mut BTreeSet<Step>,
    ) -> Result<(), Error> {
        self.source.collect_steps(out);
        let mut sources = Vec::new();
        self.source.for_each(|s| sources.push(s.clone()));
        for source in sources {
            let loaded = images.register(&source)?;
            if self.enable_steps {
                for step in &loaded.named_steps {
                    out.insert(step.shift(self.shift_steps));
                }
            }
        }
        Ok(())
    }
}

impl CollectSteps for ImageContent {
    fn collect_steps(&self, out: &mut BTreeSet<Step>) {
        self.source.collect_steps(out);
    }
}

/// A decoded-enough image: raw bytes plus the metadata the core needs.
#[derive(Debug)]
pub(crate) struct LoadedImage {
    pub(crate) format: ImageFormat,
    pub(crate) data: Arc<Vec<u8>>,
    pub(crate) named_steps: BTreeSet<Step>,
    pub(crate) width: Option<f64>,
    pub(crate) height: Option<f64>,
}

/// The shared image table: populated single-threaded during step
/// discovery, read-only during rendering.
#[derive(Debug, Default)]
pub(crate) struct ImageManager {
    entries: HashMap<ImageKey, Arc<LoadedImage>>,
}

impl ImageManager {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, key: &ImageKey) -> Option<&Arc<LoadedImage>> {
        self.entries.get(key)
    }

    pub(crate) fn register(&mut self, source: &ImageSource) -> Result<Arc<LoadedImage>, Error> {
        let key = source.key();
        if let Some(loaded) = self.entries.get(&key) {
            return Ok(loaded.clone());
        }
        let (data, format, path_text) = match source {
            ImageSource::Path(path) => {
                if !path.is_file() {
                    return Err(Error::ImagePathMissing(path.clone()));
                }
                let ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_lowercase)
                    .unwrap_or_default();
                let format = ImageFormat::from_extension(&ext)
                    .ok_or_else(|| Error::UnsupportedImageFormat(ext.clone()))?;
                let data = std::fs::read(path).map_err(|err| Error::ImageDecode {
                    path: path.display().to_string(),
                    reason: err.to_string(),
                })?;
                (Arc::new(data), format, path.display().to_string())
            }
            ImageSource::Memory { data, format } => {
                (data.clone(), *format, "<memory>".to_owned())
            }
        };

        let (width, height) = match format {
            ImageFormat::Png => {
                let (w, h) = png_dimensions(&data).ok_or_else(|| Error::ImageDecode {
                    path: path_text.clone(),
                    reason: "not a PNG file".to_owned(),
                })?;
                (Some(w), Some(h))
            }
            _ => (None, None),
        };

        let named_steps = if format == ImageFormat::Svg {
            let text = std::str::from_utf8(&data).map_err(|_| Error::ImageDecode {
                path: path_text.clone(),
                reason: "SVG is not valid UTF-8".to_owned(),
            })?;
            svg_named_steps(text)?
        } else {
            BTreeSet::new()
        };

        let loaded = Arc::new(LoadedImage {
            format,
            data,
            named_steps,
            width,
            height,
        });
        self.entries.insert(key, loaded.clone());
        Ok(loaded)
    }
}

/// Reads the IHDR chunk of a PNG byte stream.
fn png_dimensions(data: &[u8]) -> Option<(f64, f64)> {
    const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
    if data.len() < 24 || data[..8] != SIGNATURE || &data[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(data[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(data[20..24].try_into().ok()?);
    Some((width.into(), height.into()))
}

/// Collects named steps from `data-steps="SELECTOR"` markers embedded
/// in an SVG document.
fn svg_named_steps(text: &str) -> Result<BTreeSet<Step>, Error> {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    let marker = MARKER
        .get_or_init(|| Regex::new(r#"data-steps\s*=\s*"([^"]*)""#).expect("valid regex"));
    let mut steps = BTreeSet::new();
    for capture in marker.captures_iter(text) {
        let selector = parse_step_selector(&capture[1])?;
        if let Some(named) = selector.named_steps() {
            steps.extend(named.iter().cloned());
        }
    }
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_dimensions_from_ihdr() {
        let mut data = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
        data.extend_from_slice(&13_u32.to_be_bytes());
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&640_u32.to_be_bytes());
        data.extend_from_slice(&480_u32.to_be_bytes());
        assert_eq!(png_dimensions(&data), Some((640.0, 480.0)));
        assert_eq!(png_dimensions(b"not a png"), None);
    }

    #[test]
    fn svg_markers_contribute_named_steps() {
        let svg = r##"<svg><g data-steps="2+"/><g data-steps="4"/></svg>"##;
        let steps = svg_named_steps(svg).unwrap();
        assert_eq!(steps, [Step::from(2), Step::from(4)].into_iter().collect());
    }

    #[test]
    fn missing_path_is_reported() {
        let mut images = ImageManager::new();
        let source = ImageSource::from("/definitely/not/here.png");
        assert!(matches!(
            images.register(&source),
            Err(Error::ImagePathMissing(_))
        ));
    }

    #[test]
    fn memory_images_register_once() {
        let mut images = ImageManager::new();
        let data = Arc::new(vec![1_u8, 2, 3]);
        let source = ImageSource::Memory {
            data,
            format: ImageFormat::Jpeg,
        };
        images.register(&source).unwrap();
        images.register(&source).unwrap();
        assert_eq!(images.entries.len(), 1);
    }
}
