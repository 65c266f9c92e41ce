// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render pipeline: layout, resolution, overlays, and backend
//! encoding with a fixed-size worker pool.
//!
//! Scenes are materialised on the main thread (counters advance
//! there); everything after that is per-page and embarrassingly
//! parallel. Workers pull pages from a channel, and the first fatal
//! page error wins after all workers have drained.

use std::path::PathBuf;

use matinee_core::Step;

use crate::debug;
use crate::layout::{resolve_page, LayoutEngine, LayoutMap};
use crate::raw::{RawContent, RawItem, RawNode, RawPage};
use crate::resources::Resources;
use crate::Error;

/// The output formats of a render run.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OutputFormat {
    Pdf,
    Svg,
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

/// Options for [`Deck::render`](crate::Deck::render).
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Output file (PDF) or directory (SVG/PNG); `None` returns the
    /// encoded pages instead of writing.
    pub path: Option<PathBuf>,
    pub format: OutputFormat,
    /// PDF compression, 0 (none) to 10 (max); 1 is fast.
    pub compression_level: u8,
    /// Worker count; `None` uses the available parallelism.
    pub n_threads: Option<usize>,
    /// Log per-page progress at info level.
    pub progressbar: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            path: None,
            format: OutputFormat::Pdf,
            compression_level: 1,
            n_threads: None,
            progressbar: false,
        }
    }
}

/// One encoded page.
#[derive(Clone, Debug)]
pub struct PageOutput {
    pub index: usize,
    pub step: Step,
    pub data: Vec<u8>,
}

/// The external page renderer.
pub trait RenderBackend: Sync {
    /// Encodes one laid-out page.
    fn render_page(
        &self,
        page: &RawPage,
        layout: &LayoutMap,
        resources: &Resources,
        format: OutputFormat,
    ) -> Result<Vec<u8>, String>;

    /// Combines per-page PDF streams into one document.
    fn assemble_pdf(&self, pages: &[Vec<u8>], compression_level: u8) -> Result<Vec<u8>, String>;
}

/// Lays out, resolves, overlays, and encodes every page, then writes
/// or returns the result.
pub(crate) fn render_document(
    pages: Vec<RawPage>,
    resources: &Resources,
    engine: &dyn LayoutEngine,
    backend: &dyn RenderBackend,
    options: &RenderOptions,
) -> Result<Option<Vec<PageOutput>>, Error> {
    if options.compression_level > 10 {
        return Err(Error::InvalidCompressionLevel(options.compression_level));
    }
    let page_count = pages.len();
    let n_threads = options
        .n_threads
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
        .max(1);
    tracing::debug!(pages = page_count, threads = n_threads, "rendering deck");

    let mut results: Vec<(usize, Result<PageOutput, Error>)> = if n_threads == 1 || page_count <= 1
    {
        pages
            .into_iter()
            .map(|page| {
                let index = page.index;
                (
                    index,
                    process_page(page, resources, engine, backend, options),
                )
            })
            .collect()
    } else {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<RawPage>();
        for page in pages {
            job_tx.send(page).expect("job channel open");
        }
        drop(job_tx);
        let (result_tx, result_rx) =
            crossbeam_channel::unbounded::<(usize, Result<PageOutput, Error>)>();
        std::thread::scope(|scope| {
            for _ in 0..n_threads {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    while let Ok(page) = job_rx.recv() {
                        let index = page.index;
                        let result = process_page(page, resources, engine, backend, options);
                        if result_tx.send((index, result)).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(result_tx);
        result_rx.iter().collect()
    };

    results.sort_by_key(|(index, _)| *index);
    let mut outputs = Vec::with_capacity(results.len());
    for (_, result) in results {
        outputs.push(result?);
    }

    let Some(path) = &options.path else {
        return Ok(Some(outputs));
    };

    match options.format {
        OutputFormat::Pdf => {
            let streams: Vec<Vec<u8>> = outputs.into_iter().map(|o| o.data).collect();
            let document = backend
                .assemble_pdf(&streams, options.compression_level)
                .map_err(|reason| Error::RenderBackendFailure { page: 0, reason })?;
            std::fs::write(path, document).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
        }
        OutputFormat::Svg | OutputFormat::Png => {
            std::fs::create_dir_all(path).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            for output in outputs {
                let file = path.join(format!(
                    "{}.{}",
                    output.index,
                    options.format.extension()
                ));
                std::fs::write(&file, output.data).map_err(|source| Error::Io {
                    path: file,
                    source,
                })?;
            }
        }
    }
    tracing::info!(pages = page_count, path = %path.display(), "deck written");
    Ok(None)
}

fn process_page(
    mut page: RawPage,
    resources: &Resources,
    engine: &dyn LayoutEngine,
    backend: &dyn RenderBackend,
    options: &RenderOptions,
) -> Result<PageOutput, Error> {
    check_fonts(&page.root, resources)?;
    let layout = engine
        .compute(&page)
        .map_err(|reason| Error::LayoutEngineFailure {
            page: page.index,
            reason,
        })?;
    resolve_page(&mut page, &layout)?;
    debug::insert_debug_frames(&mut page, &layout)?;
    let data = backend
        .render_page(&page, &layout, resources, options.format)
        .map_err(|reason| Error::RenderBackendFailure {
            page: page.index,
            reason,
        })?;
    if options.progressbar {
        tracing::info!(page = page.index, step = %page.step, "page rendered");
    }
    Ok(PageOutput {
        index: page.index,
        step: page.step,
        data,
    })
}

/// Every font family a page references must exist in the resource set
/// by render time.
fn check_fonts(node: &RawNode, resources: &Resources) -> Result<(), Error> {
    if let Some(RawContent::Text(text)) = &node.content {
        for style in &text.styles {
            if !resources.has_font(&style.font) {
                return Err(Error::FontNotFound(style.font.clone()));
            }
        }
    }
    for child in &node.children {
        if let RawItem::Node(inner) = child {
            check_fonts(inner, resources)?;
        }
    }
    Ok(())
}
