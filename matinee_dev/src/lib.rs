// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic development stand-ins for Matinee's collaborators.
//!
//! [`BasicLayout`] is a tiny flex-ish solver with a monospace text
//! model, and [`PlainBackend`] writes minimal SVG documents. Both are
//! deterministic so integration tests can assert exact geometry. They
//! are stand-ins for the real flex/grid engine and renderer, not
//! replacements.

#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]

mod backend;
mod layout;

pub use backend::PlainBackend;
pub use layout::BasicLayout;
