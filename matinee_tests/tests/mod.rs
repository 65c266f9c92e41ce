// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integration tests driving the full pipeline with the deterministic
//! dev layout engine and backend.

mod emission;
mod scenarios;
mod util;
