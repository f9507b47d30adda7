// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pixwand — Core types and error definitions shared across all crates.

pub mod channel_map;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod types;

pub use channel_map::ChannelMap;
pub use color::Color;
pub use config::WandConfig;
pub use error::{PixwandError, Result};
pub use geometry::{Geometry, GeometryFlags};
pub use types::*;
