//! Keyed cache of loaded reference diagrams.
//!
//! Charts are re-used across eyes within one session; loading and decoding
//! happen once per path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::{CliError, CliResult};

#[derive(Default)]
pub struct DiagramCache {
    entries: HashMap<PathBuf, RgbaImage>,
}

impl DiagramCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a diagram, decoding it on first use.
    pub fn load(&mut self, path: &Path) -> CliResult<&RgbaImage> {
        if !self.entries.contains_key(path) {
            let img = image::open(path)
                .map_err(|e| -> CliError {
                    format!("Failed to open diagram {}: {}", path.display(), e).into()
                })?
                .to_rgba8();
            tracing::debug!("diagram {} loaded ({}x{})", path.display(), img.width(), img.height());
            self.entries.insert(path.to_path_buf(), img);
        }
        Ok(self
            .entries
            .get(path)
            .expect("entry inserted by the branch above"))
    }
}
