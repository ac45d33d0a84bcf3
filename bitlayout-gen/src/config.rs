//! Generator configuration.
//!
//! Settings come from an optional TOML file and command line overrides, in that order of increasing priority.
//! Missing settings fall back to the release configuration.
//!
//! ```toml
//! name = "release"
//! bit_rates = [0, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 32]
//! max_width = 19
//! byte_offset_cursor = "carried"
//! dofs = [2, 3]
//! version_guard = true
//! ```
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use bitlayout_core::bitrate::BitRateTable;
use bitlayout_core::error::LayoutResult;
use bitlayout_core::layout::{ByteOffsetCursor, LayoutConfig};
use bitlayout_core::permute::DofCount;

/// Settings as written in a config file. Everything is optional.
#[derive(Debug,Clone,Default,PartialEq,Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Name of a built-in bit rate table.
    pub preset:             Option<String>,
    /// Explicit bit rate widths, takes priority over the preset.
    pub bit_rates:          Option<Vec<u8>>,
    /// Name reported for explicit widths.
    pub name:               Option<String>,
    /// Maximum field width of the address tables.
    pub max_width:          Option<u8>,
    /// Byte offset cursor policy.
    pub byte_offset_cursor: Option<ByteOffsetCursor>,
    /// Permutation tables to emit.
    pub dofs:               Option<Vec<DofCount>>,
    /// Prepend the bit rate table guard.
    pub version_guard:      Option<bool>,
}

impl FileConfig {
    /// Reads and parses a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }
    /// Parses TOML config text.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
    /// Layers `other` on top of this config, values set in `other` win.
    pub fn merge(self, other: FileConfig) -> FileConfig {
        FileConfig {
            preset:             other.preset.or(self.preset),
            bit_rates:          other.bit_rates.or(self.bit_rates),
            name:               other.name.or(self.name),
            max_width:          other.max_width.or(self.max_width),
            byte_offset_cursor: other.byte_offset_cursor.or(self.byte_offset_cursor),
            dofs:               other.dofs.or(self.dofs),
            version_guard:      other.version_guard.or(self.version_guard),
        }
    }
}

/// Fully resolved generator settings.
#[derive(Debug,Clone,PartialEq)]
pub struct GeneratorConfig {
    /// Bit rate table all tables are generated for.
    pub bit_rates:          BitRateTable,
    /// Maximum field width of the address tables, validated by `layout()`.
    pub max_width:          u8,
    /// Byte offset cursor policy.
    pub byte_offset_cursor: ByteOffsetCursor,
    /// Permutation tables to emit, in output order.
    pub dofs:               Vec<DofCount>,
    /// Prepend the bit rate table guard.
    pub version_guard:      bool,
}

impl GeneratorConfig {
    /// Validates the settings and fills in defaults.
    pub fn resolve(cfg: FileConfig) -> Result<Self> {
        let bit_rates = match cfg.bit_rates {
                Some(ref widths) => {
                    let name = cfg.name.as_deref().unwrap_or("custom");
                    BitRateTable::new(name, widths)?
                },
                None => BitRateTable::preset(cfg.preset.as_deref().unwrap_or("standard"))?,
            };
        let max_width = cfg.max_width.unwrap_or_else(|| bit_rates.max_packed_width());
        let mut dofs = cfg.dofs.unwrap_or_else(|| DofCount::ALL.to_vec());
        let mut seen = Vec::with_capacity(dofs.len());
        dofs.retain(|dof| {
                if seen.contains(dof) {
                    false
                } else {
                    seen.push(*dof);
                    true
                }
            });
        Ok(Self {
            bit_rates,
            max_width,
            byte_offset_cursor: cfg.byte_offset_cursor.unwrap_or_default(),
            dofs,
            version_guard: cfg.version_guard.unwrap_or(false),
        })
    }
    /// Returns the address table parameters.
    ///
    /// Only the shift and byte offset tables need the width to fit the read window,
    /// so the check is deferred until one of them is generated.
    pub fn layout(&self) -> LayoutResult<LayoutConfig> {
        LayoutConfig::new(self.max_width, self.byte_offset_cursor)
    }
}
