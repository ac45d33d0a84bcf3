//! Command line generator for packed track layout tables.
//!
//! Emits the shift, byte offset and bit rate permutation tables as C array declarations,
//! checks existing headers against a fresh rendering and reports address table discrepancies.

mod config;
mod logging;

use std::convert::TryFrom;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, warn};

use bitlayout_core::emit;
use bitlayout_core::layout::{ByteOffsetCursor, ByteOffsetTable, ShiftTable};
use bitlayout_core::permute::{DofCount, PermutationTable};

use crate::config::{FileConfig, GeneratorConfig};

#[derive(Parser,Debug)]
#[command(name = "bitlayout-gen")]
#[command(about = "Generate packed track addressing and bit rate permutation tables")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Built-in bit rate table (standard, dense)
    #[arg(long, global = true)]
    preset: Option<String>,

    /// Explicit bit rate widths, e.g. 0,3,4,5,32
    #[arg(long, global = true, value_delimiter = ',')]
    bit_rates: Option<Vec<u8>>,

    /// Maximum field width of the address tables
    #[arg(long, global = true)]
    max_width: Option<u8>,

    /// Byte offset cursor policy (zero-based, carried, phased)
    #[arg(long, global = true)]
    byte_offset_cursor: Option<ByteOffsetCursor>,

    /// Channel counts of the permutation tables to emit (1, 2, 3)
    #[arg(long = "dof", global = true)]
    dofs: Vec<u8>,

    /// Prepend a guard on the number of bit rates
    #[arg(long, global = true)]
    version_guard: bool,

    /// Output file (stdout by default)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand,Debug)]
enum Command {
    /// Emit shift_values
    Shift,
    /// Emit byte_offset_values
    ByteOffset,
    /// Emit bit rate permutation tables
    Permutations,
    /// Emit every table
    All,
    /// Compare an existing header with a fresh rendering
    Check {
        /// Header to check
        file: PathBuf,
        /// Tables the header contains
        #[arg(long, value_enum, default_value_t = TableKind::All)]
        table: TableKind,
    },
    /// List address table cells that disagree with direct cursor arithmetic
    Report,
}

#[derive(ValueEnum,Clone,Copy,Debug,PartialEq)]
enum TableKind {
    Shift,
    ByteOffset,
    Permutations,
    All,
}

impl Cli {
    fn overrides(&self) -> Result<FileConfig> {
        let dofs = if self.dofs.is_empty() {
                None
            } else {
                let list: Result<Vec<DofCount>, _> = self.dofs.iter().map(|&d| DofCount::try_from(d)).collect();
                Some(list?)
            };
        Ok(FileConfig {
            preset:             self.preset.clone(),
            bit_rates:          self.bit_rates.clone(),
            name:               None,
            max_width:          self.max_width,
            byte_offset_cursor: self.byte_offset_cursor,
            dofs,
            version_guard:      if self.version_guard { Some(true) } else { None },
        })
    }
}

fn render(kind: TableKind, cfg: &GeneratorConfig) -> Result<String> {
    let mut parts = Vec::new();
    if cfg.version_guard {
        parts.push(emit::render_version_guard(&cfg.bit_rates));
    }
    if kind == TableKind::Shift || kind == TableKind::All {
        parts.push(emit::render_shift_table(&ShiftTable::generate(&cfg.layout()?)));
    }
    if kind == TableKind::ByteOffset || kind == TableKind::All {
        parts.push(emit::render_byte_offset_table(&ByteOffsetTable::generate(&cfg.layout()?)));
    }
    if kind == TableKind::Permutations || kind == TableKind::All {
        let tables: Vec<PermutationTable> = cfg.dofs.iter().map(|&dof| PermutationTable::enumerate(&cfg.bit_rates, dof)).collect();
        parts.push(emit::render_permutation_set(&tables));
    }
    Ok(parts.join("\n"))
}

fn report(cfg: &GeneratorConfig) -> Result<String> {
    let layout = cfg.layout()?;
    let shifts = ShiftTable::generate(&layout).mismatches();
    let offsets = ByteOffsetTable::generate(&layout).mismatches();
    if !offsets.is_empty() {
        warn!(count = offsets.len(), cursor = %layout.byte_offset_cursor(), "byte offset table disagrees with cursor arithmetic");
    }
    let mut ret = format!("shift table: {} mismatches\n", shifts.len());
    for m in shifts.iter() {
        ret.push_str(&format!("  {}\n", m));
    }
    ret.push_str(&format!("byte offset table ({} cursor): {} mismatches\n", layout.byte_offset_cursor(), offsets.len()));
    for m in offsets.iter() {
        ret.push_str(&format!("  {}\n", m));
    }
    Ok(ret)
}

fn write_output(path: Option<&PathBuf>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut out = BufWriter::new(file);
            out.write_all(text.as_bytes())?;
            out.flush()?;
            info!(path = %path.display(), bytes = text.len(), "wrote tables");
        },
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            out.write_all(text.as_bytes())?;
            out.flush()?;
        },
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut file_cfg = match cli.config {
            Some(ref path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
    file_cfg = file_cfg.merge(cli.overrides()?);
    let cfg = GeneratorConfig::resolve(file_cfg)?;
    info!(bit_rates = %cfg.bit_rates, max_width = cfg.max_width, cursor = %cfg.byte_offset_cursor, "configuration");

    let text = match cli.command {
            Command::Shift        => render(TableKind::Shift, &cfg)?,
            Command::ByteOffset   => render(TableKind::ByteOffset, &cfg)?,
            Command::Permutations => render(TableKind::Permutations, &cfg)?,
            Command::All          => render(TableKind::All, &cfg)?,
            Command::Report       => report(&cfg)?,
            Command::Check { ref file, table } => {
                let existing = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
                let fresh = render(table, &cfg)?;
                if let Some((line, expected, actual)) = emit::first_difference(&fresh, &existing) {
                    bail!("{} is out of date at line {}:\n  generated: {}\n  found:     {}", file.display(), line, expected, actual);
                }
                debug!(path = %file.display(), "tables are up to date");
                format!("{}: up to date\n", file.display())
            },
        };
    write_output(cli.output.as_ref(), &text)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level)?;
    run(cli)
}

#[cfg(test)]
mod test {
    use super::*;

    fn resolve(args: &[&str]) -> (Cli, GeneratorConfig) {
        let cli = Cli::try_parse_from(args).unwrap();
        let cfg = GeneratorConfig::resolve(FileConfig::default().merge(cli.overrides().unwrap())).unwrap();
        (cli, cfg)
    }

    #[test]
    fn test_cli_overrides() {
        let (cli, cfg) = resolve(&["bitlayout-gen", "--bit-rates", "0,2,4,32", "--dof", "2", "--byte-offset-cursor", "phased", "permutations"]);
        assert!(matches!(cli.command, Command::Permutations));
        assert_eq!(cfg.bit_rates.widths(), &[0, 2, 4, 32]);
        assert_eq!(cfg.dofs, vec![DofCount::Two]);
        assert_eq!(cfg.byte_offset_cursor, ByteOffsetCursor::Phased);

        let cli = Cli::try_parse_from(&["bitlayout-gen", "--dof", "5", "all"]).unwrap();
        assert!(cli.overrides().is_err());
        assert!(Cli::try_parse_from(&["bitlayout-gen", "--byte-offset-cursor", "up", "all"]).is_err());
    }
    #[test]
    fn test_render_all() {
        let (_, cfg) = resolve(&["bitlayout-gen", "--version-guard", "all"]);
        let text = render(TableKind::All, &cfg).unwrap();
        assert!(text.starts_with("// Generated for bit rate table standard"));
        assert!(text.contains("\nstatic constexpr uint8_t shift_values[8][20][3] =\n"));
        assert!(text.contains("\nstatic constexpr uint8_t byte_offset_values[8][19][2] =\n"));
        assert!(text.contains("\nconstexpr uint8_t k_local_bit_rate_permutations_single_dof[19][1] =\n"));
        assert!(text.contains("\nconstexpr uint8_t k_local_bit_rate_permutations[6859][3] =\n"));
    }
    #[test]
    fn test_report() {
        let (_, cfg) = resolve(&["bitlayout-gen", "--byte-offset-cursor", "phased", "report"]);
        assert_eq!(report(&cfg).unwrap(), "shift table: 0 mismatches\nbyte offset table (phased cursor): 0 mismatches\n");
        let (_, cfg) = resolve(&["bitlayout-gen", "report"]);
        let text = report(&cfg).unwrap();
        assert!(text.contains("byte offset table (zero-based cursor): "));
        assert!(text.contains("  byte offset [phase 7][width 1][component 1]: expected 1, table has 0\n"));
    }
    #[test]
    fn test_wide_bit_rates() {
        let (_, cfg) = resolve(&["bitlayout-gen", "--bit-rates", "0,8,16,24,28,32", "--dof", "2", "permutations"]);
        let text = render(TableKind::Permutations, &cfg).unwrap();
        assert!(text.starts_with("constexpr uint8_t k_local_bit_rate_permutations_no_scale[36][2] =\n"));
        assert!(render(TableKind::Shift, &cfg).is_err());
        assert!(report(&cfg).is_err());
    }
    #[test]
    fn test_repeated_dofs() {
        let (_, cfg) = resolve(&["bitlayout-gen", "--dof", "3", "--dof", "2", "--dof", "3", "permutations"]);
        assert_eq!(cfg.dofs, vec![DofCount::Three, DofCount::Two]);
        let text = render(TableKind::Permutations, &cfg).unwrap();
        assert_eq!(text.matches("k_local_bit_rate_permutations[").count(), 1);
        assert_eq!(text.matches("k_local_bit_rate_permutations_no_scale[").count(), 1);
    }
}
