//! Interop Records CLI Application
//!
//! Command-line front end for the interop-records library:
//! - Print the layout of each record
//! - Check a peer's declarations (C header, ctypes, Swift...) against ours
//! - Generate C and Python `ctypes` declarations
//! - Decode and encode record memory images

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use interop_records::{
    decode_image_slice, encode_image, layout_by_name, record_layouts, render_c_header,
    render_ctypes, Color, CompareConfig, Event, ImageByteOrder, Point, RecordImage, RecordKind,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

mod config;
mod report;

use config::PeerFile;
use report::RecordCheck;

/// Interop Records - inspect and check the cross-language record layouts
#[derive(Parser, Debug)]
#[command(name = "interop-cli")]
#[command(about = "Inspect and check the Event/Color/Point layout contract", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print record layouts (field offsets, kinds, sizes)
    Layout {
        /// Only this record (Event, Color, Point)
        #[arg(short, long, value_name = "NAME")]
        record: Option<String>,

        #[arg(short, long, value_enum, default_value_t = Format::Txt)]
        format: Format,
    },

    /// Check a peer declaration file against our layouts
    Check {
        /// Peer declaration file (TOML, or JSON by extension)
        #[arg(value_name = "FILE")]
        peer: PathBuf,

        /// Also require field names to match by position
        #[arg(long)]
        match_names: bool,

        #[arg(short, long, value_enum, default_value_t = Format::Txt)]
        format: Format,
    },

    /// Generate declarations for the other side of the boundary
    Header {
        #[arg(short, long, value_enum, default_value_t = Lang::C)]
        lang: Lang,

        /// Include guard for the C header
        #[arg(long, default_value = "INTEROP_RECORDS_H")]
        guard: String,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Decode a record image (or a run of them) and print it as JSON
    Decode {
        #[arg(short, long, value_name = "NAME")]
        record: String,

        /// Image bytes as hex (whitespace and a 0x prefix are allowed)
        #[arg(
            long,
            value_name = "HEX",
            required_unless_present = "input",
            conflicts_with = "input"
        )]
        hex: Option<String>,

        /// File holding the raw image bytes
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = Endian::Native)]
        endian: Endian,
    },

    /// Encode a record given as JSON into its image
    Encode {
        #[arg(short, long, value_name = "NAME")]
        record: String,

        /// Record fields as JSON, using boundary names (e.g. {"type":1,"keyCode":65,...})
        #[arg(long, value_name = "JSON")]
        json: String,

        #[arg(short, long, value_enum, default_value_t = Endian::Native)]
        endian: Endian,

        /// Write raw bytes to this file instead of printing hex
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Txt,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Lang {
    C,
    Ctypes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Endian {
    Native,
    Little,
    Big,
}

impl From<Endian> for ImageByteOrder {
    fn from(endian: Endian) -> Self {
        match endian {
            Endian::Native => ImageByteOrder::Native,
            Endian::Little => ImageByteOrder::Little,
            Endian::Big => ImageByteOrder::Big,
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::debug!("Interop CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using interop-records library v{}", interop_records::VERSION);

    match args.command {
        Command::Layout { record, format } => layout_mode(record.as_deref(), format),
        Command::Check {
            peer,
            match_names,
            format,
        } => check_mode(&peer, match_names, format),
        Command::Header {
            lang,
            guard,
            output,
        } => header_mode(lang, &guard, output.as_deref()),
        Command::Decode {
            record,
            hex,
            input,
            endian,
        } => decode_mode(&record, hex.as_deref(), input.as_deref(), endian.into()),
        Command::Encode {
            record,
            json,
            endian,
            output,
        } => encode_mode(&record, &json, endian.into(), output.as_deref()),
    }
}

/// Print one or all record layouts
fn layout_mode(record: Option<&str>, format: Format) -> Result<()> {
    let layouts = match record {
        Some(name) => vec![layout_by_name(name)?],
        None => record_layouts(),
    };

    match format {
        Format::Txt => print!("{}", report::layouts_txt(&layouts)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&layouts)?),
    }
    Ok(())
}

/// Check every declaration in a peer file; fails if any is incompatible
fn check_mode(peer_path: &Path, match_names: bool, format: Format) -> Result<()> {
    log::info!("Loading peer declarations from: {:?}", peer_path);
    let peer_file = config::load_peer_file(peer_path)?;

    let mut compare = peer_file.compare.clone();
    if match_names {
        compare = compare.with_field_names(true);
    }

    let checks = check_peers(&peer_file, &compare);

    match format {
        Format::Txt => print!("{}", report::checks_txt(&checks)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&checks)?),
    }

    let failed = checks.iter().filter(|c| !c.is_compatible()).count();
    if failed > 0 {
        bail!(
            "{} of {} peer record(s) incompatible with the layout contract",
            failed,
            checks.len()
        );
    }

    log::info!("All {} peer record(s) compatible", checks.len());
    Ok(())
}

fn check_peers(peer_file: &PeerFile, compare: &CompareConfig) -> Vec<RecordCheck> {
    peer_file
        .records
        .iter()
        .map(|peer| {
            let (mismatches, error) = match peer.compare(compare) {
                Ok(mismatches) => (mismatches, None),
                Err(e) => {
                    log::warn!("Cannot check peer record {}: {}", peer.name, e);
                    (Vec::new(), Some(e.to_string()))
                }
            };
            RecordCheck {
                peer: peer.name.clone(),
                record: peer.binds_to().to_string(),
                mismatches,
                error,
            }
        })
        .collect()
}

/// Generate C or ctypes declarations
fn header_mode(lang: Lang, guard: &str, output: Option<&Path>) -> Result<()> {
    let layouts = record_layouts();
    let text = match lang {
        Lang::C => render_c_header(&layouts, guard),
        Lang::Ctypes => render_ctypes(&layouts),
    };

    match output {
        Some(path) => {
            fs::write(path, text)
                .with_context(|| format!("Failed to write declarations: {:?}", path))?;
            log::info!("Declarations written to {:?}", path);
        }
        None => print!("{}", text),
    }
    Ok(())
}

/// Decode image bytes and print the record(s) as JSON
fn decode_mode(
    record: &str,
    hex: Option<&str>,
    input: Option<&Path>,
    order: ImageByteOrder,
) -> Result<()> {
    let kind: RecordKind = record.parse()?;

    let bytes = match (hex, input) {
        (Some(hex), _) => parse_hex(hex)?,
        (None, Some(path)) => {
            fs::read(path).with_context(|| format!("Failed to read image file: {:?}", path))?
        }
        (None, None) => bail!("No image given: use --hex or --input"),
    };
    if bytes.is_empty() {
        bail!("Image is empty");
    }

    log::debug!("Decoding {} byte(s) as {} ({:?})", bytes.len(), kind, order);

    let json = match kind {
        RecordKind::Event => decode_as::<Event>(&bytes, order)?,
        RecordKind::Color => decode_as::<Color>(&bytes, order)?,
        RecordKind::Point => decode_as::<Point>(&bytes, order)?,
    };
    println!("{}", json);
    Ok(())
}

fn decode_as<R: RecordImage + Serialize>(bytes: &[u8], order: ImageByteOrder) -> Result<String> {
    let records: Vec<R> = decode_image_slice(bytes, order)?;
    let json = match records.as_slice() {
        [single] => serde_json::to_string_pretty(single)?,
        many => serde_json::to_string_pretty(many)?,
    };
    Ok(json)
}

/// Encode a JSON record into its image
fn encode_mode(
    record: &str,
    json: &str,
    order: ImageByteOrder,
    output: Option<&Path>,
) -> Result<()> {
    let kind: RecordKind = record.parse()?;

    let bytes = match kind {
        RecordKind::Event => encode_as::<Event>(json, order)?,
        RecordKind::Color => encode_as::<Color>(json, order)?,
        RecordKind::Point => encode_as::<Point>(json, order)?,
    };

    match output {
        Some(path) => {
            fs::write(path, &bytes)
                .with_context(|| format!("Failed to write image: {:?}", path))?;
            log::info!("{} byte image written to {:?}", bytes.len(), path);
        }
        None => println!("{}", to_hex(&bytes)),
    }
    Ok(())
}

fn encode_as<R: RecordImage + DeserializeOwned>(
    json: &str,
    order: ImageByteOrder,
) -> Result<Vec<u8>> {
    let record: R = serde_json::from_str(json)
        .with_context(|| format!("Invalid {} JSON: {}", R::NAME, json))?;
    Ok(encode_image(&record, order)?)
}

/// Parse hex bytes, ignoring whitespace and an optional 0x prefix
fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: Vec<u8> = body.bytes().filter(|b| !b.is_ascii_whitespace()).collect();

    if digits.len() % 2 != 0 {
        bail!("Hex image has an odd number of digits ({})", digits.len());
    }

    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).context("Hex image is not ASCII")?;
            u8::from_str_radix(pair, 16).with_context(|| format!("Invalid hex byte: {:?}", pair))
        })
        .collect()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use interop_records::{PeerField, PeerRecord, ScalarKind};

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let args = Args::try_parse_from([
            "interop-cli",
            "-vv",
            "decode",
            "--record",
            "event",
            "--hex",
            "01000000",
            "-e",
            "little",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);
        assert!(matches!(
            args.command,
            Command::Decode { endian: Endian::Little, .. }
        ));

        // --hex and --input are mutually exclusive, and one is required
        assert!(Args::try_parse_from(["interop-cli", "decode", "-r", "point"]).is_err());
        assert!(Args::try_parse_from([
            "interop-cli",
            "decode",
            "-r",
            "point",
            "--hex",
            "00",
            "-i",
            "img.bin",
        ])
        .is_err());
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("0x01 02\n0a FF").unwrap(), vec![1, 2, 10, 255]);
        assert!(parse_hex("123").is_err());
        assert!(parse_hex("zz").is_err());
        assert_eq!(to_hex(&[1, 0xab]), "01 ab");
    }

    #[test]
    fn test_encode_decode_json() {
        let json = r#"{"type":1,"keyCode":65,"mouseX":0,"mouseY":0,"mouseButton":0,"isPressed":1}"#;
        let bytes = encode_as::<Event>(json, ImageByteOrder::Little).unwrap();
        assert_eq!(to_hex(&bytes[4..8]), "41 00 00 00");

        let back = decode_as::<Event>(&bytes, ImageByteOrder::Little).unwrap();
        let value: serde_json::Value = serde_json::from_str(&back).unwrap();
        assert_eq!(value["keyCode"], 65);

        assert!(encode_as::<Point>(r#"{"x": 1.0}"#, ImageByteOrder::Native).is_err());
    }

    #[test]
    fn test_decode_run_prints_array() {
        let bytes = [0u8; 16];
        let json = decode_as::<Point>(&bytes, ImageByteOrder::Native).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_check_peers_reports_each_record() {
        let peer_file = PeerFile {
            compare: CompareConfig::default(),
            records: vec![
                PeerRecord {
                    name: "Point".to_string(),
                    record: None,
                    size: None,
                    fields: vec![
                        PeerField { name: "x".to_string(), kind: ScalarKind::F32, offset: None },
                        PeerField { name: "y".to_string(), kind: ScalarKind::F32, offset: None },
                    ],
                },
                PeerRecord {
                    name: "Rect".to_string(),
                    record: None,
                    size: None,
                    fields: vec![PeerField {
                        name: "w".to_string(),
                        kind: ScalarKind::F32,
                        offset: None,
                    }],
                },
            ],
        };

        let checks = check_peers(&peer_file, &peer_file.compare);
        assert!(checks[0].is_compatible());
        assert!(!checks[1].is_compatible());
        assert_eq!(checks[1].error.as_deref(), Some("Unknown record: Rect"));
    }

    #[test]
    fn test_shipped_peer_files() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("peers");

        let c_header = config::load_peer_file(&dir.join("c_header.toml")).unwrap();
        let checks = check_peers(&c_header, &c_header.compare);
        assert_eq!(checks.len(), 3);
        assert!(checks.iter().all(RecordCheck::is_compatible));

        let python_host = config::load_peer_file(&dir.join("python_host.toml")).unwrap();
        let checks = check_peers(&python_host, &python_host.compare);
        assert!(!checks[0].is_compatible());
        assert_eq!(checks[0].mismatches.len(), 3);
        assert!(checks[1].is_compatible());
        assert!(checks[2].is_compatible());
    }
}
