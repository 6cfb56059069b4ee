use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pdfsign::pdfsign_core::{DEFAULT_FONT_PATH, DEFAULT_OCR_LANGUAGE, DEFAULT_PDFTOPPM};
use pdfsign::{ANCHOR_DEFAULT, DEFAULT_DPI};

/// Default signature image, relative to the working directory.
pub const DEFAULT_SIGNATURE_PNG: &str = "assets/signature.png";

/// Stamp text and a signature below an anchor phrase found by OCR.
#[derive(Debug, Parser)]
#[command(name = "pdfsign", about, version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign the first page containing the anchor phrase
    Sign {
        /// Path to the source PDF
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Path of the signed PDF to write
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Text inserted below the anchor
        #[arg(long)]
        text: String,

        /// Signature PNG drawn after the text
        #[arg(long, env = "SIGNATURE_PNG", default_value = DEFAULT_SIGNATURE_PNG)]
        signature: PathBuf,

        /// Insert the text only, ignoring --signature
        #[arg(long)]
        no_signature: bool,

        #[command(flatten)]
        search: SearchArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Report where the anchor phrase is, without writing anything
    Locate {
        /// Path to the PDF file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[command(flatten)]
        search: SearchArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// What to look for and how finely to rasterize.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Anchor phrase (case and whitespace insensitive)
    #[arg(long, default_value = ANCHOR_DEFAULT)]
    pub anchor: String,

    /// Rasterization resolution for OCR
    #[arg(long, default_value_t = DEFAULT_DPI, value_parser = clap::value_parser!(u32).range(1..))]
    pub dpi: u32,
}

/// Signer configuration, each also readable from the environment.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Gap between the last text line and the signature, in points
    #[arg(long, env = "SIGNATURE_GAP_PT", default_value_t = 40.0)]
    pub signature_gap: f64,

    /// Vertical signature adjustment in points (positive moves it up)
    #[arg(
        long,
        env = "SIGNATURE_BASELINE_OFFSET_PT",
        default_value_t = 0.0,
        allow_hyphen_values = true
    )]
    pub signature_baseline_offset: f64,

    /// TrueType font for the inserted text (Helvetica if unusable)
    #[arg(long, env = "SIGNER_FONT_PATH", default_value = DEFAULT_FONT_PATH)]
    pub font: PathBuf,

    /// OCR language(s)
    #[arg(long, env = "OCR_LANG", default_value = DEFAULT_OCR_LANGUAGE)]
    pub lang: String,

    /// tesseract executable
    #[arg(long, env = "TESSERACT_CMD")]
    pub tesseract: Option<PathBuf>,

    /// pdftoppm executable
    #[arg(long, env = "PDFTOPPM_CMD", default_value = DEFAULT_PDFTOPPM)]
    pub pdftoppm: PathBuf,
}

/// Output format for results.
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
