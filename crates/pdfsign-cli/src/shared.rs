use std::path::Path;

use pdfsign::pdfsign_core::default_tesseract_binary;
use pdfsign::{SignError, SignWarning, SignerConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::ConfigArgs;

/// Exit code for fatal errors.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code when no page contains the anchor.
pub const EXIT_ANCHOR_NOT_FOUND: i32 = 2;

/// Printed on stdout when no page contains the anchor.
pub const ANCHOR_NOT_FOUND: &str = "ANCHOR_NOT_FOUND";

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins over `-v`; without either only warnings are shown.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Fail with a readable message when `file` does not exist.
pub fn check_input(file: &Path) -> Result<(), i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(EXIT_FAILURE);
    }
    Ok(())
}

/// Build the signer configuration from flags and environment.
pub fn signer_config(args: &ConfigArgs) -> SignerConfig {
    let config = SignerConfig {
        signature_gap_pt: args.signature_gap,
        signature_baseline_offset_pt: args.signature_baseline_offset,
        font_path: Some(args.font.clone()),
        ocr_language: args.lang.clone(),
        ocr_engine_binary: args
            .tesseract
            .clone()
            .unwrap_or_else(default_tesseract_binary),
        rasterizer_binary: args.pdftoppm.clone(),
    };
    debug!(?config, "resolved configuration");
    config
}

/// Report a fatal error and map it to the process exit code.
pub fn fail(err: SignError) -> i32 {
    eprintln!("Error: {err}");
    EXIT_FAILURE
}

pub fn print_warnings(warnings: &[SignWarning]) {
    for warning in warnings {
        eprintln!("Warning: {warning}");
    }
}

pub fn warnings_json(warnings: &[SignWarning]) -> serde_json::Value {
    warnings
        .iter()
        .map(|w| {
            serde_json::json!({
                "code": w.code.as_str(),
                "description": w.description,
            })
        })
        .collect()
}
