use std::path::Path;

use pdfsign::{AnchorHit, PdftoppmRasterizer, TesseractCli, locate};

use crate::cli::{ConfigArgs, OutputFormat, SearchArgs};
use crate::shared::{
    ANCHOR_NOT_FOUND, EXIT_ANCHOR_NOT_FOUND, EXIT_FAILURE, check_input, fail, signer_config,
};

pub fn run(
    input: &Path,
    search: &SearchArgs,
    config: &ConfigArgs,
    format: &OutputFormat,
) -> Result<(), i32> {
    check_input(input)?;

    // no text is drawn, so the font is never loaded
    let config = signer_config(config);
    let rasterizer = PdftoppmRasterizer::new(config.rasterizer_binary);
    let ocr = TesseractCli::new(config.ocr_engine_binary);
    let hit = locate(
        input,
        &search.anchor,
        search.dpi,
        &config.ocr_language,
        &rasterizer,
        &ocr,
    )
    .map_err(fail)?;

    let Some(hit) = hit else {
        match format {
            OutputFormat::Text => println!("{ANCHOR_NOT_FOUND}"),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "status": ANCHOR_NOT_FOUND }))
            }
        }
        return Err(EXIT_ANCHOR_NOT_FOUND);
    };

    match format {
        OutputFormat::Text => print!("{}", format_hit(&hit)),
        OutputFormat::Json => println!("{}", hit_to_json(&hit)?),
    }
    Ok(())
}

fn format_hit(hit: &AnchorHit) -> String {
    let (x, y, w, h) = hit.bbox_xywh();
    format!(
        "page: {}\nbbox_px: [{x:.0}, {y:.0}, {w:.0}, {h:.0}]\nimage_px: {}x{}\ndpi: {}\nline: {}\n",
        hit.page_index + 1,
        hit.image_size_px.0,
        hit.image_size_px.1,
        hit.dpi,
        hit.line_text,
    )
}

fn hit_to_json(hit: &AnchorHit) -> Result<serde_json::Value, i32> {
    let mut value = serde_json::to_value(hit).map_err(|e| {
        eprintln!("Error: failed to serialize result: {e}");
        EXIT_FAILURE
    })?;
    value["status"] = serde_json::json!("OK");
    value["page"] = serde_json::json!(hit.page_index + 1);
    Ok(value)
}
