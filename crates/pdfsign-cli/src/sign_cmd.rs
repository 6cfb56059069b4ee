use std::path::Path;

use pdfsign::{SignOutcome, SignRequest, Signer};

use crate::cli::{ConfigArgs, OutputFormat, SearchArgs};
use crate::shared::{
    ANCHOR_NOT_FOUND, EXIT_ANCHOR_NOT_FOUND, check_input, fail, print_warnings, signer_config,
    warnings_json,
};

pub struct SignArgs<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub text: &'a str,
    pub signature: Option<&'a Path>,
    pub search: &'a SearchArgs,
    pub config: &'a ConfigArgs,
    pub format: &'a OutputFormat,
}

pub fn run(args: SignArgs<'_>) -> Result<(), i32> {
    check_input(args.input)?;

    let mut request = SignRequest::new(args.input, args.output, args.text)
        .with_anchor(args.search.anchor.as_str())
        .with_dpi(args.search.dpi);
    if let Some(signature) = args.signature {
        request = request.with_signature(signature);
    }

    let signer = Signer::new(signer_config(args.config));
    let outcome = signer.sign(&request).map_err(fail)?;

    match args.format {
        OutputFormat::Text => match &outcome {
            SignOutcome::Signed { warnings, .. } => {
                print_warnings(warnings);
                println!("OK");
            }
            SignOutcome::AnchorNotFound => println!("{ANCHOR_NOT_FOUND}"),
        },
        OutputFormat::Json => {
            let value = match &outcome {
                SignOutcome::Signed {
                    page_index,
                    warnings,
                } => serde_json::json!({
                    "status": "OK",
                    "page": page_index + 1,
                    "output": args.output.display().to_string(),
                    "warnings": warnings_json(warnings),
                }),
                SignOutcome::AnchorNotFound => serde_json::json!({ "status": ANCHOR_NOT_FOUND }),
            };
            println!("{value}");
        }
    }

    if outcome.is_signed() {
        Ok(())
    } else {
        Err(EXIT_ANCHOR_NOT_FOUND)
    }
}
