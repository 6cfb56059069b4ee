mod cli;
mod locate_cmd;
mod shared;
mod sign_cmd;

use clap::Parser;
use cli::Cli;

fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    shared::init_logging(cli.verbose);

    let result = match cli.command {
        cli::Commands::Sign {
            ref input,
            ref output,
            ref text,
            ref signature,
            no_signature,
            ref search,
            ref config,
            ref format,
        } => sign_cmd::run(sign_cmd::SignArgs {
            input,
            output,
            text,
            signature: (!no_signature).then_some(signature.as_path()),
            search,
            config,
            format,
        }),
        cli::Commands::Locate {
            ref input,
            ref search,
            ref config,
            ref format,
        } => locate_cmd::run(input, search, config, format),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
