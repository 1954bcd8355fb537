use clap::Parser;
use log::info;

mod args;
mod svy;

use crate::args::Args;
use crate::svy::RunSettings;

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    info!("survnorm: schema {} responses {}", args.schema, args.responses);

    let settings = RunSettings {
        schema_path: args.schema,
        responses_path: args.responses,
        filter_path: args.filter,
        out_path: args.out,
        reference_path: args.reference,
        redact_pii: args.redact_pii,
    };

    if let Err(e) = svy::run_dataset(&settings) {
        eprintln!("An error occured {}", e);
        std::process::exit(1);
    }
}
