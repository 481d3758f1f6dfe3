//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use crowdmap_cli::CliError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    if let Err(err) = crowdmap_cli::run() {
        if let CliError::ArgumentParsing(clap_err) = &err {
            clap_err.exit();
        }
        eprintln!("crowdmap: {err}");
        std::process::exit(1);
    }
}
