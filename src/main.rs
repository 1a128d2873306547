// Entrypoint for the CLI application.
// - clap resolves --help/--version and rejects invalid invocations with
//   exit status 2 before anything else runs.
// - run() performs exactly one API call; its outcome decides status 0 or 1.

use std::process::ExitCode;

use clap::Parser;

use kalliope_rest::api::ApiClient;
use kalliope_rest::cli::{self, Cli};
use kalliope_rest::config;
use kalliope_rest::error::Error;

fn main() -> ExitCode {
    // Diagnostics go to stderr so stdout carries only response payloads.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(body) => {
            println!("{body}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, Error> {
    let settings = config::load()?;
    let api = ApiClient::new(&settings)?;
    cli::dispatch(&api, cli.command)
}

/// Write the error and its per-kind guidance to stderr.
fn report(err: &Error) {
    eprintln!("{err}");
    match err {
        Error::Configuration(_) => eprintln!("Check your configuration file"),
        Error::MalformedResponse(_) => {
            eprintln!("JSON decoder error (probably not a Kalliope server)")
        }
        Error::UnsupportedAudioFormat(_) => {
            eprintln!("Only WAV or MP3 files are compatible")
        }
        Error::Transport(_) | Error::AudioFileNotFound(_) => {}
    }
}
