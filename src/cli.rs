// CLI layer: the argument grammar and the dispatcher mapping each parsed
// command onto its API call. Invalid invocations never get past clap,
// which exits with status 2 on its own.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;

use crate::api::ApiClient;
use crate::error::Result;

/// Kalliope REST API frontend.
#[derive(Parser)]
#[command(name = "kalliope_rest")]
#[command(about = "Kalliope REST API frontend", long_about = None)]
#[command(version, disable_version_flag = true)]
#[command(after_help = "Return values: 0 OK, 1 API error, 2 invalid command")]
pub struct Cli {
    /// Print version information
    #[arg(
        short = 'v',
        long = "version",
        action = ArgAction::Version,
        value_parser = clap::value_parser!(bool)
    )]
    version: Option<bool>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the version of Kalliope
    Kv,
    /// Show information about all the available synapses
    Sps,
    /// Show information about the selected synapse
    Sp {
        /// The synapse name
        #[arg(value_name = "SYNAPSE_NAME")]
        synapse_name: String,
    },
    /// Tell whether Kalliope is waiting for orders
    Listening,
    /// Execute a synapse by different criterias
    Exec {
        #[command(subcommand)]
        target: ExecCommands,
    },
}

#[derive(Subcommand)]
pub enum ExecCommands {
    /// Execute a synapse with the specified name
    ByName {
        /// The synapse name
        #[arg(value_name = "SYNAPSE_NAME")]
        synapse_name: String,

        /// Output the audio
        #[arg(short, long)]
        voice: bool,

        /// Pass parameters to the synapse
        #[arg(short, long, value_name = "PARAMETER_LIST")]
        parameters: Option<String>,
    },
    /// Execute a textual version of the vocal order
    ByOrder {
        /// A textual version of the vocal order
        #[arg(value_name = "ORDER")]
        order: String,

        /// Output the audio
        #[arg(short, long)]
        voice: bool,
    },
    /// Execute a vocal order recorded in an audio file
    ByAudio {
        /// An audio file containing the vocal order
        #[arg(value_name = "FILE_NAME")]
        audio_file: PathBuf,

        /// Output the audio
        #[arg(short, long)]
        voice: bool,
    },
}

/// Map a parsed command onto the matching endpoint operation and return
/// the server's response body.
pub fn dispatch(api: &ApiClient, command: Commands) -> Result<String> {
    match command {
        Commands::Kv => api.version(),
        Commands::Sps => api.synapses(),
        Commands::Sp { synapse_name } => api.synapse(&synapse_name),
        Commands::Listening => api.listening_status(),
        Commands::Exec { target } => match target {
            ExecCommands::ByName {
                synapse_name,
                voice,
                parameters,
            } => {
                if parameters.is_some() {
                    // TODO: forward them once the start-by-id route takes
                    // synapse parameters.
                    warn!("--parameters is accepted but not sent to the server");
                }
                api.execute_by_name(&synapse_name, voice)
            }
            ExecCommands::ByOrder { order, voice } => api.execute_by_order(&order, voice),
            ExecCommands::ByAudio { audio_file, voice } => {
                api.execute_by_audio(&audio_file, voice)
            }
        },
    }
}
