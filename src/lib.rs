// Library root
// -----------
// This crate exposes a small library surface for the CLI binary.
//
// Module responsibilities:
// - `api`: the blocking HTTP client, one endpoint descriptor per REST
//   operation and the single request executor they all funnel through.
// - `audio`: magic-byte validation of audio files before upload.
// - `cli`: the clap argument grammar and the command dispatcher.
// - `config`: host/port/credentials resolution from the user's
//   configuration file.
// - `error`: the error taxonomy shared by all of the above.
pub mod api;
pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
