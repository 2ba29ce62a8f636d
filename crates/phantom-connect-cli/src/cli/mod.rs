/*
[INPUT]:  Parsed subcommand arguments
[OUTPUT]: Subcommand implementations
[POS]:    CLI command layer
[UPDATE]: When adding subcommands
*/

pub mod handshake;
pub mod init;

pub use handshake::{DecodeReport, StdoutNavigator, run_connect, run_decode, run_simulate_wallet};
pub use init::run_init;
