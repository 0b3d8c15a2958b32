//! Command-line driver: argument validation, the load → threshold → render pipeline, and
//! console reporting for the `pixelsheet` binary.

mod cli;
mod error;

pub use cli::{
    init_logging, run, run_with_args, verbosity_filter, Args, PixelArtConfig, RunSummary,
};
pub use error::CliError;
