//! Terrasprite - command-line tool for resolving terrain tiles to sprites

use std::process::ExitCode;

use terrasprite::cli;

fn main() -> ExitCode {
    cli::run()
}
