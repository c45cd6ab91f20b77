// ============================================================================
// animclip-cli/src/main.rs
// ============================================================================
//
// MAIN ENTRY POINT: animclip command-line application
//
// Parses arguments, installs logging and dispatches to the selected command.
// A failed conversion exits with status 1 after its result has been printed;
// other errors propagate out of main.

use animclip_cli::logging::init_logging;
use animclip_cli::{CliResult, Commands, parse_cli, run_cleanup, run_convert, run_info};

use log::debug;
use std::process;

fn main() -> CliResult<()> {
    let cli = parse_cli();

    if let Some(log_file) = init_logging(cli.verbose, cli.log_dir.as_deref())? {
        debug!("Logging to {}", log_file.display());
    }
    debug!("Parsed arguments: {cli:?}");

    match &cli.command {
        Commands::Convert(args) => {
            if !run_convert(&cli, args)? {
                process::exit(1);
            }
        }
        Commands::Cleanup(args) => {
            run_cleanup(&cli, args)?;
        }
        Commands::Info(args) => run_info(&cli, args)?,
    }
    Ok(())
}
