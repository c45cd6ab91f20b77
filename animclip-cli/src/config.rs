// ============================================================================
// animclip-cli/src/config.rs
// ============================================================================
//
// CONFIGURATION: Mapping Command-Line Options onto CoreConfig
//
// Global directory options apply to every command; the size limit and
// timeout only exist on convert.

use crate::cli::{Cli, ConvertArgs};
use crate::error::CliResult;

use animclip_core::{CoreConfig, CoreConfigBuilder};
use std::time::Duration;

const MIB: u64 = 1024 * 1024;

/// Builds the workspace configuration shared by all commands.
pub fn workspace_config(cli: &Cli) -> CoreConfigBuilder {
    CoreConfigBuilder::new()
        .upload_dir(cli.upload_dir.clone())
        .output_dir(cli.output_dir.clone())
}

/// Builds and validates the configuration for a conversion.
pub fn convert_config(cli: &Cli, args: &ConvertArgs) -> CliResult<CoreConfig> {
    let mut builder = workspace_config(cli).command_timeout(timeout_from_secs(args.timeout));
    if let Some(mib) = args.max_size_mib {
        builder = builder.max_output_size(mib.saturating_mul(MIB));
    }

    let config = builder.build();
    config.validate()?;
    Ok(config)
}

/// `0` disables the timeout.
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
