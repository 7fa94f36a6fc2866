mod info;
mod package;
mod prepare;

pub use info::cmd_info;
pub use package::cmd_package;
pub use prepare::cmd_prepare;

use anyhow::{Context, Result};
use tracing::debug;
use wkpack_lib::{BuildContext, Config, Target};

use crate::BuildArgs;

/// Load the configuration and assemble the build context for a command.
fn load_context(args: &BuildArgs) -> Result<BuildContext> {
  let config = Config::from_path(&args.config)
    .with_context(|| format!("Failed to load config {}", args.config.display()))?;
  debug!(config = %args.config.display(), targets = config.targets.len(), "loaded configuration");

  Ok(BuildContext::new(
    config,
    Target::new(args.target.as_str()),
    &args.build_dir,
    &args.src_dir,
  ))
}
