use crate::cli::{context, output};
use crate::core::errors::Result;
use crate::core::traits::portal::PortalDirectory;

/// Execute the `nsdiff envs` command.
pub fn execute() -> Result<()> {
    let portal = context::portal()?;
    let envs = context::block_on(portal.find_all_envs())?;

    output::header("🌐 Environments");
    if envs.is_empty() {
        output::warning("The portal reports no environments");
        return Ok(());
    }
    for env in &envs {
        println!("  {env}");
    }
    Ok(())
}
