use colored::Colorize;

use crate::cli::{ServerConfigAction, context, output};
use crate::core::errors::Result;
use crate::core::models::server_config::{ServerConfig, ServerConfigScope};
use crate::core::services::server_config_service::ServerConfigService;

/// Execute `nsdiff server-config <action>`.
pub fn execute(action: &ServerConfigAction) -> Result<()> {
    match action {
        ServerConfigAction::List { env, search } => list(env.as_deref(), search.as_deref()),
        ServerConfigAction::Set {
            key,
            value,
            comment,
            env,
        } => set(key, value, comment, env.as_deref()),
    }
}

fn list(env: Option<&str>, search: Option<&str>) -> Result<()> {
    let scope = ServerConfigScope::from_env(env);
    let portal = context::portal()?;
    let mut configs = context::block_on(ServerConfigService::new(&portal).list(&scope))?;
    match search {
        Some(key) => configs.apply(key),
        None => configs.reset(),
    }

    output::header(&format!("⚙ Server config: {}", scope.describe()));
    if configs.visible_len() == 0 {
        output::warning(&match configs.key() {
            "" => "No settings found".to_string(),
            key => format!("No setting matches '{key}'"),
        });
        return Ok(());
    }

    let visible: Vec<&ServerConfig> = configs.visible().collect();
    let key_width = visible
        .iter()
        .map(|c| c.key.chars().count())
        .max()
        .unwrap_or(8)
        .clamp(8, 48);
    println!("{}", format!("  {:<key_width$}   {:<32}   Comment", "Key", "Value").bold());
    for config in visible {
        println!(
            "  {:<key_width$}   {:<32}   {}",
            config.key,
            output::truncate(&config.value, 32),
            config.comment.dimmed()
        );
    }

    println!();
    output::success(&format!(
        "{} of {} settings shown",
        configs.visible_len(),
        configs.all().len()
    ));
    Ok(())
}

fn set(key: &str, value: &str, comment: &str, env: Option<&str>) -> Result<()> {
    let scope = ServerConfigScope::from_env(env);
    let config = ServerConfig {
        key: key.to_string(),
        value: value.to_string(),
        comment: comment.to_string(),
    };
    let portal = context::portal()?;
    let saved = context::block_on(ServerConfigService::new(&portal).save(&scope, &config))?;

    output::success(&format!("Saved {} in {}", saved.key, scope.describe()));
    Ok(())
}
