use crate::cli::{ConsumerAction, context, output};
use crate::core::errors::Result;
use crate::core::models::consumer::ConsumerGrant;
use crate::core::services::consumer_service::{ConsumerService, EnvScope};

/// Execute `nsdiff consumer <action>`.
pub fn execute(action: &ConsumerAction) -> Result<()> {
    match action {
        ConsumerAction::Grant {
            token,
            app,
            namespace,
            envs,
            all_envs,
        } => {
            let grant = ConsumerGrant {
                app_id: app.clone(),
                namespace_name: namespace.clone(),
            };
            let scope = if *all_envs {
                EnvScope::All
            } else if envs.is_empty() {
                EnvScope::Unrestricted
            } else {
                EnvScope::Listed(envs.clone())
            };

            let portal = context::portal()?;
            let (envs, roles) =
                context::block_on(ConsumerService::new(&portal).grant(token, &grant, &scope))?;

            let scope_note = if envs.is_empty() {
                String::new()
            } else {
                format!(" in {}", envs.join(", "))
            };
            output::success(&format!(
                "Granted {} on {}{scope_note} ({} role binding(s))",
                grant.role_type(),
                grant.describe(),
                roles.len()
            ));
        }
    }
    Ok(())
}
