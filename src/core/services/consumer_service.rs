use crate::core::errors::{NsdiffError, Result};
use crate::core::models::consumer::{ConsumerGrant, ConsumerRole, ConsumerRoleType};
use crate::core::traits::portal::{ConsumerAdmin, PortalDirectory};

/// Environments a namespace role is granted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvScope {
    /// No env restriction.
    Unrestricted,
    /// Only these envs; each must be known to the portal.
    Listed(Vec<String>),
    /// Every env the portal knows, listed explicitly.
    All,
}

/// Grants app and namespace roles to consumer tokens.
pub struct ConsumerService<'a, P> {
    pub portal: &'a P,
}

impl<'a, P: PortalDirectory + ConsumerAdmin> ConsumerService<'a, P> {
    pub fn new(portal: &'a P) -> Self {
        Self { portal }
    }

    /// Grant `grant` to the consumer owning `token`.
    ///
    /// Returns the envs the role was limited to (empty when unrestricted)
    /// together with the role bindings the portal created.
    pub async fn grant(
        &self,
        token: &str,
        grant: &ConsumerGrant,
        scope: &EnvScope,
    ) -> Result<(Vec<String>, Vec<ConsumerRole>)> {
        validate(token, grant, scope)?;

        let envs = match scope {
            EnvScope::Unrestricted => Vec::new(),
            EnvScope::All => self.portal.find_all_envs().await?,
            EnvScope::Listed(listed) => {
                let known = self.portal.find_all_envs().await?;
                let mut envs: Vec<String> = Vec::new();
                for env in listed {
                    let known_env = known
                        .iter()
                        .find(|k| k.eq_ignore_ascii_case(env))
                        .ok_or_else(|| NsdiffError::InvalidInput {
                            detail: format!("unknown env '{env}', expected one of {}", known.join(", ")),
                        })?;
                    if !envs.contains(known_env) {
                        envs.push(known_env.clone());
                    }
                }
                envs
            }
        };

        let roles = self
            .portal
            .assign_role_to_consumer(token, grant, &envs)
            .await?;
        tracing::info!(
            target = %grant.describe(),
            role = %grant.role_type(),
            envs = envs.len(),
            "consumer role granted"
        );
        Ok((envs, roles))
    }
}

fn validate(token: &str, grant: &ConsumerGrant, scope: &EnvScope) -> Result<()> {
    let invalid = |detail: &str| NsdiffError::InvalidInput {
        detail: detail.to_string(),
    };
    if token.trim().is_empty() {
        return Err(invalid("consumer token is required"));
    }
    if grant.app_id.trim().is_empty() {
        return Err(invalid("app id is required"));
    }
    if grant
        .namespace_name
        .as_deref()
        .is_some_and(|ns| ns.trim().is_empty())
    {
        return Err(invalid("namespace name must not be empty"));
    }
    match (grant.role_type(), scope) {
        (ConsumerRoleType::AppRole, EnvScope::Unrestricted) => Ok(()),
        (ConsumerRoleType::AppRole, _) => {
            Err(invalid("envs only apply to namespace roles; add --namespace"))
        }
        (ConsumerRoleType::NamespaceRole, EnvScope::Listed(envs)) if envs.is_empty() => {
            Err(invalid("at least one env is required"))
        }
        (ConsumerRoleType::NamespaceRole, _) => Ok(()),
    }
}
