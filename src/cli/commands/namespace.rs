use colored::Colorize;

use crate::cli::{NamespaceAction, Selection, context, output};
use crate::core::errors::{NsdiffError, Result};
use crate::core::models::namespace_usage::{
    AppNamespace, NamespaceBaseInfo, NamespaceCreation, NamespaceUsage,
};
use crate::core::services::namespace_admin_service::{NamespaceAdminService, NamespaceTarget, in_use};
use crate::core::services::permission_service::PermissionService;

/// Formats an app namespace can be created with.
const FORMATS: [&str; 6] = ["properties", "xml", "json", "yml", "yaml", "txt"];

/// Execute `nsdiff namespace <action>`.
pub fn execute(action: &NamespaceAction) -> Result<()> {
    match action {
        NamespaceAction::Usage {
            app,
            namespace,
            linked,
        } => usage(&context::namespace_target(app, namespace, linked.as_deref())?),
        NamespaceAction::Delete {
            app,
            namespace,
            linked,
            force,
        } => delete(
            &context::namespace_target(app, namespace, linked.as_deref())?,
            *force,
        ),
        NamespaceAction::Show { app, namespace } => show(app, namespace),
        NamespaceAction::Public => public(),
        NamespaceAction::Create {
            app,
            name,
            format,
            public,
            comment,
            no_prefix,
        } => create(app, name, format, *public, comment, !*no_prefix),
        NamespaceAction::Link { selection } => link(selection),
        NamespaceAction::Instances {
            env,
            namespace,
            page,
            size,
        } => instances(env, namespace, *page, *size),
        NamespaceAction::PublishInfo { app } => publish_info(app),
    }
}

fn usage(target: &NamespaceTarget) -> Result<()> {
    let portal = context::portal()?;
    let usage = context::block_on(NamespaceAdminService::new(&portal).usage(target))?;

    output::header(&format!("📊 Usage of {target}"));
    print_usage(&usage);
    match in_use(target, &usage) {
        Some(detail) => output::warning(&format!("In use: {detail}")),
        None => output::success("Not in use"),
    }
    Ok(())
}

fn delete(target: &NamespaceTarget, force: bool) -> Result<()> {
    let portal = context::portal()?;
    let usage = context::block_on(NamespaceAdminService::new(&portal).delete(target, force))?;

    if let Some(detail) = in_use(target, &usage) {
        output::warning(&format!("Deleted while in use: {detail}"));
    }
    output::success(&format!("Deleted {target}"));
    Ok(())
}

fn print_usage(usage: &[NamespaceUsage]) {
    if usage.is_empty() {
        return;
    }
    println!(
        "{}",
        format!(
            "  {:<12}   {:<16}   {:>9}   {:>9}   {:>6}",
            "Env", "Cluster", "Instances", "Gray", "Links"
        )
        .bold()
    );
    for u in usage {
        println!(
            "  {:<12}   {:<16}   {:>9}   {:>9}   {:>6}",
            u.env_name,
            u.cluster_name,
            u.instance_count,
            u.branch_instance_count,
            u.linked_namespace_count
        );
    }
    println!();
}

fn show(app: &str, namespace: &str) -> Result<()> {
    let portal = context::portal()?;
    let ns = context::block_on(portal.load_app_namespace(app, namespace))?;

    output::header(&format!("📄 {}/{}", ns.app_id, ns.name));
    println!("  Format:  {}", ns.format);
    println!("  Public:  {}", if ns.is_public { "yes" } else { "no" });
    if !ns.comment.is_empty() {
        println!("  Comment: {}", ns.comment);
    }
    Ok(())
}

fn public() -> Result<()> {
    let portal = context::portal()?;
    let namespaces = context::block_on(portal.find_public_namespaces())?;

    output::header("🔗 Public namespaces");
    if namespaces.is_empty() {
        output::warning("No public namespaces");
        return Ok(());
    }
    for ns in &namespaces {
        println!(
            "  {:<32}   {:<20}   {}",
            ns.name,
            ns.app_id,
            ns.comment.dimmed()
        );
    }
    Ok(())
}

fn create(
    app: &str,
    name: &str,
    format: &str,
    is_public: bool,
    comment: &str,
    append_prefix: bool,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(NsdiffError::InvalidInput {
            detail: "namespace name must not be empty".into(),
        });
    }
    if !FORMATS.contains(&format) {
        return Err(NsdiffError::InvalidInput {
            detail: format!("unknown format '{format}', expected one of {}", FORMATS.join(", ")),
        });
    }

    let namespace = AppNamespace {
        name: name.to_string(),
        app_id: app.to_string(),
        format: format.to_string(),
        is_public,
        comment: comment.to_string(),
    };
    let portal = context::portal()?;
    let created = context::block_on(async {
        PermissionService::new(&portal).require_app_master(app).await?;
        portal
            .create_app_namespace(app, &namespace, append_prefix)
            .await
    })?;

    output::success(&format!(
        "Created {} namespace {}/{}",
        if created.is_public { "public" } else { "private" },
        app,
        created.name
    ));
    Ok(())
}

fn link(selection: &Selection) -> Result<()> {
    let refs = context::namespace_refs(&selection.app, &selection.namespace, &selection.clusters)?;
    let creations: Vec<NamespaceCreation> = refs
        .iter()
        .map(|r| NamespaceCreation {
            env: r.env.clone(),
            namespace: NamespaceBaseInfo {
                app_id: r.app_id.clone(),
                cluster_name: r.cluster_name.clone(),
                namespace_name: r.namespace_name.clone(),
            },
        })
        .collect();

    let portal = context::portal()?;
    context::block_on(async {
        PermissionService::new(&portal)
            .require_app_master(&selection.app)
            .await?;
        portal.create_namespace(&selection.app, &creations).await
    })?;

    for r in &refs {
        output::success(&format!("Linked {} into {}:{}", r.namespace_name, r.env, r.cluster_name));
    }
    Ok(())
}

fn instances(env: &str, namespace: &str, page: u32, size: u32) -> Result<()> {
    if size == 0 {
        return Err(NsdiffError::InvalidInput {
            detail: "--size must be at least 1".into(),
        });
    }
    let portal = context::portal()?;
    let instances =
        context::block_on(portal.public_namespace_instances(env, namespace, page, size))?;

    output::header(&format!("📍 {namespace} in {env} (page {page})"));
    if instances.is_empty() {
        output::warning("No instances on this page");
        return Ok(());
    }
    for instance in &instances {
        let info = &instance.base_info;
        let kind = if instance.is_linked_namespace {
            "linked".normal()
        } else {
            "owner".cyan()
        };
        println!("  {:<24}   {:<16}   {kind}", info.app_id, info.cluster_name);
    }
    Ok(())
}

fn publish_info(app: &str) -> Result<()> {
    let portal = context::portal()?;
    let info = context::block_on(portal.namespace_publish_info(app))?;

    output::header(&format!("📝 Unpublished changes in {app}"));
    let pending: Vec<(&String, &String)> = info
        .iter()
        .flat_map(|(env, clusters)| {
            clusters
                .iter()
                .filter(|(_, dirty)| **dirty)
                .map(move |(cluster, _)| (env, cluster))
        })
        .collect();

    if pending.is_empty() {
        output::success("Every cluster is published");
        return Ok(());
    }
    for (env, cluster) in pending {
        output::warning(&format!("{env}:{cluster} has unpublished changes"));
    }
    Ok(())
}
