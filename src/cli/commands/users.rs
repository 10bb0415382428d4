use colored::Colorize;

use crate::cli::{UsersAction, context, output};
use crate::core::errors::{NsdiffError, Result};
use crate::core::models::user::{UserForm, UserRecord};
use crate::core::services::user_service::UserService;

/// Execute `nsdiff users <action>`.
pub fn execute(action: &UsersAction) -> Result<()> {
    let portal = context::portal()?;
    let service = UserService::new(&portal);

    match action {
        UsersAction::List { search } => {
            let mut users = context::block_on(service.list())?;
            match search {
                Some(key) => users.apply(key),
                None => users.reset(),
            }
            print_users(users.visible().collect(), users.key());
        }
        UsersAction::Toggle { user_id } => {
            let user = context::block_on(service.toggle_enabled(user_id))?;
            let state = if user.is_enabled() { "enabled" } else { "disabled" };
            output::success(&format!("User {} is now {state}", user.user_id));
        }
        UsersAction::Create {
            user_id,
            name,
            email,
            password,
        } => {
            let form = UserForm {
                username: user_id.clone(),
                user_display_name: name.clone(),
                email: email.clone(),
                enabled: 1,
                password: Some(password.clone()),
            };
            context::block_on(service.save(true, &form))?;
            output::success(&format!("Created user {user_id}"));
        }
        UsersAction::Update {
            user_id,
            name,
            email,
            password,
        } => {
            context::block_on(async {
                let users = service.list().await?;
                let existing = users
                    .all()
                    .iter()
                    .find(|u| u.user_id == *user_id)
                    .ok_or_else(|| NsdiffError::UserNotFound {
                        user_id: user_id.clone(),
                    })?;

                let mut form = UserForm::from(existing);
                if let Some(name) = name {
                    form.user_display_name = name.clone();
                }
                if let Some(email) = email {
                    form.email = email.clone();
                }
                form.password = password.clone();
                service.save(false, &form).await
            })?;
            output::success(&format!("Updated user {user_id}"));
        }
    }
    Ok(())
}

fn print_users(users: Vec<&UserRecord>, search: &str) {
    output::header("👤 Users");
    if users.is_empty() {
        output::warning(&match search {
            "" => "No users found".to_string(),
            key => format!("No user id matches '{key}'"),
        });
        return;
    }

    let id_width = users
        .iter()
        .map(|u| u.user_id.chars().count())
        .max()
        .unwrap_or(8)
        .max(8);
    println!(
        "{}",
        format!("  {:<id_width$}   {:<20}   {:<28}   Status", "User", "Name", "Email").bold()
    );
    for user in users {
        let status = if user.is_enabled() {
            "active".green()
        } else {
            "inactive".dimmed()
        };
        println!(
            "  {:<id_width$}   {:<20}   {:<28}   {status}",
            user.user_id,
            output::truncate(&user.name, 20),
            output::truncate(&user.email, 28),
        );
    }
}
