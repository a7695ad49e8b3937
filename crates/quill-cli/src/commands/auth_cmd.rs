use quill_core::models::AuthUser;
use quill_core::AuthStatus;

use crate::cli::AuthCommands;
use crate::commands::common::{CommandContext, Session};
use crate::error::CliError;

pub async fn run_auth(
    command: AuthCommands,
    session: &Session,
    context: &CommandContext,
) -> Result<(), CliError> {
    let profile_name = &context.profile_name;

    match command {
        AuthCommands::Login { email, password } => {
            let user = session.login(&email, &password).await?;
            println!(
                "Signed in profile '{profile_name}' as {}",
                email_label(user.as_ref(), &email)
            );
        }
        AuthCommands::Signup { email, password } => {
            let user = session.signup(&email, &password).await?;
            println!(
                "Created account and signed in profile '{profile_name}' as {}",
                email_label(user.as_ref(), &email)
            );
        }
        AuthCommands::Logout => {
            session.logout().await?;
            println!("Signed out profile '{profile_name}'");
        }
        AuthCommands::Status => match session.status().await {
            AuthStatus::Authenticated => {
                println!(
                    "Profile '{profile_name}' is signed in at {}",
                    session.api().http().base_url()
                );
            }
            AuthStatus::Unauthenticated => {
                println!("Profile '{profile_name}' is not signed in.");
            }
        },
    }
    Ok(())
}

fn email_label(user: Option<&AuthUser>, typed: &str) -> String {
    user.map_or_else(|| typed.trim().to_string(), |user| user.email.clone())
}
