use clap::Parser;
use dagboek_config::Settings;
use dagboek_db::connect;
use dagboek_services::{AuthService, UserDao};

/// Reset a user's password directly in the database.
///
/// Meant for operators locked out of the admin account; bypasses the
/// HTTP API entirely.
#[derive(Parser)]
#[command(name = "reset-password")]
struct Args {
    /// Email address of the account
    email: String,
    /// New password (at least 6 characters)
    new_password: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if args.new_password.len() < 6 {
        anyhow::bail!("Password must be at least 6 characters");
    }

    let settings = Settings::load()?;
    let db = connect(&settings).await?;

    let users = UserDao::new(&db);
    let auth = AuthService::new(settings.jwt.clone());

    let email = args.email.trim().to_lowercase();
    let user = users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No user with email {email}"))?;
    let user_id = user
        .id
        .ok_or_else(|| anyhow::anyhow!("User document has no id"))?;

    let hash = auth.hash_password(&args.new_password)?;
    if !users.set_password(user_id, &hash).await? {
        anyhow::bail!("Failed to update password");
    }

    println!("Password updated for {email}");
    Ok(())
}
