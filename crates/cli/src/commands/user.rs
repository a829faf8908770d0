//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create an admin
//! bancarella-cli user create -e admin@example.com -n "Admin" -p "..." --admin
//!
//! # Create a student
//! bancarella-cli user create -e student@example.com -n "Student" -p "..." -c 5B
//! ```

use bancarella_core::Email;
use bancarella_server::db::UserRepository;
use bancarella_server::services::auth::hash_password;

/// Create a new user.
///
/// # Errors
///
/// Returns an error if the email is invalid, the email already exists, or
/// the database is unreachable.
pub async fn create(
    email: &str,
    name: &str,
    password: &str,
    class: Option<&str>,
    is_admin: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    let password_hash = hash_password(password)?;

    let pool = super::connect().await?;

    tracing::info!("Creating user: {} (admin: {})", email, is_admin);

    let user = UserRepository::new(&pool)
        .create(&email, name, class, is_admin, &password_hash)
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );

    Ok(())
}
