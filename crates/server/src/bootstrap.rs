//! Startup seeding of user accounts.

use anyhow::{Result, bail};
use vidhub_core::config::BootstrapConfig;
use vidhub_metadata::models::UserRow;
use vidhub_metadata::{MetadataError, MetadataStore};

/// Ensure every configured user exists, matching on username.
///
/// Existing accounts are left untouched, including their email. Returns the
/// number of accounts created.
pub async fn seed_users(metadata: &dyn MetadataStore, config: &BootstrapConfig) -> Result<usize> {
    if let Err(e) = config.validate() {
        bail!("invalid bootstrap config: {e}");
    }

    let mut created = 0;
    for seed in &config.users {
        let username = seed.username.trim();

        if let Some(existing) = metadata.get_user_by_username(username).await? {
            if existing.email != seed.email {
                tracing::warn!(
                    username = %username,
                    stored_email = %existing.email,
                    "Seed user already exists with a different email, leaving it unchanged"
                );
            } else {
                tracing::debug!(username = %username, "Seed user already exists");
            }
            continue;
        }

        match metadata
            .create_user(&UserRow::new(username, seed.email.trim()))
            .await
        {
            Ok(user) => {
                created += 1;
                tracing::info!(user_id = %user.user_id, username = %username, "Seed user created");
            }
            // Another instance seeded it first.
            Err(MetadataError::AlreadyExists(_)) => {
                tracing::debug!(username = %username, "Seed user created concurrently");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(created)
}
