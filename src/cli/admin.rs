//! Create-admin command implementation

use anyhow::{Result, bail};
use chrono::Utc;
use std::path::Path;

use challenge_matrix::domain::{Office, Role};
use challenge_matrix::store::{NewUser, Store};

use super::open_store;

/// Create an administrator account in the contest store
pub async fn create_admin_command(
    config_path: &Path,
    name: &str,
    email: &str,
    code: &str,
    office: &str,
) -> Result<()> {
    let Some(office) = Office::parse(office) else {
        bail!(
            "unknown office {:?}; expected one of: {}",
            office,
            Office::ALL
                .iter()
                .map(|o| o.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    };

    let (_config, store) = open_store(config_path)?;

    if store.find_user_by_email(email).await?.is_some() {
        bail!("a user with email {email} already exists");
    }

    let user = store
        .create_user(
            NewUser {
                full_name: name.to_string(),
                email: email.to_string(),
                longrich_code: code.to_string(),
                office,
                role: Role::Admin,
            },
            Utc::now(),
        )
        .await?;

    println!("Created admin {} <{}> ({})", user.full_name, user.email, user.id);
    Ok(())
}
