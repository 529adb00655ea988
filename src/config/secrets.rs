use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use std::env;
use std::fmt;

pub const EMAIL_PASSWORD_VAR: &str = "email_pw";
pub const ACCOUNT_NAME_VAR: &str = "azure_account_name";
pub const ACCOUNT_KEY_VAR: &str = "azure_account_key";
pub const BLOB_NAME_VAR: &str = "azure_blob_name";
pub const CONTAINER_NAME_VAR: &str = "azure_container_name";

/// Credentials and target location, read once from the environment at startup.
#[derive(Clone)]
pub struct Secrets {
    pub email_password: String,
    pub account_name: String,
    pub account_key: String,
    pub blob_name: String,
    pub container_name: String,
}

impl Secrets {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| EtlError::MissingConfigError {
                    field: key.to_string(),
                })
        };

        Ok(Self {
            email_password: required(EMAIL_PASSWORD_VAR)?,
            account_name: required(ACCOUNT_NAME_VAR)?,
            account_key: required(ACCOUNT_KEY_VAR)?,
            blob_name: required(BLOB_NAME_VAR)?,
            container_name: required(CONTAINER_NAME_VAR)?,
        })
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("email_password", &"<redacted>")
            .field("account_name", &self.account_name)
            .field("account_key", &"<redacted>")
            .field("blob_name", &self.blob_name)
            .field("container_name", &self.container_name)
            .finish()
    }
}

impl Validate for Secrets {
    fn validate(&self) -> Result<()> {
        validate_account_name(ACCOUNT_NAME_VAR, &self.account_name)?;
        validation::validate_container_name(CONTAINER_NAME_VAR, &self.container_name)?;
        validation::validate_blob_name(BLOB_NAME_VAR, &self.blob_name)?;

        tracing::debug!("✅ Environment configuration validation passed");
        Ok(())
    }
}

fn validate_account_name(field_name: &str, name: &str) -> Result<()> {
    if name.len() < 3 || name.len() > 24 {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Storage account name must be between 3 and 24 characters".to_string(),
        });
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Storage account name can only contain lowercase letters and numbers"
                .to_string(),
        });
    }

    Ok(())
}
