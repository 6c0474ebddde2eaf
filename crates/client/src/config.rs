use std::path::PathBuf;

use folio_core::roles::OwnerPolicy;
use folio_remote::config::{RemoteConfig, DEFAULT_UPLOAD_FUNCTION};

use crate::error::{ClientError, ClientResult};

/// Default directory for persisted local state.
pub const DEFAULT_STATE_DIR: &str = ".folio";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Hosted backend connection settings.
    pub remote: RemoteConfig,
    /// Email of the single designated owner. `None` means nobody is owner.
    pub owner_email: Option<String>,
    /// Directory holding the guest flag file.
    pub state_dir: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                 | Default             |
    /// |-------------------------|---------------------|
    /// | `SUPABASE_URL`          | required            |
    /// | `SUPABASE_ANON_KEY`     | required            |
    /// | `FOLIO_OWNER_EMAIL`     | none (no owner)     |
    /// | `FOLIO_UPLOAD_FUNCTION` | `cloudinary-upload` |
    /// | `FOLIO_STATE_DIR`       | `.folio`            |
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientResult<Self> {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ClientError::Config(format!("{key} must be set")))
        };

        let base_url = required("SUPABASE_URL")?;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "SUPABASE_URL must be an http(s) URL, got '{base_url}'"
            )));
        }
        let anon_key = required("SUPABASE_ANON_KEY")?;

        let upload_function = lookup("FOLIO_UPLOAD_FUNCTION")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_UPLOAD_FUNCTION.into());

        let owner_email = lookup("FOLIO_OWNER_EMAIL").filter(|v| !v.trim().is_empty());
        if owner_email.is_none() {
            tracing::warn!("FOLIO_OWNER_EMAIL is not set; no identity will be treated as owner");
        }

        let state_dir = lookup("FOLIO_STATE_DIR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STATE_DIR.into())
            .into();

        Ok(Self {
            remote: RemoteConfig::new(base_url, anon_key).with_upload_function(upload_function),
            owner_email,
            state_dir,
        })
    }

    pub fn owner_policy(&self) -> OwnerPolicy {
        OwnerPolicy::new(self.owner_email.as_deref())
    }
}
