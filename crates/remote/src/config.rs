/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Project base URL, e.g. `https://abc.supabase.co` (no trailing slash).
    pub base_url: String,
    /// Public anonymous API key, sent as `apikey` on every request.
    pub anon_key: String,
    /// Name of the edge function that accepts image uploads.
    pub upload_function: String,
}

/// Default edge function name for uploads.
pub const DEFAULT_UPLOAD_FUNCTION: &str = "cloudinary-upload";

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            upload_function: DEFAULT_UPLOAD_FUNCTION.to_string(),
        }
    }

    pub fn with_upload_function(mut self, name: impl Into<String>) -> Self {
        self.upload_function = name.into();
        self
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    pub fn function_url(&self) -> String {
        format!("{}/functions/v1/{}", self.base_url, self.upload_function)
    }
}
