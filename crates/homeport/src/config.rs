//! Deployment configuration
//!
//! Every component receives this struct through its parameter list; there
//! is no ambient global configuration.

/// Fixed configuration for one deployment target
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application name, used in resource names and state keys
    pub app: String,
    /// Owner prefix for globally unique names (bucket names)
    pub prefix: String,
    /// Account applies are restricted to
    pub account_id: String,
    pub default_region: String,
    /// Remote state location
    pub state_bucket: String,
    pub state_region: String,
    pub state_table: String,
    /// GitHub repository whose workflows may assume the deploy role
    pub github_repository: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: "home".to_string(),
            prefix: "ntrp".to_string(),
            account_id: "123456789012".to_string(),
            default_region: "eu-west-1".to_string(),
            state_bucket: "ntrp-tf-state".to_string(),
            state_region: "eu-west-1".to_string(),
            state_table: "ntrp-tf-lock".to_string(),
            github_repository: "ntrp/home".to_string(),
        }
    }
}
