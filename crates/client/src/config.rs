//! Backend endpoint configuration loaded from environment variables.

/// Connection parameters for the remote backend, read once at startup.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the hosted backend.
    pub base_url: String,
    /// Public (anonymous) API key sent with every request.
    pub api_key: String,
}

impl BackendConfig {
    /// Load configuration from the environment, after `.env` (if any).
    ///
    /// | Env Var                    | Required |
    /// |----------------------------|----------|
    /// | `PALEODEX_BACKEND_URL`     | **yes**  |
    /// | `PALEODEX_BACKEND_API_KEY` | **yes**  |
    ///
    /// # Panics
    ///
    /// Panics if either variable is missing or empty. A catalog client
    /// without a backend endpoint cannot do anything useful, so absence is
    /// a fatal configuration error.
    pub fn from_env() -> Self {
        // Best-effort .env load; a missing file is not an error.
        let _ = dotenvy::dotenv();

        let base_url = std::env::var("PALEODEX_BACKEND_URL")
            .expect("PALEODEX_BACKEND_URL must be set in the environment");
        assert!(!base_url.is_empty(), "PALEODEX_BACKEND_URL must not be empty");

        let api_key = std::env::var("PALEODEX_BACKEND_API_KEY")
            .expect("PALEODEX_BACKEND_API_KEY must be set in the environment");
        assert!(
            !api_key.is_empty(),
            "PALEODEX_BACKEND_API_KEY must not be empty"
        );

        Self { base_url, api_key }
    }
}
