use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use pitchdeck_db::SupabaseConfig;
use pitchdeck_pipeline::generator::{GeminiConfig, DEFAULT_GEMINI_API_URL, DEFAULT_GEMINI_MODEL};
use pitchdeck_pipeline::render::DEFAULT_MARP_COMMAND;
use pitchdeck_pipeline::settings::DEFAULT_MAX_JOB_DURATION;
use pitchdeck_pipeline::PipelineSettings;

use crate::auth::jwt::JwtConfig;

/// Default image upload cap (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`). Progress streams are
    /// only bounded until their headers are sent.
    pub request_timeout_secs: u64,
    /// How long shutdown waits for cancelled decks to finish (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    /// Record store and object storage. `None` selects the in-memory record
    /// store and local-disk storage served under `/uploads`.
    pub supabase: Option<SupabaseConfig>,
    pub gemini: GeminiConfig,
    /// Render tool program followed by its leading arguments.
    pub marp_command: String,
    pub pipeline: PipelineSettings,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                 | Default                                            |
    /// |-------------------------|----------------------------------------------------|
    /// | `HOST`                  | `0.0.0.0`                                          |
    /// | `PORT`                  | `8080`                                             |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`                            |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                                               |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                                               |
    /// | `SUPABASE_JWT_SECRET`   | **required**                                       |
    /// | `JWT_AUDIENCE`          | unset                                              |
    /// | `SUPABASE_URL`          | unset (local fallback)                             |
    /// | `SUPABASE_SERVICE_KEY`  | required when `SUPABASE_URL` is set                |
    /// | `GEMINI_API_KEY`        | **required**                                       |
    /// | `GEMINI_MODEL`          | `gemini-1.5-flash-latest`                          |
    /// | `GEMINI_API_URL`        | `https://generativelanguage.googleapis.com/v1beta` |
    /// | `MARP_COMMAND`          | `npx @marp-team/marp-cli`                          |
    /// | `WORK_DIR`              | `temp`                                             |
    /// | `UPLOADS_DIR`           | `uploads`                                          |
    /// | `MAX_JOB_DURATION_SECS` | `600`                                              |
    /// | `MAX_UPLOAD_BYTES`      | `10485760`                                         |
    /// | `DECK_BUCKET`           | `pitch-decks`                                      |
    /// | `MEDIA_BUCKET`          | `user-media`                                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let cors_origins: Vec<String> = env
            .string("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                var: "CORS_ORIGINS",
                value: origin.clone(),
                reason: e.to_string(),
            })?;
        }

        let jwt = JwtConfig {
            secret: env.required("SUPABASE_JWT_SECRET")?,
            audience: env.optional("JWT_AUDIENCE"),
        };

        let supabase = match env.optional("SUPABASE_URL") {
            Some(url) => Some(SupabaseConfig::new(url, env.required("SUPABASE_SERVICE_KEY")?)),
            None => None,
        };

        let gemini = GeminiConfig {
            api_url: env.string("GEMINI_API_URL", DEFAULT_GEMINI_API_URL),
            api_key: env.required("GEMINI_API_KEY")?,
            model: env.string("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
        };

        let defaults = PipelineSettings::default();
        let pipeline = PipelineSettings {
            work_dir: env.optional("WORK_DIR").map(PathBuf::from).unwrap_or(defaults.work_dir),
            uploads_dir: env
                .optional("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.uploads_dir),
            deck_bucket: env.optional("DECK_BUCKET").unwrap_or(defaults.deck_bucket),
            media_bucket: env.optional("MEDIA_BUCKET").unwrap_or(defaults.media_bucket),
            max_job_duration: Duration::from_secs(
                env.parse("MAX_JOB_DURATION_SECS", DEFAULT_MAX_JOB_DURATION.as_secs())?,
            ),
        };

        Ok(Self {
            host: env.string("HOST", "0.0.0.0"),
            port: env.parse("PORT", 8080)?,
            cors_origins,
            request_timeout_secs: env.parse("REQUEST_TIMEOUT_SECS", 30)?,
            shutdown_timeout_secs: env.parse("SHUTDOWN_TIMEOUT_SECS", 30)?,
            jwt,
            supabase,
            gemini,
            marp_command: env.string("MARP_COMMAND", DEFAULT_MARP_COMMAND),
            pipeline,
            max_upload_bytes: env.parse("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn optional(&self, var: &str) -> Option<String> {
        (self.0)(var)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn string(&self, var: &str, default: &str) -> String {
        self.optional(var).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, var: &'static str) -> Result<String, ConfigError> {
        self.optional(var).ok_or(ConfigError::Missing(var))
    }

    fn parse<T>(&self, var: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.optional(var) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|k| vars.get(k).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [("SUPABASE_JWT_SECRET", "s3cret"), ("GEMINI_API_KEY", "g-key")];

    #[test]
    fn defaults_apply_when_only_secrets_are_set() {
        let config = load(&REQUIRED).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert!(config.supabase.is_none());
        assert!(config.jwt.audience.is_none());
        assert_eq!(config.gemini.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.marp_command, DEFAULT_MARP_COMMAND);
        assert_eq!(config.pipeline.max_job_duration, Duration::from_secs(600));
        assert_eq!(config.pipeline.deck_bucket, "pitch-decks");
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn missing_secret_is_reported() {
        assert_matches!(
            load(&[("GEMINI_API_KEY", "g-key")]),
            Err(ConfigError::Missing("SUPABASE_JWT_SECRET"))
        );
        assert_matches!(
            load(&[("SUPABASE_JWT_SECRET", "s"), ("GEMINI_API_KEY", "  ")]),
            Err(ConfigError::Missing("GEMINI_API_KEY"))
        );
    }

    #[test]
    fn supabase_url_requires_service_key() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("SUPABASE_URL", "https://proj.supabase.co/"));
        assert_matches!(load(&vars), Err(ConfigError::Missing("SUPABASE_SERVICE_KEY")));

        vars.push(("SUPABASE_SERVICE_KEY", "svc"));
        let supabase = load(&vars).unwrap().supabase.unwrap();
        assert_eq!(supabase.url, "https://proj.supabase.co");
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "eighty"));

        assert_matches!(load(&vars), Err(ConfigError::Invalid { var: "PORT", .. }));
    }

    #[test]
    fn unusable_cors_origin_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("CORS_ORIGINS", "https://ok.test,bad\norigin"));

        assert_matches!(load(&vars), Err(ConfigError::Invalid { var: "CORS_ORIGINS", .. }));
    }

    #[test]
    fn overrides_are_read() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("CORS_ORIGINS", "https://a.test, https://b.test,"),
            ("MAX_JOB_DURATION_SECS", "45"),
            ("WORK_DIR", "/var/tmp/decks"),
            ("JWT_AUDIENCE", "authenticated"),
        ]);
        let config = load(&vars).unwrap();

        assert_eq!(config.cors_origins, vec!["https://a.test", "https://b.test"]);
        assert_eq!(config.pipeline.max_job_duration, Duration::from_secs(45));
        assert_eq!(config.pipeline.work_dir, PathBuf::from("/var/tmp/decks"));
        assert_eq!(config.jwt.audience.as_deref(), Some("authenticated"));
    }
}
