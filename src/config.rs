use std::env;
use std::path::PathBuf;

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub db_path: PathBuf,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub cron_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let db_path = env::var("PRESSBOX_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_db_path());

        Self {
            bind_addr: env::var("PRESSBOX_BIND").unwrap_or_else(|_| "127.0.0.1:8370".to_string()),
            db_path,
            openai_api_key: non_empty(env::var("OPENAI_API_KEY").ok()),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            gemini_api_key: non_empty(env::var("GEMINI_API_KEY").ok()),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            cron_secret: non_empty(env::var("PRESSBOX_CRON_SECRET").ok()),
        }
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pressbox")
        .join("pressbox.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_filters_blank_values() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some("key".to_string())), Some("key".to_string()));
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn default_db_path_lives_under_pressbox_dir() {
        assert!(default_db_path().to_string_lossy().contains(".pressbox"));
    }
}
