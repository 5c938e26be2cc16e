use core_config::{AppInfo, FromEnv, app_info, env_parse, server::ServerConfig};
use database::postgres::PostgresConfig;
use domain_rag::{OpenAIConfig, QdrantConfig, RagConfig};

pub use core_config::Environment;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub rag: RagConfig,
    /// Without it, documentation routes answer 503 and generation uses templates
    pub openai: Option<OpenAIConfig>,
    /// Without it, vectors live in process memory
    pub qdrant: Option<QdrantConfig>,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?; // Required - will fail if not set
        let server = ServerConfig::from_env()?;
        let rag = RagConfig::from_env()?;
        let openai = OpenAIConfig::from_env_optional()?;
        let qdrant = QdrantConfig::from_env_optional()?;
        let run_migrations = env_parse("RUN_MIGRATIONS", true)?;

        Ok(Self {
            app: app_info!(),
            database,
            server,
            environment,
            rag,
            openai,
            qdrant,
            run_migrations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_environment() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/rulesmith")),
                ("OPENAI_API_KEY", None),
                ("QDRANT_URL", None),
                ("RUN_MIGRATIONS", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.app.name, "rulesmith_api");
                assert!(config.openai.is_none());
                assert!(config.qdrant.is_none());
                assert!(config.run_migrations);
                assert_eq!(config.rag, RagConfig::default());
            },
        );
    }

    #[test]
    fn test_database_url_is_required() {
        temp_env::with_var_unset("DATABASE_URL", || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn test_remote_services_enabled() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/rulesmith")),
                ("OPENAI_API_KEY", Some("sk-test")),
                ("QDRANT_URL", Some("http://localhost:6334")),
                ("RUN_MIGRATIONS", Some("false")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.openai.unwrap().api_key, "sk-test");
                assert_eq!(config.qdrant.unwrap().url, "http://localhost:6334");
                assert!(!config.run_migrations);
            },
        );
    }
}
