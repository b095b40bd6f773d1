use derive_more::Display;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[display(fmt = "Invalid value {_1:?} for env var {_0}")]
    InvalidVar(&'static str, String),
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Recreate the `users` table and load the seed users on start.
    pub seed: bool,
}

impl DatabaseConfig {
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            seed: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Operations running at the same time.
    pub max_size: usize,
    /// Operations waiting for a free worker before dispatch is rejected.
    pub queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_size: 10,
            queue_capacity: 500,
        }
    }
}

pub mod env_var {
    use std::str::FromStr;

    use lazy_static::lazy_static;
    use tokio::sync::Semaphore;

    use super::{ConfigError, DatabaseConfig, WorkerConfig};

    lazy_static! {
        static ref ENV_VAR: Result<EnvVar, ConfigError> = EnvVar::from_env();
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct EnvVar {
        pub port: u16,
        pub log_level: tracing::Level,
        pub database: DatabaseConfig,
        pub workers: WorkerConfig,
    }

    macro_rules! get_env {
        ($env:literal, $default:expr) => {
            std::env::var($env).unwrap_or_else(|_| $default.to_string())
        };
    }

    fn parse_env<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
        value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidVar(var, value))
    }

    impl EnvVar {
        pub fn from_env() -> Result<Self, ConfigError> {
            let port = parse_env("PORT", get_env!("PORT", 8080))?;
            let log_level = parse_env("LOG_LEVEL", get_env!("LOG_LEVEL", "info"))?;
            let database_url = get_env!("DATABASE_URL", "sqlite:users.db?mode=rwc");
            let database_max_connections = parse_env(
                "DATABASE_MAX_CONNECTIONS",
                get_env!("DATABASE_MAX_CONNECTIONS", 5),
            )?;
            let database_seed = parse_env("DATABASE_SEED", get_env!("DATABASE_SEED", true))?;
            let worker_max_size: usize =
                parse_env("WORKER_MAX_SIZE", get_env!("WORKER_MAX_SIZE", 10))?;
            let worker_queue_capacity: usize = parse_env(
                "WORKER_QUEUE_CAPACITY",
                get_env!("WORKER_QUEUE_CAPACITY", 500),
            )?;

            if worker_max_size == 0 || worker_max_size > Semaphore::MAX_PERMITS {
                return Err(ConfigError::InvalidVar(
                    "WORKER_MAX_SIZE",
                    worker_max_size.to_string(),
                ));
            }
            let admitted = worker_max_size.checked_add(worker_queue_capacity);
            if admitted.map_or(true, |admitted| admitted > Semaphore::MAX_PERMITS) {
                return Err(ConfigError::InvalidVar(
                    "WORKER_QUEUE_CAPACITY",
                    worker_queue_capacity.to_string(),
                ));
            }

            Ok(EnvVar {
                port,
                log_level,
                database: DatabaseConfig {
                    url: database_url,
                    max_connections: database_max_connections,
                    seed: database_seed,
                },
                workers: WorkerConfig {
                    max_size: worker_max_size,
                    queue_capacity: worker_queue_capacity,
                },
            })
        }
    }

    pub fn get() -> Result<&'static EnvVar, ConfigError> {
        ENV_VAR.as_ref().map_err(Clone::clone)
    }

    #[cfg(test)]
    mod tests {
        use pretty_assertions::assert_eq;
        use serial_test::serial;

        use super::*;

        const VARS: [&str; 7] = [
            "PORT",
            "LOG_LEVEL",
            "DATABASE_URL",
            "DATABASE_MAX_CONNECTIONS",
            "DATABASE_SEED",
            "WORKER_MAX_SIZE",
            "WORKER_QUEUE_CAPACITY",
        ];

        fn clear_env() {
            for var in VARS {
                std::env::remove_var(var);
            }
        }

        #[test]
        #[serial]
        fn defaults_apply_without_env() {
            clear_env();

            let env = EnvVar::from_env().unwrap();

            assert_eq!(env.port, 8080);
            assert_eq!(env.log_level, tracing::Level::INFO);
            assert_eq!(env.database.url, "sqlite:users.db?mode=rwc");
            assert_eq!(env.database.max_connections, 5);
            assert!(env.database.seed);
            assert_eq!(env.workers, WorkerConfig::default());
        }

        #[test]
        #[serial]
        fn reads_values_from_env() {
            clear_env();
            std::env::set_var("PORT", "3000");
            std::env::set_var("LOG_LEVEL", "debug");
            std::env::set_var("DATABASE_URL", "sqlite::memory:");
            std::env::set_var("DATABASE_SEED", "false");
            std::env::set_var("WORKER_MAX_SIZE", "2");

            let env = EnvVar::from_env().unwrap();
            clear_env();

            assert_eq!(env.port, 3000);
            assert_eq!(env.log_level, tracing::Level::DEBUG);
            assert!(env.database.is_in_memory());
            assert!(!env.database.seed);
            assert_eq!(env.workers.max_size, 2);
            assert_eq!(env.workers.queue_capacity, 500);
        }

        #[test]
        #[serial]
        fn rejects_invalid_values() {
            clear_env();
            std::env::set_var("PORT", "not-a-port");

            let err = EnvVar::from_env().unwrap_err();
            clear_env();

            assert_eq!(err, ConfigError::InvalidVar("PORT", "not-a-port".into()));
        }

        #[test]
        #[serial]
        fn rejects_queue_beyond_semaphore_permits() {
            clear_env();
            std::env::set_var("WORKER_QUEUE_CAPACITY", usize::MAX.to_string());

            let err = EnvVar::from_env().unwrap_err();
            clear_env();

            assert_eq!(
                err,
                ConfigError::InvalidVar("WORKER_QUEUE_CAPACITY", usize::MAX.to_string())
            );
        }

        #[test]
        #[serial]
        fn rejects_empty_worker_pool() {
            clear_env();
            std::env::set_var("WORKER_MAX_SIZE", "0");

            let err = EnvVar::from_env().unwrap_err();
            clear_env();

            assert_eq!(err, ConfigError::InvalidVar("WORKER_MAX_SIZE", "0".into()));
        }
    }
}
