use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub user: UserConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,  // in bytes
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    pub default_total_credits: u32,
    pub default_semester_targets: Vec<u32>,
    pub notification_window_days: i64,
    pub password_cost: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub secure: bool,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    #[cfg(test)]
    pub fn for_tests(data_dir: &str) -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
                max_body_size: 1024 * 1024,
            },
            storage: StorageConfig {
                data_dir: data_dir.to_string(),
            },
            user: UserConfig {
                default_total_credits: 180,
                default_semester_targets: vec![9, 6],
                notification_window_days: 3,
                password_cost: 4,
            },
            session: SessionConfig {
                secure: false,
            },
        }
    }
}
