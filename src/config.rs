//! Process configuration, read once at startup from the environment.

/// Deployment environment, selecting logging verbosity and format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("development") {
            Self::Development
        } else {
            Self::Production
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string. Validated when the connector is
    /// built, not here.
    pub database_url: String,
    pub server_port: u16,
    pub db_max_connections: u32,
    pub app_env: AppEnv,
}

impl Config {
    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.server_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            server_port: 8080,
            db_max_connections: 10,
            app_env: AppEnv::Production,
        }
    }
}

pub fn load_config() -> Config {
    let database_url = std::env::var("DATABASE_URL").unwrap_or_default();

    let server_port = std::env::var("SERVER_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let db_max_connections = std::env::var("DB_MAX_CONNECTIONS")
        .unwrap_or_else(|_| "10".to_string())
        .parse()
        .unwrap_or(10);

    let app_env = std::env::var("APP_ENV")
        .map(|v| AppEnv::parse(&v))
        .unwrap_or(AppEnv::Production);

    Config {
        database_url,
        server_port,
        db_max_connections,
        app_env,
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.server_port, 8080);
        assert_eq!(cfg.db_max_connections, 10);
        assert_eq!(cfg.app_env, AppEnv::Production);
        assert!(cfg.database_url.is_empty());
    }

    #[test]
    fn test_listen_addr() {
        let cfg = Config::default();
        assert_eq!(cfg.listen_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_app_env_parse() {
        assert_eq!(AppEnv::parse("development"), AppEnv::Development);
        assert_eq!(AppEnv::parse("Development"), AppEnv::Development);
        assert_eq!(AppEnv::parse("production"), AppEnv::Production);
        assert_eq!(AppEnv::parse(""), AppEnv::Production);
        assert_eq!(AppEnv::parse("staging"), AppEnv::Production);
    }

    #[test]
    fn test_load_config_defaults() {
        std::env::remove_var("SERVER_PORT");
        std::env::remove_var("APP_ENV");

        let cfg = load_config();
        assert_eq!(cfg.server_port, 8080);
        assert_eq!(cfg.app_env, AppEnv::Production);
    }

    #[test]
    fn test_load_config_with_database_url() {
        std::env::set_var("DATABASE_URL", "postgres://localhost/auction");
        let cfg = load_config();
        assert_eq!(cfg.database_url, "postgres://localhost/auction");
        std::env::remove_var("DATABASE_URL");
    }

    #[test]
    fn test_load_config_with_custom_port() {
        std::env::set_var("SERVER_PORT", "9090");
        let cfg = load_config();
        assert_eq!(cfg.server_port, 9090);
        std::env::remove_var("SERVER_PORT");
    }

    #[test]
    fn test_load_config_port_parse_error_uses_default() {
        std::env::set_var("SERVER_PORT", "not_a_port");
        let cfg = load_config();
        assert_eq!(cfg.server_port, 8080); // default
        std::env::remove_var("SERVER_PORT");
    }

    #[test]
    fn test_load_config_development_env() {
        std::env::set_var("APP_ENV", "development");
        let cfg = load_config();
        assert_eq!(cfg.app_env, AppEnv::Development);
        std::env::remove_var("APP_ENV");
    }

    #[test]
    fn test_load_config_with_max_connections() {
        std::env::set_var("DB_MAX_CONNECTIONS", "25");
        let cfg = load_config();
        assert_eq!(cfg.db_max_connections, 25);
        std::env::remove_var("DB_MAX_CONNECTIONS");
    }
}
