use std::env;
use std::fmt::{self, Formatter};
use std::io;
use std::net::{AddrParseError, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::LevelFilter;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

macro_rules! from_environment {
    ($config:expr, $($key:expr, $name:tt),*$(,)?) => {{
        $(
            {
                if let Ok(value) = env::var($key) {
                    match value.parse() {
                        Ok(value) => $config.$name = value,
                        Err(_) => log::warn!("Ignoring invalid value for {}", $key),
                    }
                }
            }
        )*
    }};
}

macro_rules! from_environment_error {
    ($config:expr, $($key:expr, $name:tt),*$(,)?) => {{
        $(
            let value = env::var($key).map_err(|_| ConfigError::MissingField($key))?;
            $config.$name = value.parse().map_err(|_| ConfigError::InvalidField($key))?;
        )*
    }};
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub database: Database,
    pub loglevel: LevelFilter,
    pub bind: BindAddr,
}

impl Config {
    pub async fn from_file<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let mut file = File::open(path).await?;

        let mut buf = Vec::new();
        file.read_to_end(&mut buf).await?;

        Ok(toml::from_slice(&buf)?)
    }

    /// Creates a complete [`Config`] instance from the environment.
    pub fn from_environment() -> Result<Self, ConfigError> {
        let mut this = Self::default();

        from_environment_error!(this, "BT_LOGLEVEL", loglevel, "BT_BIND", bind);

        this.database = Database::from_environment()?;

        Ok(this)
    }

    pub fn with_environment(mut self) -> Self {
        from_environment!(self, "BT_LOGLEVEL", loglevel, "BT_BIND", bind);
        self.database = self.database.with_environment();

        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Database::default(),
            loglevel: LevelFilter::Info,
            bind: BindAddr::Tcp(SocketAddr::new([0, 0, 0, 0].into(), 3000)),
        }
    }
}

/// An address to bind the http server to.
///
/// This can be a tcp socket (net) or a unix socket (file).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum BindAddr {
    Tcp(SocketAddr),
    Unix(PathBuf),
}

impl BindAddr {
    /// Parses the given string into a `Tcp` address.
    ///
    /// # Errors
    ///
    /// Returns an [`AddrParseError`] when parsing the input fails.
    #[inline]
    pub fn parse_socket(s: &str) -> Result<Self, AddrParseError> {
        s.parse().map(Self::Tcp)
    }
}

impl FromStr for BindAddr {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(addr) = Self::parse_socket(s) {
            return Ok(addr);
        }

        Ok(Self::Unix(s.to_owned().into()))
    }
}

impl<'de> Deserialize<'de> for BindAddr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BindAddrVisitor;

        impl<'de> Visitor<'de> for BindAddrVisitor {
            type Value = BindAddr;

            fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
                formatter.write_str("an address with port, or file path")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                match v.parse() {
                    Ok(addr) => Ok(addr),
                    Err(err) => Err(E::custom(err)),
                }
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                self.visit_str(&v)
            }
        }

        deserializer.deserialize_str(BindAddrVisitor)
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Database {
    pub driver: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Prepended to every table name.
    #[serde(default)]
    pub prefix: String,
}

impl Database {
    pub fn connect_string(&self) -> String {
        format!(
            "{}://{}:{}@{}:{}/{}?ssl-mode=DISABLED",
            self.driver, self.user, self.password, self.host, self.port, self.database
        )
    }

    pub fn from_environment() -> Result<Self, ConfigError> {
        let mut this = Self::default();

        from_environment_error!(
            this,
            "BT_DB_DRIVER",
            driver,
            "BT_DB_HOST",
            host,
            "BT_DB_PORT",
            port,
            "BT_DB_USER",
            user,
            "BT_DB_PASSWORD",
            password,
            "BT_DB_DATABASE",
            database,
        );

        // The prefix is optional.
        from_environment!(this, "BT_DB_PREFIX", prefix);

        Ok(this)
    }

    pub fn with_environment(mut self) -> Self {
        from_environment!(
            self,
            "BT_DB_DRIVER",
            driver,
            "BT_DB_HOST",
            host,
            "BT_DB_PORT",
            port,
            "BT_DB_USER",
            user,
            "BT_DB_PASSWORD",
            password,
            "BT_DB_DATABASE",
            database,
            "BT_DB_PREFIX",
            prefix,
        );

        self
    }
}

impl Default for Database {
    fn default() -> Self {
        Self {
            driver: String::from("mysql"),
            host: String::from("localhost"),
            port: 3306,
            user: String::new(),
            password: String::new(),
            database: String::from("bowling"),
            prefix: String::new(),
        }
    }
}

// Keep the password out of the startup log.
impl fmt::Debug for Database {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("prefix", &self.prefix)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error("missing config field: {0}")]
    MissingField(&'static str),
    #[error("invalid config field: {0}")]
    InvalidField(&'static str),
}

#[cfg(test)]
mod tests {
    use log::LevelFilter;

    use super::{BindAddr, Config, Database};

    #[test]
    fn test_bindaddr_parse() {
        let input = "0.0.0.0:80";
        assert_eq!(
            input.parse::<BindAddr>().unwrap(),
            BindAddr::Tcp(input.parse().unwrap())
        );

        let input = "/var/run/test";
        assert_eq!(
            input.parse::<BindAddr>().unwrap(),
            BindAddr::Unix(input.to_owned().into())
        );
    }

    #[test]
    fn test_config_toml() {
        let input = r#"
            loglevel = "debug"
            bind = "127.0.0.1:3000"

            [database]
            driver = "mysql"
            host = "db"
            port = 3306
            user = "bowling"
            password = "secret"
            database = "tournaments"
        "#;

        let config: Config = toml::from_str(input).unwrap();
        assert_eq!(config.loglevel, LevelFilter::Debug);
        assert_eq!(config.bind, BindAddr::Tcp("127.0.0.1:3000".parse().unwrap()));
        assert_eq!(config.database.prefix, "");
        assert_eq!(
            config.database.connect_string(),
            "mysql://bowling:secret@db:3306/tournaments?ssl-mode=DISABLED"
        );
        assert!(!format!("{:?}", config.database).contains("secret"));
    }

    #[test]
    fn test_database_with_environment() {
        std::env::set_var("BT_DB_PREFIX", "bt_");
        std::env::set_var("BT_DB_PORT", "not a port");

        let database = Database::default().with_environment();
        assert_eq!(database.prefix, "bt_");
        assert_eq!(database.port, 3306);

        std::env::remove_var("BT_DB_PREFIX");
        std::env::remove_var("BT_DB_PORT");
    }
}
