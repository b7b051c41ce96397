use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use clap::Parser;

#[derive(Clone, Debug, Parser)]
#[command(name = "tasks-server", version, about = "HTTP API for a todo list")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "TASKS_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// SQLite database file, created if missing
    #[arg(long, env = "TASKS_DATABASE", default_value = "todo.db")]
    pub database: PathBuf,

    #[arg(
        long,
        env = "TASKS_MAX_CONNECTIONS",
        default_value_t = 5,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_connections: u32,

    /// The one origin allowed to make credentialed cross-origin requests
    #[arg(long, env = "TASKS_CORS_ORIGIN", default_value = "http://localhost:5173")]
    pub cors_origin: String,

    /// PEM certificate, serves HTTPS together with --tls-key
    #[arg(long, env = "SSL_CERT", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    #[arg(long, env = "SSL_KEY", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,
}

impl Config {
    pub fn tls(&self) -> Option<(&Path, &Path)> {
        match (&self.tls_cert, &self.tls_key) {
            (Some(cert), Some(key)) => Some((cert, key)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Config::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["tasks-server"]).unwrap();

        assert_eq!(config.bind.port(), 8000);
        assert_eq!(config.database, PathBuf::from("todo.db"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.cors_origin, "http://localhost:5173");
        assert!(config.tls().is_none());
    }

    #[test]
    fn tls_needs_both_files() {
        let result = Config::try_parse_from(["tasks-server", "--tls-cert", "cert.pem"]);
        assert!(result.is_err());

        let config = Config::try_parse_from([
            "tasks-server",
            "--tls-cert",
            "cert.pem",
            "--tls-key",
            "key.pem",
        ])
        .unwrap();

        assert_eq!(
            config.tls(),
            Some((Path::new("cert.pem"), Path::new("key.pem")))
        );
    }

    #[test]
    fn rejects_zero_connections() {
        let result = Config::try_parse_from(["tasks-server", "--max-connections", "0"]);
        assert!(result.is_err());
    }
}
