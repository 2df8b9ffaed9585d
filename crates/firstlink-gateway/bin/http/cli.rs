use clap::{Parser, ValueEnum};
use firstlink_core::FirstVisitPolicy;
use firstlink_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "FIRSTLINK_LISTEN_ADDR";
pub const STORAGE_BACKEND_ENV: &str = "FIRSTLINK_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "FIRSTLINK_MYSQL_DSN";
pub const POLICY_ENV: &str = "FIRSTLINK_POLICY";
pub const PUBLIC_BASE_URL_ENV: &str = "FIRSTLINK_PUBLIC_BASE_URL";
pub const LOG_FORMAT_ENV: &str = "FIRSTLINK_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "firstlink-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    /// One of `global`, `atomic-global`, `per-visitor`.
    #[arg(long, env = POLICY_ENV, default_value_t = FirstVisitPolicy::PerVisitor)]
    pub policy: FirstVisitPolicy,

    /// Base for links returned by the admin API; derived from request
    /// headers when unset.
    #[arg(long, env = PUBLIC_BASE_URL_ENV)]
    pub public_base_url: Option<String>,

    /// One of `text`, `json`.
    #[arg(long, env = LOG_FORMAT_ENV, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}
