//! Service configuration
//!
//! Every setting is a CLI flag with an environment-variable fallback. A
//! `.env` file in the working directory is loaded first, without overriding
//! variables already set.

use crate::service::AggregationStrategy;
use clap::{Parser, ValueEnum};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AppEnv {
    Development,
    Production,
    Test,
}

impl AppEnv {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppEnv::Development => "development",
            AppEnv::Production => "production",
            AppEnv::Test => "test",
        }
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            AppEnv::Development => "tvl_gateway=debug,tower_http=debug,info",
            AppEnv::Production => "info",
            AppEnv::Test => "off",
        }
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// tvl-gateway: TVL and liquidity queries over market records
#[derive(Parser, Debug, Clone)]
#[command(name = "tvl-gateway", version)]
pub struct Config {
    /// Deployment environment; selects the default log level
    #[arg(long, env = "APP_ENV", value_enum, default_value_t = AppEnv::Development)]
    pub app_env: AppEnv,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// SQLite database file holding the market table
    #[arg(long, env = "DATABASE_PATH", default_value = "tvl.db")]
    pub database_path: PathBuf,

    /// How aggregates are summed: in process or by the database
    #[arg(
        long,
        env = "AGGREGATION_STRATEGY",
        value_enum,
        default_value_t = AggregationStrategy::Delegate
    )]
    pub aggregation_strategy: AggregationStrategy,
}

impl Config {
    /// Load `.env`, then parse flags and environment
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self::parse()
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
