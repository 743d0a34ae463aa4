//! Command-line flags.

use clap::Parser;
use gophermart_shared::ConfigOverrides;

/// Flags override configuration files and `GOPHERMART__*` variables; the bare
/// `RUN_ADDRESS`, `DATABASE_URI` and `ACCRUAL_SYSTEM_ADDRESS` variables
/// override the flags.
#[derive(Parser, Debug)]
#[command(name = "gophermart")]
#[command(about = "Loyalty points service", long_about = None)]
pub struct Args {
    /// Address and port to listen on.
    #[arg(short = 'a', value_name = "ADDR")]
    pub run_address: Option<String>,

    /// Database connection string.
    #[arg(short = 'd', value_name = "DSN")]
    pub database_uri: Option<String>,

    /// Base address of the accrual system.
    #[arg(short = 'r', value_name = "ADDR")]
    pub accrual_system_address: Option<String>,
}

impl Args {
    /// Converts the parsed flags into configuration overrides.
    pub fn into_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            run_address: self.run_address,
            database_uri: self.database_uri,
            accrual_system_address: self.accrual_system_address,
        }
    }
}
