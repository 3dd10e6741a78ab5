use crate::app::config::Config;
use crate::error::ConfigError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "eslip", version, about = "Tuition payment client for the e-slip backend")]
pub struct Cli {
    /// TOML config file; environment variables are used when absent
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides the API base URL
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask the backend for a fresh unique code
    Code,

    /// Show how an amount is rendered with a unique code
    Preview {
        #[arg(long)]
        amount: String,
        #[arg(long, default_value_t = 0)]
        code: u16,
    },

    /// Fill in and submit the payment form
    Pay {
        #[arg(long)]
        nama: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        nim: String,
        #[arg(long)]
        prodi: String,
        #[arg(long)]
        semester: String,
        #[arg(long)]
        amount: String,
    },

    /// Load a receipt from its page URL (or just `?id=...`)
    Receipt { page: String },

    /// Normalize and copy a bank account number
    Copy { text: String },
}

impl Cli {
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml_file(path)?,
            None => Config::from_env(),
        };

        if let Some(api_base) = &self.api_base {
            if url::Url::parse(api_base).is_err() {
                return Err(ConfigError::InvalidValue { key: "api_base", value: api_base.clone() });
            }
            config.api_base_url = api_base.clone();
        }

        Ok(config)
    }
}
