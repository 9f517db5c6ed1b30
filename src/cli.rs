use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "sitefinder")]
#[command(about = "Resolve entity names to their most probable official website")]
#[command(version)]
pub struct Cli {
    /// Input CSV containing entity names (required unless --init-config)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<String>,

    /// Column holding entity names
    #[arg(long, default_value = "entity_name", value_name = "COLUMN")]
    pub name_col: String,

    /// Column holding the location hint
    #[arg(long, default_value = "area_code", value_name = "COLUMN")]
    pub location_col: String,

    /// Output directory for result files
    #[arg(short, long, default_value = "results", value_name = "DIR")]
    pub out: String,

    /// Resolve only the first N rows (0 = all)
    #[arg(short, long, default_value = "0", value_name = "N")]
    pub limit: usize,

    /// Output format: 'csv' (default) or 'json'
    #[arg(short = 'f', long, default_value = "csv")]
    pub format: String,

    /// Google Programmable Search API key (overrides config file)
    #[arg(long, env = "GOOGLE_API_KEY", value_name = "KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Programmable Search engine id (overrides config file)
    #[arg(long, env = "GOOGLE_CX", value_name = "ID", hide_env_values = true)]
    pub cx: Option<String>,

    /// Seconds to sleep between entities, only applied when search
    /// credentials are configured (overrides config)
    #[arg(long, value_name = "SECONDS")]
    pub sleep: Option<f64>,

    /// Liveness probe timeout in seconds (overrides config)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Comma-separated TLDs to try when guessing domains (overrides config)
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub tlds: Option<Vec<String>>,

    /// Path to a configuration file (default: ./config/sitefinder.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,

    /// Create default configuration file at ./config/sitefinder.toml and exit
    #[arg(long)]
    pub init_config: bool,

    /// Verbose logging (use -v for per-entity lines, -vv for candidate probes)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress everything except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    pub fn validate(&self) -> Result<(), String> {
        if !self.init_config {
            match &self.input {
                None => {
                    return Err(
                        "Input file is required (use --input, or --init-config to write a config template)"
                            .to_string(),
                    )
                }
                Some(path) if path.is_empty() => {
                    return Err("Input file cannot be empty".to_string())
                }
                _ => {}
            }
        }

        if !["csv", "json"].contains(&self.format.as_str()) {
            return Err("Output format must be 'csv' or 'json'".to_string());
        }

        if let Some(sleep) = self.sleep {
            if !sleep.is_finite() || sleep < 0.0 {
                return Err("Sleep must be a non-negative number of seconds".to_string());
            }
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be greater than 0".to_string());
        }

        if let Some(tlds) = &self.tlds {
            if tlds.iter().any(|t| t.trim().is_empty()) {
                return Err("TLD list entries cannot be empty".to_string());
            }
        }

        Ok(())
    }
}
