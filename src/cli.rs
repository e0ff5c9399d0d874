use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "replication-cost", version, about = "Replication / DR cost calculator")]
pub struct Cli {
    /// Configuration file path (defaults to ./replication-cost.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides config)
    #[arg(long, global = true, env = "REPLCOST_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Current role (overrides config)
    #[arg(long, global = true)]
    pub role: Option<String>,

    /// Current region identifier, e.g. AWS_US_EAST_1 (overrides config)
    #[arg(long, global = true)]
    pub region: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Estimate replication cost for selected databases
    Estimate(EstimateArgs),

    /// Database size metadata
    Databases {
        #[command(subcommand)]
        action: DatabaseCommands,
    },

    /// Pricing table
    Pricing {
        #[command(subcommand)]
        action: PricingCommands,
    },

    /// Lowest-cost destination regions by summed rate
    Regions {
        /// Service types to sum (repeatable); defaults to storage and serverless maintenance
        #[arg(short, long = "service")]
        services: Vec<String>,
    },

    /// Destination cloud/region options
    Destinations,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Args, Debug, Clone)]
pub struct EstimateArgs {
    /// Database to include (repeatable)
    #[arg(short, long = "db")]
    pub databases: Vec<String>,

    /// Destination cloud (inferred from the region when omitted)
    #[arg(long)]
    pub dest_cloud: Option<String>,

    /// Destination region
    #[arg(long)]
    pub dest_region: Option<String>,

    /// Daily change rate in percent (0-20, step 0.5)
    #[arg(long, default_value = "5.0")]
    pub change_pct: f64,

    /// Refreshes per day (0-24, step 0.5)
    #[arg(long, default_value = "1.0")]
    pub refreshes: f64,

    /// Price per credit in USD (0.50-10.00); defaults to config
    #[arg(long)]
    pub price_per_credit: Option<f64>,

    /// Write the estimate as CSV to this path
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Print the estimate as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DatabaseCommands {
    /// List databases and sizes
    List,
    /// Replace metadata from a DATABASE_NAME,SIZE_TB[,AS_OF] CSV
    Import { file: PathBuf },
}

#[derive(Subcommand, Debug, Clone)]
pub enum PricingCommands {
    /// Show current rates and refresh time
    Show,
    /// Reload rates now, seeding estimated defaults into an empty table
    Refresh,
    /// Write the pricing table as an editable CSV grid
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace the pricing table from an edited CSV grid (admin roles only)
    Save { file: PathBuf },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
}
