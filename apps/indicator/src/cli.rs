use std::path::PathBuf;

use clap::Parser;

use crate::config::DEFAULT_CONFIG_PATH;

/// Indicator to view and control migasfree client actions.
#[derive(Debug, Parser)]
#[command(name = "migasfree-indicator", version, about, long_about = None)]
pub struct Cli {
    /// Use the forced upgrade command for scheduled runs.
    #[arg(short = 'a', long)]
    pub force_upgrade: bool,

    /// Hours between scheduled upgrades.
    #[arg(short, long, value_name = "HOURS")]
    pub interval: Option<u64>,

    /// Support URL offered in the menu.
    #[arg(short, long, value_name = "URL")]
    pub support: Option<String>,

    /// Configuration file.
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}
