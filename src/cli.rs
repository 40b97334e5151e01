use std::path::PathBuf;

use clap::Parser;

use crate::model::Period;

/// Download stock data and show moving averages.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Ticker symbol (e.g. AAPL, TCS.NS)
    pub ticker: String,

    /// History range to request (e.g. 1y, 6mo, 3mo)
    #[arg(long, default_value = "1y")]
    pub period: Period,

    /// Path to save the plot (PNG or SVG, chosen by extension)
    #[arg(long, value_name = "PATH")]
    pub save_fig: Option<PathBuf>,

    /// Path to save the downloaded data as CSV
    #[arg(long, value_name = "PATH")]
    pub save_csv: Option<PathBuf>,

    /// Do not display the plot
    #[arg(long)]
    pub no_show: bool,
}
