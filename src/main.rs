use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use crosswatch::provider::{QuoteProvider, YahooProvider};
use crosswatch::{analyzer, chart, cli, export, report};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args = cli::Cli::parse();

    let provider = YahooProvider::new();
    info!(
        "Fetching {} (period: {})...",
        args.ticker,
        args.period.as_str()
    );
    let series = match provider.fetch(&args.ticker, args.period).await {
        Ok(series) => series,
        Err(e) => {
            error!("Download failed: {e}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    info!("Fetched {} bars for {}", series.len(), series.symbol);

    let indicators = analyzer::indicators::compute(&series);
    let crossovers = analyzer::crossover::detect(
        &series.timestamps(),
        &indicators.ma_short,
        &indicators.ma_long,
    );
    info!("Found {} crossover(s)", crossovers.len());

    println!("{}", report::render(&series, &indicators, &args.ticker));

    if let Some(path) = &args.save_csv {
        if let Err(e) = export::write_csv(path, &series, &indicators) {
            error!("CSV export failed: {e}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        println!("Saved data to {}", path.display());
    }

    // Render only when the chart goes somewhere: a file, a viewer, or both.
    let show = !args.no_show;
    if args.save_fig.is_some() || show {
        let fig_path = args.save_fig.clone().unwrap_or_else(|| temp_fig_path(&args.ticker));
        if let Err(e) = chart::render(&series, &indicators, &crossovers, &args.ticker, &fig_path) {
            error!("Chart rendering failed: {e}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        if args.save_fig.is_some() {
            println!("Saved figure to {}", fig_path.display());
        }
        if show {
            chart::show(&fig_path);
        }
    }
}

fn temp_fig_path(ticker: &str) -> PathBuf {
    let safe: String = ticker
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    std::env::temp_dir().join(format!("crosswatch-{safe}.png"))
}
