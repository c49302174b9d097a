use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use frontier::config::{load_config, save_config};
use frontier::data_io::{load_price_table, write_portfolios};
use frontier::plotting::{plot_frontier, save_png};
use frontier::{Annualization, FrontierConfig, FrontierPipeline, ScoredPortfolio};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AnnualizationArg {
    Compounded,
    Additive,
}

impl From<AnnualizationArg> for Annualization {
    fn from(arg: AnnualizationArg) -> Self {
        match arg {
            AnnualizationArg::Compounded => Annualization::Compounded,
            AnnualizationArg::Additive => Annualization::Additive,
        }
    }
}

/// Enumerate long-only portfolios over a price history and extract the efficient frontier.
#[derive(Debug, Parser)]
#[command(name = "frontier", version, about)]
struct Cli {
    /// Wide CSV of prices, one column per asset, optional leading date column
    prices: PathBuf,

    /// JSON configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    annualization: Option<AnnualizationArg>,

    /// Observations per year (250 for daily prices)
    #[arg(long)]
    periods_per_year: Option<f64>,

    /// Weight resolution, 100 means 1% steps
    #[arg(long)]
    steps: Option<u32>,

    /// Decimals used when grouping expected returns
    #[arg(long)]
    approximation_order: Option<u32>,

    /// Refuse to enumerate more weight vectors than this
    #[arg(long)]
    max_portfolios: Option<u64>,

    #[arg(long)]
    risk_free_rate: Option<f64>,

    /// Directory for portfolios.csv, efficient.csv and frontier.png
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Render frontier.png
    #[arg(long)]
    plot: bool,

    /// Write the effective configuration to this file
    #[arg(long)]
    save_config: Option<PathBuf>,
}

impl Cli {
    fn frontier_config(&self) -> Result<FrontierConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => FrontierConfig::default(),
        };

        if let Some(a) = self.annualization {
            config.annualization = a.into();
        }
        if let Some(p) = self.periods_per_year {
            config.periods_per_year = p;
        }
        if let Some(s) = self.steps {
            config.steps = s;
        }
        if let Some(o) = self.approximation_order {
            config.approximation_order = o;
        }
        if let Some(m) = self.max_portfolios {
            config.max_portfolios = m;
        }
        if let Some(r) = self.risk_free_rate {
            config.risk_free_rate = r;
        }

        config.validate()?;
        Ok(config)
    }
}

fn describe(assets: &[String], p: &ScoredPortfolio) -> String {
    let weights: Vec<String> = assets
        .iter()
        .zip(&p.weights)
        .map(|(a, w)| format!("{}={:.2}", a, w))
        .collect();
    let sharpe = p.sharpe.map_or_else(|| "undefined".to_string(), |s| format!("{:.3}", s));
    format!(
        "[{}] return {:.4} risk {:.4} sharpe {}",
        weights.join(" "),
        p.expected_return,
        p.risk,
        sharpe
    )
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.frontier_config()?;
    if let Some(path) = &cli.save_config {
        save_config(&config, path)?;
    }

    let prices = load_price_table(&cli.prices)?;
    let pipeline = FrontierPipeline::new(config)?;

    let start = Instant::now();
    let result = pipeline.run(&prices)?;
    log::info!("frontier computed in {:.2?}", start.elapsed());

    if let Some(p) = result.min_risk() {
        log::info!("minimum risk: {}", describe(result.assets(), p));
    }
    if let Some(p) = result.max_sharpe() {
        log::info!("maximum sharpe: {}", describe(result.assets(), p));
    }

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating output directory {}", cli.out_dir.display()))?;
    write_portfolios(&cli.out_dir.join("portfolios.csv"), result.assets(), &result.portfolios)?;
    write_portfolios(&cli.out_dir.join("efficient.csv"), result.assets(), &result.efficient)?;

    if cli.plot {
        let (buf, width, height) = plot_frontier(&result.portfolios, &result.efficient)?;
        let path = cli.out_dir.join("frontier.png");
        save_png(&path, &buf, width, height)?;
        log::info!("chart written to {}", path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
