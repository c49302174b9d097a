use crate::config::FrontierConfig;
use crate::data_io::PriceTable;
use crate::error::{FrontierError, Result};
use crate::estimator::{AssetStats, estimate};
use crate::frontier::efficient_frontier;
use crate::scorer::{ScoredPortfolio, max_sharpe_portfolio, min_risk_portfolio, score_all};
use crate::weights::{WeightVector, enumerate_weights};

/// Everything produced by one pass over a price table.
#[derive(Debug, Clone)]
pub struct FrontierRun {
    pub stats: AssetStats,
    pub portfolios: Vec<ScoredPortfolio>,
    pub efficient: Vec<ScoredPortfolio>,
}

impl FrontierRun {
    pub fn assets(&self) -> &[String] {
        &self.stats.assets
    }

    pub fn min_risk(&self) -> Option<&ScoredPortfolio> {
        min_risk_portfolio(&self.efficient)
    }

    pub fn max_sharpe(&self) -> Option<&ScoredPortfolio> {
        max_sharpe_portfolio(&self.portfolios)
    }
}

/// Estimator, enumerator, scorer and extractor bound to one configuration.
#[derive(Clone, Debug)]
pub struct FrontierPipeline {
    config: FrontierConfig,
}

impl FrontierPipeline {
    pub fn new(config: FrontierConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FrontierConfig {
        &self.config
    }

    pub fn estimate(&self, prices: &PriceTable) -> Result<AssetStats> {
        estimate(prices, self.config.annualization, self.config.periods_per_year)
    }

    pub fn enumerate(&self, assets: usize) -> Result<Vec<WeightVector>> {
        enumerate_weights(assets, self.config.steps, self.config.max_portfolios)
    }

    pub fn score(&self, stats: &AssetStats, weights: &[WeightVector]) -> Result<Vec<ScoredPortfolio>> {
        score_all(stats, weights, self.config.risk_free_rate)
    }

    pub fn extract(&self, portfolios: &[ScoredPortfolio]) -> Result<Vec<ScoredPortfolio>> {
        efficient_frontier(portfolios, self.config.approximation_order)
    }

    /// Run all four stages over a price table.
    pub fn run(&self, prices: &PriceTable) -> Result<FrontierRun> {
        if prices.asset_count() < 2 {
            return Err(FrontierError::InvalidAssetCount {
                assets: prices.asset_count(),
                reason: "at least 2 assets are needed for a frontier".to_string(),
            });
        }

        let stats = self.estimate(prices)?;
        let weights = self.enumerate(stats.asset_count())?;
        let portfolios = self.score(&stats, &weights)?;
        let efficient = self.extract(&portfolios)?;

        log::info!(
            "{} assets, {} portfolios scored, {} on the efficient frontier",
            stats.asset_count(),
            portfolios.len(),
            efficient.len()
        );

        Ok(FrontierRun { stats, portfolios, efficient })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Annualization;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal};

    fn gbm_table(params: &[(f64, f64)], steps: usize) -> PriceTable {
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut columns = Vec::new();
        for (i, &(mu, sigma)) in params.iter().enumerate() {
            let mut rng = StdRng::seed_from_u64(42 + i as u64);
            let mut price = 50.0;
            let mut path = vec![price];
            for _ in 0..steps {
                price *= (mu - 0.5 * sigma * sigma + sigma * normal.sample(&mut rng)).exp();
                path.push(price);
            }
            columns.push(path);
        }
        let names = (0..params.len()).map(|i| format!("S{}", i)).collect();
        PriceTable::new(names, columns).unwrap()
    }

    #[test]
    fn runs_end_to_end() {
        let _ = env_logger::builder().is_test(true).try_init();
        let pipeline = FrontierPipeline::new(FrontierConfig { steps: 20, ..FrontierConfig::default() }).unwrap();
        let prices = gbm_table(&[(0.0005, 0.01), (0.0003, 0.02), (0.0008, 0.015)], 250);

        let run = pipeline.run(&prices).unwrap();
        assert_eq!(run.assets(), prices.assets());
        assert_eq!(run.portfolios.len(), 231);
        assert!(!run.efficient.is_empty());
        assert!(run.efficient.iter().all(|p| run.portfolios.contains(p)));
        assert!(run.portfolios.iter().all(|p| p.risk >= 0.0));

        let min = run.min_risk().unwrap();
        let global = min_risk_portfolio(&run.portfolios).unwrap();
        assert_eq!(min, global);
        assert!(run.max_sharpe().is_some());

        assert_eq!(pipeline.extract(&run.efficient).unwrap(), run.efficient);
        assert_risk_rises_with_return(&run.efficient);
    }

    fn assert_risk_rises_with_return(frontier: &[ScoredPortfolio]) {
        let mut sorted = frontier.to_vec();
        sorted.sort_by(|a, b| a.expected_return.total_cmp(&b.expected_return));
        for pair in sorted.windows(2) {
            assert!(pair[1].risk >= pair[0].risk, "{:?} then {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn simulated_histories_give_monotone_frontiers() {
        let pipeline = FrontierPipeline::new(FrontierConfig { steps: 25, ..FrontierConfig::default() }).unwrap();
        for seed_shift in 0..5u64 {
            let sigma = 0.01 + 0.002 * seed_shift as f64;
            let prices = gbm_table(&[(0.0004, sigma), (0.0002, 0.02), (0.0006, 0.015), (0.0001, 0.008)], 120 + 20 * seed_shift as usize);
            let run = pipeline.run(&prices).unwrap();
            assert!(!run.efficient.is_empty());
            assert_risk_rises_with_return(&run.efficient);
            assert_eq!(pipeline.extract(&run.efficient).unwrap(), run.efficient);
        }
    }

    #[test]
    fn stages_are_callable_on_their_own() {
        let pipeline = FrontierPipeline::new(FrontierConfig {
            annualization: Annualization::Additive,
            steps: 10,
            ..FrontierConfig::default()
        })
        .unwrap();
        let prices = gbm_table(&[(0.0004, 0.012), (0.0001, 0.008)], 60);

        let stats = pipeline.estimate(&prices).unwrap();
        let weights = pipeline.enumerate(2).unwrap();
        assert_eq!(weights.len(), 11);
        let scored = pipeline.score(&stats, &weights).unwrap();
        let frontier = pipeline.extract(&scored).unwrap();
        assert!(frontier.len() <= scored.len());
    }

    #[test]
    fn rejects_single_asset_and_bad_config() {
        let pipeline = FrontierPipeline::new(FrontierConfig::default()).unwrap();
        let prices = gbm_table(&[(0.0004, 0.012)], 10);
        assert!(matches!(pipeline.run(&prices), Err(FrontierError::InvalidAssetCount { assets: 1, .. })));

        let bad = FrontierPipeline::new(FrontierConfig { steps: 0, ..FrontierConfig::default() });
        assert!(matches!(bad, Err(FrontierError::InvalidConfig(_))));
    }

    #[test]
    fn oversized_lattice_fails_before_enumeration() {
        let pipeline = FrontierPipeline::new(FrontierConfig { max_portfolios: 1_000, ..FrontierConfig::default() }).unwrap();
        let prices = gbm_table(&[(0.0004, 0.012), (0.0001, 0.008), (0.0002, 0.01)], 30);
        assert!(matches!(pipeline.run(&prices), Err(FrontierError::InvalidAssetCount { assets: 3, .. })));
    }

    #[test]
    fn constant_asset_in_isolation() {
        let pipeline = FrontierPipeline::new(FrontierConfig { steps: 4, ..FrontierConfig::default() }).unwrap();
        let prices = PriceTable::new(
            vec!["FLAT".into(), "MOVER".into()],
            vec![vec![10.0, 10.0, 10.0, 10.0], vec![10.0, 11.0, 10.5, 12.0]],
        )
        .unwrap();

        let run = pipeline.run(&prices).unwrap();
        assert_eq!(run.stats.expected_returns[0], 0.0);
        assert_eq!(run.stats.variance(0), 0.0);

        let flat = run.portfolios.iter().find(|p| p.weights == vec![1.0, 0.0]).unwrap();
        assert_eq!(flat.risk, 0.0);
        assert_eq!(flat.sharpe, None);
        assert_eq!(flat.strict_sharpe(), Err(FrontierError::DegenerateRisk));
    }
}
