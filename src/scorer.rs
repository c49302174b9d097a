use nalgebra::DVector;
use rayon::prelude::*;

use crate::estimator::AssetStats;
use crate::error::{FrontierError, Result};
use crate::weights::WeightVector;

/// A weight vector together with its expected return, risk and Sharpe ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPortfolio {
    pub weights: Vec<f64>,
    pub expected_return: f64,
    pub risk: f64,
    /// `None` when risk is zero.
    pub sharpe: Option<f64>,
}

impl ScoredPortfolio {
    /// Sharpe ratio, failing instead of returning the undefined sentinel.
    pub fn strict_sharpe(&self) -> Result<f64> {
        self.sharpe.ok_or(FrontierError::DegenerateRisk)
    }
}

/// Score one weight vector against the asset statistics.
pub fn score_portfolio(stats: &AssetStats, weights: &[f64], risk_free_rate: f64) -> Result<ScoredPortfolio> {
    let n = stats.asset_count();
    if weights.len() != n {
        return Err(FrontierError::DimensionMismatch { expected: n, found: weights.len() });
    }

    let w = DVector::from_column_slice(weights);
    let expected_return = w.dot(&stats.expected_returns);
    //w' C w can dip below zero through rounding only
    let variance = w.dot(&(&stats.covariance * &w)).max(0.0);
    let risk = variance.sqrt();

    let sharpe = if risk > 0.0 {
        Some((expected_return - risk_free_rate) / risk)
    } else {
        None
    };

    Ok(ScoredPortfolio { weights: weights.to_vec(), expected_return, risk, sharpe })
}

/// Score every weight vector in parallel; output order follows the input.
pub fn score_all(stats: &AssetStats, weights: &[WeightVector], risk_free_rate: f64) -> Result<Vec<ScoredPortfolio>> {
    let scored: Vec<ScoredPortfolio> = weights
        .par_iter()
        .map(|w| score_portfolio(stats, &w.fractions, risk_free_rate))
        .collect::<Result<_>>()?;

    log::debug!("scored {} portfolios", scored.len());
    Ok(scored)
}

/// The lowest-risk portfolio; among equal-risk rows the highest expected return wins.
pub fn min_risk_portfolio(portfolios: &[ScoredPortfolio]) -> Option<&ScoredPortfolio> {
    portfolios.iter().reduce(|best, p| {
        if p.risk < best.risk || (p.risk == best.risk && p.expected_return > best.expected_return) {
            p
        } else {
            best
        }
    })
}

/// The portfolio with the highest defined Sharpe ratio (first one on ties).
pub fn max_sharpe_portfolio(portfolios: &[ScoredPortfolio]) -> Option<&ScoredPortfolio> {
    portfolios
        .iter()
        .filter_map(|p| p.sharpe.map(|s| (s, p)))
        .reduce(|best, cur| if cur.0 > best.0 { cur } else { best })
        .map(|(_, p)| p)
}
