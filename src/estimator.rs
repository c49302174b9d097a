use nalgebra::{DMatrix, DVector};
use statrs::statistics::{Data, Distribution};

use crate::config::Annualization;
use crate::data_io::PriceTable;
use crate::error::{FrontierError, Result};

/// Annualized per-asset expected returns and the asset covariance matrix.
///
/// Row/column `i` of `covariance` belongs to `assets[i]` and `expected_returns[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetStats {
    pub assets: Vec<String>,
    pub expected_returns: DVector<f64>,
    pub covariance: DMatrix<f64>,
}

impl AssetStats {
    pub fn new(assets: Vec<String>, expected_returns: Vec<f64>, covariance: DMatrix<f64>) -> Result<Self> {
        let n = assets.len();
        if expected_returns.len() != n {
            return Err(FrontierError::DimensionMismatch { expected: n, found: expected_returns.len() });
        }
        if covariance.nrows() != n || covariance.ncols() != n {
            return Err(FrontierError::DimensionMismatch { expected: n * n, found: covariance.len() });
        }
        Ok(Self { assets, expected_returns: DVector::from_vec(expected_returns), covariance })
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Annualized variance of a single asset.
    pub fn variance(&self, index: usize) -> f64 {
        self.covariance[(index, index)]
    }
}

/// Log returns `ln(p_t / p_{t-1})`; every price has to be strictly positive.
pub fn log_returns(asset: &str, prices: &[f64]) -> Result<Vec<f64>> {
    if let Some((row, &price)) = prices.iter().enumerate().find(|(_, p)| !(**p > 0.0 && p.is_finite())) {
        return Err(FrontierError::NonPositivePrice { asset: asset.to_string(), row, price });
    }

    Ok(prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect())
}

/// Derive expected returns and the covariance matrix from a price history.
pub fn estimate(table: &PriceTable, annualization: Annualization, periods_per_year: f64) -> Result<AssetStats> {
    let n_assets = table.asset_count();
    if n_assets == 0 {
        return Err(FrontierError::InsufficientData("price table has no assets".to_string()));
    }

    //prices are checked before the length so a bad price is always reported as such
    let mut per_asset = Vec::with_capacity(n_assets);
    for (asset, prices) in table.columns() {
        per_asset.push(log_returns(asset, prices)?);
    }

    //T returns from T+1 prices, the first observation only serves as a denominator
    let periods = table.observations().saturating_sub(1);
    if periods < 2 {
        return Err(FrontierError::InsufficientData(format!(
            "need at least 2 returns (3 prices) per asset, got {}",
            periods
        )));
    }

    let mut expected_returns = Vec::with_capacity(n_assets);
    let mut stacked = Vec::with_capacity(n_assets * periods);

    for returns in per_asset {
        let mean = Data::new(returns.clone()).mean().unwrap_or(0.0);
        expected_returns.push(annualization.annualize(mean, periods_per_year));
        stacked.extend(returns);
    }

    let returns = DMatrix::from_row_slice(n_assets, periods, &stacked);
    let covariance = sample_covariance(&returns)? * periods_per_year;

    log::debug!("estimated stats for {} assets over {} periods", n_assets, periods);

    AssetStats::new(table.assets().to_vec(), expected_returns, covariance)
}

/// Unbiased covariance of the rows of an N x T matrix (one variable per row).
pub fn sample_covariance(returns: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let periods = returns.ncols();
    if periods < 2 {
        return Err(FrontierError::InsufficientData(format!(
            "covariance needs at least 2 observations, got {}",
            periods
        )));
    }
    let means = returns.column_mean();

    let mut centered = returns.clone();
    for mut column in centered.column_iter_mut() {
        column -= &means;
    }

    let mut cov = &centered * centered.transpose() / (periods as f64 - 1.0);
    //symmetrize to remove rounding asymmetry from the product
    let transposed = cov.transpose();
    cov += transposed;
    Ok(cov / 2.0)
}
