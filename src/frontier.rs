use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

use crate::error::{FrontierError, Result};
use crate::scorer::{ScoredPortfolio, min_risk_portfolio};

/// Bucket key: expected return rounded to `order` decimals, half-to-even.
///
/// Kept as a float so large returns never saturate into a shared key.
fn return_bucket(expected_return: f64, scale: f64) -> OrderedFloat<f64> {
    //+0.0 folds -0.0 into the same bucket as 0.0
    OrderedFloat((expected_return * scale).round_ties_even() + 0.0)
}

/// Reduce a scored table to its efficient frontier.
///
/// Rows below the return of the minimum-risk portfolio are dropped, the rest are
/// grouped by expected return rounded to `approximation_order` decimals and only
/// the minimum-risk rows of each group survive. Groups dominated by a
/// higher-return group with no more risk are dropped as well. Every row matching
/// a surviving (group, risk) pair is kept, in input order.
pub fn efficient_frontier(portfolios: &[ScoredPortfolio], approximation_order: u32) -> Result<Vec<ScoredPortfolio>> {
    let anchor = min_risk_portfolio(portfolios)
        .ok_or_else(|| FrontierError::InsufficientData("no portfolios to extract a frontier from".to_string()))?;
    let er_floor = anchor.expected_return;

    let scale = 10f64.powi(approximation_order as i32);
    let candidates: Vec<(OrderedFloat<f64>, &ScoredPortfolio)> = portfolios
        .iter()
        .filter(|p| p.expected_return >= er_floor)
        .map(|p| (return_bucket(p.expected_return, scale), p))
        .collect();

    let mut bucket_risk: BTreeMap<OrderedFloat<f64>, f64> = BTreeMap::new();
    for &(bucket, p) in &candidates {
        bucket_risk
            .entry(bucket)
            .and_modify(|risk| *risk = risk.min(p.risk))
            .or_insert(p.risk);
    }

    //walk from the highest bucket down, a bucket survives only if it is
    //strictly less risky than everything above it
    let mut ceiling = f64::INFINITY;
    let mut dominated = Vec::new();
    for (&bucket, &risk) in bucket_risk.iter().rev() {
        if risk < ceiling {
            ceiling = risk;
        } else {
            dominated.push(bucket);
        }
    }
    for bucket in &dominated {
        bucket_risk.remove(bucket);
    }

    let efficient: Vec<ScoredPortfolio> = candidates
        .into_iter()
        .filter(|(bucket, p)| bucket_risk.get(bucket).is_some_and(|&risk| risk == p.risk))
        .map(|(_, p)| p.clone())
        .collect();

    log::debug!(
        "frontier: {} of {} portfolios efficient ({} dominated buckets)",
        efficient.len(),
        portfolios.len(),
        dominated.len()
    );
    Ok(efficient)
}
