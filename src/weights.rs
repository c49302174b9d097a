use crate::error::{FrontierError, Result};

/// Portfolio weights on a `1/steps` lattice.
///
/// `units` are the integer parts that sum exactly to `steps`; `fractions` is
/// `units / steps` and is what the scorer consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightVector {
    pub units: Vec<u32>,
    pub fractions: Vec<f64>,
}

impl WeightVector {
    pub fn from_units(units: Vec<u32>, steps: u32) -> Self {
        let fractions = units.iter().map(|&u| u as f64 / steps as f64).collect();
        Self { units, fractions }
    }

    pub fn len(&self) -> usize {
        self.fractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }
}

/// Number of ordered compositions of `steps` into `assets` non-negative parts,
/// `C(steps + assets - 1, assets - 1)`, or `None` on overflow.
pub fn composition_count(steps: u32, assets: usize) -> Option<u128> {
    if assets == 0 {
        return Some(0);
    }
    let k = (assets - 1) as u128;
    let n = steps as u128 + k;
    //multiplicative form keeps every intermediate value an exact binomial
    let mut count: u128 = 1;
    for i in 1..=k {
        count = count.checked_mul(n - k + i)? / i;
    }
    Some(count)
}

/// Iterates over all compositions of `steps` into `parts` non-negative integers,
/// from `[steps, 0, .., 0]` down to `[0, .., 0, steps]`.
#[derive(Debug, Clone)]
pub struct Compositions {
    current: Vec<u32>,
    done: bool,
}

impl Compositions {
    pub fn new(steps: u32, parts: usize) -> Self {
        let mut current = vec![0; parts];
        if let Some(first) = current.first_mut() {
            *first = steps;
        }
        Self { current, done: parts == 0 }
    }

    fn advance(&mut self) {
        let last = self.current.len() - 1;
        //rightmost non-zero part left of the last slot moves one unit right,
        //and everything piled in the last slot joins it
        match self.current[..last].iter().rposition(|&u| u > 0) {
            Some(j) => {
                let tail = self.current[last];
                self.current[last] = 0;
                self.current[j] -= 1;
                self.current[j + 1] = tail + 1;
            }
            None => self.done = true,
        }
    }
}

impl Iterator for Compositions {
    type Item = Vec<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.current.clone();
        self.advance();
        Some(item)
    }
}

/// Every weight vector for `assets` assets at `1/steps` resolution.
///
/// Fails before allocating anything when the lattice would exceed `max_portfolios`.
pub fn enumerate_weights(assets: usize, steps: u32, max_portfolios: u64) -> Result<Vec<WeightVector>> {
    if assets < 2 {
        return Err(FrontierError::InvalidAssetCount {
            assets,
            reason: "at least 2 assets are needed for a frontier".to_string(),
        });
    }
    if steps == 0 {
        return Err(FrontierError::InvalidConfig("steps must be greater than 0".to_string()));
    }

    let count = composition_count(steps, assets)
        .filter(|&c| c <= max_portfolios as u128)
        .ok_or_else(|| FrontierError::InvalidAssetCount {
            assets,
            reason: format!(
                "{} weight vectors at {} steps exceeds the limit of {}",
                composition_count(steps, assets).map_or_else(|| "too many".to_string(), |c| c.to_string()),
                steps,
                max_portfolios
            ),
        })?;

    log::debug!("enumerating {} weight vectors for {} assets", count, assets);

    let mut weights = Vec::with_capacity(count as usize);
    weights.extend(Compositions::new(steps, assets).map(|units| WeightVector::from_units(units, steps)));
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn composition_counts() {
        assert_eq!(composition_count(100, 2), Some(101));
        assert_eq!(composition_count(100, 3), Some(5_151));
        assert_eq!(composition_count(100, 4), Some(176_851));
        assert_eq!(composition_count(10, 1), Some(1));
        assert_eq!(composition_count(u32::MAX, 40), None);
    }

    #[test]
    fn small_lattice_in_order() {
        let all: Vec<Vec<u32>> = Compositions::new(2, 2).collect();
        assert_eq!(all, vec![vec![2, 0], vec![1, 1], vec![0, 2]]);

        let all: Vec<Vec<u32>> = Compositions::new(1, 3).collect();
        assert_eq!(all, vec![vec![1, 0, 0], vec![0, 1, 0], vec![0, 0, 1]]);
    }

    #[test]
    fn exhaustive_and_unique() {
        for (assets, steps) in [(2, 100), (3, 100), (4, 20), (5, 10)] {
            let weights = enumerate_weights(assets, steps, 1_000_000).unwrap();
            assert_eq!(weights.len() as u128, composition_count(steps, assets).unwrap());

            let unique: HashSet<&Vec<u32>> = weights.iter().map(|w| &w.units).collect();
            assert_eq!(unique.len(), weights.len());

            for w in &weights {
                assert_eq!(w.len(), assets);
                assert_eq!(w.units.iter().sum::<u32>(), steps);
                assert!((w.fractions.iter().sum::<f64>() - 1.0).abs() < 1e-9);
                assert!(w.fractions.iter().all(|&f| f >= 0.0));
            }
        }
    }

    #[test]
    fn one_percent_steps() {
        let weights = enumerate_weights(2, 100, 1_000).unwrap();
        assert_eq!(weights.len(), 101);
        assert_eq!(weights[0].fractions, vec![1.0, 0.0]);
        assert_eq!(weights[100].fractions, vec![0.0, 1.0]);
        assert_eq!(weights[31].units, vec![69, 31]);
    }

    #[test]
    fn rejects_single_asset_and_oversized_lattice() {
        assert!(matches!(
            enumerate_weights(1, 100, 1_000),
            Err(FrontierError::InvalidAssetCount { assets: 1, .. })
        ));
        assert!(matches!(
            enumerate_weights(4, 100, 100_000),
            Err(FrontierError::InvalidAssetCount { assets: 4, .. })
        ));
        assert!(enumerate_weights(4, 100, 176_851).is_ok());
    }
}
