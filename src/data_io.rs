use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use std::path::Path;

use crate::error::FrontierError;
use crate::scorer::ScoredPortfolio;

/// Aligned price history, one column per asset.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    assets: Vec<String>,
    dates: Option<Vec<NaiveDate>>,
    //column-major: prices[asset][observation]
    prices: Vec<Vec<f64>>,
}

impl PriceTable {
    pub fn new(assets: Vec<String>, prices: Vec<Vec<f64>>) -> Result<Self, FrontierError> {
        if assets.len() != prices.len() {
            return Err(FrontierError::DimensionMismatch { expected: assets.len(), found: prices.len() });
        }
        let rows = prices.first().map(|c| c.len()).unwrap_or(0);
        for column in &prices {
            if column.len() != rows {
                return Err(FrontierError::DimensionMismatch { expected: rows, found: column.len() });
            }
        }
        Ok(Self { assets, dates: None, prices })
    }

    /// Attach a date index; it must match the row count and be strictly increasing.
    pub fn with_dates(mut self, dates: Vec<NaiveDate>) -> Result<Self, FrontierError> {
        if dates.len() != self.observations() {
            return Err(FrontierError::DimensionMismatch { expected: self.observations(), found: dates.len() });
        }
        if let Some(row) = dates.windows(2).position(|w| w[1] <= w[0]) {
            return Err(FrontierError::UnorderedObservations { row: row + 1 });
        }
        self.dates = Some(dates);
        Ok(self)
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn dates(&self) -> Option<&[NaiveDate]> {
        self.dates.as_deref()
    }

    pub fn column(&self, index: usize) -> &[f64] {
        &self.prices[index]
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.assets.iter().map(String::as_str).zip(self.prices.iter().map(Vec::as_slice))
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    pub fn observations(&self) -> usize {
        self.prices.first().map(|c| c.len()).unwrap_or(0)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .with_context(|| format!("unrecognized date '{}'", s))
}

/// Load a wide CSV: header row holds asset names, an optional leading `date` column
/// becomes the index.
pub fn load_price_table(path: &Path) -> Result<PriceTable> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening price file {}", path.display()))?;
    let headers = reader.headers()?.clone();

    let has_dates = headers.get(0).map(|h| h.trim().eq_ignore_ascii_case("date")).unwrap_or(false);
    let first_asset = usize::from(has_dates);
    let assets: Vec<String> = headers.iter().skip(first_asset).map(|h| h.trim().to_string()).collect();
    if assets.is_empty() {
        return Err(anyhow!("price file {} has no asset columns", path.display()));
    }

    let mut dates = Vec::new();
    let mut prices = vec![Vec::new(); assets.len()];

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        if has_dates {
            dates.push(parse_date(record.get(0).unwrap_or("").trim())?);
        }
        for (col, column) in prices.iter_mut().enumerate() {
            let cell = record
                .get(col + first_asset)
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .ok_or_else(|| anyhow!("missing price for '{}' at row {}", assets[col], row))?;
            let price: f64 = cell
                .parse()
                .with_context(|| format!("bad price '{}' for '{}' at row {}", cell, assets[col], row))?;
            column.push(price);
        }
    }

    let table = PriceTable::new(assets, prices)?;
    let table = if has_dates { table.with_dates(dates)? } else { table };
    log::info!(
        "loaded {} observations for {} assets from {}",
        table.observations(),
        table.asset_count(),
        path.display()
    );
    Ok(table)
}

/// Write scored portfolios: one weight column per asset, then expected_return, risk, sharpe.
pub fn write_portfolios(path: &Path, assets: &[String], rows: &[ScoredPortfolio]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header: Vec<&str> = assets.iter().map(String::as_str).collect();
    header.extend(["expected_return", "risk", "sharpe"]);
    writer.write_record(&header)?;

    for row in rows {
        let mut record: Vec<String> = row.weights.iter().map(|w| w.to_string()).collect();
        record.push(row.expected_return.to_string());
        record.push(row.risk.to_string());
        //undefined sharpe is written as an empty cell
        record.push(row.sharpe.map(|s| s.to_string()).unwrap_or_default());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
