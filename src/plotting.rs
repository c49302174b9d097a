use anyhow::Result;
use image::{ImageEncoder, codecs::png::PngEncoder};
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use plotters_bitmap::bitmap_pixel::RGBPixel;
use std::fs::File;
use std::path::Path;

use crate::scorer::ScoredPortfolio;

const CHART_WIDTH: u32 = 1200;
const CHART_HEIGHT: u32 = 800;

fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if max > min { (max - min) * 0.05 } else { 0.01 };
    (min - pad, max + pad)
}

//blue for the lowest sharpe through red for the highest
fn sharpe_color(sharpe: Option<f64>, lo: f64, hi: f64) -> HSLColor {
    match sharpe {
        Some(s) if hi > lo => HSLColor(0.66 * (1.0 - (s - lo) / (hi - lo)), 0.85, 0.5),
        Some(_) => HSLColor(0.33, 0.85, 0.5),
        None => HSLColor(0.0, 0.0, 0.6),
    }
}

/// Scatter every portfolio in (risk, return) space colored by Sharpe ratio and
/// draw the efficient frontier on top. Returns a raw RGB buffer.
pub fn plot_frontier(portfolios: &[ScoredPortfolio], efficient: &[ScoredPortfolio]) -> Result<(Vec<u8>, u32, u32)> {
    let mut buf = vec![0; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let backend = BitMapBackend::<RGBPixel>::with_buffer_and_format(&mut buf, (CHART_WIDTH, CHART_HEIGHT))?;
        let root = backend.into_drawing_area();
        root.fill(&RGBColor(30, 30, 46))?;

        if !portfolios.is_empty() {
            let (min_risk, max_risk) = padded_range(portfolios.iter().map(|p| p.risk));
            let (min_er, max_er) = padded_range(portfolios.iter().map(|p| p.expected_return));
            let (lo_sharpe, hi_sharpe) = portfolios
                .iter()
                .filter_map(|p| p.sharpe)
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| (lo.min(s), hi.max(s)));

            let mut chart = ChartBuilder::on(&root)
                .caption("Efficient Frontier", ("sans-serif", 30, &RGBColor(208, 208, 208)))
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d(min_risk..max_risk, min_er..max_er)?;

            chart
                .configure_mesh()
                .x_desc("Portfolio Volatility")
                .y_desc("Portfolio Expected Return")
                .axis_style(&RGBColor(208, 208, 208))
                .label_style(("sans-serif", 15, &RGBColor(208, 208, 208)))
                .draw()?;

            chart.draw_series(portfolios.iter().map(|p| {
                Circle::new((p.risk, p.expected_return), 2, sharpe_color(p.sharpe, lo_sharpe, hi_sharpe).filled())
            }))?;

            let mut line: Vec<(f64, f64)> = efficient.iter().map(|p| (p.risk, p.expected_return)).collect();
            line.sort_by(|a, b| a.1.total_cmp(&b.1));
            chart.draw_series(LineSeries::new(line, RGBColor(128, 128, 128).stroke_width(3)))?;
        }

        root.present()?;
    }

    Ok((buf, CHART_WIDTH, CHART_HEIGHT))
}

//encode from rgb<u8> to png
pub fn save_png(path: &Path, buf: &[u8], width: u32, height: u32) -> Result<()> {
    let file = File::create(path)?;
    let encoder = PngEncoder::new(file);
    encoder.write_image(buf, width, height, image::ColorType::Rgb8.into())?;
    Ok(())
}
