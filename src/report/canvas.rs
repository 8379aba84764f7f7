use std::io::Write;

use crate::error::Result;
use crate::history::{History, Series};

/// A plot requested by configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotSpec {
    /// Line series for the named parameters, drawn on one shared scale.
    Plot(Vec<String>),
    /// Every parameter in the history, each on its own scale.
    Summary,
}

/// Drawing surface for `Logger::plot`.
pub trait Canvas {
    fn draw_plot(&mut self, series: &[&Series]) -> Result<()>;
    fn draw_summary(&mut self, history: &History) -> Result<()>;
}

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Renders series as one-line sparklines with last/min/max columns.
pub struct TextCanvas<W: Write> {
    out: W,
    width: usize,
}

impl<W: Write> TextCanvas<W> {
    pub fn new(out: W, width: usize) -> Self {
        TextCanvas { out, width: width.max(1) }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw_line(&mut self, series: &Series, lo: f64, hi: f64) -> Result<()> {
        let points = downsample(series.data(), self.width);
        let spark = sparkline(&points, lo, hi);
        let last = series.last().map_or(f64::NAN, |(_, v)| v);
        writeln!(
            self.out,
            "{:<16} {:<width$} last {:>9.4}  min {:>9.4}  max {:>9.4}",
            series.name,
            spark,
            last,
            lo,
            hi,
            width = self.width
        )?;
        Ok(())
    }
}

impl<W: Write> Canvas for TextCanvas<W> {
    fn draw_plot(&mut self, series: &[&Series]) -> Result<()> {
        let (lo, hi) = bounds(series.iter().flat_map(|s| s.data().iter().copied()));
        for s in series {
            self.draw_line(s, lo, hi)?;
        }
        Ok(())
    }

    fn draw_summary(&mut self, history: &History) -> Result<()> {
        for s in history.iter() {
            let (lo, hi) = bounds(s.data().iter().copied());
            self.draw_line(s, lo, hi)?;
        }
        Ok(())
    }
}

/// Min and max over the finite values; NaN when there are none.
fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values
        .filter(|v| v.is_finite())
        .fold((f64::NAN, f64::NAN), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Bucket means so that at most `width` points remain.
fn downsample(values: &[f64], width: usize) -> Vec<f64> {
    if values.len() <= width {
        return values.to_vec();
    }
    (0..width)
        .map(|i| {
            let start = i * values.len() / width;
            let end = ((i + 1) * values.len() / width).max(start + 1);
            let bucket = &values[start..end];
            bucket.iter().sum::<f64>() / bucket.len() as f64
        })
        .collect()
}

fn sparkline(points: &[f64], lo: f64, hi: f64) -> String {
    points
        .iter()
        .map(|&v| {
            if !v.is_finite() || lo.is_nan() {
                ' '
            } else if hi > lo {
                let level = ((v - lo) / (hi - lo) * (BARS.len() - 1) as f64).round() as usize;
                BARS[level.min(BARS.len() - 1)]
            } else {
                BARS[BARS.len() / 2]
            }
        })
        .collect()
}
