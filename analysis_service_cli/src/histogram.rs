//! Read-length histogram: bars, scales and SVG rendering.
//!
//! Everything here is recomputed from the distribution on every call, so a
//! chart never outlives the data it was drawn from.

use serde::Serialize;
use std::collections::BTreeMap;
use svg::node::element::{Group, Line, Rectangle, Text};
use svg::Document;

/// Every n-th category gets a label on the horizontal axis.
pub const TICK_EVERY: usize = 25;
pub const BAND_PADDING: f64 = 0.1;
pub const Y_TICK_COUNT: usize = 10;
pub const BAR_FILL: &str = "steelblue";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistogramBar {
    pub length: u64,
    pub count: u64,
}

/// Bars ordered by read length. Keys are unique, so no ties.
pub fn bin(distribution: &BTreeMap<u64, u64>) -> Vec<HistogramBar> {
    distribution
        .iter()
        .map(|(&length, &count)| HistogramBar { length, count })
        .collect()
}

/// Labels for the horizontal axis: the first category and every `every`-th after it.
pub fn tick_values(domain: &[u64], every: usize) -> Vec<u64> {
    domain.iter().step_by(every.max(1)).copied().collect()
}

/// Categorical scale with uniform bands, centred in its range.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<u64>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    /// `padding` is used both between bands and at the outer edges.
    pub fn new(domain: Vec<u64>, range: (f64, f64), padding: f64) -> Self {
        let (r0, r1) = range;
        let n = domain.len() as f64;
        let step = (r1 - r0) / (n - padding + padding * 2.0).max(1.0);
        let start = r0 + (r1 - r0 - step * (n - padding)) * 0.5;
        Self {
            domain,
            start,
            step,
            bandwidth: step * (1.0 - padding),
        }
    }

    pub fn domain(&self) -> &[u64] {
        &self.domain
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Left edge of the band for `length`, if it is part of the domain.
    pub fn position(&self, length: u64) -> Option<f64> {
        self.domain
            .binary_search(&length)
            .ok()
            .map(|index| self.start + self.step * index as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// A collapsed domain maps everything onto the start of the range.
    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Roughly `count` round tick values (multiples of 1, 2 or 5 times a power of ten).
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (start, stop) = self.domain;
        if start == stop || count == 0 {
            return vec![start];
        }
        let step = (stop - start) / count as f64;
        let power = step.log10().floor();
        let error = step / 10f64.powf(power);
        let factor = if error >= 50f64.sqrt() {
            10.0
        } else if error >= 10f64.sqrt() {
            5.0
        } else if error >= 2f64.sqrt() {
            2.0
        } else {
            1.0
        };

        if power >= 0.0 {
            let increment = factor * 10f64.powf(power);
            let first = (start / increment).ceil() as i64;
            let last = (stop / increment).floor() as i64;
            (first..=last).map(|i| i as f64 * increment).collect()
        } else {
            // divide instead of multiplying by a fractional increment to keep values exact
            let inverse = 10f64.powf(-power) / factor;
            let first = (start * inverse).ceil() as i64;
            let last = (stop * inverse).floor() as i64;
            (first..=last).map(|i| i as f64 / inverse).collect()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            width: 925.0,
            height: 500.0,
            margin: Margin {
                top: 20.0,
                right: 20.0,
                bottom: 60.0,
                left: 60.0,
            },
        }
    }
}

impl ChartLayout {
    pub fn inner_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    pub fn inner_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }
}

/// Pixel geometry for one bar, relative to the plot area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    pub length: u64,
    pub count: u64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramChart {
    pub layout: ChartLayout,
    pub bars: Vec<HistogramBar>,
    pub x: BandScale,
    pub y: LinearScale,
    pub x_ticks: Vec<u64>,
}

impl HistogramChart {
    pub fn build(distribution: &BTreeMap<u64, u64>, layout: ChartLayout) -> Self {
        let bars = bin(distribution);
        let domain: Vec<u64> = bars.iter().map(|bar| bar.length).collect();
        let max_count = bars.iter().map(|bar| bar.count).max().unwrap_or(0);

        let x_ticks = tick_values(&domain, TICK_EVERY);
        let x = BandScale::new(domain, (0.0, layout.inner_width()), BAND_PADDING);
        let y = LinearScale::new((0.0, max_count as f64), (layout.inner_height(), 0.0));

        Self {
            layout,
            bars,
            x,
            y,
            x_ticks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bar_rects(&self) -> Vec<BarRect> {
        let plot_height = self.layout.inner_height();
        self.bars
            .iter()
            .filter_map(|bar| {
                let x = self.x.position(bar.length)?;
                let y = self.y.scale(bar.count as f64);
                Some(BarRect {
                    length: bar.length,
                    count: bar.count,
                    x,
                    y,
                    width: self.x.bandwidth(),
                    height: plot_height - y,
                })
            })
            .collect()
    }

    pub fn to_svg(&self) -> String {
        let layout = self.layout;
        let plot_width = layout.inner_width();
        let plot_height = layout.inner_height();

        let mut plot = Group::new().set(
            "transform",
            format!("translate({},{})", layout.margin.left, layout.margin.top),
        );

        // horizontal axis
        let mut x_axis = Group::new()
            .set("transform", format!("translate(0,{plot_height})"))
            .set("font-size", 10)
            .set("font-family", "sans-serif")
            .add(
                Line::new()
                    .set("x1", 0)
                    .set("y1", 0)
                    .set("x2", plot_width)
                    .set("y2", 0)
                    .set("stroke", "currentColor"),
            );
        for length in &self.x_ticks {
            let Some(left) = self.x.position(*length) else {
                continue;
            };
            let centre = left + self.x.bandwidth() / 2.0;
            x_axis = x_axis
                .add(
                    Line::new()
                        .set("x1", centre)
                        .set("y1", 0)
                        .set("x2", centre)
                        .set("y2", 6)
                        .set("stroke", "currentColor"),
                )
                .add(
                    Text::new(length.to_string())
                        .set("x", centre)
                        .set("y", 9)
                        .set("dy", "0.71em")
                        .set("text-anchor", "end")
                        .set(
                            "transform",
                            format!("translate(-10,0) rotate(-45 {centre} 0)"),
                        ),
                );
        }

        // vertical axis
        let mut y_axis = Group::new()
            .set("font-size", 10)
            .set("font-family", "sans-serif")
            .add(
                Line::new()
                    .set("x1", 0)
                    .set("y1", 0)
                    .set("x2", 0)
                    .set("y2", plot_height)
                    .set("stroke", "currentColor"),
            );
        for value in self.y.ticks(Y_TICK_COUNT) {
            let y = self.y.scale(value);
            y_axis = y_axis
                .add(
                    Line::new()
                        .set("x1", -6)
                        .set("y1", y)
                        .set("x2", 0)
                        .set("y2", y)
                        .set("stroke", "currentColor"),
                )
                .add(
                    Text::new(format_tick(value))
                        .set("x", -9)
                        .set("y", y)
                        .set("dy", "0.32em")
                        .set("text-anchor", "end"),
                );
        }

        plot = plot.add(x_axis).add(y_axis);

        for rect in self.bar_rects() {
            plot = plot.add(
                Rectangle::new()
                    .set("class", "bar")
                    .set("x", rect.x)
                    .set("y", rect.y)
                    .set("width", rect.width)
                    .set("height", rect.height)
                    .set("fill", BAR_FILL),
            );
        }

        plot = plot
            .add(
                Text::new("Read Length")
                    .set("text-anchor", "end")
                    .set("x", plot_width / 2.0)
                    .set("y", plot_height + layout.margin.top + 30.0),
            )
            .add(
                Text::new("Frequency")
                    .set("text-anchor", "end")
                    .set("transform", "rotate(-90)")
                    .set("y", -layout.margin.left + 20.0)
                    .set("x", -plot_height / 2.0),
            );

        Document::new()
            .set("width", layout.width)
            .set("height", layout.height)
            .set("viewBox", (0, 0, layout.width, layout.height))
            .add(plot)
            .to_string()
    }
}

fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let text = format!("{value:.6}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
