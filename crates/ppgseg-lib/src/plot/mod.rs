use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
    /// Fixed range; `None` lets the backend fit the data
    pub range: Option<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    pub color: Color,
}

/// 0xRRGGBB
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub fn rgb(&self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<LineSeries>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>) -> Self {
        Self {
            title: title.into(),
            x: Axis {
                label: None,
                range: None,
            },
            y: Axis {
                label: None,
                range: None,
            },
            series: Vec::new(),
        }
    }

    pub fn add_series(&mut self, series: LineSeries) {
        self.series.push(series);
    }

    /// Axis ranges, preferring fixed ones and otherwise spanning every point.
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let fit = |axis: usize| {
            let (lo, hi) = self
                .series
                .iter()
                .flat_map(|s| s.points.iter().map(move |p| p[axis]))
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                });
            if lo.is_finite() && hi > lo {
                [lo, hi]
            } else if lo.is_finite() {
                [lo - 0.5, lo + 0.5]
            } else {
                [0.0, 1.0]
            }
        };
        (
            self.x.range.unwrap_or_else(|| fit(0)),
            self.y.range.unwrap_or_else(|| fit(1)),
        )
    }
}

pub trait PlotBackend {
    fn draw(&mut self, fig: &Figure) -> anyhow::Result<()>;
}

pub fn decimate_points(points: &[[f64; 2]], max_points: usize) -> Vec<[f64; 2]> {
    if points.len() <= max_points {
        return points.to_vec();
    }
    let bucket_size = points.len() as f64 / max_points as f64;
    let mut result = Vec::with_capacity(max_points);
    for i in 0..max_points {
        let start = (i as f64 * bucket_size).floor() as usize;
        if start >= points.len() {
            break;
        }
        result.push(points[start]);
    }
    result
}

/// Line chart of one normalized segment: sample index against value, y fixed to [0, 1].
pub fn figure_from_segment(title: &str, values: &[f32], max_points: usize) -> Figure {
    let points: Vec<[f64; 2]> = values
        .iter()
        .enumerate()
        .map(|(i, v)| [i as f64, *v as f64])
        .collect();
    let mut fig = Figure::new(Some(title.into()));
    fig.x.label = Some("sample".into());
    fig.y.label = Some("normalized PPG".into());
    fig.y.range = Some([0.0, 1.0]);
    fig.add_series(LineSeries {
        name: title.into(),
        points: decimate_points(&points, max_points.max(1)),
        style: Style {
            width: 1.4,
            color: Color(0xD62728),
        },
    });
    fig
}
