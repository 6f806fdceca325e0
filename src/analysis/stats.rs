use serde::Serialize;
use thiserror::Error;

use crate::data::model::Record;
use crate::expr::{ExprError, Expression};

use super::Point;

// ---------------------------------------------------------------------------
// Axis sampling: records → points
// ---------------------------------------------------------------------------

/// Points produced from one series' x/y formulas.
#[derive(Debug, Clone, Default)]
pub struct AxisSample {
    pub points: Vec<Point>,
    /// First failure of the x formula in this run, if any.
    pub x_error: Option<ExprError>,
    pub y_error: Option<ExprError>,
}

/// Evaluate the axis formulas for every record.
///
/// A failing or non-numeric axis value becomes `0.0` for that point so the
/// series still has one point per record; the failure is kept in the sample.
pub fn sample_points<'a, I>(records: I, x_expr: &str, y_expr: &str) -> AxisSample
where
    I: IntoIterator<Item = &'a Record>,
{
    let x = Expression::parse(x_expr);
    let y = Expression::parse(y_expr);

    let mut sample = AxisSample {
        x_error: x.as_ref().err().cloned(),
        y_error: y.as_ref().err().cloned(),
        ..AxisSample::default()
    };

    for record in records {
        let px = axis_value(&x, record, &mut sample.x_error);
        let py = axis_value(&y, record, &mut sample.y_error);
        sample.points.push(Point::new(px, py));
    }
    sample
}

fn axis_value(
    expr: &Result<Expression, ExprError>,
    record: &Record,
    error: &mut Option<ExprError>,
) -> f64 {
    let Ok(expr) = expr else {
        return 0.0;
    };
    match expr.evaluate_number(record) {
        Ok(v) => v,
        Err(e) => {
            if error.is_none() {
                *error = Some(e);
            }
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// Regression
// ---------------------------------------------------------------------------

/// Why a series has no regression line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum Degenerate {
    #[error("series has no points")]
    NoPoints,
    #[error("x values do not vary")]
    ZeroXVariance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Weak,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
}

/// Simple linear regression `y = alpha + beta * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Regression {
    pub alpha: f64,
    pub beta: f64,
    /// Pearson correlation. `None` when y does not vary, in which case the
    /// line is flat at the mean of y.
    pub r: Option<f64>,
}

impl Regression {
    pub fn predict(&self, x: f64) -> f64 {
        self.alpha + self.beta * x
    }

    /// R rounded to three decimals for display.
    pub fn r_rounded(&self) -> Option<f64> {
        self.r.map(|r| (r * 1000.0).round() / 1000.0)
    }

    /// Share of the variance in y explained by the line.
    pub fn r_squared(&self) -> Option<f64> {
        self.r.map(|r| r * r)
    }

    /// |R| < 0.5 reads as a weak correlation.
    pub fn strength(&self) -> Option<(Strength, Direction)> {
        self.r.map(|r| {
            let strength = if r.abs() < 0.5 {
                Strength::Weak
            } else {
                Strength::Strong
            };
            let direction = if r < 0.0 {
                Direction::Negative
            } else {
                Direction::Positive
            };
            (strength, direction)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Fit {
    Line(Regression),
    NoFit { reason: Degenerate },
}

impl Fit {
    pub fn regression(&self) -> Option<&Regression> {
        match self {
            Fit::Line(reg) => Some(reg),
            Fit::NoFit { .. } => None,
        }
    }
}

/// Means and population standard deviations of a non-empty point set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Moments {
    pub mean_x: f64,
    pub mean_y: f64,
    pub std_x: f64,
    pub std_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStatistics {
    pub n: usize,
    pub moments: Option<Moments>,
    pub fit: Fit,
}

impl SeriesStatistics {
    pub fn compute(points: &[Point]) -> Self {
        let n = points.len();
        if n == 0 {
            return Self {
                n,
                moments: None,
                fit: Fit::NoFit {
                    reason: Degenerate::NoPoints,
                },
            };
        }

        let count = n as f64;
        let mean_x = points.iter().map(|p| p.x).sum::<f64>() / count;
        let mean_y = points.iter().map(|p| p.y).sum::<f64>() / count;

        let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
        for p in points {
            let dx = p.x - mean_x;
            let dy = p.y - mean_y;
            sxy += dx * dy;
            sxx += dx * dx;
            syy += dy * dy;
        }

        let std_x = (sxx / count).sqrt();
        let std_y = (syy / count).sqrt();
        let moments = Moments {
            mean_x,
            mean_y,
            std_x,
            std_y,
        };

        if negligible(std_x, mean_x, count) {
            return Self {
                n,
                moments: Some(moments),
                fit: Fit::NoFit {
                    reason: Degenerate::ZeroXVariance,
                },
            };
        }

        let (r, beta) = if negligible(std_y, mean_y, count) {
            (None, 0.0)
        } else {
            let r = sxy / (sxx.sqrt() * syy.sqrt());
            (Some(r), r * (std_y / std_x))
        };
        let alpha = mean_y - beta * mean_x;

        Self {
            n,
            moments: Some(moments),
            fit: Fit::Line(Regression { alpha, beta, r }),
        }
    }
}

/// A spread no larger than the rounding error of averaging `count` values
/// around `mean`. Purely relative, so small-magnitude data keeps its spread.
fn negligible(std: f64, mean: f64, count: f64) -> bool {
    std <= count * f64::EPSILON * mean.abs()
}
