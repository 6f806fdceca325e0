use serde::Serialize;

use crate::config::PlotBox;

use super::stats::Regression;
use super::Point;

// ---------------------------------------------------------------------------
// Bounds – global extent of all plotted series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    pub fn from_point(p: Point) -> Self {
        Self {
            x_min: p.x,
            x_max: p.x,
            y_min: p.y,
            y_max: p.y,
        }
    }

    /// Extent of `points`, or `None` when there are none.
    pub fn of<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        points.into_iter().fold(None, |acc, &p| {
            Some(match acc {
                Some(b) => b.including(p),
                None => Self::from_point(p),
            })
        })
    }

    pub fn including(self, p: Point) -> Self {
        Self {
            x_min: self.x_min.min(p.x),
            x_max: self.x_max.max(p.x),
            y_min: self.y_min.min(p.y),
            y_max: self.y_max.max(p.y),
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            x_min: self.x_min.min(other.x_min),
            x_max: self.x_max.max(other.x_max),
            y_min: self.y_min.min(other.y_min),
            y_max: self.y_max.max(other.y_max),
        }
    }

    /// Whole-number bounds for axis labels.
    pub fn rounded(&self) -> Self {
        Self {
            x_min: self.x_min.round(),
            x_max: self.x_max.round(),
            y_min: self.y_min.round(),
            y_max: self.y_max.round(),
        }
    }
}

// ---------------------------------------------------------------------------
// Scaled output
// ---------------------------------------------------------------------------

/// A point in plotting-box coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaledPoint {
    pub x: f64,
    pub y: f64,
}

/// A regression line drawn across the full x range, in box coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaledLineSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

// ---------------------------------------------------------------------------
// CoordinateScaler
// ---------------------------------------------------------------------------

/// Maps data coordinates into the percentage plotting box.
///
/// `x_min` lands on `margin`, `x_max` on `margin + span`. The y axis is
/// inverted so `y_max` is at the top. An axis whose range is zero puts every
/// value on the box midline instead of dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateScaler {
    bounds: Bounds,
    plot: PlotBox,
}

impl CoordinateScaler {
    pub fn new(bounds: Bounds, plot: PlotBox) -> Self {
        Self { bounds, plot }
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn scale_x(&self, raw: f64) -> f64 {
        self.project(raw, self.bounds.x_min, self.bounds.x_max)
            .unwrap_or_else(|| self.plot.midline())
    }

    pub fn scale_y(&self, raw: f64) -> f64 {
        match self.project(raw, self.bounds.y_min, self.bounds.y_max) {
            Some(y) => self.plot.extent - y,
            None => self.plot.midline(),
        }
    }

    pub fn scale_point(&self, p: Point) -> ScaledPoint {
        ScaledPoint {
            x: self.scale_x(p.x),
            y: self.scale_y(p.y),
        }
    }

    /// Endpoints `(x_min, α+β·x_min)` and `(x_max, α+β·x_max)`, scaled.
    ///
    /// The y values are not clipped; a steep line may leave the box.
    pub fn scale_line(&self, reg: &Regression) -> ScaledLineSegment {
        let Bounds { x_min, x_max, .. } = self.bounds;
        ScaledLineSegment {
            x1: self.scale_x(x_min),
            y1: self.scale_y(reg.predict(x_min)),
            x2: self.scale_x(x_max),
            y2: self.scale_y(reg.predict(x_max)),
        }
    }

    fn project(&self, raw: f64, min: f64, max: f64) -> Option<f64> {
        let range = max - min;
        if !range.is_finite() || range == 0.0 {
            return None;
        }
        let out = self.plot.margin + ((raw - min) / range) * self.plot.span;
        out.is_finite().then_some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaler(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> CoordinateScaler {
        CoordinateScaler::new(
            Bounds {
                x_min,
                x_max,
                y_min,
                y_max,
            },
            PlotBox::default(),
        )
    }

    #[test]
    fn test_bounds_map_to_box_edges() {
        let s = scaler(-3.0, 17.0, 2.0, 1002.0);
        assert_eq!(s.scale_x(-3.0), 5.0);
        assert_eq!(s.scale_x(17.0), 95.0);
        assert_eq!(s.scale_y(2.0), 95.0);
        assert_eq!(s.scale_y(1002.0), 5.0);
        assert_eq!(s.scale_x(7.0), 50.0);
    }

    #[test]
    fn test_degenerate_axis_uses_midline() {
        let s = scaler(4.0, 4.0, 0.0, 10.0);
        for x in [4.0, 0.0, 1e9] {
            let out = s.scale_x(x);
            assert!(out.is_finite());
            assert_eq!(out, 50.0);
        }
        assert_eq!(s.scale_y(10.0), 5.0);

        let s = scaler(0.0, 10.0, 7.0, 7.0);
        assert_eq!(s.scale_point(Point::new(10.0, 7.0)), ScaledPoint { x: 95.0, y: 50.0 });
    }

    #[test]
    fn test_line_endpoints_span_x_range() {
        let s = scaler(0.0, 10.0, 0.0, 20.0);
        let reg = Regression {
            alpha: 0.0,
            beta: 2.0,
            r: Some(1.0),
        };
        let seg = s.scale_line(&reg);
        assert_eq!(seg, ScaledLineSegment { x1: 5.0, y1: 95.0, x2: 95.0, y2: 5.0 });
    }

    #[test]
    fn test_bounds_of_points() {
        assert!(Bounds::of(&[] as &[Point]).is_none());
        let pts = [Point::new(1.0, -2.0), Point::new(-4.0, 8.0), Point::new(3.0, 0.5)];
        let b = Bounds::of(&pts).unwrap();
        assert_eq!(b, Bounds { x_min: -4.0, x_max: 3.0, y_min: -2.0, y_max: 8.0 });

        let other = Bounds::from_point(Point::new(10.0, 10.0));
        assert_eq!(b.merge(other).x_max, 10.0);
        assert_eq!(other.merge(b), b.merge(other));
    }

    #[test]
    fn test_rounded_labels() {
        let b = Bounds { x_min: 0.4, x_max: 9.6, y_min: -1.5, y_max: 2.49 };
        assert_eq!(b.rounded(), Bounds { x_min: 0.0, x_max: 10.0, y_min: -2.0, y_max: 2.0 });
    }

    #[test]
    fn test_tiny_range_still_spans_the_box() {
        let s = scaler(0.0, 1e-17, -1e-20, 1e-20);
        assert_eq!(s.scale_x(0.0), 5.0);
        assert_eq!(s.scale_x(1e-17), 95.0);
        assert_eq!(s.scale_y(1e-20), 5.0);
        assert_eq!(s.scale_y(-1e-20), 95.0);
    }
}
