//! Geometry model for machining jobs.
//!
//! Value types describing stock, contour path segments, and the six
//! machining operation kinds, plus the `CncOutput` contract exported to
//! downstream consumers. Each operation kind is a sum-type variant that
//! carries only the geometry meaningful for that kind, so a "missing
//! field for this kind" state cannot be represented.

use serde::{Deserialize, Serialize};

/// Tolerance used by geometric validity checks (mm).
pub const GEOM_EPSILON: f64 = 1e-3;

/// A 2D point in the work coordinate system (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point with the given X and Y coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculates the distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Footprint shape of the raw stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum StockShape {
    Rectangular { width: f64, length: f64 },
    Cylindrical { diameter: f64 },
}

impl StockShape {
    /// Bounding footprint as (width, length). A cylinder reports its
    /// bounding square.
    pub fn footprint(&self) -> (f64, f64) {
        match self {
            StockShape::Rectangular { width, length } => (*width, *length),
            StockShape::Cylindrical { diameter } => (*diameter, *diameter),
        }
    }
}

/// The raw material block being machined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    #[serde(flatten)]
    pub shape: StockShape,
    /// Stock height in Z (mm).
    pub height: f64,
    /// Free-form material label, e.g. "6061 aluminum".
    pub material: String,
}

impl Stock {
    pub fn is_well_formed(&self) -> bool {
        let dims_ok = match self.shape {
            StockShape::Rectangular { width, length } => width > 0.0 && length > 0.0,
            StockShape::Cylindrical { diameter } => diameter > 0.0,
        };
        dims_ok && self.height > 0.0
    }

    /// Human-readable one-line description for program headers.
    pub fn describe(&self) -> String {
        match self.shape {
            StockShape::Rectangular { width, length } => format!(
                "{} rectangular stock {:.1} x {:.1} x {:.1} mm",
                self.material, width, length, self.height
            ),
            StockShape::Cylindrical { diameter } => format!(
                "{} cylindrical stock dia {:.1} x {:.1} mm",
                self.material, diameter, self.height
            ),
        }
    }
}

impl Default for Stock {
    fn default() -> Self {
        Self {
            shape: StockShape::Rectangular {
                width: 100.0,
                length: 100.0,
            },
            height: 20.0,
            material: "aluminum".to_string(),
        }
    }
}

/// One move within a contour operation.
///
/// Every segment carries its end point; arcs additionally carry a center
/// and/or a radius fallback. Start points are implicit: each segment
/// starts where the previous one ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathSegment {
    Line {
        end: Point,
    },
    ArcCw {
        end: Point,
        center: Option<Point>,
        radius: Option<f64>,
    },
    ArcCcw {
        end: Point,
        center: Option<Point>,
        radius: Option<f64>,
    },
}

impl PathSegment {
    /// End point of this segment.
    pub fn end(&self) -> Point {
        match self {
            PathSegment::Line { end }
            | PathSegment::ArcCw { end, .. }
            | PathSegment::ArcCcw { end, .. } => *end,
        }
    }

    pub fn is_arc(&self) -> bool {
        !matches!(self, PathSegment::Line { .. })
    }

    /// Resolves the arc center for a segment starting at `start`.
    ///
    /// A supplied center wins. With only a radius, the center is derived
    /// from start, end, radius, and sweep direction; of the two chord-side
    /// solutions the one giving the minor arc for this direction is
    /// chosen (left of the chord for CCW, right for CW). Returns `None`
    /// for lines, for arcs with neither center nor radius, and when the
    /// radius is too short to span the chord.
    pub fn arc_center(&self, start: Point) -> Option<Point> {
        let (end, center, radius, ccw) = match self {
            PathSegment::Line { .. } => return None,
            PathSegment::ArcCw {
                end,
                center,
                radius,
            } => (*end, *center, *radius, false),
            PathSegment::ArcCcw {
                end,
                center,
                radius,
            } => (*end, *center, *radius, true),
        };
        if let Some(c) = center {
            return Some(c);
        }
        let r = radius?.abs();
        let chord = start.distance_to(&end);
        if chord < GEOM_EPSILON {
            return None;
        }
        let half = chord / 2.0;
        if r + GEOM_EPSILON < half {
            // Radius cannot span the chord.
            return None;
        }
        let offset = (r * r - half * half).max(0.0).sqrt();
        let mid = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
        let ux = (end.x - start.x) / chord;
        let uy = (end.y - start.y) / chord;
        let (nx, ny) = if ccw { (-uy, ux) } else { (uy, -ux) };
        Some(Point::new(mid.x + nx * offset, mid.y + ny * offset))
    }

    /// A segment is well-formed when its geometry is internally
    /// consistent for the given start point: an arc center must be
    /// equidistant from both endpoints within `GEOM_EPSILON`, and a
    /// radius-only arc must admit a derivable center.
    pub fn is_well_formed(&self, start: Point) -> bool {
        match self {
            PathSegment::Line { .. } => true,
            PathSegment::ArcCw { end, center, .. }
            | PathSegment::ArcCcw { end, center, .. } => {
                if let Some(c) = center {
                    (c.distance_to(&start) - c.distance_to(end)).abs() <= GEOM_EPSILON
                } else {
                    self.arc_center(start).is_some()
                }
            }
        }
    }
}

/// Geometry for one machining operation kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OpKind {
    CircularPocket {
        center: Point,
        diameter: f64,
    },
    RectangularPocket {
        center: Point,
        width: f64,
        length: f64,
    },
    Drill {
        at: Point,
        diameter: f64,
    },
    FaceMill,
    Contour {
        segments: Vec<PathSegment>,
    },
    /// The analyzer recognized an operation but not its kind. Carries no
    /// geometry; compiles to a commented no-op block.
    Unknown,
}

impl OpKind {
    /// Short human-readable label for program comments.
    pub fn label(&self) -> &'static str {
        match self {
            OpKind::CircularPocket { .. } => "circular pocket",
            OpKind::RectangularPocket { .. } => "rectangular pocket",
            OpKind::Drill { .. } => "drill",
            OpKind::FaceMill => "face mill",
            OpKind::Contour { .. } => "contour",
            OpKind::Unknown => "unknown",
        }
    }

    pub fn is_well_formed(&self) -> bool {
        match self {
            OpKind::CircularPocket { diameter, .. } => *diameter > 0.0,
            OpKind::RectangularPocket { width, length, .. } => *width > 0.0 && *length > 0.0,
            OpKind::Drill { diameter, .. } => *diameter > 0.0,
            OpKind::FaceMill => true,
            OpKind::Contour { segments } => !segments.is_empty(),
            OpKind::Unknown => false,
        }
    }
}

/// Cutting parameters common to every operation kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutParams {
    /// Z coordinate of the top of the cut (mm).
    pub z_start: f64,
    /// Final Z depth of the cut (mm).
    pub z_depth: f64,
    /// Cutting feed rate (mm/min).
    pub feed_rate: f64,
    /// Spindle speed (RPM).
    pub spindle_speed: f64,
    /// Diameter of the tool being used (mm).
    pub tool_diameter: f64,
    /// Free-form tool label, e.g. "flat end mill".
    pub tool_type: String,
    /// Maximum per-pass depth increment (mm). 0 means single pass.
    pub step_down: f64,
}

impl Default for CutParams {
    fn default() -> Self {
        Self {
            z_start: 0.0,
            z_depth: -1.0,
            feed_rate: 300.0,
            spindle_speed: 10000.0,
            tool_diameter: 6.0,
            tool_type: "flat end mill".to_string(),
            step_down: 0.0,
        }
    }
}

/// One machining operation: kind-specific geometry plus cutting
/// parameters. Ledger order is program order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(flatten)]
    pub kind: OpKind,
    #[serde(flatten)]
    pub cut: CutParams,
}

impl Operation {
    pub fn new(kind: OpKind, cut: CutParams) -> Self {
        Self { kind, cut }
    }
}

/// The sole artifact exported across the core boundary: the compiled
/// program together with an exact echo of what was compiled. Downstream
/// consumers treat `operations` and `stock` as authoritative and never
/// re-derive them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CncOutput {
    pub program: String,
    pub explanation: String,
    pub operations: Vec<Operation>,
    pub stock: Stock,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arc_center_given_wins_over_radius() {
        let seg = PathSegment::ArcCw {
            end: Point::new(10.0, 0.0),
            center: Some(Point::new(5.0, 0.0)),
            radius: Some(100.0),
        };
        let c = seg.arc_center(Point::new(0.0, 0.0)).unwrap();
        assert!((c.x - 5.0).abs() < 1e-9 && c.y.abs() < 1e-9);
    }

    #[test]
    fn arc_center_derived_minor_ccw_is_left_of_chord() {
        let seg = PathSegment::ArcCcw {
            end: Point::new(10.0, 0.0),
            center: None,
            radius: Some(10.0),
        };
        let c = seg.arc_center(Point::new(0.0, 0.0)).unwrap();
        assert!((c.x - 5.0).abs() < 1e-6);
        assert!(c.y > 0.0, "CCW minor-arc center must sit left of the chord");
        assert!((c.distance_to(&Point::new(0.0, 0.0)) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn arc_center_derived_minor_cw_is_right_of_chord() {
        let seg = PathSegment::ArcCw {
            end: Point::new(10.0, 0.0),
            center: None,
            radius: Some(10.0),
        };
        let c = seg.arc_center(Point::new(0.0, 0.0)).unwrap();
        assert!(c.y < 0.0, "CW minor-arc center must sit right of the chord");
    }

    #[test]
    fn arc_with_short_radius_is_ill_formed() {
        let seg = PathSegment::ArcCw {
            end: Point::new(10.0, 0.0),
            center: None,
            radius: Some(2.0),
        };
        assert!(seg.arc_center(Point::new(0.0, 0.0)).is_none());
        assert!(!seg.is_well_formed(Point::new(0.0, 0.0)));
    }

    #[test]
    fn arc_center_equidistance_tolerance() {
        let good = PathSegment::ArcCcw {
            end: Point::new(0.0, 10.0),
            center: Some(Point::new(0.0, 5.0)),
            radius: None,
        };
        assert!(good.is_well_formed(Point::new(0.0, 0.0)));

        let skewed = PathSegment::ArcCcw {
            end: Point::new(0.0, 10.0),
            center: Some(Point::new(1.0, 5.0)),
            radius: None,
        };
        // Equidistant despite the offset center, so still consistent.
        assert!(skewed.is_well_formed(Point::new(0.0, 0.0)));

        let bad = PathSegment::ArcCw {
            end: Point::new(9.0, 0.0),
            center: Some(Point::new(5.0, 0.0)),
            radius: None,
        };
        assert!(!bad.is_well_formed(Point::new(0.0, 0.0)));
    }

    #[test]
    fn operation_json_round_trip() {
        let op = Operation::new(
            OpKind::Contour {
                segments: vec![
                    PathSegment::Line {
                        end: Point::new(10.0, 0.0),
                    },
                    PathSegment::ArcCcw {
                        end: Point::new(10.0, 10.0),
                        center: None,
                        radius: Some(5.0),
                    },
                ],
            },
            CutParams::default(),
        );
        let json = serde_json::to_string(&op).unwrap();
        let back: Operation = serde_json::from_str(&json).unwrap();
        assert_eq!(op, back);
    }

    #[test]
    fn stock_describe_mentions_material_and_dims() {
        let stock = Stock {
            shape: StockShape::Cylindrical { diameter: 50.0 },
            height: 25.0,
            material: "brass".to_string(),
        };
        let text = stock.describe();
        assert!(text.contains("brass"));
        assert!(text.contains("50.0"));
        assert_eq!(stock.shape.footprint(), (50.0, 50.0));
    }
}
