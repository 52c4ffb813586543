//! Compilation of machining operations to G-code.
//!
//! One program header, then one motion block per operation in ledger
//! order, then a footer. Coordinates are emitted at 3 decimals, feed
//! rates at 1, spindle speeds at 0; identical inputs always produce
//! byte-identical text.

use gcodepilot_core::model::{CncOutput, CutParams, OpKind, Operation, PathSegment, Point, Stock};
use tracing::debug;

/// Clearance above both z_start and the stock top for rapid moves (mm).
pub const SAFE_CLEARANCE: f64 = 5.0;

/// Partial retract above the last peck for chip clearance (mm).
pub const CHIP_CLEAR: f64 = 2.0;

/// Pocket ring stepover as a fraction of tool diameter.
pub const POCKET_STEPOVER_FRACTION: f64 = 0.5;

/// Overlap fraction between adjacent face-mill raster rows.
pub const FACE_OVERLAP_FRACTION: f64 = 0.2;

/// G-code text accumulator with feed-rate tracking.
///
/// Feed is appended to a cutting move only when it differs from the
/// previously emitted feed; the tracker is cleared at the start of each
/// operation so every operation states its feed at least once.
struct Emitter {
    gcode: String,
    feed: Option<f64>,
}

impl Emitter {
    fn new() -> Self {
        Self {
            gcode: String::new(),
            feed: None,
        }
    }

    fn raw(&mut self, line: &str) {
        self.gcode.push_str(line);
        self.gcode.push('\n');
    }

    fn comment(&mut self, text: &str) {
        self.raw(&format!("; {}", text));
    }

    fn blank(&mut self) {
        self.gcode.push('\n');
    }

    fn reset_feed(&mut self) {
        self.feed = None;
    }

    fn feed_tag(&mut self, feed: f64) -> String {
        if self.feed == Some(feed) {
            String::new()
        } else {
            self.feed = Some(feed);
            format!(" F{:.1}", feed)
        }
    }

    fn rapid_z(&mut self, z: f64) {
        self.raw(&format!("G0 Z{:.3}", z));
    }

    fn rapid_xy(&mut self, x: f64, y: f64) {
        self.raw(&format!("G0 X{:.3} Y{:.3}", x, y));
    }

    fn cut_z(&mut self, z: f64, feed: f64) {
        let tag = self.feed_tag(feed);
        self.raw(&format!("G1 Z{:.3}{}", z, tag));
    }

    fn cut_xy(&mut self, x: f64, y: f64, feed: f64) {
        let tag = self.feed_tag(feed);
        self.raw(&format!("G1 X{:.3} Y{:.3}{}", x, y, tag));
    }

    fn arc(&mut self, ccw: bool, x: f64, y: f64, i: f64, j: f64, feed: f64) {
        let cmd = if ccw { "G3" } else { "G2" };
        let tag = self.feed_tag(feed);
        self.raw(&format!("{} X{:.3} Y{:.3} I{:.3} J{:.3}{}", cmd, x, y, i, j, tag));
    }

    fn spindle_on(&mut self, rpm: f64) {
        self.raw(&format!("M3 S{:.0}", rpm));
    }

    fn spindle_off(&mut self) {
        self.raw("M5");
    }

    fn finish(self) -> String {
        self.gcode
    }
}

/// Z levels for roughing from `z_start` down to `z_depth` in `step_down`
/// increments. The final level is always exactly `z_depth`, with no
/// overshoot and no extra pass. `step_down <= 0` means a single pass.
fn depth_layers(z_start: f64, z_depth: f64, step_down: f64) -> Vec<f64> {
    if step_down <= 0.0 || z_start <= z_depth {
        return vec![z_depth];
    }
    let mut layers = Vec::new();
    let mut z = z_start;
    while z > z_depth {
        z -= step_down;
        if z < z_depth {
            z = z_depth;
        }
        layers.push(z);
    }
    layers
}

/// Ascending lateral offsets out to `bound`, ending exactly on it.
fn offsets_to(bound: f64, step: f64) -> Vec<f64> {
    if bound <= 0.0 {
        return Vec::new();
    }
    if step <= 0.0 {
        return vec![bound];
    }
    let mut offsets = Vec::new();
    let mut r = 0.0;
    while r < bound {
        r += step;
        if r > bound {
            r = bound;
        }
        offsets.push(r);
    }
    offsets
}

/// Retract height for an operation: strictly above both the cut start
/// and the stock top.
fn safe_z(stock: &Stock, cut: &CutParams) -> f64 {
    cut.z_start.max(stock.height) + SAFE_CLEARANCE
}

/// Compiles a job into G-code.
///
/// Pure and total: the same (stock, operations, explanation) always
/// yields the same program text, and no input makes it fail. The
/// returned [`CncOutput`] echoes exactly the operations and stock that
/// were compiled.
pub fn compile(stock: &Stock, operations: &[Operation], explanation: &str) -> CncOutput {
    debug!(operations = operations.len(), "compiling program");

    let mut e = Emitter::new();
    e.comment("GCodePilot program");
    e.comment(&stock.describe());
    e.comment(&format!("{} operation(s)", operations.len()));
    e.raw("G21 ; Set units to millimeters");
    e.raw("G90 ; Absolute positioning");
    e.raw("G17 ; XY plane selection");
    e.raw("G54 ; Select work coordinate system 1");

    let mut prev: Option<&Operation> = None;
    for (index, op) in operations.iter().enumerate() {
        e.blank();
        e.comment(&format!("Operation {}: {}", index + 1, op.kind.label()));
        let retract = safe_z(stock, &op.cut);
        e.rapid_z(retract);

        // Redundant tool/spindle commands are suppressed for consecutive
        // operations with the same tool and speed.
        let tool_changed = prev.map_or(true, |p| {
            p.cut.tool_type != op.cut.tool_type || p.cut.spindle_speed != op.cut.spindle_speed
        });
        if tool_changed {
            if prev.is_some() {
                e.spindle_off();
            }
            e.comment(&format!(
                "Tool: {} ({:.3} mm)",
                op.cut.tool_type, op.cut.tool_diameter
            ));
            e.spindle_on(op.cut.spindle_speed);
        }

        e.reset_feed();
        match &op.kind {
            OpKind::Drill { at, diameter } => emit_drill(&mut e, *at, *diameter, &op.cut),
            OpKind::CircularPocket { center, diameter } => {
                emit_circular_pocket(&mut e, *center, *diameter, &op.cut)
            }
            OpKind::RectangularPocket {
                center,
                width,
                length,
            } => emit_rectangular_pocket(&mut e, *center, *width, *length, &op.cut),
            OpKind::FaceMill => emit_face_mill(&mut e, stock, &op.cut),
            OpKind::Contour { segments } => emit_contour(&mut e, segments, &op.cut),
            OpKind::Unknown => {
                e.comment("unknown operation, no motion emitted");
            }
        }
        e.rapid_z(retract);
        prev = Some(op);
    }

    e.blank();
    e.spindle_off();
    e.raw("M30 ; End program");

    CncOutput {
        program: e.finish(),
        explanation: explanation.to_string(),
        operations: operations.to_vec(),
        stock: stock.clone(),
    }
}

fn emit_drill(e: &mut Emitter, at: Point, diameter: f64, cut: &CutParams) {
    e.comment(&format!("Hole dia {:.3} mm", diameter));
    e.rapid_xy(at.x, at.y);
    if cut.step_down <= 0.0 {
        // Single plunge to depth.
        e.cut_z(cut.z_depth, cut.feed_rate);
        return;
    }
    let layers = depth_layers(cut.z_start, cut.z_depth, cut.step_down);
    let last = layers.len() - 1;
    for (i, z) in layers.iter().enumerate() {
        e.cut_z(*z, cut.feed_rate);
        if i < last {
            // Partial retract to clear chips before the next peck.
            e.rapid_z((z + CHIP_CLEAR).min(cut.z_start));
        }
    }
}

fn emit_circular_pocket(e: &mut Emitter, center: Point, diameter: f64, cut: &CutParams) {
    let max_r = diameter / 2.0 - cut.tool_diameter / 2.0;
    if diameter <= 0.0 || max_r <= 0.0 {
        e.comment("degenerate circular pocket (tool does not fit), no motion emitted");
        return;
    }
    // Offsets never exceed max_r, so the cutter edge cannot pass the
    // pocket wall.
    let step = cut.tool_diameter * POCKET_STEPOVER_FRACTION;
    e.rapid_xy(center.x, center.y);
    for z in depth_layers(cut.z_start, cut.z_depth, cut.step_down) {
        e.cut_z(z, cut.feed_rate);
        for r in offsets_to(max_r, step) {
            e.cut_xy(center.x + r, center.y, cut.feed_rate);
            // Full circle back to the ring start point.
            e.arc(false, center.x + r, center.y, -r, 0.0, cut.feed_rate);
        }
        e.cut_xy(center.x, center.y, cut.feed_rate);
    }
}

fn emit_rectangular_pocket(
    e: &mut Emitter,
    center: Point,
    width: f64,
    length: f64,
    cut: &CutParams,
) {
    let half_w = width / 2.0 - cut.tool_diameter / 2.0;
    let half_l = length / 2.0 - cut.tool_diameter / 2.0;
    if half_w <= 0.0 || half_l <= 0.0 {
        e.comment("degenerate rectangular pocket (tool does not fit), no motion emitted");
        return;
    }
    let bound = half_w.min(half_l);
    let step = cut.tool_diameter * POCKET_STEPOVER_FRACTION;
    e.rapid_xy(center.x, center.y);
    for z in depth_layers(cut.z_start, cut.z_depth, cut.step_down) {
        e.cut_z(z, cut.feed_rate);
        for offset in offsets_to(bound, step) {
            // Scale both half-extents together; the final ring lands
            // exactly on (half_w, half_l).
            let t = offset / bound;
            let ex = half_w * t;
            let ey = half_l * t;
            e.cut_xy(center.x - ex, center.y - ey, cut.feed_rate);
            e.cut_xy(center.x + ex, center.y - ey, cut.feed_rate);
            e.cut_xy(center.x + ex, center.y + ey, cut.feed_rate);
            e.cut_xy(center.x - ex, center.y + ey, cut.feed_rate);
            e.cut_xy(center.x - ex, center.y - ey, cut.feed_rate);
        }
        e.cut_xy(center.x, center.y, cut.feed_rate);
    }
}

fn emit_face_mill(e: &mut Emitter, stock: &Stock, cut: &CutParams) {
    let (fw, fl) = stock.shape.footprint();
    let step = cut.tool_diameter * (1.0 - FACE_OVERLAP_FRACTION);
    if fw <= 0.0 || fl <= 0.0 || step <= 0.0 {
        e.comment("degenerate face mill, no motion emitted");
        return;
    }
    // Overhang half a tool beyond each X edge so the cutter clears the
    // stock boundary on every row.
    let x_min = -fw / 2.0 - cut.tool_diameter / 2.0;
    let x_max = fw / 2.0 + cut.tool_diameter / 2.0;
    let y_max = fl / 2.0;
    let mut y = -fl / 2.0;
    let mut going_right = true;

    e.rapid_xy(x_min, y);
    e.cut_z(cut.z_depth, cut.feed_rate);
    loop {
        let tx = if going_right { x_max } else { x_min };
        e.cut_xy(tx, y, cut.feed_rate);
        if y >= y_max {
            break;
        }
        y += step;
        if y > y_max {
            y = y_max;
        }
        e.cut_xy(tx, y, cut.feed_rate);
        going_right = !going_right;
    }
}

fn emit_contour(e: &mut Emitter, segments: &[PathSegment], cut: &CutParams) {
    let Some(first) = segments.first() else {
        e.comment("degenerate contour (no path data), no motion emitted");
        return;
    };
    // The first segment's end point is the contour entry.
    let entry = first.end();
    e.rapid_xy(entry.x, entry.y);
    e.cut_z(cut.z_depth, cut.feed_rate);

    let mut current = entry;
    for segment in &segments[1..] {
        let end = segment.end();
        match segment {
            PathSegment::Line { .. } => {
                e.cut_xy(end.x, end.y, cut.feed_rate);
            }
            PathSegment::ArcCw { .. } | PathSegment::ArcCcw { .. } => {
                let ccw = matches!(segment, PathSegment::ArcCcw { .. });
                if let Some(c) = segment.arc_center(current) {
                    e.arc(ccw, end.x, end.y, c.x - current.x, c.y - current.y, cut.feed_rate);
                } else {
                    // No resolvable center: degrade to a straight move.
                    e.comment("arc center unresolved, emitting line");
                    e.cut_xy(end.x, end.y, cut.feed_rate);
                }
            }
        }
        current = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_layers_land_exactly_on_target() {
        let layers = depth_layers(0.0, -10.0, 3.0);
        assert_eq!(layers, vec![-3.0, -6.0, -9.0, -10.0]);
    }

    #[test]
    fn depth_layers_single_pass_when_step_zero() {
        assert_eq!(depth_layers(0.0, -10.0, 0.0), vec![-10.0]);
    }

    #[test]
    fn depth_layers_degenerate_upward_cut() {
        assert_eq!(depth_layers(-5.0, -5.0, 2.0), vec![-5.0]);
        assert_eq!(depth_layers(-5.0, 0.0, 2.0), vec![0.0]);
    }

    #[test]
    fn offsets_reach_bound_exactly_once() {
        let offsets = offsets_to(17.0, 3.0);
        assert_eq!(offsets, vec![3.0, 6.0, 9.0, 12.0, 15.0, 17.0]);
        assert_eq!(offsets_to(2.0, 3.0), vec![2.0]);
        assert!(offsets_to(0.0, 3.0).is_empty());
    }

    #[test]
    fn feed_emitted_once_until_changed() {
        let mut e = Emitter::new();
        e.cut_z(-1.0, 100.0);
        e.cut_xy(5.0, 0.0, 100.0);
        e.cut_xy(5.0, 5.0, 200.0);
        let text = e.finish();
        assert!(text.contains("G1 Z-1.000 F100.0"));
        assert!(text.contains("G1 X5.000 Y0.000\n"));
        assert!(text.contains("G1 X5.000 Y5.000 F200.0"));
    }
}
