/// ASCII surface for terminal rendering
use crossterm::{
    cursor,
    style::{self, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Point2;
use std::fmt;
use std::io::Write;
use wf3d_core::{Color, Surface, Viewport};

/// Terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: f64 = 2.0;

/// Character written by a non-transparent fill
const FILL_CHAR: char = '.';

#[derive(Debug, Clone)]
struct SavedState {
    stroke_color: Color,
    fill_color: Color,
    clip: Option<Vec<bool>>,
}

/// A character grid implementing [`Surface`].
///
/// Fills replace cells outright, so filling with [`Color::TRANSPARENT`]
/// erases whatever was drawn behind the path. Strokes pick a line character
/// from the segment's on-screen slope.
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    viewport: Viewport,
    char_buffer: Vec<char>,
    color_buffer: Vec<Option<Color>>,

    // current path in cell coordinates, one entry per subpath
    path: Vec<Vec<Point2<f64>>>,
    stroke_color: Color,
    fill_color: Color,
    clip: Option<Vec<bool>>,
    saved: Vec<SavedState>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_cell_aspect(width, height, CELL_ASPECT)
    }

    pub fn with_cell_aspect(width: usize, height: usize, cell_aspect: f64) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            viewport: Viewport::new(width as u32, height as u32).with_cell_aspect(cell_aspect),
            char_buffer: vec![' '; size],
            color_buffer: vec![None; size],
            path: Vec::new(),
            stroke_color: Color::BLACK,
            fill_color: Color::TRANSPARENT,
            clip: None,
            saved: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::with_cell_aspect(width, height, self.viewport.cell_aspect);
    }

    /// Character at column `x`, row `y`.
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.char_buffer
            .chunks(self.width.max(1))
            .take(self.height)
            .map(|row| row.iter().collect())
    }

    /// Queues the whole grid, one row per terminal line, starting at the top.
    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                match self.color_buffer[idx] {
                    Some(color) => writer.queue(SetForegroundColor(terminal_color(color)))?,
                    None => writer.queue(ResetColor)?,
                };
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    fn clip_allows(&self, idx: usize) -> bool {
        self.clip.as_ref().map_or(true, |mask| mask[idx])
    }

    fn put(&mut self, idx: usize, c: char, color: Option<Color>) {
        if self.clip_allows(idx) {
            self.char_buffer[idx] = c;
            self.color_buffer[idx] = color;
        }
    }

    /// Subpaths with their closing edge added.
    fn closed_subpaths(&self) -> impl Iterator<Item = Vec<Point2<f64>>> + '_ {
        self.path.iter().filter(|sub| !sub.is_empty()).map(|sub| {
            let mut closed = sub.clone();
            if sub.first() != sub.last() {
                closed.push(sub[0]);
            }
            closed
        })
    }

    /// Cells inside the current path (even-odd rule at cell centres) or
    /// crossed by its outline.
    fn path_mask(&self) -> Vec<bool> {
        let mut mask = vec![false; self.char_buffer.len()];
        let subpaths: Vec<_> = self.closed_subpaths().collect();

        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for point in subpaths.iter().flatten() {
            min = Point2::new(min.x.min(point.x), min.y.min(point.y));
            max = Point2::new(max.x.max(point.x), max.y.max(point.y));
        }
        if !(min.x <= max.x && min.y <= max.y) {
            return mask;
        }

        let x0 = min.x.floor().max(0.0) as i64;
        let y0 = min.y.floor().max(0.0) as i64;
        let x1 = max.x.ceil().min(self.width as f64) as i64;
        let y1 = max.y.ceil().min(self.height as f64) as i64;

        for y in y0..y1 {
            for x in x0..x1 {
                let centre = Point2::new(x as f64 + 0.5, y as f64 + 0.5);
                let inside = subpaths
                    .iter()
                    .fold(false, |inside, sub| inside ^ contains(sub, centre));
                if let (true, Some(idx)) = (inside, self.index(x, y)) {
                    mask[idx] = true;
                }
            }
        }

        for sub in &subpaths {
            for segment in sub.windows(2) {
                for (x, y) in self.line_cells(segment[0], segment[1]) {
                    if let Some(idx) = self.index(x, y) {
                        mask[idx] = true;
                    }
                }
            }
        }

        mask
    }

    /// Cells visited by a segment, clipped to the grid plus a one-cell margin.
    fn line_cells(&self, from: Point2<f64>, to: Point2<f64>) -> Vec<(i64, i64)> {
        let min = Point2::new(-1.0, -1.0);
        let max = Point2::new(self.width as f64 + 1.0, self.height as f64 + 1.0);

        match clip_segment(from, to, min, max) {
            Some((from, to)) => line_cells(from, to),
            None => Vec::new(),
        }
    }

    fn line_char(&self, from: Point2<f64>, to: Point2<f64>) -> char {
        let dx = to.x - from.x;
        let dy = (to.y - from.y) * self.viewport.cell_aspect;

        if dx.abs() >= 2.0 * dy.abs() {
            '-'
        } else if dy.abs() >= 2.0 * dx.abs() {
            '|'
        } else if dx * dy > 0.0 {
            '\\'
        } else {
            '/'
        }
    }
}

impl Surface for AsciiRenderer {
    fn clear(&mut self) {
        self.char_buffer.fill(' ');
        self.color_buffer.fill(None);
        self.path.clear();
        self.clip = None;
        self.saved.clear();
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.stroke_color = color;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, point: Point2<f64>) {
        self.path.push(vec![self.viewport.to_surface(point)]);
    }

    fn line_to(&mut self, point: Point2<f64>) {
        let point = self.viewport.to_surface(point);
        match self.path.last_mut() {
            Some(sub) => sub.push(point),
            None => self.path.push(vec![point]),
        }
    }

    fn close_path(&mut self) {
        if let Some(sub) = self.path.last_mut() {
            if sub.len() > 1 && sub.first() != sub.last() {
                sub.push(sub[0]);
            }
        }
    }

    fn fill(&mut self) {
        let (c, color) = if self.fill_color.a == 0 {
            (' ', None)
        } else {
            (FILL_CHAR, Some(self.fill_color))
        };

        let mask = self.path_mask();
        for idx in (0..mask.len()).filter(|&idx| mask[idx]) {
            self.put(idx, c, color);
        }
    }

    fn stroke(&mut self) {
        let color = Some(self.stroke_color);
        let subpaths: Vec<_> = self.path.clone();

        for sub in &subpaths {
            for segment in sub.windows(2) {
                let c = self.line_char(segment[0], segment[1]);
                for (x, y) in self.line_cells(segment[0], segment[1]) {
                    if let Some(idx) = self.index(x, y) {
                        self.put(idx, c, color);
                    }
                }
            }
        }
    }

    fn save(&mut self) {
        self.saved.push(SavedState {
            stroke_color: self.stroke_color,
            fill_color: self.fill_color,
            clip: self.clip.clone(),
        });
    }

    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.stroke_color = state.stroke_color;
            self.fill_color = state.fill_color;
            self.clip = state.clip;
        }
    }

    fn clip(&mut self) {
        let mask = self.path_mask();
        self.clip = Some(match self.clip.take() {
            Some(current) => current.iter().zip(&mask).map(|(a, b)| *a && *b).collect(),
            None => mask,
        });
    }
}

impl fmt::Display for AsciiRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            writeln!(f, "{}", row.trim_end())?;
        }
        Ok(())
    }
}

/// Black is the canvas default line colour; in a terminal it means the
/// default foreground.
fn terminal_color(color: Color) -> style::Color {
    if color == Color::BLACK {
        style::Color::Reset
    } else {
        style::Color::Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        }
    }
}

/// Even-odd crossing test against one closed subpath.
fn contains(closed: &[Point2<f64>], p: Point2<f64>) -> bool {
    let mut inside = false;
    for edge in closed.windows(2) {
        let (a, b) = (edge[0], edge[1]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Liang-Barsky clip of a segment to the box `min..=max`.
fn clip_segment(
    from: Point2<f64>,
    to: Point2<f64>,
    min: Point2<f64>,
    max: Point2<f64>,
) -> Option<(Point2<f64>, Point2<f64>)> {
    let d = to - from;
    if !(d.x.is_finite() && d.y.is_finite()) {
        return None;
    }

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-d.x, from.x - min.x),
        (d.x, max.x - from.x),
        (-d.y, from.y - min.y),
        (d.y, max.y - from.y),
    ] {
        if p == 0.0 {
            // parallel to this edge and outside it
            if q < 0.0 {
                return None;
            }
            continue;
        }

        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some((from + d * t0, from + d * t1))
}

/// Cells visited by a straight segment, endpoints included.
fn line_cells(from: Point2<f64>, to: Point2<f64>) -> Vec<(i64, i64)> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    if !(dx.is_finite() && dy.is_finite()) {
        return Vec::new();
    }

    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            (
                (from.x + dx * t).floor() as i64,
                (from.y + dy * t).floor() as i64,
            )
        })
        .collect()
}
