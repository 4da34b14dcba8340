//! Overlay tessellation.
//!
//! Dots, pen strokes and stars are tessellated with lyon into a single
//! non-indexed triangle list. JavaScript reads it straight out of wasm
//! memory as `[x, y, r, g, b, a]` floats in logical pixels.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use lyon::math::{point, Point};
use lyon::path::{Path, Winding};
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, FillVertexConstructor, LineCap,
    LineJoin, StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor,
    TessellationError, VertexBuffers,
};

/// Flattening tolerance in logical px.
const TOLERANCE: f32 = 0.5;

/// One overlay vertex: position then straight (non-premultiplied) RGBA.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VectorVertex {
    pub pos: [f32; 2],
    pub color: [f32; 4],
}

impl VectorVertex {
    pub const FLOATS: usize = 6;
    pub const STRIDE_BYTES: usize = Self::FLOATS * std::mem::size_of::<f32>();
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl VectorColor {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Faded guide gray, #E0E0E0.
    pub const GUIDE: Self = Self::new(0.878, 0.878, 0.878, 1.0);
    /// Calm green used for user strokes, #81C784.
    pub const STROKE: Self = Self::new(0.506, 0.780, 0.518, 1.0);
    /// Completion glow around strokes, #388E3C.
    pub const GLOW: Self = Self::new(0.220, 0.557, 0.235, 0.35);
    /// Star fill, #FACC15.
    pub const STAR: Self = Self::new(0.980, 0.800, 0.082, 1.0);
}

/// Paints every tessellated vertex a single flat color.
struct Paint([f32; 4]);

impl Paint {
    fn vertex(&self, p: Point) -> VectorVertex {
        VectorVertex {
            pos: [p.x, p.y],
            color: self.0,
        }
    }
}

impl FillVertexConstructor<VectorVertex> for Paint {
    fn new_vertex(&mut self, vertex: FillVertex) -> VectorVertex {
        self.vertex(vertex.position())
    }
}

impl StrokeVertexConstructor<VectorVertex> for Paint {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> VectorVertex {
        self.vertex(vertex.position())
    }
}

/// Path through `points`, closed for fills and left open for pen strokes.
fn polyline_path(points: &[Vec2], closed: bool) -> Path {
    let mut builder = Path::builder();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        builder.begin(point(first.x, first.y));
        for p in iter {
            builder.line_to(point(p.x, p.y));
        }
        builder.end(closed);
    }
    builder.build()
}

/// Overlay geometry for one frame plus the tessellators that produce it.
pub struct VectorState {
    fill: FillTessellator,
    stroke: StrokeTessellator,
    /// Indexed scratch output of the last tessellation.
    scratch: VertexBuffers<VectorVertex, u32>,
    triangles: Vec<VectorVertex>,
}

impl VectorState {
    pub fn new() -> Self {
        Self {
            fill: FillTessellator::new(),
            stroke: StrokeTessellator::new(),
            scratch: VertexBuffers::new(),
            triangles: Vec::with_capacity(4096),
        }
    }

    pub fn clear(&mut self) {
        self.triangles.clear();
    }

    pub fn vertex_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn vertices(&self) -> &[VectorVertex] {
        &self.triangles
    }

    /// The triangle list as flat floats.
    pub fn floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.triangles)
    }

    pub fn buffer_ptr(&self) -> *const f32 {
        self.floats().as_ptr()
    }

    /// Expand the scratch buffers into the triangle list, or drop them if
    /// tessellation failed part way.
    fn commit(&mut self, result: Result<(), TessellationError>) {
        match result {
            Ok(()) => {
                let VertexBuffers { vertices, indices } = &self.scratch;
                self.triangles
                    .extend(indices.iter().map(|&i| vertices[i as usize]));
            }
            Err(e) => log::debug!("Overlay tessellation failed: {e:?}"),
        }
        self.scratch.vertices.clear();
        self.scratch.indices.clear();
    }

    pub fn fill_path(&mut self, path: &Path, color: VectorColor) {
        let result = self.fill.tessellate_path(
            path,
            &FillOptions::tolerance(TOLERANCE),
            &mut BuffersBuilder::new(&mut self.scratch, Paint(color.to_array())),
        );
        self.commit(result);
    }

    /// Stroke with round caps and joins, like a pen.
    pub fn stroke_path(&mut self, path: &Path, width: f32, color: VectorColor) {
        let options = StrokeOptions::tolerance(TOLERANCE)
            .with_line_width(width)
            .with_line_cap(LineCap::Round)
            .with_line_join(LineJoin::Round);
        let result = self.stroke.tessellate_path(
            path,
            &options,
            &mut BuffersBuilder::new(&mut self.scratch, Paint(color.to_array())),
        );
        self.commit(result);
    }

    /// Closed polygon; concave outlines are fine.
    pub fn fill_polygon(&mut self, points: &[Vec2], color: VectorColor) {
        if points.len() >= 3 {
            self.fill_path(&polyline_path(points, true), color);
        }
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: VectorColor) {
        if radius <= 0.0 {
            return;
        }
        let mut builder = Path::builder();
        builder.add_circle(point(center.x, center.y), radius, Winding::Positive);
        self.fill_path(&builder.build(), color);
    }

    /// Five-pointed star; `rotation` 0 has a point straight up.
    pub fn fill_star(&mut self, center: Vec2, outer: f32, rotation: f32, color: VectorColor) {
        if outer <= 0.0 {
            return;
        }
        let inner = outer * 0.45;
        let step = std::f32::consts::PI / 5.0;
        let outline: Vec<Vec2> = (0..10)
            .map(|i| {
                let r = if i % 2 == 0 { outer } else { inner };
                let angle = rotation - std::f32::consts::FRAC_PI_2 + i as f32 * step;
                center + Vec2::from_angle(angle) * r
            })
            .collect();
        self.fill_polygon(&outline, color);
    }

    pub fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: VectorColor) {
        if points.len() >= 2 && width > 0.0 {
            self.stroke_path(&polyline_path(points, false), width, color);
        }
    }
}

impl Default for VectorState {
    fn default() -> Self {
        Self::new()
    }
}
