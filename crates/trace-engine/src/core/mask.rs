//! Alpha raster shared by the guide and the stroke surface.
//!
//! A mask is a `width × height` grid of 8-bit alpha in device pixels, tagged
//! with the device pixel ratio it was created for. Drawing helpers take
//! device-pixel coordinates; callers convert from logical units with
//! [`Mask::to_device`].

use glam::Vec2;

use crate::api::types::SurfaceGeometry;

#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    width: u32,
    height: u32,
    scale: f32,
    alpha: Vec<u8>,
}

impl Mask {
    /// Create an empty (fully transparent) mask.
    pub fn new(width: u32, height: u32, scale: f32) -> Self {
        Self {
            width,
            height,
            scale,
            alpha: vec![0; width as usize * height as usize],
        }
    }

    /// Create an empty mask sized for a surface. Returns `None` for an
    /// unmounted or zero-sized surface.
    pub fn for_geometry(geometry: &SurfaceGeometry) -> Option<Self> {
        if geometry.is_empty() {
            return None;
        }
        let (w, h) = geometry.device_size();
        Some(Self::new(w, h, geometry.scale))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Device pixels per logical pixel.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// True if both masks have identical dimensions and scale.
    pub fn same_shape(&self, other: &Mask) -> bool {
        self.width == other.width && self.height == other.height && self.scale == other.scale
    }

    /// Alpha at (x, y); 0 outside the mask.
    #[inline]
    pub fn alpha(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0;
        }
        self.alpha[y as usize * self.width as usize + x as usize]
    }

    /// Whether the pixel at (x, y) carries ink above `threshold`.
    #[inline]
    pub fn is_inked(&self, x: i32, y: i32, threshold: u8) -> bool {
        self.alpha(x, y) > threshold
    }

    /// Raise the alpha at (x, y) to at least `value`. Out-of-bounds writes are dropped.
    #[inline]
    pub fn blend_max(&mut self, x: i32, y: i32, value: u8) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        if self.alpha[idx] < value {
            self.alpha[idx] = value;
        }
    }

    /// Wipe every pixel back to transparent.
    pub fn clear(&mut self) {
        self.alpha.fill(0);
    }

    /// True when no pixel carries any alpha.
    pub fn is_blank(&self) -> bool {
        self.alpha.iter().all(|&a| a == 0)
    }

    /// Number of pixels with alpha above `threshold`.
    pub fn ink_count(&self, threshold: u8) -> usize {
        self.alpha.iter().filter(|&&a| a > threshold).count()
    }

    /// Convert a logical-pixel point into this mask's device pixels.
    #[inline]
    pub fn to_device(&self, p: Vec2) -> Vec2 {
        p * self.scale
    }

    /// Fill a capsule: every pixel whose center lies within `radius` of the
    /// segment `a → b` (device pixels). Consecutive capsules give a stroke
    /// with round caps and round joins.
    pub fn fill_capsule(&mut self, a: Vec2, b: Vec2, radius: f32, value: u8) {
        if radius <= 0.0 || self.width == 0 || self.height == 0 {
            return;
        }

        let min = a.min(b) - Vec2::splat(radius);
        let max = a.max(b) + Vec2::splat(radius);
        let x0 = (min.x.floor() as i32).max(0);
        let y0 = (min.y.floor() as i32).max(0);
        let x1 = (max.x.ceil() as i32).min(self.width as i32 - 1);
        let y1 = (max.y.ceil() as i32).min(self.height as i32 - 1);
        if x1 < x0 || y1 < y0 {
            return;
        }

        let ab = b - a;
        let len2 = ab.length_squared();
        let r2 = radius * radius;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len2 > 0.0 {
                    ((p - a).dot(ab) / len2).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let closest = a + ab * t;
                if p.distance_squared(closest) <= r2 {
                    self.blend_max(x, y, value);
                }
            }
        }
    }

    /// Fill a disc centered at `center` (device pixels).
    pub fn fill_disc(&mut self, center: Vec2, radius: f32, value: u8) {
        self.fill_capsule(center, center, radius, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_mask_is_blank() {
        let mask = Mask::new(8, 4, 1.0);
        assert_eq!((mask.width(), mask.height()), (8, 4));
        assert_eq!(mask.ink_count(0), 0);
        assert!(mask.is_blank());
    }

    #[test]
    fn out_of_bounds_reads_are_zero() {
        let mut mask = Mask::new(4, 4, 1.0);
        mask.blend_max(-1, 0, 255);
        mask.blend_max(4, 0, 255);
        assert!(mask.is_blank());
        assert_eq!(mask.alpha(-3, 2), 0);
        assert_eq!(mask.alpha(2, 9), 0);
    }

    #[test]
    fn blend_keeps_maximum() {
        let mut mask = Mask::new(2, 2, 1.0);
        mask.blend_max(1, 1, 200);
        mask.blend_max(1, 1, 100);
        assert_eq!(mask.alpha(1, 1), 200);
    }

    #[test]
    fn capsule_covers_segment_and_caps() {
        let mut mask = Mask::new(40, 20, 1.0);
        mask.fill_capsule(Vec2::new(10.0, 10.0), Vec2::new(30.0, 10.0), 3.0, 255);
        assert!(mask.is_inked(20, 10, 50));
        // Round caps extend past the endpoints
        assert!(mask.is_inked(8, 10, 50));
        assert!(mask.is_inked(32, 10, 50));
        // But not far beyond them
        assert!(!mask.is_inked(35, 10, 50));
        assert!(!mask.is_inked(20, 15, 50));
    }

    #[test]
    fn capsule_clips_to_bounds() {
        let mut mask = Mask::new(10, 10, 1.0);
        mask.fill_capsule(Vec2::new(-20.0, 5.0), Vec2::new(30.0, 5.0), 2.0, 255);
        assert!(mask.is_inked(0, 5, 50));
        assert!(mask.is_inked(9, 5, 50));
    }

    #[test]
    fn disc_is_round() {
        let mut mask = Mask::new(21, 21, 1.0);
        mask.fill_disc(Vec2::new(10.5, 10.5), 5.0, 255);
        assert!(mask.is_inked(10, 10, 50));
        assert!(mask.is_inked(14, 10, 50));
        // Corner of the bounding box is outside the circle
        assert!(!mask.is_inked(14, 14, 50));
    }

    #[test]
    fn clear_wipes_ink() {
        let mut mask = Mask::new(10, 10, 1.0);
        mask.fill_disc(Vec2::new(5.0, 5.0), 3.0, 255);
        assert!(mask.ink_count(50) > 0);
        mask.clear();
        assert!(mask.is_blank());
    }

    #[test]
    fn geometry_sizing() {
        let g = SurfaceGeometry::new(100.0, 50.0, 2.0);
        let mask = Mask::for_geometry(&g).unwrap();
        assert_eq!((mask.width(), mask.height()), (200, 100));
        assert_eq!(mask.scale(), 2.0);
        assert!(Mask::for_geometry(&SurfaceGeometry::new(0.0, 50.0, 2.0)).is_none());
    }

    #[test]
    fn same_shape_checks_scale() {
        let a = Mask::new(10, 10, 1.0);
        let b = Mask::new(10, 10, 2.0);
        assert!(!a.same_shape(&b));
        assert!(a.same_shape(&a.clone()));
    }
}
