use nalgebra::{Point3, Vector3};
use std::ops::{Add, AddAssign};

/// An axis-aligned box enclosing a set of points.
///
/// The box is stored as a center and half-extents, together with the radius of
/// the sphere (centered on the box center) that encloses the whole box. The
/// radius is always the Euclidean norm of the half-extents; it is derived, never
/// set independently.
///
/// Boxes are used for cheap rejection tests before any exact distance work is
/// done, so every query here is O(1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABox {
    center: Point3<f64>,
    half_extents: Vector3<f64>,
    radius: f64,
}

impl Default for AABox {
    fn default() -> Self {
        Self {
            center: Point3::origin(),
            half_extents: Vector3::zeros(),
            radius: 0.0,
        }
    }
}

impl AABox {
    /// Creates a degenerate, zero-sized box at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a box from an explicit center and half-extents.
    ///
    /// Negative half-extents are interpreted by magnitude.
    ///
    /// # Arguments
    ///
    /// * `center` - The center of the box.
    /// * `half_extents` - Half the side length of the box along each axis.
    pub fn from_center_extents(center: Point3<f64>, half_extents: Vector3<f64>) -> Self {
        let half_extents = half_extents.abs();
        Self {
            center,
            half_extents,
            radius: half_extents.norm(),
        }
    }

    /// Creates the box spanning two corners.
    ///
    /// The corners do not need to be ordered; the minimum and maximum are taken
    /// per axis.
    pub fn from_min_max(min: &Point3<f64>, max: &Point3<f64>) -> Self {
        let lo = min.inf(max);
        let hi = min.sup(max);
        Self::from_ordered_corners(&lo, &hi)
    }

    /// Creates the smallest axis-aligned box enclosing all `points`.
    ///
    /// An empty slice yields the degenerate zero box at the origin.
    pub fn from_points(points: &[Point3<f64>]) -> Self {
        let mut aabox = Self::default();
        aabox.recalculate(points);
        aabox
    }

    /// Recomputes the box from scratch so that it encloses exactly `points`.
    ///
    /// This is a single O(n) pass computing the component-wise minimum and
    /// maximum; the center, half-extents and radius are then derived from them.
    pub fn recalculate(&mut self, points: &[Point3<f64>]) {
        let Some((first, rest)) = points.split_first() else {
            *self = Self::default();
            return;
        };

        let mut lo = *first;
        let mut hi = *first;
        for p in rest {
            lo = lo.inf(p);
            hi = hi.sup(p);
        }

        *self = Self::from_ordered_corners(&lo, &hi);
    }

    fn from_ordered_corners(lo: &Point3<f64>, hi: &Point3<f64>) -> Self {
        let center = nalgebra::center(lo, hi);
        let half_extents = hi - center;
        Self {
            center,
            half_extents,
            radius: half_extents.norm(),
        }
    }

    #[inline]
    pub fn center(&self) -> Point3<f64> {
        self.center
    }

    #[inline]
    pub fn half_extents(&self) -> Vector3<f64> {
        self.half_extents
    }

    /// Radius of the sphere around [`center`](Self::center) enclosing the box.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn min_coords(&self) -> Point3<f64> {
        self.center - self.half_extents
    }

    #[inline]
    pub fn max_coords(&self) -> Point3<f64> {
        self.center + self.half_extents
    }

    /// Shifts the box by `delta`. The extents are unaffected.
    #[inline]
    pub fn translate(&mut self, delta: &Vector3<f64>) {
        self.center += delta;
    }

    pub fn translated(&self, delta: &Vector3<f64>) -> Self {
        let mut moved = *self;
        moved.translate(delta);
        moved
    }

    /// Returns whether this box and `other` overlap (touching counts).
    ///
    /// Separating-axis test: the boxes are disjoint as soon as the gap between
    /// them is positive along any single axis.
    pub fn intersects(&self, other: &AABox) -> bool {
        let gap = (self.center - other.center).abs() - (self.half_extents + other.half_extents);
        gap.x <= 0.0 && gap.y <= 0.0 && gap.z <= 0.0
    }

    /// Returns whether any point of this box lies within `dist` of `other`.
    ///
    /// The per-axis gaps are clamped at zero (overlap along an axis contributes
    /// nothing), and the boxes are within `dist` iff the squared length of the
    /// gap vector is at most `dist²`.
    pub fn within_distance(&self, dist: f64, other: &AABox) -> bool {
        let gap = (self.center - other.center).abs() - (self.half_extents + other.half_extents);
        let gap = gap.map(|g| g.max(0.0));
        gap.norm_squared() <= dist * dist
    }

    /// Returns whether `other` lies completely inside this box.
    pub fn contains(&self, other: &AABox) -> bool {
        let lo = self.min_coords();
        let hi = self.max_coords();
        let other_lo = other.min_coords();
        let other_hi = other.max_coords();
        (0..3).all(|i| lo[i] <= other_lo[i] && hi[i] >= other_hi[i])
    }

    /// Grows this box into the union of itself and `other`.
    ///
    /// The union is rebuilt from the combined extrema of the two boxes rather than
    /// patched, so the radius invariant holds exactly afterwards.
    pub fn add(&mut self, other: &AABox) {
        let lo = self.min_coords().inf(&other.min_coords());
        let hi = self.max_coords().sup(&other.max_coords());
        *self = Self::from_ordered_corners(&lo, &hi);
    }
}

impl AddAssign<&AABox> for AABox {
    fn add_assign(&mut self, other: &AABox) {
        AABox::add(self, other);
    }
}

impl AddAssign for AABox {
    fn add_assign(&mut self, other: AABox) {
        AABox::add(self, &other);
    }
}

impl Add for AABox {
    type Output = AABox;

    fn add(mut self, other: AABox) -> AABox {
        AABox::add(&mut self, &other);
        self
    }
}
