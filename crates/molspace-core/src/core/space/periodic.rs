use super::config::{BoxLengthPolicy, SpaceConfig};
use super::error::SpaceError;
use super::kernels;
use super::{Space, SpaceKind, Volume};
use crate::core::geometry::aabox::AABox;
use crate::core::geometry::coords::CoordGroup;
use crate::core::geometry::matrix::PairMatrix;
use itertools::iproduct;
use nalgebra::{Point3, Vector3};
use rand::{Rng, RngCore};
use tracing::{debug, warn};

const AXES: [char; 3] = ['x', 'y', 'z'];

/// A rectangular cell repeated infinitely along x, y and z.
///
/// The box is described by its two corners; the side lengths, their halves and
/// their reciprocals are derived from them and kept in step by
/// [`set_dimensions`](Self::set_dimensions), which is the only way to change the
/// geometry. A failed update leaves every field untouched.
///
/// Distances follow the minimum-image convention: every displacement is measured
/// to the nearest periodic image of its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicBox {
    min_coords: Point3<f64>,
    max_coords: Point3<f64>,
    box_length: Vector3<f64>,
    half_length: Vector3<f64>,
    inv_length: Vector3<f64>,
    config: SpaceConfig,
}

impl PeriodicBox {
    /// Creates a box spanning `min` to `max` with the default configuration.
    pub fn new(min: &Point3<f64>, max: &Point3<f64>) -> Result<Self, SpaceError> {
        Self::with_config(min, max, SpaceConfig::default())
    }

    pub fn with_config(
        min: &Point3<f64>,
        max: &Point3<f64>,
        config: SpaceConfig,
    ) -> Result<Self, SpaceError> {
        let mut space = Self {
            min_coords: Point3::origin(),
            max_coords: Point3::origin(),
            box_length: Vector3::zeros(),
            half_length: Vector3::zeros(),
            inv_length: Vector3::zeros(),
            config,
        };
        space.set_dimensions(min, max)?;
        Ok(space)
    }

    /// Creates a box with its lower corner at the origin.
    pub fn from_dimensions(lengths: &Vector3<f64>) -> Result<Self, SpaceError> {
        Self::new(&Point3::origin(), &Point3::from(*lengths))
    }

    pub fn cubic(length: f64) -> Result<Self, SpaceError> {
        Self::from_dimensions(&Vector3::repeat(length))
    }

    /// Sets the corners of the box and recomputes every derived quantity.
    ///
    /// The corners may be given in any order. Sides longer than the configured
    /// maximum are clamped or rejected according to the [`BoxLengthPolicy`].
    ///
    /// # Errors
    ///
    /// - [`SpaceError::NonFinite`] if any coordinate is NaN or infinite.
    /// - [`SpaceError::ZeroLength`] if the corners coincide along an axis.
    /// - [`SpaceError::TooLarge`] for an oversized side under [`BoxLengthPolicy::Reject`].
    ///
    /// The box is unchanged when an error is returned.
    pub fn set_dimensions(&mut self, min: &Point3<f64>, max: &Point3<f64>) -> Result<(), SpaceError> {
        if !min.iter().chain(max.iter()).all(|c| c.is_finite()) {
            return Err(SpaceError::NonFinite);
        }

        let lo = min.inf(max);
        let mut hi = min.sup(max);
        let max_length = self.config.max_box_length;

        for (i, &axis) in AXES.iter().enumerate() {
            let length = hi[i] - lo[i];
            if length == 0.0 {
                return Err(SpaceError::ZeroLength { axis });
            }
            if length > max_length {
                match self.config.length_policy {
                    BoxLengthPolicy::Reject => {
                        return Err(SpaceError::TooLarge {
                            axis,
                            length,
                            max: max_length,
                        });
                    }
                    BoxLengthPolicy::Clamp => {
                        debug!(axis = %axis, length, max = max_length, "Clamping periodic box side.");
                        hi[i] = lo[i] + max_length;
                    }
                }
            }
        }

        let box_length = hi - lo;
        self.min_coords = lo;
        self.max_coords = hi;
        self.box_length = box_length;
        self.half_length = box_length * 0.5;
        self.inv_length = box_length.map(|l| 1.0 / l);

        debug!(
            lengths = ?(box_length.x, box_length.y, box_length.z),
            "Periodic box dimensions updated."
        );
        Ok(())
    }

    #[inline]
    pub fn min_coords(&self) -> Point3<f64> {
        self.min_coords
    }

    #[inline]
    pub fn max_coords(&self) -> Point3<f64> {
        self.max_coords
    }

    #[inline]
    pub fn box_length(&self) -> Vector3<f64> {
        self.box_length
    }

    #[inline]
    pub fn half_length(&self) -> Vector3<f64> {
        self.half_length
    }

    #[inline]
    pub fn inv_length(&self) -> Vector3<f64> {
        self.inv_length
    }

    pub fn config(&self) -> &SpaceConfig {
        &self.config
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min_coords, &self.max_coords)
    }

    /// The whole-box offset to subtract from `q` so that it becomes the image
    /// nearest `p`.
    ///
    /// Along each axis the offset is zero while `|q - p|` is at most half the box
    /// length; otherwise it is the nearest multiple of the box length, with ties
    /// rounded away from zero.
    #[inline]
    pub fn wrap_delta(&self, p: &Point3<f64>, q: &Point3<f64>) -> Vector3<f64> {
        let delta = q - p;
        Vector3::new(
            self.wrap_axis(delta.x, 0),
            self.wrap_axis(delta.y, 1),
            self.wrap_axis(delta.z, 2),
        )
    }

    #[inline]
    fn wrap_axis(&self, delta: f64, i: usize) -> f64 {
        if delta.abs() <= self.half_length[i] {
            0.0
        } else {
            (delta * self.inv_length[i]).round() * self.box_length[i]
        }
    }

    /// Whether `group` is small enough for a single shift per group pair to give
    /// exact minimum-image distances: its full extent must be below half the box
    /// length along every axis.
    pub fn fits_single_image(&self, group: &CoordGroup) -> bool {
        let extent = group.aabox().half_extents() * 2.0;
        (0..3).all(|i| extent[i] < self.half_length[i])
    }

    /// Displacement that moves `point` from its place in this box to the same
    /// fractional place in `target`.
    pub fn scale_delta(&self, point: &Point3<f64>, target: &PeriodicBox) -> Vector3<f64> {
        let offset = point - self.center();
        let scaled = offset.component_mul(&target.box_length).component_mul(&self.inv_length);
        (target.center() + scaled) - point
    }

    fn group_shift(&self, group0: &CoordGroup, group1: &CoordGroup) -> Vector3<f64> {
        if self.config.warn_on_oversized_groups {
            for group in [group0, group1] {
                if !self.fits_single_image(group) {
                    let extent = group.aabox().half_extents() * 2.0;
                    warn!(
                        extent = ?(extent.x, extent.y, extent.z),
                        "Group spans half the periodic box or more; group-pair distances may miss nearer images."
                    );
                }
            }
        }
        self.wrap_delta(&group1.aabox().center(), &group0.aabox().center())
    }

    fn group_kernel<F, B>(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix,
        value: F,
        better: B,
        init: f64,
    ) -> f64
    where
        F: Fn(f64) -> f64,
        B: Fn(f64, f64) -> f64,
    {
        let shift = self.group_shift(group0, group1);
        kernels::inter(group0.coords(), group1.coords(), &shift, matrix, value, better, init)
    }

    /// Whether a cutoff can be searched for replicas at all: negative, NaN and
    /// infinite cutoffs select none.
    fn searchable_cutoff(dist: f64) -> bool {
        dist.is_finite() && dist >= 0.0
    }

    fn replica_layers(&self, reach: f64) -> (i64, i64, i64) {
        let n = (self.inv_length * reach).map(|v| v.round());
        (n.x as i64, n.y as i64, n.z as i64)
    }
}

impl Space for PeriodicBox {
    fn kind(&self) -> SpaceKind {
        SpaceKind::PeriodicBox
    }

    fn volume(&self) -> f64 {
        self.box_length.x * self.box_length.y * self.box_length.z
    }

    fn set_volume(&mut self, volume: f64) -> Result<(), SpaceError> {
        if volume < 0.0 {
            return Err(SpaceError::NegativeVolume(volume));
        }
        if !volume.is_finite() {
            return Err(SpaceError::NonFinite);
        }

        let scale = (volume / self.volume()).cbrt();
        let lengths = self.box_length * scale;
        let max_length = self.config.max_box_length;
        // Clamping one side would break the uniform rescale, so oversized
        // targets are refused whatever the length policy says.
        if let Some(i) = (0..3).find(|&i| lengths[i] > max_length) {
            return Err(SpaceError::TooLarge {
                axis: AXES[i],
                length: lengths[i],
                max: max_length,
            });
        }

        let center = self.center();
        let half = self.half_length * scale;
        self.set_dimensions(&(center - half), &(center + half))
    }

    #[inline]
    fn calc_dist_vector(&self, p0: &Point3<f64>, p1: &Point3<f64>) -> Vector3<f64> {
        (p1 - p0) - self.wrap_delta(p0, p1)
    }

    // A group is contiguous, so intra-group pairs are never wrapped.
    fn calc_intra_dist(&self, group: &CoordGroup, matrix: &mut PairMatrix) -> f64 {
        kernels::intra(group.coords(), matrix, kernels::dist, f64::min, f64::INFINITY)
    }

    fn calc_intra_dist2(&self, group: &CoordGroup, matrix: &mut PairMatrix) -> f64 {
        kernels::intra(group.coords(), matrix, kernels::dist2, f64::min, f64::INFINITY)
    }

    fn calc_intra_inv_dist(&self, group: &CoordGroup, matrix: &mut PairMatrix) -> f64 {
        kernels::intra(group.coords(), matrix, kernels::inv_dist, f64::max, 0.0)
    }

    fn calc_intra_inv_dist2(&self, group: &CoordGroup, matrix: &mut PairMatrix) -> f64 {
        kernels::intra(group.coords(), matrix, kernels::inv_dist2, f64::max, 0.0)
    }

    fn calc_group_dist(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix,
    ) -> f64 {
        self.group_kernel(group0, group1, matrix, kernels::dist, f64::min, f64::INFINITY)
    }

    fn calc_group_dist2(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix,
    ) -> f64 {
        self.group_kernel(group0, group1, matrix, kernels::dist2, f64::min, f64::INFINITY)
    }

    fn calc_group_inv_dist(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix,
    ) -> f64 {
        self.group_kernel(group0, group1, matrix, kernels::inv_dist, f64::max, 0.0)
    }

    fn calc_group_inv_dist2(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix,
    ) -> f64 {
        self.group_kernel(group0, group1, matrix, kernels::inv_dist2, f64::max, 0.0)
    }

    fn calc_dist_vectors(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix<Vector3<f64>>,
    ) -> f64 {
        let shift = self.group_shift(group0, group1);
        kernels::inter_vectors(group0.coords(), group1.coords(), &shift, matrix)
    }

    fn beyond_boxes(&self, dist: f64, box0: &AABox, box1: &AABox) -> bool {
        let reach = dist + box0.radius() + box1.radius();
        self.calc_dist2(&box0.center(), &box1.center()) > reach * reach
    }

    fn minimum_distance(&self, group0: &CoordGroup, group1: &CoordGroup) -> f64 {
        let shift = self.group_shift(group0, group1);
        kernels::min_dist2(group0.coords(), group1.coords(), &shift).sqrt()
    }

    fn minimum_image(&self, group: &CoordGroup, point: &Point3<f64>) -> CoordGroup {
        let offset = self.wrap_delta(point, &group.aabox().center());
        group.translated(&-offset)
    }

    fn minimum_image_point(&self, point: &Point3<f64>, center: &Point3<f64>) -> Point3<f64> {
        point - self.wrap_delta(center, point)
    }

    /// Enumerates the replicas of `group` around `center_group`.
    ///
    /// The nearest replica is found first; every other candidate is that replica
    /// shifted by a whole number of box lengths, up to as many layers as the
    /// combined reach of the two groups and the cutoff spans. Candidates are
    /// screened with the bounding spheres before their exact distance is computed.
    ///
    /// The number of candidates grows with the cube of `dist` over the box length.
    /// A negative, NaN or infinite `dist` yields no copies.
    fn copies_within(
        &self,
        group: &CoordGroup,
        center_group: &CoordGroup,
        dist: f64,
    ) -> Vec<(f64, CoordGroup)> {
        if !Self::searchable_cutoff(dist) || self.beyond(dist, group, center_group) {
            return Vec::new();
        }

        let center = center_group.aabox().center();
        let image = self.minimum_image(group, &center);
        let image_center = image.aabox().center();
        let reach = dist + image.aabox().radius() + center_group.aabox().radius();
        let (nx, ny, nz) = self.replica_layers(reach);
        let dist2 = dist * dist;

        let mut copies = Vec::new();
        for (i, j, k) in iproduct!(-nx..=nx, -ny..=ny, -nz..=nz) {
            let shift = Vector3::new(i as f64, j as f64, k as f64).component_mul(&self.box_length);
            if (image_center + shift - center).norm_squared() > reach * reach {
                continue;
            }
            let d2 = kernels::min_dist2(image.coords(), center_group.coords(), &-shift);
            if d2 <= dist2 {
                copies.push((d2.sqrt(), image.translated(&shift)));
            }
        }
        copies
    }

    fn images_within(
        &self,
        point: &Point3<f64>,
        center: &Point3<f64>,
        dist: f64,
    ) -> Vec<(f64, Point3<f64>)> {
        if !Self::searchable_cutoff(dist) {
            return Vec::new();
        }
        let image = self.minimum_image_point(point, center);
        let (nx, ny, nz) = self.replica_layers(dist);

        iproduct!(-nx..=nx, -ny..=ny, -nz..=nz)
            .filter_map(|(i, j, k)| {
                let shift = Vector3::new(i as f64, j as f64, k as f64).component_mul(&self.box_length);
                let candidate = image + shift;
                let d = (candidate - center).norm();
                (d <= dist).then_some((d, candidate))
            })
            .collect()
    }

    fn map_from_cartesian(&self, group: &CoordGroup) -> CoordGroup {
        self.minimum_image(group, &self.center())
    }

    fn map_from_self(&self, group: &CoordGroup, other: &Volume) -> Result<CoordGroup, SpaceError> {
        match other {
            Volume::Periodic(source) => {
                let delta = source.scale_delta(&group.aabox().center(), self);
                Ok(group.translated(&delta))
            }
            Volume::Cartesian(_) => Err(SpaceError::Incompatible {
                operation: "map_from_self",
                from: SpaceKind::Cartesian,
                to: SpaceKind::PeriodicBox,
            }),
        }
    }

    fn box_center(&self, point: &Point3<f64>) -> Point3<f64> {
        let cell = (point - self.min_coords)
            .component_mul(&self.inv_length)
            .map(|v| v.floor() + 0.5);
        self.min_coords + cell.component_mul(&self.box_length)
    }

    fn random_point(&self, center: &Point3<f64>, rng: &mut dyn RngCore) -> Point3<f64> {
        let unit = Vector3::new(
            rng.gen_range(-0.5..0.5),
            rng.gen_range(-0.5..0.5),
            rng.gen_range(-0.5..0.5),
        );
        center + unit.component_mul(&self.box_length)
    }
}
