//! # Space Module
//!
//! The simulation volume abstraction: how distances are measured, how points are
//! wrapped, and which periodic copies of a group exist near another group.
//!
//! ## Overview
//!
//! Every distance computed by molspace goes through the [`Space`] trait. Two
//! spaces exist:
//!
//! - [`Cartesian`](cartesian::Cartesian) - infinite, non-periodic space; plain Euclidean geometry.
//! - [`PeriodicBox`](periodic::PeriodicBox) - a rectangular cell repeated along all three axes,
//!   using the minimum-image convention.
//!
//! [`Volume`] is the closed sum of the two and is what callers normally hold. It
//! implements [`Space`] by delegating each call with a single `match`, so there
//! is no dynamic dispatch in the energy loops.
//!
//! ## Group kernels
//!
//! The `calc_group_*` family fills a caller-owned [`PairMatrix`] with one value
//! per (outer point, inner point) pair and returns the single best value: the
//! shortest distance, shortest squared distance, largest inverse distance or
//! largest inverse squared distance. The `calc_intra_*` family does the same for
//! the pairs inside one group; the matrix is symmetric with a zero diagonal.
//!
//! In a periodic box the minimum-image shift is computed once per group pair, from
//! the centers of the two bounding boxes, and applied to every outer point. This
//! is exact only while each group spans less than half the box along every axis
//! (see [`PeriodicBox::fits_single_image`](periodic::PeriodicBox::fits_single_image));
//! honouring that precondition is the caller's job. Intra-group kernels never wrap:
//! a group is assumed to be contiguous.
//!
//! ## Cutoff rejection
//!
//! [`Space::beyond`] is conservative and one-sided. `true` means the groups are
//! certainly farther apart than the cutoff; `false` means nothing, and must be
//! followed by an exact calculation.

pub mod cartesian;
pub mod config;
pub mod error;
mod kernels;
pub mod periodic;

use crate::core::geometry::aabox::AABox;
use crate::core::geometry::coords::CoordGroup;
use crate::core::geometry::matrix::PairMatrix;
use cartesian::Cartesian;
use error::SpaceError;
use nalgebra::{Point3, Vector3};
use periodic::PeriodicBox;
use rand::RngCore;
use std::fmt;

/// Tag naming the kind of a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceKind {
    Cartesian,
    PeriodicBox,
}

impl fmt::Display for SpaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpaceKind::Cartesian => write!(f, "Cartesian"),
            SpaceKind::PeriodicBox => write!(f, "periodic box"),
        }
    }
}

/// The contract every simulation volume fulfils.
pub trait Space: fmt::Debug + Send + Sync {
    fn kind(&self) -> SpaceKind;

    fn is_periodic(&self) -> bool {
        self.kind() == SpaceKind::PeriodicBox
    }

    fn is_cartesian(&self) -> bool {
        self.kind() == SpaceKind::Cartesian
    }

    /// The volume enclosed by the space (infinite for Cartesian space).
    fn volume(&self) -> f64;

    /// Uniformly rescales the space about its center to enclose `volume`.
    ///
    /// # Errors
    ///
    /// Fails for negative or non-finite volumes and for spaces that cannot be
    /// resized. On failure the space is unchanged.
    fn set_volume(&mut self, volume: f64) -> Result<(), SpaceError>;

    /// Vector from `p0` to the nearest image of `p1`.
    fn calc_dist_vector(&self, p0: &Point3<f64>, p1: &Point3<f64>) -> Vector3<f64>;

    fn calc_dist2(&self, p0: &Point3<f64>, p1: &Point3<f64>) -> f64 {
        self.calc_dist_vector(p0, p1).norm_squared()
    }

    fn calc_dist(&self, p0: &Point3<f64>, p1: &Point3<f64>) -> f64 {
        self.calc_dist2(p0, p1).sqrt()
    }

    /// Angle at `p1` formed by `p0`, `p1`, `p2`, in radians.
    fn calc_angle(&self, p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> f64 {
        let v10 = self.calc_dist_vector(p1, p0);
        let v12 = self.calc_dist_vector(p1, p2);
        v10.angle(&v12)
    }

    /// Dihedral angle about the `p1`-`p2` bond, in radians, in `(-π, π]`.
    fn calc_dihedral(
        &self,
        p0: &Point3<f64>,
        p1: &Point3<f64>,
        p2: &Point3<f64>,
        p3: &Point3<f64>,
    ) -> f64 {
        let b1 = self.calc_dist_vector(p0, p1);
        let b2 = self.calc_dist_vector(p1, p2);
        let b3 = self.calc_dist_vector(p2, p3);

        let n1 = b1.cross(&b2);
        let n2 = b2.cross(&b3);
        let m1 = n1.cross(&b2.normalize());

        let x = n1.dot(&n2);
        let y = m1.dot(&n2);
        y.atan2(x)
    }

    fn calc_intra_dist(&self, group: &CoordGroup, matrix: &mut PairMatrix) -> f64;
    fn calc_intra_dist2(&self, group: &CoordGroup, matrix: &mut PairMatrix) -> f64;
    fn calc_intra_inv_dist(&self, group: &CoordGroup, matrix: &mut PairMatrix) -> f64;
    fn calc_intra_inv_dist2(&self, group: &CoordGroup, matrix: &mut PairMatrix) -> f64;

    fn calc_group_dist(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix,
    ) -> f64;
    fn calc_group_dist2(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix,
    ) -> f64;
    fn calc_group_inv_dist(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix,
    ) -> f64;
    fn calc_group_inv_dist2(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix,
    ) -> f64;

    /// Fills `matrix` with the vectors from each point of `group0` to each point of
    /// `group1` and returns the shortest distance.
    fn calc_dist_vectors(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix<Vector3<f64>>,
    ) -> f64;

    /// Conservative test on two bounding boxes; see [`beyond`](Self::beyond).
    fn beyond_boxes(&self, dist: f64, box0: &AABox, box1: &AABox) -> bool;

    /// Returns `true` only if the groups are certainly more than `dist` apart.
    fn beyond(&self, dist: f64, group0: &CoordGroup, group1: &CoordGroup) -> bool {
        self.beyond_boxes(dist, group0.aabox(), group1.aabox())
    }

    /// Shortest distance between any point of `group0` and any point of `group1`.
    /// Infinite if either group is empty.
    fn minimum_distance(&self, group0: &CoordGroup, group1: &CoordGroup) -> f64;

    /// Shortest distance between two points of `group`. Infinite for groups of
    /// fewer than two points.
    fn minimum_intra_distance(&self, group: &CoordGroup) -> f64 {
        kernels::min_intra_dist2(group.coords()).sqrt()
    }

    /// The copy of `group` whose bounding-box center is in the cell nearest `point`.
    fn minimum_image(&self, group: &CoordGroup, point: &Point3<f64>) -> CoordGroup;

    /// The image of `point` nearest `center`.
    fn minimum_image_point(&self, point: &Point3<f64>, center: &Point3<f64>) -> Point3<f64>;

    /// Every periodic copy of `group` whose minimum distance to `center_group` is
    /// at most `dist`, each paired with that distance.
    fn copies_within(
        &self,
        group: &CoordGroup,
        center_group: &CoordGroup,
        dist: f64,
    ) -> Vec<(f64, CoordGroup)>;

    /// Every periodic image of `point` within `dist` of `center`, each paired with
    /// its distance.
    fn images_within(
        &self,
        point: &Point3<f64>,
        center: &Point3<f64>,
        dist: f64,
    ) -> Vec<(f64, Point3<f64>)>;

    /// Re-expresses a group given in plain Cartesian coordinates in this space.
    fn map_from_cartesian(&self, group: &CoordGroup) -> CoordGroup;

    /// Re-expresses a group given in `other` in this space. Both spaces must be of
    /// the same kind.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::Incompatible`] if `other` is of a different kind.
    fn map_from_self(&self, group: &CoordGroup, other: &Volume) -> Result<CoordGroup, SpaceError>;

    /// Center of the cell containing `point`.
    fn box_center(&self, point: &Point3<f64>) -> Point3<f64>;

    /// A uniformly distributed random point in the cell-sized region around
    /// `center`.
    fn random_point(&self, center: &Point3<f64>, rng: &mut dyn RngCore) -> Point3<f64>;
}

/// A simulation volume of any supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Volume {
    Cartesian(Cartesian),
    Periodic(PeriodicBox),
}

impl Default for Volume {
    fn default() -> Self {
        Volume::Cartesian(Cartesian)
    }
}

impl From<Cartesian> for Volume {
    fn from(space: Cartesian) -> Self {
        Volume::Cartesian(space)
    }
}

impl From<PeriodicBox> for Volume {
    fn from(space: PeriodicBox) -> Self {
        Volume::Periodic(space)
    }
}

impl Volume {
    pub fn as_periodic(&self) -> Option<&PeriodicBox> {
        match self {
            Volume::Periodic(space) => Some(space),
            Volume::Cartesian(_) => None,
        }
    }

    /// Maps `group`, expressed in this space, into `other`.
    ///
    /// - Into Cartesian space, coordinates are already absolute and are returned
    ///   unchanged.
    /// - From Cartesian space, `other` places the group as it would any Cartesian
    ///   input.
    /// - Between two periodic boxes, the group keeps its fractional position (see
    ///   [`PeriodicBox::scale_delta`]).
    pub fn map_to_space(&self, group: &CoordGroup, other: &Volume) -> Result<CoordGroup, SpaceError> {
        match (self, other) {
            (_, Volume::Cartesian(_)) => Ok(group.clone()),
            (Volume::Cartesian(_), target) => Ok(target.map_from_cartesian(group)),
            (Volume::Periodic(_), Volume::Periodic(target)) => target.map_from_self(group, self),
        }
    }
}

macro_rules! dispatch {
    ($volume:expr, $space:ident => $call:expr) => {
        match $volume {
            Volume::Cartesian($space) => $call,
            Volume::Periodic($space) => $call,
        }
    };
}

impl Space for Volume {
    fn kind(&self) -> SpaceKind {
        dispatch!(self, s => s.kind())
    }

    fn volume(&self) -> f64 {
        dispatch!(self, s => s.volume())
    }

    fn set_volume(&mut self, volume: f64) -> Result<(), SpaceError> {
        dispatch!(self, s => s.set_volume(volume))
    }

    #[inline]
    fn calc_dist_vector(&self, p0: &Point3<f64>, p1: &Point3<f64>) -> Vector3<f64> {
        dispatch!(self, s => s.calc_dist_vector(p0, p1))
    }

    #[inline]
    fn calc_dist2(&self, p0: &Point3<f64>, p1: &Point3<f64>) -> f64 {
        dispatch!(self, s => s.calc_dist2(p0, p1))
    }

    #[inline]
    fn calc_dist(&self, p0: &Point3<f64>, p1: &Point3<f64>) -> f64 {
        dispatch!(self, s => s.calc_dist(p0, p1))
    }

    fn calc_intra_dist(&self, group: &CoordGroup, matrix: &mut PairMatrix) -> f64 {
        dispatch!(self, s => s.calc_intra_dist(group, matrix))
    }

    fn calc_intra_dist2(&self, group: &CoordGroup, matrix: &mut PairMatrix) -> f64 {
        dispatch!(self, s => s.calc_intra_dist2(group, matrix))
    }

    fn calc_intra_inv_dist(&self, group: &CoordGroup, matrix: &mut PairMatrix) -> f64 {
        dispatch!(self, s => s.calc_intra_inv_dist(group, matrix))
    }

    fn calc_intra_inv_dist2(&self, group: &CoordGroup, matrix: &mut PairMatrix) -> f64 {
        dispatch!(self, s => s.calc_intra_inv_dist2(group, matrix))
    }

    fn calc_group_dist(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix,
    ) -> f64 {
        dispatch!(self, s => s.calc_group_dist(group0, group1, matrix))
    }

    fn calc_group_dist2(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix,
    ) -> f64 {
        dispatch!(self, s => s.calc_group_dist2(group0, group1, matrix))
    }

    fn calc_group_inv_dist(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix,
    ) -> f64 {
        dispatch!(self, s => s.calc_group_inv_dist(group0, group1, matrix))
    }

    fn calc_group_inv_dist2(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix,
    ) -> f64 {
        dispatch!(self, s => s.calc_group_inv_dist2(group0, group1, matrix))
    }

    fn calc_dist_vectors(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix<Vector3<f64>>,
    ) -> f64 {
        dispatch!(self, s => s.calc_dist_vectors(group0, group1, matrix))
    }

    fn beyond_boxes(&self, dist: f64, box0: &AABox, box1: &AABox) -> bool {
        dispatch!(self, s => s.beyond_boxes(dist, box0, box1))
    }

    fn minimum_distance(&self, group0: &CoordGroup, group1: &CoordGroup) -> f64 {
        dispatch!(self, s => s.minimum_distance(group0, group1))
    }

    fn minimum_intra_distance(&self, group: &CoordGroup) -> f64 {
        dispatch!(self, s => s.minimum_intra_distance(group))
    }

    fn minimum_image(&self, group: &CoordGroup, point: &Point3<f64>) -> CoordGroup {
        dispatch!(self, s => s.minimum_image(group, point))
    }

    fn minimum_image_point(&self, point: &Point3<f64>, center: &Point3<f64>) -> Point3<f64> {
        dispatch!(self, s => s.minimum_image_point(point, center))
    }

    fn copies_within(
        &self,
        group: &CoordGroup,
        center_group: &CoordGroup,
        dist: f64,
    ) -> Vec<(f64, CoordGroup)> {
        dispatch!(self, s => s.copies_within(group, center_group, dist))
    }

    fn images_within(
        &self,
        point: &Point3<f64>,
        center: &Point3<f64>,
        dist: f64,
    ) -> Vec<(f64, Point3<f64>)> {
        dispatch!(self, s => s.images_within(point, center, dist))
    }

    fn map_from_cartesian(&self, group: &CoordGroup) -> CoordGroup {
        dispatch!(self, s => s.map_from_cartesian(group))
    }

    fn map_from_self(&self, group: &CoordGroup, other: &Volume) -> Result<CoordGroup, SpaceError> {
        dispatch!(self, s => s.map_from_self(group, other))
    }

    fn box_center(&self, point: &Point3<f64>) -> Point3<f64> {
        dispatch!(self, s => s.box_center(point))
    }

    fn random_point(&self, center: &Point3<f64>, rng: &mut dyn RngCore) -> Point3<f64> {
        dispatch!(self, s => s.random_point(center, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn periodic(lengths: (f64, f64, f64)) -> Volume {
        PeriodicBox::from_dimensions(&Vector3::new(lengths.0, lengths.1, lengths.2))
            .unwrap()
            .into()
    }

    #[test]
    fn default_volume_is_cartesian() {
        let volume = Volume::default();
        assert!(volume.is_cartesian());
        assert!(!volume.is_periodic());
        assert_eq!(volume.kind(), SpaceKind::Cartesian);
        assert!(volume.as_periodic().is_none());
    }

    #[test]
    fn volume_dispatches_to_periodic_box() {
        let volume = periodic((10.0, 10.0, 10.0));
        assert!(volume.is_periodic());
        assert!(f64_approx_equal(volume.volume(), 1000.0));
        assert!(f64_approx_equal(
            volume.calc_dist(&Point3::new(0.0, 0.0, 0.0), &Point3::new(9.0, 0.0, 0.0)),
            1.0
        ));
    }

    #[test]
    fn angles_are_computed_from_minimum_image_vectors() {
        let volume = periodic((10.0, 10.0, 10.0));
        // (9, 0, 0) is the image at (-1, 0, 0) as seen from the origin.
        let angle = volume.calc_angle(
            &Point3::new(9.0, 0.0, 0.0),
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        );
        assert!(f64_approx_equal(angle, std::f64::consts::FRAC_PI_2));
    }

    #[test]
    fn dihedral_has_sign_and_magnitude() {
        let volume = Volume::default();
        let p0 = Point3::new(1.0, 0.0, 0.0);
        let p1 = Point3::new(0.0, 0.0, 0.0);
        let p2 = Point3::new(0.0, 0.0, 1.0);

        let cis = volume.calc_dihedral(&p0, &p1, &p2, &Point3::new(1.0, 0.0, 1.0));
        let trans = volume.calc_dihedral(&p0, &p1, &p2, &Point3::new(-1.0, 0.0, 1.0));
        let gauche_plus = volume.calc_dihedral(&p0, &p1, &p2, &Point3::new(0.0, 1.0, 1.0));
        let gauche_minus = volume.calc_dihedral(&p0, &p1, &p2, &Point3::new(0.0, -1.0, 1.0));

        assert!(f64_approx_equal(cis, 0.0));
        assert!(f64_approx_equal(trans.abs(), std::f64::consts::PI));
        assert!(f64_approx_equal(gauche_plus.abs(), std::f64::consts::FRAC_PI_2));
        assert!(f64_approx_equal(gauche_plus, -gauche_minus));
    }

    mod map_to_space {
        use super::*;

        fn group_at(x: f64, y: f64, z: f64) -> CoordGroup {
            CoordGroup::from_slice(&[Point3::new(x, y, z)])
        }

        #[test]
        fn into_cartesian_is_identity() {
            let group = group_at(14.0, 0.0, 0.0);
            let mapped = periodic((10.0, 10.0, 10.0))
                .map_to_space(&group, &Volume::default())
                .unwrap();
            assert_eq!(mapped, group);
        }

        #[test]
        fn from_cartesian_wraps_into_central_box() {
            let group = group_at(14.0, -3.0, 5.0);
            let mapped = Volume::default()
                .map_to_space(&group, &periodic((10.0, 10.0, 10.0)))
                .unwrap();
            assert!((mapped[0] - Point3::new(4.0, 7.0, 5.0)).norm() < 1e-9);
        }

        #[test]
        fn between_boxes_preserves_fractional_position() {
            let small = periodic((10.0, 10.0, 10.0));
            let large = periodic((20.0, 20.0, 20.0));
            let group = group_at(2.5, 5.0, 7.5);

            let mapped = small.map_to_space(&group, &large).unwrap();
            assert!((mapped[0] - Point3::new(5.0, 10.0, 15.0)).norm() < 1e-9);
        }

        #[test]
        fn map_from_self_rejects_other_kinds() {
            let group = group_at(0.0, 0.0, 0.0);
            let result = periodic((10.0, 10.0, 10.0)).map_from_self(&group, &Volume::default());
            assert_eq!(
                result,
                Err(SpaceError::Incompatible {
                    operation: "map_from_self",
                    from: SpaceKind::Cartesian,
                    to: SpaceKind::PeriodicBox,
                })
            );
        }
    }

    #[test]
    fn random_points_stay_in_cell_around_center() {
        let volume = periodic((4.0, 6.0, 8.0));
        let center = Point3::new(100.0, -50.0, 0.0);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let p = volume.random_point(&center, &mut rng);
            let d = p - center;
            assert!(d.x.abs() <= 2.0 && d.y.abs() <= 3.0 && d.z.abs() <= 4.0);
        }
    }
}
