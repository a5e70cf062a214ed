use super::error::SpaceError;
use super::kernels;
use super::{Space, SpaceKind, Volume};
use crate::core::geometry::aabox::AABox;
use crate::core::geometry::coords::CoordGroup;
use crate::core::geometry::matrix::PairMatrix;
use nalgebra::{Point3, Vector3};
use rand::{Rng, RngCore};

/// Infinite, non-periodic Euclidean space.
///
/// Every point has exactly one image, so wrapping and mapping are identities and
/// the group kernels measure plain distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cartesian;

impl Cartesian {
    pub fn new() -> Self {
        Self
    }
}

const NO_SHIFT: Vector3<f64> = Vector3::new(0.0, 0.0, 0.0);

impl Space for Cartesian {
    fn kind(&self) -> SpaceKind {
        SpaceKind::Cartesian
    }

    fn volume(&self) -> f64 {
        f64::INFINITY
    }

    fn set_volume(&mut self, volume: f64) -> Result<(), SpaceError> {
        if volume < 0.0 {
            return Err(SpaceError::NegativeVolume(volume));
        }
        Err(SpaceError::Unsupported {
            operation: "set_volume",
            kind: SpaceKind::Cartesian,
        })
    }

    #[inline]
    fn calc_dist_vector(&self, p0: &Point3<f64>, p1: &Point3<f64>) -> Vector3<f64> {
        p1 - p0
    }

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
        kernels::inter(
            group0.coords(),
            group1.coords(),
            &NO_SHIFT,
            matrix,
            kernels::dist,
            f64::min,
            f64::INFINITY,
        )
    }

    fn calc_group_dist2(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix,
    ) -> f64 {
        kernels::inter(
            group0.coords(),
            group1.coords(),
            &NO_SHIFT,
            matrix,
            kernels::dist2,
            f64::min,
            f64::INFINITY,
        )
    }

    fn calc_group_inv_dist(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix,
    ) -> f64 {
        kernels::inter(
            group0.coords(),
            group1.coords(),
            &NO_SHIFT,
            matrix,
            kernels::inv_dist,
            f64::max,
            0.0,
        )
    }

    fn calc_group_inv_dist2(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix,
    ) -> f64 {
        kernels::inter(
            group0.coords(),
            group1.coords(),
            &NO_SHIFT,
            matrix,
            kernels::inv_dist2,
            f64::max,
            0.0,
        )
    }

    fn calc_dist_vectors(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        matrix: &mut PairMatrix<Vector3<f64>>,
    ) -> f64 {
        kernels::inter_vectors(group0.coords(), group1.coords(), &NO_SHIFT, matrix)
    }

    fn beyond_boxes(&self, dist: f64, box0: &AABox, box1: &AABox) -> bool {
        let reach = dist + box0.radius() + box1.radius();
        (box1.center() - box0.center()).norm_squared() > reach * reach
    }

    fn minimum_distance(&self, group0: &CoordGroup, group1: &CoordGroup) -> f64 {
        kernels::min_dist2(group0.coords(), group1.coords(), &NO_SHIFT).sqrt()
    }

    fn minimum_image(&self, group: &CoordGroup, _point: &Point3<f64>) -> CoordGroup {
        group.clone()
    }

    fn minimum_image_point(&self, point: &Point3<f64>, _center: &Point3<f64>) -> Point3<f64> {
        *point
    }

    fn copies_within(
        &self,
        group: &CoordGroup,
        center_group: &CoordGroup,
        dist: f64,
    ) -> Vec<(f64, CoordGroup)> {
        if self.beyond(dist, group, center_group) {
            return Vec::new();
        }
        let d = self.minimum_distance(group, center_group);
        if d <= dist {
            vec![(d, group.clone())]
        } else {
            Vec::new()
        }
    }

    fn images_within(
        &self,
        point: &Point3<f64>,
        center: &Point3<f64>,
        dist: f64,
    ) -> Vec<(f64, Point3<f64>)> {
        let d = (point - center).norm();
        if d <= dist {
            vec![(d, *point)]
        } else {
            Vec::new()
        }
    }

    fn map_from_cartesian(&self, group: &CoordGroup) -> CoordGroup {
        group.clone()
    }

    fn map_from_self(&self, group: &CoordGroup, other: &Volume) -> Result<CoordGroup, SpaceError> {
        match other {
            Volume::Cartesian(_) => Ok(group.clone()),
            Volume::Periodic(_) => Err(SpaceError::Incompatible {
                operation: "map_from_self",
                from: other.kind(),
                to: SpaceKind::Cartesian,
            }),
        }
    }

    fn box_center(&self, _point: &Point3<f64>) -> Point3<f64> {
        Point3::origin()
    }

    fn random_point(&self, center: &Point3<f64>, rng: &mut dyn RngCore) -> Point3<f64> {
        center
            + Vector3::new(
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.5..0.5),
            )
    }
}
