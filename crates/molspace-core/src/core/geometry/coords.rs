use super::aabox::AABox;
use super::error::GeometryError;
use nalgebra::{Isometry3, Matrix3, Point3, UnitQuaternion, Vector3};
use std::ops::Index;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
struct GroupData {
    coords: Vec<Point3<f64>>,
    aabox: AABox,
}

impl GroupData {
    fn new(coords: Vec<Point3<f64>>) -> Self {
        let aabox = AABox::from_points(&coords);
        Self { coords, aabox }
    }
}

/// An ordered, immutable group of points together with their bounding box.
///
/// Groups are cheap to clone: the points live behind a shared reference count and
/// are only copied when an editor writes to them. The number of points is fixed
/// at construction; points can be replaced through a [`CoordGroupEditor`] but
/// never added or removed, except by [`combine`](Self::combine) and
/// [`split`](Self::split), which produce new groups.
///
/// Outside of an editor the bounding box always encloses exactly the stored
/// points.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordGroup {
    data: Arc<GroupData>,
}

impl Default for CoordGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordGroup {
    /// Creates an empty group.
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    /// Creates a group of `len` points, all at the origin.
    pub fn with_len(len: usize) -> Self {
        Self::filled(len, Point3::origin())
    }

    /// Creates a group of `len` copies of `point`.
    pub fn filled(len: usize, point: Point3<f64>) -> Self {
        Self::from(vec![point; len])
    }

    /// Creates a group holding a copy of `points`.
    pub fn from_slice(points: &[Point3<f64>]) -> Self {
        Self::from(points.to_vec())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.coords.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.coords.is_empty()
    }

    #[inline]
    pub fn coords(&self) -> &[Point3<f64>] {
        &self.data.coords
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Point3<f64>> {
        self.data.coords.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point3<f64>> {
        self.data.coords.iter()
    }

    /// The box enclosing every point of the group.
    #[inline]
    pub fn aabox(&self) -> &AABox {
        &self.data.aabox
    }

    /// Returns whether both groups point at the same underlying storage.
    pub fn shares_storage_with(&self, other: &CoordGroup) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Starts editing this group.
    ///
    /// The editor shares storage with `self` until its first write, at which point
    /// it takes a private copy. Editing therefore never changes `self`.
    pub fn edit(&self) -> CoordGroupEditor {
        CoordGroupEditor {
            data: Arc::clone(&self.data),
            needs_update: false,
        }
    }

    /// Returns a copy of this group moved by `delta`.
    ///
    /// A zero `delta` returns a group sharing this group's storage.
    pub fn translated(&self, delta: &Vector3<f64>) -> CoordGroup {
        if *delta == Vector3::zeros() {
            return self.clone();
        }
        self.edit().translate(delta).commit()
    }

    /// Concatenates `groups` into a single group.
    ///
    /// Points keep their order, group after group. The bounding boxes of the
    /// non-empty input groups are merged in the same pass, so no point is visited
    /// twice.
    pub fn combine(groups: &[CoordGroup]) -> CoordGroup {
        let total = groups.iter().map(CoordGroup::len).sum();
        let mut coords = Vec::with_capacity(total);
        let mut aabox: Option<AABox> = None;

        for group in groups.iter().filter(|g| !g.is_empty()) {
            coords.extend_from_slice(group.coords());
            aabox = Some(match aabox {
                Some(acc) => acc + *group.aabox(),
                None => *group.aabox(),
            });
        }

        CoordGroup {
            data: Arc::new(GroupData {
                coords,
                aabox: aabox.unwrap_or_default(),
            }),
        }
    }

    /// Splits this group back into groups shaped like `templates`.
    ///
    /// This is the inverse of [`combine`](Self::combine): the result holds one
    /// group per template, with the same number of points as that template.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::CountMismatch`] if the templates do not account
    /// for exactly the points of this group.
    pub fn split(&self, templates: &[CoordGroup]) -> Result<Vec<CoordGroup>, GeometryError> {
        let expected: usize = templates.iter().map(CoordGroup::len).sum();
        if expected != self.len() {
            return Err(GeometryError::CountMismatch {
                expected,
                found: self.len(),
            });
        }

        if templates.len() == 1 {
            return Ok(vec![self.clone()]);
        }

        let mut offset = 0;
        let parts = templates
            .iter()
            .map(|template| {
                let end = offset + template.len();
                let part = CoordGroup::from_slice(&self.coords()[offset..end]);
                offset = end;
                part
            })
            .collect();

        Ok(parts)
    }
}

impl From<Vec<Point3<f64>>> for CoordGroup {
    fn from(coords: Vec<Point3<f64>>) -> Self {
        Self {
            data: Arc::new(GroupData::new(coords)),
        }
    }
}

impl FromIterator<Point3<f64>> for CoordGroup {
    fn from_iter<I: IntoIterator<Item = Point3<f64>>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl Index<usize> for CoordGroup {
    type Output = Point3<f64>;

    fn index(&self, index: usize) -> &Point3<f64> {
        &self.data.coords[index]
    }
}

impl<'a> IntoIterator for &'a CoordGroup {
    type Item = &'a Point3<f64>;
    type IntoIter = std::slice::Iter<'a, Point3<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Write access to the points of a [`CoordGroup`].
///
/// The editor starts out sharing the storage of the group it was created from and
/// detaches on the first write. The bounding box is not maintained while
/// editing; it is rebuilt once, in [`commit`](Self::commit), and is not
/// observable before that.
#[derive(Debug, Clone)]
pub struct CoordGroupEditor {
    data: Arc<GroupData>,
    needs_update: bool,
}

impl CoordGroupEditor {
    #[inline]
    pub fn len(&self) -> usize {
        self.data.coords.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.coords.is_empty()
    }

    #[inline]
    pub fn coords(&self) -> &[Point3<f64>] {
        &self.data.coords
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Point3<f64>> {
        self.data.coords.get(index)
    }

    /// Returns whether this editor still reads from the storage of `group`.
    pub fn shares_storage_with(&self, group: &CoordGroup) -> bool {
        Arc::ptr_eq(&self.data, &group.data)
    }

    fn points_mut(&mut self) -> &mut [Point3<f64>] {
        self.needs_update = true;
        &mut Arc::make_mut(&mut self.data).coords
    }

    /// Mutable access to all points. Detaches from shared storage.
    pub fn coords_mut(&mut self) -> &mut [Point3<f64>] {
        self.points_mut()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Point3<f64>> {
        if index >= self.len() {
            return None;
        }
        self.points_mut().get_mut(index)
    }

    /// Replaces the point at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::IndexOutOfRange`] if `index` is not a valid point index.
    pub fn set(&mut self, index: usize, point: Point3<f64>) -> Result<&mut Self, GeometryError> {
        let len = self.len();
        let slot = self
            .get_mut(index)
            .ok_or(GeometryError::IndexOutOfRange { index, len })?;
        *slot = point;
        Ok(self)
    }

    /// Replaces every point at once.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::CountMismatch`] if `coords` does not hold exactly
    /// as many points as the group.
    pub fn set_coordinates(&mut self, coords: &[Point3<f64>]) -> Result<&mut Self, GeometryError> {
        if coords.len() != self.len() {
            return Err(GeometryError::CountMismatch {
                expected: self.len(),
                found: coords.len(),
            });
        }
        self.points_mut().copy_from_slice(coords);
        Ok(self)
    }

    pub fn translate(&mut self, delta: &Vector3<f64>) -> &mut Self {
        if *delta != Vector3::zeros() {
            for p in self.points_mut() {
                *p += delta;
            }
        }
        self
    }

    /// Moves a single point by `delta`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::IndexOutOfRange`] if `index` is not a valid point index.
    pub fn translate_point(
        &mut self,
        index: usize,
        delta: &Vector3<f64>,
    ) -> Result<&mut Self, GeometryError> {
        let len = self.len();
        let point = self
            .get_mut(index)
            .ok_or(GeometryError::IndexOutOfRange { index, len })?;
        *point += delta;
        Ok(self)
    }

    /// Rotates every point by `rotation` about `pivot`.
    pub fn rotate_quaternion(
        &mut self,
        rotation: &UnitQuaternion<f64>,
        pivot: &Point3<f64>,
    ) -> &mut Self {
        for p in self.points_mut() {
            *p = pivot + rotation * (*p - pivot);
        }
        self
    }

    /// Applies the linear map `matrix` to every point, about `pivot`.
    ///
    /// `matrix` is normally a rotation matrix, but this is not checked.
    pub fn rotate_matrix(&mut self, matrix: &Matrix3<f64>, pivot: &Point3<f64>) -> &mut Self {
        for p in self.points_mut() {
            *p = pivot + matrix * (*p - pivot);
        }
        self
    }

    /// Applies a rigid-body transformation to every point.
    pub fn transform(&mut self, isometry: &Isometry3<f64>) -> &mut Self {
        for p in self.points_mut() {
            *p = isometry * *p;
        }
        self
    }

    /// Finishes the current round of edits and returns the resulting group.
    ///
    /// The bounding box is recomputed here, once, if anything was written since
    /// the last commit. The editor stays usable; further writes detach again from
    /// the returned group.
    pub fn commit(&mut self) -> CoordGroup {
        if self.needs_update {
            let data = Arc::make_mut(&mut self.data);
            data.aabox.recalculate(&data.coords);
            self.needs_update = false;
        }
        CoordGroup {
            data: Arc::clone(&self.data),
        }
    }
}

impl From<CoordGroupEditor> for CoordGroup {
    fn from(mut editor: CoordGroupEditor) -> Self {
        editor.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Unit;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn points_approx_equal(a: &Point3<f64>, b: &Point3<f64>) -> bool {
        (a - b).norm() < 1e-9
    }

    fn line_group(n: usize, start: f64) -> CoordGroup {
        (0..n)
            .map(|i| Point3::new(start + i as f64, 0.0, 0.0))
            .collect()
    }

    mod construction {
        use super::*;

        #[test]
        fn with_len_places_points_at_origin() {
            let group = CoordGroup::with_len(4);
            assert_eq!(group.len(), 4);
            assert!(group.iter().all(|p| *p == Point3::origin()));
            assert_eq!(group.aabox().radius(), 0.0);
        }

        #[test]
        fn filled_copies_the_point() {
            let p = Point3::new(1.0, 2.0, 3.0);
            let group = CoordGroup::filled(3, p);
            assert!(group.iter().all(|q| *q == p));
            assert_eq!(group.aabox().center(), p);
        }

        #[test]
        fn from_slice_computes_bounding_box() {
            let group = CoordGroup::from_slice(&[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 4.0, 0.0),
            ]);
            assert_eq!(group.len(), 2);
            assert_eq!(group.aabox().center(), Point3::new(1.0, 2.0, 0.0));
            assert_eq!(group[1], Point3::new(2.0, 4.0, 0.0));
        }

        #[test]
        fn default_group_is_empty() {
            let group = CoordGroup::default();
            assert!(group.is_empty());
            assert_eq!(*group.aabox(), AABox::default());
        }

        #[test]
        fn groups_are_send_and_sync() {
            fn assert_send_sync<T: Send + Sync>() {}
            assert_send_sync::<CoordGroup>();
            assert_send_sync::<CoordGroupEditor>();
        }
    }

    mod editing {
        use super::*;

        #[test]
        fn editor_shares_storage_until_first_write() {
            let group = line_group(3, 0.0);
            let mut editor = group.edit();
            assert!(editor.shares_storage_with(&group));

            editor.translate(&Vector3::new(1.0, 0.0, 0.0));
            assert!(!editor.shares_storage_with(&group));
        }

        #[test]
        fn editing_never_changes_the_source_group() {
            let group = line_group(3, 0.0);
            let original = group.clone();

            let mut editor = group.edit();
            editor.set(1, Point3::new(9.0, 9.0, 9.0)).unwrap();
            let edited = editor.commit();

            assert_eq!(group, original);
            assert_eq!(edited[1], Point3::new(9.0, 9.0, 9.0));
        }

        #[test]
        fn independent_editors_do_not_interfere() {
            let group = line_group(2, 0.0);
            let mut a = group.edit();
            let mut b = group.edit();

            a.translate(&Vector3::new(0.0, 1.0, 0.0));
            b.translate(&Vector3::new(0.0, 0.0, -1.0));

            let a = a.commit();
            let b = b.commit();
            assert_eq!(a[0], Point3::new(0.0, 1.0, 0.0));
            assert_eq!(b[0], Point3::new(0.0, 0.0, -1.0));
            assert_eq!(group[0], Point3::origin());
        }

        #[test]
        fn commit_without_writes_returns_shared_group() {
            let group = line_group(3, 0.0);
            let committed = group.edit().commit();
            assert!(committed.shares_storage_with(&group));
        }

        #[test]
        fn commit_recomputes_bounding_box() {
            let group = line_group(3, 0.0);
            let moved = group.edit().translate(&Vector3::new(10.0, 0.0, 0.0)).commit();
            assert_eq!(moved.aabox().center(), Point3::new(11.0, 0.0, 0.0));
            assert_eq!(moved.aabox().half_extents(), Vector3::new(1.0, 0.0, 0.0));
        }

        #[test]
        fn editor_can_keep_editing_after_commit() {
            let group = line_group(2, 0.0);
            let mut editor = group.edit();
            let first = editor.translate(&Vector3::new(1.0, 0.0, 0.0)).commit();
            let second = editor.translate(&Vector3::new(1.0, 0.0, 0.0)).commit();

            assert_eq!(first[0], Point3::new(1.0, 0.0, 0.0));
            assert_eq!(second[0], Point3::new(2.0, 0.0, 0.0));
        }

        #[test]
        fn set_out_of_range_is_an_error() {
            let group = line_group(2, 0.0);
            let mut editor = group.edit();
            let result = editor.set(5, Point3::origin()).map(|_| ());
            assert_eq!(
                result,
                Err(GeometryError::IndexOutOfRange { index: 5, len: 2 })
            );
            assert!(editor.shares_storage_with(&group));
        }

        #[test]
        fn set_coordinates_requires_matching_count() {
            let group = line_group(2, 0.0);
            let mut editor = group.edit();
            let result = editor.set_coordinates(&[Point3::origin()]).map(|_| ());
            assert_eq!(
                result,
                Err(GeometryError::CountMismatch {
                    expected: 2,
                    found: 1
                })
            );

            let replacement = [Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 5.0, 5.0)];
            let edited = editor.set_coordinates(&replacement).unwrap().commit();
            assert_eq!(edited.coords(), &replacement);
            assert_eq!(edited.aabox().center(), Point3::new(5.5, 5.0, 5.0));
        }

        #[test]
        fn translate_point_moves_only_that_point() {
            let group = line_group(3, 0.0);
            let edited = group
                .edit()
                .translate_point(2, &Vector3::new(0.0, 3.0, 0.0))
                .unwrap()
                .commit();
            assert_eq!(edited[0], Point3::new(0.0, 0.0, 0.0));
            assert_eq!(edited[2], Point3::new(2.0, 3.0, 0.0));
        }

        #[test]
        fn quaternion_rotation_is_about_the_pivot() {
            let group = CoordGroup::from_slice(&[Point3::new(2.0, 0.0, 0.0)]);
            let rotation = UnitQuaternion::from_axis_angle(
                &Unit::new_normalize(Vector3::z()),
                std::f64::consts::FRAC_PI_2,
            );
            let rotated = group
                .edit()
                .rotate_quaternion(&rotation, &Point3::new(1.0, 0.0, 0.0))
                .commit();
            assert!(points_approx_equal(&rotated[0], &Point3::new(1.0, 1.0, 0.0)));
        }

        #[test]
        fn matrix_rotation_matches_quaternion_rotation() {
            let group = line_group(4, -1.5);
            let rotation = UnitQuaternion::from_axis_angle(
                &Unit::new_normalize(Vector3::new(1.0, 1.0, 0.0)),
                0.7,
            );
            let pivot = Point3::new(0.5, -0.5, 2.0);

            let by_quaternion = group.edit().rotate_quaternion(&rotation, &pivot).commit();
            let by_matrix = group
                .edit()
                .rotate_matrix(rotation.to_rotation_matrix().matrix(), &pivot)
                .commit();

            for (a, b) in by_quaternion.iter().zip(by_matrix.iter()) {
                assert!(points_approx_equal(a, b));
            }
        }

        #[test]
        fn rotation_preserves_internal_distances() {
            let group = line_group(3, 0.0);
            let rotation = UnitQuaternion::from_euler_angles(0.3, -1.1, 2.0);
            let rotated = group
                .edit()
                .rotate_quaternion(&rotation, &Point3::new(3.0, 3.0, 3.0))
                .commit();
            assert!(f64_approx_equal((rotated[2] - rotated[0]).norm(), 2.0));
        }

        #[test]
        fn transform_applies_isometry() {
            let group = line_group(1, 1.0);
            let iso = Isometry3::translation(0.0, 0.0, 4.0);
            let moved = group.edit().transform(&iso).commit();
            assert_eq!(moved[0], Point3::new(1.0, 0.0, 4.0));
        }

        #[test]
        fn translated_by_zero_shares_storage() {
            let group = line_group(3, 0.0);
            assert!(group.translated(&Vector3::zeros()).shares_storage_with(&group));
        }
    }

    mod combine_and_split {
        use super::*;

        #[test]
        fn combine_concatenates_points_and_unions_boxes() {
            let a = line_group(2, 0.0);
            let b = CoordGroup::from_slice(&[Point3::new(0.0, 5.0, 0.0)]);
            let combined = CoordGroup::combine(&[a.clone(), b.clone()]);

            assert_eq!(combined.len(), 3);
            assert_eq!(combined[2], Point3::new(0.0, 5.0, 0.0));
            assert_eq!(*combined.aabox(), *a.aabox() + *b.aabox());
        }

        #[test]
        fn combine_ignores_boxes_of_empty_groups() {
            let a = CoordGroup::from_slice(&[Point3::new(4.0, 4.0, 4.0)]);
            let combined = CoordGroup::combine(&[CoordGroup::new(), a.clone()]);
            assert_eq!(*combined.aabox(), *a.aabox());
        }

        #[test]
        fn split_rejects_mismatched_templates() {
            let combined = line_group(5, 0.0);
            let result = combined.split(&[line_group(2, 0.0), line_group(2, 0.0)]);
            assert_eq!(
                result,
                Err(GeometryError::CountMismatch {
                    expected: 4,
                    found: 5
                })
            );
        }

        #[test]
        fn split_inverts_combine_for_random_groups() {
            let mut rng = StdRng::seed_from_u64(5);
            for _ in 0..50 {
                let n_groups = rng.gen_range(1..6);
                let groups: Vec<CoordGroup> = (0..n_groups)
                    .map(|_| {
                        let n = rng.gen_range(1..10);
                        (0..n)
                            .map(|_| {
                                Point3::new(
                                    rng.gen_range(-20.0..20.0),
                                    rng.gen_range(-20.0..20.0),
                                    rng.gen_range(-20.0..20.0),
                                )
                            })
                            .collect()
                    })
                    .collect();

                let combined = CoordGroup::combine(&groups);
                let parts = combined.split(&groups).unwrap();
                assert_eq!(parts, groups);
            }
        }
    }
}
