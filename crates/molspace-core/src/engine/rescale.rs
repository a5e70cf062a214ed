use crate::core::geometry::coords::CoordGroup;
use crate::core::space::error::SpaceError;
use crate::core::space::{Space, Volume};
use tracing::{info, instrument};

/// Resizes a copy of `space` to `new_volume` and maps every group into it.
///
/// The input volume and groups are left untouched. Each group moves rigidly so
/// that its center keeps its fractional position in the box; the internal
/// geometry of a group never changes.
///
/// # Errors
///
/// Returns the [`SpaceError`] raised by the resize (a negative, non-finite or zero
/// volume, or a space that cannot be resized) or by the mapping.
#[instrument(skip_all, name = "volume_rescale_task")]
pub fn rescale_volume(
    space: &Volume,
    groups: &[CoordGroup],
    new_volume: f64,
) -> Result<(Volume, Vec<CoordGroup>), SpaceError> {
    let old_volume = space.volume();

    let mut resized = space.clone();
    resized.set_volume(new_volume)?;

    let mapped = groups
        .iter()
        .map(|group| space.map_to_space(group, &resized))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        old_volume,
        new_volume = resized.volume(),
        num_groups = mapped.len(),
        "Volume rescaled."
    );
    Ok((resized, mapped))
}
