use super::error::PersistError;
use super::stream::{
    read_f64, read_point, read_u8, read_u64, read_vector, write_f64, write_point, write_u8,
    write_u64, write_xyz,
};
use super::traits::Persist;
use crate::core::geometry::aabox::AABox;
use crate::core::geometry::coords::CoordGroup;
use crate::core::space::Volume;
use crate::core::space::cartesian::Cartesian;
use crate::core::space::periodic::PeriodicBox;
use std::io::{self, Read, Write};

const CARTESIAN_TAG: u8 = 0;
const PERIODIC_TAG: u8 = 1;

// Cap on the up-front allocation for a stored point count; larger groups grow
// while reading so a corrupt count fails on EOF instead of on allocation.
const MAX_PREALLOCATED_POINTS: usize = 1 << 16;

fn write_aabox_fields(aabox: &AABox, writer: &mut impl Write) -> io::Result<()> {
    write_point(writer, &aabox.center())?;
    write_xyz(writer, &aabox.half_extents())?;
    write_f64(writer, aabox.radius())
}

fn read_aabox_fields(reader: &mut impl Read) -> io::Result<AABox> {
    let center = read_point(reader)?;
    let half_extents = read_vector(reader)?;
    // The stored radius is redundant; it is re-derived from the half-extents.
    let _radius = read_f64(reader)?;
    Ok(AABox::from_center_extents(center, half_extents))
}

impl Persist for AABox {
    const NAME: &'static str = "AABox";
    const MAGIC: [u8; 4] = *b"AABX";
    const VERSION: u32 = 1;

    fn write_fields(&self, writer: &mut impl Write) -> Result<(), PersistError> {
        Ok(write_aabox_fields(self, writer)?)
    }

    fn read_fields(reader: &mut impl Read) -> Result<Self, PersistError> {
        Ok(read_aabox_fields(reader)?)
    }
}

/// The stored bounding box is skipped on read and rebuilt from the points.
impl Persist for CoordGroup {
    const NAME: &'static str = "CoordGroup";
    const MAGIC: [u8; 4] = *b"CGRP";
    const VERSION: u32 = 1;

    fn write_fields(&self, writer: &mut impl Write) -> Result<(), PersistError> {
        write_u64(writer, self.len() as u64)?;
        for point in self {
            write_point(writer, point)?;
        }
        write_aabox_fields(self.aabox(), writer)?;
        Ok(())
    }

    fn read_fields(reader: &mut impl Read) -> Result<Self, PersistError> {
        let count = usize::try_from(read_u64(reader)?).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidData, "point count does not fit in memory")
        })?;

        let mut points = Vec::with_capacity(count.min(MAX_PREALLOCATED_POINTS));
        for _ in 0..count {
            points.push(read_point(reader)?);
        }
        read_aabox_fields(reader)?;
        Ok(CoordGroup::from(points))
    }
}

/// Only the corners are stored. A restored box carries the default
/// [`SpaceConfig`](crate::core::space::config::SpaceConfig); use
/// [`PeriodicBox::with_config`] on its corners to reapply another one.
impl Persist for PeriodicBox {
    const NAME: &'static str = "PeriodicBox";
    const MAGIC: [u8; 4] = *b"PBOX";
    const VERSION: u32 = 1;

    fn write_fields(&self, writer: &mut impl Write) -> Result<(), PersistError> {
        write_point(writer, &self.min_coords())?;
        write_point(writer, &self.max_coords())?;
        Ok(())
    }

    fn read_fields(reader: &mut impl Read) -> Result<Self, PersistError> {
        let min = read_point(reader)?;
        let max = read_point(reader)?;
        Ok(PeriodicBox::new(&min, &max)?)
    }
}

impl Persist for Cartesian {
    const NAME: &'static str = "Cartesian";
    const MAGIC: [u8; 4] = *b"CART";
    const VERSION: u32 = 1;

    fn write_fields(&self, _writer: &mut impl Write) -> Result<(), PersistError> {
        Ok(())
    }

    fn read_fields(_reader: &mut impl Read) -> Result<Self, PersistError> {
        Ok(Cartesian)
    }
}

impl Persist for Volume {
    const NAME: &'static str = "Volume";
    const MAGIC: [u8; 4] = *b"VOLM";
    const VERSION: u32 = 1;

    fn write_fields(&self, writer: &mut impl Write) -> Result<(), PersistError> {
        match self {
            Volume::Cartesian(space) => {
                write_u8(writer, CARTESIAN_TAG)?;
                space.write_to(writer)
            }
            Volume::Periodic(space) => {
                write_u8(writer, PERIODIC_TAG)?;
                space.write_to(writer)
            }
        }
    }

    fn read_fields(reader: &mut impl Read) -> Result<Self, PersistError> {
        match read_u8(reader)? {
            CARTESIAN_TAG => Ok(Volume::Cartesian(Cartesian::read_from(reader)?)),
            PERIODIC_TAG => Ok(Volume::Periodic(PeriodicBox::read_from(reader)?)),
            tag => Err(PersistError::InvalidKind(tag)),
        }
    }
}
