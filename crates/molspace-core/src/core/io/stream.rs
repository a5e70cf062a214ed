use super::error::PersistError;
use nalgebra::{Point3, Vector3};
use std::io::{self, Read, Write};

pub(super) fn write_header(
    writer: &mut impl Write,
    magic: &[u8; 4],
    version: u32,
) -> Result<(), PersistError> {
    writer.write_all(magic)?;
    writer.write_all(&version.to_le_bytes())?;
    Ok(())
}

pub(super) fn read_header(
    reader: &mut impl Read,
    record: &'static str,
    magic: &[u8; 4],
    version: u32,
) -> Result<(), PersistError> {
    let mut found = [0u8; 4];
    reader.read_exact(&mut found)?;
    if &found != magic {
        return Err(PersistError::InvalidMagic {
            expected: *magic,
            found,
        });
    }

    let found = read_u32(reader)?;
    if found != version {
        return Err(PersistError::UnsupportedVersion {
            record,
            expected: version,
            found,
        });
    }
    Ok(())
}

pub(super) fn write_u8(writer: &mut impl Write, value: u8) -> io::Result<()> {
    writer.write_all(&[value])
}

pub(super) fn read_u8(reader: &mut impl Read) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub(super) fn read_u32(reader: &mut impl Read) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(super) fn write_u64(writer: &mut impl Write, value: u64) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

pub(super) fn read_u64(reader: &mut impl Read) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

pub(super) fn write_f64(writer: &mut impl Write, value: f64) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

pub(super) fn read_f64(reader: &mut impl Read) -> io::Result<f64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

pub(super) fn write_xyz(writer: &mut impl Write, xyz: &Vector3<f64>) -> io::Result<()> {
    for value in xyz.iter() {
        write_f64(writer, *value)?;
    }
    Ok(())
}

pub(super) fn read_vector(reader: &mut impl Read) -> io::Result<Vector3<f64>> {
    Ok(Vector3::new(read_f64(reader)?, read_f64(reader)?, read_f64(reader)?))
}

pub(super) fn write_point(writer: &mut impl Write, point: &Point3<f64>) -> io::Result<()> {
    write_xyz(writer, &point.coords)
}

pub(super) fn read_point(reader: &mut impl Read) -> io::Result<Point3<f64>> {
    read_vector(reader).map(Point3::from)
}
