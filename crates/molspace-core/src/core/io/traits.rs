use super::error::PersistError;
use super::stream;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;

/// A value with a framed, versioned binary representation.
///
/// Implementors describe only their fields; the header handling, byte-buffer
/// helpers and file helpers are shared.
pub trait Persist: Sized {
    /// Human-readable record name used in error messages.
    const NAME: &'static str;

    /// Four-byte tag opening every record of this type.
    const MAGIC: [u8; 4];

    /// Version written by this build; the only version accepted on read.
    const VERSION: u32;

    /// Writes the fields, without the header.
    fn write_fields(&self, writer: &mut impl Write) -> Result<(), PersistError>;

    /// Reads the fields, without the header.
    fn read_fields(reader: &mut impl Read) -> Result<Self, PersistError>;

    /// Writes a complete record.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    fn write_to(&self, writer: &mut impl Write) -> Result<(), PersistError> {
        stream::write_header(writer, &Self::MAGIC, Self::VERSION)?;
        self.write_fields(writer)
    }

    /// Reads a complete record.
    ///
    /// # Errors
    ///
    /// Returns an error on a wrong magic tag, an unsupported version, truncated
    /// input or field values the type cannot hold.
    fn read_from(reader: &mut impl Read) -> Result<Self, PersistError> {
        stream::read_header(reader, Self::NAME, &Self::MAGIC, Self::VERSION)?;
        Self::read_fields(reader)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, PersistError> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, PersistError> {
        Self::read_from(&mut Cursor::new(bytes))
    }

    fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, PersistError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}
