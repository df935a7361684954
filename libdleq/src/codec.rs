use crate::curves::{DleqCurve, SCALAR_SIZE};
use crate::error::ReadError;
use std::io::{self, Read, Write};

pub trait Readable: Sized {
    fn read<R: Read>(reader: &mut R) -> Result<Self, ReadError>;

    /// Reads a value that must span the whole of `bytes`.
    fn from_slice(bytes: &[u8]) -> Result<Self, ReadError> {
        let mut reader = bytes;
        let value = Self::read(&mut reader)?;
        if !reader.is_empty() {
            return Err(ReadError::new("trailing data", format!("{} unexpected bytes", reader.len())));
        }
        Ok(value)
    }
}

pub trait Writable {
    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()>;

    fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write(&mut buf).expect("Writing to a Vec cannot fail");
        buf
    }
}

pub fn write_point<C: DleqCurve, W: Write>(writer: &mut W, point: &C::Point) -> io::Result<()> {
    writer.write_all(&C::encode_point(point))
}

pub fn write_scalar<C: DleqCurve, W: Write>(writer: &mut W, scalar: &C::Scalar) -> io::Result<()> {
    writer.write_all(&C::encode_scalar(scalar))
}

pub fn read_point<C: DleqCurve, R: Read>(reader: &mut R, field: &str) -> Result<C::Point, ReadError> {
    let mut buf = vec![0u8; C::POINT_SIZE];
    reader.read_exact(&mut buf).map_err(|e| ReadError::new(field, e.to_string()))?;
    C::decode_point(&buf).map_err(|e| ReadError::new(field, e))
}

pub fn read_scalar<C: DleqCurve, R: Read>(reader: &mut R, field: &str) -> Result<C::Scalar, ReadError> {
    let buf = read_array::<SCALAR_SIZE, R>(reader, field)?;
    C::decode_scalar(&buf).ok_or_else(|| ReadError::new(field, "scalar is not canonically encoded"))
}

pub fn read_array<const N: usize, R: Read>(reader: &mut R, field: &str) -> Result<[u8; N], ReadError> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(|e| ReadError::new(field, e.to_string()))?;
    Ok(buf)
}
