use crate::error::{DbError, Result};

/// Little-endian encoder shared by every storage file.
#[derive(Debug, Default)]
pub struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self { bytes: vec![] }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn put_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn put_i8(&mut self, value: i8) {
        self.bytes.extend(value.to_le_bytes());
    }

    pub fn put_i16(&mut self, value: i16) {
        self.bytes.extend(value.to_le_bytes());
    }

    pub fn put_u32(&mut self, value: u32) {
        self.bytes.extend(value.to_le_bytes());
    }

    pub fn put_i32(&mut self, value: i32) {
        self.bytes.extend(value.to_le_bytes());
    }

    pub fn put_i64(&mut self, value: i64) {
        self.bytes.extend(value.to_le_bytes());
    }

    pub fn put_f64(&mut self, value: f64) {
        self.bytes.extend(value.to_le_bytes());
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub fn put_count(&mut self, count: usize) -> Result<()> {
        let count = u32::try_from(count)
            .map_err(|_| DbError::malformed(format!("count {} does not fit in 32 bits", count)))?;
        self.put_u32(count);
        Ok(())
    }

    /// u32 byte length followed by UTF-8.
    pub fn put_string(&mut self, value: &str) -> Result<()> {
        self.put_count(value.len())?;
        self.put_bytes(value.as_bytes());
        Ok(())
    }

    /// Zero-padded to `width` bytes. At least one trailing zero is kept.
    pub fn put_fixed_string(&mut self, value: &str, width: usize) -> Result<()> {
        if value.len() >= width {
            return Err(DbError::malformed(format!(
                "'{}' does not fit in {} bytes",
                value, width
            )));
        }
        self.put_bytes(value.as_bytes());
        self.put_bytes(&vec![0; width - value.len()]);
        Ok(())
    }
}

/// Cursor over a storage file. Every read past the end is a `Malformed` error.
#[derive(Debug)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.bytes.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(count)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                DbError::malformed(format!(
                    "unexpected end of data: wanted {} bytes at offset {}, {} available",
                    count,
                    self.position,
                    self.bytes.len().saturating_sub(self.position)
                ))
            })?;
        let slice = &self.bytes[self.position..end];
        self.position = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(i8::from_le_bytes(self.take_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.take_array()?))
    }

    pub fn read_count(&mut self) -> Result<usize> {
        Ok(self.read_u32()? as usize)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let length = self.read_count()?;
        let bytes = self.take(length)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|error| DbError::malformed(format!("invalid UTF-8: {}", error)))
    }

    pub fn read_fixed_string(&mut self, width: usize) -> Result<String> {
        let bytes = self.take(width)?;
        let end = bytes.iter().position(|byte| *byte == 0).unwrap_or(bytes.len());
        String::from_utf8(bytes[..end].to_vec())
            .map_err(|error| DbError::malformed(format!("invalid UTF-8: {}", error)))
    }
}
