use std::io::{self, Cursor};

use byteorder::{BigEndian, ReadBytesExt};

use crate::{ClassFileError, Result};

type Endian = BigEndian;

/// Sequential big-endian reader over a borrowed byte buffer.
///
/// Positions are absolute: a cursor over a sub-slice of a larger buffer can be
/// created with [`ByteCursor::with_base`] so that truncation errors still
/// report the offset within the original input.
pub struct ByteCursor<'a> {
    r: Cursor<&'a [u8]>,
    base: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_base(buf, 0)
    }

    pub fn with_base(buf: &'a [u8], base: usize) -> Self {
        Self {
            r: Cursor::new(buf),
            base,
        }
    }

    pub fn position(&self) -> usize {
        self.base + self.r.position() as usize
    }

    pub fn seek(&mut self, pos: usize) {
        self.r.set_position(pos.saturating_sub(self.base) as u64);
    }

    pub fn remaining(&self) -> usize {
        self.r
            .get_ref()
            .len()
            .saturating_sub(self.r.position() as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read(1, |r| r.read_u8())
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.read(1, |r| r.read_i8())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read(2, |r| r.read_u16::<Endian>())
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.read(2, |r| r.read_i16::<Endian>())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read(4, |r| r.read_u32::<Endian>())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read(4, |r| r.read_i32::<Endian>())
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.read(8, |r| r.read_i64::<Endian>())
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read(4, |r| r.read_f32::<Endian>())
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.read(8, |r| r.read_f64::<Endian>())
    }

    /// Borrows the next `n` bytes without copying them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let start = self.r.position() as usize;
        let buf: &'a [u8] = *self.r.get_ref();
        self.r.set_position((start + n) as u64);
        Ok(&buf[start..start + n])
    }

    fn read<T>(
        &mut self,
        needed: usize,
        f: impl FnOnce(&mut Cursor<&'a [u8]>) -> io::Result<T>,
    ) -> Result<T> {
        self.ensure(needed)?;
        Ok(f(&mut self.r)?)
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(ClassFileError::TruncatedInput {
                offset: self.position(),
                needed,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod byte_cursor_tests {
    use super::*;

    #[test]
    fn it_should_read_big_endian_values() {
        let mut r = ByteCursor::new(&[0xca, 0xfe, 0xba, 0xbe, 0x00, 0x34, 0xff]);
        assert_eq!(r.read_u32().unwrap(), 0xCAFEBABE);
        assert_eq!(r.read_u16().unwrap(), 0x34);
        assert_eq!(r.read_i8().unwrap(), -1);
        assert_eq!(r.position(), 7);
        assert!(r.is_empty());
    }

    #[test]
    fn it_should_fail_with_the_offset_when_there_is_not_enough_data() {
        let mut r = ByteCursor::new(&[0x00, 0x01, 0x02]);
        r.read_u8().unwrap();
        match r.read_u32() {
            Err(ClassFileError::TruncatedInput { offset, needed }) => {
                assert_eq!(offset, 1);
                assert_eq!(needed, 4);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        // A failed read does not move the cursor.
        assert_eq!(r.position(), 1);
    }

    #[test]
    fn it_should_report_absolute_positions_with_a_base() {
        let mut r = ByteCursor::with_base(&[0x01, 0x02], 100);
        assert_eq!(r.position(), 100);
        r.read_u8().unwrap();
        assert_eq!(r.position(), 101);
        assert!(matches!(
            r.read_u16(),
            Err(ClassFileError::TruncatedInput { offset: 101, .. })
        ));
        r.seek(100);
        assert_eq!(r.read_u16().unwrap(), 0x0102);
    }

    #[test]
    fn it_should_borrow_bytes() {
        let mut r = ByteCursor::new(&[1, 2, 3, 4]);
        assert_eq!(r.read_bytes(3).unwrap(), &[1, 2, 3]);
        assert_eq!(r.remaining(), 1);
        assert!(r.read_bytes(2).is_err());
    }

    #[test]
    fn it_should_read_floating_point_values() {
        let mut r = ByteCursor::new(&[0x3f, 0x80, 0x00, 0x00, 0x40, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(r.read_f32().unwrap(), 1.0);
        assert_eq!(r.read_f64().unwrap(), 2.0);
    }
}
