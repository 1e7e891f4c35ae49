use super::shared::NdVector;

/// Little-endian byte sink used by the container encoder.
pub trait ByteWriter: Sized {
    fn write_u8(&mut self, value: u8);
    fn write_u16(&mut self, value: u16) {
        self.write_u8(value as u8);
        self.write_u8((value >> 8) as u8);
    }
    fn write_u32(&mut self, value: u32) {
        self.write_u16(value as u16);
        self.write_u16((value >> 16) as u16);
    }
    fn write_f32(&mut self, value: f32) {
        self.write_u32(value.to_bits());
    }
    fn write_vector<const N: usize>(&mut self, value: &NdVector<N, f32>) {
        for c in value.as_array() {
            self.write_f32(*c);
        }
    }
}

impl ByteWriter for Vec<u8> {
    fn write_u8(&mut self, value: u8) {
        self.push(value);
    }

    fn write_u16(&mut self, value: u16) {
        self.extend_from_slice(&value.to_le_bytes());
    }

    fn write_u32(&mut self, value: u32) {
        self.extend_from_slice(&value.to_le_bytes());
    }
}

/// Little-endian byte source used by the container decoder.
pub trait ByteReader {
    fn read_u8(&mut self) -> Result<u8, ReaderErr>;
    fn read_u16(&mut self) -> Result<u16, ReaderErr> {
        let out = [
            self.read_u8()?,
            self.read_u8()?
        ];
        Ok(u16::from_le_bytes(out))
    }
    fn read_u32(&mut self) -> Result<u32, ReaderErr> {
        let out = [
            self.read_u8()?,
            self.read_u8()?,
            self.read_u8()?,
            self.read_u8()?
        ];
        Ok(u32::from_le_bytes(out))
    }
    fn read_f32(&mut self) -> Result<f32, ReaderErr> {
        Ok(f32::from_bits(self.read_u32()?))
    }
    fn read_vector<const N: usize>(&mut self) -> Result<NdVector<N, f32>, ReaderErr> {
        let mut bits = [0_u32; N];
        for b in bits.iter_mut() {
            *b = self.read_u32()?;
        }
        Ok(NdVector::from_bits(bits))
    }

    /// Number of bytes left, if the source knows it up front.
    /// Lets the decoder reject a truncated payload before allocating for it.
    fn remaining(&self) -> Option<usize> {
        None
    }
}

impl ByteReader for std::vec::IntoIter<u8> {
    fn read_u8(&mut self) -> Result<u8, ReaderErr> {
        self.next().ok_or(ReaderErr::NotEnoughData)
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.len())
    }
}

/// Reads from a borrowed byte slice without copying it.
pub struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn take<const K: usize>(&mut self) -> Result<[u8; K], ReaderErr> {
        let end = self.pos + K;
        let bytes = self.data.get(self.pos..end).ok_or(ReaderErr::NotEnoughData)?;
        self.pos = end;
        let mut out = [0_u8; K];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}

impl ByteReader for SliceReader<'_> {
    fn read_u8(&mut self) -> Result<u8, ReaderErr> {
        Ok(self.take::<1>()?[0])
    }

    fn read_u16(&mut self) -> Result<u16, ReaderErr> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    fn read_u32(&mut self) -> Result<u32, ReaderErr> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.data.len() - self.pos)
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderErr {
    #[error("Not enough data to read")]
    NotEnoughData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_layout() {
        let mut buffer = Vec::new();
        buffer.write_u32(0x0403_0201);
        buffer.write_u16(0x0605);
        assert_eq!(buffer, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn slice_reader_reports_exhaustion() {
        let data = [1_u8, 0, 0, 0, 7];
        let mut reader = SliceReader::new(&data);
        assert_eq!(reader.read_u32(), Ok(1));
        assert_eq!(reader.remaining(), Some(1));
        assert_eq!(reader.read_u16(), Err(ReaderErr::NotEnoughData));
        // a failed read does not consume anything
        assert_eq!(reader.position(), 4);
        assert_eq!(reader.read_u8(), Ok(7));
        assert_eq!(reader.read_u8(), Err(ReaderErr::NotEnoughData));
    }

    #[test]
    fn vectors_round_trip_through_bits() {
        let mut buffer = Vec::new();
        buffer.write_vector(&NdVector::from([1.0_f32, -0.0, f32::MAX]));
        let mut reader = buffer.into_iter();
        let v: NdVector<3, f32> = reader.read_vector().unwrap();
        assert_eq!(v.to_bits(), [1.0_f32.to_bits(), (-0.0_f32).to_bits(), f32::MAX.to_bits()]);
        assert_eq!(reader.remaining(), Some(0));
    }
}
