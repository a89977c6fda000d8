const U8_SIZE: usize = std::mem::size_of::<u8>();
const U16_SIZE: usize = std::mem::size_of::<u16>();
const I64_SIZE: usize = std::mem::size_of::<i64>();

/// Writes big-endian values into a buffer, advancing an internal cursor.
pub(crate) struct Serializer<'a> {
    buffer: &'a mut [u8],
    pos: usize,
}

impl<'a> Serializer<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, pos: 0 }
    }

    pub fn serialize_u8(&mut self, val: u8) {
        self.buffer[self.pos] = val;
        self.pos += U8_SIZE;
    }

    pub fn serialize_u16(&mut self, val: u16) {
        self.buffer[self.pos..self.pos + U16_SIZE].copy_from_slice(val.to_be_bytes().as_slice());
        self.pos += U16_SIZE;
    }

    pub fn serialize_i64(&mut self, val: i64) {
        self.buffer[self.pos..self.pos + I64_SIZE].copy_from_slice(val.to_be_bytes().as_slice());
        self.pos += I64_SIZE;
    }

    pub fn copy_bytes(&mut self, bytes: &[u8]) {
        self.buffer[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    pub fn end(self) -> usize {
        self.pos
    }
}

/// Reads big-endian values out of a buffer, advancing an internal cursor.
pub(crate) struct Deserializer<'a> {
    buffer: &'a [u8],
    pos: usize,
}

impl<'a> Deserializer<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, pos: 0 }
    }

    pub fn deserialize_u8(&mut self) -> u8 {
        let val = self.buffer[self.pos];
        self.pos += U8_SIZE;
        val
    }

    pub fn deserialize_u16(&mut self) -> u16 {
        let val = u16::from_be_bytes(
            self.buffer[self.pos..self.pos + U16_SIZE]
                .try_into()
                .unwrap(),
        );
        self.pos += U16_SIZE;
        val
    }

    pub fn deserialize_i64(&mut self) -> i64 {
        let val = i64::from_be_bytes(
            self.buffer[self.pos..self.pos + I64_SIZE]
                .try_into()
                .unwrap(),
        );
        self.pos += I64_SIZE;
        val
    }

    pub fn read_bytes(&mut self, count: usize) -> &'a [u8] {
        let bytes = &self.buffer[self.pos..self.pos + count];
        self.pos += count;
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::{Deserializer, Serializer};

    #[test]
    fn roundtrips_values_in_order() {
        let mut buffer = [0u8; 32];
        let mut serializer = Serializer::new(&mut buffer);
        serializer.serialize_u16(42);
        serializer.serialize_i64(-7);
        serializer.serialize_u8(1);
        serializer.copy_bytes(b"abc");
        let written = serializer.end();
        assert_eq!(written, 2 + 8 + 1 + 3);

        let mut deserializer = Deserializer::new(&buffer);
        assert_eq!(deserializer.deserialize_u16(), 42);
        assert_eq!(deserializer.deserialize_i64(), -7);
        assert_eq!(deserializer.deserialize_u8(), 1);
        assert_eq!(deserializer.read_bytes(3), b"abc");
    }
}
