//! TFRecord framing used by event files.
//!
//! Each record is `len: u64 LE | masked_crc(len) | data | masked_crc(data)`.

use std::io::{Read, Write};

use crc::{Crc, CRC_32_ISCSI};

use crate::error::OutputError;

const CASTAGNOLI: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);
const MASK_DELTA: u32 = 0xa282_ead8;

pub fn crc32c(data: &[u8]) -> u32 {
    CASTAGNOLI.checksum(data)
}

pub fn masked_crc32c(data: &[u8]) -> u32 {
    let crc = crc32c(data);
    ((crc >> 15) | (crc << 17)).wrapping_add(MASK_DELTA)
}

pub struct RecordWriter<W: Write> {
    inner: W,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_record(&mut self, data: &[u8]) -> std::io::Result<()> {
        let header = (data.len() as u64).to_le_bytes();
        self.inner.write_all(&header)?;
        self.inner.write_all(&masked_crc32c(&header).to_le_bytes())?;
        self.inner.write_all(data)?;
        self.inner.write_all(&masked_crc32c(data).to_le_bytes())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Reads every record from `reader`, checking both checksums.
pub fn read_records<R: Read>(mut reader: R) -> Result<Vec<Vec<u8>>, OutputError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| OutputError::CorruptRecord(e.to_string()))?;

    let mut records = Vec::new();
    let mut cursor = 0;
    while cursor < bytes.len() {
        let header = take(&bytes, cursor, 8)?;
        let header_crc = read_u32(take(&bytes, cursor + 8, 4)?);
        if header_crc != masked_crc32c(header) {
            return Err(OutputError::CorruptRecord(format!(
                "length checksum mismatch at byte {cursor}"
            )));
        }
        let mut len_bytes = [0u8; 8];
        len_bytes.copy_from_slice(header);
        let len = u64::from_le_bytes(len_bytes) as usize;

        let data = take(&bytes, cursor + 12, len)?;
        let data_crc = read_u32(take(&bytes, cursor + 12 + len, 4)?);
        if data_crc != masked_crc32c(data) {
            return Err(OutputError::CorruptRecord(format!(
                "data checksum mismatch at byte {cursor}"
            )));
        }
        records.push(data.to_vec());
        cursor += 16 + len;
    }
    Ok(records)
}

fn take(bytes: &[u8], start: usize, len: usize) -> Result<&[u8], OutputError> {
    bytes
        .get(start..start + len)
        .ok_or_else(|| OutputError::CorruptRecord(format!("truncated record at byte {start}")))
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32c_check_value() {
        assert_eq!(crc32c(b"123456789"), 0xe306_9283);
    }

    #[test]
    fn records_survive_framing() {
        let mut buffer = Vec::new();
        let mut writer = RecordWriter::new(&mut buffer);
        writer.write_record(b"first").unwrap();
        writer.write_record(b"").unwrap();
        writer.write_record(&[7u8; 300]).unwrap();
        assert_eq!(buffer.len(), 16 * 3 + 5 + 300);

        let records = read_records(buffer.as_slice()).unwrap();
        assert_eq!(records, vec![b"first".to_vec(), Vec::new(), vec![7u8; 300]]);
    }

    #[test]
    fn flipped_byte_is_detected() {
        let mut buffer = Vec::new();
        RecordWriter::new(&mut buffer).write_record(b"payload").unwrap();
        buffer[14] ^= 0xff;
        assert!(matches!(
            read_records(buffer.as_slice()),
            Err(OutputError::CorruptRecord(_))
        ));
    }

    #[test]
    fn truncated_stream_is_detected() {
        let mut buffer = Vec::new();
        RecordWriter::new(&mut buffer).write_record(b"payload").unwrap();
        buffer.truncate(buffer.len() - 2);
        assert!(read_records(buffer.as_slice()).is_err());
    }
}
