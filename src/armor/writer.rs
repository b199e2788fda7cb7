use std::io::Write;

use base64::engine::{general_purpose, Engine as _};

use crate::armor::{BlockType, Headers};
use crate::errors::Result;
use crate::ser::Serialize;

/// Maximum number of base64 characters per body line.
const LINE_LENGTH: usize = 64;

pub fn write(
    source: &impl Serialize,
    typ: BlockType,
    writer: &mut impl Write,
    headers: Option<&Headers>,
    include_checksum: bool,
) -> Result<()> {
    if let Some(headers) = headers {
        for (key, values) in headers.iter() {
            ensure!(
                !key.is_empty() && !key.contains([':', '\r', '\n']),
                "invalid armor header name {:?}",
                key
            );
            for value in values {
                ensure!(
                    !value.contains(['\r', '\n']),
                    "armor header {} must be a single line",
                    key
                );
            }
        }
    }

    // write armor header
    writer.write_all(&b"-----BEGIN "[..])?;
    typ.to_writer(writer)?;
    writer.write_all(&b"-----\n"[..])?;

    // write armor headers
    if let Some(headers) = headers {
        for (key, values) in headers.iter() {
            for value in values {
                writer.write_all(key.as_bytes())?;
                writer.write_all(&b": "[..])?;
                writer.write_all(value.as_bytes())?;
                writer.write_all(&b"\n"[..])?;
            }
        }
    }

    writer.write_all(&b"\n"[..])?;

    // write body
    let data = source.to_bytes()?;
    let encoded = general_purpose::STANDARD.encode(&data);
    for line in encoded.as_bytes().chunks(LINE_LENGTH) {
        writer.write_all(line)?;
        writer.write_all(&b"\n"[..])?;
    }

    // write crc
    if include_checksum {
        writer.write_all(b"=")?;

        let crc = crc24::hash_raw(&data);
        let crc_buf = [(crc >> 16) as u8, (crc >> 8) as u8, crc as u8];
        let crc_enc = general_purpose::STANDARD.encode(crc_buf);

        writer.write_all(crc_enc.as_bytes())?;
        writer.write_all(&b"\n"[..])?;
    }

    // write footer
    writer.write_all(&b"-----END "[..])?;
    typ.to_writer(writer)?;
    writer.write_all(&b"-----\n"[..])?;

    Ok(())
}

/// Armors `data` into a string.
pub fn encode(
    typ: BlockType,
    headers: &Headers,
    data: &[u8],
    include_checksum: bool,
) -> Result<String> {
    let mut out = Vec::new();
    write(&RawData(data), typ, &mut out, Some(headers), include_checksum)?;

    Ok(String::from_utf8(out).map_err(|err| err.utf8_error())?)
}

struct RawData<'a>(&'a [u8]);

impl Serialize for RawData<'_> {
    fn to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(self.0)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        self.0.len()
    }
}
