use std::{collections::BTreeMap, fmt, io, str};

use base64::engine::{general_purpose::STANDARD, Engine as _};
use log::debug;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while1},
    character::complete::{digit1, line_ending, not_line_ending, space0},
    combinator::{map, map_res, opt, value},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};

use crate::errors::{Error, Result};
use crate::ser::Serialize;

/// Armor block types.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum BlockType {
    /// PGP public key
    PublicKey,
    /// PGP private key
    PrivateKey,
    Message,
    MultiPartMessage(usize, usize),
    Signature,
    // gnupgp extension
    File,
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockType::PublicKey => f.write_str("PGP PUBLIC KEY BLOCK"),
            BlockType::PrivateKey => f.write_str("PGP PRIVATE KEY BLOCK"),
            BlockType::MultiPartMessage(x, y) => write!(f, "PGP MESSAGE, PART {x}/{y}"),
            BlockType::Message => f.write_str("PGP MESSAGE"),
            BlockType::Signature => f.write_str("PGP SIGNATURE"),
            BlockType::File => f.write_str("PGP ARMORED FILE"),
        }
    }
}

impl Serialize for BlockType {
    fn to_writer<W: io::Write>(&self, w: &mut W) -> Result<()> {
        write!(w, "{self}")?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        // allocates, but this is tiny, should be fine
        self.to_string().len()
    }
}

/// Armor Headers.
pub type Headers = BTreeMap<String, Vec<String>>;

/// Parses a single ascii armor header separator.
fn armor_header_sep(i: &[u8]) -> IResult<&[u8], &[u8]> {
    tag(&b"-----"[..])(i)
}

#[inline]
fn parse_digit(x: &[u8]) -> Result<usize> {
    let s = str::from_utf8(x)?;
    s.parse().map_err(|_| format_err!("invalid part number {}", s))
}

/// Parses the type inside of an ascii armor header.
fn armor_header_type(i: &[u8]) -> IResult<&[u8], BlockType> {
    alt((
        value(BlockType::PublicKey, tag("PGP PUBLIC KEY BLOCK")),
        value(BlockType::PrivateKey, tag("PGP PRIVATE KEY BLOCK")),
        map(
            preceded(
                tag("PGP MESSAGE, PART "),
                pair(
                    map_res(digit1, parse_digit),
                    opt(preceded(tag("/"), map_res(digit1, parse_digit))),
                ),
            ),
            |(x, y)| BlockType::MultiPartMessage(x, y.unwrap_or(0)),
        ),
        value(BlockType::Message, tag("PGP MESSAGE")),
        value(BlockType::Signature, tag("PGP SIGNATURE")),
        value(BlockType::File, tag("PGP ARMORED FILE")),
    ))(i)
}

/// Parses a single armor header line.
fn armor_header_line(i: &[u8]) -> IResult<&[u8], BlockType> {
    delimited(
        pair(armor_header_sep, tag(&b"BEGIN "[..])),
        armor_header_type,
        pair(armor_header_sep, line_ending),
    )(i)
}

/// Parses a single key value pair, for the header.
fn key_value_pair(i: &[u8]) -> IResult<&[u8], (&str, &str)> {
    let (i, key) = map_res(
        take_while1(|c: u8| c != b':' && c != b'\r' && c != b'\n'),
        str::from_utf8,
    )(i)?;

    // consume the ":"
    let (i, _) = tag(":")(i)?;
    let (i, val) = alt((
        // empty value
        value("", line_ending),
        preceded(
            tag(" "),
            terminated(map_res(not_line_ending, str::from_utf8), line_ending),
        ),
    ))(i)?;

    Ok((i, (key, val)))
}

/// Parses the full armor header.
fn armor_headers(i: &[u8]) -> IResult<&[u8], Headers> {
    map(many0(key_value_pair), |pairs| {
        // merge multiple values with the same name
        let mut out = Headers::new();
        for (k, v) in pairs {
            out.entry(k.to_string()).or_default().push(v.to_string());
        }
        out
    })(i)
}

fn header_parser(i: &[u8]) -> IResult<&[u8], (BlockType, Headers)> {
    // anything before the armor is ignored
    let (i, _) = take_until("-----")(i)?;
    let (i, typ) = armor_header_line(i)?;
    let (i, headers) = armor_headers(i)?;

    // "A blank (zero length or containing only whitespace) line"
    let (i, _) = pair(space0, line_ending)(i)?;

    Ok((i, (typ, headers)))
}

/// Parses a single armor footer line
fn armor_footer_line(i: &[u8]) -> IResult<&[u8], BlockType> {
    delimited(
        pair(armor_header_sep, tag(&b"END "[..])),
        armor_header_type,
        armor_header_sep,
    )(i)
}

/// Read the checksum from an base64 encoded line.
fn read_checksum(line: &[u8]) -> Result<u32> {
    let checksum = STANDARD
        .decode(line)
        .map_err(|_| Error::InvalidChecksum)?;
    let checksum: [u8; 3] = checksum
        .as_slice()
        .try_into()
        .map_err(|_| Error::InvalidChecksum)?;

    Ok(u32::from_be_bytes([0, checksum[0], checksum[1], checksum[2]]))
}

/// Decodes an ascii armored block.
///
/// Returns the block type, the armor headers and the decoded data. The CRC24 checksum is
/// verified when present.
pub fn decode(input: impl AsRef<[u8]>) -> Result<(BlockType, Headers, Vec<u8>)> {
    let input = input.as_ref();

    let (rest, (typ, headers)) = header_parser(input).map_err(|_| Error::InvalidArmorWrappers)?;
    let (rest, body) = take_until::<_, _, nom::error::Error<&[u8]>>("-----END ")(rest)
        .map_err(|_| Error::InvalidArmorWrappers)?;
    let (_, footer_typ) = armor_footer_line(rest).map_err(|_| Error::InvalidArmorWrappers)?;

    if typ != footer_typ {
        debug!("armor header {} does not match footer {}", typ, footer_typ);
        return Err(Error::InvalidArmorWrappers);
    }

    let mut encoded = Vec::with_capacity(body.len());
    let mut checksum = None;
    for line in body.split(|b| *b == b'\n') {
        let line = line.trim_ascii();
        if line.is_empty() {
            continue;
        }
        if checksum.is_some() {
            // nothing may follow the checksum
            return Err(Error::InvalidArmorWrappers);
        }
        match line.strip_prefix(b"=") {
            Some(crc) => checksum = Some(read_checksum(crc)?),
            None => encoded.extend_from_slice(line),
        }
    }

    let data = STANDARD.decode(&encoded)?;

    if let Some(expected) = checksum {
        let actual = crc24::hash_raw(&data);
        if actual != expected {
            debug!("crc24 mismatch: {:06x} != {:06x}", actual, expected);
            return Err(Error::InvalidChecksum);
        }
    }

    Ok((typ, headers, data))
}
