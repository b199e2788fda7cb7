use sha1::{Digest, Sha1};

/// Two octet checksum: sum of all octets mod 65536.
#[inline]
pub fn calculate_simple(data: &[u8]) -> u16 {
    data.iter().fold(0u16, |acc, v| acc.wrapping_add(u16::from(*v)))
}

/// SHA1 checksum, first 20 octets.
#[inline]
pub fn calculate_sha1(data: &[u8]) -> [u8; 20] {
    Sha1::digest(data).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_wraps() {
        assert_eq!(calculate_simple(&[0xff; 258]), ((0xffu32 * 258) & 0xffff) as u16);
        assert_eq!(calculate_simple(&[]), 0);
    }
}
