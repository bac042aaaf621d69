use crate::types::Error;
use encoding_rs::Encoding;
use std::io::Read;

pub(crate) trait EachLine {
    fn each_line(&self) -> Vec<String>;
}

impl EachLine for str {
    /// Returns a [`Vec`] of lines without their terminators. `\r\n` and `\n`
    /// both end a line.
    #[inline]
    fn each_line(&self) -> Vec<String> {
        self.lines().map(str::to_owned).collect()
    }
}

/// Reads `reader` to the end and decodes its contents with `encoding`.
///
/// Byte Order Mark is skipped, if it matches `encoding`. Malformed input is
/// never replaced.
///
/// # Errors
/// - [`Error::Io`], if reading fails.
/// - [`Error::Decode`], if input is malformed for `encoding`.
pub fn read_decoded<R: Read>(
    mut reader: R,
    encoding: &'static Encoding,
) -> Result<String, Error> {
    let mut bytes: Vec<u8> = Vec::new();
    reader.read_to_end(&mut bytes)?;

    decode(&bytes, encoding)
}

/// Decodes `bytes` with `encoding`, skipping a Byte Order Mark that matches
/// `encoding`.
///
/// # Errors
/// [`Error::Decode`], if input is malformed for `encoding`.
pub fn decode(
    bytes: &[u8],
    encoding: &'static Encoding,
) -> Result<String, Error> {
    let bytes = match Encoding::for_bom(bytes) {
        Some((bom_encoding, bom_length)) if bom_encoding == encoding => {
            &bytes[bom_length..]
        }
        _ => bytes,
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|decoded| decoded.into_owned())
        .ok_or(Error::Decode {
            encoding: encoding.name(),
        })
}
