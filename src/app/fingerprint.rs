//! Content fingerprints for staleness detection
//!
//! A [`Fingerprint`] is the MD5 digest of a file's *decompressed* bytes, or
//! the [`Fingerprint::Absent`] sentinel (rendered as `"0"`) when the file does
//! not exist. Fingerprints are only ever compared for equality: the local
//! catalog is stale exactly when its fingerprint differs from the remote
//! manifest's.
//!
//! Compression is an explicit [`Compression`] parameter rather than being
//! guessed from the file suffix. Gzip input is checked for the gzip magic
//! number so a misnamed plain file is reported instead of silently hashed.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

use crate::constants::files;
use crate::errors::{CatalogError, CatalogResult};

/// MD5 digest stored as its raw 16 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Md5Hash([u8; 16]);

impl Md5Hash {
    /// Parse a 32-character hex string (case insensitive)
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let mut bytes = [0u8; 16];
        for (slot, pair) in bytes.iter_mut().zip(hex.as_bytes().chunks(2)) {
            let pair = std::str::from_utf8(pair).ok()?;
            *slot = u8::from_str_radix(pair, 16).ok()?;
        }
        Some(Md5Hash(bytes))
    }

    /// Lowercase hex representation
    pub fn to_hex(&self) -> String {
        use std::fmt::Write;
        self.0.iter().fold(String::with_capacity(32), |mut acc, b| {
            let _ = write!(&mut acc, "{:02x}", b);
            acc
        })
    }
}

impl fmt::Display for Md5Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<md5::Digest> for Md5Hash {
    fn from(digest: md5::Digest) -> Self {
        Md5Hash(digest.0)
    }
}

/// Content fingerprint of a local or remote manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    /// The file does not exist
    Absent,
    /// MD5 of the decompressed content
    Digest(Md5Hash),
}

impl Fingerprint {
    /// Fingerprint of an in-memory byte slice
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Fingerprint::Digest(md5::compute(bytes).into())
    }

    /// Fingerprint of everything a reader yields
    pub fn of_reader<R: Read>(reader: R) -> io::Result<Self> {
        let mut hasher = StreamingFingerprint::new();
        hasher.consume_reader(reader)?;
        Ok(hasher.finish())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Fingerprint::Absent)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fingerprint::Absent => f.write_str(files::ABSENT_FINGERPRINT),
            Fingerprint::Digest(hash) => write!(f, "{}", hash),
        }
    }
}

impl FromStr for Fingerprint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == files::ABSENT_FINGERPRINT {
            return Ok(Fingerprint::Absent);
        }
        Md5Hash::from_hex(s)
            .map(Fingerprint::Digest)
            .ok_or_else(|| format!("invalid fingerprint '{}'", s))
    }
}

impl Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Incremental MD5 over streamed chunks
///
/// Used by transports to fingerprint the remote manifest while it streams
/// past, without keeping it on disk.
pub struct StreamingFingerprint {
    context: md5::Context,
}

impl StreamingFingerprint {
    pub fn new() -> Self {
        Self {
            context: md5::Context::new(),
        }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.context.consume(chunk);
    }

    /// Feed a whole reader through the digest
    pub fn consume_reader<R: Read>(&mut self, mut reader: R) -> io::Result<u64> {
        let mut buffer = vec![0u8; files::READ_CHUNK_SIZE];
        let mut total = 0u64;
        loop {
            let read = reader.read(&mut buffer)?;
            if read == 0 {
                return Ok(total);
            }
            self.context.consume(&buffer[..read]);
            total += read as u64;
        }
    }

    pub fn finish(self) -> Fingerprint {
        Fingerprint::Digest(self.context.compute().into())
    }
}

impl Default for StreamingFingerprint {
    fn default() -> Self {
        Self::new()
    }
}

/// How a catalog file is stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Plain bytes
    None,
    /// Gzip stream
    #[default]
    Gzip,
}

impl Compression {
    pub fn name(&self) -> &'static str {
        match self {
            Compression::None => "plain",
            Compression::Gzip => "gzip",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fingerprint a file's decompressed content
///
/// A missing file yields [`Fingerprint::Absent`]; that is not an error.
pub fn fingerprint(path: &Path, compression: Compression) -> CatalogResult<Fingerprint> {
    if !path.is_file() {
        return Ok(Fingerprint::Absent);
    }

    let reader = open_decompressed(path, compression)?;
    Fingerprint::of_reader(reader).map_err(|source| read_error(path, compression, source))
}

/// Read a file fully, decompressing it according to `compression`
pub fn read_decompressed(path: &Path, compression: Compression) -> CatalogResult<Vec<u8>> {
    if !path.is_file() {
        return Err(CatalogError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = open_decompressed(path, compression)?;
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| read_error(path, compression, source))?;
    Ok(bytes)
}

/// Decoder failures on a gzip stream mean corrupt content, not a failing disk
fn read_error(path: &Path, compression: Compression, source: io::Error) -> CatalogError {
    let undecodable = matches!(
        source.kind(),
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof
    );
    if compression == Compression::Gzip && undecodable {
        CatalogError::Corrupt {
            path: path.to_path_buf(),
            source,
        }
    } else {
        CatalogError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn open_decompressed(path: &Path, compression: Compression) -> CatalogResult<Box<dyn Read>> {
    let io_err = |source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(io_err)?;
    match compression {
        Compression::None => Ok(Box::new(BufReader::new(file))),
        Compression::Gzip => {
            let mut magic = [0u8; 2];
            let is_gzip = match file.read_exact(&mut magic) {
                Ok(()) => magic == files::GZIP_MAGIC,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => false,
                Err(e) => return Err(io_err(e)),
            };
            if !is_gzip {
                return Err(CatalogError::CompressionMismatch {
                    path: path.to_path_buf(),
                    expected: compression.name(),
                });
            }
            // Reopen rather than seek so the decoder sees the full header
            let file = File::open(path).map_err(io_err)?;
            Ok(Box::new(GzDecoder::new(BufReader::new(file))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_gzip(path: &Path, content: &[u8]) {
        let file = File::create(path).unwrap();
        let mut encoder = GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(content).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn test_missing_file_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nope.csv.gz");

        let result = fingerprint(&path, Compression::Gzip).unwrap();
        assert_eq!(result, Fingerprint::Absent);
        assert_eq!(result.to_string(), "0");
    }

    #[test]
    fn test_deterministic_and_content_sensitive() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.csv");
        std::fs::write(&path, b"ID,ISO3\n1,KEN\n").unwrap();

        let first = fingerprint(&path, Compression::None).unwrap();
        let second = fingerprint(&path, Compression::None).unwrap();
        assert_eq!(first, second);

        std::fs::write(&path, b"ID,ISO3\n1,KEM\n").unwrap();
        let changed = fingerprint(&path, Compression::None).unwrap();
        assert_ne!(first, changed);
    }

    #[test]
    fn test_gzip_hashes_decompressed_content() {
        let temp_dir = TempDir::new().unwrap();
        let plain = temp_dir.path().join("catalog.csv");
        let packed = temp_dir.path().join("catalog.csv.gz");
        let content = b"ID,ISO3\n1,KEN\n2,UGA\n";

        std::fs::write(&plain, content).unwrap();
        write_gzip(&packed, content);

        assert_eq!(
            fingerprint(&plain, Compression::None).unwrap(),
            fingerprint(&packed, Compression::Gzip).unwrap()
        );
        assert_eq!(
            fingerprint(&packed, Compression::Gzip).unwrap(),
            Fingerprint::of_bytes(content)
        );
    }

    #[test]
    fn test_misnamed_plain_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.csv.gz");
        std::fs::write(&path, b"ID,ISO3\n1,KEN\n").unwrap();

        let err = fingerprint(&path, Compression::Gzip).unwrap_err();
        assert!(matches!(err, CatalogError::CompressionMismatch { .. }));
    }

    /// Test truncated gzip content
    /// Purpose: Verify a cut-off gzip stream is reported as corrupt, not as I/O
    /// Benefit: Callers can tell a damaged catalog from a failing disk
    #[test]
    fn test_truncated_gzip_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalog.csv.gz");
        std::fs::write(&path, [0x1f, 0x8b, 0x08, 0x00, 0x00]).unwrap();

        let err = fingerprint(&path, Compression::Gzip).unwrap_err();
        assert!(matches!(err, CatalogError::Corrupt { .. }), "{:?}", err);
        let err = read_decompressed(&path, Compression::Gzip).unwrap_err();
        assert!(err.is_unreadable_content());
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let mut streaming = StreamingFingerprint::new();
        streaming.update(b"ID,ISO3\n");
        streaming.update(b"1,KEN\n");
        assert_eq!(streaming.finish(), Fingerprint::of_bytes(b"ID,ISO3\n1,KEN\n"));
    }

    #[test]
    fn test_absent_never_equals_digest() {
        assert_ne!(Fingerprint::Absent, Fingerprint::of_bytes(b""));
    }

    #[test]
    fn test_parse_round_trip_through_text() {
        let digest = Fingerprint::of_bytes(b"hello");
        let parsed: Fingerprint = digest.to_string().parse().unwrap();
        assert_eq!(parsed, digest);
        assert_eq!("0".parse::<Fingerprint>().unwrap(), Fingerprint::Absent);
        assert!("xyz".parse::<Fingerprint>().is_err());
    }

    #[test]
    fn test_md5_hex_case_insensitive() {
        let lower = Md5Hash::from_hex("50c9d1c465f3cbff652be1509c2e2a4e").unwrap();
        let upper = Md5Hash::from_hex("50C9D1C465F3CBFF652BE1509C2E2A4E").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(upper.to_hex(), "50c9d1c465f3cbff652be1509c2e2a4e");
        assert!(Md5Hash::from_hex("50c9d1c4").is_none());
    }
}
