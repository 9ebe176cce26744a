//! In-memory KMZ (zip) reader.
//!
//! KMZ payloads from the feeds are small, so the whole archive is already in memory by the time
//! it gets here. Like any zip reader we start from the End of Central Directory record at the
//! tail, walk the Central Directory, and only then touch the local headers of the entry we want.
//! ZIP64 and encryption are not supported; the agency never produces them.

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::Crc;
use flate2::read::DeflateDecoder;
use std::io::{self, Cursor, Read};

use crate::error::{Result, StormError};

/// Extension of the document we want out of a KMZ.
pub const KML_EXTENSION: &str = ".kml";

const EOCD_SIGNATURE: &[u8] = b"PK\x05\x06";
const EOCD_SIZE: usize = 22;
const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
const LFH_SIZE: usize = 30;
const MAX_COMMENT_SIZE: usize = 65535;
/// Upper bound on the output buffer reserved from a header's declared size.
const MAX_PREALLOC: u64 = 16 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }
}

/// One Central Directory entry.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub file_name: String,
    pub compression_method: CompressionMethod,
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    lfh_offset: u64,
}

/// A parsed view over the bytes of a zip archive.
#[derive(Debug)]
pub struct KmzArchive<'a> {
    data: &'a [u8],
    entries: Vec<ArchiveEntry>,
}

impl<'a> KmzArchive<'a> {
    pub fn open(data: &'a [u8]) -> Result<Self> {
        let eocd_offset = find_eocd(data)?;
        let eocd = parse_eocd(&data[eocd_offset..]).map_err(malformed("end of central directory"))?;

        if eocd.total_entries == 0xFFFF || eocd.cd_offset == 0xFFFF_FFFF {
            return Err(StormError::ArchiveFormat(
                "ZIP64 archives are not supported".to_string(),
            ));
        }

        let cd_offset = eocd.cd_offset as usize;
        let cd = data
            .get(cd_offset..cd_offset + eocd.cd_size as usize)
            .ok_or_else(|| StormError::ArchiveFormat("central directory out of bounds".into()))?;

        let mut cursor = Cursor::new(cd);
        let mut entries = Vec::with_capacity(eocd.total_entries as usize);
        for _ in 0..eocd.total_entries {
            entries.push(parse_cdfh(&mut cursor).map_err(malformed("central directory"))?);
        }

        Ok(Self { data, entries })
    }

    /// Entries in Central Directory order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// First entry (in archive order) whose name ends with `extension`.
    pub fn find_by_extension(&self, extension: &str) -> Option<&ArchiveEntry> {
        self.entries
            .iter()
            .find(|e| !e.file_name.ends_with('/') && e.file_name.ends_with(extension))
    }

    /// Decompress one entry into memory.
    pub fn read(&self, entry: &ArchiveEntry) -> Result<Vec<u8>> {
        let lfh_start = entry.lfh_offset as usize;
        let lfh = self
            .data
            .get(lfh_start..lfh_start + LFH_SIZE)
            .ok_or_else(|| StormError::ArchiveFormat("local header out of bounds".into()))?;
        if &lfh[0..4] != LFH_SIGNATURE {
            return Err(StormError::ArchiveFormat("invalid local file header".into()));
        }

        let mut cursor = Cursor::new(&lfh[26..]);
        let file_name_length = cursor
            .read_u16::<LittleEndian>()
            .map_err(malformed("local file header"))? as usize;
        let extra_field_length = cursor
            .read_u16::<LittleEndian>()
            .map_err(malformed("local file header"))? as usize;

        let data_start = lfh_start + LFH_SIZE + file_name_length + extra_field_length;
        let raw = self
            .data
            .get(data_start..data_start + entry.compressed_size as usize)
            .ok_or_else(|| {
                StormError::ArchiveFormat(format!("data for '{}' is truncated", entry.file_name))
            })?;

        let out = match entry.compression_method {
            CompressionMethod::Stored => raw.to_vec(),
            CompressionMethod::Deflate => {
                let mut out = Vec::with_capacity(entry.uncompressed_size.min(MAX_PREALLOC) as usize);
                DeflateDecoder::new(raw)
                    .read_to_end(&mut out)
                    .map_err(|err| {
                        StormError::ArchiveFormat(format!(
                            "failed to inflate '{}': {err}",
                            entry.file_name
                        ))
                    })?;
                out
            }
            CompressionMethod::Unknown(method) => {
                return Err(StormError::ArchiveFormat(format!(
                    "unsupported compression method {method} for '{}'",
                    entry.file_name
                )));
            }
        };

        let mut crc = Crc::new();
        crc.update(&out);
        if crc.sum() != entry.crc32 {
            return Err(StormError::ArchiveFormat(format!(
                "CRC-32 mismatch for '{}'",
                entry.file_name
            )));
        }

        Ok(out)
    }
}

/// Returns the text of the first `.kml` document in a KMZ archive.
pub fn extract_kml(data: &[u8]) -> Result<String> {
    extract_document(data, KML_EXTENSION)
}

/// Returns the text of the first entry ending in `extension`, trimmed of surrounding whitespace.
///
/// If several entries match, the first one in archive order wins.
pub fn extract_document(data: &[u8], extension: &str) -> Result<String> {
    let archive = KmzArchive::open(data)?;
    let entry = archive.find_by_extension(extension).ok_or_else(|| {
        StormError::ArchiveFormat(format!("no '{extension}' document found in archive"))
    })?;

    let bytes = archive.read(entry)?;
    let text = String::from_utf8(bytes).map_err(|_| {
        StormError::ArchiveFormat(format!("'{}' is not valid UTF-8", entry.file_name))
    })?;

    Ok(text.trim_start_matches('\u{feff}').trim().to_string())
}

fn find_eocd(data: &[u8]) -> Result<usize> {
    if data.len() < EOCD_SIZE {
        return Err(StormError::ArchiveFormat("not a zip archive".into()));
    }

    // Common case: no archive comment.
    let tail = data.len() - EOCD_SIZE;
    if &data[tail..tail + 4] == EOCD_SIGNATURE && data[tail + 20..tail + 22] == [0, 0] {
        return Ok(tail);
    }

    let search_start = data.len().saturating_sub(MAX_COMMENT_SIZE + EOCD_SIZE);
    for i in (search_start..=tail).rev() {
        if &data[i..i + 4] == EOCD_SIGNATURE {
            let comment_len = u16::from_le_bytes([data[i + 20], data[i + 21]]) as usize;
            if comment_len == data.len() - i - EOCD_SIZE {
                return Ok(i);
            }
        }
    }

    Err(StormError::ArchiveFormat("not a zip archive".into()))
}

fn malformed(record: &'static str) -> impl Fn(io::Error) -> StormError {
    move |err| StormError::ArchiveFormat(format!("malformed {record}: {err}"))
}

struct EndOfCentralDirectory {
    total_entries: u16,
    cd_size: u32,
    cd_offset: u32,
}

fn parse_eocd(record: &[u8]) -> io::Result<EndOfCentralDirectory> {
    let mut cursor = Cursor::new(record);
    cursor.set_position(4);
    let _disk_number = cursor.read_u16::<LittleEndian>()?;
    let _disk_with_cd = cursor.read_u16::<LittleEndian>()?;
    let _disk_entries = cursor.read_u16::<LittleEndian>()?;
    let total_entries = cursor.read_u16::<LittleEndian>()?;
    let cd_size = cursor.read_u32::<LittleEndian>()?;
    let cd_offset = cursor.read_u32::<LittleEndian>()?;

    Ok(EndOfCentralDirectory {
        total_entries,
        cd_size,
        cd_offset,
    })
}

fn parse_cdfh(cursor: &mut Cursor<&[u8]>) -> io::Result<ArchiveEntry> {
    let mut sig = [0u8; 4];
    cursor.read_exact(&mut sig)?;
    if sig != CDFH_SIGNATURE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "invalid central directory header",
        ));
    }

    let _version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let _flags = cursor.read_u16::<LittleEndian>()?;
    let compression_method = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let crc32 = cursor.read_u32::<LittleEndian>()?;
    let compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let file_name_length = cursor.read_u16::<LittleEndian>()?;
    let extra_field_length = cursor.read_u16::<LittleEndian>()?;
    let file_comment_length = cursor.read_u16::<LittleEndian>()?;
    let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let _external_attrs = cursor.read_u32::<LittleEndian>()?;
    let lfh_offset = cursor.read_u32::<LittleEndian>()? as u64;

    let mut file_name_bytes = vec![0u8; file_name_length as usize];
    cursor.read_exact(&mut file_name_bytes)?;
    let file_name = String::from_utf8_lossy(&file_name_bytes).to_string();

    cursor.set_position(cursor.position() + extra_field_length as u64 + file_comment_length as u64);

    Ok(ArchiveEntry {
        file_name,
        compression_method: CompressionMethod::from_u16(compression_method),
        crc32,
        compressed_size,
        uncompressed_size,
        lfh_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ZipEntry, build_zip};

    #[test]
    fn extracts_first_kml_entry() {
        let data = build_zip(&[
            ZipEntry::stored("files/icon.png", b"\x89PNG"),
            ZipEntry::deflated("al012014_best_track.kml", b"  <kml>first</kml>\n"),
            ZipEntry::stored("other.kml", b"<kml>second</kml>"),
        ]);

        let kml = extract_kml(&data).unwrap();
        assert_eq!(kml, "<kml>first</kml>");
    }

    #[test]
    fn lists_entries_in_archive_order() {
        let data = build_zip(&[
            ZipEntry::stored("a.png", b"a"),
            ZipEntry::deflated("b.kml", b"bbbbbbbbbbbbbbbb"),
        ]);

        let archive = KmzArchive::open(&data).unwrap();
        let names: Vec<_> = archive.entries().iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.kml"]);
        assert_eq!(archive.entries()[1].compression_method, CompressionMethod::Deflate);
        assert_eq!(archive.read(&archive.entries()[1]).unwrap(), b"bbbbbbbbbbbbbbbb");
    }

    #[test]
    fn missing_kml_is_an_archive_error() {
        let data = build_zip(&[ZipEntry::stored("readme.txt", b"hello")]);

        let err = extract_kml(&data).unwrap_err();
        assert!(matches!(err, StormError::ArchiveFormat(_)));
        assert!(err.to_string().contains(".kml"));
    }

    #[test]
    fn garbage_is_not_an_archive() {
        let err = extract_kml(b"this is definitely not a zip file").unwrap_err();
        assert!(matches!(err, StormError::ArchiveFormat(_)));
    }

    fn cd_offset(data: &[u8]) -> usize {
        let eocd = data.len() - EOCD_SIZE;
        u32::from_le_bytes(data[eocd + 16..eocd + 20].try_into().unwrap()) as usize
    }

    #[test]
    fn corrupted_payload_fails_the_checksum() {
        let mut data = build_zip(&[ZipEntry::stored("a.kml", b"<kml>a</kml>")]);
        data[LFH_SIZE + "a.kml".len()] ^= 0x01;

        let err = extract_kml(&data).unwrap_err();
        assert!(matches!(err, StormError::ArchiveFormat(_)));
        assert!(err.to_string().contains("CRC-32"));
    }

    #[test]
    fn entry_count_beyond_central_directory_is_an_archive_error() {
        let mut data = build_zip(&[ZipEntry::stored("a.kml", b"<kml>a</kml>")]);
        let eocd = data.len() - EOCD_SIZE;
        data[eocd + 8..eocd + 10].copy_from_slice(&2u16.to_le_bytes());
        data[eocd + 10..eocd + 12].copy_from_slice(&2u16.to_le_bytes());

        let err = KmzArchive::open(&data).unwrap_err();
        assert!(matches!(err, StormError::ArchiveFormat(_)));
    }

    #[test]
    fn truncated_deflate_stream_is_an_archive_error() {
        let kml = "<kml>".repeat(64) + &"x".repeat(512);
        let data = build_zip(&[ZipEntry::deflated("a.kml", kml.as_bytes())]);
        let archive = KmzArchive::open(&data).unwrap();
        let mut entry = archive.entries()[0].clone();
        entry.compressed_size /= 2;

        let err = archive.read(&entry).unwrap_err();
        assert!(matches!(err, StormError::ArchiveFormat(_)));
    }

    #[test]
    fn oversized_declared_length_still_reads() {
        let mut data = build_zip(&[ZipEntry::deflated("a.kml", b"<kml>big</kml>")]);
        let size_field = cd_offset(&data) + 24;
        data[size_field..size_field + 4].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());

        let archive = KmzArchive::open(&data).unwrap();
        assert_eq!(archive.entries()[0].uncompressed_size, 0xFFFF_FFF0);
        assert_eq!(archive.read(&archive.entries()[0]).unwrap(), b"<kml>big</kml>");
    }
}
