// 📂 Tabular Decoder - encoding-tolerant CSV reading
//
// GTFS feeds arrive in whatever encoding the publisher's tooling produced.
// A file is read twice:
// 1. in fixed-size chunks, for the byte-order mark, UTF-8 validity, the
//    charset detector and the SHA-256 digest
// 2. through a decoding reader into the csv crate, one record at a time

use anyhow::{Context, Result};
use chardetng::EncodingDetector;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use encoding_rs_io::{DecodeReaderBytes, DecodeReaderBytesBuilder};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, warn};

/// Bytes read per detection chunk
const DETECT_CHUNK: usize = 4096;

// ============================================================================
// ENCODING DETECTION
// ============================================================================

/// Incremental encoding detection over a file's bytes, fed in order.
///
/// A BOM wins outright, then well-formed UTF-8. Otherwise the detector's
/// guess is used; an unconfident guess falls back to Latin-1 (windows-1252,
/// the WHATWG superset of ISO-8859-1).
pub struct EncodingSniffer {
    started: bool,
    bom: Option<(&'static Encoding, usize)>,
    utf8_valid: bool,
    /// Incomplete UTF-8 sequence carried over from the previous chunk
    utf8_tail: Vec<u8>,
    detector: EncodingDetector,
}

impl EncodingSniffer {
    pub fn new() -> Self {
        EncodingSniffer {
            started: false,
            bom: None,
            utf8_valid: true,
            utf8_tail: Vec::new(),
            detector: EncodingDetector::new(),
        }
    }

    /// The first chunk must hold at least three bytes unless the input is
    /// shorter than that.
    pub fn feed(&mut self, chunk: &[u8]) {
        if !self.started {
            self.started = true;
            self.bom = Encoding::for_bom(chunk);
        }
        if self.bom.is_some() {
            return;
        }

        self.check_utf8(chunk);
        self.detector.feed(chunk, false);
    }

    fn check_utf8(&mut self, chunk: &[u8]) {
        if !self.utf8_valid {
            return;
        }

        let mut buf = std::mem::take(&mut self.utf8_tail);
        buf.extend_from_slice(chunk);
        match std::str::from_utf8(&buf) {
            Ok(_) => {}
            // sequence cut by the chunk boundary
            Err(e) if e.error_len().is_none() => self.utf8_tail = buf[e.valid_up_to()..].to_vec(),
            Err(_) => self.utf8_valid = false,
        }
    }

    /// Encoding and the length of the BOM to skip
    pub fn finish(mut self) -> (&'static Encoding, usize) {
        if let Some(bom) = self.bom {
            return bom;
        }
        if self.utf8_valid && self.utf8_tail.is_empty() {
            return (UTF_8, 0);
        }

        self.detector.feed(&[], true);
        let (encoding, confident) = self.detector.guess_assess(None, true);
        if confident {
            (encoding, 0)
        } else {
            warn!(guess = encoding.name(), "Unsure of encoding, assuming windows-1252");
            (WINDOWS_1252, 0)
        }
    }
}

impl Default for EncodingSniffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Encoding of an in-memory buffer, see [`EncodingSniffer`]
pub fn detect_encoding(bytes: &[u8]) -> (&'static Encoding, usize) {
    let mut sniffer = EncodingSniffer::new();
    for chunk in bytes.chunks(DETECT_CHUNK) {
        sniffer.feed(chunk);
    }
    sniffer.finish()
}

// ============================================================================
// DECODED ROW
// ============================================================================

/// Header name → column position, fixed once per file
#[derive(Debug)]
pub struct HeaderIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    fn new(record: &StringRecord) -> Self {
        let names: Vec<String> = record.iter().map(|h| h.trim().to_string()).collect();
        let mut positions = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            // First occurrence wins on duplicated headers
            positions.entry(name.clone()).or_insert(idx);
        }
        HeaderIndex { names, positions }
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.positions.get(field).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// One record of a feed file, addressed by header name
#[derive(Debug, Clone)]
pub struct DecodedRow {
    headers: Rc<HeaderIndex>,
    record: StringRecord,
}

impl DecodedRow {
    /// Raw value of `field`; absent columns and short rows read as ""
    pub fn get(&self, field: &str) -> &str {
        self.headers
            .position(field)
            .and_then(|idx| self.record.get(idx))
            .unwrap_or("")
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.headers.position(field).is_some()
    }

    /// 1-based line in the source file, when the reader tracked it
    pub fn line(&self) -> Option<u64> {
        self.record.position().map(|p| p.line())
    }

    /// Build a row from literal headers/values (used by transformer tests)
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let headers: StringRecord = pairs.iter().map(|(h, _)| *h).collect();
        let record: StringRecord = pairs.iter().map(|(_, v)| *v).collect();
        DecodedRow {
            headers: Rc::new(HeaderIndex::new(&headers)),
            record,
        }
    }
}

// ============================================================================
// FEED FILE
// ============================================================================

/// UTF-8 view of a feed file on disk
pub type DecodedSource = DecodeReaderBytes<File, Vec<u8>>;

/// An opened feed file ready to be iterated once
pub struct FeedFile<R: Read = DecodedSource> {
    encoding: &'static Encoding,
    sha256: String,
    headers: Rc<HeaderIndex>,
    reader: csv::Reader<R>,
}

impl FeedFile {
    /// Detect the encoding of `path`, then reopen it behind a decoding
    /// reader and parse the header line. Rows are decoded lazily.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let mut input = BufReader::with_capacity(DETECT_CHUNK, file);

        let mut sniffer = EncodingSniffer::new();
        let mut hasher = Sha256::new();
        let mut chunk = Vec::with_capacity(DETECT_CHUNK);
        loop {
            chunk.clear();
            let read = (&mut input)
                .take(DETECT_CHUNK as u64)
                .read_to_end(&mut chunk)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            if read == 0 {
                break;
            }
            hasher.update(&chunk);
            sniffer.feed(&chunk);
        }

        let (encoding, bom_len) = sniffer.finish();
        let sha256 = format!("{:x}", hasher.finalize());
        debug!(file = %path.display(), encoding = encoding.name(), "Detected encoding");

        let mut file = input.into_inner();
        file.seek(SeekFrom::Start(bom_len as u64))
            .with_context(|| format!("Failed to rewind file: {}", path.display()))?;
        let source = DecodeReaderBytesBuilder::new().encoding(Some(encoding)).build(file);

        FeedFile::from_reader(source, encoding, sha256)
            .with_context(|| format!("Failed to read CSV header in {}", path.display()))
    }
}

impl<R: Read> FeedFile<R> {
    /// Wrap an already decoded UTF-8 stream
    pub fn from_reader(source: R, encoding: &'static Encoding, sha256: String) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(source);
        let header_record = reader.headers()?.clone();

        Ok(FeedFile {
            encoding,
            sha256,
            headers: Rc::new(HeaderIndex::new(&header_record)),
            reader,
        })
    }

    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Hex SHA-256 of the raw file bytes
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    pub fn headers(&self) -> &[String] {
        self.headers.names()
    }

    /// Consume the file into its row sequence
    pub fn rows(self) -> Rows<R> {
        Rows {
            headers: self.headers,
            records: self.reader.into_records(),
        }
    }
}

/// Single-pass iterator over the decoded rows of a [`FeedFile`]
pub struct Rows<R: Read> {
    headers: Rc<HeaderIndex>,
    records: StringRecordsIntoIter<R>,
}

impl<R: Read> Iterator for Rows<R> {
    type Item = Result<DecodedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(
            record
                .map(|record| DecodedRow {
                    headers: Rc::clone(&self.headers),
                    record,
                })
                .context("Failed to parse CSV record"),
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
