/*!
 * Tab-separated record I/O.
 *
 * Input rows carry `markup \t sound \t tags`, where only the markup column is
 * required. Output rows carry `markup \t translation`. Quotes in input are
 * handled leniently, rows without fields are skipped, and a leading UTF-8
 * byte-order mark can be discarded before decoding starts.
 */

use std::io::{BufRead, BufReader, Read, Write};

use anyhow::{Context, Result};
use log::{debug, trace};

use crate::errors::RecordError;
use crate::markup::MarkupRewriter;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// One input row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardRecord {
    /// Card front markup
    pub markup: String,
    /// Sound field, whitespace-trimmed, empty when absent
    pub sound: String,
    /// Tags column, carried along but not used by the rewriter
    pub tags: String,
}

impl CardRecord {
    /// Build a record from decoded fields; `None` when there are no fields
    fn from_fields(record: &csv::ByteRecord) -> Option<Self> {
        if record.is_empty() {
            return None;
        }
        let field = |i: usize| {
            record
                .get(i)
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .unwrap_or_default()
        };
        Some(Self {
            markup: field(0),
            sound: field(1).trim().to_string(),
            tags: field(2),
        })
    }
}

/// One output row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertedRecord {
    pub markup: String,
    pub translation: String,
}

/// Counters for one converted stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub rows_read: usize,
    pub rows_written: usize,
    pub rows_skipped: usize,
    pub translations: usize,
}

/// Consume a leading UTF-8 byte-order mark. Returns whether one was found.
pub fn strip_bom<R: BufRead + ?Sized>(reader: &mut R) -> std::io::Result<bool> {
    let found = reader.fill_buf()?.starts_with(&UTF8_BOM);
    if found {
        reader.consume(UTF8_BOM.len());
    }
    Ok(found)
}

/// Lenient tab-separated reader yielding `CardRecord`s
pub struct RecordReader<R: Read> {
    inner: csv::Reader<R>,
    record: csv::ByteRecord,
    skipped: usize,
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        let inner = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(true)
            .double_quote(true)
            .from_reader(reader);
        Self {
            inner,
            record: csv::ByteRecord::new(),
            skipped: 0,
        }
    }

    /// Rows dropped because they held no fields
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<CardRecord, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.read_byte_record(&mut self.record) {
                Ok(false) => return None,
                Ok(true) => match CardRecord::from_fields(&self.record) {
                    Some(card) => return Some(Ok(card)),
                    None => self.skipped += 1,
                },
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Tab-separated writer for `ConvertedRecord`s
pub struct RecordWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(writer: W) -> Self {
        let inner = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);
        Self { inner }
    }

    pub fn write(&mut self, record: &ConvertedRecord) -> Result<(), RecordError> {
        self.inner
            .write_record([record.markup.as_str(), record.translation.as_str()])
            .map_err(|e| RecordError::Write(e.to_string()))
    }

    /// Flush and hand back the underlying writer
    pub fn finish(self) -> Result<W, RecordError> {
        self.inner
            .into_inner()
            .map_err(|e| RecordError::Write(e.error().to_string()))
    }
}

/// Rewrite every record of `reader` and write the results to `writer`
pub fn convert_records<R: Read, W: Write>(
    reader: R,
    writer: W,
    rewriter: &MarkupRewriter,
    discard_bom: bool,
) -> Result<(ConversionStats, W)> {
    let mut buffered = BufReader::new(reader);
    if discard_bom && strip_bom(&mut buffered).context("Failed to read data stream")? {
        debug!("Discarded byte-order mark");
    }

    let mut records = RecordReader::new(buffered);
    let mut output = RecordWriter::new(writer);
    let mut stats = ConversionStats::default();

    for record in records.by_ref() {
        let card = record?;
        stats.rows_read += 1;

        let result = rewriter.rewrite(&card.markup, &card.sound);
        if let Some(source) = result.translation_source {
            trace!("Row {}: translation from {}", stats.rows_read, source);
            stats.translations += 1;
        }

        output.write(&ConvertedRecord {
            markup: result.markup,
            translation: result.translation,
        })?;
        stats.rows_written += 1;
    }
    stats.rows_skipped = records.skipped();

    let writer = output.finish()?;
    Ok((stats, writer))
}
