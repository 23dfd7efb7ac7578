//!
//! Lazy reader of IBD segment files
//!
use super::schema::{IbdProgram, SegmentSchema};
use super::SegmentRecord;
use crate::error::{Error, Result};
use flate2::bufread::MultiGzDecoder;
use log::{debug, warn};
use std::io::BufRead;
use std::path::{Path, PathBuf};

///
/// Iterator of `SegmentRecord` over the lines of a segment table.
///
/// Blank lines and lines starting with `#` are skipped silently.
/// A row that fails validation (including a row that is not valid UTF-8) is
/// returned as `Err(Error::MalformedRecord)`, and the iteration can continue
/// after it.
///
pub struct SegmentReader<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    program: IbdProgram,
    schema: SegmentSchema,
    line: usize,
}

impl<R: BufRead> SegmentReader<R> {
    pub fn new(reader: R, program: IbdProgram) -> Self {
        SegmentReader {
            reader,
            buf: Vec::new(),
            program,
            schema: program.schema(),
            line: 0,
        }
    }
    fn parse_line(&self, text: &str) -> Result<SegmentRecord> {
        let malformed = |reason: String| Error::MalformedRecord {
            line: self.line,
            reason,
        };
        let fields: Vec<&str> = text.split_whitespace().collect();
        let schema = &self.schema;
        if fields.len() < schema.n_required_columns() {
            return Err(malformed(format!(
                "expected at least {} columns, found {}",
                schema.n_required_columns(),
                fields.len()
            )));
        }
        let id_a = fields[schema.id_a];
        let id_b = fields[schema.id_b];
        if id_a == id_b {
            return Err(malformed(format!("self pair {}", id_a)));
        }
        let start: u64 = fields[schema.start]
            .parse()
            .map_err(|_| malformed(format!("invalid start `{}`", fields[schema.start])))?;
        let end: u64 = fields[schema.end]
            .parse()
            .map_err(|_| malformed(format!("invalid end `{}`", fields[schema.end])))?;
        if end < start {
            return Err(malformed(format!("end {} before start {}", end, start)));
        }
        let length_cm: f64 = fields[schema.length_cm].parse().map_err(|_| {
            malformed(format!("invalid length `{}`", fields[schema.length_cm]))
        })?;
        SegmentRecord::new(
            id_a,
            id_b,
            self.program,
            length_cm,
            fields[schema.chrom],
            start,
            end,
        )
        .map_err(|e| match e {
            Error::MalformedRecord { reason, .. } => malformed(reason),
            e => e,
        })
    }
}

impl<R: BufRead> Iterator for SegmentReader<R> {
    type Item = Result<SegmentRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line += 1;
            let text = match std::str::from_utf8(&self.buf) {
                Ok(text) => text.trim(),
                Err(e) => {
                    return Some(Err(Error::MalformedRecord {
                        line: self.line,
                        reason: format!("invalid UTF-8 ({})", e),
                    }))
                }
            };
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            return Some(self.parse_line(text));
        }
    }
}

///
/// Segments of one source file, with the number of rows that were skipped.
///
#[derive(Debug, Clone)]
pub struct SegmentBatch {
    pub program: IbdProgram,
    pub records: Vec<SegmentRecord>,
    pub n_skipped: usize,
}

///
/// Read all segments from `reader`, skipping (and counting) malformed rows.
///
/// IO errors abort the read.
///
pub fn read_segments<R: BufRead>(reader: R, program: IbdProgram) -> Result<SegmentBatch> {
    let mut records = Vec::new();
    let mut n_skipped = 0;
    for result in SegmentReader::new(reader, program) {
        match result {
            Ok(record) => records.push(record),
            Err(e) if e.is_recoverable() => {
                debug!("{}: {}", program, e);
                n_skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    if n_skipped > 0 {
        warn!("{}: skipped {} malformed segment rows", program, n_skipped);
    }
    Ok(SegmentBatch {
        program,
        records,
        n_skipped,
    })
}

///
/// open a file as `BufRead`, decompressing it if the name ends with `.gz`
///
pub fn open_text_file<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead + Send>> {
    let file = std::fs::File::open(path.as_ref())?;
    let reader = std::io::BufReader::new(file);
    if path.as_ref().extension().map_or(false, |ext| ext == "gz") {
        let decoder = MultiGzDecoder::new(reader);
        Ok(Box::new(std::io::BufReader::new(decoder)))
    } else {
        Ok(Box::new(reader))
    }
}

///
/// read a (possibly gzipped) segment file
///
pub fn read_segment_file<P: AsRef<Path>>(path: P, program: IbdProgram) -> Result<SegmentBatch> {
    let path = path.as_ref();
    let reader = open_text_file(path).map_err(|e| e.in_file(path))?;
    let batch = read_segments(reader, program).map_err(|e| e.in_file(path))?;
    debug!(
        "read {} segments from {} ({} skipped)",
        batch.records.len(),
        path.display(),
        batch.n_skipped
    );
    Ok(batch)
}

///
/// list the segment files of `program` in `dir`, sorted by file name
///
pub fn find_segment_files<P: AsRef<Path>>(dir: P, program: IbdProgram) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        let is_match = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| program.matches_filename(name));
        if path.is_file() && is_match {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const ILASH: &str = "\
0\tA\t0\tB\t1\t1000\t5000\trs1\trs9\t5.5\t0.99
0\tA\t0\tC\t1\t1000\t5000\trs1\trs9\t2.0\t0.99
";

    const HAPIBD: &str = "\
A\t1\tB\t2\t1\t1000\t5000\t4.25
# comment line

B\t1\tC\t1\t2\t300\t900\t3.0
";

    #[test]
    fn read_ilash_rows() {
        let batch = read_segments(ILASH.as_bytes(), IbdProgram::Ilash).unwrap();
        assert_eq!(batch.n_skipped, 0);
        assert_eq!(batch.records.len(), 2);
        let r = &batch.records[0];
        assert_eq!(r.id_a(), "A");
        assert_eq!(r.id_b(), "B");
        assert_eq!(r.chrom(), "1");
        assert_eq!(r.start(), 1000);
        assert_eq!(r.end(), 5000);
        assert_eq!(r.length_cm(), 5.5);
        assert_eq!(r.program(), IbdProgram::Ilash);
    }

    #[test]
    fn read_hapibd_rows_with_comments() {
        let batch = read_segments(HAPIBD.as_bytes(), IbdProgram::HapIbd).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[1].id_a(), "B");
        assert_eq!(batch.records[1].id_b(), "C");
        assert_eq!(batch.records[1].chrom(), "2");
        assert_eq!(batch.records[1].length_cm(), 3.0);
    }

    #[test]
    fn malformed_rows_are_skipped_and_counted() {
        let text = "\
A\t1\tB\t2\t1\t1000\t5000\t4.25
A\t1\tB\t2\t1\t1000
A\t1\tA\t2\t1\t1000\t5000\t4.25
A\t1\tB\t2\t1\tx\t5000\t4.25
A\t1\tB\t2\t1\t1000\t5000\t-3
A\t1\tB\t2\t1\t5000\t1000\t4.0
C\t1\tD\t2\t1\t1000\t5000\t8
";
        let rows: Vec<_> = SegmentReader::new(text.as_bytes(), IbdProgram::HapIbd).collect();
        assert_eq!(rows.len(), 7);
        assert!(matches!(rows[1], Err(Error::MalformedRecord { line: 2, .. })));
        assert!(matches!(rows[2], Err(Error::MalformedRecord { line: 3, .. })));

        let batch = read_segments(text.as_bytes(), IbdProgram::HapIbd).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.n_skipped, 5);
    }

    #[test]
    fn invalid_utf8_row_is_skipped() {
        let mut bytes = b"A\t1\tB\t2\t1\t1000\t5000\t4.25\n".to_vec();
        bytes.extend_from_slice(b"C\t1\t\xff\t2\t1\t1000\t5000\t4.0\n");
        bytes.extend_from_slice(b"B\t1\tC\t1\t2\t300\t900\t3.0\n");

        let rows: Vec<_> = SegmentReader::new(&bytes[..], IbdProgram::HapIbd).collect();
        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[1], Err(Error::MalformedRecord { line: 2, .. })));

        let batch = read_segments(&bytes[..], IbdProgram::HapIbd).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.n_skipped, 1);
        assert_eq!(batch.records[1].id_a(), "B");
    }

    #[test]
    fn gz_file_and_directory_listing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chr1_rs1.ibd.gz");
        let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
        encoder.write_all(HAPIBD.as_bytes()).unwrap();
        encoder.finish().unwrap();
        std::fs::write(dir.path().join("chr1_rs1.match.gz"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let batch = read_segment_file(&path, IbdProgram::HapIbd).unwrap();
        assert_eq!(batch.records.len(), 2);

        let files = find_segment_files(dir.path(), IbdProgram::HapIbd).unwrap();
        assert_eq!(files, vec![path]);
    }

    #[test]
    fn missing_file_has_path_in_error() {
        let e = read_segment_file("/nonexistent/x.ibd.gz", IbdProgram::HapIbd).unwrap_err();
        assert!(e.to_string().starts_with("/nonexistent/x.ibd.gz"));
    }
}
