//!
//! Length threshold and merging of segments across programs
//!
use super::schema::IbdProgram;
use super::SegmentRecord;
use fnv::FnvHashSet as HashSet;

///
/// Keep the segments whose length is at least `min_cm`.
///
pub fn filter_by_length(records: Vec<SegmentRecord>, min_cm: f64) -> Vec<SegmentRecord> {
    records
        .into_iter()
        .filter(|record| record.length_cm() >= min_cm)
        .collect()
}

/// key identifying an exact duplicate row
#[derive(PartialEq, Eq, Hash)]
struct DuplicateKey<'a> {
    program: IbdProgram,
    pair: (&'a str, &'a str),
    chrom: &'a str,
    start: u64,
    end: u64,
    length_bits: u64,
}

impl<'a> DuplicateKey<'a> {
    fn of(record: &'a SegmentRecord) -> Self {
        DuplicateKey {
            program: record.program(),
            pair: record.unordered_pair(),
            chrom: record.chrom(),
            start: record.start(),
            end: record.end(),
            length_bits: record.length_cm().to_bits(),
        }
    }
}

///
/// Concatenate the segments of all programs.
///
/// The same pair reported by two programs stays as two records (parallel edges
/// are fine for reachability). Exact duplicates from the same program are
/// collapsed into the first occurrence, regardless of the order of the pair.
///
pub fn merge<I>(records_by_program: I) -> Vec<SegmentRecord>
where
    I: IntoIterator<Item = Vec<SegmentRecord>>,
{
    let all: Vec<SegmentRecord> = records_by_program.into_iter().flatten().collect();
    let mut keep = vec![false; all.len()];
    {
        let mut seen = HashSet::default();
        for (i, record) in all.iter().enumerate() {
            keep[i] = seen.insert(DuplicateKey::of(record));
        }
    }
    all.into_iter()
        .zip(keep)
        .filter_map(|(record, keep)| if keep { Some(record) } else { None })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn seg(a: &str, b: &str, program: IbdProgram, cm: f64, start: u64) -> SegmentRecord {
        SegmentRecord::new(a, b, program, cm, "1", start, start + 1000).unwrap()
    }

    #[test_case(3.0 => 2 ; "default threshold keeps equal length")]
    #[test_case(0.0 => 4 ; "zero threshold keeps all")]
    #[test_case(5.0 => 1 ; "strict threshold")]
    #[test_case(10.0 => 0 ; "threshold above all")]
    fn filter_threshold(min_cm: f64) -> usize {
        let records = vec![
            seg("A", "B", IbdProgram::Ilash, 5.0, 0),
            seg("A", "C", IbdProgram::Ilash, 2.0, 0),
            seg("B", "C", IbdProgram::Ilash, 3.0, 0),
            seg("C", "D", IbdProgram::Ilash, 2.999, 0),
        ];
        let kept = filter_by_length(records, min_cm);
        assert!(kept.iter().all(|r| r.length_cm() >= min_cm));
        kept.len()
    }

    #[test]
    fn filter_never_drops_long_segments() {
        let records: Vec<SegmentRecord> = (0..50)
            .map(|i| seg("A", "B", IbdProgram::HapIbd, i as f64 * 0.25, i))
            .collect();
        let min_cm = 3.0;
        let n_long = records.iter().filter(|r| r.length_cm() >= min_cm).count();
        let kept = filter_by_length(records, min_cm);
        assert_eq!(kept.len(), n_long);
    }

    #[test]
    fn merge_collapses_exact_duplicates_only() {
        let ilash = vec![
            seg("A", "B", IbdProgram::Ilash, 5.0, 0),
            seg("B", "A", IbdProgram::Ilash, 5.0, 0),
            seg("A", "B", IbdProgram::Ilash, 5.0, 7000),
        ];
        let hapibd = vec![
            seg("A", "B", IbdProgram::HapIbd, 5.0, 0),
            seg("A", "B", IbdProgram::HapIbd, 5.0, 0),
        ];
        let merged = merge(vec![ilash, hapibd]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].program(), IbdProgram::Ilash);
        assert_eq!(merged[0].id_a(), "A");
        assert_eq!(merged[1].start(), 7000);
        assert_eq!(merged[2].program(), IbdProgram::HapIbd);

        // merging again changes nothing
        let again = merge(vec![merged.clone()]);
        assert_eq!(again, merged);
    }
}
