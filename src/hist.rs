//!
//! Histogram counter
//!
use fnv::FnvHashMap as HashMap;
use itertools::Itertools;

///
/// Histogram counter struct (value -> number of occurrences)
///
/// * new / from_values
/// * add
/// * get
/// * iter (sorted by value)
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hist(HashMap<usize, usize>);

impl Hist {
    ///
    /// Create an empty histogram counter
    ///
    pub fn new() -> Self {
        Hist(HashMap::default())
    }
    ///
    /// Count every value of an iterator
    ///
    pub fn from_values<I: IntoIterator<Item = usize>>(values: I) -> Self {
        let mut h = Hist::new();
        for value in values {
            h.add(value);
        }
        h
    }
    pub fn add(&mut self, value: usize) {
        *self.0.entry(value).or_insert(0) += 1;
    }
    pub fn get(&self, value: usize) -> usize {
        self.0.get(&value).copied().unwrap_or(0)
    }
    ///
    /// (value, count) pairs in increasing order of value
    ///
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v)).sorted()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Hist {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.iter().map(|(k, v)| format!("{}:{}", k, v)).join(",")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_sizes() {
        let mut sizes = Hist::new();
        assert!(sizes.is_empty());
        for size in [1, 1, 4, 2, 1, 4] {
            sizes.add(size);
        }
        assert_eq!(sizes.get(1), 3);
        assert_eq!(sizes.get(3), 0);
        assert_eq!(sizes.iter().collect::<Vec<_>>(), vec![(1, 3), (2, 1), (4, 2)]);
        assert_eq!(sizes.to_string(), "1:3,2:1,4:2");
    }

    #[test]
    fn allele_counts_from_values() {
        let counts = Hist::from_values(vec![6, 3, 3, 12]);
        assert_eq!(counts.to_string(), "3:2,6:1,12:1");
        assert_eq!(Hist::from_values(vec![2]).get(2), 1);
        assert_eq!(Hist::from_values(Vec::new()), Hist::new());
    }
}
