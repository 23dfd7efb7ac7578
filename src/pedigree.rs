//!
//! Network membership tables (pedigree rows)
//!
//! # Membership CSV
//!
//! One row per member, written by [`write_membership`] and read by
//! [`read_membership`].
//!
//! ```text
//! Variant,Network,IID
//! rs12345,network_1,A
//! rs12345,network_1,B
//! rs12345,network_2,C
//! ```
//!
//! # Legacy CSV
//!
//! Two columns, a tuple-like `(variant, network)` string and a list-like string
//! of IIDs. Read by [`read_legacy_membership`].
//!
//! ```text
//! key,IIDs
//! "('rs12345', 'network_1')","['A', 'B']"
//! ```
//!
use crate::common::{Iid, NetworkId, VariantId};
use crate::error::{Error, Result};
use crate::network::Network;
use fnv::{FnvHashMap as HashMap, FnvHashSet as HashSet};
use log::warn;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

///
/// Members of one network of one variant.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PedigreeRow {
    pub variant: VariantId,
    pub network: NetworkId,
    pub members: Vec<Iid>,
}

impl PedigreeRow {
    pub fn from_network(network: &Network) -> Self {
        PedigreeRow {
            variant: network.variant().to_owned(),
            network: network.id().clone(),
            members: network.members().to_vec(),
        }
    }
}

/// pedigree rows of networks, in the given order
pub fn rows_from_networks(networks: &[Network]) -> Vec<PedigreeRow> {
    networks.iter().map(PedigreeRow::from_network).collect()
}

///
/// Check that no IID is listed in two networks of the same variant.
///
pub fn check_unique_membership(rows: &[PedigreeRow]) -> Result<()> {
    let mut seen: HashSet<(&str, &str)> = HashSet::default();
    for (i, row) in rows.iter().enumerate() {
        for iid in row.members.iter() {
            if !seen.insert((row.variant.as_str(), iid.as_str())) {
                return Err(Error::MalformedPedigreeRow {
                    row: i + 1,
                    reason: format!(
                        "{} is a member of more than one network of {}",
                        iid, row.variant
                    ),
                });
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MemberRecord {
    #[serde(rename = "Variant")]
    variant: VariantId,
    #[serde(rename = "Network")]
    network: NetworkId,
    #[serde(rename = "IID")]
    iid: Iid,
}

///
/// write one CSV row per member
///
pub fn write_membership<W: Write>(rows: &[PedigreeRow], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        for iid in row.members.iter() {
            wtr.serialize(MemberRecord {
                variant: row.variant.clone(),
                network: row.network.clone(),
                iid: iid.clone(),
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

///
/// read one-row-per-member CSV, grouping members by (variant, network) in
/// the order the groups first appear
///
pub fn read_membership<R: Read>(reader: R) -> Result<Vec<PedigreeRow>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows: Vec<PedigreeRow> = Vec::new();
    let mut index: HashMap<(VariantId, NetworkId), usize> = HashMap::default();
    for result in rdr.deserialize() {
        let record: MemberRecord = result?;
        let key = (record.variant.clone(), record.network.clone());
        let i = *index.entry(key).or_insert_with(|| {
            rows.push(PedigreeRow {
                variant: record.variant,
                network: record.network,
                members: Vec::new(),
            });
            rows.len() - 1
        });
        rows[i].members.push(record.iid);
    }
    check_unique_membership(&rows)?;
    Ok(rows)
}

///
/// Rows read from a legacy membership table with the number of rows that could
/// not be parsed.
///
#[derive(Debug, Clone, Default)]
pub struct LegacyMembership {
    pub rows: Vec<PedigreeRow>,
    pub n_malformed: usize,
}

fn clean_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\'' && *c != '"')
        .collect()
}

fn strip_enclosing<'a>(s: &'a str, open: char, close: char) -> Option<&'a str> {
    s.strip_prefix(open)?.strip_suffix(close)
}

///
/// parse a list-like string such as `"[ 'A', 'B' ]"` into `["A", "B"]`
///
pub fn parse_iid_list(s: &str) -> std::result::Result<Vec<Iid>, String> {
    let trimmed = s.trim();
    let inner = strip_enclosing(trimmed, '[', ']')
        .ok_or_else(|| format!("`{}` is not a bracketed list", s))?;
    if inner.contains(|c: char| c == '[' || c == ']') {
        return Err(format!("unbalanced brackets in `{}`", s));
    }
    if inner.trim().is_empty() {
        return Err("empty member list".to_owned());
    }
    let iids: Vec<Iid> = inner.split(',').map(clean_token).collect();
    if iids.iter().any(|iid| iid.is_empty()) {
        return Err(format!("empty IID in `{}`", s));
    }
    Ok(iids)
}

///
/// parse a tuple-like string such as `"('rs1', 'network_1')"`
///
pub fn parse_network_key(s: &str) -> std::result::Result<(VariantId, NetworkId), String> {
    let trimmed = s.trim();
    let inner = strip_enclosing(trimmed, '(', ')')
        .or_else(|| strip_enclosing(trimmed, '[', ']'))
        .unwrap_or(trimmed);
    if inner.contains(|c: char| matches!(c, '(' | ')' | '[' | ']')) {
        return Err(format!("unbalanced brackets in `{}`", s));
    }
    let tokens: Vec<String> = inner.split(',').map(clean_token).collect();
    match tokens.as_slice() {
        [variant, network] if !variant.is_empty() && !network.is_empty() => {
            Ok((variant.clone(), NetworkId(network.clone())))
        }
        _ => Err(format!("expected (variant, network) in `{}`", s)),
    }
}

///
/// Read the legacy two-column format. Rows that cannot be parsed are skipped,
/// counted and logged.
///
pub fn read_legacy_membership<R: Read>(reader: R) -> Result<LegacyMembership> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut out = LegacyMembership::default();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let parsed = match (record.get(0), record.get(1)) {
            (Some(key), Some(list)) => parse_network_key(key).and_then(|(variant, network)| {
                let members = parse_iid_list(list)?;
                Ok(PedigreeRow {
                    variant,
                    network,
                    members,
                })
            }),
            _ => Err("expected two columns".to_owned()),
        };
        match parsed {
            Ok(row) => out.rows.push(row),
            Err(reason) => {
                let e = Error::MalformedPedigreeRow { row: i + 1, reason };
                warn!("{}", e);
                out.n_malformed += 1;
            }
        }
    }
    if out.n_malformed > 0 {
        warn!(
            "skipped {} malformed pedigree rows; their carriers are missing from the allele counts",
            out.n_malformed
        );
    }
    check_unique_membership(&out.rows)?;
    Ok(out)
}

///
/// Read a membership file of either format, detected from the header
/// (the one-row-per-member format has an `IID` column).
///
pub fn read_membership_file<P: AsRef<Path>>(path: P) -> Result<LegacyMembership> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::from(e).in_file(path))?;
    let header = text.lines().next().unwrap_or("");
    let is_structured = header.split(',').any(|c| c.trim() == "IID");
    let result = if is_structured {
        read_membership(text.as_bytes()).map(|rows| LegacyMembership {
            rows,
            n_malformed: 0,
        })
    } else {
        read_legacy_membership(text.as_bytes())
    };
    result.map_err(|e| e.in_file(path))
}
