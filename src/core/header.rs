//! Header-versus-data decision for the first record.

use super::column::{ColumnMap, ColumnSpec};

/// Outcome of trying to read the first record as a header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderDecision {
    /// Every required column was found; data starts on the next record.
    Accepted(ColumnMap),
    /// Too few names matched: the record is data.
    Rejected,
    /// Some but not all required columns matched.
    Ambiguous { mapped: usize, required: usize },
}

/// Number of columns the first record is expected to provide.
///
/// Undeclared columns count as two, which only rules out an empty record.
pub fn required_count(columns: Option<&[ColumnSpec]>) -> usize {
    columns.map_or(2, |columns| columns.iter().filter(|c| c.required).count())
}

/// A separator that yields fewer than half the required fields is almost
/// certainly wrong.
pub fn too_few_fields(fields: usize, required: usize) -> bool {
    fields * 2 < required
}

/// Decides from a header mapping whether the record was a header.
///
/// `map` must have been built with [`ColumnMap::from_header`] over `columns`.
pub fn decide(columns: &[ColumnSpec], map: ColumnMap) -> HeaderDecision {
    let required = columns.iter().filter(|c| c.required).count();
    let mapped_required = columns
        .iter()
        .filter(|c| c.required && map.contains(&c.name))
        .count();

    if mapped_required >= required {
        HeaderDecision::Accepted(map)
    } else if map.len() * 2 < required {
        HeaderDecision::Rejected
    } else {
        HeaderDecision::Ambiguous {
            mapped: map.len(),
            required,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs(names: &[&str]) -> Vec<ColumnSpec> {
        names.iter().map(|n| ColumnSpec::new(*n)).collect()
    }

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn all_required_mapped_is_accepted() {
        let columns = specs(&["id", "date", "total"]);
        let map = ColumnMap::from_header(&columns, &header(&["date", "id", "total"]));
        assert!(matches!(decide(&columns, map), HeaderDecision::Accepted(_)));
    }

    #[test]
    fn optional_columns_do_not_block_acceptance() {
        let mut columns = specs(&["a", "b"]);
        columns.push(ColumnSpec::new("c").optional());
        let map = ColumnMap::from_header(&columns, &header(&["a", "b"]));
        assert!(matches!(decide(&columns, map), HeaderDecision::Accepted(_)));
    }

    #[test]
    fn less_than_half_mapped_is_rejected() {
        let columns = specs(&["a", "b", "c", "d", "e"]);
        let map = ColumnMap::from_header(&columns, &header(&["x", "a", "y"]));
        assert_eq!(decide(&columns, map), HeaderDecision::Rejected);
    }

    #[test]
    fn half_mapped_is_ambiguous() {
        let columns = specs(&["a", "b", "c", "d"]);
        let map = ColumnMap::from_header(&columns, &header(&["a", "b", "zz"]));
        assert_eq!(
            decide(&columns, map),
            HeaderDecision::Ambiguous {
                mapped: 2,
                required: 4
            }
        );
    }

    #[test]
    fn field_count_threshold() {
        assert!(too_few_fields(1, 3));
        assert!(!too_few_fields(2, 3));
        assert!(!too_few_fields(1, 2));
        assert!(!too_few_fields(1, 1));
        assert_eq!(required_count(None), 2);
        assert_eq!(required_count(Some(&specs(&["a", "b", "c"]))), 3);
    }
}
