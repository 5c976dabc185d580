//! Filtered search over the three record fields.
//!
//! A [`SearchFilter`] holds one optional substring per field. Matching is
//! unanchored, ASCII case-insensitive containment; an empty filter matches
//! everything, and the filters combine with AND. Results are always ordered
//! by ascending id, so repeated calls against an unchanged store return the
//! same sequence.
//!
//! The SQLite backend turns each non-empty filter into a `LIKE ? ESCAPE '\'`
//! clause via [`like_pattern`]; the in-memory backend uses
//! [`SearchFilter::matches`]. Both fold case the same way.

use crate::models::EcuRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub part_number: String,
    pub model_name: String,
    pub manufacturer: String,
}

impl SearchFilter {
    /// Build a filter; each field is trimmed, so whitespace-only means "no constraint".
    pub fn new(part_number: &str, model_name: &str, manufacturer: &str) -> Self {
        Self {
            part_number: part_number.trim().to_string(),
            model_name: model_name.trim().to_string(),
            manufacturer: manufacturer.trim().to_string(),
        }
    }

    /// The filter that matches every record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.part_number.is_empty() && self.model_name.is_empty() && self.manufacturer.is_empty()
    }

    /// Column/pattern pairs for each active filter, in a fixed column order.
    pub fn clauses(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if !self.part_number.is_empty() {
            out.push(("num_bosch", like_pattern(&self.part_number)));
        }
        if !self.model_name.is_empty() {
            out.push(("modelo_ecu", like_pattern(&self.model_name)));
        }
        if !self.manufacturer.is_empty() {
            out.push(("fabricante", like_pattern(&self.manufacturer)));
        }
        out
    }

    pub fn matches(&self, record: &EcuRecord) -> bool {
        contains_ci(&record.part_number, &self.part_number)
            && contains_ci(&record.model_name, &self.model_name)
            && contains_ci(&record.manufacturer, &self.manufacturer)
    }
}

/// Wrap `needle` for an unanchored `LIKE ... ESCAPE '\'` match, escaping the
/// wildcard characters so they match literally.
pub fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty()
        || haystack
            .to_ascii_lowercase()
            .contains(&needle.to_ascii_lowercase())
}

/// Build the full search statement for `filter`.
pub(crate) fn build_query(filter: &SearchFilter) -> (String, Vec<String>) {
    let mut sql =
        String::from("SELECT id, num_bosch, modelo_ecu, fabricante FROM modelos_ecu WHERE 1=1");
    let mut binds = Vec::new();
    for (column, pattern) in filter.clauses() {
        sql.push_str(" AND ");
        sql.push_str(column);
        sql.push_str(" LIKE ? ESCAPE '\\'");
        binds.push(pattern);
    }
    sql.push_str(" ORDER BY id ASC");
    (sql, binds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(p: &str, m: &str, f: &str) -> EcuRecord {
        EcuRecord {
            id: 1,
            part_number: p.to_string(),
            model_name: m.to_string(),
            manufacturer: f.to_string(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let f = SearchFilter::new("  ", "", "\t");
        assert!(f.is_empty());
        assert!(f.matches(&record("0281", "EDC17", "Bosch")));
    }

    #[test]
    fn substring_is_case_insensitive() {
        let f = SearchFilter::new("", "edc", "");
        assert!(f.matches(&record("0281", "EDC17C64", "Bosch")));
        assert!(!f.matches(&record("0281", "ME7.5", "Bosch")));
    }

    #[test]
    fn filters_combine_with_and() {
        let f = SearchFilter::new("0281", "", "siem");
        assert!(!f.matches(&record("0281", "EDC17", "Bosch")));
        assert!(f.matches(&record("A0281", "SID", "Siemens")));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("abc"), "%abc%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\x"), "%c:\\\\x%");
    }

    #[test]
    fn query_has_one_clause_per_active_field() {
        let (sql, binds) = build_query(&SearchFilter::new("12", "", "bo"));
        assert!(sql.contains("num_bosch LIKE ?"));
        assert!(!sql.contains("modelo_ecu LIKE"));
        assert!(sql.contains("fabricante LIKE ?"));
        assert!(sql.ends_with("ORDER BY id ASC"));
        assert_eq!(binds, vec!["%12%".to_string(), "%bo%".to_string()]);
    }

    #[test]
    fn empty_query_has_no_clauses() {
        let (sql, binds) = build_query(&SearchFilter::all());
        assert!(!sql.contains("LIKE"));
        assert!(binds.is_empty());
    }
}
