//! Filter composition for interval queries.

use rusqlite::types::Value;
use ut_core::TimeRange;

/// A filter over interval records: a time window plus optional substring
/// matches on application and window names.
///
/// Filter text is always bound as a parameter, never spliced into SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    range: TimeRange,
    name_filter: Option<String>,
    window_filter: Option<String>,
}

/// A SQL `WHERE` body and the parameters it binds, in order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SqlFilter {
    pub clause: String,
    pub params: Vec<Value>,
}

impl Predicate {
    pub const fn new(range: TimeRange) -> Self {
        Self {
            range,
            name_filter: None,
            window_filter: None,
        }
    }

    /// Restricts to applications whose name contains `filter`.
    /// Empty filters are ignored.
    #[must_use]
    pub fn with_name_filter(mut self, filter: Option<&str>) -> Self {
        self.name_filter = non_empty(filter);
        self
    }

    /// Restricts to windows whose title contains `filter`.
    /// Empty filters are ignored.
    #[must_use]
    pub fn with_window_filter(mut self, filter: Option<&str>) -> Self {
        self.window_filter = non_empty(filter);
        self
    }

    pub const fn range(&self) -> &TimeRange {
        &self.range
    }

    pub(crate) fn to_sql(&self) -> SqlFilter {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        if let Some(start) = self.range.start() {
            clauses.push("start_time >= ?");
            params.push(Value::Integer(start.timestamp()));
        }
        if let Some(end) = self.range.end() {
            clauses.push("end_time <= ?");
            params.push(Value::Integer(end.timestamp()));
        }
        if let Some(name) = &self.name_filter {
            clauses.push("name LIKE ? ESCAPE '\\'");
            params.push(Value::Text(like_pattern(name)));
        }
        if let Some(window) = &self.window_filter {
            clauses.push("window_name LIKE ? ESCAPE '\\'");
            params.push(Value::Text(like_pattern(window)));
        }

        let clause = if clauses.is_empty() {
            "1 = 1".to_string()
        } else {
            clauses.join(" AND ")
        };
        SqlFilter { clause, params }
    }
}

fn non_empty(filter: Option<&str>) -> Option<String> {
    filter.filter(|f| !f.is_empty()).map(String::from)
}

/// Builds a `LIKE` pattern matching `needle` anywhere, with wildcards in the
/// needle itself escaped.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};

    fn ts(hour: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 29, hour, 0, 0).unwrap()
    }

    #[test]
    fn start_only_uses_single_clause() {
        let predicate = Predicate::new(TimeRange::since(ts(8)));
        let sql = predicate.to_sql();
        assert_eq!(sql.clause, "start_time >= ?");
        assert_eq!(sql.params, vec![Value::Integer(ts(8).timestamp())]);
    }

    #[test]
    fn end_only_uses_single_clause() {
        let range = TimeRange::new(None, Some(ts(18))).unwrap();
        let sql = Predicate::new(range).to_sql();
        assert_eq!(sql.clause, "end_time <= ?");
        assert_eq!(sql.params, vec![Value::Integer(ts(18).timestamp())]);
    }

    #[test]
    fn both_bounds_are_joined_with_and() {
        let range = TimeRange::new(Some(ts(8)), Some(ts(18))).unwrap();
        let sql = Predicate::new(range).to_sql();
        assert_eq!(sql.clause, "start_time >= ? AND end_time <= ?");
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn filters_append_like_clauses() {
        let sql = Predicate::new(TimeRange::since(ts(8)))
            .with_name_filter(Some("fire"))
            .with_window_filter(Some("docs"))
            .to_sql();
        assert_eq!(
            sql.clause,
            "start_time >= ? AND name LIKE ? ESCAPE '\\' AND window_name LIKE ? ESCAPE '\\'"
        );
        assert_eq!(sql.params[1], Value::Text("%fire%".to_string()));
        assert_eq!(sql.params[2], Value::Text("%docs%".to_string()));
    }

    #[test]
    fn empty_filters_are_ignored() {
        let sql = Predicate::new(TimeRange::since(ts(8)))
            .with_name_filter(Some(""))
            .with_window_filter(None)
            .to_sql();
        assert_eq!(sql.clause, "start_time >= ?");
    }

    #[test]
    fn filter_text_stays_out_of_the_clause() {
        let sql = Predicate::new(TimeRange::since(ts(8)))
            .with_name_filter(Some("x' OR 1=1 --"))
            .to_sql();
        assert!(!sql.clause.contains("OR 1=1"));
        assert_eq!(sql.params[1], Value::Text("%x' OR 1=1 --%".to_string()));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("snake_case"), "%snake\\_case%");
        assert_eq!(like_pattern("C:\\dir"), "%C:\\\\dir%");
    }
}
