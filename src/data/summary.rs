use std::collections::HashMap;
use std::hash::Hash;

use thiserror::Error;

use super::model::{EmployeeBracket, Table};

/// Headline numbers for a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    /// Most frequent activity code; `None` when every code is null.
    pub top_activity_code: Option<String>,
    /// Most frequent employee bracket; `None` when every bracket is null.
    pub top_employee_bracket: Option<EmployeeBracket>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot summarize an empty table")]
pub struct EmptyTableError;

/// Count rows and find the modal activity code and employee bracket.
///
/// Nulls are not counted. Ties go to the value seen first in load order.
pub fn summarize(table: &Table) -> Result<Summary, EmptyTableError> {
    if table.is_empty() {
        return Err(EmptyTableError);
    }
    Ok(Summary {
        total: table.len(),
        top_activity_code: mode(table.records().filter_map(|r| r.activity_code.clone())),
        top_employee_bracket: mode(table.records().filter_map(|r| r.employee_bracket)),
    })
}

fn mode<T: Eq + Hash + Clone>(values: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: HashMap<T, usize> = HashMap::new();
    let mut first_seen: Vec<T> = Vec::new();
    for v in values {
        let n = counts.entry(v.clone()).or_insert(0);
        if *n == 0 {
            first_seen.push(v);
        }
        *n += 1;
    }

    let mut best: Option<(T, usize)> = None;
    for v in first_seen {
        let n = counts[&v];
        if best.as_ref().map_or(true, |(_, top)| n > *top) {
            best = Some((v, n));
        }
    }
    best.map(|(v, _)| v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, Record};

    fn row(code: Option<&str>, bracket: Option<EmployeeBracket>) -> Record {
        let mut r = Record::named("X");
        r.activity_code = code.map(str::to_string);
        r.employee_bracket = bracket;
        r
    }

    fn table(records: Vec<Record>) -> Table {
        Table::from_records(Column::SOURCE.to_vec(), records)
    }

    #[test]
    fn single_row_is_its_own_mode() {
        let t = table(vec![row(Some("461110"), Some(EmployeeBracket::From6To10))]);
        let s = summarize(&t).unwrap();
        assert_eq!(s.total, 1);
        assert_eq!(s.top_activity_code.as_deref(), Some("461110"));
        assert_eq!(s.top_employee_bracket, Some(EmployeeBracket::From6To10));
    }

    #[test]
    fn empty_table_is_an_error() {
        assert_eq!(summarize(&table(vec![])), Err(EmptyTableError));
    }

    #[test]
    fn most_frequent_value_wins_and_ties_go_to_first_seen() {
        let t = table(vec![
            row(Some("B"), Some(EmployeeBracket::From251)),
            row(Some("A"), Some(EmployeeBracket::UpTo5)),
            row(Some("A"), None),
            row(Some("B"), None),
            row(Some("C"), Some(EmployeeBracket::UpTo5)),
            row(Some("A"), None),
        ]);
        let s = summarize(&t).unwrap();
        assert_eq!(s.total, 6);
        assert_eq!(s.top_activity_code.as_deref(), Some("A"));
        assert_eq!(s.top_employee_bracket, Some(EmployeeBracket::UpTo5));

        let tie = table(vec![
            row(Some("B"), Some(EmployeeBracket::From251)),
            row(Some("A"), Some(EmployeeBracket::UpTo5)),
        ]);
        let s = summarize(&tie).unwrap();
        assert_eq!(s.top_activity_code.as_deref(), Some("B"));
        assert_eq!(s.top_employee_bracket, Some(EmployeeBracket::From251));
    }

    #[test]
    fn all_null_column_has_no_mode() {
        let s = summarize(&table(vec![row(None, None), row(None, None)])).unwrap();
        assert_eq!(s.total, 2);
        assert_eq!(s.top_activity_code, None);
        assert_eq!(s.top_employee_bracket, None);
    }
}
