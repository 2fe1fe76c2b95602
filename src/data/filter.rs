use super::model::{Column, EmployeeBracket, Record, Table};

// ---------------------------------------------------------------------------
// Filter predicate: one column test per variant
// ---------------------------------------------------------------------------

/// A single narrowing step over a [`Table`].
///
/// The two `*Contains` variants are case-insensitive substring searches; all
/// others are exact matches. A null cell never matches.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    NameContains(String),
    LegalNameContains(String),
    ActivityCode(String),
    Municipality(String),
    EmployeeBracket(EmployeeBracket),
    RegistrationYear(i32),
}

impl Predicate {
    /// The column this predicate reads.
    pub fn column(&self) -> Column {
        match self {
            Predicate::NameContains(_) => Column::Name,
            Predicate::LegalNameContains(_) => Column::LegalName,
            Predicate::ActivityCode(_) => Column::ActivityCode,
            Predicate::Municipality(_) => Column::Municipality,
            Predicate::EmployeeBracket(_) => Column::EmployeeBracket,
            Predicate::RegistrationYear(_) => Column::RegistrationYear,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::NameContains(needle) => contains_ignore_case(Some(&record.name), needle),
            Predicate::LegalNameContains(needle) => {
                contains_ignore_case(record.legal_name.as_deref(), needle)
            }
            Predicate::ActivityCode(code) => record.activity_code.as_ref() == Some(code),
            Predicate::Municipality(name) => record.municipality.as_ref() == Some(name),
            Predicate::EmployeeBracket(bracket) => record.employee_bracket == Some(*bracket),
            Predicate::RegistrationYear(year) => record.registration_year == Some(*year),
        }
    }
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

/// Return a new table with the rows of `table` that satisfy `predicate`.
///
/// Row order and load indices are preserved. When the predicate's column is
/// not part of the schema the table is returned unchanged.
pub fn filter(table: &Table, predicate: &Predicate) -> Table {
    if !table.has_column(predicate.column()) {
        log::debug!(
            "column {:?} not in schema, skipping {predicate:?}",
            predicate.column().key()
        );
        return table.clone();
    }

    let rows = table
        .rows()
        .iter()
        .filter(|row| predicate.matches(&row.record))
        .cloned()
        .collect::<Vec<_>>();

    log::debug!("{predicate:?}: {} -> {} rows", table.len(), rows.len());
    table.with_rows(rows)
}

// ---------------------------------------------------------------------------
// Dropdown options
// ---------------------------------------------------------------------------

/// Distinct non-null values, in first-seen order.
fn distinct_in_order<'a, T, I>(values: I) -> Vec<T>
where
    T: PartialEq + Clone + 'a,
    I: Iterator<Item = Option<&'a T>>,
{
    let mut seen: Vec<T> = Vec::new();
    for v in values.flatten() {
        if !seen.contains(v) {
            seen.push(v.clone());
        }
    }
    seen
}

pub fn distinct_activity_codes(table: &Table) -> Vec<String> {
    distinct_in_order(table.records().map(|r| r.activity_code.as_ref()))
}

pub fn distinct_municipalities(table: &Table) -> Vec<String> {
    distinct_in_order(table.records().map(|r| r.municipality.as_ref()))
}

/// Canonical bracket order, restricted to the brackets present in `table`.
pub fn present_employee_brackets(table: &Table) -> Vec<EmployeeBracket> {
    EmployeeBracket::ALL
        .into_iter()
        .filter(|b| table.records().any(|r| r.employee_bracket == Some(*b)))
        .collect()
}

/// Distinct registration years, newest first.
pub fn distinct_registration_years(table: &Table) -> Vec<i32> {
    let mut years = distinct_in_order(table.records().map(|r| r.registration_year.as_ref()));
    years.sort_unstable_by(|a, b| b.cmp(a));
    years
}
