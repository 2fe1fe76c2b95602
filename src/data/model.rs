use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EmployeeBracket – the fixed "estrato personal ocupado" domain
// ---------------------------------------------------------------------------

/// Headcount bracket of a business, in canonical (ascending) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EmployeeBracket {
    #[serde(rename = "0 a 5 personas")]
    UpTo5,
    #[serde(rename = "6 a 10 personas")]
    From6To10,
    #[serde(rename = "11 a 30 personas")]
    From11To30,
    #[serde(rename = "31 a 50 personas")]
    From31To50,
    #[serde(rename = "51 a 100 personas")]
    From51To100,
    #[serde(rename = "101 a 250 personas")]
    From101To250,
    #[serde(rename = "251 y más personas")]
    From251,
}

impl EmployeeBracket {
    /// Every bracket, in canonical order.
    pub const ALL: [EmployeeBracket; 7] = [
        EmployeeBracket::UpTo5,
        EmployeeBracket::From6To10,
        EmployeeBracket::From11To30,
        EmployeeBracket::From31To50,
        EmployeeBracket::From51To100,
        EmployeeBracket::From101To250,
        EmployeeBracket::From251,
    ];

    /// The label used by the registry.
    pub fn label(self) -> &'static str {
        match self {
            EmployeeBracket::UpTo5 => "0 a 5 personas",
            EmployeeBracket::From6To10 => "6 a 10 personas",
            EmployeeBracket::From11To30 => "11 a 30 personas",
            EmployeeBracket::From31To50 => "31 a 50 personas",
            EmployeeBracket::From51To100 => "51 a 100 personas",
            EmployeeBracket::From101To250 => "101 a 250 personas",
            EmployeeBracket::From251 => "251 y más personas",
        }
    }
}

impl fmt::Display for EmployeeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown employee bracket: {0:?}")]
pub struct UnknownBracket(pub String);

impl FromStr for EmployeeBracket {
    type Err = UnknownBracket;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        EmployeeBracket::ALL
            .into_iter()
            .find(|b| b.label() == s)
            .ok_or_else(|| UnknownBracket(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Column – the schema, addressed by enum rather than by string key
// ---------------------------------------------------------------------------

/// A column of the registry table. `RegistrationYear` is derived at load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Name,
    LegalName,
    ActivityCode,
    Municipality,
    EmployeeBracket,
    RegistrationDate,
    Email,
    Website,
    Latitude,
    Longitude,
    RegistrationYear,
}

impl Column {
    /// Columns that can come from a source file.
    pub const SOURCE: [Column; 10] = [
        Column::Name,
        Column::LegalName,
        Column::ActivityCode,
        Column::Municipality,
        Column::EmployeeBracket,
        Column::RegistrationDate,
        Column::Email,
        Column::Website,
        Column::Latitude,
        Column::Longitude,
    ];

    /// Key of the column in source files and in CSV exports.
    pub fn key(self) -> &'static str {
        match self {
            Column::Name => "Nombre de la Unidad Económica",
            Column::LegalName => "Razón social",
            Column::ActivityCode => "Código de la clase de actividad SCIAN",
            Column::Municipality => "Municipio",
            Column::EmployeeBracket => "Descripcion estrato personal ocupado",
            Column::RegistrationDate => "Fecha de incorporación al DENUE",
            Column::Email => "Correo electrónico",
            Column::Website => "Sitio en Internet",
            Column::Latitude => "Latitud",
            Column::Longitude => "Longitud",
            Column::RegistrationYear => "Año de incorporación",
        }
    }

    /// Look up a source column by its key. The derived column is never matched.
    pub fn from_key(key: &str) -> Option<Column> {
        Column::SOURCE.into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Record – one business entity
// ---------------------------------------------------------------------------

/// One row of the registry. Only `name` is mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Nombre de la Unidad Económica", deserialize_with = "lenient::text")]
    pub name: String,

    #[serde(rename = "Razón social", default, deserialize_with = "lenient::opt_text")]
    pub legal_name: Option<String>,

    #[serde(
        rename = "Código de la clase de actividad SCIAN",
        default,
        deserialize_with = "lenient::opt_text"
    )]
    pub activity_code: Option<String>,

    #[serde(rename = "Municipio", default, deserialize_with = "lenient::opt_text")]
    pub municipality: Option<String>,

    #[serde(
        rename = "Descripcion estrato personal ocupado",
        default,
        deserialize_with = "lenient::opt_bracket"
    )]
    pub employee_bracket: Option<EmployeeBracket>,

    #[serde(
        rename = "Fecha de incorporación al DENUE",
        default,
        deserialize_with = "lenient::opt_text"
    )]
    pub registration_date: Option<String>,

    #[serde(rename = "Correo electrónico", default, deserialize_with = "lenient::opt_text")]
    pub email: Option<String>,

    #[serde(rename = "Sitio en Internet", default, deserialize_with = "lenient::opt_text")]
    pub website: Option<String>,

    #[serde(rename = "Latitud", default, deserialize_with = "lenient::opt_f64")]
    pub latitude: Option<f64>,

    #[serde(rename = "Longitud", default, deserialize_with = "lenient::opt_f64")]
    pub longitude: Option<f64>,

    /// Derived from `registration_date` when the table is built.
    #[serde(skip)]
    pub registration_year: Option<i32>,
}

impl Record {
    /// A record with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Record {
            name: name.into(),
            legal_name: None,
            activity_code: None,
            municipality: None,
            employee_bracket: None,
            registration_date: None,
            email: None,
            website: None,
            latitude: None,
            longitude: None,
            registration_year: None,
        }
    }

    /// Text rendering of one cell; `None` for null.
    pub fn cell(&self, column: Column) -> Option<String> {
        match column {
            Column::Name => Some(self.name.clone()),
            Column::LegalName => self.legal_name.clone(),
            Column::ActivityCode => self.activity_code.clone(),
            Column::Municipality => self.municipality.clone(),
            Column::EmployeeBracket => self.employee_bracket.map(|b| b.label().to_string()),
            Column::RegistrationDate => self.registration_date.clone(),
            Column::Email => self.email.clone(),
            Column::Website => self.website.clone(),
            Column::Latitude => self.latitude.map(|v| v.to_string()),
            Column::Longitude => self.longitude.map(|v| v.to_string()),
            Column::RegistrationYear => self.registration_year.map(|y| y.to_string()),
        }
    }
}

/// Extract the calendar year from the registry's date encodings.
///
/// Accepts RFC 3339, `YYYY-MM-DD[ HH:MM:SS]`, `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY/MM/DD`, `DD/MM/YYYY`, `YYYY-MM`, a bare `YYYY`, and integer epoch
/// milliseconds (how pandas writes datetimes to JSON).
pub fn parse_year(raw: &str) -> Option<i32> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.year());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.year());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.year());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return Some(d.year());
    }
    if s.len() == 4 {
        return s.parse().ok();
    }
    let millis: i64 = s.parse().ok()?;
    DateTime::from_timestamp_millis(millis).map(|dt| dt.year())
}

// ---------------------------------------------------------------------------
// Table – the loaded dataset
// ---------------------------------------------------------------------------

/// A record together with its position in the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Load-order index; kept through filtering.
    pub index: usize,
    pub record: Record,
}

/// Ordered rows sharing one column schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table from freshly loaded records.
    ///
    /// `columns` are the source columns present in the file. When the
    /// registration date is among them, every record gets its year derived
    /// and `RegistrationYear` is appended to the schema.
    pub fn from_records(mut columns: Vec<Column>, records: Vec<Record>) -> Self {
        columns.retain(|c| *c != Column::RegistrationYear);
        let derive_year = columns.contains(&Column::RegistrationDate);

        let rows = records
            .into_iter()
            .enumerate()
            .map(|(index, mut record)| {
                record.registration_year = None;
                if derive_year {
                    if let Some(raw) = &record.registration_date {
                        record.registration_year = parse_year(raw);
                        if record.registration_year.is_none() {
                            log::warn!("Row {index}: unparseable registration date {raw:?}");
                        }
                    }
                }
                Row { index, record }
            })
            .collect();

        if derive_year {
            columns.push(Column::RegistrationYear);
        }
        Table { columns, rows }
    }

    /// A table with the same schema holding only `rows`.
    pub(crate) fn with_rows(&self, rows: Vec<Row>) -> Self {
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> + '_ {
        self.rows.iter().map(|r| &r.record)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Lenient field decoding shared by the JSON, CSV and Parquet paths
// ---------------------------------------------------------------------------

mod lenient {
    use std::fmt;

    use serde::de::{self, Deserializer, Visitor};

    use super::EmployeeBracket;

    /// Accepts strings, numbers, booleans and null; blank strings become null.
    struct TextVisitor;

    impl<'de> Visitor<'de> for TextVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string, a number or null")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let v = v.trim();
            Ok((!v.is_empty()).then(|| v.to_string()))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            // pandas turns integer columns with gaps into floats.
            Ok((!v.is_nan()).then(|| v.to_string()))
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(TextVisitor)
        }
    }

    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        d.deserialize_any(TextVisitor)
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        opt_text(d)?.ok_or_else(|| de::Error::custom("business name is missing"))
    }

    pub fn opt_bracket<'de, D: Deserializer<'de>>(d: D) -> Result<Option<EmployeeBracket>, D::Error> {
        opt_text(d)?
            .map(|s| s.parse().map_err(de::Error::custom))
            .transpose()
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        match opt_text(d)? {
            None => Ok(None),
            Some(s) => s
                .parse::<f64>()
                .map(|v| (!v.is_nan()).then_some(v))
                .map_err(|_| de::Error::custom(format!("{s:?} is not a coordinate"))),
        }
    }
}
