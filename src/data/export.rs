use thiserror::Error;

use super::model::Table;

/// File name offered for the CSV download.
pub const CSV_FILE_NAME: &str = "datos_filtrados.csv";
pub const CSV_MIME: &str = "text/csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// A downloadable CSV payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: &'static str,
    pub mime: &'static str,
    pub body: String,
}

/// Encode `table` as CSV: header row of column keys, one line per row,
/// nulls as empty fields.
pub fn to_csv(table: &Table) -> Result<CsvExport, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns().iter().map(|c| c.key()))?;

    for record in table.records() {
        writer.write_record(
            table
                .columns()
                .iter()
                .map(|c| record.cell(*c).unwrap_or_default()),
        )?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let body = String::from_utf8(bytes)?;
    log::debug!("exported {} rows ({} bytes)", table.len(), body.len());

    Ok(CsvExport {
        file_name: CSV_FILE_NAME,
        mime: CSV_MIME,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, EmployeeBracket, Record};

    fn sample() -> Table {
        let mut a = Record::named("TALLER \"EL RAYO\"");
        a.municipality = Some("Toluca".into());
        a.latitude = Some(19.28);
        a.employee_bracket = Some(EmployeeBracket::From251);
        a.registration_date = Some("2012-03".into());
        let mut b = Record::named("Café, Pan y Más");
        b.email = Some("hola@cafe.mx".into());
        Table::from_records(
            vec![
                Column::Name,
                Column::Municipality,
                Column::EmployeeBracket,
                Column::RegistrationDate,
                Column::Email,
                Column::Latitude,
            ],
            vec![a, b],
        )
    }

    #[test]
    fn header_and_nulls() {
        let export = to_csv(&sample()).unwrap();
        assert_eq!(export.file_name, "datos_filtrados.csv");
        assert_eq!(export.mime, "text/csv");
        let mut lines = export.body.lines();
        assert_eq!(
            lines.next(),
            Some(
                "Nombre de la Unidad Económica,Municipio,Descripcion estrato personal ocupado,\
                 Fecha de incorporación al DENUE,Correo electrónico,Latitud,Año de incorporación"
            )
        );
        assert_eq!(
            lines.next(),
            Some("\"TALLER \"\"EL RAYO\"\"\",Toluca,251 y más personas,2012-03,,19.28,2012")
        );
        assert_eq!(lines.next(), Some("\"Café, Pan y Más\",,,,hola@cafe.mx,,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn reparsed_export_keeps_rows_and_columns() {
        let table = sample();
        let export = to_csv(&table).unwrap();
        let mut reader = csv::Reader::from_reader(export.body.as_bytes());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        let expected: Vec<String> = table.columns().iter().map(|c| c.key().to_string()).collect();
        assert_eq!(headers, expected);
        assert_eq!(reader.records().count(), table.len());
    }

    #[test]
    fn empty_table_exports_only_the_header() {
        let table = Table::from_records(vec![Column::Name], vec![]);
        let export = to_csv(&table).unwrap();
        assert_eq!(export.body, "Nombre de la Unidad Económica\n");
    }
}
