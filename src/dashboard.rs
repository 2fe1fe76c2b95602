use crate::data::export::{self, CsvExport, ExportError};
use crate::data::filter::{self, Predicate};
use crate::data::model::{Column, EmployeeBracket, Row, Table};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Everything the user can set on the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selections {
    pub name_query: String,
    pub legal_name_query: String,
    pub activity_code: Option<String>,
    pub municipality: Option<String>,
    pub employee_bracket: Option<EmployeeBracket>,
    pub registration_year: Option<i32>,
    /// Set by the "Realizar búsqueda" button.
    pub submitted: bool,
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Options of one dropdown. The "no filter" entry is implicit and always first.
#[derive(Debug, Clone, PartialEq)]
pub struct Dropdown<T> {
    pub options: Vec<T>,
}

impl<T: Clone> Dropdown<T> {
    /// Entries as shown to the user: `None` ("no filter") then every option.
    pub fn entries(&self) -> impl Iterator<Item = Option<T>> + '_ {
        std::iter::once(None).chain(self.options.iter().cloned().map(Some))
    }
}

/// Dropdowns offered for the current table. `None` means the backing column
/// is absent and the control is not shown.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Controls {
    pub activity_codes: Option<Dropdown<String>>,
    pub municipalities: Option<Dropdown<String>>,
    pub employee_brackets: Option<Dropdown<EmployeeBracket>>,
    pub registration_years: Option<Dropdown<i32>>,
}

/// Column of the two-column card list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// One business as shown in the results list.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    /// Load-order index of the row.
    pub index: usize,
    pub name: String,
    /// Lower-cased address, `None` renders as "N/A".
    pub email: Option<String>,
    /// Map search centred on the coordinates; `None` without coordinates.
    pub maps_url: Option<String>,
    /// Website with a scheme; `None` renders a hidden placeholder.
    pub website: Option<String>,
    pub side: Side,
}

impl Card {
    pub fn from_row(row: &Row) -> Self {
        let r = &row.record;
        Card {
            index: row.index,
            name: r.name.clone(),
            email: r.email.as_ref().map(|e| e.to_lowercase()),
            maps_url: maps_url(r.latitude, r.longitude),
            website: r.website.as_deref().map(with_scheme),
            side: if row.index % 2 == 0 { Side::Left } else { Side::Right },
        }
    }

    /// Text shown for the email, `N/A` when there is none.
    pub fn email_label(&self) -> &str {
        self.email.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn mailto(&self) -> Option<String> {
        self.email.as_ref().map(|e| format!("mailto:{e}"))
    }
}

pub const NOT_AVAILABLE: &str = "N/A";

pub fn maps_url(latitude: Option<f64>, longitude: Option<f64>) -> Option<String> {
    let (lat, lon) = latitude.zip(longitude)?;
    Some(format!(
        "https://www.google.com/maps/search/?api=1&query={lat},{lon}"
    ))
}

/// Prefix `http://` unless the address already starts with `http`.
pub fn with_scheme(website: &str) -> String {
    if website.starts_with("http") {
        website.to_string()
    } else {
        format!("http://{website}")
    }
}

/// Output of a submitted search.
#[derive(Debug, Clone, PartialEq)]
pub struct Results {
    pub export: CsvExport,
    pub cards: Vec<Card>,
}

/// Everything needed to draw one frame of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub controls: Controls,
    /// Selections actually applied; stale dropdown values are reset to `None`.
    pub applied: Selections,
    pub filtered: Table,
    /// Present only when the search was submitted.
    pub results: Option<Results>,
}

// ---------------------------------------------------------------------------
// Request handler
// ---------------------------------------------------------------------------

/// Run the filter chain for `selections` over `source`.
///
/// Order: name search, legal-name search, activity code, municipality,
/// employee bracket, registration year. Each dropdown's options come from the
/// table as narrowed by the steps before it, and a selection outside those
/// options is dropped.
pub fn handle(source: &Table, selections: &Selections) -> Result<Dashboard, ExportError> {
    let mut table = source.clone();
    let mut applied = Selections {
        submitted: selections.submitted,
        ..Selections::default()
    };

    if !selections.name_query.is_empty() {
        table = filter::filter(&table, &Predicate::NameContains(selections.name_query.clone()));
        applied.name_query = selections.name_query.clone();
    }
    if !selections.legal_name_query.is_empty() {
        table = filter::filter(
            &table,
            &Predicate::LegalNameContains(selections.legal_name_query.clone()),
        );
        applied.legal_name_query = selections.legal_name_query.clone();
    }

    let mut controls = Controls::default();

    if table.has_column(Column::ActivityCode) {
        let options = filter::distinct_activity_codes(&table);
        applied.activity_code = pick(&options, &selections.activity_code);
        if let Some(code) = &applied.activity_code {
            table = filter::filter(&table, &Predicate::ActivityCode(code.clone()));
        }
        controls.activity_codes = Some(Dropdown { options });
    }

    if table.has_column(Column::Municipality) {
        let options = filter::distinct_municipalities(&table);
        applied.municipality = pick(&options, &selections.municipality);
        if let Some(name) = &applied.municipality {
            table = filter::filter(&table, &Predicate::Municipality(name.clone()));
        }
        controls.municipalities = Some(Dropdown { options });
    }

    if table.has_column(Column::EmployeeBracket) {
        let options = filter::present_employee_brackets(&table);
        applied.employee_bracket = pick(&options, &selections.employee_bracket);
        if let Some(bracket) = applied.employee_bracket {
            table = filter::filter(&table, &Predicate::EmployeeBracket(bracket));
        }
        controls.employee_brackets = Some(Dropdown { options });
    }

    if table.has_column(Column::RegistrationYear) {
        let options = filter::distinct_registration_years(&table);
        applied.registration_year = pick(&options, &selections.registration_year);
        if let Some(year) = applied.registration_year {
            table = filter::filter(&table, &Predicate::RegistrationYear(year));
        }
        controls.registration_years = Some(Dropdown { options });
    }

    let results = if selections.submitted {
        let export = export::to_csv(&table)?;
        let cards = table.rows().iter().map(Card::from_row).collect();
        log::info!("search submitted: {} of {} rows", table.len(), source.len());
        Some(Results { export, cards })
    } else {
        None
    };

    Ok(Dashboard {
        controls,
        applied,
        filtered: table,
        results,
    })
}

fn pick<T: PartialEq + Clone>(options: &[T], selected: &Option<T>) -> Option<T> {
    match selected {
        Some(v) if options.contains(v) => Some(v.clone()),
        Some(_) => {
            log::debug!("selection no longer among the options, resetting");
            None
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn business(
        name: &str,
        code: &str,
        municipality: &str,
        bracket: EmployeeBracket,
        date: &str,
    ) -> Record {
        let mut r = Record::named(name);
        r.activity_code = Some(code.into());
        r.municipality = Some(municipality.into());
        r.employee_bracket = Some(bracket);
        r.registration_date = Some(date.into());
        r
    }

    fn source() -> Table {
        let mut a = business("Abarrotes Lupita", "461110", "Toluca", EmployeeBracket::UpTo5, "2014-03");
        a.legal_name = Some("Comercial Lupita SA".into());
        a.email = Some("Ventas@Lupita.MX".into());
        a.website = Some("lupita.mx".into());
        a.latitude = Some(19.29);
        a.longitude = Some(-99.65);
        let b = business("Farmacia del Centro", "464111", "Metepec", EmployeeBracket::From6To10, "2019-11");
        let mut c = business("Abarrotes El Sol", "461110", "Metepec", EmployeeBracket::From51To100, "2014-08");
        c.website = Some("https://elsol.mx".into());
        c.latitude = Some(19.25);
        let d = business("Tortillería Rosy", "311830", "Toluca", EmployeeBracket::UpTo5, "2021-01");
        Table::from_records(Column::SOURCE.to_vec(), vec![a, b, c, d])
    }

    fn names(table: &Table) -> Vec<&str> {
        table.records().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn no_selections_keeps_everything_and_offers_all_controls() {
        let dash = handle(&source(), &Selections::default()).unwrap();
        assert_eq!(dash.filtered.len(), 4);
        assert!(dash.results.is_none());
        let controls = &dash.controls;
        assert_eq!(
            controls.activity_codes.as_ref().unwrap().options,
            vec!["461110", "464111", "311830"]
        );
        assert_eq!(
            controls.municipalities.as_ref().unwrap().options,
            vec!["Toluca", "Metepec"]
        );
        assert_eq!(
            controls.employee_brackets.as_ref().unwrap().options,
            vec![
                EmployeeBracket::UpTo5,
                EmployeeBracket::From6To10,
                EmployeeBracket::From51To100
            ]
        );
        assert_eq!(
            controls.registration_years.as_ref().unwrap().options,
            vec![2021, 2019, 2014]
        );
    }

    #[test]
    fn dropdown_entries_start_with_no_filter() {
        let dropdown = Dropdown { options: vec![2021, 2019] };
        let entries: Vec<_> = dropdown.entries().collect();
        assert_eq!(entries, vec![None, Some(2021), Some(2019)]);
    }

    #[test]
    fn filters_chain_in_order_and_narrow_later_options() {
        let selections = Selections {
            name_query: "abarrotes".into(),
            municipality: Some("Metepec".into()),
            ..Selections::default()
        };
        let dash = handle(&source(), &selections).unwrap();
        assert_eq!(names(&dash.filtered), vec!["Abarrotes El Sol"]);
        // Options are derived after the name search only.
        assert_eq!(
            dash.controls.municipalities.unwrap().options,
            vec!["Toluca", "Metepec"]
        );
        assert_eq!(dash.controls.activity_codes.unwrap().options, vec!["461110"]);
        assert_eq!(
            dash.controls.employee_brackets.unwrap().options,
            vec![EmployeeBracket::From51To100]
        );
        assert_eq!(dash.controls.registration_years.unwrap().options, vec![2014]);
    }

    #[test]
    fn legal_name_search_excludes_null_legal_names() {
        let selections = Selections {
            legal_name_query: "LUPITA".into(),
            ..Selections::default()
        };
        let dash = handle(&source(), &selections).unwrap();
        assert_eq!(names(&dash.filtered), vec!["Abarrotes Lupita"]);
    }

    #[test]
    fn stale_selection_resets_to_no_filter() {
        let selections = Selections {
            name_query: "farmacia".into(),
            activity_code: Some("461110".into()),
            registration_year: Some(2019),
            ..Selections::default()
        };
        let dash = handle(&source(), &selections).unwrap();
        assert_eq!(dash.applied.activity_code, None);
        assert_eq!(dash.applied.registration_year, Some(2019));
        assert_eq!(names(&dash.filtered), vec!["Farmacia del Centro"]);
    }

    #[test]
    fn absent_columns_hide_their_dropdowns() {
        let table = Table::from_records(
            vec![Column::Name, Column::Municipality],
            vec![Record::named("A")],
        );
        let dash = handle(&table, &Selections::default()).unwrap();
        assert!(dash.controls.activity_codes.is_none());
        assert!(dash.controls.employee_brackets.is_none());
        assert!(dash.controls.registration_years.is_none());
        assert_eq!(dash.controls.municipalities.unwrap().options, Vec::<String>::new());
    }

    #[test]
    fn submit_produces_export_and_cards() {
        let selections = Selections {
            employee_bracket: Some(EmployeeBracket::UpTo5),
            submitted: true,
            ..Selections::default()
        };
        let dash = handle(&source(), &selections).unwrap();
        let results = dash.results.unwrap();
        assert_eq!(results.export.file_name, "datos_filtrados.csv");
        assert_eq!(results.export.body.lines().count(), 3);

        let cards = &results.cards;
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].name, "Abarrotes Lupita");
        assert_eq!(cards[0].email.as_deref(), Some("ventas@lupita.mx"));
        assert_eq!(cards[0].mailto().as_deref(), Some("mailto:ventas@lupita.mx"));
        assert_eq!(
            cards[0].maps_url.as_deref(),
            Some("https://www.google.com/maps/search/?api=1&query=19.29,-99.65")
        );
        assert_eq!(cards[0].website.as_deref(), Some("http://lupita.mx"));
        assert_eq!(cards[0].side, Side::Left);

        // Row 3 of the source: side follows the load index, not the position.
        assert_eq!(cards[1].index, 3);
        assert_eq!(cards[1].side, Side::Right);
        assert_eq!(cards[1].email_label(), "N/A");
        assert_eq!(cards[1].mailto(), None);
        assert_eq!(cards[1].website, None);
        assert_eq!(cards[1].maps_url, None);
    }

    #[test]
    fn website_scheme_is_added_only_when_missing() {
        assert_eq!(with_scheme("example.com"), "http://example.com");
        assert_eq!(with_scheme("https://elsol.mx"), "https://elsol.mx");
        assert_eq!(with_scheme("http://a.mx"), "http://a.mx");
    }

    #[test]
    fn missing_coordinate_drops_the_map_link() {
        let dash = handle(
            &source(),
            &Selections {
                name_query: "El Sol".into(),
                submitted: true,
                ..Selections::default()
            },
        )
        .unwrap();
        let card = &dash.results.unwrap().cards[0];
        assert_eq!(card.maps_url, None);
        assert_eq!(card.website.as_deref(), Some("https://elsol.mx"));
    }
}
