use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use directorio::data::model::{Column, EmployeeBracket, Record};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

const KINDS: [(&str, &str); 6] = [
    ("ABARROTES", "461110"),
    ("FARMACIA", "464111"),
    ("PAPELERIA", "465311"),
    ("TORTILLERIA", "311830"),
    ("TALLER MECANICO", "811111"),
    ("RESTAURANTE", "722511"),
];

const SUFFIXES: [&str; 8] = [
    "LA ESTRELLA", "SAN JUAN", "EL SOL", "LUPITA", "DEL CENTRO", "LOS PINOS", "MODELO", "ROSY",
];

/// (municipality, latitude, longitude) of each town centre.
const TOWNS: [(&str, f64, f64); 4] = [
    ("Toluca", 19.2826, -99.6557),
    ("Metepec", 19.2513, -99.6047),
    ("Zinacantepec", 19.2836, -99.7339),
    ("Lerma", 19.2848, -99.5116),
];

fn generate(n: usize, rng: &mut SimpleRng) -> Vec<Record> {
    (0..n)
        .map(|i| {
            let (kind, code) = *rng.pick(&KINDS);
            let suffix = *rng.pick(&SUFFIXES);
            let (town, lat, lon) = *rng.pick(&TOWNS);
            let slug = format!("{kind}{suffix}{i}").to_lowercase().replace(' ', "");

            let mut r = Record::named(format!("{kind} {suffix}"));
            if rng.chance(0.6) {
                r.legal_name = Some(format!("{kind} {suffix} SA DE CV"));
            }
            r.activity_code = Some(code.to_string());
            r.municipality = Some(town.to_string());
            // Small businesses dominate the registry.
            let bracket_idx = ((rng.next_f64().powi(3)) * EmployeeBracket::ALL.len() as f64) as usize;
            r.employee_bracket = Some(EmployeeBracket::ALL[bracket_idx]);
            r.registration_date = Some(format!(
                "{}-{:02}",
                2010 + rng.next_u64() % 15,
                1 + rng.next_u64() % 12
            ));
            if rng.chance(0.5) {
                r.email = Some(format!("contacto@{slug}.mx"));
            }
            if rng.chance(0.3) {
                r.website = Some(if rng.chance(0.5) {
                    format!("www.{slug}.mx")
                } else {
                    format!("https://{slug}.mx")
                });
            }
            r.latitude = Some(lat + (rng.next_f64() - 0.5) * 0.05);
            r.longitude = Some(lon + (rng.next_f64() - 0.5) * 0.05);
            r
        })
        .collect()
}

fn write_json(path: &Path, records: &[Record]) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, records).context("writing JSON")?;
    Ok(())
}

fn write_parquet(path: &Path, records: &[Record]) -> Result<RecordBatch> {
    let text = |col: Column| -> ArrayRef {
        Arc::new(records.iter().map(|r| r.cell(col)).collect::<StringArray>())
    };
    let number = |f: fn(&Record) -> Option<f64>| -> ArrayRef {
        Arc::new(Float64Array::from(records.iter().map(f).collect::<Vec<_>>()))
    };

    let text_columns = [
        Column::Name,
        Column::LegalName,
        Column::ActivityCode,
        Column::Municipality,
        Column::EmployeeBracket,
        Column::RegistrationDate,
        Column::Email,
        Column::Website,
    ];

    let mut fields: Vec<Field> = text_columns
        .iter()
        .map(|c| Field::new(c.key(), DataType::Utf8, *c != Column::Name))
        .collect();
    fields.push(Field::new(Column::Latitude.key(), DataType::Float64, true));
    fields.push(Field::new(Column::Longitude.key(), DataType::Float64, true));

    let mut arrays: Vec<ArrayRef> = text_columns.iter().map(|c| text(*c)).collect();
    arrays.push(number(|r| r.latitude));
    arrays.push(number(|r| r.longitude));

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(batch)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let records = generate(200, &mut rng);

    let json_path = Path::new("sample_inegi.json");
    write_json(json_path, &records)?;

    let parquet_path = Path::new("sample_inegi.parquet");
    let batch = write_parquet(parquet_path, &records)?;

    arrow::util::pretty::print_batches(&[batch.slice(0, 5)]).context("printing preview")?;
    println!(
        "Wrote {} businesses to {} and {}",
        records.len(),
        json_path.display(),
        parquet_path.display()
    );
    Ok(())
}
