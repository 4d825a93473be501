// Country records and the tabular dataset reader

use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Column prefix for per-year anomaly columns, e.g. `F1962`.
pub const YEAR_COLUMN_PREFIX: &str = "F";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataset is missing the `{0}` column")]
    MissingColumn(&'static str),
    #[error("row {row}: `{value}` is not a valid {field}")]
    InvalidCoordinate {
        row: usize,
        field: &'static str,
        value: String,
    },
    #[error("row {row}: expected at least {expected} fields, found {found}")]
    Malformed {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// One country with its anomaly per year. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRecord {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Unparseable cells are kept as NaN.
    pub temperature_by_year: BTreeMap<i32, f32>,
}

impl CountryRecord {
    /// Anomaly in °C, NaN when the year is absent or had no reading.
    pub fn temperature(&self, year: i32) -> f32 {
        self.temperature_by_year
            .get(&year)
            .copied()
            .unwrap_or(f32::NAN)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<CountryRecord>,
}

impl Dataset {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse comma-separated text with a header row naming `name`,
    /// `latitude`, `longitude` and any number of `F<year>` columns.
    ///
    /// Rows may be shorter than the header: absent year cells read as NaN.
    /// A row is malformed only when it stops before a required column.
    pub fn parse(content: &str) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let header = reader.headers()?.clone();
        if header.iter().all(str::is_empty) {
            return Ok(Self::default());
        }

        let column = |name: &'static str| {
            header
                .iter()
                .position(|field| field.eq_ignore_ascii_case(name))
                .ok_or(DatasetError::MissingColumn(name))
        };
        let name_idx = column("name")?;
        let lat_idx = column("latitude")?;
        let lng_idx = column("longitude")?;
        let required = name_idx.max(lat_idx).max(lng_idx) + 1;

        let year_columns: Vec<(usize, i32)> = header
            .iter()
            .enumerate()
            .filter_map(|(idx, field)| {
                field
                    .strip_prefix(YEAR_COLUMN_PREFIX)
                    .and_then(|year| year.parse().ok())
                    .map(|year| (idx, year))
            })
            .collect();

        let mut records = Vec::new();
        for (offset, fields) in reader.records().enumerate() {
            let fields = fields?;
            // 1-based line, counting the header
            let row = fields
                .position()
                .map_or(offset + 2, |position| position.line() as usize);
            if fields.len() < required {
                return Err(DatasetError::Malformed {
                    row,
                    expected: required,
                    found: fields.len(),
                });
            }

            let latitude = parse_coordinate(&fields[lat_idx], row, "latitude", 90.0)?;
            let longitude = parse_coordinate(&fields[lng_idx], row, "longitude", 180.0)?;

            let temperature_by_year = year_columns
                .iter()
                .map(|&(idx, year)| {
                    let temperature = fields
                        .get(idx)
                        .and_then(|cell| cell.parse().ok())
                        .unwrap_or(f32::NAN);
                    (year, temperature)
                })
                .collect();

            records.push(CountryRecord {
                name: fields[name_idx].to_string(),
                latitude,
                longitude,
                temperature_by_year,
            });
        }

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest year that appear as a column.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let years = self
            .records
            .iter()
            .flat_map(|record| record.temperature_by_year.keys().copied());
        years.fold(None, |span, year| match span {
            None => Some((year, year)),
            Some((lo, hi)) => Some((lo.min(year), hi.max(year))),
        })
    }

    /// Mean anomaly over every country with a reading for `year`.
    pub fn average_for_year(&self, year: i32) -> Option<f32> {
        let (total, count) = self
            .records
            .iter()
            .map(|record| record.temperature(year))
            .filter(|temperature| !temperature.is_nan())
            .fold((0.0_f64, 0_u32), |(total, count), temperature| {
                (total + f64::from(temperature), count + 1)
            });

        (count > 0).then(|| (total / f64::from(count)) as f32)
    }
}

fn parse_coordinate(
    raw: &str,
    row: usize,
    field: &'static str,
    limit: f64,
) -> Result<f64, DatasetError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.abs() <= limit)
        .ok_or_else(|| DatasetError::InvalidCoordinate {
            row,
            field,
            value: raw.to_string(),
        })
}
