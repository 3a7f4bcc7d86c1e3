use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::error::RangeError;
use crate::readers::ReadError;

/// A resolved table entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableCell {
    pub zenith_row: usize,
    pub water_vapor_index: usize,
    pub transmittance: f64,
}

/// Atmospheric transmittance indexed by view-zenith degree (rows) and
/// precipitable water (columns, mm).
#[derive(Debug, Clone)]
pub struct TransmittanceTable {
    labels: Vec<String>,
    water_vapor: Vec<f64>,
    // [zenith_row][water_vapor_column]
    values: Vec<f64>,
    rows: usize,
}

impl TransmittanceTable {
    /// Builds a table from column labels and one row of transmittances per
    /// zenith degree. Labels must parse as numbers and every cell must lie
    /// in (0, 1].
    pub fn new(labels: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, ReadError> {
        if labels.is_empty() {
            return Err(ReadError::Malformed(
                "transmittance table has no water vapor columns".to_string(),
            ));
        }
        if rows.is_empty() {
            return Err(ReadError::Malformed(
                "transmittance table has no view zenith rows".to_string(),
            ));
        }

        let water_vapor = labels
            .iter()
            .map(|label| {
                label
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|w| w.is_finite())
                    .ok_or_else(|| {
                        ReadError::Malformed(format!(
                            "water vapor label '{}' is not numeric",
                            label
                        ))
                    })
            })
            .collect::<Result<Vec<f64>, ReadError>>()?;

        let ncols = labels.len();
        let mut values = Vec::with_capacity(rows.len() * ncols);
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != ncols {
                return Err(ReadError::Malformed(format!(
                    "zenith row {} has {} values, expected {}",
                    row_idx,
                    row.len(),
                    ncols
                )));
            }
            for (col, &tau) in row.iter().enumerate() {
                if !(tau > 0.0 && tau <= 1.0) {
                    return Err(ReadError::Malformed(format!(
                        "transmittance {} at zenith row {}, water vapor '{}' is outside (0, 1]",
                        tau, row_idx, labels[col]
                    )));
                }
            }
            values.extend_from_slice(row);
        }

        Ok(Self {
            labels,
            water_vapor,
            values,
            rows: rows.len(),
        })
    }

    /// Parses a CSV table. The header holds the water vapor levels; each
    /// data row is one zenith degree starting at 0. A non-numeric first
    /// header cell (e.g. `VZA`) marks column 0 as the row label, which must
    /// then count up from 0.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ReadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let labelled_rows = headers
            .get(0)
            .is_some_and(|first| first.parse::<f64>().is_err());
        let skip = usize::from(labelled_rows);

        let labels: Vec<String> = headers.iter().skip(skip).map(str::to_string).collect();

        let mut rows = Vec::new();
        for (row_idx, record) in csv_reader.records().enumerate() {
            let record = record?;

            if labelled_rows {
                let label = record.get(0).unwrap_or_default();
                if label.parse::<f64>().ok() != Some(row_idx as f64) {
                    return Err(ReadError::Malformed(format!(
                        "zenith row {} is labelled '{}'",
                        row_idx, label
                    )));
                }
            }

            let row = record
                .iter()
                .skip(skip)
                .map(|cell| {
                    cell.parse::<f64>().map_err(|_| {
                        ReadError::Malformed(format!(
                            "zenith row {} holds non-numeric value '{}'",
                            row_idx, cell
                        ))
                    })
                })
                .collect::<Result<Vec<f64>, ReadError>>()?;
            rows.push(row);
        }

        Self::new(labels, rows)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ReadError> {
        let file = File::open(path.as_ref())?;
        let table = Self::from_reader(BufReader::new(file))?;
        debug!(
            path = %path.as_ref().display(),
            rows = table.rows(),
            columns = table.columns(),
            "Loaded transmittance table"
        );
        Ok(table)
    }

    /// Number of view zenith rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of water vapor columns.
    pub fn columns(&self) -> usize {
        self.water_vapor.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn water_vapor_levels(&self) -> &[f64] {
        &self.water_vapor
    }

    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        if row >= self.rows || column >= self.columns() {
            return None;
        }
        self.values.get(row * self.columns() + column).copied()
    }

    /// Index of the water vapor level closest to `water_vapor`. Ties go to
    /// the first column.
    pub fn nearest_water_vapor_index(&self, water_vapor: f64) -> usize {
        let mut nearest = 0;
        let mut nearest_distance = f64::INFINITY;

        for (idx, level) in self.water_vapor.iter().enumerate() {
            let distance = (level - water_vapor).abs();
            if distance < nearest_distance {
                nearest = idx;
                nearest_distance = distance;
            }
        }

        nearest
    }

    /// Row for a view zenith angle. The angle is truncated toward zero, so
    /// row `n` covers `[n, n + 1)` degrees.
    pub fn zenith_row(&self, zenith: f64) -> Result<usize, RangeError> {
        let row = zenith.trunc();
        if row >= 0.0 && row < self.rows as f64 {
            Ok(row as usize)
        } else {
            Err(RangeError::ZenithRow {
                zenith,
                row,
                rows: self.rows,
            })
        }
    }

    /// Resolves the table cell for a pixel: the nearest water vapor column
    /// and the zenith row containing `zenith`.
    pub fn resolve(&self, water_vapor: f64, zenith: f64) -> Result<TableCell, RangeError> {
        if !water_vapor.is_finite() {
            return Err(RangeError::WaterVapor(water_vapor));
        }
        let water_vapor_index = self.nearest_water_vapor_index(water_vapor);
        let zenith_row = self.zenith_row(zenith)?;

        Ok(TableCell {
            zenith_row,
            water_vapor_index,
            transmittance: self.values[zenith_row * self.columns() + water_vapor_index],
        })
    }

    pub fn lookup(&self, water_vapor: f64, zenith: f64) -> Result<f64, RangeError> {
        self.resolve(water_vapor, zenith).map(|cell| cell.transmittance)
    }
}

impl fmt::Display for TransmittanceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TransmittanceTable {{ zenith rows: {}, water vapor levels (mm): {:?} }}",
            self.rows, self.water_vapor
        )
    }
}
