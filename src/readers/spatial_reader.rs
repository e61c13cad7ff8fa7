use crate::error::{ProcessingError, Result};
use crate::models::SpatialRecord;
use crate::utils::constants::SPATIAL_COLUMNS;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use validator::Validate;

/// Reads `spa_{year}.txt` tables: whitespace-separated latitude, longitude, difference index
pub struct SpatialReader {
    validate_coordinates: bool,
}

impl SpatialReader {
    pub fn new() -> Self {
        Self {
            validate_coordinates: true,
        }
    }

    pub fn with_coordinate_validation(validate_coordinates: bool) -> Self {
        Self {
            validate_coordinates,
        }
    }

    pub fn read_records(&self, path: &Path) -> Result<Vec<SpatialRecord>> {
        let file = File::open(path).map_err(|e| ProcessingError::from_open(e, path))?;
        let reader = BufReader::new(file);
        let origin = path.display().to_string();
        let mut records = Vec::new();

        for (index, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let content = line.split('#').next().unwrap_or("").trim();

            if content.is_empty() {
                continue;
            }

            let record = self.parse_line(content, &origin, index + 1)?;
            if self.validate_coordinates {
                record.validate()?;
            }
            records.push(record);
        }

        Ok(records)
    }

    /// Parse a single data row
    fn parse_line(&self, line: &str, origin: &str, line_number: usize) -> Result<SpatialRecord> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.len() != SPATIAL_COLUMNS {
            return Err(ProcessingError::schema(
                origin,
                format!(
                    "line {}: expected {} columns, got {}",
                    line_number,
                    SPATIAL_COLUMNS,
                    parts.len()
                ),
            ));
        }

        let mut values = [0.0f64; SPATIAL_COLUMNS];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse::<f64>().map_err(|_| {
                ProcessingError::schema(
                    origin,
                    format!("line {}: invalid number '{}'", line_number, part),
                )
            })?;
        }

        Ok(SpatialRecord::new(values[0], values[1], values[2]))
    }
}

impl Default for SpatialReader {
    fn default() -> Self {
        Self::new()
    }
}
