use crate::analyzers::BucketComparison;
use crate::error::{ProcessingError, Result};
use crate::models::{SpatialRecord, Statistic};
use crate::readers::SpatialDataset;
use crate::utils::constants::DEFAULT_ROW_GROUP_SIZE;
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            "snappy" => Compression::SNAPPY,
            "gzip" => Compression::GZIP(GzipLevel::default()),
            "lz4" => Compression::LZ4,
            "zstd" => Compression::ZSTD(parquet::basic::ZstdLevel::default()),
            "none" => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}. Use snappy, gzip, lz4, zstd, or none",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    fn properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }

    /// Write difference index curves in long format, one row per
    /// (intensity, statistic, time index)
    pub fn write_difference_curves(
        &self,
        comparisons: &[BucketComparison],
        path: &Path,
    ) -> Result<usize> {
        if comparisons.is_empty() {
            return Ok(0);
        }

        let schema = Self::curve_schema();
        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(self.properties()))?;

        // One batch per bucket keeps memory flat
        let mut rows = 0;
        for comparison in comparisons {
            let batch = Self::comparison_to_batch(comparison, schema.clone())?;
            rows += batch.num_rows();
            writer.write(&batch)?;
        }

        writer.close()?;
        Ok(rows)
    }

    /// Write every loaded city record with its year and impact category
    pub fn write_spatial_records(&self, dataset: &SpatialDataset, path: &Path) -> Result<usize> {
        if dataset.is_empty() {
            return Ok(0);
        }

        let schema = Self::spatial_schema();
        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(self.properties()))?;

        let mut rows = 0;
        for (year, records) in &dataset.years {
            if records.is_empty() {
                continue;
            }
            let batch = Self::records_to_batch(*year, records, schema.clone())?;
            rows += batch.num_rows();
            writer.write(&batch)?;
        }

        writer.close()?;
        Ok(rows)
    }

    fn curve_schema() -> Arc<Schema> {
        let fields = vec![
            Field::new("intensity", DataType::Utf8, false),
            Field::new("statistic", DataType::Utf8, false),
            Field::new("index", DataType::UInt32, false),
            Field::new("difference_index", DataType::Float64, false),
        ];

        Arc::new(Schema::new(fields))
    }

    fn spatial_schema() -> Arc<Schema> {
        let fields = vec![
            Field::new("year", DataType::UInt16, false),
            Field::new("latitude", DataType::Float64, false),
            Field::new("longitude", DataType::Float64, false),
            Field::new("difference_index", DataType::Float64, false),
            Field::new("category", DataType::Utf8, true),
        ];

        Arc::new(Schema::new(fields))
    }

    fn comparison_to_batch(
        comparison: &BucketComparison,
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let mut intensities = Vec::new();
        let mut statistics = Vec::new();
        let mut indices = Vec::new();
        let mut values = Vec::new();

        for statistic in Statistic::ALL {
            let curve = comparison.get(statistic);
            for (i, value) in curve.values().iter().enumerate() {
                intensities.push(comparison.intensity.name());
                statistics.push(statistic.file_token());
                indices.push(i as u32);
                values.push(*value);
            }
        }

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(intensities)),
                Arc::new(StringArray::from(statistics)),
                Arc::new(UInt32Array::from(indices)),
                Arc::new(Float64Array::from(values)),
            ],
        )?;

        Ok(batch)
    }

    fn records_to_batch(
        year: u16,
        records: &[SpatialRecord],
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let years: Vec<u16> = vec![year; records.len()];
        let latitudes: Vec<f64> = records.iter().map(|r| r.latitude).collect();
        let longitudes: Vec<f64> = records.iter().map(|r| r.longitude).collect();
        let values: Vec<f64> = records.iter().map(|r| r.difference_index).collect();
        let categories: Vec<Option<&str>> = records
            .iter()
            .map(|r| r.category().map(|c| c.label()))
            .collect();

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(UInt16Array::from(years)),
                Arc::new(Float64Array::from(latitudes)),
                Arc::new(Float64Array::from(longitudes)),
                Arc::new(Float64Array::from(values)),
                Arc::new(StringArray::from(categories)),
            ],
        )?;

        Ok(batch)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path).map_err(|e| ProcessingError::from_open(e, path))?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let mut row_group_sizes = Vec::new();
        for i in 0..row_groups {
            let rg_metadata = metadata.row_group(i);
            row_group_sizes.push(rg_metadata.num_rows());
        }

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} KB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1024.0,
            self.compression,
            self.total_rows as f64 / self.row_groups.max(1) as f64
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::Comparator;
    use crate::models::{CurveBand, IntensityBucket, Region, TemporalCurve};
    use crate::readers::TemporalDataset;
    use crate::utils::constants::CURVE_LENGTH;
    use tempfile::NamedTempFile;

    fn comparison() -> BucketComparison {
        let band = |v: f64| {
            CurveBand::new(
                TemporalCurve::constant(v),
                TemporalCurve::constant(v - 0.1),
                TemporalCurve::constant(v + 0.1),
            )
        };
        let mut dataset = TemporalDataset::new();
        dataset.insert(IntensityBucket::Moderate, Region::Urban, band(1.2));
        dataset.insert(IntensityBucket::Moderate, Region::Rural, band(1.0));
        Comparator::new()
            .compare(&dataset, IntensityBucket::Moderate)
            .unwrap()
    }

    #[test]
    fn test_write_empty_comparisons() {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new().unwrap();

        let rows = writer.write_difference_curves(&[], temp_file.path()).unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn test_write_difference_curves() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new().unwrap();

        let rows = writer.write_difference_curves(&[comparison()], temp_file.path())?;
        assert_eq!(rows, 3 * CURVE_LENGTH);

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, (3 * CURVE_LENGTH) as i64);
        assert!(info.file_size > 0);
        assert!(info.summary().contains("Total rows: 3000"));

        Ok(())
    }

    #[test]
    fn test_row_group_size_splits_file() -> Result<()> {
        let writer = ParquetWriter::new().with_row_group_size(1000);
        let temp_file = NamedTempFile::new().unwrap();

        writer.write_difference_curves(&[comparison()], temp_file.path())?;

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, (3 * CURVE_LENGTH) as i64);
        assert!(info.row_groups > 1);
        assert!(info.row_group_sizes.iter().all(|&rows| rows <= 1000));
        Ok(())
    }

    #[test]
    fn test_write_spatial_records() -> Result<()> {
        let mut dataset = SpatialDataset::default();
        dataset.years.insert(
            2019,
            vec![
                SpatialRecord::new(10.0, 20.0, 0.2),
                SpatialRecord::new(11.0, 21.0, f64::NAN),
            ],
        );
        dataset
            .years
            .insert(2020, vec![SpatialRecord::new(12.0, 22.0, -0.05)]);

        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new().unwrap();
        let rows = writer.write_spatial_records(&dataset, temp_file.path())?;

        assert_eq!(rows, 3);
        assert_eq!(writer.get_file_info(temp_file.path())?.total_rows, 3);
        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        let compressions = ["snappy", "gzip", "lz4", "zstd", "none"];
        let comparison = comparison();

        for compression in &compressions {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new().unwrap();

            let result = writer.write_difference_curves(&[comparison.clone()], temp_file.path());
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }

        assert!(ParquetWriter::new().with_compression("brotli9").is_err());
        Ok(())
    }

    #[test]
    fn test_missing_file_info() {
        let err = ParquetWriter::new()
            .get_file_info(Path::new("/nonexistent/curves.parquet"))
            .unwrap_err();
        assert!(err.is_missing_file());
    }
}
