use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use sunset_precip::analyzers::{difference_curve, Comparator, SpatialAnalyzer};
use sunset_precip::cli::{export_tables, render_figure, Analysis};
use sunset_precip::models::{CurveKey, IntensityBucket, Region, Statistic, TemporalCurve};
use sunset_precip::readers::{DataLoader, NpyReader};
use sunset_precip::settings::Settings;
use sunset_precip::utils::constants::{
    CURVE_LENGTH, DI_CURVES_FILE, RUN_SUMMARY_FILE, STABILITY_FILE,
};
use sunset_precip::utils::filename::{curve_file_name, difference_file_name, year_file_name};
use sunset_precip::writers::{write_npy, ParquetWriter};
use sunset_precip::ProcessingError;
use tempfile::TempDir;

fn region_value(region: Region) -> f64 {
    match region {
        Region::Urban => 1.2,
        Region::Rural => 1.0,
        Region::Turban => 0.5,
    }
}

/// Synthetic data directory: constant curves for every key and the given years
fn write_dataset(dir: &Path, years: &[(u16, &str)]) {
    for key in CurveKey::all() {
        let values = vec![region_value(key.region); CURVE_LENGTH];
        write_npy(&values, &dir.join(curve_file_name(&key))).unwrap();
    }
    for (year, content) in years {
        fs::write(dir.join(year_file_name(*year)), content).unwrap();
    }
}

fn settings_for(dir: &Path) -> Settings {
    Settings {
        data_dir: dir.to_path_buf(),
        figures_dir: dir.join("figures"),
        ..Settings::default()
    }
}

const YEAR_2001: &str = "# lat lon di
51.5 -0.1 0.12
40.7 -74.0 -0.03
35.7 139.7 0.0
-33.9 151.2 -0.2
";
const YEAR_2002: &str = "51.5 -0.1 0.2\n40.7 -74.0 0.05\n35.7 139.7 0.01\n-33.9 151.2 -0.02\n";
const EMPTY_YEAR: &str = "# no cities this year\n";

#[test]
fn test_end_to_end_constant_difference_index() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    write_dataset(temp_dir.path(), &[(2001, YEAR_2001)]);

    let loader = DataLoader::new(temp_dir.path());
    let dataset = loader.load_temporal(&IntensityBucket::ALL, None).unwrap();
    let comparisons = Comparator::new().compare_all(&dataset).unwrap();

    assert_eq!(comparisons.len(), 3);
    for comparison in &comparisons {
        for statistic in Statistic::ALL {
            let values = comparison.get(statistic).values();
            assert_eq!(values.len(), CURVE_LENGTH);
            assert!(values.iter().all(|v| (v - 20.0).abs() < 1e-9));
        }
    }
}

#[test]
fn test_every_loaded_curve_has_full_length() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path(), &[]);

    let loader = DataLoader::new(temp_dir.path());
    for key in CurveKey::all() {
        let curve = loader
            .load_curve(key.region, key.intensity, key.statistic)
            .unwrap();
        assert_eq!(curve.len(), CURVE_LENGTH, "{}", key);
    }
}

#[test]
fn test_missing_curve_is_missing_file_error() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path(), &[]);
    let key = CurveKey::new(Region::Rural, IntensityBucket::Heavy, Statistic::Low);
    fs::remove_file(temp_dir.path().join(curve_file_name(&key))).unwrap();

    let loader = DataLoader::new(temp_dir.path());
    let err = loader
        .load_curve(Region::Rural, IntensityBucket::Heavy, Statistic::Low)
        .unwrap_err();
    match err {
        ProcessingError::MissingFile { path } => {
            assert_eq!(path.file_name().unwrap(), "rural_1_low.npy");
        }
        other => panic!("expected MissingFile, got {:?}", other),
    }

    // The other buckets still load
    assert!(loader
        .load_temporal(&[IntensityBucket::Light], None)
        .is_ok());
    assert!(loader
        .load_temporal(&[IntensityBucket::Heavy], None)
        .unwrap_err()
        .is_missing_file());
}

#[test]
fn test_zero_rural_does_not_halt_pipeline() {
    let urban = TemporalCurve::constant(2.0);
    let mut rural = vec![1.0; CURVE_LENGTH];
    rural[856] = 0.0;
    let rural = TemporalCurve::new(rural).unwrap();

    let di = difference_curve(&urban, &rural);
    assert!(di.values()[856].is_nan());
    assert_eq!(di.values()[855], 100.0);
    assert!(di.warning.is_some());
}

#[test]
fn test_percentage_positive_and_stability() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path(), &[(2001, YEAR_2001), (2002, YEAR_2002)]);

    let spatial = DataLoader::new(temp_dir.path())
        .load_all_years(None)
        .unwrap();
    assert_eq!(spatial.len(), 2);
    assert_eq!(spatial.skipped_years.len(), 18);

    let report = SpatialAnalyzer::new().stability(&spatial).unwrap();
    // 2001: 0.12 and 0.0 are non-negative; 2002: three of four
    assert_eq!(report.year(2001).unwrap().percentage_positive, 50.0);
    assert_eq!(report.year(2002).unwrap().percentage_positive, 75.0);
    assert_eq!(report.range(), 25.0);
    assert_eq!(report.global_percentage_positive, 62.5);
}

#[test]
fn test_no_years_is_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path(), &[]);

    let err = DataLoader::new(temp_dir.path())
        .load_all_years(None)
        .unwrap_err();
    assert!(err.is_missing_file());
}

#[test]
fn test_malformed_year_is_schema_error() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path(), &[(2005, "51.5 -0.1\n")]);

    let err = DataLoader::new(temp_dir.path())
        .load_all_years(None)
        .unwrap_err();
    assert!(matches!(err, ProcessingError::Schema { .. }));
}

#[test]
fn test_inventory_reports_missing_inputs() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path(), &[(2001, YEAR_2001)]);

    let report = DataLoader::new(temp_dir.path()).check_inventory();
    assert_eq!(report.entries.len(), 27 + 20);
    assert_eq!(report.ok_count(), 28);
    assert_eq!(report.missing().count(), 19);
    assert!(!report.is_complete());
}

#[test]
fn test_export_tables() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path(), &[(2001, YEAR_2001), (2002, YEAR_2002)]);
    let settings = settings_for(temp_dir.path());
    let output_dir = temp_dir.path().join("export");

    let report = export_tables(&settings, &output_dir, true).unwrap();

    assert_eq!(report.curve_rows, 3 * 3 * CURVE_LENGTH);
    assert_eq!(report.city_rows, 8);
    assert_eq!(report.stability_rows, 2);

    let info = ParquetWriter::new()
        .get_file_info(&output_dir.join(DI_CURVES_FILE))
        .unwrap();
    assert_eq!(info.total_rows, (3 * 3 * CURVE_LENGTH) as i64);

    let di_path = output_dir.join(difference_file_name(IntensityBucket::Light, Statistic::Mean));
    let di = NpyReader::new().read_curve(&di_path).unwrap();
    assert!(di.iter().all(|v| (v - 20.0).abs() < 1e-9));

    let csv = fs::read_to_string(output_dir.join(STABILITY_FILE)).unwrap();
    assert_eq!(csv.lines().count(), 3);

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output_dir.join(RUN_SUMMARY_FILE)).unwrap())
            .unwrap();
    assert_eq!(summary["buckets"].as_array().map(|b| b.len()), Some(3));
    let skipped = summary["stability"]["skipped_years"].as_array();
    assert_eq!(skipped.map(|y| y.len()), Some(18));
}

#[test]
fn test_summary_text() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path(), &[(2001, YEAR_2001)]);
    let settings = settings_for(temp_dir.path());

    let analysis = Analysis::load(&settings, &IntensityBucket::ALL, true).unwrap();
    let text = analysis.text_summary();

    assert!(text.contains("DI +20.0%"));
    assert!(text.contains("=== Temporal Stability ==="));
    assert!(analysis.run_summary(&settings).double_peak.is_some());
}

#[test]
fn test_render_requires_map_year() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path(), &[(2001, YEAR_2001)]);
    let settings = settings_for(temp_dir.path());
    let output = temp_dir.path().join("figures").join("figure.png");

    // Default map year 2020 has no table
    let err = render_figure(&settings, &output, true).unwrap_err();
    assert!(err.is_missing_file());
    assert!(!output.exists());
}

#[test]
fn test_render_rejects_unknown_format() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path(), &[(2001, YEAR_2001)]);
    let settings = Settings {
        year: 2001,
        ..settings_for(temp_dir.path())
    };
    let output = temp_dir.path().join("figure.pdf");

    let err = render_figure(&settings, &output, true).unwrap_err();
    assert!(matches!(err, ProcessingError::RenderValidation(_)));
    assert!(!output.exists());
}

#[test]
fn test_render_writes_png_and_svg() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path(), &[(2001, YEAR_2001), (2002, YEAR_2002)]);
    let settings = Settings {
        year: 2001,
        ..settings_for(temp_dir.path())
    };

    for name in ["figure.png", "figure.svg"] {
        let output = temp_dir.path().join("figures").join(name);
        let path = render_figure(&settings, &output, true).unwrap();

        assert_eq!(path, output);
        assert!(output.exists(), "{} not written", name);
        assert!(fs::metadata(&output).unwrap().len() > 0, "{} is empty", name);
    }
}

#[test]
fn test_empty_year_does_not_block_render() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path(), &[(2005, EMPTY_YEAR), (2020, YEAR_2002)]);
    let settings = settings_for(temp_dir.path());
    let output = temp_dir.path().join("figures").join("figure.svg");

    let analysis = Analysis::load(&settings, &[IntensityBucket::Light], true).unwrap();
    assert!(analysis.stability.skipped_years.contains(&2005));
    assert_eq!(analysis.stability.years.len(), 1);

    render_figure(&settings, &output, true).unwrap();
    assert!(fs::metadata(&output).unwrap().len() > 0);
}

#[test]
fn test_render_rejects_empty_map_year() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path(), &[(2005, EMPTY_YEAR), (2020, YEAR_2002)]);
    let settings = Settings {
        year: 2005,
        ..settings_for(temp_dir.path())
    };
    let output = temp_dir.path().join("figures").join("figure.png");

    let err = render_figure(&settings, &output, true).unwrap_err();
    assert!(matches!(err, ProcessingError::RenderValidation(_)));
    assert!(!output.exists());
}
