use crate::analyzers::{DoublePeak, StabilityReport};
use crate::error::{ProcessingError, Result};
use crate::models::{
    AxisLimits, CurveBand, ImpactCategory, IntensityBucket, PanelKind, SpatialRecord,
    TemporalCurve,
};
use crate::utils::constants::{
    CURVE_LENGTH, DEFAULT_FIGURE_HEIGHT, DEFAULT_FIGURE_WIDTH, FIRST_YEAR, LAST_YEAR, MIDDAY_INDEX,
    SUNSET_INDEX,
};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use tracing::info;

// Colour scheme
const URBAN: RGBColor = RGBColor(0xD3, 0x2F, 0x2F);
const RURAL: RGBColor = RGBColor(0xB8, 0x86, 0x0B);
const URBAN_ONLY: RGBColor = RGBColor(0x2E, 0x8B, 0x57);
const STRONG_NEGATIVE: RGBColor = RGBColor(255, 120, 130);
const WEAK_NEGATIVE: RGBColor = RGBColor(255, 179, 186);
const WEAK_POSITIVE: RGBColor = RGBColor(180, 210, 100);
const STRONG_POSITIVE: RGBColor = RGBColor(120, 200, 150);
const STABILITY_PERCENT: RGBColor = RGBColor(0xFF, 0x6B, 0x35);
const STABILITY_CITIES: RGBColor = RGBColor(0x4A, 0x90, 0xE2);

const MAP_LON: (f64, f64) = (-180.0, 180.0);
const MAP_LAT: (f64, f64) = (-60.0, 75.0);

type DrawResult<T, DB> =
    std::result::Result<T, DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

fn category_color(category: ImpactCategory) -> RGBColor {
    match category {
        ImpactCategory::StrongNegative => STRONG_NEGATIVE,
        ImpactCategory::WeakNegative => WEAK_NEGATIVE,
        ImpactCategory::WeakPositive => WEAK_POSITIVE,
        ImpactCategory::StrongPositive => STRONG_POSITIVE,
    }
}

/// Everything the composite figure draws
#[derive(Debug, Clone, Copy)]
pub struct FigureInput<'a> {
    pub year: u16,
    pub records: &'a [SpatialRecord],
    pub stability: &'a StabilityReport,
    pub intensity: IntensityBucket,
    pub urban: &'a CurveBand,
    pub rural: &'a CurveBand,
    pub turban: &'a CurveBand,
    pub double_peak: Option<DoublePeak>,
}

impl FigureInput<'_> {
    /// Reject inputs that would produce an empty or misleading plot
    pub fn validate(&self) -> Result<()> {
        if self.records.is_empty() {
            return Err(ProcessingError::RenderValidation(format!(
                "no city records for {}",
                self.year
            )));
        }
        if !self
            .records
            .iter()
            .any(|r| r.difference_index.is_finite())
        {
            return Err(ProcessingError::RenderValidation(format!(
                "every difference index for {} is undefined",
                self.year
            )));
        }
        if self.stability.years.is_empty() {
            return Err(ProcessingError::RenderValidation(
                "temporal stability series is empty".to_string(),
            ));
        }

        for (name, band) in [
            ("urban", self.urban),
            ("rural", self.rural),
            ("urban-only", self.turban),
        ] {
            for (stat, curve) in [("mean", &band.mean), ("low", &band.low), ("high", &band.high)] {
                if curve.len() != CURVE_LENGTH {
                    return Err(ProcessingError::RenderValidation(format!(
                        "{} {} curve has {} points, expected {}",
                        name,
                        stat,
                        curve.len(),
                        CURVE_LENGTH
                    )));
                }
            }
            if band.finite_range().is_none() {
                return Err(ProcessingError::RenderValidation(format!(
                    "{} curves hold no finite values",
                    name
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("png") => Ok(ImageFormat::Png),
            Some("svg") => Ok(ImageFormat::Svg),
            other => Err(ProcessingError::RenderValidation(format!(
                "unsupported figure format {:?} for {}; use .png or .svg",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }
}

/// Font sizes scaled to the canvas height
#[derive(Debug, Clone, Copy)]
struct FigureStyle {
    panel_label: f64,
    title: f64,
    axis: f64,
    tick: f64,
    legend: f64,
    inset: f64,
    line_width: u32,
    marker: i32,
    map_marker: i32,
}

impl FigureStyle {
    fn for_height(height: u32) -> Self {
        let unit = (height as f64 / 827.0).max(0.3);
        Self {
            panel_label: 50.0 * unit,
            title: 40.0 * unit,
            axis: 36.0 * unit,
            tick: 32.0 * unit,
            legend: 30.0 * unit,
            inset: 22.0 * unit,
            line_width: (4.0 * unit).round().max(1.0) as u32,
            marker: (10.0 * unit).round().max(2.0) as i32,
            map_marker: (7.0 * unit).round().max(3.0) as i32,
        }
    }

    fn font(size: f64) -> FontDesc<'static> {
        FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal)
    }

    fn bold(size: f64) -> FontDesc<'static> {
        FontDesc::new(FontFamily::SansSerif, size, FontStyle::Bold)
    }
}

pub struct FigureRenderer {
    width: u32,
    height: u32,
}

impl FigureRenderer {
    pub fn new() -> Self {
        Self {
            width: DEFAULT_FIGURE_WIDTH,
            height: DEFAULT_FIGURE_HEIGHT,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Validate, render and save the three-panel figure. Returns the written path.
    pub fn render(&self, input: &FigureInput<'_>, path: &Path) -> Result<PathBuf> {
        input.validate()?;
        let format = ImageFormat::from_path(path)?;
        if self.width < 300 || self.height < 150 {
            return Err(ProcessingError::RenderValidation(format!(
                "figure size {}x{} is too small",
                self.width, self.height
            )));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let style = FigureStyle::for_height(self.height);
        let size = (self.width, self.height);
        match format {
            ImageFormat::Png => {
                let root = BitMapBackend::new(path, size).into_drawing_area();
                draw_composite(&root, input, &style)
                    .map_err(|e| ProcessingError::Render(e.to_string()))?;
            }
            ImageFormat::Svg => {
                let root = SVGBackend::new(path, size).into_drawing_area();
                draw_composite(&root, input, &style)
                    .map_err(|e| ProcessingError::Render(e.to_string()))?;
            }
        }

        info!("Figure written to {}", path.display());
        Ok(path.to_path_buf())
    }
}

impl Default for FigureRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_composite<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    input: &FigureInput<'_>,
    style: &FigureStyle,
) -> DrawResult<(), DB> {
    root.fill(&WHITE)?;

    // Width ratios 4:3:3
    let (width, _) = root.dim_in_pixel();
    let map_width = (width * 4 / 10) as i32;
    let (map_area, rest) = root.split_horizontally(map_width);
    let (rest_width, _) = rest.dim_in_pixel();
    let (urban_rural_area, urban_only_area) = rest.split_horizontally((rest_width / 2) as i32);

    draw_map_panel(&map_area, input, style)?;
    draw_stability_inset(&map_area, input.stability, style)?;

    let intensity = input.intensity;
    draw_temporal_panel(
        &urban_rural_area,
        &intensity.title(),
        &[(input.urban, URBAN, "Urban"), (input.rural, RURAL, "Rural")],
        intensity.axis_limits(PanelKind::UrbanRural),
        &[],
        style,
    )?;

    let peak_markers: Vec<(usize, f64)> = input
        .double_peak
        .map(|p| vec![(p.midday_index, p.midday_value), (p.sunset_index, p.sunset_value)])
        .unwrap_or_default();
    draw_temporal_panel(
        &urban_only_area,
        "Urban-Specific Events",
        &[(input.turban, URBAN_ONLY, "Urban Only")],
        intensity.axis_limits(PanelKind::UrbanOnly),
        &peak_markers,
        style,
    )?;

    let label_style = TextStyle::from(FigureStyle::bold(style.panel_label));
    for (area, label) in [
        (&map_area, "a"),
        (&urban_rural_area, "b"),
        (&urban_only_area, "c"),
    ] {
        area.draw_text(label, &label_style, (8, 4))?;
    }

    root.present()?;
    Ok(())
}

fn draw_map_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    input: &FigureInput<'_>,
    style: &FigureStyle,
) -> DrawResult<(), DB> {
    let mut chart = ChartBuilder::on(area)
        .caption(
            format!("Global Distribution ({})", input.year),
            FigureStyle::font(style.title),
        )
        .margin(10)
        .x_label_area_size((style.tick * 1.6) as i32)
        .y_label_area_size((style.tick * 2.4) as i32)
        .build_cartesian_2d(MAP_LON.0..MAP_LON.1, MAP_LAT.0..MAP_LAT.1)?;

    chart
        .configure_mesh()
        .x_labels(5)
        .y_labels(5)
        .x_label_formatter(&|x| format!("{:.0}°", x))
        .y_label_formatter(&|y| format!("{:.0}°", y))
        .label_style(FigureStyle::font(style.tick))
        .light_line_style(BLACK.mix(0.05))
        .draw()?;

    // Ascending order so the strongest signals end up on top
    let mut sorted: Vec<&SpatialRecord> = input
        .records
        .iter()
        .filter(|r| r.difference_index.is_finite())
        .collect();
    sorted.sort_by(|a, b| a.difference_index.total_cmp(&b.difference_index));

    let radius = style.map_marker;
    chart.draw_series(sorted.iter().filter_map(|r| {
        r.category().map(|c| {
            Circle::new(
                (r.longitude, r.latitude),
                radius,
                category_color(c).mix(0.8).filled(),
            )
        })
    }))?;

    chart
        .draw_series(std::iter::empty::<Circle<(f64, f64), i32>>())?
        .label("Urban Impact");
    let swatch = (style.legend * 0.4) as i32;
    for category in ImpactCategory::ALL {
        let color = category_color(category);
        chart
            .draw_series(std::iter::empty::<Circle<(f64, f64), i32>>())?
            .label(category.label())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - swatch), (x + 2 * swatch, y + swatch)], color.filled())
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK.mix(0.3))
        .label_font(FigureStyle::font(style.legend))
        .draw()?;

    Ok(())
}

/// Dual-axis inset in the upper right of the map panel
fn draw_stability_inset<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    stability: &StabilityReport,
    style: &FigureStyle,
) -> DrawResult<(), DB> {
    let (width, height) = area.dim_in_pixel();
    let inset = area.clone().shrink(
        ((width as f64 * 0.56) as i32, (height as f64 * 0.12) as i32),
        ((width as f64 * 0.42) as i32, (height as f64 * 0.36) as i32),
    );
    inset.fill(&WHITE.mix(0.95))?;

    let percentages: Vec<(f64, f64)> = stability
        .years
        .iter()
        .map(|y| (y.year as f64, y.percentage_positive))
        .collect();
    let cities: Vec<(f64, f64)> = stability
        .years
        .iter()
        .map(|y| (y.year as f64, y.n_cities as f64))
        .collect();

    let (pct_lo, pct_hi) = padded_range(percentages.iter().map(|p| p.1), 2.0);
    let (city_lo, city_hi) = count_range(cities.iter().map(|c| c.1));
    let years = (FIRST_YEAR as f64 - 1.0)..(LAST_YEAR as f64 + 1.0);

    let mut chart = ChartBuilder::on(&inset)
        .margin(4)
        .x_label_area_size((style.inset * 1.4) as i32)
        .y_label_area_size((style.inset * 3.0) as i32)
        .right_y_label_area_size((style.inset * 3.0) as i32)
        .build_cartesian_2d(years.clone(), pct_lo..pct_hi)?
        .set_secondary_coord(years, city_lo..city_hi);

    chart
        .configure_mesh()
        .x_labels(3)
        .y_labels(4)
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&|y| format!("{:.0}%", y))
        .y_desc("Positive DI %")
        .label_style(FigureStyle::font(style.inset).color(&STABILITY_PERCENT))
        .axis_desc_style(FigureStyle::font(style.inset))
        .light_line_style(BLACK.mix(0.08))
        .draw()?;

    chart
        .configure_secondary_axes()
        .y_labels(4)
        .y_label_formatter(&|y| format!("{:.0}", y))
        .y_desc("Number of Cities")
        .label_style(FigureStyle::font(style.inset).color(&STABILITY_CITIES))
        .axis_desc_style(FigureStyle::font(style.inset))
        .draw()?;

    let dot = (style.marker / 4).max(1);
    chart.draw_series(LineSeries::new(
        percentages.clone(),
        STABILITY_PERCENT.stroke_width(2),
    ))?;
    chart.draw_series(
        percentages
            .iter()
            .map(|p| Circle::new(*p, dot, STABILITY_PERCENT.filled())),
    )?;
    chart.draw_secondary_series(LineSeries::new(
        cities.clone(),
        STABILITY_CITIES.stroke_width(2),
    ))?;
    chart.draw_secondary_series(
        cities
            .iter()
            .map(|c| Circle::new(*c, dot, STABILITY_CITIES.filled())),
    )?;

    let mean = stability.mean_percentage;
    chart.draw_series(dashed_horizontal(
        FIRST_YEAR as f64 - 1.0,
        LAST_YEAR as f64 + 1.0,
        mean,
        40,
        BLACK.mix(0.7).stroke_width(1),
    ))?;
    chart.draw_series(std::iter::once(Text::new(
        format!("{:.1}%", mean),
        (FIRST_YEAR as f64 + 1.0, mean + (pct_hi - pct_lo) * 0.04),
        FigureStyle::bold(style.inset),
    )))?;

    Ok(())
}

fn draw_temporal_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    bands: &[(&CurveBand, RGBColor, &str)],
    limits: AxisLimits,
    markers: &[(usize, f64)],
    style: &FigureStyle,
) -> DrawResult<(), DB> {
    // Fixed limits, widened if the data leaves them
    let (y_lo, y_hi) = bands
        .iter()
        .filter_map(|(band, _, _)| band.finite_range())
        .fold((limits.min, limits.max), |(lo, hi), (b_lo, b_hi)| {
            (lo.min(b_lo), hi.max(b_hi))
        });
    let x_max = (CURVE_LENGTH - 1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(title, FigureStyle::font(style.title))
        .margin(10)
        .x_label_area_size((style.tick * 1.8) as i32)
        .y_label_area_size((style.tick * 3.2) as i32)
        .build_cartesian_2d(0.0..x_max, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_label_formatter(&|_| String::new())
        .y_labels(0)
        .y_desc("Count of wet hour")
        .label_style(FigureStyle::font(style.tick))
        .axis_desc_style(FigureStyle::font(style.axis))
        .draw()?;

    // Tick labels at the bucket's fixed positions
    let ticks = visible_ticks(&limits, y_lo, y_hi);
    chart.draw_series(
        ticks
            .iter()
            .map(|&y| PathElement::new(vec![(0.0, y), (x_max, y)], BLACK.mix(0.05))),
    )?;
    let base = area.get_base_pixel();
    let tick_style =
        TextStyle::from(FigureStyle::font(style.tick)).pos(Pos::new(HPos::Right, VPos::Center));
    for &y in &ticks {
        let (px, py) = chart.backend_coord(&(0.0, y));
        area.draw_text(
            &format!("{:.1}", y),
            &tick_style,
            (px - base.0 - 8, py - base.1),
        )?;
    }

    for (band, color, _) in bands {
        let polygon = band_polygon(&band.low, &band.high);
        if polygon.len() >= 3 {
            chart.draw_series(std::iter::once(Polygon::new(polygon, color.mix(0.2))))?;
        }
    }

    for (band, color, label) in bands {
        let color = *color;
        let line_style = color.mix(0.9).stroke_width(style.line_width);
        chart
            .draw_series(
                finite_runs(&band.mean)
                    .into_iter()
                    .map(move |run| PathElement::new(run, line_style)),
            )?
            .label(*label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 30, y)], color.stroke_width(3))
            });
    }

    chart.draw_series(dashed_vertical(
        SUNSET_INDEX as f64,
        y_lo,
        y_hi,
        30,
        BLACK.mix(0.7).stroke_width(2),
    ))?;

    let marker_color = bands.first().map(|(_, c, _)| *c).unwrap_or(BLACK);
    for &(index, value) in markers {
        if value.is_finite() {
            let point = (index as f64, value);
            chart.draw_series(std::iter::once(Circle::new(
                point,
                style.marker + 2,
                WHITE.filled(),
            )))?;
            chart.draw_series(std::iter::once(Circle::new(
                point,
                style.marker,
                marker_color.filled(),
            )))?;
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerLeft)
        .background_style(WHITE.mix(0.6))
        .border_style(TRANSPARENT)
        .label_font(FigureStyle::font(style.legend))
        .draw()?;

    // Time-axis landmarks drawn under the plotting area
    for (index, label, font) in [
        (MIDDAY_INDEX, "Midday", FigureStyle::font(style.tick)),
        (SUNSET_INDEX, "Sunset", FigureStyle::bold(style.tick)),
    ] {
        let (px, py) = chart.backend_coord(&(index as f64, y_lo));
        let text_style = TextStyle::from(font).pos(Pos::new(HPos::Center, VPos::Top));
        area.draw_text(label, &text_style, (px - base.0, py - base.1 + 6))?;
    }

    Ok(())
}

/// Closed outline of the low..high band over points where both bounds are finite
fn band_polygon(low: &TemporalCurve, high: &TemporalCurve) -> Vec<(f64, f64)> {
    let finite: Vec<(f64, f64, f64)> = low
        .iter()
        .zip(high.iter())
        .enumerate()
        .filter(|(_, (l, h))| l.is_finite() && h.is_finite())
        .map(|(i, (l, h))| (i as f64, l, h))
        .collect();

    finite
        .iter()
        .map(|&(x, _, h)| (x, h))
        .chain(finite.iter().rev().map(|&(x, l, _)| (x, l)))
        .collect()
}

/// Consecutive finite stretches of a curve as drawable paths
fn finite_runs(curve: &TemporalCurve) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();

    for (i, value) in curve.iter().enumerate() {
        if value.is_finite() {
            current.push((i as f64, value));
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

fn dashed_vertical(
    x: f64,
    y_lo: f64,
    y_hi: f64,
    dashes: usize,
    style: ShapeStyle,
) -> Vec<PathElement<(f64, f64)>> {
    dash_offsets(y_lo, y_hi, dashes)
        .map(|(a, b)| PathElement::new(vec![(x, a), (x, b)], style))
        .collect()
}

fn dashed_horizontal(
    x_lo: f64,
    x_hi: f64,
    y: f64,
    dashes: usize,
    style: ShapeStyle,
) -> Vec<PathElement<(f64, f64)>> {
    dash_offsets(x_lo, x_hi, dashes)
        .map(|(a, b)| PathElement::new(vec![(a, y), (b, y)], style))
        .collect()
}

/// Start and end of each dash, each dash followed by an equal gap
fn dash_offsets(from: f64, to: f64, dashes: usize) -> impl Iterator<Item = (f64, f64)> {
    let step = (to - from) / dashes.max(1) as f64;
    (0..dashes.max(1)).map(move |i| {
        let start = from + step * i as f64;
        (start, start + step * 0.6)
    })
}

/// Listed ticks that fall inside the drawn range
fn visible_ticks(limits: &AxisLimits, lo: f64, hi: f64) -> Vec<f64> {
    limits
        .ticks
        .iter()
        .copied()
        .filter(|t| *t >= lo - 1e-9 && *t <= hi + 1e-9)
        .collect()
}

/// Padded range for a count axis, never below zero
fn count_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = padded_range(values, 10.0);
    (lo.max(0.0), hi)
}

fn padded_range(values: impl Iterator<Item = f64>, min_pad: f64) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.15).max(min_pad);
    (lo - pad, hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::{SpatialAnalyzer, StabilityReport};
    use crate::readers::SpatialDataset;
    use tempfile::TempDir;

    fn band(v: f64) -> CurveBand {
        CurveBand::new(
            TemporalCurve::constant(v),
            TemporalCurve::constant(v - 0.2),
            TemporalCurve::constant(v + 0.2),
        )
    }

    fn stability(records: &[SpatialRecord]) -> StabilityReport {
        let mut dataset = SpatialDataset::default();
        dataset.years.insert(2020, records.to_vec());
        SpatialAnalyzer::new().stability(&dataset).unwrap()
    }

    #[test]
    fn test_empty_records_rejected() {
        let records = vec![SpatialRecord::new(1.0, 2.0, 0.1)];
        let report = stability(&records);
        let (urban, rural, turban) = (band(8.0), band(7.5), band(3.5));

        let input = FigureInput {
            year: 2020,
            records: &[],
            stability: &report,
            intensity: IntensityBucket::Light,
            urban: &urban,
            rural: &rural,
            turban: &turban,
            double_peak: None,
        };

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("figure.png");
        let err = FigureRenderer::new().render(&input, &path).unwrap_err();

        assert!(matches!(err, ProcessingError::RenderValidation(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_all_nan_curve_rejected() {
        let records = vec![SpatialRecord::new(1.0, 2.0, 0.1)];
        let report = stability(&records);
        let urban = band(8.0);
        let rural = band(7.5);
        let turban = CurveBand::new(
            TemporalCurve::constant(f64::NAN),
            TemporalCurve::constant(f64::NAN),
            TemporalCurve::constant(f64::NAN),
        );

        let input = FigureInput {
            year: 2020,
            records: &records,
            stability: &report,
            intensity: IntensityBucket::Light,
            urban: &urban,
            rural: &rural,
            turban: &turban,
            double_peak: None,
        };

        assert!(matches!(
            input.validate(),
            Err(ProcessingError::RenderValidation(_))
        ));
    }

    #[test]
    fn test_image_format_from_extension() {
        assert_eq!(ImageFormat::from_path(Path::new("a/b.png")).unwrap(), ImageFormat::Png);
        assert_eq!(ImageFormat::from_path(Path::new("b.SVG")).unwrap(), ImageFormat::Svg);
        assert!(ImageFormat::from_path(Path::new("b.pdf")).is_err());
        assert!(ImageFormat::from_path(Path::new("figure")).is_err());
    }

    #[test]
    fn test_band_polygon_skips_nan() {
        let mut low = vec![1.0; CURVE_LENGTH];
        low[5] = f64::NAN;
        let low = TemporalCurve::new(low).unwrap();
        let high = TemporalCurve::constant(2.0);

        let polygon = band_polygon(&low, &high);
        assert_eq!(polygon.len(), 2 * (CURVE_LENGTH - 1));
        assert_eq!(polygon[0], (0.0, 2.0));
        assert_eq!(polygon[polygon.len() - 1], (0.0, 1.0));
    }

    #[test]
    fn test_finite_runs_split_on_nan() {
        let mut values = vec![1.0; CURVE_LENGTH];
        values[100] = f64::NAN;
        values[101] = f64::NAN;
        let runs = finite_runs(&TemporalCurve::new(values).unwrap());

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len(), 100);
        assert_eq!(runs[1].len(), CURVE_LENGTH - 102);
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range([60.0, 60.0].into_iter(), 2.0), (58.0, 62.0));
        assert_eq!(padded_range(std::iter::empty(), 2.0), (0.0, 1.0));
    }

    #[test]
    fn test_count_range_stays_non_negative() {
        assert_eq!(count_range([4.0, 5.0].into_iter()), (0.0, 15.0));
        assert_eq!(count_range([500.0, 520.0].into_iter()), (490.0, 530.0));
    }

    #[test]
    fn test_visible_ticks_follow_bucket_limits() {
        for intensity in IntensityBucket::ALL {
            for panel in [PanelKind::UrbanRural, PanelKind::UrbanOnly] {
                let limits = intensity.axis_limits(panel);
                let ticks = visible_ticks(&limits, limits.min, limits.max);
                assert_eq!(ticks, limits.ticks.to_vec(), "{} {:?}", intensity, panel);
            }
        }

        let limits = IntensityBucket::Light.axis_limits(PanelKind::UrbanRural);
        let narrowed = visible_ticks(&limits, limits.max, limits.max + 1.0);
        assert!(narrowed.len() <= 1);
    }

    #[test]
    fn test_map_markers_scale_with_height() {
        assert_eq!(FigureStyle::for_height(827).map_marker, 7);
        assert_eq!(FigureStyle::for_height(1654).map_marker, 14);
        assert_eq!(FigureStyle::for_height(150).map_marker, 3);
    }
}
