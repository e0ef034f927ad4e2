//! Draw a bound chart as small-multiples PNGs with plotters, one file per
//! display language. Numeric content is identical across languages; only
//! titles, facet captions and the source line are localized.

use std::ops::Range;
use std::path::Path;

use plotters::prelude::*;

use crate::chart::grid::grid_for;
use crate::chart::plot::{BoundChart, ChartError, RenderedChart, Series};
use crate::index::Lang;

pub const DEFAULT_IMG_DIR: &str = "img";

/// Comparator overlay color (steel blue, drawn translucent and thick).
const COMPARATOR_COLOR: RGBColor = RGBColor(31, 119, 180);
const COMPARATOR_ALPHA: f64 = 0.35;
const COMPARATOR_STROKE: u32 = 4;

/// Render one image per configured language into `out_dir`.
pub fn render(bound: &BoundChart, out_dir: impl AsRef<Path>) -> Result<RenderedChart, ChartError> {
    let out_dir = out_dir.as_ref();
    std::fs::create_dir_all(out_dir)
        .map_err(|err| ChartError::Render(format!("create {}: {err}", out_dir.display())))?;

    let mut files = Vec::with_capacity(bound.spec.langs.len());
    for lang in &bound.spec.langs {
        let path = out_dir.join(bound.filename(*lang));
        draw_figure(bound, *lang, &path)?;
        files.push(path);
    }
    Ok(RenderedChart { files })
}

fn draw_figure(bound: &BoundChart, lang: Lang, path: &Path) -> Result<(), ChartError> {
    let spec = &bound.spec;
    let root = BitMapBackend::new(path, (spec.width, spec.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let title = bound.title(lang);
    let title_font = ("sans-serif", 26).into_font().style(FontStyle::Bold);
    let root = root.titled(&title, title_font).map_err(render_err)?;

    let source = bound.data_source(lang);
    let source_style = TextStyle::from(("sans-serif", 13).into_font()).color(&BLACK);
    let (_, bottom) = root.dim_in_pixel();
    root.draw_text(&source, &source_style, (8, bottom as i32 - 18))
        .map_err(render_err)?;

    if let Some(caption) = &spec.caption {
        if let Some(text) = caption.text.get(lang.as_str()) {
            let style = TextStyle::from(("sans-serif", caption.size).into_font());
            let (w, h) = root.dim_in_pixel();
            let pos = (
                (caption.x * f64::from(w)) as i32,
                (caption.y * f64::from(h)) as i32,
            );
            root.draw_text(text, &style, pos).map_err(render_err)?;
        }
    }

    let focus_color = parse_color(&spec.color);
    let (rows, cols) = grid_for(bound.facets.len());
    let grid_area = root.margin(4, 22, 4, 4);
    let cells = grid_area.split_evenly((rows, cols));

    for (facet_no, series) in bound.facets.iter().enumerate() {
        let col = facet_no % cols;
        let is_bottom_row = facet_no + cols >= bound.facets.len();
        draw_facet(
            &cells[facet_no],
            bound,
            series,
            lang,
            focus_color,
            col == 0,
            is_bottom_row,
        )?;
    }
    // Cells past the facet count stay blank, like the original's axis('off').

    root.present().map_err(render_err)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn draw_facet<DB: DrawingBackend>(
    cell: &DrawingArea<DB, plotters::coord::Shift>,
    bound: &BoundChart,
    series: &Series,
    lang: Lang,
    focus_color: RGBColor,
    show_y_labels: bool,
    show_x_labels: bool,
) -> Result<(), ChartError> {
    let spec = &bound.spec;
    let x_range = pad_year_range(bound.xlim);
    let y_range = bound.ylim.0..bound.ylim.1;

    let mut builder = ChartBuilder::on(cell);
    builder
        .caption(series.entry.name(lang), ("sans-serif", 14).into_font().style(FontStyle::Bold))
        .margin(5)
        .x_label_area_size(if show_x_labels { 20 } else { 0 })
        .y_label_area_size(if show_y_labels { 34 } else { 0 });
    let mut chart = builder
        .build_cartesian_2d(x_range.clone(), y_range)
        .map_err(render_err)?;

    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh()
        .disable_y_mesh()
        .label_style(("sans-serif", 10))
        .x_labels(label_count(
            spec.xstep.map(f64::from),
            f64::from(x_range.end - x_range.start),
        ))
        .y_labels(label_count(spec.ystep, bound.ylim.1 - bound.ylim.0));
    mesh.draw().map_err(render_err)?;

    // Comparators first so the focus series draws on top of them.
    for comp in &bound.comparators {
        chart
            .draw_series(LineSeries::new(
                comp.points.iter().copied(),
                COMPARATOR_COLOR.mix(COMPARATOR_ALPHA).stroke_width(COMPARATOR_STROKE),
            ))
            .map_err(render_err)?;
    }

    chart
        .draw_series(LineSeries::new(
            series.points.iter().copied(),
            focus_color.stroke_width(1),
        ))
        .map_err(render_err)?;
    chart
        .draw_series(
            series
                .points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, focus_color.filled())),
        )
        .map_err(render_err)?;

    Ok(())
}

/// A single-year chart still needs a non-empty x axis.
fn pad_year_range((start, end): (i32, i32)) -> Range<i32> {
    if start >= end {
        start - 1..end + 1
    } else {
        start..end
    }
}

/// Tick count from an explicit step, clamped to something readable.
fn label_count(step: Option<f64>, span: f64) -> usize {
    match step {
        Some(step) if step > 0.0 && span > 0.0 => ((span / step).round() as usize).clamp(2, 20),
        _ => 4,
    }
}

/// Named colors in the prettyplotlib palette, plus `#rrggbb`.
fn parse_color(name: &str) -> RGBColor {
    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() == 6 {
            if let Ok(value) = u32::from_str_radix(hex, 16) {
                return RGBColor(
                    ((value >> 16) & 0xff) as u8,
                    ((value >> 8) & 0xff) as u8,
                    (value & 0xff) as u8,
                );
            }
        }
    }
    match name {
        "blue" => RGBColor(31, 119, 180),
        "green" => RGBColor(44, 160, 44),
        "orange" => RGBColor(255, 127, 14),
        "purple" => RGBColor(148, 103, 189),
        "black" => RGBColor(0, 0, 0),
        // "red" and anything unknown.
        _ => RGBColor(227, 26, 28),
    }
}

fn render_err(err: impl std::fmt::Display) -> ChartError {
    ChartError::Render(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{label_count, pad_year_range, parse_color};
    use plotters::style::RGBColor;

    #[test]
    fn degenerate_year_range_is_padded() {
        assert_eq!(pad_year_range((2001, 2001)), 2000..2002);
        assert_eq!(pad_year_range((1990, 2000)), 1990..2000);
    }

    #[test]
    fn label_count_from_step() {
        assert_eq!(label_count(Some(10.0), 40.0), 4);
        assert_eq!(label_count(None, 40.0), 4);
        assert_eq!(label_count(Some(0.5), 1.0), 2);
    }

    #[test]
    fn colors_by_name_and_hex() {
        assert_eq!(parse_color("#102030"), RGBColor(16, 32, 48));
        assert_eq!(parse_color("blue"), RGBColor(31, 119, 180));
        assert_eq!(parse_color("no-such-color"), RGBColor(227, 26, 28));
    }
}
