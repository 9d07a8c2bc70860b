use crate::model::ChartError;
use crate::visualize::data::{ScatterPoint, YearStats};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use std::path::Path;

const SIZE: (u32, u32) = (1200, 800);
const FONT: &str = "sans-serif";

const PRIMARY: RGBColor = RGBColor(37, 99, 235);
const SECONDARY: RGBColor = RGBColor(124, 58, 237);
const SUCCESS: RGBColor = RGBColor(16, 185, 129);
const WARNING: RGBColor = RGBColor(245, 158, 11);
const DANGER: RGBColor = RGBColor(239, 68, 68);
const MUTED: RGBColor = RGBColor(156, 163, 175);

fn render_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

/// Upper bound with a little headroom; never collapses to an empty range.
fn padded_max(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0_f64, f64::max);
    if max > 0.0 { max * 1.05 } else { 1.0 }
}

fn draw_labels<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    points: &[ScatterPoint],
) -> Result<(), ChartError> {
    chart
        .draw_series(points.iter().filter_map(|p| {
            p.label
                .as_ref()
                .map(|label| Text::new(label.clone(), (p.x, p.y), (FONT, 13).into_font()))
        }))
        .map_err(render_err)?;
    Ok(())
}

pub fn revenue_vs_budget(path: &Path, points: &[ScatterPoint]) -> Result<(), ChartError> {
    if points.is_empty() {
        return Err(ChartError::NoData);
    }
    let max = padded_max(points.iter().flat_map(|p| [p.x, p.y]));

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Movie Revenue vs Budget", (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..max, 0.0..max)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .x_desc("Budget (Million USD)")
        .y_desc("Revenue (Million USD)")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(vec![(0.0, 0.0), (max, max)], DANGER.mix(0.6).stroke_width(2)))
        .map_err(render_err)?
        .label("Break-even line")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], DANGER));
    chart
        .draw_series(
            points
                .iter()
                .map(|p| Circle::new((p.x, p.y), p.size, PRIMARY.mix(0.7).filled())),
        )
        .map_err(render_err)?
        .label("Movie")
        .legend(|(x, y)| Circle::new((x + 10, y), 5, PRIMARY.filled()));
    draw_labels(&mut chart, points)?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;
    root.present().map_err(render_err)?;
    Ok(())
}

/// Horizontal bars, one per genre, in the given order from bottom to top.
pub fn roi_by_genre(path: &Path, genres: &[(String, f64)]) -> Result<(), ChartError> {
    if genres.is_empty() {
        return Err(ChartError::NoData);
    }
    let low = genres.iter().map(|g| g.1).fold(0.0_f64, f64::min);
    let high = padded_max(genres.iter().map(|g| g.1));
    // Room for the text after the longest bar.
    let span = high - low;
    let x_range = (low - span * 0.05)..(high + span * 0.35);

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("ROI Distribution by Genre", (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(20)
        .build_cartesian_2d(x_range, 0.0..genres.len() as f64)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_label_formatter(&|_| String::new())
        .x_desc("Average ROI (Return on Investment)")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(genres.iter().enumerate().map(|(i, (_, roi))| {
            let y = i as f64;
            let color = if *roi >= 0.0 { SUCCESS } else { DANGER };
            Rectangle::new([(0.0, y + 0.15), (*roi, y + 0.85)], color.filled())
        }))
        .map_err(render_err)?;
    chart
        .draw_series(genres.iter().enumerate().map(|(i, (genre, roi))| {
            let x = roi.max(0.0) + span * 0.01;
            Text::new(
                format!("{} ({:.2}x)", genre, roi),
                (x, i as f64 + 0.65),
                (FONT, 14).into_font(),
            )
        }))
        .map_err(render_err)?;
    chart
        .draw_series(LineSeries::new(
            vec![(0.0, 0.0), (0.0, genres.len() as f64)],
            MUTED.stroke_width(1),
        ))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Scatter with median guide lines; marker size follows revenue.
pub fn popularity_vs_rating(
    path: &Path,
    points: &[ScatterPoint],
    median_popularity: f64,
    median_rating: f64,
) -> Result<(), ChartError> {
    if points.is_empty() {
        return Err(ChartError::NoData);
    }
    let max_x = padded_max(points.iter().map(|p| p.x));

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Popularity vs Rating", (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..max_x, 0.0..10.0)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .x_desc("Popularity Score")
        .y_desc("Average Rating")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(
            vec![(median_popularity, 0.0), (median_popularity, 10.0)],
            MUTED.mix(0.6).stroke_width(1),
        ))
        .map_err(render_err)?;
    chart
        .draw_series(LineSeries::new(
            vec![(0.0, median_rating), (max_x, median_rating)],
            MUTED.mix(0.6).stroke_width(1),
        ))
        .map_err(render_err)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|p| Circle::new((p.x, p.y), p.size, SECONDARY.mix(0.6).filled())),
        )
        .map_err(render_err)?;
    draw_labels(&mut chart, points)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Money means on top, mean rating underneath, sharing the year axis.
pub fn yearly_trends(path: &Path, years: &[YearStats]) -> Result<(), ChartError> {
    let (Some(first), Some(last)) = (years.first(), years.last()) else {
        return Err(ChartError::NoData);
    };
    let x_range = first.year..(last.year + 1);
    let budget: Vec<(i32, f64)> = years
        .iter()
        .filter_map(|y| y.mean_budget_musd.map(|v| (y.year, v)))
        .collect();
    let revenue: Vec<(i32, f64)> = years
        .iter()
        .filter_map(|y| y.mean_revenue_musd.map(|v| (y.year, v)))
        .collect();
    let rating: Vec<(i32, f64)> = years
        .iter()
        .filter_map(|y| y.mean_rating.map(|v| (y.year, v)))
        .collect();
    let max_money = padded_max(budget.iter().chain(revenue.iter()).map(|p| p.1));

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let root = root
        .titled("Yearly Trends in Box Office Performance", (FONT, 28))
        .map_err(render_err)?;
    let (upper, lower) = root.split_vertically(SIZE.1 * 3 / 5);

    let mut money = ChartBuilder::on(&upper)
        .margin(20)
        .x_label_area_size(30)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range.clone(), 0.0..max_money)
        .map_err(render_err)?;
    money
        .configure_mesh()
        .y_desc("Amount (Million USD)")
        .draw()
        .map_err(render_err)?;
    let money_series = [
        (&budget, WARNING, "Avg Budget ($M)"),
        (&revenue, SUCCESS, "Avg Revenue ($M)"),
    ];
    for (series, color, name) in money_series {
        money
            .draw_series(LineSeries::new(series.iter().copied(), color.stroke_width(2)))
            .map_err(render_err)?
            .label(name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        money
            .draw_series(series.iter().map(|&(x, y)| Circle::new((x, y), 4, color.filled())))
            .map_err(render_err)?;
    }
    money
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;

    let mut votes = ChartBuilder::on(&lower)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, 0.0..10.0)
        .map_err(render_err)?;
    votes
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Average Rating")
        .draw()
        .map_err(render_err)?;
    votes
        .draw_series(LineSeries::new(rating.iter().copied(), SECONDARY.stroke_width(2)))
        .map_err(render_err)?;
    votes
        .draw_series(
            rating
                .iter()
                .map(|&(x, y)| TriangleMarker::new((x, y), 6, SECONDARY.filled())),
        )
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Grouped bars: franchise on the left of each group, standalone on the right.
pub fn franchise_comparison(path: &Path, groups: &[(&str, f64, f64)]) -> Result<(), ChartError> {
    if groups.is_empty() {
        return Err(ChartError::NoData);
    }
    let max = padded_max(groups.iter().flat_map(|g| [g.1, g.2]));
    let names: Vec<&str> = groups.iter().map(|g| g.0).collect();
    let width = 0.35;

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Franchise vs Standalone Movies Comparison", (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5..(groups.len() as f64 - 0.5), 0.0..max)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups.len())
        .x_label_formatter(&|x| {
            let idx = x.round();
            if (x - idx).abs() < 1e-6 && idx >= 0.0 {
                names.get(idx as usize).map(|n| n.to_string()).unwrap_or_default()
            } else {
                String::new()
            }
        })
        .y_desc("Value")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(groups.iter().enumerate().map(|(i, g)| {
            let x = i as f64;
            Rectangle::new([(x - width, 0.0), (x, g.1)], PRIMARY.filled())
        }))
        .map_err(render_err)?
        .label("Franchise")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], PRIMARY.filled()));
    chart
        .draw_series(groups.iter().enumerate().map(|(i, g)| {
            let x = i as f64;
            Rectangle::new([(x, 0.0), (x + width, g.2)], WARNING.filled())
        }))
        .map_err(render_err)?
        .label("Standalone")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], WARNING.filled()));
    chart
        .draw_series(groups.iter().enumerate().flat_map(|(i, g)| {
            let x = i as f64;
            [
                Text::new(
                    format!("{:.1}", g.1),
                    (x - width, g.1 + max * 0.01),
                    (FONT, 13).into_font(),
                ),
                Text::new(format!("{:.1}", g.2), (x, g.2 + max * 0.01), (FONT, 13).into_font()),
            ]
        }))
        .map_err(render_err)?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;
    root.present().map_err(render_err)?;
    Ok(())
}
