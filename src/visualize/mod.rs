pub mod charts;
pub mod data;

use crate::analysis::compare_franchise_vs_standalone;
use crate::analysis::stats::median;
use crate::model::{ChartError, Movie};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Renders every chart into `out_dir` as SVG. A chart that fails is logged and
/// left out of the returned name → path map.
pub fn render_all(movies: &[Movie], out_dir: &Path) -> BTreeMap<String, PathBuf> {
    info!("Creating all visualizations in {}", out_dir.display());
    let mut rendered = BTreeMap::new();
    if let Err(e) = fs::create_dir_all(out_dir) {
        error!("Cannot create {}: {}", out_dir.display(), e);
        return rendered;
    }

    let jobs: [(&str, &dyn Fn(&Path) -> Result<(), ChartError>); 5] = [
        ("revenue_vs_budget", &|path| {
            charts::revenue_vs_budget(path, &data::revenue_budget_points(movies))
        }),
        ("roi_by_genre", &|path| charts::roi_by_genre(path, &data::genre_roi(movies))),
        ("popularity_vs_rating", &|path| {
            let points = data::popularity_rating_points(movies);
            let median_popularity = median(points.iter().map(|p| Some(p.x))).unwrap_or_default();
            let median_rating = median(points.iter().map(|p| Some(p.y))).unwrap_or_default();
            charts::popularity_vs_rating(path, &points, median_popularity, median_rating)
        }),
        ("yearly_trends", &|path| charts::yearly_trends(path, &data::yearly_trends(movies))),
        ("franchise_comparison", &|path| {
            let cmp = compare_franchise_vs_standalone(movies);
            if cmp.franchise.movie_count + cmp.standalone.movie_count == 0 {
                return Err(ChartError::NoData);
            }
            charts::franchise_comparison(path, &data::franchise_bars(&cmp))
        }),
    ];

    for (name, draw) in jobs {
        let path = out_dir.join(format!("{}.svg", name));
        info!("Creating {} chart", name);
        match draw(&path) {
            Ok(()) => {
                info!("  Saved to: {}", path.display());
                rendered.insert(name.to_string(), path);
            }
            Err(e) => error!("Failed to create {} chart: {}", name, e),
        }
    }

    info!("Created {} visualizations", rendered.len());
    rendered
}
