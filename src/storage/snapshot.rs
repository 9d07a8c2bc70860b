// Flat-file snapshots of each pipeline stage.
use crate::model::{Movie, RawMovie, StorageError};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

/// Where every artifact of a run lives, relative to `data_dir`.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    root: PathBuf,
}

impl ArtifactPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { root: data_dir.into() }
    }

    pub fn raw_json(&self) -> PathBuf {
        self.root.join("raw").join("movies_raw.json")
    }

    pub fn cleaned_csv(&self) -> PathBuf {
        self.root.join("processed").join("movies_cleaned.csv")
    }

    pub fn final_csv(&self) -> PathBuf {
        self.root.join("analytics").join("movies_final.csv")
    }

    pub fn report(&self) -> PathBuf {
        self.root.join("analytics").join("report.txt")
    }

    pub fn database(&self) -> PathBuf {
        self.root.join("analytics").join("movies.db")
    }

    pub fn charts_dir(&self) -> PathBuf {
        self.root.join("visualizations")
    }
}

pub fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn write_raw_json(path: &Path, movies: &[RawMovie]) -> Result<(), StorageError> {
    ensure_parent(path)?;
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, movies)?;
    info!("Saved {} raw records to {}", movies.len(), path.display());
    Ok(())
}

pub fn read_raw_json(path: &Path) -> Result<Vec<RawMovie>, StorageError> {
    let reader = BufReader::new(File::open(path)?);
    let movies: Vec<RawMovie> = serde_json::from_reader(reader)?;
    info!("Loaded {} raw records from {}", movies.len(), path.display());
    Ok(movies)
}

pub fn write_movies_csv(path: &Path, movies: &[Movie]) -> Result<(), StorageError> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for movie in movies {
        writer.serialize(movie)?;
    }
    writer.flush()?;
    info!("Saved {} movies to {}", movies.len(), path.display());
    Ok(())
}

pub fn read_movies_csv(path: &Path) -> Result<Vec<Movie>, StorageError> {
    let mut reader = csv::Reader::from_path(path)?;
    let movies = reader
        .deserialize::<Movie>()
        .collect::<Result<Vec<_>, _>>()?;
    info!("Loaded {} movies from {}", movies.len(), path.display());
    Ok(movies)
}
