use crate::analysis::{RankedMovie, Ranking};
use crate::model::{Movie, PipelineRun, StorageError};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use tracing::info;

/// Analytics copy of the final dataset, the latest rankings and the run log.
pub struct AnalyticsStore {
    conn: Connection,
}

impl AnalyticsStore {
    /// Opens the database file and creates missing tables.
    pub fn open(db_path: &Path) -> Result<Self, StorageError> {
        crate::storage::snapshot::ensure_parent(db_path)?;
        Self::init(Connection::open(db_path)?)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS movies (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                release_date TEXT,
                release_year INTEGER,
                genres TEXT NOT NULL DEFAULT '',
                collection TEXT,
                director TEXT NOT NULL DEFAULT '',
                budget_musd REAL,
                revenue_musd REAL,
                profit_musd REAL,
                roi REAL,
                vote_count INTEGER,
                vote_average REAL,
                vote_score REAL,
                popularity REAL,
                runtime INTEGER,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS rankings (
                kind TEXT NOT NULL,
                rank INTEGER NOT NULL,
                movie_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                value REAL NOT NULL,
                PRIMARY KEY (kind, rank)
            );

            CREATE TABLE IF NOT EXISTS pipeline_runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                started_at TEXT NOT NULL,
                finished_at TEXT NOT NULL,
                raw_count INTEGER NOT NULL,
                cleaned_count INTEGER NOT NULL,
                chart_count INTEGER NOT NULL
            );
            ",
        )?;
        Ok(Self { conn })
    }

    /// Inserts or updates every movie by id.
    pub fn save_movies(&mut self, movies: &[Movie]) -> Result<(), StorageError> {
        let now = chrono::Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO movies (
                    id, title, release_date, release_year, genres, collection, director,
                    budget_musd, revenue_musd, profit_musd, roi,
                    vote_count, vote_average, vote_score, popularity, runtime, updated_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            )?;
            for m in movies {
                stmt.execute(params![
                    m.id as i64,
                    &m.title,
                    m.release_date.map(|d| d.to_string()),
                    m.release_year,
                    m.genres.join("|"),
                    &m.belongs_to_collection,
                    m.director.join("|"),
                    m.budget_musd,
                    m.revenue_musd,
                    m.profit_musd,
                    m.roi,
                    m.vote_count,
                    m.vote_average,
                    m.vote_score,
                    m.popularity,
                    m.runtime,
                    &now,
                ])?;
            }
        }
        tx.commit()?;
        info!("Stored {} movies in the analytics database", movies.len());
        Ok(())
    }

    /// Drops the previous rankings and stores these.
    pub fn replace_rankings(&mut self, rankings: &[Ranking]) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM rankings", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO rankings (kind, rank, movie_id, title, value) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for ranking in rankings {
                for entry in &ranking.entries {
                    stmt.execute(params![
                        ranking.kind.key(),
                        entry.rank as i64,
                        entry.id as i64,
                        &entry.title,
                        entry.value,
                    ])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn record_run(&self, run: &PipelineRun) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO pipeline_runs (started_at, finished_at, raw_count, cleaned_count, chart_count)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                run.started_at.to_rfc3339(),
                run.finished_at.to_rfc3339(),
                run.raw_count as i64,
                run.cleaned_count as i64,
                run.chart_count as i64,
            ],
        )?;
        Ok(())
    }

    pub fn movie_count(&self) -> Result<usize, StorageError> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM movies", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn run_count(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pipeline_runs", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Stored entries of one ranking, by rank.
    pub fn ranking(&self, kind_key: &str) -> Result<Vec<RankedMovie>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT rank, movie_id, title, value FROM rankings WHERE kind = ?1 ORDER BY rank ASC",
        )?;
        let rows = stmt.query_map(params![kind_key], Self::map_ranked)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn map_ranked(row: &Row) -> Result<RankedMovie, rusqlite::Error> {
        let rank: i64 = row.get(0)?;
        let id: i64 = row.get(1)?;
        Ok(RankedMovie {
            rank: rank as usize,
            id: id as u64,
            title: row.get(2)?,
            value: row.get(3)?,
        })
    }
}
