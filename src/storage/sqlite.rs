//! SQLite-backed attraction store
//!
//! Mirrors the import layout: `scenic_spots` rows reference a city, cities
//! reference a province. A fresh connection is opened for every call, so no
//! connection outlives a single dispatcher query.

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, params, params_from_iter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

use super::{AttractionStore, NearbyQuery};
use crate::config::DatabaseConfig;
use crate::models::result::rank_by_distance;
use crate::models::{Attraction, Coordinates, NumericFilter, OpeningHours, ResultRow};
use crate::{Result, ScenicQaError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS provinces (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS cities (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    province_id INTEGER REFERENCES provinces(id)
);
CREATE TABLE IF NOT EXISTS scenic_spots (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    type TEXT,
    address TEXT,
    city_id INTEGER REFERENCES cities(id),
    latitude REAL,
    longitude REAL,
    rating REAL,
    cost REAL,
    open_time_start INTEGER,
    open_time_end INTEGER,
    opentime_today TEXT,
    opentime_week TEXT,
    tel TEXT
);
CREATE INDEX IF NOT EXISTS idx_scenic_spots_city ON scenic_spots(city_id);
CREATE INDEX IF NOT EXISTS idx_scenic_spots_coords ON scenic_spots(latitude, longitude);
";

const SELECT_ATTRACTION: &str = "
SELECT s.name, s.type, s.address, c.name, p.name, s.latitude, s.longitude,
       s.rating, s.cost, s.open_time_start, s.open_time_end,
       s.opentime_today, s.opentime_week, s.tel
FROM scenic_spots s
LEFT JOIN cities c ON s.city_id = c.id
LEFT JOIN provinces p ON c.province_id = p.id
";

/// Attraction store on a SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteStore {
    /// Store on the database file at `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout: Duration::from_millis(2000),
        }
    }

    /// Store configured from the `[database]` section
    #[must_use]
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            path: PathBuf::from(&config.path),
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_read_only(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            ScenicQaError::storage(format!(
                "Failed to open database {}: {e}",
                self.path.display()
            ))
        })?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }

    fn open_read_write(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }

    /// Create the tables if they do not exist yet
    pub fn create_schema(&self) -> Result<()> {
        let conn = self.open_read_write()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Insert an attraction or replace the one with the same name.
    ///
    /// City and province rows are created on demand.
    #[instrument(level = "debug", skip(self, attraction), fields(name = %attraction.name))]
    pub fn upsert_attraction(&self, attraction: &Attraction) -> Result<()> {
        let mut conn = self.open_read_write()?;
        let tx = conn.transaction()?;

        let province_id: Option<i64> = match &attraction.province {
            Some(province) => {
                tx.execute(
                    "INSERT INTO provinces(name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
                    params![province],
                )?;
                Some(tx.query_row(
                    "SELECT id FROM provinces WHERE name = ?1",
                    params![province],
                    |row| row.get(0),
                )?)
            }
            None => None,
        };

        let city_id: Option<i64> = match &attraction.city {
            Some(city) => {
                tx.execute(
                    "INSERT INTO cities(name, province_id) VALUES (?1, ?2)
                     ON CONFLICT(name) DO UPDATE
                     SET province_id = COALESCE(excluded.province_id, cities.province_id)",
                    params![city, province_id],
                )?;
                Some(tx.query_row(
                    "SELECT id FROM cities WHERE name = ?1",
                    params![city],
                    |row| row.get(0),
                )?)
            }
            None => None,
        };

        let hours = &attraction.opening_hours;
        tx.execute(
            "INSERT INTO scenic_spots (
                name, type, address, city_id, latitude, longitude, rating, cost,
                open_time_start, open_time_end, opentime_today, opentime_week, tel
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(name) DO UPDATE SET
                type = excluded.type,
                address = excluded.address,
                city_id = excluded.city_id,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                rating = excluded.rating,
                cost = excluded.cost,
                open_time_start = excluded.open_time_start,
                open_time_end = excluded.open_time_end,
                opentime_today = excluded.opentime_today,
                opentime_week = excluded.opentime_week,
                tel = excluded.tel",
            params![
                attraction.name,
                attraction.kind,
                attraction.address,
                city_id,
                attraction.coordinates.map(|c| c.latitude),
                attraction.coordinates.map(|c| c.longitude),
                attraction.rating,
                attraction.cost,
                hours.start_secs,
                hours.end_secs,
                hours.today,
                hours.weekly,
                attraction.tel,
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn query_names(&self, sql: &str) -> Result<Vec<String>> {
        let conn = self.open_read_only()?;
        let mut stmt = conn.prepare(sql)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }
}

fn attraction_from_row(row: &Row<'_>) -> rusqlite::Result<Attraction> {
    let latitude: Option<f64> = row.get(5)?;
    let longitude: Option<f64> = row.get(6)?;
    let start: Option<i64> = row.get(9)?;
    let end: Option<i64> = row.get(10)?;

    Ok(Attraction {
        name: row.get(0)?,
        kind: row.get(1)?,
        address: row.get(2)?,
        city: row.get(3)?,
        province: row.get(4)?,
        coordinates: latitude
            .zip(longitude)
            .map(|(lat, lon)| Coordinates::new(lat, lon)),
        rating: row.get(7)?,
        cost: row.get(8)?,
        opening_hours: OpeningHours {
            today: row.get(11)?,
            weekly: row.get(12)?,
            start_secs: start.and_then(|s| u32::try_from(s).ok()),
            end_secs: end.and_then(|s| u32::try_from(s).ok()),
        },
        tel: row.get(13)?,
    })
}

fn limit_value(limit: usize) -> Value {
    Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX))
}

impl AttractionStore for SqliteStore {
    #[instrument(level = "debug", skip(self))]
    fn attraction_names(&self) -> Result<Vec<String>> {
        self.query_names("SELECT name FROM scenic_spots")
    }

    #[instrument(level = "debug", skip(self))]
    fn city_names(&self) -> Result<Vec<String>> {
        self.query_names("SELECT DISTINCT name FROM cities")
    }

    #[instrument(level = "debug", skip(self))]
    fn find_by_name(&self, name: &str) -> Result<Option<Attraction>> {
        let conn = self.open_read_only()?;
        let sql = format!("{SELECT_ATTRACTION} WHERE s.name = ?1");
        let attraction = conn
            .query_row(&sql, params![name], attraction_from_row)
            .optional()?;
        Ok(attraction)
    }

    #[instrument(level = "debug", skip(self))]
    fn find_by_city(
        &self,
        city: &str,
        filters: &[NumericFilter],
        limit: usize,
    ) -> Result<Vec<Attraction>> {
        let conn = self.open_read_only()?;

        let mut sql = format!("{SELECT_ATTRACTION} WHERE c.name = ?1");
        let mut values = vec![Value::Text(city.to_string())];
        for filter in filters {
            values.push(Value::Real(filter.value));
            // Column and operator come from closed enums; the value stays bound.
            sql.push_str(&format!(
                " AND {} {} ?{}",
                filter.attribute.column(),
                filter.operator.as_sql(),
                values.len()
            ));
        }
        values.push(limit_value(limit));
        sql.push_str(&format!(
            " ORDER BY s.rating IS NULL, s.rating DESC, s.name LIMIT ?{}",
            values.len()
        ));

        debug!("City query: {}", sql);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), attraction_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    #[instrument(level = "debug", skip(self))]
    fn find_nearby(&self, query: &NearbyQuery) -> Result<Vec<ResultRow>> {
        let conn = self.open_read_only()?;
        let (min_lat, max_lat, min_lon, max_lon) = query.center.bounding_box(query.radius_km);

        let mut sql = format!(
            "{SELECT_ATTRACTION} WHERE s.name != ?1
             AND s.latitude BETWEEN ?2 AND ?3
             AND s.longitude BETWEEN ?4 AND ?5"
        );
        let mut values = vec![
            Value::Text(query.exclude_name.clone()),
            Value::Real(min_lat),
            Value::Real(max_lat),
            Value::Real(min_lon),
            Value::Real(max_lon),
        ];
        if let Some(kind) = &query.kind {
            values.push(Value::Text(kind.clone()));
            sql.push_str(&format!(" AND s.type = ?{}", values.len()));
        }

        let mut stmt = conn.prepare(&sql)?;
        let candidates = stmt
            .query_map(params_from_iter(values.iter()), attraction_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!("{} candidates inside bounding box", candidates.len());

        let mut rows: Vec<ResultRow> = candidates
            .into_iter()
            .filter_map(|attraction| {
                let distance = query.center.distance_km(&attraction.coordinates?);
                (distance <= query.radius_km).then(|| ResultRow::with_distance(attraction, distance))
            })
            .collect();

        rank_by_distance(&mut rows);
        rows.truncate(query.limit);
        Ok(rows)
    }
}
