//! Drop-point queries against the DuckDB `drop_points` table.

use crate::connection::Connection;
use crate::error::{MarketError, Result};
use crate::models::{DropPoint, DropPointKind, NearbyDropPoint};
use crate::sql_builder::SqlBuilder;

const EARTH_RADIUS_KM: f64 = 6371.0;

pub struct DropPointQuery<'a> {
    conn: &'a Connection,
}

impl<'a> DropPointQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// All drop points, optionally of one kind, ordered by name.
    pub fn list(&self, kind: Option<DropPointKind>) -> Result<Vec<DropPoint>> {
        self.conn.ensure_views(&["drop_points"])?;

        let mut qb = SqlBuilder::new("drop_points");
        if let Some(k) = kind {
            qb.where_eq("kind", k.as_str());
        }
        qb.order_by(&["name ASC"]);

        let (sql, params) = qb.build();
        self.conn.execute_into(&sql, &params)
    }

    pub fn get(&self, id: &str) -> Result<Option<DropPoint>> {
        self.conn.ensure_views(&["drop_points"])?;

        let (sql, params) = SqlBuilder::new("drop_points").where_eq("id", id).limit(1).build();
        Ok(self.conn.execute_into(&sql, &params)?.into_iter().next())
    }

    /// The `limit` closest drop points to a coordinate, by great-circle
    /// (haversine) distance in kilometres.
    pub fn nearest(&self, latitude: f64, longitude: f64, limit: usize) -> Result<Vec<NearbyDropPoint>> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(MarketError::InvalidArgument(format!(
                "Coordinate out of range: ({}, {})",
                latitude, longitude
            )));
        }
        self.conn.ensure_views(&["drop_points"])?;

        let distance = format!(
            "2 * {r} * ASIN(SQRT(\
               POWER(SIN(RADIANS(latitude - CAST($1 AS DOUBLE)) / 2), 2) + \
               COS(RADIANS(CAST($1 AS DOUBLE))) * COS(RADIANS(latitude)) * \
               POWER(SIN(RADIANS(longitude - CAST($2 AS DOUBLE)) / 2), 2)))",
            r = EARTH_RADIUS_KM
        );
        let select = format!("*, {} AS \"distanceKm\"", distance);
        let (sql, _) = SqlBuilder::new("drop_points")
            .select(&[select.as_str()])
            .order_by(&["\"distanceKm\" ASC", "name ASC"])
            .limit(limit)
            .build();

        self.conn
            .execute_into(&sql, &[latitude.to_string(), longitude.to_string()])
    }
}
