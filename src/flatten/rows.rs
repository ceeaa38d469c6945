//! Flat row records produced by the flattener, one struct per
//! destination table, plus the uniform value type the sink binds.

use bytes::BytesMut;
use chrono::{DateTime, Utc};
use postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use serde_json::Value;

use crate::schema::{self, TableSchema};

/// A single bindable column value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(b) => b.to_sql(ty, out),
            SqlValue::Integer(i) => i.to_sql(ty, out),
            SqlValue::Real(f) => f.to_sql(ty, out),
            SqlValue::Text(s) => s.to_sql(ty, out),
            SqlValue::Timestamp(t) => t.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::BOOL
            || *ty == Type::INT8
            || *ty == Type::FLOAT8
            || *ty == Type::TEXT
            || *ty == Type::VARCHAR
            || *ty == Type::TIMESTAMPTZ
    }

    to_sql_checked!();
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(v)
    }
}

/// JSON payloads are stored as their compact text rendering
impl From<&Value> for SqlValue {
    fn from(v: &Value) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => SqlValue::Null,
        }
    }
}

/// A row that knows its destination table and how to bind itself
pub trait TableRow {
    fn table() -> &'static TableSchema;
    fn values(&self) -> Vec<SqlValue>;
}

// =============================================================================
// Row records
// =============================================================================

#[derive(Debug, Clone)]
pub struct SiteRow {
    pub site_id: Option<String>,
    pub installation_id: Option<String>,
    pub date_created: Option<DateTime<Utc>>,
    pub version: Option<String>,
    pub length_unit: Option<String>,
    pub angle_unit: Option<String>,
    pub area_unit: Option<String>,
    pub north_vector_x: Option<f64>,
    pub north_vector_y: Option<f64>,
    pub north_vector_z: Option<f64>,
    pub heading_vector_x: Option<f64>,
    pub heading_vector_y: Option<f64>,
    pub heading_vector_z: Option<f64>,
    pub external_site_model_source_id: Option<String>,
    pub etl_updated_date: DateTime<Utc>,
}

impl TableRow for SiteRow {
    fn table() -> &'static TableSchema {
        &schema::SITES
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.site_id.clone().into(),
            self.installation_id.clone().into(),
            self.date_created.into(),
            self.version.clone().into(),
            self.length_unit.clone().into(),
            self.angle_unit.clone().into(),
            self.area_unit.clone().into(),
            self.north_vector_x.into(),
            self.north_vector_y.into(),
            self.north_vector_z.into(),
            self.heading_vector_x.into(),
            self.heading_vector_y.into(),
            self.heading_vector_z.into(),
            self.external_site_model_source_id.clone().into(),
            self.etl_updated_date.into(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct BuildingRow {
    pub site_id: Option<String>,
    /// 1-based position of the building within its document; scoped to the
    /// document, only unique together with `site_id`
    pub building_id: i64,
    pub is_primary_building: Option<bool>,
    pub total_roof_area: Option<f64>,
    pub etl_updated_date: DateTime<Utc>,
}

impl TableRow for BuildingRow {
    fn table() -> &'static TableSchema {
        &schema::BUILDINGS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.site_id.clone().into(),
            self.building_id.into(),
            self.is_primary_building.into(),
            self.total_roof_area.into(),
            self.etl_updated_date.into(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct MountingPlaneRow {
    pub site_id: Option<String>,
    pub building_id: i64,
    pub mounting_plane_id: Option<String>,
    pub area: Option<f64>,
    /// -1.0 when the document carries no pitch; never NaN
    pub pitch_angle: f64,
    pub azimuth_angle: f64,
    pub centroid_x: Option<f64>,
    pub centroid_y: Option<f64>,
    pub centroid_z: Option<f64>,
    pub azimuth_vector_x: f64,
    pub azimuth_vector_y: f64,
    pub azimuth_vector_z: f64,
    pub x_axis_x: f64,
    pub x_axis_y: f64,
    pub x_axis_z: f64,
    pub y_axis_x: f64,
    pub y_axis_y: f64,
    pub y_axis_z: f64,
    pub z_axis_x: f64,
    pub z_axis_y: f64,
    pub z_axis_z: f64,
    pub winding_direction: Option<String>,
    pub roof_material_type: Option<String>,
}

impl TableRow for MountingPlaneRow {
    fn table() -> &'static TableSchema {
        &schema::MOUNTING_PLANES
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.site_id.clone().into(),
            self.building_id.into(),
            self.mounting_plane_id.clone().into(),
            self.area.into(),
            self.pitch_angle.into(),
            self.azimuth_angle.into(),
            self.centroid_x.into(),
            self.centroid_y.into(),
            self.centroid_z.into(),
            self.azimuth_vector_x.into(),
            self.azimuth_vector_y.into(),
            self.azimuth_vector_z.into(),
            self.x_axis_x.into(),
            self.x_axis_y.into(),
            self.x_axis_z.into(),
            self.y_axis_x.into(),
            self.y_axis_y.into(),
            self.y_axis_z.into(),
            self.z_axis_x.into(),
            self.z_axis_y.into(),
            self.z_axis_z.into(),
            self.winding_direction.clone().into(),
            self.roof_material_type.clone().into(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct EdgeRow {
    pub site_id: Option<String>,
    pub building_id: i64,
    pub edge_id: String,
    pub start_point_x: f64,
    pub start_point_y: f64,
    pub start_point_z: f64,
    pub end_point_x: f64,
    pub end_point_y: f64,
    pub end_point_z: f64,
    pub bearing_vector: Option<Value>,
    pub angle_to_up_vector: f64,
    pub angle_to_right_vector: f64,
    pub edge_condition: Option<String>,
    pub siding_material: Option<String>,
}

impl TableRow for EdgeRow {
    fn table() -> &'static TableSchema {
        &schema::EDGES
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.site_id.clone().into(),
            self.building_id.into(),
            self.edge_id.clone().into(),
            self.start_point_x.into(),
            self.start_point_y.into(),
            self.start_point_z.into(),
            self.end_point_x.into(),
            self.end_point_y.into(),
            self.end_point_z.into(),
            self.bearing_vector.as_ref().into(),
            self.angle_to_up_vector.into(),
            self.angle_to_right_vector.into(),
            self.edge_condition.clone().into(),
            self.siding_material.clone().into(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct PenetrationRow {
    pub site_id: Option<String>,
    pub building_id: i64,
    pub mounting_plane_id: Option<String>,
    pub penetration_id: String,
    pub obstruction_id: String,
}

impl TableRow for PenetrationRow {
    fn table() -> &'static TableSchema {
        &schema::PENETRATIONS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.site_id.clone().into(),
            self.building_id.into(),
            self.mounting_plane_id.clone().into(),
            self.penetration_id.clone().into(),
            self.obstruction_id.clone().into(),
        ]
    }
}

/// Which level of the document an obstruction row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstructionLevel {
    Site,
    Plane,
}

impl ObstructionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ObstructionLevel::Site => "site_level",
            ObstructionLevel::Plane => "plane_level",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObstructionRow {
    pub site_id: Option<String>,
    /// None for site-level rows
    pub building_id: Option<i64>,
    pub mounting_plane_id: Option<String>,
    pub obstruction_id: String,
    pub shape_type: String,
    pub feature_name: String,
    /// NaN when a site-level obstruction has no radius
    pub radius: f64,
    pub center_x: Option<f64>,
    pub center_y: Option<f64>,
    pub center_z: Option<f64>,
    pub level: ObstructionLevel,
}

impl TableRow for ObstructionRow {
    fn table() -> &'static TableSchema {
        &schema::OBSTRUCTIONS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.site_id.clone().into(),
            self.building_id.into(),
            self.mounting_plane_id.clone().into(),
            self.obstruction_id.clone().into(),
            self.shape_type.clone().into(),
            self.feature_name.clone().into(),
            self.radius.into(),
            self.center_x.into(),
            self.center_y.into(),
            self.center_z.into(),
            self.level.as_str().into(),
        ]
    }
}

// =============================================================================
// Accumulator
// =============================================================================

/// Row vectors for all six tables, in emission order
#[derive(Debug, Default)]
pub struct FlatRows {
    pub sites: Vec<SiteRow>,
    pub buildings: Vec<BuildingRow>,
    pub mounting_planes: Vec<MountingPlaneRow>,
    pub edges: Vec<EdgeRow>,
    pub penetrations: Vec<PenetrationRow>,
    pub obstructions: Vec<ObstructionRow>,
}

impl FlatRows {
    /// Append another document's rows, preserving order
    pub fn extend(&mut self, other: FlatRows) {
        self.sites.extend(other.sites);
        self.buildings.extend(other.buildings);
        self.mounting_planes.extend(other.mounting_planes);
        self.edges.extend(other.edges);
        self.penetrations.extend(other.penetrations);
        self.obstructions.extend(other.obstructions);
    }

    /// Row counts per table, in load order
    pub fn table_counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("sites", self.sites.len()),
            ("buildings", self.buildings.len()),
            ("mounting_planes", self.mounting_planes.len()),
            ("edges", self.edges.len()),
            ("penetrations", self.penetrations.len()),
            ("obstructions", self.obstructions.len()),
        ]
    }

    pub fn total(&self) -> u64 {
        self.table_counts().iter().map(|(_, n)| *n as u64).sum()
    }
}
