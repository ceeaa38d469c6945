//! Destination table definitions for the six flattened site-model tables

use super::types::*;

pub static SITES: TableSchema = TableSchema {
    name: "sites",
    columns: &[
        Column::new("site_id", ColumnType::Text),
        Column::new("installationId", ColumnType::Text),
        Column::new("dateCreated", ColumnType::Timestamp),
        Column::new("version", ColumnType::Text),
        Column::new("length_unit", ColumnType::Text),
        Column::new("angle_unit", ColumnType::Text),
        Column::new("area_unit", ColumnType::Text),
        Column::new("northVector_x", ColumnType::Real),
        Column::new("northVector_y", ColumnType::Real),
        Column::new("northVector_z", ColumnType::Real),
        Column::new("headingVector_x", ColumnType::Real),
        Column::new("headingVector_y", ColumnType::Real),
        Column::new("headingVector_z", ColumnType::Real),
        Column::new("externalSiteModelSourceId", ColumnType::Text),
        Column::required("etlUpdatedDate", ColumnType::Timestamp),
    ],
};

pub static BUILDINGS: TableSchema = TableSchema {
    name: "buildings",
    columns: &[
        Column::new("site_id", ColumnType::Text),
        Column::required("building_id", ColumnType::Integer),
        Column::new("is_primary_building", ColumnType::Boolean),
        Column::new("total_roof_area", ColumnType::Real),
        Column::required("etlUpdatedDate", ColumnType::Timestamp),
    ],
};

pub static MOUNTING_PLANES: TableSchema = TableSchema {
    name: "mounting_planes",
    columns: &[
        Column::new("site_id", ColumnType::Text),
        Column::required("building_id", ColumnType::Integer),
        Column::new("mounting_plane_id", ColumnType::Text),
        Column::new("area", ColumnType::Real),
        Column::new("pitch_angle", ColumnType::Real),
        Column::new("azimuth_angle", ColumnType::Real),
        Column::new("centroid_x", ColumnType::Real),
        Column::new("centroid_y", ColumnType::Real),
        Column::new("centroid_z", ColumnType::Real),
        Column::new("azimuthVector_x", ColumnType::Real),
        Column::new("azimuthVector_y", ColumnType::Real),
        Column::new("azimuthVector_z", ColumnType::Real),
        Column::new("coordinateSystem_x_Axis_x", ColumnType::Real),
        Column::new("coordinateSystem_x_Axis_y", ColumnType::Real),
        Column::new("coordinateSystem_x_Axis_z", ColumnType::Real),
        Column::new("coordinateSystem_y_Axis_x", ColumnType::Real),
        Column::new("coordinateSystem_y_Axis_y", ColumnType::Real),
        Column::new("coordinateSystem_y_Axis_z", ColumnType::Real),
        Column::new("coordinateSystem_z_Axis_x", ColumnType::Real),
        Column::new("coordinateSystem_z_Axis_y", ColumnType::Real),
        Column::new("coordinateSystem_z_Axis_z", ColumnType::Real),
        Column::new("polygon_exteriorRing_windingDirection", ColumnType::Text),
        Column::new("roof_material_type", ColumnType::Text),
    ],
};

pub static EDGES: TableSchema = TableSchema {
    name: "edges",
    columns: &[
        Column::new("site_id", ColumnType::Text),
        Column::required("building_id", ColumnType::Integer),
        Column::required("edge_id", ColumnType::Text),
        Column::new("startPoint_x", ColumnType::Real),
        Column::new("startPoint_y", ColumnType::Real),
        Column::new("startPoint_z", ColumnType::Real),
        Column::new("endPoint_x", ColumnType::Real),
        Column::new("endPoint_y", ColumnType::Real),
        Column::new("endPoint_z", ColumnType::Real),
        Column::new("bearingVector", ColumnType::Json),
        Column::new("angleBetweenBearingVectorAndUpVector", ColumnType::Real),
        Column::new("angleBetweenBearingVectorAndRightVector", ColumnType::Real),
        Column::new("edgeCondition", ColumnType::Text),
        Column::new("sidingMaterial", ColumnType::Text),
    ],
};

pub static PENETRATIONS: TableSchema = TableSchema {
    name: "penetrations",
    columns: &[
        Column::new("site_id", ColumnType::Text),
        Column::required("building_id", ColumnType::Integer),
        Column::new("mounting_plane_id", ColumnType::Text),
        Column::required("penetration_id", ColumnType::Text),
        Column::required("obstructionId", ColumnType::Text),
    ],
};

pub static OBSTRUCTIONS: TableSchema = TableSchema {
    name: "obstructions",
    columns: &[
        Column::new("site_id", ColumnType::Text),
        Column::new("building_id", ColumnType::Integer),
        Column::new("mounting_plane_id", ColumnType::Text),
        Column::required("obstruction_id", ColumnType::Text),
        Column::required("shapeType", ColumnType::Text),
        Column::required("featureName", ColumnType::Text),
        Column::new("radius", ColumnType::Real),
        Column::new("center_x", ColumnType::Real),
        Column::new("center_y", ColumnType::Real),
        Column::new("center_z", ColumnType::Real),
        Column::required("level", ColumnType::Text),
    ],
};

// =============================================================================
// Schema Registry
// =============================================================================

/// All destination tables in load order
pub static ALL_TABLES: &[&TableSchema] = &[
    &SITES,
    &BUILDINGS,
    &MOUNTING_PLANES,
    &EDGES,
    &PENETRATIONS,
    &OBSTRUCTIONS,
];

/// Get table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// Get all table names
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}
