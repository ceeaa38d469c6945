//! Turns one validated site-model document into rows for the six
//! relational tables.

pub mod document;
pub mod rows;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use document::{Building, Document, MountingPlane, PlaneObstruction};
pub use rows::{
    BuildingRow, EdgeRow, FlatRows, MountingPlaneRow, ObstructionLevel, ObstructionRow,
    PenetrationRow, SiteRow, SqlValue, TableRow,
};

/// When plane-level obstructions are collected.
///
/// The gated mode only scans a plane's obstructions while that plane also
/// carries a penetrations array, which silently drops obstructions on
/// penetration-free planes. The independent mode scans them on every plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObstructionScan {
    #[default]
    PenetrationGated,
    Independent,
}

#[derive(Debug, Clone, Default)]
pub struct FlattenOptions {
    pub obstruction_scan: ObstructionScan,
}

#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("document does not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("unrecognized dateCreated value: {value:?}")]
    InvalidTimestamp { value: String },
}

/// Flatten a single document into relational rows.
///
/// The whole document either flattens or faults; a fault emits no rows at
/// all, so a rejected file never contributes a partial site. Every row
/// carries the document's site id, and `etlUpdatedDate` is captured once
/// here so site and building rows from one document share a stamp.
pub fn flatten(doc: &Value, options: &FlattenOptions) -> Result<FlatRows, FlattenError> {
    let document: Document = serde_json::from_value(doc.clone())?;
    let stamp = Utc::now();

    let date_created = match document.date_created.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(parse_timestamp(raw).ok_or_else(|| FlattenError::InvalidTimestamp {
            value: raw.to_string(),
        })?),
    };

    let mut rows = FlatRows::default();
    let site_id = &document.id;
    let model = &document.site_model;
    let units = model.units.as_ref();

    rows.sites.push(SiteRow {
        site_id: site_id.clone(),
        installation_id: document.installation_id.clone(),
        date_created,
        version: document.version.clone(),
        length_unit: units.and_then(|u| u.length.clone()),
        angle_unit: units.and_then(|u| u.angle.clone()),
        area_unit: units.and_then(|u| u.area.clone()),
        north_vector_x: model.north_vector.as_ref().and_then(|v| v.x),
        north_vector_y: model.north_vector.as_ref().and_then(|v| v.y),
        north_vector_z: model.north_vector.as_ref().and_then(|v| v.z),
        heading_vector_x: model.heading_vector.as_ref().and_then(|v| v.x),
        heading_vector_y: model.heading_vector.as_ref().and_then(|v| v.y),
        heading_vector_z: model.heading_vector.as_ref().and_then(|v| v.z),
        external_site_model_source_id: document.external_site_model_source_id.clone(),
        etl_updated_date: stamp,
    });

    for obstruction in model.obstructions.iter().flatten() {
        rows.obstructions.push(ObstructionRow {
            site_id: site_id.clone(),
            building_id: None,
            mounting_plane_id: None,
            obstruction_id: obstruction.id.clone(),
            shape_type: obstruction.shape_type.clone(),
            feature_name: obstruction.feature_name.clone(),
            radius: obstruction.radius,
            center_x: None,
            center_y: None,
            center_z: None,
            level: ObstructionLevel::Site,
        });
    }

    for (index, building) in model.buildings.iter().flatten().enumerate() {
        let building_id = index as i64 + 1;
        flatten_building(&mut rows, site_id, building_id, building, stamp, options);
    }

    Ok(rows)
}

fn flatten_building(
    rows: &mut FlatRows,
    site_id: &Option<String>,
    building_id: i64,
    building: &Building,
    stamp: DateTime<Utc>,
    options: &FlattenOptions,
) {
    rows.buildings.push(BuildingRow {
        site_id: site_id.clone(),
        building_id,
        is_primary_building: building.is_primary_building,
        total_roof_area: building.total_roof_area,
        etl_updated_date: stamp,
    });

    for plane in building.mounting_planes.iter().flatten() {
        flatten_plane(rows, site_id, building_id, plane, options);
    }
}

fn flatten_plane(
    rows: &mut FlatRows,
    site_id: &Option<String>,
    building_id: i64,
    plane: &MountingPlane,
    options: &FlattenOptions,
) {
    let centroid = plane.centroid.as_ref();
    let axes = &plane.coordinate_system;
    let ring = &plane.polygon.exterior_ring;

    rows.mounting_planes.push(MountingPlaneRow {
        site_id: site_id.clone(),
        building_id,
        mounting_plane_id: plane.id.clone(),
        area: plane.area,
        pitch_angle: plane.pitch_angle,
        azimuth_angle: plane.azimuth_angle,
        centroid_x: centroid.and_then(|c| c.x),
        centroid_y: centroid.and_then(|c| c.y),
        centroid_z: centroid.and_then(|c| c.z),
        azimuth_vector_x: plane.azimuth_vector.x,
        azimuth_vector_y: plane.azimuth_vector.y,
        azimuth_vector_z: plane.azimuth_vector.z,
        x_axis_x: axes.x_axis.x,
        x_axis_y: axes.x_axis.y,
        x_axis_z: axes.x_axis.z,
        y_axis_x: axes.y_axis.x,
        y_axis_y: axes.y_axis.y,
        y_axis_z: axes.y_axis.z,
        z_axis_x: axes.z_axis.x,
        z_axis_y: axes.z_axis.y,
        z_axis_z: axes.z_axis.z,
        winding_direction: ring.winding_direction.clone(),
        roof_material_type: plane.roof_material_type.clone(),
    });

    // Edge rows carry no mounting plane id; downstream joins rely on
    // site and building alone, and changing that would break them.
    for edge in &ring.edges {
        rows.edges.push(EdgeRow {
            site_id: site_id.clone(),
            building_id,
            edge_id: edge.id.clone(),
            start_point_x: edge.start_point.x,
            start_point_y: edge.start_point.y,
            start_point_z: edge.start_point.z,
            end_point_x: edge.end_point.x,
            end_point_y: edge.end_point.y,
            end_point_z: edge.end_point.z,
            bearing_vector: edge.bearing_vector.clone(),
            angle_to_up_vector: edge.angle_between_bearing_vector_and_up_vector,
            angle_to_right_vector: edge.angle_between_bearing_vector_and_right_vector,
            edge_condition: edge.edge_condition.clone(),
            siding_material: edge.siding_material.clone(),
        });
    }

    for penetration in plane.penetrations.iter().flatten() {
        rows.penetrations.push(PenetrationRow {
            site_id: site_id.clone(),
            building_id,
            mounting_plane_id: plane.id.clone(),
            penetration_id: penetration.id.clone(),
            obstruction_id: penetration.obstruction_id.clone(),
        });
    }

    let scan_obstructions = plane.penetrations.is_some()
        || options.obstruction_scan == ObstructionScan::Independent;
    if scan_obstructions {
        for obstruction in plane.obstructions.iter().flatten() {
            rows.obstructions
                .push(plane_obstruction_row(site_id, building_id, plane, obstruction));
        }
    }
}

fn plane_obstruction_row(
    site_id: &Option<String>,
    building_id: i64,
    plane: &MountingPlane,
    obstruction: &PlaneObstruction,
) -> ObstructionRow {
    ObstructionRow {
        site_id: site_id.clone(),
        building_id: Some(building_id),
        mounting_plane_id: plane.id.clone(),
        obstruction_id: obstruction.id.clone(),
        shape_type: obstruction.shape_type.clone(),
        // Plane-level obstructions carry no feature name in the feed.
        feature_name: obstruction.shape_type.clone(),
        radius: obstruction.radius,
        center_x: obstruction.center.x,
        center_y: obstruction.center.y,
        center_z: obstruction.center.z,
        level: ObstructionLevel::Plane,
    }
}

/// Parse the `dateCreated` forms seen in the feed: RFC 3339 with an
/// offset or `Z`, a naive timestamp with optional fraction, or a bare
/// date taken as midnight UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    None
}
