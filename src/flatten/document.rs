//! Typed shape of one site-model input document.
//!
//! Requiredness follows the upstream feed: fields the loader reads
//! unconditionally have no default and make serde reject the document
//! when absent, which surfaces as a malformed-file error for that file.
//! Optional collections accept both a missing key and an explicit null
//! as "no items".

use serde::Deserialize;
use serde_json::Value;

fn f64_nan() -> f64 {
    f64::NAN
}

/// Angle fields carry -1.0 when the document omits them, so a missing
/// pitch stays distinguishable from a genuine zero-degree pitch.
fn angle_sentinel() -> f64 {
    -1.0
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Option<String>,
    pub installation_id: Option<String>,
    pub date_created: Option<String>,
    pub version: Option<String>,
    pub external_site_model_source_id: Option<String>,
    #[serde(default)]
    pub site_model: SiteModel,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteModel {
    pub units: Option<Units>,
    pub north_vector: Option<NullableVector3>,
    pub heading_vector: Option<NullableVector3>,
    pub obstructions: Option<Vec<SiteObstruction>>,
    pub buildings: Option<Vec<Building>>,
}

#[derive(Debug, Deserialize)]
pub struct Units {
    pub length: Option<String>,
    pub angle: Option<String>,
    pub area: Option<String>,
}

/// Vector with components the feed may omit entirely; a missing
/// component stays NULL rather than turning into NaN.
#[derive(Debug, Deserialize)]
pub struct NullableVector3 {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

/// Vector the feed guarantees as an object; missing components are NaN.
#[derive(Debug, Deserialize)]
pub struct Vector3 {
    #[serde(default = "f64_nan")]
    pub x: f64,
    #[serde(default = "f64_nan")]
    pub y: f64,
    #[serde(default = "f64_nan")]
    pub z: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteObstruction {
    pub id: String,
    pub shape_type: String,
    pub feature_name: String,
    #[serde(default = "f64_nan")]
    pub radius: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub is_primary_building: Option<bool>,
    pub total_roof_area: Option<f64>,
    pub mounting_planes: Option<Vec<MountingPlane>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountingPlane {
    pub id: Option<String>,
    pub area: Option<f64>,
    #[serde(default = "angle_sentinel")]
    pub pitch_angle: f64,
    #[serde(default = "angle_sentinel")]
    pub azimuth_angle: f64,
    pub centroid: Option<NullableVector3>,
    pub azimuth_vector: Vector3,
    pub coordinate_system: CoordinateSystem,
    pub polygon: Polygon,
    pub penetrations: Option<Vec<Penetration>>,
    pub obstructions: Option<Vec<PlaneObstruction>>,
    pub roof_material_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinateSystem {
    pub x_axis: Vector3,
    pub y_axis: Vector3,
    pub z_axis: Vector3,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Polygon {
    pub exterior_ring: ExteriorRing,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExteriorRing {
    pub winding_direction: Option<String>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub start_point: Vector3,
    pub end_point: Vector3,
    /// Opaque in this pipeline; stored as JSON text.
    pub bearing_vector: Option<Value>,
    #[serde(default = "f64_nan")]
    pub angle_between_bearing_vector_and_up_vector: f64,
    #[serde(default = "f64_nan")]
    pub angle_between_bearing_vector_and_right_vector: f64,
    pub edge_condition: Option<String>,
    pub siding_material: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Penetration {
    pub id: String,
    pub obstruction_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaneObstruction {
    pub id: String,
    pub shape_type: String,
    pub center: NullableVector3,
    pub radius: f64,
}
