use glam::DVec3;
use std::f64::consts::PI;

/// Convert geographic coordinates in degrees to a point on the unit sphere.
///
/// The Z axis is negated so the seam lines up with the globe texture's
/// UV layout (see [`crate::mesh_data`]); keep it that way.
pub fn project(latitude: f64, longitude: f64) -> DVec3 {
    let phi = (90.0 - latitude) * (PI / 180.0);
    let theta = (longitude + 180.0) * (PI / 180.0);

    DVec3::new(
        phi.sin() * theta.cos(),
        phi.cos(),
        -phi.sin() * theta.sin(),
    )
}

/// Where a marker's label sits: the surface point pushed outward by `offset`.
pub fn label_anchor(position: DVec3, offset: f64) -> DVec3 {
    position * offset
}
