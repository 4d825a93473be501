use crate::projection::project;

/// Raw globe mesh that can be uploaded by any rendering engine
#[derive(Debug, Clone)]
pub struct GlobeMeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl GlobeMeshData {
    /// Latitude/longitude grid over the sphere of `radius`.
    ///
    /// Vertices come from [`project`], so markers and the equirectangular
    /// texture share one convention: `u = (lng + 180) / 360`,
    /// `v = (90 - lat) / 180`. The seam column is duplicated to give it both
    /// u = 0 and u = 1.
    pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);

        let vertex_count = ((segments + 1) * (rings + 1)) as usize;
        let mut positions = Vec::with_capacity(vertex_count);
        let mut normals = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::with_capacity(vertex_count);
        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);

        for ring in 0..=rings {
            let v = ring as f32 / rings as f32;
            let latitude = 90.0 - f64::from(v) * 180.0;

            for segment in 0..=segments {
                let u = segment as f32 / segments as f32;
                let longitude = f64::from(u) * 360.0 - 180.0;

                let normal = project(latitude, longitude).as_vec3();
                let position = normal * radius;

                positions.push([position.x, position.y, position.z]);
                normals.push([normal.x, normal.y, normal.z]);
                uvs.push([u, v]);
            }
        }

        // rows run north to south, columns west to east; both triangles are
        // counter-clockwise seen from outside
        for ring in 0..rings {
            for segment in 0..segments {
                let first = ring * (segments + 1) + segment;
                let second = first + segments + 1;

                indices.extend_from_slice(&[first, second, first + 1]);
                indices.extend_from_slice(&[second, second + 1, first + 1]);
            }
        }

        Self {
            positions,
            normals,
            uvs,
            indices,
        }
    }
}
