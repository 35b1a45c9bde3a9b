//! In-memory mesh and its load-time processing.
//!
//! A [`Mesh`] is built once from a [`MeshData`] (what a parser hands over)
//! and never changes afterwards. Building it:
//!
//! 1. drops face indices that point outside the vertex buffer, and faces
//!    left with fewer than three indices;
//! 2. computes face normals unless one per face was supplied;
//! 3. accumulates vertex normals from incident faces unless one per vertex
//!    was supplied;
//! 4. centers the model at the origin and scales its largest extent to 2.

use std::path::Path;

use crate::math::vec3::Vec3;

/// Errors raised while turning parser output into a [`Mesh`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{name} buffer length {len} is not a multiple of 3")]
    MalformedBuffer { name: &'static str, len: usize },

    #[error("failed to load OBJ file: {0}")]
    Obj(#[from] tobj::LoadError),
}

/// Raw geometry as produced by a parser.
///
/// All buffers are flat `f32` triples. Face indices are 0-based.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices_actual: Vec<f32>,
    /// One normal per vertex, or empty to have them computed.
    pub vertex_normals: Vec<f32>,
    /// One normal per face, or empty to have them computed.
    pub face_normals: Vec<f32>,
    pub faces: Vec<Vec<usize>>,
}

/// Counts and source dimensions reported to the UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshStats {
    pub vertex_count: usize,
    pub face_count: usize,
    /// Number of normals supplied by the source (0 if they were computed).
    pub normal_count: usize,
    /// Bounding-box extents before normalization.
    pub dimensions: Vec3,
}

/// The normalization applied at load time: `v' = (v - center) * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshMetadata {
    pub center: Vec3,
    pub dimensions: Vec3,
    pub scale: f32,
}

/// A polygon as an ordered list of vertex indices (at least three).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    indices: Vec<usize>,
}

impl Face {
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Fan triangulation from the first vertex. Assumes a convex polygon.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let first = self.indices[0];
        self.indices
            .windows(2)
            .skip(1)
            .map(move |pair| [first, pair[0], pair[1]])
    }

    /// Undirected edges around the polygon boundary.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.indices.len();
        (0..n).map(move |i| (self.indices[i], self.indices[(i + 1) % n]))
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vec3>,
    vertex_normals: Vec<Vec3>,
    face_normals: Vec<Vec3>,
    faces: Vec<Face>,
    metadata: MeshMetadata,
    stats: MeshStats,
}

/// `|a × b| / (|a| |b|)` below this marks a face as degenerate.
const DEGENERATE_SINE: f32 = 1e-4;

impl Mesh {
    pub fn from_data(data: MeshData) -> Result<Self, LoadError> {
        check_stride("vertex", &data.vertices_actual)?;
        check_stride("vertex normal", &data.vertex_normals)?;
        check_stride("face normal", &data.face_normals)?;
        Ok(Self::from_checked(data))
    }

    /// Builds a mesh from buffers whose lengths are known to be multiples
    /// of 3.
    fn from_checked(data: MeshData) -> Self {

        let mut vertices: Vec<Vec3> = data
            .vertices_actual
            .chunks_exact(3)
            .map(|v| Vec3::new(v[0], v[1], v[2]))
            .collect();
        let vertex_count = vertices.len();

        let supplied_face_normals = data.face_normals.len() / 3 == data.faces.len();
        let mut faces = Vec::with_capacity(data.faces.len());
        let mut face_normals = Vec::with_capacity(data.faces.len());
        for (i, indices) in data.faces.iter().enumerate() {
            let indices: Vec<usize> = indices
                .iter()
                .copied()
                .filter(|&v| v < vertex_count)
                .collect();
            if indices.len() < 3 {
                continue;
            }
            let normal = if supplied_face_normals {
                Vec3::from_slice(&data.face_normals, i).normalize()
            } else {
                face_normal(&vertices, &indices)
            };
            faces.push(Face { indices });
            face_normals.push(normal);
        }
        let dropped = data.faces.len() - faces.len();
        if dropped > 0 {
            log::warn!("dropped {} faces with fewer than 3 valid indices", dropped);
        }

        let supplied_vertex_normals = data.vertex_normals.len() / 3 == vertex_count;
        let vertex_normals = if supplied_vertex_normals {
            (0..vertex_count)
                .map(|i| Vec3::from_slice(&data.vertex_normals, i).normalize())
                .collect()
        } else {
            accumulate_vertex_normals(&vertices, &faces)
        };

        let metadata = normalize(&mut vertices);

        let stats = MeshStats {
            vertex_count,
            face_count: faces.len(),
            normal_count: data.vertex_normals.len() / 3,
            dimensions: metadata.dimensions,
        };

        log::debug!(
            "mesh built: {} vertices, {} faces, scale {:.4}",
            stats.vertex_count,
            stats.face_count,
            metadata.scale
        );

        Self {
            vertices,
            vertex_normals,
            face_normals,
            faces,
            metadata,
            stats,
        }
    }

    /// Loads every object of an OBJ file into a single mesh.
    ///
    /// Faces are kept as polygons (no triangulation). OBJ normals are indexed
    /// separately from positions; each position takes the normal of the last
    /// face corner that references it.
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let options = tobj::LoadOptions {
            single_index: false,
            triangulate: false,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };
        let (models, _materials) = tobj::load_obj(path.as_ref(), &options)?;

        let mut data = MeshData::default();
        let mut normals: Vec<Option<[f32; 3]>> = Vec::new();
        for model in &models {
            let mesh = &model.mesh;
            let offset = data.vertices_actual.len() / 3;
            data.vertices_actual.extend_from_slice(&mesh.positions);
            normals.resize(data.vertices_actual.len() / 3, None);

            let mut cursor = 0;
            let arities = face_arities(mesh);
            for arity in arities {
                let corners = cursor..cursor + arity;
                cursor += arity;
                let Some(indices) = mesh.indices.get(corners.clone()) else {
                    break;
                };
                data.faces
                    .push(indices.iter().map(|&i| i as usize + offset).collect());

                if let Some(normal_indices) = mesh.normal_indices.get(corners) {
                    for (&vi, &ni) in indices.iter().zip(normal_indices) {
                        let n = ni as usize * 3;
                        let slot = normals.get_mut(vi as usize + offset);
                        if let (Some(slot), Some(n)) = (slot, mesh.normals.get(n..n + 3)) {
                            *slot = Some([n[0], n[1], n[2]]);
                        }
                    }
                }
            }
        }

        // Only hand over normals when every vertex received one; otherwise
        // they are recomputed from the faces.
        if !normals.is_empty() && normals.iter().all(Option::is_some) {
            data.vertex_normals = normals.into_iter().flatten().flatten().collect();
        }

        log::info!(
            "loaded {} object(s) from {}",
            models.len(),
            path.as_ref().display()
        );
        Self::from_data(data)
    }

    /// The reference cube: 8 corners at ±1 and 6 counter-clockwise quads.
    pub fn cube() -> Self {
        let data = MeshData {
            vertices_actual: CUBE_VERTICES.iter().flat_map(|v| v.to_array()).collect(),
            faces: CUBE_FACES.iter().map(|f| f.to_vec()).collect(),
            ..Default::default()
        };
        Self::from_checked(data)
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn vertex_normals(&self) -> &[Vec3] {
        &self.vertex_normals
    }

    pub fn face_normals(&self) -> &[Vec3] {
        &self.face_normals
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn metadata(&self) -> MeshMetadata {
        self.metadata
    }

    pub fn stats(&self) -> MeshStats {
        self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Positions as a flat stride-3 buffer.
    pub fn positions_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.to_array()).collect()
    }

    /// Current (post-normalization) bounding-box extents.
    pub fn extents(&self) -> Vec3 {
        bounds(&self.vertices)
            .map(|(min, max)| max - min)
            .unwrap_or(Vec3::ZERO)
    }

    /// Center of the current bounding box.
    pub fn bounds_center(&self) -> Vec3 {
        bounds(&self.vertices)
            .map(|(min, max)| (min + max) * 0.5)
            .unwrap_or(Vec3::ZERO)
    }
}

const CUBE_VERTICES: [Vec3; 8] = [
    Vec3::new(-1.0, -1.0, -1.0),
    Vec3::new(1.0, -1.0, -1.0),
    Vec3::new(1.0, 1.0, -1.0),
    Vec3::new(-1.0, 1.0, -1.0),
    Vec3::new(-1.0, -1.0, 1.0),
    Vec3::new(1.0, -1.0, 1.0),
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(-1.0, 1.0, 1.0),
];

const CUBE_FACES: [[usize; 4]; 6] = [
    [4, 5, 6, 7], // front  (+Z)
    [1, 0, 3, 2], // back   (-Z)
    [5, 1, 2, 6], // right  (+X)
    [0, 4, 7, 3], // left   (-X)
    [7, 6, 2, 3], // top    (+Y)
    [0, 1, 5, 4], // bottom (-Y)
];

fn check_stride(name: &'static str, buffer: &[f32]) -> Result<(), LoadError> {
    if buffer.len() % 3 == 0 {
        Ok(())
    } else {
        Err(LoadError::MalformedBuffer {
            name,
            len: buffer.len(),
        })
    }
}

/// Corner count of each face; tobj leaves `face_arities` empty when every
/// face is a triangle.
fn face_arities(mesh: &tobj::Mesh) -> Vec<usize> {
    if mesh.face_arities.is_empty() {
        vec![3; mesh.indices.len() / 3]
    } else {
        mesh.face_arities.iter().map(|&a| a as usize).collect()
    }
}

/// Unit normal of the face's first triangle, or [`Vec3::UP`] when that
/// triangle is degenerate.
fn face_normal(vertices: &[Vec3], indices: &[usize]) -> Vec3 {
    let v0 = vertices[indices[0]];
    let a = vertices[indices[1]] - v0;
    let b = vertices[indices[2]] - v0;
    let cross = a.cross(b);
    let scale = a.magnitude() * b.magnitude();
    if scale <= 0.0 || cross.magnitude() / scale < DEGENERATE_SINE {
        Vec3::UP
    } else {
        cross.normalize()
    }
}

/// Sums each face's unnormalized area vector into its vertices, so larger
/// faces weigh more, then normalizes.
fn accumulate_vertex_normals(vertices: &[Vec3], faces: &[Face]) -> Vec<Vec3> {
    let mut sums = vec![Vec3::ZERO; vertices.len()];
    for face in faces {
        let area: Vec3 = face
            .triangles()
            .map(|[a, b, c]| (vertices[b] - vertices[a]).cross(vertices[c] - vertices[a]))
            .fold(Vec3::ZERO, |acc, n| acc + n);
        for &i in face.indices() {
            sums[i] += area;
        }
    }
    sums.into_iter()
        .map(|n| n.normalize_or(Vec3::UP))
        .collect()
}

fn bounds(vertices: &[Vec3]) -> Option<(Vec3, Vec3)> {
    let first = *vertices.first()?;
    Some(
        vertices
            .iter()
            .fold((first, first), |(min, max), v| (min.min(*v), max.max(*v))),
    )
}

/// Centers the vertices at the origin and scales the largest extent to 2.
fn normalize(vertices: &mut [Vec3]) -> MeshMetadata {
    let Some((min, max)) = bounds(vertices) else {
        return MeshMetadata {
            center: Vec3::ZERO,
            dimensions: Vec3::ZERO,
            scale: 1.0,
        };
    };

    let center = (min + max) * 0.5;
    let dimensions = max - min;
    let max_range = dimensions.max_component();
    let scale = if max_range > 0.0 { 2.0 / max_range } else { 1.0 };

    for v in vertices.iter_mut() {
        *v = (*v - center) * scale;
    }

    MeshMetadata {
        center,
        dimensions,
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Axis-aligned box with the given corner and extents, as 8 vertices and
    /// 6 quads.
    fn box_data(origin: Vec3, size: Vec3) -> MeshData {
        let vertices: Vec<f32> = CUBE_VERTICES
            .iter()
            .flat_map(|c| {
                let unit = (*c + Vec3::ONE) * 0.5;
                [
                    origin.x + unit.x * size.x,
                    origin.y + unit.y * size.y,
                    origin.z + unit.z * size.z,
                ]
            })
            .collect();
        MeshData {
            vertices_actual: vertices,
            faces: CUBE_FACES.iter().map(|f| f.to_vec()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn unit_cube_stats() {
        let mesh = Mesh::cube();
        let stats = mesh.stats();
        assert_eq!(stats.vertex_count, 8);
        assert_eq!(stats.face_count, 6);
        assert_eq!(stats.normal_count, 0);
        assert_relative_eq!(mesh.extents(), Vec3::new(2.0, 2.0, 2.0));
        assert_relative_eq!(mesh.metadata().scale, 1.0);
    }

    #[test]
    fn asymmetric_box_normalizes_largest_axis_to_two() {
        let data = box_data(Vec3::new(10.0, -3.0, 5.0), Vec3::new(1.0, 2.0, 4.0));
        let mesh = Mesh::from_data(data).unwrap();

        assert_relative_eq!(mesh.extents(), Vec3::new(0.5, 1.0, 2.0), epsilon = 1e-6);
        assert_relative_eq!(mesh.bounds_center(), Vec3::ZERO, epsilon = 1e-6);

        let meta = mesh.metadata();
        assert_relative_eq!(meta.dimensions, Vec3::new(1.0, 2.0, 4.0), epsilon = 1e-6);
        assert_relative_eq!(meta.center, Vec3::new(10.5, -2.0, 7.0), epsilon = 1e-6);
        assert_relative_eq!(meta.scale, 0.5);
        assert_eq!(mesh.stats().dimensions, meta.dimensions);
    }

    #[test]
    fn single_point_keeps_unit_scale() {
        let data = MeshData {
            vertices_actual: vec![3.0, 3.0, 3.0],
            ..Default::default()
        };
        let mesh = Mesh::from_data(data).unwrap();
        assert_eq!(mesh.metadata().scale, 1.0);
        assert_eq!(mesh.vertices()[0], Vec3::ZERO);
        assert!(mesh.is_empty());
    }

    #[test]
    fn invalid_faces_are_dropped() {
        let data = MeshData {
            vertices_actual: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            faces: vec![vec![0, 1, 2], vec![0, 1, 9], vec![0, 1], vec![0, 7, 1, 2]],
            ..Default::default()
        };
        let mesh = Mesh::from_data(data).unwrap();
        assert_eq!(mesh.stats().face_count, 2);
        // The out-of-range index is filtered, the remaining three survive.
        assert_eq!(mesh.faces()[1].indices(), &[0, 1, 2]);
        assert_eq!(mesh.face_normals().len(), 2);
    }

    #[test]
    fn malformed_buffer_is_rejected() {
        let data = MeshData {
            vertices_actual: vec![0.0, 1.0],
            ..Default::default()
        };
        assert!(matches!(
            Mesh::from_data(data),
            Err(LoadError::MalformedBuffer { len: 2, .. })
        ));
    }

    #[test]
    fn computed_normals_point_outward_and_are_unit() {
        let mesh = Mesh::cube();
        assert_relative_eq!(mesh.face_normals()[0], Vec3::Z, epsilon = 1e-6);
        assert_relative_eq!(mesh.face_normals()[4], Vec3::Y, epsilon = 1e-6);

        for (v, n) in mesh.vertices().iter().zip(mesh.vertex_normals()) {
            assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-5);
            // Corner normals point along the corner's diagonal.
            assert_relative_eq!(*n, v.normalize(), epsilon = 1e-5);
        }
    }

    #[test]
    fn degenerate_face_gets_up_normal() {
        let data = MeshData {
            vertices_actual: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0],
            faces: vec![vec![0, 1, 2]],
            ..Default::default()
        };
        let mesh = Mesh::from_data(data).unwrap();
        assert_eq!(mesh.face_normals()[0], Vec3::UP);
        assert!(mesh.vertex_normals().iter().all(|n| *n == Vec3::UP));
    }

    #[test]
    fn supplied_normals_are_kept_and_normalized() {
        let mut data = box_data(Vec3::ZERO, Vec3::ONE);
        data.vertex_normals = (0..8).flat_map(|_| [0.0, 0.0, 2.0]).collect();
        let mesh = Mesh::from_data(data).unwrap();
        assert_eq!(mesh.stats().normal_count, 8);
        assert!(mesh.vertex_normals().iter().all(|n| *n == Vec3::Z));
    }

    #[test]
    fn quad_fans_into_two_triangles() {
        let face = Face {
            indices: vec![4, 5, 6, 7],
        };
        let tris: Vec<_> = face.triangles().collect();
        assert_eq!(tris, vec![[4, 5, 6], [4, 6, 7]]);
        let edges: Vec<_> = face.edges().collect();
        assert_eq!(edges, vec![(4, 5), (5, 6), (6, 7), (7, 4)]);
    }
}
