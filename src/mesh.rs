//! Mesh loading. Faces of an OBJ file are expanded into flat per-vertex records, three per
//! triangle, so the pipeline never deals with indices.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info};
use nalgebra::{vector, Vector3};
use obj::raw::object::Polygon;
use obj::raw::{parse_obj, RawObj};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("can't read mesh file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed obj data: {0}")]
    Parse(#[from] obj::ObjError),
    #[error("face {face} has {corners} corners, at least 3 needed")]
    TooFewCorners { face: usize, corners: usize },
    #[error("mesh has no faces")]
    Empty,
    #[error("interleaved buffer of length {0} is not made of whole triangles")]
    NotMultipleOfNine(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub position: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub tex: Vector3<f32>,
}

/// Triangle soup, vertex count is always a non-zero multiple of 3.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<MeshVertex>,
    min: Vector3<f32>,
    max: Vector3<f32>,
}

/// Corner of a polygon as indices into the obj attribute lists.
#[derive(Debug, Clone, Copy)]
struct Corner {
    position: usize,
    tex: Option<usize>,
    normal: Option<usize>,
}

fn corners(polygon: &Polygon) -> Vec<Corner> {
    return match polygon {
        Polygon::P(p) => p.iter().map(|&position| Corner { position, tex: None, normal: None }).collect(),
        Polygon::PT(pt) => pt
            .iter()
            .map(|&(position, tex)| Corner { position, tex: Some(tex), normal: None })
            .collect(),
        Polygon::PN(pn) => pn
            .iter()
            .map(|&(position, normal)| Corner { position, tex: None, normal: Some(normal) })
            .collect(),
        Polygon::PTN(ptn) => ptn
            .iter()
            .map(|&(position, tex, normal)| Corner { position, tex: Some(tex), normal: Some(normal) })
            .collect(),
    };
}

impl Mesh {
    /// Loads and validates an obj file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh, MeshError> {
        let path = path.as_ref();
        let mesh = Mesh::from_reader(BufReader::new(File::open(path)?))?;
        info!(
            "Loaded mesh {} - {} triangles, bounds {:?} .. {:?}",
            path.display(),
            mesh.triangle_count(),
            mesh.min.as_slice(),
            mesh.max.as_slice()
        );
        return Ok(mesh);
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Mesh, MeshError> {
        let raw = parse_obj(reader)?;
        return Mesh::from_raw(&raw);
    }

    fn from_raw(raw: &RawObj) -> Result<Mesh, MeshError> {
        let positions: Vec<Vector3<f32>> = raw.positions.iter().map(|&(x, y, z, _)| vector![x, y, z]).collect();
        let normals: Vec<Vector3<f32>> = raw.normals.iter().map(|&(x, y, z)| vector![x, y, z]).collect();
        let tex_coords: Vec<Vector3<f32>> = raw.tex_coords.iter().map(|&(u, v, w)| vector![u, v, w]).collect();

        let mut vertices = Vec::with_capacity(3 * raw.polygons.len());
        let mut fanned = 0;
        for (face, polygon) in raw.polygons.iter().enumerate() {
            let corners = corners(polygon);
            if corners.len() < 3 {
                return Err(MeshError::TooFewCorners { face, corners: corners.len() });
            }
            if corners.len() > 3 {
                fanned += 1;
            }

            // parse_obj rejects out of range indices, so plain indexing can't fail here.
            let mut resolved = Vec::with_capacity(corners.len());
            for corner in &corners {
                let position = positions[corner.position];
                let tex = match corner.tex {
                    Some(index) => tex_coords[index],
                    None => Vector3::zeros(),
                };
                let normal = corner.normal.map(|index| normals[index]);
                resolved.push((position, normal, tex));
            }

            // Missing normals are replaced with the flat normal of the face.
            let (a, b, c) = (resolved[0].0, resolved[1].0, resolved[2].0);
            let face_normal = (b - a).cross(&(c - a)).try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros);

            // Fan triangulation around the first corner.
            for i in 1..resolved.len() - 1 {
                for &(position, normal, tex) in [&resolved[0], &resolved[i], &resolved[i + 1]] {
                    vertices.push(MeshVertex {
                        position,
                        normal: normal.unwrap_or(face_normal),
                        tex,
                    });
                }
            }
        }
        if fanned > 0 {
            debug!("Fan triangulated {} polygons", fanned);
        }
        return Mesh::from_vertices(vertices);
    }

    /// Mesh from a flat position, normal, texcoord buffer, three entries per vertex.
    pub fn from_interleaved(buffer: &[Vector3<f32>]) -> Result<Mesh, MeshError> {
        if buffer.len() % 9 != 0 {
            return Err(MeshError::NotMultipleOfNine(buffer.len()));
        }
        let vertices = buffer
            .chunks_exact(3)
            .map(|record| MeshVertex {
                position: record[0],
                normal: record[1],
                tex: record[2],
            })
            .collect();
        return Mesh::from_vertices(vertices);
    }

    fn from_vertices(vertices: Vec<MeshVertex>) -> Result<Mesh, MeshError> {
        if vertices.is_empty() {
            return Err(MeshError::Empty);
        }
        let mut min = Vector3::repeat(f32::MAX);
        let mut max = Vector3::repeat(f32::MIN);
        for vertex in &vertices {
            min = min.inf(&vertex.position);
            max = max.sup(&vertex.position);
        }
        return Ok(Mesh { vertices, min, max });
    }

    pub fn vertices(&self) -> &[MeshVertex] {
        return &self.vertices[..];
    }

    pub fn triangle_count(&self) -> usize {
        return self.vertices.len() / 3;
    }

    /// Axis aligned bounds, (min, max).
    pub fn bounds(&self) -> (Vector3<f32>, Vector3<f32>) {
        return (self.min, self.max);
    }
}
