//! Mesh data for collision
//!
//! Reads Wavefront OBJ files down to what the physics core needs: vertex
//! positions grouped into sub-meshes, each with its local bounding box.
//! Texture coordinates, normals and materials are skipped.
//!
//! Supports:
//! - Vertex positions (v)
//! - Faces (f) with `v`, `v/vt`, `v//vn` and `v/vt/vn` tokens
//! - 1-based and negative (relative) indices
//! - Sub-mesh breaks on `o`, `g` and `usemtl`

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tremor_math::Vec3;
use tremor_physics::{Aabb, CollisionShape, MeshCollider};

use crate::asset_error::AssetError;

/// Positions of one sub-mesh
#[derive(Clone, Debug, PartialEq)]
pub struct SubMesh {
    /// Object or group name (empty when the file has none)
    pub name: String,
    /// Unique positions referenced by the sub-mesh's faces, in first-use order
    pub positions: Vec<Vec3>,
    /// Tight local bounds of `positions`
    pub bounds: Aabb,
}

/// A model's geometry as seen by the physics core
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub sub_meshes: Vec<SubMesh>,
}

impl MeshData {
    /// Load an OBJ file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AssetError::NotFound(path.display().to_string()));
        }
        let mesh = Self::from_reader(File::open(path)?)?;
        log::debug!(
            "loaded {} ({} sub-meshes, {} vertices)",
            path.display(),
            mesh.sub_meshes.len(),
            mesh.vertex_count()
        );
        Ok(mesh)
    }

    /// Parse OBJ text
    pub fn parse_obj(source: &str) -> Result<Self, AssetError> {
        Self::from_reader(source.as_bytes())
    }

    /// Parse OBJ data from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AssetError> {
        let reader = BufReader::new(reader);

        let mut positions: Vec<Vec3> = Vec::new();
        let mut groups: Vec<GroupBuilder> = vec![GroupBuilder::new(String::new())];

        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line?;
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let mut parts = line.split_whitespace();
            let Some(kind) = parts.next() else {
                continue;
            };

            match kind {
                "v" => {
                    let coords = parts
                        .take(3)
                        .map(|p| p.parse::<f32>())
                        .collect::<Result<Vec<f32>, _>>()
                        .map_err(|e| AssetError::parse(line_no, format!("bad vertex: {}", e)))?;
                    if coords.len() < 3 {
                        return Err(AssetError::parse(line_no, "vertex needs 3 coordinates"));
                    }
                    if !coords.iter().all(|c| c.is_finite()) {
                        return Err(AssetError::parse(line_no, "vertex coordinate is not finite"));
                    }
                    positions.push(Vec3::new(coords[0], coords[1], coords[2]));
                }
                "f" => {
                    let tokens: Vec<&str> = parts.collect();
                    if tokens.len() < 3 {
                        return Err(AssetError::parse(line_no, "face has fewer than 3 vertices"));
                    }
                    let group = groups.last_mut().ok_or_else(|| AssetError::parse(line_no, "no group"))?;
                    for token in tokens {
                        let index = resolve_index(token, positions.len(), line_no)?;
                        group.push(index);
                    }
                }
                "o" | "g" => {
                    let name = parts.collect::<Vec<_>>().join(" ");
                    groups.push(GroupBuilder::new(name));
                }
                "usemtl" => {
                    // A material switch starts a new sub-mesh under the same name
                    let name = groups.last().map(|g| g.name.clone()).unwrap_or_default();
                    groups.push(GroupBuilder::new(name));
                }
                // Ignore other records (vt, vn, mtllib, s, l, etc.)
                _ => {}
            }
        }

        let sub_meshes = groups
            .into_iter()
            .filter_map(|group| group.finish(&positions))
            .collect();

        Ok(Self { sub_meshes })
    }

    /// Single box-shaped sub-mesh centered on the origin
    pub fn cuboid(half_extents: Vec3) -> Self {
        let bounds = Aabb::from_center_half_extents(Vec3::ZERO, half_extents.abs());
        Self {
            sub_meshes: vec![SubMesh {
                name: "cuboid".to_string(),
                positions: bounds.corners().to_vec(),
                bounds,
            }],
        }
    }

    /// Total number of positions over all sub-meshes
    pub fn vertex_count(&self) -> usize {
        self.sub_meshes.iter().map(|m| m.positions.len()).sum()
    }

    /// Union of sub-mesh bounds (zero-extent box when there are none)
    pub fn bounds(&self) -> Aabb {
        self.sub_meshes
            .iter()
            .map(|m| m.bounds)
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or_default()
    }

    /// Build the collision shape; one hierarchy per sub-mesh
    pub fn to_collision_shape(&self) -> CollisionShape {
        CollisionShape::new(
            self.sub_meshes
                .iter()
                .map(|m| MeshCollider::with_bounds(&m.positions, m.bounds))
                .collect(),
        )
    }
}

/// Sub-mesh under construction: referenced position indices
struct GroupBuilder {
    name: String,
    indices: Vec<usize>,
    seen: HashSet<usize>,
}

impl GroupBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            indices: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn push(&mut self, index: usize) {
        if self.seen.insert(index) {
            self.indices.push(index);
        }
    }

    /// Empty groups yield nothing
    fn finish(self, positions: &[Vec3]) -> Option<SubMesh> {
        let points: Vec<Vec3> = self.indices.iter().map(|&i| positions[i]).collect();
        let bounds = Aabb::from_points(&points)?;
        Some(SubMesh {
            name: self.name,
            positions: points,
            bounds,
        })
    }
}

/// Zero-based position index of a face token (`7`, `7/2`, `7//3`, `-1/...`)
fn resolve_index(token: &str, defined: usize, line_no: usize) -> Result<usize, AssetError> {
    let raw = token.split('/').next().unwrap_or_default();
    let value: i64 = raw
        .parse()
        .map_err(|_| AssetError::parse(line_no, format!("bad face index '{}'", token)))?;

    let resolved = match value {
        v if v > 0 => Some(v - 1),
        v if v < 0 => Some(defined as i64 + v),
        _ => None,
    };

    match resolved {
        Some(i) if i >= 0 && (i as usize) < defined => Ok(i as usize),
        _ => Err(AssetError::parse(
            line_no,
            format!("face index {} out of range ({} vertices defined)", value, defined),
        )),
    }
}
