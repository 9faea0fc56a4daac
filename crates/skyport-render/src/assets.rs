//! Decoding of model and skybox files into upload-ready data.
//!
//! Nothing here touches the GPU, so everything is testable without a device.

use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::buffer::{VertexPosition, VertexPositionNormalColor};

/// Errors raised while reading scene assets.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// The OBJ file could not be read or parsed.
    #[error("failed to load model {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    /// The OBJ file parsed but holds no triangles.
    #[error("model {path} contains no geometry")]
    EmptyModel { path: PathBuf },

    /// A skybox face could not be decoded.
    #[error("failed to load skybox face {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A skybox face is not square.
    #[error("skybox face {path} is {width}x{height}, faces must be square")]
    NonSquareFace {
        path: PathBuf,
        width: u32,
        height: u32,
    },

    /// A skybox face differs in size from the first face.
    #[error("skybox face {path} is {actual}px, expected {expected}px like the first face")]
    FaceSizeMismatch {
        path: PathBuf,
        expected: u32,
        actual: u32,
    },
}

/// One OBJ object with its material color baked into the vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub label: String,
    pub vertices: Vec<VertexPositionNormalColor>,
    pub indices: Vec<u32>,
}

/// Diffuse color used when a mesh has no material.
pub const DEFAULT_DIFFUSE: [f32; 3] = [0.8, 0.8, 0.8];

/// Load every object in an OBJ file.
///
/// Faces are triangulated. Objects without normals get flat face normals
/// (their vertices are unshared so each triangle keeps its own normal). A
/// missing or broken material library is logged and the default diffuse
/// color is used.
pub fn load_obj(path: &Path) -> Result<Vec<MeshData>, AssetError> {
    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };

    let (models, materials) =
        tobj::load_obj(path, &load_options).map_err(|source| AssetError::Obj {
            path: path.to_path_buf(),
            source,
        })?;

    let materials = materials.unwrap_or_else(|e| {
        log::warn!("No usable materials for {}: {e}", path.display());
        Vec::new()
    });

    let meshes: Vec<MeshData> = models
        .iter()
        .filter(|model| !model.mesh.indices.is_empty())
        .map(|model| {
            let color = model
                .mesh
                .material_id
                .and_then(|id| materials.get(id))
                .and_then(|material| material.diffuse)
                .unwrap_or(DEFAULT_DIFFUSE);
            convert_mesh(&model.name, &model.mesh, color)
        })
        .collect();

    if meshes.is_empty() {
        return Err(AssetError::EmptyModel {
            path: path.to_path_buf(),
        });
    }

    log::debug!(
        "Loaded {} ({} meshes, {} triangles)",
        path.display(),
        meshes.len(),
        meshes.iter().map(|m| m.indices.len() / 3).sum::<usize>()
    );
    Ok(meshes)
}

fn position(mesh: &tobj::Mesh, index: usize) -> [f32; 3] {
    [
        mesh.positions[index * 3],
        mesh.positions[index * 3 + 1],
        mesh.positions[index * 3 + 2],
    ]
}

fn convert_mesh(name: &str, mesh: &tobj::Mesh, color: [f32; 3]) -> MeshData {
    let vertex_count = mesh.positions.len() / 3;
    let has_normals = mesh.normals.len() >= vertex_count * 3;

    if has_normals {
        let vertices = (0..vertex_count)
            .map(|i| VertexPositionNormalColor {
                position: position(mesh, i),
                normal: [
                    mesh.normals[i * 3],
                    mesh.normals[i * 3 + 1],
                    mesh.normals[i * 3 + 2],
                ],
                color,
            })
            .collect();
        return MeshData {
            label: name.to_string(),
            vertices,
            indices: mesh.indices.clone(),
        };
    }

    log::debug!("Mesh '{name}' has no normals, using face normals");
    let mut vertices = Vec::with_capacity(mesh.indices.len());
    for triangle in mesh.indices.chunks_exact(3) {
        let corners = [
            position(mesh, triangle[0] as usize),
            position(mesh, triangle[1] as usize),
            position(mesh, triangle[2] as usize),
        ];
        let normal = face_normal(corners);
        vertices.extend(corners.iter().map(|&p| VertexPositionNormalColor {
            position: p,
            normal,
            color,
        }));
    }
    let indices = (0..vertices.len() as u32).collect();
    MeshData {
        label: name.to_string(),
        vertices,
        indices,
    }
}

/// Counter-clockwise face normal. Degenerate triangles get +Y.
fn face_normal([a, b, c]: [[f32; 3]; 3]) -> [f32; 3] {
    let (a, b, c) = (Vec3::from(a), Vec3::from(b), Vec3::from(c));
    (b - a)
        .cross(c - a)
        .try_normalize()
        .unwrap_or(Vec3::Y)
        .to_array()
}

/// Six decoded skybox faces, RGBA8, in cube layer order +X, -X, +Y, -Y, +Z, -Z.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeFaces {
    /// Edge length of every face in pixels.
    pub size: u32,
    /// Face pixels concatenated in layer order.
    pub pixels: Vec<u8>,
}

impl CubeFaces {
    /// Pixels of layer `face`.
    pub fn face(&self, face: usize) -> &[u8] {
        let len = (self.size * self.size * 4) as usize;
        &self.pixels[face * len..(face + 1) * len]
    }
}

/// Decode and validate six skybox faces.
pub fn load_cube_faces(paths: &[PathBuf; 6]) -> Result<CubeFaces, AssetError> {
    let mut size = None;
    let mut pixels = Vec::new();

    for path in paths {
        let image = image::open(path)
            .map_err(|source| AssetError::Image {
                path: path.clone(),
                source,
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        if width != height {
            return Err(AssetError::NonSquareFace {
                path: path.clone(),
                width,
                height,
            });
        }
        match size {
            None => size = Some(width),
            Some(expected) if expected != width => {
                return Err(AssetError::FaceSizeMismatch {
                    path: path.clone(),
                    expected,
                    actual: width,
                });
            }
            Some(_) => {}
        }
        pixels.extend_from_slice(image.as_raw());
    }

    Ok(CubeFaces {
        size: size.unwrap_or(0),
        pixels,
    })
}

/// Cube of half-extent 1 around the origin, wound counter-clockwise as seen from inside.
pub fn skybox_cube() -> (Vec<VertexPosition>, Vec<u32>) {
    const CORNERS: [[f32; 3]; 8] = [
        [-1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0],
        [1.0, 1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
        [1.0, -1.0, 1.0],
        [1.0, 1.0, 1.0],
        [-1.0, 1.0, 1.0],
    ];
    const FACES: [[u32; 6]; 6] = [
        [1, 5, 6, 6, 2, 1],
        [4, 0, 3, 3, 7, 4],
        [3, 2, 6, 6, 7, 3],
        [4, 5, 1, 1, 0, 4],
        [5, 4, 7, 7, 6, 5],
        [0, 1, 2, 2, 3, 0],
    ];

    let vertices = CORNERS
        .iter()
        .map(|&position| VertexPosition { position })
        .collect();
    let indices = FACES.iter().flatten().copied().collect();
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const QUAD_WITH_NORMALS: &str = "\
mtllib quad.mtl
o quad
v -1 0 -1
v 1 0 -1
v 1 0 1
v -1 0 1
vn 0 1 0
usemtl red
f 1//1 4//1 3//1 2//1
";

    const QUAD_MTL: &str = "\
newmtl red
Kd 1.0 0.0 0.0
";

    const TRIANGLE_NO_NORMALS: &str = "\
o tri
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
";

    #[test]
    fn test_obj_bakes_material_color() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("quad.obj"), QUAD_WITH_NORMALS).unwrap();
        fs::write(dir.path().join("quad.mtl"), QUAD_MTL).unwrap();

        let meshes = load_obj(&dir.path().join("quad.obj")).unwrap();
        assert_eq!(meshes.len(), 1);
        let quad = &meshes[0];
        assert_eq!(quad.label, "quad");
        assert_eq!(quad.indices.len(), 6, "quad should triangulate into two faces");
        assert!(quad.vertices.iter().all(|v| v.color == [1.0, 0.0, 0.0]));
        assert!(quad.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_missing_material_uses_default_color() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("quad.obj"), QUAD_WITH_NORMALS).unwrap();

        let meshes = load_obj(&dir.path().join("quad.obj")).unwrap();
        assert!(meshes[0].vertices.iter().all(|v| v.color == DEFAULT_DIFFUSE));
    }

    #[test]
    fn test_face_normals_generated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tri.obj"), TRIANGLE_NO_NORMALS).unwrap();

        let meshes = load_obj(&dir.path().join("tri.obj")).unwrap();
        let tri = &meshes[0];
        assert_eq!(tri.vertices.len(), 3);
        assert_eq!(tri.indices, vec![0, 1, 2]);
        for v in &tri.vertices {
            assert!((Vec3::from(v.normal) - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_missing_obj_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_obj(&dir.path().join("nope.obj")).unwrap_err();
        assert!(matches!(err, AssetError::Obj { .. }));
    }

    #[test]
    fn test_obj_without_faces_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("points.obj"), "v 0 0 0\nv 1 0 0\n").unwrap();
        let err = load_obj(&dir.path().join("points.obj")).unwrap_err();
        assert!(matches!(err, AssetError::EmptyModel { .. }));
    }

    #[test]
    fn test_degenerate_face_normal_falls_back() {
        let n = face_normal([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        assert_eq!(n, [0.0, 1.0, 0.0]);
    }

    fn write_faces(dir: &Path, sizes: [(u32, u32); 6]) -> [PathBuf; 6] {
        let names = ["right", "left", "top", "bottom", "front", "back"];
        std::array::from_fn(|i| {
            let (w, h) = sizes[i];
            let path = dir.join(format!("{}.png", names[i]));
            image::RgbaImage::from_pixel(w, h, image::Rgba([i as u8, 0, 0, 255]))
                .save(&path)
                .unwrap();
            path
        })
    }

    #[test]
    fn test_cube_faces_in_layer_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_faces(dir.path(), [(4, 4); 6]);

        let faces = load_cube_faces(&paths).unwrap();
        assert_eq!(faces.size, 4);
        assert_eq!(faces.pixels.len(), 6 * 4 * 4 * 4);
        for layer in 0..6 {
            assert_eq!(faces.face(layer)[0], layer as u8);
        }
    }

    #[test]
    fn test_non_square_face_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut sizes = [(4, 4); 6];
        sizes[2] = (4, 8);
        let paths = write_faces(dir.path(), sizes);

        let err = load_cube_faces(&paths).unwrap_err();
        assert!(matches!(
            err,
            AssetError::NonSquareFace {
                width: 4,
                height: 8,
                ..
            }
        ));
    }

    #[test]
    fn test_mismatched_face_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut sizes = [(4, 4); 6];
        sizes[5] = (8, 8);
        let paths = write_faces(dir.path(), sizes);

        let err = load_cube_faces(&paths).unwrap_err();
        assert!(matches!(
            err,
            AssetError::FaceSizeMismatch {
                expected: 4,
                actual: 8,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_face_is_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = write_faces(dir.path(), [(4, 4); 6]);
        paths[0] = dir.path().join("missing.png");
        assert!(matches!(
            load_cube_faces(&paths).unwrap_err(),
            AssetError::Image { .. }
        ));
    }

    #[test]
    fn test_skybox_cube_winds_towards_centre() {
        let (vertices, indices) = skybox_cube();
        assert_eq!(vertices.len(), 8);
        assert_eq!(indices.len(), 36);
        // Counter-clockwise when seen from inside the cube.
        for tri in indices.chunks_exact(3) {
            let p = |i: u32| Vec3::from(vertices[i as usize].position);
            let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
            let normal = (b - a).cross(c - a);
            let centre = (a + b + c) / 3.0;
            assert!(normal.dot(centre) < 0.0);
        }
    }
}
