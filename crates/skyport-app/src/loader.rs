//! Loads every scene entity through a [`AssetSource`].

use std::path::{Path, PathBuf};

use skyport_config::AssetConfig;
use skyport_render::{AssetError, WgpuGraphics};
use skyport_scene::{Model, SceneAssets, Skybox};

/// Something that can turn asset files into scene handles.
pub trait AssetSource {
    fn load_model(&mut self, path: &Path) -> Result<Model, AssetError>;
    fn load_skybox(&mut self, faces: &[PathBuf; 6]) -> Result<Skybox, AssetError>;
}

impl AssetSource for WgpuGraphics {
    fn load_model(&mut self, path: &Path) -> Result<Model, AssetError> {
        WgpuGraphics::load_model(self, path)
    }

    fn load_skybox(&mut self, faces: &[PathBuf; 6]) -> Result<Skybox, AssetError> {
        WgpuGraphics::load_skybox(self, faces)
    }
}

/// Load the ground, the skybox and the six lit models.
///
/// Paths are resolved against the asset root. The first failure aborts
/// loading.
pub fn load_scene_assets(
    source: &mut dyn AssetSource,
    assets: &AssetConfig,
) -> Result<SceneAssets, AssetError> {
    let mut model = |path: &Path| source.load_model(&assets.resolve(path));

    let ground = model(&assets.ground)?;
    let shuttle = model(&assets.shuttle)?;
    let city = model(&assets.city)?;
    let freighter = model(&assets.freighter)?;
    let jet = model(&assets.jet)?;
    let ufo = model(&assets.ufo)?;
    let alien = model(&assets.alien)?;

    let faces = assets
        .skybox_faces
        .clone()
        .map(|face| assets.resolve(&face));
    let skybox = source.load_skybox(&faces)?;

    tracing::info!(root = %assets.root.display(), "Scene assets loaded");
    Ok(SceneAssets {
        ground,
        skybox,
        shuttle,
        city,
        freighter,
        jet,
        ufo,
        alien,
    })
}
