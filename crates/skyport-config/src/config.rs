//! Configuration structs with sensible defaults and RON persistence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Camera placement and motion.
    pub camera: CameraConfig,
    /// Projection, clear color, lighting and fog.
    pub render: RenderConfig,
    /// Stepped entity animation and the presentation sequence.
    pub animation: AnimationConfig,
    /// Model and skybox locations.
    pub assets: AssetConfig,
    /// Input settings.
    pub input: InputConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Initial camera pose and per-frame motion parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial eye position.
    pub eye: [f32; 3],
    /// Initial look target.
    pub target: [f32; 3],
    /// Up vector used to derive the initial right axis.
    pub up: [f32; 3],
    /// Distance moved per frame while a movement key is held.
    pub move_speed: f32,
    /// Degrees of rotation per pixel of pointer motion.
    pub mouse_sensitivity: f32,
    /// Starting pitch in degrees.
    pub initial_pitch: f32,
    /// Starting yaw in degrees (-90 looks down -Z).
    pub initial_yaw: f32,
    /// Pitch is clamped to `[-pitch_limit, pitch_limit]` degrees.
    pub pitch_limit: f32,
    /// Half-extent of the box the camera may move in. `None` disables the guard.
    pub move_bounds: Option<f32>,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Framebuffer clear color (linear RGB).
    pub clear_color: [f32; 3],
    /// Whether fog starts enabled.
    pub fog: bool,
    /// Direction towards the light, before any user rotation.
    pub light_dir: [f32; 3],
    /// Light color.
    pub light_color: [f32; 3],
}

/// Bounds and step of a key-driven sawtooth oscillator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OscillatorConfig {
    /// Starting offset.
    pub initial: f32,
    /// Lower wrap limit.
    pub lower: f32,
    /// Upper wrap limit.
    pub upper: f32,
    /// Offset change per step.
    pub step: f32,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            initial: 0.0,
            lower: -1.0,
            upper: 1.0,
            step: 0.1,
        }
    }
}

/// Timing of the scripted descend-then-orbit camera sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PresentationConfig {
    /// Vertical offset subtracted per descending frame.
    pub descent_step: f32,
    /// The orbit starts once the offset drops below `-descent_limit`.
    pub descent_limit: f32,
    /// Number of one-degree orbit frames before the sequence ends.
    pub orbit_steps: u32,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            descent_step: 0.05,
            descent_limit: 1.0,
            orbit_steps: 360,
        }
    }
}

/// Entity animation parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Freighter slides along X.
    pub freighter: OscillatorConfig,
    /// Alien slides along Y.
    pub alien: OscillatorConfig,
    /// Shuttle orbit advance per frame, in degrees.
    pub shuttle_spin_deg: f32,
    /// Light yaw change per frame while a light key is held, in degrees.
    pub light_step_deg: f32,
    /// Presentation sequence timing.
    pub presentation: PresentationConfig,
}

/// Model and skybox asset locations. Relative paths resolve against `root`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory all other asset paths are relative to.
    pub root: PathBuf,
    /// Ground plane model.
    pub ground: PathBuf,
    /// Orbiting transport shuttle.
    pub shuttle: PathBuf,
    /// City backdrop.
    pub city: PathBuf,
    /// Sliding freighter. The default keeps the asset pack's `freigther`
    /// spelling.
    pub freighter: PathBuf,
    /// Toggleable combat jet.
    pub jet: PathBuf,
    /// Stationary UFO.
    pub ufo: PathBuf,
    /// Sliding alien.
    pub alien: PathBuf,
    /// Skybox faces in cube layer order: +X, -X, +Y, -Y, +Z, -Z.
    pub skybox_faces: [PathBuf; 6],
}

/// Input configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Keybinding overrides (action name -> key name).
    pub keybindings: HashMap<String, String>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            vsync: true,
            title: "Skyport Viewer".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 0.0, 3.0],
            target: [0.0, 0.0, -10.0],
            up: [0.0, 1.0, 0.0],
            move_speed: 0.1,
            mouse_sensitivity: 0.5,
            initial_pitch: 0.0,
            initial_yaw: -90.0,
            pitch_limit: 89.0,
            move_bounds: Some(100.0),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 45.0,
            near: 0.1,
            far: 1000.0,
            clear_color: [0.7, 0.7, 0.7],
            fog: false,
            light_dir: [0.0, 1.0, 1.0],
            light_color: [1.0, 1.0, 1.0],
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            freighter: OscillatorConfig {
                initial: -3.0,
                lower: -3.9,
                upper: 3.9,
                step: 0.1,
            },
            alien: OscillatorConfig {
                initial: 0.9,
                lower: -1.0,
                upper: 0.9,
                step: 0.07,
            },
            shuttle_spin_deg: 0.2,
            light_step_deg: 1.0,
            presentation: PresentationConfig::default(),
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        let model = |dir: &str, file: &str| Path::new("models").join(dir).join(file);
        let face = |name: &str| Path::new("textures").join("skybox").join(name);
        Self {
            root: PathBuf::from("assets"),
            ground: model("grass", "grass.obj"),
            shuttle: model("transport_shuttle", "TransportShuttle_obj.obj"),
            city: model("city", "Nimbasa.obj"),
            // The shipped asset tree spells it "freigther".
            freighter: model("freigther", "Freigther_BI_Export.obj"),
            jet: model("combat_jet", "Futuristic_combat_jet.obj"),
            ufo: model("ufo", "ufo.obj"),
            alien: model("alien", "elite_static.obj"),
            skybox_faces: [
                face("right.tga"),
                face("left.tga"),
                face("top.tga"),
                face("bottom.tga"),
                face("back.tga"),
                face("front.tga"),
            ],
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl AssetConfig {
    /// Resolve an asset path against [`root`](Self::root).
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Reject values the viewer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.render.near > 0.0 && self.render.far > self.render.near) {
            return Err(ConfigError::Invalid {
                field: "render.far",
                reason: format!(
                    "clip planes must satisfy 0 < near < far (near={}, far={})",
                    self.render.near, self.render.far
                ),
            });
        }
        if !(self.render.fov_y_deg > 0.0 && self.render.fov_y_deg < 180.0) {
            return Err(ConfigError::Invalid {
                field: "render.fov_y_deg",
                reason: format!("must be inside (0, 180), got {}", self.render.fov_y_deg),
            });
        }
        check_oscillator("animation.freighter", &self.animation.freighter)?;
        check_oscillator("animation.alien", &self.animation.alien)?;

        let presentation = &self.animation.presentation;
        if presentation.descent_step <= 0.0 || presentation.descent_limit <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "animation.presentation",
                reason: "descent_step and descent_limit must be positive".to_string(),
            });
        }
        if presentation.orbit_steps == 0 {
            return Err(ConfigError::Invalid {
                field: "animation.presentation.orbit_steps",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0.0..90.0).contains(&self.camera.pitch_limit) {
            return Err(ConfigError::Invalid {
                field: "camera.pitch_limit",
                reason: format!("must be inside [0, 90), got {}", self.camera.pitch_limit),
            });
        }
        if let Some(bounds) = self.camera.move_bounds
            && bounds <= 0.0
        {
            return Err(ConfigError::Invalid {
                field: "camera.move_bounds",
                reason: format!("must be positive, got {bounds}"),
            });
        }
        Ok(())
    }
}

fn check_oscillator(field: &'static str, osc: &OscillatorConfig) -> Result<(), ConfigError> {
    if osc.lower >= osc.upper {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("lower ({}) must be below upper ({})", osc.lower, osc.upper),
        });
    }
    if osc.step <= 0.0 {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("step must be positive, got {}", osc.step),
        });
    }
    Ok(())
}
