//! Per-frame orchestration: input, then the view, then the ordered draws.

use glam::{Mat4, Vec3};
use skyport_camera::{
    MouseLook, MoveDirection, OrientationModel, PerspectiveProjection, Presentation,
};
use skyport_config::Config;
use skyport_input::{Action, ActionState};

use crate::animation::{Oscillator, StepDirection};
use crate::drawable::{Drawable, SceneAssets};
use crate::graphics::{GraphicsApi, ScenePrograms};
use crate::layout::{DRAW_ORDER, Entity, EntityLayout, normal_matrix};
use crate::lighting::LightRig;
use crate::shader::{LitShader, ShaderBinding, ShaderError, SkyboxShader};
use crate::toggles::RenderToggles;

/// Owns every piece of mutable viewer state.
///
/// One call to [`frame`](Self::frame) is one full mutate-then-render pass:
/// resolved input is applied first, then the view is fixed for the frame and
/// every entity is drawn in [`DRAW_ORDER`].
pub struct Viewer {
    camera: OrientationModel,
    look: MouseLook,
    projection: PerspectiveProjection,
    presentation: Presentation,
    freighter: Oscillator,
    alien: Oscillator,
    toggles: RenderToggles,
    light: LightRig,
    shuttle_spin_deg: f32,
    shuttle_spin_step: f32,
    move_speed: f32,
    lit: LitShader,
    skybox: SkyboxShader,
    assets: SceneAssets,
    quit: bool,
}

impl Viewer {
    /// Link the shader bindings and upload the uniforms that only change on
    /// demand (projection, light, fog).
    pub fn new(
        config: &Config,
        programs: ScenePrograms,
        assets: SceneAssets,
        gfx: &mut dyn GraphicsApi,
        width: u32,
        height: u32,
    ) -> Result<Self, ShaderError> {
        let lit = LitShader::link(gfx, programs.lit)?;
        let skybox = SkyboxShader::link(gfx, programs.skybox)?;

        let cam = &config.camera;
        let mut camera = OrientationModel::new(
            Vec3::from_array(cam.eye),
            Vec3::from_array(cam.target),
            Vec3::from_array(cam.up),
        );
        if let Some(bounds) = cam.move_bounds {
            camera = camera.with_bounds(bounds);
        }
        let look = MouseLook::new(
            cam.initial_pitch,
            cam.initial_yaw,
            cam.mouse_sensitivity,
            cam.pitch_limit,
        );

        let render = &config.render;
        let anim = &config.animation;
        let viewer = Self {
            camera,
            look,
            projection: PerspectiveProjection::new(
                render.fov_y_deg,
                render.near,
                render.far,
                width,
                height,
            ),
            presentation: Presentation::new(
                anim.presentation.descent_step,
                anim.presentation.descent_limit,
                anim.presentation.orbit_steps,
            ),
            freighter: Oscillator::from_config(&anim.freighter),
            alien: Oscillator::from_config(&anim.alien),
            toggles: RenderToggles::new(render.fog),
            light: LightRig::new(
                Vec3::from_array(render.light_dir),
                Vec3::from_array(render.light_color),
                anim.light_step_deg,
            ),
            shuttle_spin_deg: 0.0,
            shuttle_spin_step: anim.shuttle_spin_deg,
            move_speed: cam.move_speed,
            lit,
            skybox,
            assets,
            quit: false,
        };

        gfx.set_viewport(width.max(1), height.max(1));
        gfx.set_shading_mode(viewer.toggles.shading_mode());
        viewer.lit.bind(gfx);
        viewer.lit.set_view(gfx, viewer.camera.view_matrix());
        viewer.lit.set_projection(gfx, viewer.projection.matrix());
        viewer.lit.set_light_dir(gfx, viewer.light.direction());
        viewer.lit.set_light_color(gfx, viewer.light.color);
        viewer.lit.set_put_fog(gfx, viewer.toggles.fog());

        tracing::info!(width, height, "Viewer initialized");
        Ok(viewer)
    }

    /// Apply one frame of resolved input.
    ///
    /// Pointer motion is folded in first, then every firing action in
    /// [`Action::ALL`] order. Fog and light changes are pushed to the lit
    /// program immediately.
    pub fn apply_input(&mut self, actions: &ActionState, gfx: &mut dyn GraphicsApi) {
        self.look.apply(actions.look_delta(), &mut self.camera);

        for action in actions.fired() {
            match action {
                Action::MoveForward => self.step_camera(MoveDirection::Forward),
                Action::MoveBackward => self.step_camera(MoveDirection::Backward),
                Action::MoveLeft => self.step_camera(MoveDirection::Left),
                Action::MoveRight => self.step_camera(MoveDirection::Right),
                Action::RotateLightLeft => self.rotate_light(StepDirection::Decrease, gfx),
                Action::RotateLightRight => self.rotate_light(StepDirection::Increase, gfx),
                Action::AlienDown => {
                    self.alien.step(StepDirection::Decrease);
                }
                Action::AlienUp => {
                    self.alien.step(StepDirection::Increase);
                }
                Action::FreighterLeft => {
                    self.freighter.step(StepDirection::Decrease);
                }
                Action::FreighterRight => {
                    self.freighter.step(StepDirection::Increase);
                }
                Action::FogOn => self.set_fog(true, gfx),
                Action::FogOff => self.set_fog(false, gfx),
                Action::ToggleJet => {
                    self.toggles.toggle_jet();
                }
                Action::CycleShading => {
                    let mode = self.toggles.cycle_shading_mode();
                    gfx.set_shading_mode(mode);
                }
                Action::TogglePresentation => {
                    self.presentation.toggle();
                }
                Action::Quit => {
                    tracing::info!("Quit requested");
                    self.quit = true;
                }
            }
        }
    }

    fn step_camera(&mut self, direction: MoveDirection) {
        if !self.camera.move_by(direction, self.move_speed) {
            tracing::trace!(?direction, "Camera step blocked by bounds");
        }
    }

    fn rotate_light(&mut self, direction: StepDirection, gfx: &mut dyn GraphicsApi) {
        let dir = self.light.rotate(direction);
        self.lit.bind(gfx);
        self.lit.set_light_dir(gfx, dir);
    }

    fn set_fog(&mut self, enabled: bool, gfx: &mut dyn GraphicsApi) {
        if self.toggles.set_fog(enabled) {
            self.lit.bind(gfx);
            self.lit.set_put_fog(gfx, enabled);
        }
    }

    /// Track a framebuffer resize: projection, viewport, projection uniform.
    pub fn resize(&mut self, width: u32, height: u32, gfx: &mut dyn GraphicsApi) {
        self.projection.resize(width, height);
        let (width, height) = self.projection.size();
        gfx.set_viewport(width, height);
        self.lit.bind(gfx);
        self.lit.set_projection(gfx, self.projection.matrix());
        tracing::debug!(width, height, "Viewer resized");
    }

    /// Draw one frame.
    ///
    /// The view comes from the presentation when it is running and from the
    /// free camera otherwise. The shuttle spin advances once afterwards.
    pub fn render(&mut self, gfx: &mut dyn GraphicsApi) {
        let view = self.presentation.resolve_view(self.camera.view_matrix());
        let projection = self.projection.matrix();
        let layout = self.layout();

        self.lit.bind(gfx);
        self.lit.set_view(gfx, view);

        for entity in DRAW_ORDER {
            match entity {
                Entity::Skybox => {
                    self.assets
                        .skybox
                        .draw_with(gfx, &self.skybox, view, projection);
                    self.lit.bind(gfx);
                }
                Entity::Jet if !self.toggles.jet_visible() => {}
                _ => {
                    let Some(model) = self.assets.model(entity) else {
                        continue;
                    };
                    let model_matrix = layout.model_matrix(entity);
                    self.lit.set_model(gfx, model_matrix);
                    self.lit
                        .set_normal_matrix(gfx, normal_matrix(view, model_matrix));
                    model.draw(gfx);
                }
            }
        }

        self.shuttle_spin_deg += self.shuttle_spin_step;
    }

    /// Input then render.
    pub fn frame(&mut self, actions: &ActionState, gfx: &mut dyn GraphicsApi) {
        self.apply_input(actions, gfx);
        self.render(gfx);
    }

    /// Log every GPU error reported since the last call and keep going.
    /// Returns how many were drained.
    pub fn check_gpu_errors(&mut self, gfx: &mut dyn GraphicsApi) -> usize {
        let errors = gfx.drain_errors();
        for error in &errors {
            tracing::warn!(%error, "GPU error");
        }
        errors.len()
    }

    /// Whether the quit action has fired.
    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    fn layout(&self) -> EntityLayout {
        EntityLayout {
            shuttle_spin_deg: self.shuttle_spin_deg,
            freighter_x: self.freighter.offset(),
            alien_y: self.alien.offset(),
        }
    }

    /// View matrix of the free camera, ignoring the presentation.
    #[must_use]
    pub fn camera_view(&self) -> Mat4 {
        self.camera.view_matrix()
    }

    #[must_use]
    pub fn camera(&self) -> &OrientationModel {
        &self.camera
    }

    #[must_use]
    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    #[must_use]
    pub fn toggles(&self) -> &RenderToggles {
        &self.toggles
    }

    #[must_use]
    pub fn freighter(&self) -> &Oscillator {
        &self.freighter
    }

    #[must_use]
    pub fn alien(&self) -> &Oscillator {
        &self.alien
    }

    #[must_use]
    pub fn light(&self) -> &LightRig {
        &self.light
    }

    #[must_use]
    pub fn shuttle_spin_deg(&self) -> f32 {
        self.shuttle_spin_deg
    }

    #[must_use]
    pub fn projection(&self) -> &PerspectiveProjection {
        &self.projection
    }
}
