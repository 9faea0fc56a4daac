//! Scripted presentation flight: drop below the eye line, then orbit once.
//!
//! The sequence is a tagged state owned by the frame loop. Each frame it is
//! active, [`Presentation::resolve_view`] advances it by one tick and returns
//! the view that replaces the free camera's.

use glam::{Mat4, Vec3};

/// Presentation state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PresentationPhase {
    /// Not running. The free camera's view is used as is.
    Inactive,
    /// Translating the view down by a growing `offset` (<= 0).
    Descending {
        /// Current vertical translation applied to the view.
        offset: f32,
    },
    /// Rotating the lowered view around Y, one degree per frame.
    Orbiting {
        /// Degrees of rotation applied on the next frame.
        step: u32,
    },
}

/// Drives the descend-then-orbit sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    phase: PresentationPhase,
    descent_step: f32,
    descent_limit: f32,
    orbit_steps: u32,
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new(0.05, 1.0, 360)
    }
}

impl Presentation {
    /// `descent_step` per frame until the offset passes `-descent_limit`, then
    /// `orbit_steps` frames of orbit.
    pub fn new(descent_step: f32, descent_limit: f32, orbit_steps: u32) -> Self {
        Self {
            phase: PresentationPhase::Inactive,
            descent_step,
            descent_limit,
            orbit_steps,
        }
    }

    /// Start the sequence. Ignored while it is already running, since the
    /// only way out of a running sequence is to finish it. Returns whether
    /// the sequence started.
    pub fn toggle(&mut self) -> bool {
        if self.is_active() {
            tracing::debug!("Presentation already running, toggle ignored");
            return false;
        }
        tracing::info!("Presentation started");
        self.phase = PresentationPhase::Descending { offset: 0.0 };
        true
    }

    /// Advance one frame and return the view to render with.
    ///
    /// * inactive: `base` unchanged
    /// * descending: `offset -= step`, view is `base * T(0, offset, 0)`;
    ///   switches to orbiting once the offset drops below `-limit`
    /// * orbiting: view is `base * T(0, -limit, 0) * Ry(step deg)`, then
    ///   `step += 1`; becomes inactive when `step` reaches the orbit length
    pub fn resolve_view(&mut self, base: Mat4) -> Mat4 {
        match self.phase {
            PresentationPhase::Inactive => base,
            PresentationPhase::Descending { offset } => {
                let offset = offset - self.descent_step;
                self.phase = if offset < -self.descent_limit {
                    tracing::debug!("Presentation descent complete, orbiting");
                    PresentationPhase::Orbiting { step: 0 }
                } else {
                    PresentationPhase::Descending { offset }
                };
                base * Mat4::from_translation(Vec3::new(0.0, offset, 0.0))
            }
            PresentationPhase::Orbiting { step } => {
                let view = base
                    * Mat4::from_translation(Vec3::new(0.0, -self.descent_limit, 0.0))
                    * Mat4::from_rotation_y((step as f32).to_radians());
                let next = step + 1;
                self.phase = if next >= self.orbit_steps {
                    tracing::info!("Presentation finished");
                    PresentationPhase::Inactive
                } else {
                    PresentationPhase::Orbiting { step: next }
                };
                view
            }
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> PresentationPhase {
        self.phase
    }

    /// Whether the sequence overrides the view.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase != PresentationPhase::Inactive
    }

    /// Descent offset: negative while descending, the full drop while
    /// orbiting, 0 when inactive.
    #[must_use]
    pub fn descent_offset(&self) -> f32 {
        match self.phase {
            PresentationPhase::Inactive => 0.0,
            PresentationPhase::Descending { offset } => offset,
            PresentationPhase::Orbiting { .. } => -self.descent_limit,
        }
    }

    /// Orbit degrees applied so far (0 unless orbiting).
    #[must_use]
    pub fn orbit_step(&self) -> u32 {
        match self.phase {
            PresentationPhase::Orbiting { step } => step,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Mat4 {
        Mat4::look_at_rh(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, 2.0), Vec3::Y)
    }

    #[test]
    fn test_inactive_returns_base() {
        let mut show = Presentation::default();
        assert_eq!(show.resolve_view(base()), base());
        assert_eq!(show.phase(), PresentationPhase::Inactive);
    }

    #[test]
    fn test_descends_for_exactly_twenty_ticks() {
        let mut show = Presentation::default();
        assert!(show.toggle());
        for tick in 1..=19 {
            show.resolve_view(base());
            assert!(
                matches!(show.phase(), PresentationPhase::Descending { .. }),
                "left descent early at tick {tick}"
            );
        }
        show.resolve_view(base());
        assert_eq!(show.phase(), PresentationPhase::Orbiting { step: 0 });
    }

    #[test]
    fn test_descent_view_translates_down() {
        let mut show = Presentation::default();
        show.toggle();
        let view = show.resolve_view(base());
        let expected = base() * Mat4::from_translation(Vec3::new(0.0, -0.05, 0.0));
        assert!(view.abs_diff_eq(expected, 1e-6));
        assert!((show.descent_offset() + 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_full_cycle_resets() {
        let mut show = Presentation::default();
        show.toggle();
        for _ in 0..20 {
            show.resolve_view(base());
        }
        for tick in 0..360 {
            assert_eq!(show.orbit_step(), tick);
            show.resolve_view(base());
        }
        assert_eq!(show.phase(), PresentationPhase::Inactive);
        assert_eq!(show.descent_offset(), 0.0);
        assert_eq!(show.orbit_step(), 0);
        assert!(!show.is_active());
    }

    #[test]
    fn test_orbit_view_rotates_lowered_base() {
        let mut show = Presentation::default();
        show.toggle();
        for _ in 0..20 {
            show.resolve_view(base());
        }
        let lowered = base() * Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0));
        let first = show.resolve_view(base());
        assert!(first.abs_diff_eq(lowered, 1e-6));
        let second = show.resolve_view(base());
        let expected = lowered * Mat4::from_rotation_y(1.0_f32.to_radians());
        assert!(second.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_toggle_ignored_while_running() {
        let mut show = Presentation::default();
        assert!(show.toggle());
        show.resolve_view(base());
        assert!(!show.toggle());
        assert!((show.descent_offset() + 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_can_restart_after_finish() {
        let mut show = Presentation::new(0.5, 1.0, 2);
        show.toggle();
        // -0.5, -1.0 (not below the limit yet), -1.5
        for _ in 0..3 {
            show.resolve_view(base());
        }
        assert_eq!(show.phase(), PresentationPhase::Orbiting { step: 0 });
        show.resolve_view(base());
        show.resolve_view(base());
        assert!(!show.is_active());
        assert!(show.toggle());
    }
}
