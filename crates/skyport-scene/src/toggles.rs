//! Render toggles flipped by discrete key presses.

/// Rasterization style applied to every lit draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadingMode {
    /// Filled triangles.
    #[default]
    Solid,
    /// Triangle edges only.
    Wireframe,
    /// Vertices only.
    Points,
    /// Filled triangles blended with `SrcAlpha / OneMinusDstAlpha`.
    SolidBlended,
}

impl ShadingMode {
    /// Every mode in cycle order.
    pub const ALL: [ShadingMode; 4] = [
        ShadingMode::Solid,
        ShadingMode::Wireframe,
        ShadingMode::Points,
        ShadingMode::SolidBlended,
    ];

    /// The mode after this one, wrapping back to [`ShadingMode::Solid`].
    #[must_use]
    pub fn next(self) -> ShadingMode {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Position in [`ShadingMode::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            ShadingMode::Solid => 0,
            ShadingMode::Wireframe => 1,
            ShadingMode::Points => 2,
            ShadingMode::SolidBlended => 3,
        }
    }
}

/// Shading mode, jet visibility and fog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderToggles {
    shading: ShadingMode,
    jet_visible: bool,
    fog: bool,
}

impl RenderToggles {
    /// Start in solid shading with the jet hidden.
    pub fn new(fog: bool) -> Self {
        Self {
            fog,
            ..Self::default()
        }
    }

    /// Advance to the next shading mode and return it.
    pub fn cycle_shading_mode(&mut self) -> ShadingMode {
        self.shading = self.shading.next();
        tracing::debug!(mode = ?self.shading, "Shading mode changed");
        self.shading
    }

    /// Flip jet visibility and return the new value.
    pub fn toggle_jet(&mut self) -> bool {
        self.jet_visible = !self.jet_visible;
        tracing::debug!(visible = self.jet_visible, "Jet visibility toggled");
        self.jet_visible
    }

    /// Set fog. Returns `true` when the value actually changed, which is when
    /// the caller has to push it to the shader.
    pub fn set_fog(&mut self, enabled: bool) -> bool {
        if self.fog == enabled {
            return false;
        }
        self.fog = enabled;
        tracing::debug!(enabled, "Fog changed");
        true
    }

    /// Current shading mode.
    #[must_use]
    pub fn shading_mode(&self) -> ShadingMode {
        self.shading
    }

    /// Whether the jet is drawn.
    #[must_use]
    pub fn jet_visible(&self) -> bool {
        self.jet_visible
    }

    /// Whether fog is on.
    #[must_use]
    pub fn fog(&self) -> bool {
        self.fog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_order() {
        let mut toggles = RenderToggles::default();
        assert_eq!(toggles.shading_mode(), ShadingMode::Solid);
        assert_eq!(toggles.cycle_shading_mode(), ShadingMode::Wireframe);
        assert_eq!(toggles.cycle_shading_mode(), ShadingMode::Points);
        assert_eq!(toggles.cycle_shading_mode(), ShadingMode::SolidBlended);
        assert_eq!(toggles.cycle_shading_mode(), ShadingMode::Solid);
    }

    #[test]
    fn test_four_cycles_return_to_start_from_any_mode() {
        for start in ShadingMode::ALL {
            let mut mode = start;
            for _ in 0..4 {
                mode = mode.next();
            }
            assert_eq!(mode, start);
        }
    }

    #[test]
    fn test_toggle_jet_flips() {
        let mut toggles = RenderToggles::default();
        assert!(!toggles.jet_visible());
        assert!(toggles.toggle_jet());
        assert!(!toggles.toggle_jet());
    }

    #[test]
    fn test_set_fog_reports_change() {
        let mut toggles = RenderToggles::new(false);
        assert!(toggles.set_fog(true));
        assert!(!toggles.set_fog(true), "setting the same value is not a change");
        assert!(toggles.fog());
        assert!(toggles.set_fog(false));
        assert!(!toggles.fog());
    }
}
