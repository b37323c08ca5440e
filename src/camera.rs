//! # Camera Views
//!
//! The sample does not have a free camera. Instead it offers five fixed views of the mobile,
//! each one a fixed rotation followed by a push of the scene away from the viewer along +Z
//! (the projection is left-handed, so +Z points into the screen).

use std::f32::consts::FRAC_PI_2;

/// One of the five fixed camera views.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMode {
    /// Slightly elevated view of the whole mobile.
    #[default]
    Default,
    Front,
    Top,
    Side,
    Bottom,
}

impl CameraMode {
    /// All modes, in the order they are presented in the settings panel.
    pub const ALL: [CameraMode; 5] = [
        CameraMode::Default,
        CameraMode::Front,
        CameraMode::Top,
        CameraMode::Side,
        CameraMode::Bottom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CameraMode::Default => "Default",
            CameraMode::Front => "Front",
            CameraMode::Top => "Top",
            CameraMode::Side => "Side",
            CameraMode::Bottom => "Bottom",
        }
    }

    /// Maps the zero-based position in [`CameraMode::ALL`] back to a mode.
    pub fn from_index(index: usize) -> Option<CameraMode> {
        Self::ALL.get(index).copied()
    }

    /// The view matrix of this mode for a camera `distance` units away from the origin.
    pub fn view_matrix(self, distance: f32) -> nalgebra_glm::Mat4 {
        let translation = nalgebra_glm::translation(&nalgebra_glm::vec3(0.0, 0.0, distance));
        let identity = nalgebra_glm::Mat4::identity();
        let rotation = match self {
            CameraMode::Default => nalgebra_glm::rotate_x(&identity, -0.3),
            CameraMode::Front => identity,
            CameraMode::Top => nalgebra_glm::rotate_x(&identity, -FRAC_PI_2),
            CameraMode::Side => nalgebra_glm::rotate_y(&identity, FRAC_PI_2),
            CameraMode::Bottom => nalgebra_glm::rotate_x(&identity, FRAC_PI_2),
        };
        translation * rotation
    }
}

impl std::fmt::Display for CameraMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
