//! # Sample Configuration
//!
//! [`SampleConfig`] gathers every tunable constant of the sample in one place: animation speed,
//! camera placement, projection parameters, clear color and instance capacity. The defaults
//! reproduce the reference scene exactly; the application shell uses [`SampleConfig::default`].

use std::path::PathBuf;

use crate::camera::CameraMode;
use crate::error::RenderError;
use crate::instance::INSTANCE_BUFFER_LABEL;

/// How the global angle of the mobile advances on each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AngleAdvance {
    /// A fixed step per tick, independent of the elapsed time. Animation speed therefore
    /// follows the frame rate.
    PerTick(f32),
    /// Radians per second, scaled by the elapsed time of each tick.
    PerSecond(f32),
}

impl AngleAdvance {
    /// Angle increment for a tick that took `elapsed_time` seconds.
    pub fn step(&self, elapsed_time: f64) -> f32 {
        match *self {
            AngleAdvance::PerTick(step) => step,
            AngleAdvance::PerSecond(rate) => rate * elapsed_time as f32,
        }
    }
}

/// Tunable parameters of the instancing sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    /// Global angle of the mobile before the first tick, in radians.
    pub initial_angle: f32,
    /// How far the mobile turns on each tick.
    pub angle_advance: AngleAdvance,
    /// Distance between the camera and the origin for every camera mode.
    pub camera_distance: f32,
    /// Vertical field of view, in radians.
    pub fov_y: f32,
    /// Near clipping plane distance.
    pub near: f32,
    /// Far clipping plane distance.
    pub far: f32,
    /// Scale applied to the current time to spin every cube in place. Zero keeps the
    /// per-frame rotation matrix at identity.
    pub rotation_speed: f32,
    /// Linear clear color of the render target.
    pub clear_color: [f32; 4],
    /// Upper bound of the grid size slider. The instance buffer holds `max_grid_size³`
    /// transforms.
    pub max_grid_size: u32,
    /// Camera view selected at start-up.
    pub camera_mode: CameraMode,
    /// PNG used to texture the cube. A procedural texture is generated when unset.
    pub texture_path: Option<PathBuf>,
}

impl SampleConfig {
    /// Number of transforms the instance buffer is sized for.
    ///
    /// # Errors
    /// Fails with [`RenderError::InvalidBufferSize`] when `max_grid_size³` does not fit in
    /// `usize`.
    pub fn max_instances(&self) -> Result<usize, RenderError> {
        usize::try_from(self.max_grid_size)
            .ok()
            .and_then(|grid_size| grid_size.checked_pow(3))
            .ok_or(RenderError::InvalidBufferSize {
                label: INSTANCE_BUFFER_LABEL.to_owned(),
                size: u64::MAX,
                max: usize::MAX as u64,
            })
    }
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            initial_angle: std::f32::consts::FRAC_PI_4,
            angle_advance: AngleAdvance::PerTick(0.01),
            camera_distance: 40.0,
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 0.1,
            far: 100.0,
            rotation_speed: 0.0,
            clear_color: [0.35, 0.35, 0.35, 1.0],
            max_grid_size: 32,
            camera_mode: CameraMode::Default,
            texture_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_tick_advance_ignores_elapsed_time() {
        let advance = AngleAdvance::PerTick(0.01);
        assert_eq!(advance.step(0.0), 0.01);
        assert_eq!(advance.step(1.0 / 60.0), 0.01);
        assert_eq!(advance.step(5.0), 0.01);
    }

    #[test]
    fn per_second_advance_scales_with_elapsed_time() {
        let advance = AngleAdvance::PerSecond(0.6);
        approx::assert_relative_eq!(advance.step(0.5), 0.3);
        assert_eq!(advance.step(0.0), 0.0);
    }

    #[test]
    fn default_capacity_covers_full_grid() {
        let config = SampleConfig::default();
        assert_eq!(config.max_instances().unwrap(), 32 * 32 * 32);
    }

    #[test]
    fn oversized_grid_is_rejected_instead_of_overflowing() {
        let config = SampleConfig {
            max_grid_size: 1 << 22,
            ..SampleConfig::default()
        };
        let err = config.max_instances().unwrap_err();
        assert!(matches!(
            err,
            RenderError::InvalidBufferSize { ref label, .. } if label == INSTANCE_BUFFER_LABEL
        ));
    }
}
