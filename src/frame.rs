//! # Frame Updater
//!
//! Owns the animation state of the sample and advances it once per tick. A tick:
//!
//! 1. advances the global angle of the mobile,
//! 2. regenerates the instance array and uploads it,
//! 3. picks the view matrix of the current [`CameraMode`],
//! 4. combines it with the surface pretransform and the projection into the view-projection
//!    matrix,
//! 5. computes the in-place rotation matrix.
//!
//! The derived matrices are left in [`FrameState`] for the renderer to upload.

use crate::backend::{BufferAllocator, ProjectionQueries};
use crate::camera::CameraMode;
use crate::config::{AngleAdvance, SampleConfig};
use crate::error::RenderError;
use crate::instance::InstanceBuffer;
use crate::layout;

/// Values the user edits through the settings panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneSettings {
    pub grid_size: u32,
    pub camera_mode: CameraMode,
}

/// Animation state and the matrices derived from it on the last tick.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    /// Rotation of the whole mobile about Y, in radians.
    pub angle: f32,
    pub settings: SceneSettings,
    pub view_proj: nalgebra_glm::Mat4,
    pub rotation: nalgebra_glm::Mat4,
}

/// Axis the camera looks along in view space.
const CAMERA_VIEW_AXIS: [f32; 3] = [0.0, 0.0, 1.0];

pub struct FrameUpdater {
    angle_advance: AngleAdvance,
    camera_distance: f32,
    fov_y: f32,
    near: f32,
    far: f32,
    rotation_speed: f32,
    state: FrameState,
    transforms: Vec<nalgebra_glm::Mat4>,
}

impl FrameUpdater {
    pub fn new(config: &SampleConfig) -> Self {
        Self {
            angle_advance: config.angle_advance,
            camera_distance: config.camera_distance,
            fov_y: config.fov_y,
            near: config.near,
            far: config.far,
            rotation_speed: config.rotation_speed,
            state: FrameState {
                angle: config.initial_angle,
                settings: SceneSettings {
                    grid_size: config.max_grid_size,
                    camera_mode: config.camera_mode,
                },
                view_proj: nalgebra_glm::Mat4::identity(),
                rotation: nalgebra_glm::Mat4::identity(),
            },
            transforms: Vec::with_capacity(layout::MOBILE.len()),
        }
    }

    pub fn state(&self) -> &FrameState {
        &self.state
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.state.settings
    }

    pub fn settings_mut(&mut self) -> &mut SceneSettings {
        &mut self.state.settings
    }

    /// Runs one tick. `current_time` and `elapsed_time` are in seconds.
    pub fn tick<R>(
        &mut self,
        device: &R,
        instances: &mut InstanceBuffer<R::Buffer>,
        current_time: f64,
        elapsed_time: f64,
    ) -> Result<(), RenderError>
    where
        R: BufferAllocator + ProjectionQueries + ?Sized,
    {
        // The angle only moves once the instances at the new angle are uploaded.
        let angle = self.state.angle + self.angle_advance.step(elapsed_time);
        self.upload_at(angle, device, instances)?;
        self.state.angle = angle;

        let view = self
            .state
            .settings
            .camera_mode
            .view_matrix(self.camera_distance);
        let [x, y, z] = CAMERA_VIEW_AXIS;
        let pretransform = device.surface_pretransform(&nalgebra_glm::vec3(x, y, z));
        let projection = device.adjusted_projection(self.fov_y, self.near, self.far);
        self.state.view_proj = projection * pretransform * view;

        let spin = current_time as f32 * self.rotation_speed;
        let identity = nalgebra_glm::Mat4::identity();
        self.state.rotation =
            nalgebra_glm::rotate_x(&identity, spin) * nalgebra_glm::rotate_y(&identity, spin);
        Ok(())
    }

    /// Uploads the mobile at the current angle without advancing it.
    pub fn populate<R>(
        &mut self,
        device: &R,
        instances: &mut InstanceBuffer<R::Buffer>,
    ) -> Result<(), RenderError>
    where
        R: BufferAllocator + ?Sized,
    {
        self.upload_at(self.state.angle, device, instances)
    }

    fn upload_at<R>(
        &mut self,
        angle: f32,
        device: &R,
        instances: &mut InstanceBuffer<R::Buffer>,
    ) -> Result<(), RenderError>
    where
        R: BufferAllocator + ?Sized,
    {
        layout::layout_into(angle, &mut self.transforms);
        instances.repopulate(device, &self.transforms)
    }
}
