//! # Per-frame Constants
//!
//! The `Constants` uniform block read by the vertex shader. It is rewritten every frame with the
//! camera's view-projection matrix and the in-place rotation applied to every cube before its
//! instance transform.

/// CPU-side mirror of the shader's `Constants` block. The layout must match the WGSL
/// declaration: two column-major `mat4x4<f32>`, 128 bytes in total.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UniformBuffer {
    pub view_proj: nalgebra_glm::Mat4,
    pub rotation: nalgebra_glm::Mat4,
}

impl Default for UniformBuffer {
    fn default() -> Self {
        Self {
            view_proj: nalgebra_glm::Mat4::identity(),
            rotation: nalgebra_glm::Mat4::identity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_shader_block_size() {
        assert_eq!(std::mem::size_of::<UniformBuffer>(), 128);
    }

    #[test]
    fn rotation_follows_view_projection_in_memory() {
        let constants = UniformBuffer {
            view_proj: nalgebra_glm::Mat4::zeros(),
            rotation: nalgebra_glm::Mat4::identity(),
        };
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&constants));
        assert!(floats[..16].iter().all(|f| *f == 0.0));
        assert_eq!(floats[16], 1.0);
        assert_eq!(floats[21], 1.0);
    }
}
