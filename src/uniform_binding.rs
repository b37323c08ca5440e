//! # Shader Resource Slots
//!
//! The pipeline exposes two named resources, mirroring the declarations in the WGSL source:
//!
//! - `Constants`: the per-frame uniform block ([`crate::UniformBuffer`]) read by the vertex
//!   stage, at binding 0.
//! - `g_Texture`: the cube texture and its sampler, read by the fragment stage, at bindings 1
//!   and 2.
//!
//! Backends resolve names through [`resolve`] so a typo or a mismatched resource kind is
//! reported as an error instead of surfacing as a validation failure deep inside the driver.

use crate::error::RenderError;

pub const CONSTANTS: &str = "Constants";
pub const TEXTURE: &str = "g_Texture";

/// The kind of resource a slot expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    UniformBuffer,
    /// A sampled texture. Its sampler occupies the following binding.
    Texture,
}

/// A named resource slot of the pipeline's bind group 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSlot {
    pub name: &'static str,
    pub kind: ResourceKind,
    pub binding: u32,
}

pub const SHADER_RESOURCES: [ResourceSlot; 2] = [
    ResourceSlot {
        name: CONSTANTS,
        kind: ResourceKind::UniformBuffer,
        binding: 0,
    },
    ResourceSlot {
        name: TEXTURE,
        kind: ResourceKind::Texture,
        binding: 1,
    },
];

/// Looks up the slot called `name` and checks that it accepts a resource of `kind`.
pub fn resolve(name: &str, kind: ResourceKind) -> Result<ResourceSlot, RenderError> {
    let slot = SHADER_RESOURCES
        .iter()
        .find(|slot| slot.name == name)
        .ok_or_else(|| RenderError::UnknownShaderResource(name.to_owned()))?;
    if slot.kind != kind {
        return Err(RenderError::ResourceKindMismatch(name.to_owned()));
    }
    Ok(*slot)
}
