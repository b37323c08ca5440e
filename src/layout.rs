//! # Mobile Layout
//!
//! Produces the per-instance transforms of the scene: a hanging mobile made of textured cubes
//! (the figures) and thin stretched cubes (the crossbars and hangers). The whole mobile revolves
//! about the Y axis by a single global angle.
//!
//! The composition is a table of [`Placement`]s. Each placement is turned into
//! `RotateY(angle) * Translate(translation) * Scale(scale)`: the cube is first scaled, then moved
//! to its spot on the mobile, then the mobile as a whole is rotated.

/// Scale and translation of one cube of the mobile, before the global rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: [f32; 3],
    pub translation: [f32; 3],
}

impl Placement {
    const fn new(scale: [f32; 3], translation: [f32; 3]) -> Self {
        Self { scale, translation }
    }

    const fn uniform(scale: f32, translation: [f32; 3]) -> Self {
        Self::new([scale, scale, scale], translation)
    }

    /// World transform of this placement with the mobile rotated by `angle` radians about Y.
    pub fn transform(&self, angle: f32) -> nalgebra_glm::Mat4 {
        let [sx, sy, sz] = self.scale;
        let [tx, ty, tz] = self.translation;
        nalgebra_glm::rotation(angle, &nalgebra_glm::Vec3::y())
            * nalgebra_glm::translation(&nalgebra_glm::vec3(tx, ty, tz))
            * nalgebra_glm::scaling(&nalgebra_glm::vec3(sx, sy, sz))
    }
}

const ROD: f32 = 0.08;

/// The mobile: three levels of figures, two crossbars and the hangers connecting them.
#[rustfmt::skip]
pub const MOBILE: [Placement; 20] = [
    // Figures, level 1
    Placement::uniform(0.7, [ 0.0, 4.0,  0.0]),
    Placement::uniform(0.6, [ 6.0, 6.0,  0.0]),
    Placement::uniform(0.6, [-6.0, 6.0,  0.0]),
    Placement::uniform(0.6, [ 0.0, 6.0,  6.0]),
    Placement::uniform(0.6, [ 0.0, 6.0, -6.0]),
    // Level 2
    Placement::uniform(0.5, [ 6.0, 3.0,  0.0]),
    Placement::uniform(0.5, [-6.0, 3.0,  0.0]),
    Placement::uniform(0.5, [ 0.0, 3.0,  6.0]),
    Placement::uniform(0.5, [ 0.0, 3.0, -6.0]),
    // Level 3
    Placement::uniform(0.5, [ 6.0, 0.0,  0.0]),
    Placement::uniform(0.5, [-6.0, 0.0,  0.0]),
    Placement::uniform(0.5, [ 0.0, 0.0,  6.0]),
    Placement::uniform(0.5, [ 0.0, 0.0, -6.0]),
    // Crossbars
    Placement::new([6.0, ROD, ROD], [0.0, 8.0, 0.0]),
    Placement::new([ROD, ROD, 6.0], [0.0, 8.0, 0.0]),
    // Hangers
    Placement::new([ROD, 2.0, ROD], [ 0.0, 6.0,  0.0]),
    Placement::new([ROD, 4.0, ROD], [ 6.0, 4.0,  0.0]),
    Placement::new([ROD, 4.0, ROD], [ 0.0, 4.0,  6.0]),
    Placement::new([ROD, 4.0, ROD], [-6.0, 4.0,  0.0]),
    Placement::new([ROD, 4.0, ROD], [ 0.0, 4.0, -6.0]),
];

/// Transforms of every cube of the mobile rotated by `angle` radians about Y.
pub fn mobile_layout(angle: f32) -> Vec<nalgebra_glm::Mat4> {
    let mut transforms = Vec::with_capacity(MOBILE.len());
    layout_into(angle, &mut transforms);
    transforms
}

/// Like [`mobile_layout`] but reuses the allocation of `transforms`.
pub fn layout_into(angle: f32, transforms: &mut Vec<nalgebra_glm::Mat4>) {
    transforms.clear();
    transforms.extend(MOBILE.iter().map(|placement| placement.transform(angle)));
}
