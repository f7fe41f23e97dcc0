//! Per-frame constant blocks and the shader binding contract.
//!
//! Every struct here is `#[repr(C)]` + [`bytemuck::Pod`] and padded by hand
//! to match WGSL uniform layout rules (vec3 members occupy 16-byte slots,
//! struct sizes round up to 16). The layouts are pinned by tests below;
//! change them in lockstep with `shaders/lit_model.wgsl` or not at all.
//!
//! # Binding contract
//!
//! Bind group and binding numbers are shared with the shader and must not be
//! renumbered on one side only:
//!
//! | Group | Binding | Payload            | Stage            |
//! |-------|---------|--------------------|------------------|
//! | 0     | 8       | FrameConstants     | vertex+fragment  |
//! | 1     | 9       | InstanceConstants  | vertex           |
//! | 2     | 9       | LightingConstants  | fragment         |
//! | 3     | 10      | MaterialConstants  | fragment         |
//! | 3     | 0       | base-color texture | fragment         |
//! | 3     | 1       | shared sampler     | fragment         |
//!
//! Binding number 9 appears twice on purpose: instance data in the vertex
//! stage and lighting data in the fragment stage share the number but live
//! in different groups, so there is no collision.

use crate::camera::PerspectiveCamera;
use bytemuck::Zeroable;
use crate::lighting::{LIGHT_SLOT_COUNT, LightRig};
use crate::math::normal_matrix;
use crate::model::Material;
use glam::Mat4;

pub const FRAME_CONSTANTS_GROUP: u32 = 0;
pub const FRAME_CONSTANTS_BINDING: u32 = 8;
pub const INSTANCE_CONSTANTS_GROUP: u32 = 1;
pub const INSTANCE_CONSTANTS_BINDING: u32 = 9;
pub const LIGHTING_CONSTANTS_GROUP: u32 = 2;
pub const LIGHTING_CONSTANTS_BINDING: u32 = 9;
pub const MATERIAL_GROUP: u32 = 3;
pub const MATERIAL_CONSTANTS_BINDING: u32 = 10;
pub const BASE_COLOR_TEXTURE_BINDING: u32 = 0;
pub const BASE_COLOR_SAMPLER_BINDING: u32 = 1;

/// Camera-derived values, identical for every draw in a frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameConstants {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub _pad: f32,
}

impl FrameConstants {
    /// Recomputed fresh each frame; nothing here is cached.
    pub fn new(camera: &PerspectiveCamera, aspect_ratio: f64) -> Self {
        Self {
            view: camera.view_matrix().to_cols_array_2d(),
            projection: camera.projection_matrix(aspect_ratio).to_cols_array_2d(),
            camera_position: camera.position.as_vec3().to_array(),
            _pad: 0.0,
        }
    }
}

/// Per-entity values: the world transform and its normal matrix.
///
/// The normal matrix is mathematically 3×3 but travels as a mat4 (upper-left
/// block meaningful) to sidestep WGSL's 16-byte mat3 column stride.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceConstants {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
}

impl InstanceConstants {
    pub fn for_transform(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: Mat4::from_mat3(normal_matrix(model)).to_cols_array_2d(),
        }
    }
}

/// One light slot as the shader sees it.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    pub direction: [f32; 3],
    pub _pad0: f32,
    pub color: [f32; 3],
    pub _pad1: f32,
}

/// The full light set plus the active-count scalar.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingConstants {
    pub lights: [GpuLight; LIGHT_SLOT_COUNT],
    pub active_light_count: u32,
    pub _pad: [u32; 3],
}

impl LightingConstants {
    pub fn from_rig(rig: &LightRig) -> Self {
        let mut lights = [GpuLight::zeroed(); LIGHT_SLOT_COUNT];
        for (slot, light) in lights.iter_mut().zip(rig.slots.iter()) {
            slot.direction = light.direction.to_array();
            slot.color = light.color.to_array();
        }
        Self {
            lights,
            active_light_count: rig.active_count(),
            _pad: [0; 3],
        }
    }
}

/// Per-submesh material parameters.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialConstants {
    pub specular_color: [f32; 3],
    pub shininess: f32,
    pub metalness: f32,
    pub _pad: [f32; 3],
}

impl MaterialConstants {
    pub fn from_material(material: &Material) -> Self {
        Self {
            specular_color: material.specular_color.to_array(),
            shininess: material.shininess,
            metalness: material.metalness,
            _pad: [0.0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::Light;
    use glam::{DVec3, Vec3};
    use std::mem::size_of;

    #[test]
    fn block_sizes_match_wgsl_layout() {
        assert_eq!(size_of::<FrameConstants>(), 144);
        assert_eq!(size_of::<InstanceConstants>(), 128);
        assert_eq!(size_of::<GpuLight>(), 32);
        assert_eq!(size_of::<LightingConstants>(), 80);
        assert_eq!(size_of::<MaterialConstants>(), 32);
    }

    #[test]
    fn frame_constants_carry_literal_camera_state() {
        let camera = PerspectiveCamera::new().at(0.0, 0.0, 3.0);
        let frame = FrameConstants::new(&camera, 1.0);
        assert_eq!(frame.camera_position, [0.0, 0.0, 3.0]);
        // Default camera orientation: view is pure translation by -position.
        assert_eq!(frame.view[3][2], -3.0);
    }

    #[test]
    fn instance_constants_identity_transform() {
        let instance = InstanceConstants::for_transform(Mat4::IDENTITY);
        assert_eq!(instance.model, Mat4::IDENTITY.to_cols_array_2d());
        assert_eq!(instance.normal_matrix, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn zero_active_lights_disables_all_contribution() {
        let lighting = LightingConstants::from_rig(&LightRig::unlit());
        assert_eq!(lighting.active_light_count, 0);
        // Slot contents are irrelevant when the count is zero; they still
        // carry the default rig values untouched.
        assert_eq!(lighting.lights[0].color, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn single_active_light_keeps_slot_one_inert() {
        let mut rig = LightRig::default();
        rig.slots[1] = Light::new(Vec3::new(9.0, 9.0, 9.0), Vec3::new(100.0, 0.0, 0.0));
        rig.set_active_count(1);
        let lighting = LightingConstants::from_rig(&rig);
        // Slot 1 is uploaded verbatim but sits beyond the active count, so
        // the shader loop never reads it.
        assert_eq!(lighting.active_light_count, 1);
        assert_eq!(lighting.lights[1].color, [100.0, 0.0, 0.0]);
    }

    #[test]
    fn material_constants_defaults() {
        let constants = MaterialConstants::from_material(&Material::default());
        assert_eq!(constants.specular_color, [1.0, 1.0, 1.0]);
        assert_eq!(constants.shininess, 50.0);
        assert_eq!(constants.metalness, 0.0);
    }

    #[test]
    fn frame_constants_view_projection_consistent_with_scenario() {
        // Camera at (0,0,3) looking toward the origin: the origin should land
        // in front of the camera at view-space z = -3.
        let camera = PerspectiveCamera::new()
            .at(0.0, 0.0, 3.0)
            .looking_at(DVec3::ZERO);
        let view = Mat4::from_cols_array_2d(&FrameConstants::new(&camera, 1.0).view);
        let origin_in_view = view * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        approx::assert_relative_eq!(origin_in_view.z, -3.0, epsilon = 1e-4);
    }
}
