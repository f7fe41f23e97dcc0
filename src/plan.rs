//! Pure per-frame planning.
//!
//! Before anything touches an encoder, the frame is reduced to a
//! [`FramePlan`]: every constant block fully computed and one entry per
//! draw call, in scene order. The renderer then just uploads the plan and
//! replays it. Keeping this step free of GPU handles makes the whole
//! per-frame algorithm testable on any machine.

use crate::camera::PerspectiveCamera;
use crate::constants::{
    FrameConstants, InstanceConstants, LightingConstants, MaterialConstants,
};
use crate::lighting::LightRig;
use crate::mesh::Submesh;
use crate::model::{Material, material_slot};
use crate::scene::Scene;
use glam::Mat4;

/// Everything needed to issue one indexed draw call.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PlannedDraw {
    /// Index of the owning entity in the scene.
    pub entity: usize,
    /// Submesh index within the entity's model.
    pub submesh: usize,
    /// Which of the model's materials this draw uses (after cyclic wrap).
    pub material_index: usize,
    /// Whether the material carries its own base-color texture.
    pub textured: bool,
    pub instance: InstanceConstants,
    pub material: MaterialConstants,
    pub index_count: u32,
    pub index_format: wgpu::IndexFormat,
    pub index_offset: u64,
}

/// A fully-computed frame: shared constants plus the ordered draw list.
#[derive(Debug)]
pub(crate) struct FramePlan {
    pub frame: FrameConstants,
    pub lighting: LightingConstants,
    pub draws: Vec<PlannedDraw>,
}

impl FramePlan {
    /// Plans a frame for the given scene state. Entities without a model
    /// contribute nothing.
    pub fn build(
        scene: &Scene,
        camera: &PerspectiveCamera,
        rig: &LightRig,
        aspect_ratio: f64,
    ) -> Self {
        let mut draws = Vec::new();
        for (entity_index, entity) in scene.entities.iter().enumerate() {
            let Some(model) = entity.model.as_ref() else {
                continue;
            };
            entity_draws(
                entity_index,
                entity.transform,
                model.mesh.submeshes(),
                &model.materials,
                &mut draws,
            );
        }

        Self {
            frame: FrameConstants::new(camera, aspect_ratio),
            lighting: LightingConstants::from_rig(rig),
            draws,
        }
    }
}

/// Plans one entity: a draw per submesh, materials paired cyclically.
pub(crate) fn entity_draws(
    entity_index: usize,
    transform: Mat4,
    submeshes: &[Submesh],
    materials: &[Material],
    out: &mut Vec<PlannedDraw>,
) {
    let instance = InstanceConstants::for_transform(transform);
    for (submesh_index, submesh) in submeshes.iter().enumerate() {
        let material_index = material_slot(submesh_index, materials.len());
        let material = &materials[material_index];
        out.push(PlannedDraw {
            entity: entity_index,
            submesh: submesh_index,
            material_index,
            textured: material.base_color_texture.is_some(),
            instance,
            material: MaterialConstants::from_material(material),
            index_count: submesh.index_count,
            index_format: submesh.index_format,
            index_offset: submesh.index_offset,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Entity;
    use glam::DVec3;

    fn triangle_submeshes(count: usize) -> Vec<Submesh> {
        (0..count)
            .map(|i| Submesh {
                index_count: 3,
                index_format: wgpu::IndexFormat::Uint32,
                index_offset: i as u64 * 12,
            })
            .collect()
    }

    #[test]
    fn cube_scene_plans_exactly_one_draw() {
        // A cube: one submesh of 36 indices, one default material, camera at
        // (0,0,3) looking toward the origin under the stock two-light rig.
        let submeshes = [Submesh {
            index_count: 36,
            index_format: wgpu::IndexFormat::Uint32,
            index_offset: 0,
        }];
        let materials = [Material::default()];
        let mut draws = Vec::new();
        entity_draws(0, Mat4::IDENTITY, &submeshes, &materials, &mut draws);

        assert_eq!(draws.len(), 1);
        let draw = &draws[0];
        assert_eq!(draw.index_count, 36);
        assert_eq!(draw.material_index, 0);
        assert!(!draw.textured);
        assert_eq!(draw.instance.model, Mat4::IDENTITY.to_cols_array_2d());
        assert_eq!(draw.material.shininess, 50.0);

        let camera = PerspectiveCamera::new()
            .at(0.0, 0.0, 3.0)
            .looking_at(DVec3::ZERO);
        let frame = FrameConstants::new(&camera, 1.0);
        assert_eq!(frame.camera_position, [0.0, 0.0, 3.0]);

        let lighting = LightingConstants::from_rig(&LightRig::default());
        assert_eq!(lighting.active_light_count, 2);
        assert_eq!(lighting.lights[0].direction, [-1.0, -1.0, -1.0]);
        assert_eq!(lighting.lights[1].color, [0.05, 0.05, 0.05]);
    }

    #[test]
    fn more_submeshes_than_materials_wrap_cyclically() {
        let submeshes = triangle_submeshes(5);
        let materials = [Material::default(), Material::default()];
        let mut draws = Vec::new();
        entity_draws(0, Mat4::IDENTITY, &submeshes, &materials, &mut draws);

        let picked: Vec<usize> = draws.iter().map(|d| d.material_index).collect();
        assert_eq!(picked, vec![0, 1, 0, 1, 0]);
        // Last submesh (N-1) reuses material (N-1) mod M.
        assert_eq!(draws[4].material_index, 4 % materials.len());
    }

    #[test]
    fn entities_without_models_plan_zero_draws() {
        let mut scene = Scene::new();
        scene.push(Entity::default());
        scene.push(Entity::default());
        let plan = FramePlan::build(
            &scene,
            &PerspectiveCamera::default(),
            &LightRig::default(),
            16.0 / 9.0,
        );
        assert!(plan.draws.is_empty());
    }

    #[test]
    fn submesh_offsets_pass_through_to_draws() {
        let submeshes = triangle_submeshes(3);
        let materials = [Material::default()];
        let mut draws = Vec::new();
        entity_draws(7, Mat4::IDENTITY, &submeshes, &materials, &mut draws);
        assert_eq!(draws[2].entity, 7);
        assert_eq!(draws[2].index_offset, 24);
        assert_eq!(draws[1].index_format, wgpu::IndexFormat::Uint32);
    }
}
