//! Models and their materials.

use crate::mesh::Mesh;
use crate::texture::Texture;
use glam::Vec3;

/// Shading parameters for one submesh. Built once at load time, immutable
/// afterwards.
///
/// `base_color_texture` being `None` is a valid, expected state: the draw
/// path substitutes a white fallback texture, not an error.
#[derive(Debug)]
pub struct Material {
    pub base_color_texture: Option<Texture>,
    pub specular_color: Vec3,
    pub shininess: f32,
    pub metalness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color_texture: None,
            specular_color: Vec3::ONE,
            shininess: 50.0,
            metalness: 0.0,
        }
    }
}

/// One mesh plus its ordered materials.
///
/// Shared across entities as `Arc<Model>`; the GPU buffers and textures it
/// owns are released when the last referencing entity (or loader handle)
/// drops it.
#[derive(Debug)]
pub struct Model {
    pub mesh: Mesh,
    pub materials: Vec<Material>,
}

impl Model {
    /// Selects the material for a submesh.
    ///
    /// Pairing is positional; when there are fewer materials than submeshes
    /// they are reused cyclically. The wrap is a deliberate policy, not an
    /// error.
    pub fn material_for_submesh(&self, submesh_index: usize) -> &Material {
        &self.materials[material_slot(submesh_index, self.materials.len())]
    }
}

/// Cyclic submesh-to-material pairing: `index mod count`.
pub(crate) fn material_slot(submesh_index: usize, material_count: usize) -> usize {
    debug_assert!(material_count > 0, "model loaded with no materials");
    submesh_index % material_count.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_defaults() {
        let material = Material::default();
        assert!(material.base_color_texture.is_none());
        assert_eq!(material.specular_color, Vec3::ONE);
        assert_eq!(material.shininess, 50.0);
        assert_eq!(material.metalness, 0.0);
    }

    #[test]
    fn material_selection_wraps_cyclically() {
        // 5 submeshes over 2 materials: 0 1 0 1 0.
        let slots: Vec<usize> = (0..5).map(|i| material_slot(i, 2)).collect();
        assert_eq!(slots, vec![0, 1, 0, 1, 0]);
        // Submesh N-1 reuses material (N-1) mod M.
        assert_eq!(material_slot(4, 3), 1);
    }

    #[test]
    fn material_selection_is_identity_when_counts_match() {
        for i in 0..4 {
            assert_eq!(material_slot(i, 4), i);
        }
    }
}
