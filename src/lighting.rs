//! Directional lights and the fixed two-slot light rig.

use glam::Vec3;

/// Number of light slots carried through the shading pipeline.
///
/// The shader declares an array of exactly this length; changing it here
/// without changing `lit_model.wgsl` breaks the binding contract.
pub const LIGHT_SLOT_COUNT: usize = 2;

/// A directional light.
///
/// `direction` points away from the surface toward the light source, not
/// along the light's travel. `color` is linear RGB intensity and may exceed
/// 1.0 per channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub direction: Vec3,
    pub color: Vec3,
}

impl Light {
    pub fn new(direction: Vec3, color: Vec3) -> Self {
        Self { direction, color }
    }
}

/// The renderer's fixed-capacity light set.
///
/// Both slots are always present; only the first `active_count` contribute to
/// shading. Slots at or beyond `active_count` are ignored regardless of their
/// contents, so stale values in inactive slots are harmless.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightRig {
    pub slots: [Light; LIGHT_SLOT_COUNT],
    active_count: u32,
}

impl Default for LightRig {
    /// The stock rig: a strong white key light and a faint fill.
    fn default() -> Self {
        Self {
            slots: [
                Light::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0)),
                Light::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.05, 0.05, 0.05)),
            ],
            active_count: 2,
        }
    }
}

impl LightRig {
    /// A rig with no active lights. Shading produces black.
    pub fn unlit() -> Self {
        Self {
            active_count: 0,
            ..Self::default()
        }
    }

    /// Number of slots that contribute to shading.
    pub fn active_count(&self) -> u32 {
        self.active_count
    }

    /// Sets how many slots contribute, clamped to the slot capacity.
    pub fn set_active_count(&mut self, count: u32) {
        self.active_count = count.min(LIGHT_SLOT_COUNT as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rig_is_key_plus_fill() {
        let rig = LightRig::default();
        assert_eq!(rig.active_count(), 2);
        assert_eq!(rig.slots[0].color, Vec3::ONE);
        assert_eq!(rig.slots[0].direction, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(rig.slots[1].color, Vec3::splat(0.05));
    }

    #[test]
    fn active_count_is_clamped_to_capacity() {
        let mut rig = LightRig::default();
        rig.set_active_count(9);
        assert_eq!(rig.active_count(), LIGHT_SLOT_COUNT as u32);
        rig.set_active_count(0);
        assert_eq!(rig.active_count(), 0);
    }
}
