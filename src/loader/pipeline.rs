//! Wires a freshly imported asset into the stage: shadows and surface
//! enhancement on every mesh, one animation action for the first clip and
//! one shape-key slider per morph channel.

use std::sync::Arc;

use log::{debug, info};

use super::import::LoadedAsset;
use crate::animation::AnimationMixer;
use crate::controls::{MorphPanel, MorphSlider};
use crate::material::Material;
use crate::scene::{Color, NodeKind};
use crate::stage::Stage;
use crate::state::{AnimationHandle, ViewerState};
use crate::texture::generate_noise_texture;

pub const ENHANCED_ROUGHNESS: f32 = 0.25;
pub const ENHANCED_METALNESS: f32 = 0.7;
pub const ENHANCED_ENV_INTENSITY: f32 = 1.2;
pub const ENHANCED_CLEARCOAT: f32 = 0.6;
pub const ENHANCED_CLEARCOAT_ROUGHNESS: f32 = 0.15;
pub const ENHANCED_SHEEN: f32 = 0.5;
pub const ENHANCED_SHEEN_COLOR: u32 = 0x88aaff;
pub const ENHANCED_BUMP_SCALE: f32 = 0.08;

/// What one load did, for logging and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub meshes: usize,
    pub enhanced_materials: usize,
    pub clips: usize,
    pub sliders: usize,
}

/// Applies the physical look to one material slot. Basic surfaces are left
/// alone. Returns whether the slot changed.
pub fn enhance_material(material: &mut Material) -> bool {
    let Some(physical) = material.physical_mut() else {
        return false;
    };
    physical.standard.roughness = ENHANCED_ROUGHNESS;
    physical.standard.metalness = ENHANCED_METALNESS;
    physical.standard.env_map_intensity = ENHANCED_ENV_INTENSITY;
    physical.clearcoat = ENHANCED_CLEARCOAT;
    physical.clearcoat_roughness = ENHANCED_CLEARCOAT_ROUGHNESS;
    physical.sheen = ENHANCED_SHEEN;
    physical.sheen_color = Color::from_hex(ENHANCED_SHEEN_COLOR);
    physical.standard.bump_map = Some(Arc::new(generate_noise_texture()));
    physical.standard.bump_scale = ENHANCED_BUMP_SCALE;
    material.mark_needs_update();
    true
}

/// Runs once per successful load. Without a morph panel the slider step is
/// skipped and everything else still happens.
pub fn on_load(
    asset: LoadedAsset,
    stage: &mut Stage,
    state: &mut ViewerState,
    mut morph_panel: Option<&mut MorphPanel>,
) -> LoadSummary {
    let LoadedAsset {
        graph,
        root,
        animations,
    } = asset;

    let offset = stage.add_asset(graph, root);
    let asset_root = offset.apply(root);
    let mut summary = LoadSummary::default();

    for id in stage.graph.traverse(asset_root) {
        let Some(node) = stage.graph.get_mut(id) else {
            continue;
        };
        let NodeKind::Mesh(mesh) = &mut node.kind else {
            continue;
        };
        summary.meshes += 1;
        for material in mesh.materials_mut() {
            if enhance_material(material) {
                summary.enhanced_materials += 1;
            }
        }
        node.cast_shadow = true;
        node.receive_shadow = true;
        if state.primary_mesh.is_none() {
            debug!("Primary mesh: '{}'", node.name);
            state.primary_mesh = Some(id);
        }
    }

    summary.clips = animations.len();
    if let Some(mut clip) = animations.into_iter().next() {
        clip.retarget(offset);
        let mut mixer = AnimationMixer::new();
        let action = mixer.clip_action(clip);
        state.animation = Some(AnimationHandle { mixer, action });
    }

    if let Some(panel) = morph_panel.as_deref_mut() {
        for id in stage.graph.traverse(asset_root) {
            let Some(morph) = stage.graph.mesh(id).and_then(|m| m.morph.as_ref()) else {
                continue;
            };
            for (name, index) in morph.channels() {
                let value = morph.influence(index).unwrap_or(0.0);
                panel.push(MorphSlider::new(name, id, index, value));
                summary.sliders += 1;
            }
        }
    }

    info!(
        "Asset wired: {} meshes, {} materials enhanced, {} clips, {} shape keys",
        summary.meshes, summary.enhanced_materials, summary.clips, summary.sliders
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::StandardParams;

    #[test]
    fn standard_is_promoted_and_overridden() {
        let mut material = Material::standard(StandardParams::default());
        material.needs_update = false;
        assert!(enhance_material(&mut material));
        assert!(material.needs_update);

        let physical = material.physical_mut().unwrap();
        assert_eq!(physical.standard.roughness, 0.25);
        assert_eq!(physical.standard.metalness, 0.7);
        assert_eq!(physical.clearcoat, 0.6);
        assert_eq!(physical.sheen_color, Color::from_hex(0x88aaff));
        assert_eq!(physical.standard.bump_scale, 0.08);
        let bump = physical.standard.bump_map.as_ref().unwrap();
        assert_eq!(bump.repeat, [4.0, 4.0]);
    }

    #[test]
    fn basic_is_untouched() {
        let mut material = Material::basic(Color::WHITE);
        material.needs_update = false;
        assert!(!enhance_material(&mut material));
        assert!(!material.needs_update);
        assert!(material.bump_map().is_none());
    }

    #[test]
    fn each_material_gets_its_own_noise() {
        let mut a = Material::default();
        let mut b = Material::default();
        enhance_material(&mut a);
        enhance_material(&mut b);
        assert_ne!(a.bump_map().unwrap().id(), b.bump_map().unwrap().id());
    }
}
