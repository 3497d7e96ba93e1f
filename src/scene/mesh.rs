use log::warn;

use crate::material::Material;

/// Range of indices drawn with one material slot of a multi-material mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryGroup {
    pub start: u32,
    pub count: u32,
    pub material_index: usize,
}

/// Vertex data of one mesh. Morph targets are stored as deltas relative to
/// the base positions and normals.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub groups: Vec<GeometryGroup>,
    pub morph_positions: Vec<Vec<[f32; 3]>>,
    pub morph_normals: Vec<Vec<[f32; 3]>>,
}

impl Geometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Positions and normals with every morph target blended in at the
    /// given influences.
    pub fn morphed(&self, influences: &[f32]) -> (Vec<[f32; 3]>, Vec<[f32; 3]>) {
        let mut positions = self.positions.clone();
        let mut normals = self.normals.clone();

        for (target, &weight) in influences.iter().enumerate() {
            if weight == 0.0 {
                continue;
            }
            if let Some(deltas) = self.morph_positions.get(target) {
                accumulate(&mut positions, deltas, weight);
            }
            if let Some(deltas) = self.morph_normals.get(target) {
                accumulate(&mut normals, deltas, weight);
            }
        }

        for n in &mut normals {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            if len > 0.0 {
                n.iter_mut().for_each(|c| *c /= len);
            }
        }

        (positions, normals)
    }
}

fn accumulate(base: &mut [[f32; 3]], deltas: &[[f32; 3]], weight: f32) {
    for (v, d) in base.iter_mut().zip(deltas) {
        v[0] += d[0] * weight;
        v[1] += d[1] * weight;
        v[2] += d[2] * weight;
    }
}

#[derive(Debug, Clone)]
pub enum MeshMaterial {
    Single(Material),
    Multi(Vec<Material>),
}

impl MeshMaterial {
    pub fn iter(&self) -> std::slice::Iter<'_, Material> {
        match self {
            MeshMaterial::Single(material) => std::slice::from_ref(material).iter(),
            MeshMaterial::Multi(materials) => materials.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Material> {
        match self {
            MeshMaterial::Single(material) => std::slice::from_mut(material).iter_mut(),
            MeshMaterial::Multi(materials) => materials.iter_mut(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Material> {
        self.iter().nth(index)
    }

    pub fn len(&self) -> usize {
        match self {
            MeshMaterial::Single(_) => 1,
            MeshMaterial::Multi(materials) => materials.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Named shape-key channels of one mesh: an ordered name-to-index
/// dictionary and the influence vector it indexes into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MorphTargets {
    dictionary: Vec<(String, usize)>,
    influences: Vec<f32>,
}

impl MorphTargets {
    /// `names[i]` labels influence `i`. A name seen twice keeps its first
    /// index; the duplicate is dropped from the dictionary.
    pub fn new(names: Vec<String>, influences: Vec<f32>) -> Self {
        let mut dictionary: Vec<(String, usize)> = Vec::with_capacity(names.len());
        for (index, name) in names.into_iter().enumerate() {
            if dictionary.iter().any(|(existing, _)| *existing == name) {
                warn!("Duplicate shape key '{}' at index {} ignored", name, index);
                continue;
            }
            dictionary.push((name, index));
        }
        Self {
            dictionary,
            influences,
        }
    }

    pub fn channels(&self) -> impl Iterator<Item = (&str, usize)> {
        self.dictionary.iter().map(|(name, idx)| (name.as_str(), *idx))
    }

    pub fn channel_count(&self) -> usize {
        self.dictionary.len()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.channels().find(|(n, _)| *n == name).map(|(_, idx)| idx)
    }

    pub fn influences(&self) -> &[f32] {
        &self.influences
    }

    pub fn influence(&self, index: usize) -> Option<f32> {
        self.influences.get(index).copied()
    }

    pub fn set_influence(&mut self, index: usize, value: f32) {
        if let Some(slot) = self.influences.get_mut(index) {
            *slot = value.clamp(0.0, 1.0);
        }
    }

    /// Overwrites influences from an animation sample; extra values are ignored.
    pub fn set_influences(&mut self, values: &[f32]) {
        for (slot, value) in self.influences.iter_mut().zip(values) {
            *slot = *value;
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: MeshMaterial,
    pub morph: Option<MorphTargets>,
}

impl Mesh {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry,
            material: MeshMaterial::Single(material),
            morph: None,
        }
    }

    pub fn with_morph(mut self, morph: MorphTargets) -> Self {
        self.morph = Some(morph);
        self
    }

    pub fn materials(&self) -> std::slice::Iter<'_, Material> {
        self.material.iter()
    }

    pub fn materials_mut(&mut self) -> std::slice::IterMut<'_, Material> {
        self.material.iter_mut()
    }

    /// Positions and normals after morphing, or the base data when the
    /// mesh has no shape keys.
    pub fn current_vertices(&self) -> (Vec<[f32; 3]>, Vec<[f32; 3]>) {
        match &self.morph {
            Some(morph) => self.geometry.morphed(morph.influences()),
            None => (self.geometry.positions.clone(), self.geometry.normals.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_channel_names_keep_first_index() {
        let morph = MorphTargets::new(
            vec!["smile".into(), "blink".into(), "smile".into()],
            vec![0.2, 0.0, 0.5],
        );
        assert_eq!(morph.channel_count(), 2);
        assert_eq!(morph.index_of("smile"), Some(0));
        assert_eq!(morph.index_of("blink"), Some(1));
    }

    #[test]
    fn set_influence_only_touches_its_index() {
        let mut morph = MorphTargets::new(vec!["smile".into(), "blink".into()], vec![0.2, 0.0]);
        morph.set_influence(0, 0.8);
        assert_eq!(morph.influences(), &[0.8, 0.0]);
        morph.set_influence(7, 1.0);
        assert_eq!(morph.influences(), &[0.8, 0.0]);
    }

    #[test]
    fn morphed_positions_blend_relative_deltas() {
        let geometry = Geometry {
            positions: vec![[0.0, 0.0, 0.0]],
            normals: vec![[0.0, 1.0, 0.0]],
            morph_positions: vec![vec![[1.0, 0.0, 0.0]], vec![[0.0, 2.0, 0.0]]],
            ..Default::default()
        };
        let (positions, normals) = geometry.morphed(&[0.5, 0.25]);
        assert_eq!(positions[0], [0.5, 0.5, 0.0]);
        assert_eq!(normals[0], [0.0, 1.0, 0.0]);
    }
}
