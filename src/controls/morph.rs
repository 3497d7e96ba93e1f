use crate::scene::{NodeId, SceneGraph};

pub const MORPH_MIN: f32 = 0.0;
pub const MORPH_MAX: f32 = 1.0;
pub const MORPH_STEP: f32 = 0.01;

/// One generated shape-key slider, bound to a single channel of one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphSlider {
    pub label: String,
    pub mesh: NodeId,
    pub channel: usize,
    pub value: f32,
    /// Percentage driving the slider's filled track
    pub fill: f32,
}

impl MorphSlider {
    pub fn new(label: impl Into<String>, mesh: NodeId, channel: usize, value: f32) -> Self {
        let value = snap(value);
        Self {
            label: label.into(),
            mesh,
            channel,
            value,
            fill: value * 100.0,
        }
    }

    /// Moves the slider and writes the value into the bound influence.
    pub fn input(&mut self, value: f32, graph: &mut SceneGraph) {
        self.value = snap(value);
        self.fill = self.value * 100.0;
        if let Some(morph) = graph.mesh_mut(self.mesh).and_then(|m| m.morph.as_mut()) {
            morph.set_influence(self.channel, self.value);
        }
    }
}

/// Clamp to the slider range and round to its step.
fn snap(value: f32) -> f32 {
    let steps = (1.0 / MORPH_STEP).round();
    ((value.clamp(MORPH_MIN, MORPH_MAX) * steps).round()) / steps
}

/// Container the load pipeline fills with one slider per discovered channel.
#[derive(Debug, Default)]
pub struct MorphPanel {
    sliders: Vec<MorphSlider>,
}

impl MorphPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, slider: MorphSlider) -> usize {
        self.sliders.push(slider);
        self.sliders.len() - 1
    }

    pub fn sliders(&self) -> &[MorphSlider] {
        &self.sliders
    }

    pub fn len(&self) -> usize {
        self.sliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sliders.is_empty()
    }

    pub fn input(&mut self, index: usize, value: f32, graph: &mut SceneGraph) {
        if let Some(slider) = self.sliders.get_mut(index) {
            slider.input(value, graph);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_rounds_to_hundredths() {
        assert_eq!(snap(0.8), 0.8);
        assert_eq!(snap(0.234), 0.23);
        assert_eq!(snap(1.7), 1.0);
        assert_eq!(snap(-0.2), 0.0);
    }

    #[test]
    fn fill_tracks_value_as_percent() {
        let mut graph = SceneGraph::new();
        let node = graph.add(crate::scene::Node::group("g"));
        let mut slider = MorphSlider::new("smile", node, 0, 0.2);
        assert!((slider.fill - 20.0).abs() < 1e-4);
        // No mesh behind the node: only the slider moves
        slider.input(0.5, &mut graph);
        assert_eq!(slider.value, 0.5);
        assert!((slider.fill - 50.0).abs() < 1e-4);
    }
}
