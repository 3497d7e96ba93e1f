// Time-advancement context for clips bound to one scene graph

use log::debug;
use nalgebra_glm as glm;

use super::interpolation::sample;
use super::types::{AnimationClip, TrackProperty};
use crate::scene::{NodeId, NodeKind, SceneGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionId(usize);

/// Playback state of one clip
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: usize,
    pub time: f32,
    pub time_scale: f32,
    pub paused: bool,
    running: bool,
}

impl AnimationAction {
    fn new(clip: usize) -> Self {
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            paused: false,
            running: false,
        }
    }

    /// Schedules the action. Does not rewind; calling it twice is harmless.
    pub fn play(&mut self) {
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Running and not paused, so time moves on each update.
    pub fn is_advancing(&self) -> bool {
        self.running && !self.paused
    }

    fn advance(&mut self, delta: f32, duration: f32) {
        self.time += delta * self.time_scale;
        if duration <= 0.0 {
            self.time = 0.0;
            return;
        }
        // Clips always loop
        self.time = self.time.rem_euclid(duration);
    }
}

/// Plays clips onto a scene graph. Tracks address nodes by id, so one
/// mixer serves whatever subtree its clips were retargeted to.
#[derive(Default)]
pub struct AnimationMixer {
    clips: Vec<AnimationClip>,
    actions: Vec<AnimationAction>,
    time: f32,
}

impl AnimationMixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total time fed through `update`
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Binds `clip` to a new, stopped action.
    pub fn clip_action(&mut self, clip: AnimationClip) -> ActionId {
        debug!(
            "Binding clip '{}' ({} tracks, {:.2}s)",
            clip.name,
            clip.tracks.len(),
            clip.duration
        );
        self.clips.push(clip);
        self.actions.push(AnimationAction::new(self.clips.len() - 1));
        ActionId(self.actions.len() - 1)
    }

    pub fn action(&self, id: ActionId) -> Option<&AnimationAction> {
        self.actions.get(id.0)
    }

    pub fn action_mut(&mut self, id: ActionId) -> Option<&mut AnimationAction> {
        self.actions.get_mut(id.0)
    }

    /// Advances every running, unpaused action by `delta` seconds and
    /// writes the sampled pose of every running action into `graph`.
    pub fn update(&mut self, delta: f32, graph: &mut SceneGraph) {
        self.time += delta;

        for action in &mut self.actions {
            if !action.is_running() {
                continue;
            }
            let clip = &self.clips[action.clip];
            if !action.paused {
                action.advance(delta, clip.duration);
            }
            apply_clip(clip, action.time, graph);
        }
    }
}

fn apply_clip(clip: &AnimationClip, time: f32, graph: &mut SceneGraph) {
    for track in &clip.tracks {
        let value = sample(track, time);
        match track.property {
            TrackProperty::Translation => {
                if let Some(node) = graph.get_mut(track.target) {
                    node.transform.translation = glm::vec3(value[0], value[1], value[2]);
                }
            }
            TrackProperty::Rotation => {
                if let Some(node) = graph.get_mut(track.target) {
                    node.transform.rotation = glm::quat(value[0], value[1], value[2], value[3]);
                }
            }
            TrackProperty::Scale => {
                if let Some(node) = graph.get_mut(track.target) {
                    node.transform.scale = glm::vec3(value[0], value[1], value[2]);
                }
            }
            TrackProperty::MorphWeights => apply_weights(graph, track.target, &value),
        }
    }
}

/// A node whose glTF mesh had several primitives is a group of mesh
/// children; weights go to each of them.
fn apply_weights(graph: &mut SceneGraph, target: NodeId, weights: &[f32]) {
    let targets: Vec<NodeId> = match graph.get(target).map(|n| &n.kind) {
        Some(NodeKind::Mesh(_)) => vec![target],
        Some(NodeKind::Group) => graph
            .get(target)
            .map(|n| n.children().to_vec())
            .unwrap_or_default(),
        None => Vec::new(),
    };

    for id in targets {
        if let Some(morph) = graph.mesh_mut(id).and_then(|m| m.morph.as_mut()) {
            morph.set_influences(weights);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Interpolation, Track};
    use crate::scene::Node;

    fn slide_clip(target: NodeId) -> AnimationClip {
        AnimationClip::new(
            "slide",
            vec![Track {
                target,
                property: TrackProperty::Translation,
                interpolation: Interpolation::Linear,
                times: vec![0.0, 1.0],
                values: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
                stride: 3,
            }],
        )
    }

    #[test]
    fn stopped_action_leaves_graph_untouched() {
        let mut graph = SceneGraph::new();
        let root = graph.add(Node::group("root"));
        let mut mixer = AnimationMixer::new();
        let action = mixer.clip_action(slide_clip(root));

        mixer.update(0.5, &mut graph);
        assert_eq!(graph.get(root).unwrap().transform.translation.x, 0.0);
        assert_eq!(mixer.action(action).unwrap().time, 0.0);
    }

    #[test]
    fn playing_action_samples_and_loops() {
        let mut graph = SceneGraph::new();
        let root = graph.add(Node::group("root"));
        let mut mixer = AnimationMixer::new();
        let action = mixer.clip_action(slide_clip(root));
        mixer.action_mut(action).unwrap().play();

        mixer.update(0.25, &mut graph);
        assert!((graph.get(root).unwrap().transform.translation.x - 0.25).abs() < 1e-6);

        mixer.update(1.0, &mut graph);
        let time = mixer.action(action).unwrap().time;
        assert!((time - 0.25).abs() < 1e-5);
    }

    #[test]
    fn paused_action_holds_its_time() {
        let mut graph = SceneGraph::new();
        let root = graph.add(Node::group("root"));
        let mut mixer = AnimationMixer::new();
        let action = mixer.clip_action(slide_clip(root));
        mixer.action_mut(action).unwrap().play();
        mixer.update(0.5, &mut graph);

        mixer.action_mut(action).unwrap().paused = true;
        mixer.update(0.3, &mut graph);
        assert!((mixer.action(action).unwrap().time - 0.5).abs() < 1e-6);
        assert!((mixer.time() - 0.8).abs() < 1e-6);
    }
}
