use crate::animation::{ActionId, AnimationAction, AnimationMixer};
use crate::scene::NodeId;

/// Mixer plus the single action bound to the asset's first clip.
pub struct AnimationHandle {
    pub mixer: AnimationMixer,
    pub action: ActionId,
}

impl AnimationHandle {
    pub fn action(&self) -> Option<&AnimationAction> {
        self.mixer.action(self.action)
    }

    pub fn action_mut(&mut self) -> Option<&mut AnimationAction> {
        self.mixer.action_mut(self.action)
    }
}

/// Session state shared by the load pipeline, the control binder and the
/// render loop. Starts empty; the pipeline fills it at most once per load.
#[derive(Default)]
pub struct ViewerState {
    pub primary_mesh: Option<NodeId>,
    pub auto_rotate: bool,
    pub animation: Option<AnimationHandle>,
    pub animation_started: bool,
}

impl ViewerState {
    pub fn new() -> Self {
        Self::default()
    }
}
