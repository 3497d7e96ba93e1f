use crate::renderer::camera::OrbitController;
use crate::stage::Stage;
use crate::state::ViewerState;

/// Seconds the mixer advances per frame, independent of wall-clock time.
pub const FIXED_ANIMATION_STEP: f32 = 0.016;

/// Per-frame scene update that runs before the draw: camera first, then
/// the animation once it has been started.
pub fn advance(state: &mut ViewerState, orbit: &mut OrbitController, stage: &mut Stage) -> bool {
    let mut changed = orbit.update(&mut stage.camera);
    if state.animation_started {
        if let Some(animation) = state.animation.as_mut() {
            animation.mixer.update(FIXED_ANIMATION_STEP, &mut stage.graph);
            changed = true;
        }
    }
    changed
}
