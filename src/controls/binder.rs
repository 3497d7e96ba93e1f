use log::debug;

use super::morph::MorphPanel;
use crate::renderer::camera::OrbitController;
use crate::scene::{Color, SceneGraph};
use crate::settings::ControlSettings;
use crate::state::ViewerState;

pub const AUTO_ROTATE_SPEED: f32 = 2.0;
pub const COLOR_SATURATION: f32 = 0.7;
pub const COLOR_LIGHTNESS: f32 = 0.5;

pub const COLOR_RANGE: (f32, f32) = (0.0, 360.0);
pub const SIZE_RANGE: (f32, f32) = (1.0, 200.0);
pub const SIZE_INITIAL: f32 = 100.0;

/// Stable identity of each panel control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    Color,
    Size,
    Animate,
    AutoRotate,
    Wireframe,
}

impl ControlId {
    pub const ALL: [ControlId; 5] = [
        ControlId::Color,
        ControlId::Size,
        ControlId::Animate,
        ControlId::AutoRotate,
        ControlId::Wireframe,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ControlId::Color => "Color",
            ControlId::Size => "Size",
            ControlId::Animate => "Animate",
            ControlId::AutoRotate => "Auto-rotate",
            ControlId::Wireframe => "Wireframe",
        }
    }

    fn enabled_in(self, settings: &ControlSettings) -> bool {
        match self {
            ControlId::Color => settings.color,
            ControlId::Size => settings.size,
            ControlId::Animate => settings.animate,
            ControlId::AutoRotate => settings.auto_rotate,
            ControlId::Wireframe => settings.wireframe,
        }
    }
}

/// One user interaction coming from the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    Color(f32),
    Size(f32),
    Animate,
    AutoRotate,
    Wireframe,
    Morph { index: usize, value: f32 },
}

impl ControlEvent {
    /// Shape-key sliders are not one of the five bound controls.
    pub fn control(&self) -> Option<ControlId> {
        match self {
            ControlEvent::Color(_) => Some(ControlId::Color),
            ControlEvent::Size(_) => Some(ControlId::Size),
            ControlEvent::Animate => Some(ControlId::Animate),
            ControlEvent::AutoRotate => Some(ControlId::AutoRotate),
            ControlEvent::Wireframe => Some(ControlId::Wireframe),
            ControlEvent::Morph { .. } => None,
        }
    }
}

/// Everything a control handler may touch.
pub struct ControlContext<'a> {
    pub state: &'a mut ViewerState,
    pub graph: &'a mut SceneGraph,
    pub orbit: &'a mut OrbitController,
    pub morph_panel: Option<&'a mut MorphPanel>,
}

/// Routes panel events to their handlers. Controls disabled in the
/// settings have no binding and their events are dropped.
#[derive(Debug, Default)]
pub struct ControlBinder {
    bound: Vec<ControlId>,
}

impl ControlBinder {
    pub fn bind(settings: &ControlSettings) -> Self {
        let bound: Vec<ControlId> = ControlId::ALL
            .into_iter()
            .filter(|id| id.enabled_in(settings))
            .collect();
        debug!("Bound controls: {:?}", bound);
        Self { bound }
    }

    pub fn is_bound(&self, id: ControlId) -> bool {
        self.bound.contains(&id)
    }

    /// Applies one event. Returns whether anything changed.
    pub fn dispatch(&self, event: ControlEvent, ctx: &mut ControlContext<'_>) -> bool {
        if let Some(id) = event.control() {
            if !self.is_bound(id) {
                return false;
            }
        }
        match event {
            ControlEvent::Color(value) => on_color(value, ctx.state, ctx.graph),
            ControlEvent::Size(value) => on_size(value, ctx.state, ctx.graph),
            ControlEvent::Animate => on_animate(ctx.state),
            ControlEvent::AutoRotate => {
                on_auto_rotate(ctx.state, ctx.orbit);
                true
            }
            ControlEvent::Wireframe => on_wireframe(ctx.state, ctx.graph),
            ControlEvent::Morph { index, value } => match ctx.morph_panel.as_deref_mut() {
                Some(panel) if index < panel.len() => {
                    panel.input(index, value, ctx.graph);
                    true
                }
                _ => false,
            },
        }
    }
}

/// Hue from a 0..360 slider, fixed saturation and lightness, written to
/// every material slot of the primary mesh.
pub fn on_color(value: f32, state: &ViewerState, graph: &mut SceneGraph) -> bool {
    let Some(mesh) = state.primary_mesh.and_then(|id| graph.mesh_mut(id)) else {
        return false;
    };
    let color = Color::from_hsl(value / 360.0, COLOR_SATURATION, COLOR_LIGHTNESS);
    for material in mesh.materials_mut() {
        *material.color_mut() = color;
    }
    true
}

/// Uniform scale of `value / 100`.
pub fn on_size(value: f32, state: &ViewerState, graph: &mut SceneGraph) -> bool {
    let Some(node) = state.primary_mesh.and_then(|id| graph.get_mut(id)) else {
        return false;
    };
    node.transform.set_uniform_scale(value / 100.0);
    true
}

pub fn on_wireframe(state: &ViewerState, graph: &mut SceneGraph) -> bool {
    let Some(mesh) = state.primary_mesh.and_then(|id| graph.mesh_mut(id)) else {
        return false;
    };
    for material in mesh.materials_mut() {
        material.toggle_wireframe();
    }
    true
}

/// Works before any asset is loaded.
pub fn on_auto_rotate(state: &mut ViewerState, orbit: &mut OrbitController) {
    state.auto_rotate = !state.auto_rotate;
    orbit.set_auto_rotate(state.auto_rotate, AUTO_ROTATE_SPEED);
}

/// First press starts the action, later presses toggle pause. Nothing
/// ever stops or rewinds it.
pub fn on_animate(state: &mut ViewerState) -> bool {
    let started = state.animation_started;
    let Some(action) = state.animation.as_mut().and_then(|a| a.action_mut()) else {
        return false;
    };
    if !started {
        action.play();
        state.animation_started = true;
    } else {
        action.paused = !action.paused;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Material, MaterialKind};
    use crate::scene::{Geometry, Mesh, MeshMaterial, Node};
    use crate::stage::PerspectiveCamera;

    fn graph_with_mesh() -> (SceneGraph, ViewerState) {
        let mut graph = SceneGraph::new();
        let mut mesh = Mesh::new(Geometry::default(), Material::default());
        mesh.material = MeshMaterial::Multi(vec![Material::default(), Material::basic(Color::BLACK)]);
        let id = graph.add(Node::mesh("m", mesh));
        let mut state = ViewerState::new();
        state.primary_mesh = Some(id);
        (graph, state)
    }

    fn orbit() -> OrbitController {
        OrbitController::for_camera(&PerspectiveCamera::new(75.0, 1.0, 0.1, 1000.0))
    }

    #[test]
    fn color_reaches_every_slot() {
        let (mut graph, state) = graph_with_mesh();
        assert!(on_color(120.0, &state, &mut graph));
        let mesh = graph.mesh(state.primary_mesh.unwrap()).unwrap();
        for material in mesh.materials() {
            let c = material.color();
            assert!((c.r - 0.15).abs() < 1e-4);
            assert!((c.g - 0.85).abs() < 1e-4);
            assert!((c.b - 0.15).abs() < 1e-4);
        }
    }

    #[test]
    fn wireframe_toggles_every_slot_twice_back() {
        let (mut graph, state) = graph_with_mesh();
        on_wireframe(&state, &mut graph);
        let mesh = graph.mesh(state.primary_mesh.unwrap()).unwrap();
        assert!(mesh.materials().all(|m| m.wireframe));
        on_wireframe(&state, &mut graph);
        let mesh = graph.mesh(state.primary_mesh.unwrap()).unwrap();
        assert!(mesh.materials().all(|m| !m.wireframe));
        assert!(matches!(mesh.materials().nth(1).unwrap().kind, MaterialKind::Basic(_)));
    }

    #[test]
    fn size_sets_uniform_scale() {
        let (mut graph, state) = graph_with_mesh();
        on_size(150.0, &state, &mut graph);
        let node = graph.get(state.primary_mesh.unwrap()).unwrap();
        assert_eq!(node.transform.scale, nalgebra_glm::vec3(1.5, 1.5, 1.5));
    }

    #[test]
    fn handlers_without_primary_mesh_do_nothing() {
        let mut graph = SceneGraph::new();
        let mut state = ViewerState::new();
        assert!(!on_color(10.0, &state, &mut graph));
        assert!(!on_size(10.0, &state, &mut graph));
        assert!(!on_wireframe(&state, &mut graph));
        assert!(!on_animate(&mut state));
        assert!(!state.animation_started);
    }

    #[test]
    fn auto_rotate_flips_and_forwards_speed() {
        let mut state = ViewerState::new();
        let mut orbit = orbit();
        on_auto_rotate(&mut state, &mut orbit);
        assert!(state.auto_rotate && orbit.auto_rotate);
        assert_eq!(orbit.auto_rotate_speed, 2.0);
        on_auto_rotate(&mut state, &mut orbit);
        assert!(!state.auto_rotate && !orbit.auto_rotate);
    }

    #[test]
    fn disabled_controls_are_not_bound() {
        let settings = ControlSettings {
            wireframe: false,
            ..Default::default()
        };
        let binder = ControlBinder::bind(&settings);
        assert!(!binder.is_bound(ControlId::Wireframe));
        assert!(binder.is_bound(ControlId::Color));

        let (mut graph, mut state) = graph_with_mesh();
        let mut orbit = orbit();
        let mut ctx = ControlContext {
            state: &mut state,
            graph: &mut graph,
            orbit: &mut orbit,
            morph_panel: None,
        };
        assert!(!binder.dispatch(ControlEvent::Wireframe, &mut ctx));
        assert!(binder.dispatch(ControlEvent::Size(50.0), &mut ctx));
        assert!(!binder.dispatch(ControlEvent::Morph { index: 0, value: 1.0 }, &mut ctx));
    }
}
