use glbview::controls::{ControlBinder, ControlContext, ControlEvent, MorphPanel};
use glbview::loader::{LoadedAsset, import_glb, on_load};
use glbview::material::MaterialKind;
use glbview::render_loop;
use glbview::renderer::camera::OrbitController;
use glbview::scene::{Color, NodeId};
use glbview::settings::{ControlSettings, DisplaySettings};
use glbview::stage::{Stage, Viewport};
use glbview::state::ViewerState;
use serde_json::json;

const TRIANGLE: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
const SMILE: [[f32; 3]; 3] = [[0.0, 0.1, 0.0], [0.0, 0.1, 0.0], [0.0, 0.0, 0.0]];
const BLINK: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, -0.1, 0.0]];

fn push_floats(bin: &mut Vec<u8>, values: impl IntoIterator<Item = f32>) {
    for v in values {
        bin.extend_from_slice(&v.to_le_bytes());
    }
}

fn vec3_accessor(offset: usize, min: [f32; 3], max: [f32; 3]) -> serde_json::Value {
    json!({
        "bufferView": 0,
        "byteOffset": offset,
        "componentType": 5126,
        "count": 3,
        "type": "VEC3",
        "min": min,
        "max": max,
    })
}

/// Two meshes: "Head" with smile/blink shape keys and a material, then
/// "Base" with a one second linear translation clip.
fn two_mesh_glb() -> Vec<u8> {
    let mut bin = Vec::new();
    for block in [TRIANGLE, SMILE, BLINK, TRIANGLE] {
        push_floats(&mut bin, block.into_iter().flatten());
    }
    let geometry_len = bin.len();
    push_floats(&mut bin, [0.0, 1.0]);
    push_floats(&mut bin, [0.0, -1.0, 0.0, 1.0, -1.0, 0.0]);

    let document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "name": "Scene", "nodes": [0, 1] }],
        "nodes": [
            { "name": "Head", "mesh": 0, "weights": [0.2, 0.0] },
            { "name": "Base", "mesh": 1, "translation": [0.0, -1.0, 0.0] }
        ],
        "meshes": [
            {
                "name": "Head",
                "primitives": [{
                    "attributes": { "POSITION": 0 },
                    "targets": [{ "POSITION": 1 }, { "POSITION": 2 }],
                    "material": 0
                }],
                "weights": [0.0, 0.0],
                "extras": { "targetNames": ["smile", "blink"] }
            },
            {
                "name": "Base",
                "primitives": [{ "attributes": { "POSITION": 3 } }]
            }
        ],
        "materials": [{
            "name": "Skin",
            "pbrMetallicRoughness": {
                "baseColorFactor": [1.0, 1.0, 1.0, 1.0],
                "metallicFactor": 0.0,
                "roughnessFactor": 1.0
            }
        }],
        "animations": [{
            "name": "Bob",
            "channels": [{ "sampler": 0, "target": { "node": 1, "path": "translation" } }],
            "samplers": [{ "input": 4, "output": 5, "interpolation": "LINEAR" }]
        }],
        "buffers": [{ "byteLength": bin.len() }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": geometry_len },
            { "buffer": 0, "byteOffset": geometry_len, "byteLength": bin.len() - geometry_len }
        ],
        "accessors": [
            vec3_accessor(0, [0.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
            vec3_accessor(36, [0.0, 0.0, 0.0], [0.0, 0.1, 0.0]),
            vec3_accessor(72, [0.0, -0.1, 0.0], [0.0, 0.0, 0.0]),
            vec3_accessor(108, [0.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
            {
                "bufferView": 1,
                "byteOffset": 0,
                "componentType": 5126,
                "count": 2,
                "type": "SCALAR",
                "min": [0.0],
                "max": [1.0]
            },
            {
                "bufferView": 1,
                "byteOffset": 8,
                "componentType": 5126,
                "count": 2,
                "type": "VEC3"
            }
        ]
    });

    glb(&serde_json::to_vec(&document).unwrap(), &bin)
}

fn glb(json: &[u8], bin: &[u8]) -> Vec<u8> {
    let mut json = json.to_vec();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let mut bin = bin.to_vec();
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    // The binary chunk is optional
    let bin_chunk = if bin.is_empty() { 0 } else { 8 + bin.len() };
    let total = 12 + 8 + json.len() + bin_chunk;
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json);
    if bin_chunk > 0 {
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(b"BIN\0");
        out.extend_from_slice(&bin);
    }
    out
}

/// Same geometry twice: "Nested" sits under the first root node "Rig",
/// "Sibling" is the second root node.
fn nested_mesh_glb() -> Vec<u8> {
    let mut bin = Vec::new();
    push_floats(&mut bin, TRIANGLE.into_iter().flatten());

    let triangle = json!({ "primitives": [{ "attributes": { "POSITION": 0 } }] });
    let document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0, 2] }],
        "nodes": [
            { "name": "Rig", "children": [1] },
            { "name": "Nested", "mesh": 0 },
            { "name": "Sibling", "mesh": 1 }
        ],
        "meshes": [triangle, triangle],
        "buffers": [{ "byteLength": bin.len() }],
        "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": bin.len() }],
        "accessors": [vec3_accessor(0, [0.0, 0.0, 0.0], [1.0, 1.0, 0.0])]
    });

    glb(&serde_json::to_vec(&document).unwrap(), &bin)
}

/// Only group nodes, no buffers at all.
fn groups_only_glb() -> Vec<u8> {
    let document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "name": "Empty", "nodes": [0, 2] }],
        "nodes": [
            { "name": "Pivot", "children": [1] },
            { "name": "Socket", "translation": [0.0, 1.0, 0.0] },
            { "name": "Marker" }
        ]
    });

    glb(&serde_json::to_vec(&document).unwrap(), &[])
}

struct Viewer {
    stage: Stage,
    state: ViewerState,
    orbit: OrbitController,
    panel: Option<MorphPanel>,
    binder: ControlBinder,
}

impl Viewer {
    fn new(controls: &ControlSettings) -> Self {
        let stage = Stage::bootstrap(
            Viewport {
                width: 800,
                height: 600,
            },
            &DisplaySettings::default(),
        )
        .unwrap();
        let orbit = OrbitController::for_camera(&stage.camera);
        Self {
            stage,
            state: ViewerState::new(),
            orbit,
            panel: Some(MorphPanel::new()),
            binder: ControlBinder::bind(controls),
        }
    }

    fn load(&mut self, asset: LoadedAsset) {
        on_load(asset, &mut self.stage, &mut self.state, self.panel.as_mut());
    }

    fn send(&mut self, event: ControlEvent) -> bool {
        let mut ctx = ControlContext {
            state: &mut self.state,
            graph: &mut self.stage.graph,
            orbit: &mut self.orbit,
            morph_panel: self.panel.as_mut(),
        };
        self.binder.dispatch(event, &mut ctx)
    }

    fn node_named(&self, name: &str) -> NodeId {
        self.stage
            .graph
            .traverse(self.stage.root)
            .into_iter()
            .find(|id| self.stage.graph.get(*id).unwrap().name == name)
            .unwrap()
    }

    fn influences(&self, id: NodeId) -> Vec<f32> {
        let mesh = self.stage.graph.mesh(id).unwrap();
        mesh.morph.as_ref().unwrap().influences().to_vec()
    }
}

#[test]
fn load_wires_primary_mesh_shadows_and_materials() {
    let asset = import_glb(&two_mesh_glb()).unwrap();
    let mut viewer = Viewer::new(&ControlSettings::default());
    let summary = on_load(
        asset,
        &mut viewer.stage,
        &mut viewer.state,
        viewer.panel.as_mut(),
    );

    assert_eq!(summary.meshes, 2);
    assert_eq!(summary.clips, 1);
    assert_eq!(summary.sliders, 2);

    let head = viewer.node_named("Head");
    assert_eq!(viewer.state.primary_mesh, Some(head));

    for name in ["Head", "Base"] {
        let node = viewer.stage.graph.get(viewer.node_named(name)).unwrap();
        assert!(node.cast_shadow && node.receive_shadow);
        let mesh = node.as_mesh().unwrap();
        for material in mesh.materials() {
            let MaterialKind::Physical(physical) = &material.kind else {
                panic!("{name} was not promoted");
            };
            assert_eq!(physical.standard.roughness, 0.25);
            assert_eq!(physical.standard.metalness, 0.7);
            assert!(physical.standard.bump_map.is_some());
            assert!(material.needs_update);
        }
    }
}

#[test]
fn shape_key_sliders_follow_channel_order_and_drive_influences() {
    let asset = import_glb(&two_mesh_glb()).unwrap();
    let mut viewer = Viewer::new(&ControlSettings::default());
    viewer.load(asset);

    let panel = viewer.panel.as_ref().unwrap();
    let labels: Vec<&str> = panel.sliders().iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, ["smile", "blink"]);
    assert_eq!(panel.sliders()[0].value, 0.2);
    assert_eq!(panel.sliders()[0].fill, 20.0);
    assert_eq!(panel.sliders()[1].value, 0.0);

    let head = viewer.node_named("Head");
    let smile = panel
        .sliders()
        .iter()
        .position(|s| s.label == "smile")
        .unwrap();
    assert!(viewer.send(ControlEvent::Morph {
        index: smile,
        value: 0.8,
    }));

    assert_eq!(viewer.influences(head), [0.8, 0.0]);
    let slider = &viewer.panel.as_ref().unwrap().sliders()[smile];
    assert_eq!(slider.value, 0.8);
    assert_eq!(slider.fill, 80.0);
}

#[test]
fn animate_starts_then_toggles_pause() {
    let asset = import_glb(&two_mesh_glb()).unwrap();
    let mut viewer = Viewer::new(&ControlSettings::default());
    viewer.load(asset);
    let base = viewer.node_named("Base");
    let x = |v: &Viewer| v.stage.graph.get(base).unwrap().transform.translation.x;

    render_loop::advance(&mut viewer.state, &mut viewer.orbit, &mut viewer.stage);
    assert_eq!(x(&viewer), 0.0);

    assert!(viewer.send(ControlEvent::Animate));
    assert!(viewer.state.animation_started);
    for _ in 0..10 {
        render_loop::advance(&mut viewer.state, &mut viewer.orbit, &mut viewer.stage);
    }
    let moved = x(&viewer);
    assert!((moved - 0.16).abs() < 1e-4, "x = {moved}");

    assert!(viewer.send(ControlEvent::Animate));
    render_loop::advance(&mut viewer.state, &mut viewer.orbit, &mut viewer.stage);
    assert_eq!(x(&viewer), moved);

    assert!(viewer.send(ControlEvent::Animate));
    render_loop::advance(&mut viewer.state, &mut viewer.orbit, &mut viewer.stage);
    assert!(x(&viewer) > moved);
}

#[test]
fn color_size_and_wireframe_touch_only_the_primary_mesh() {
    let asset = import_glb(&two_mesh_glb()).unwrap();
    let mut viewer = Viewer::new(&ControlSettings::default());
    viewer.load(asset);
    let head = viewer.node_named("Head");
    let base = viewer.node_named("Base");
    let base_color = viewer.stage.graph.mesh(base).unwrap().materials().next().unwrap().color();

    assert!(viewer.send(ControlEvent::Color(120.0)));
    assert!(viewer.send(ControlEvent::Size(50.0)));
    assert!(viewer.send(ControlEvent::Wireframe));

    let expected = Color::from_hsl(120.0 / 360.0, 0.7, 0.5);
    let head_node = viewer.stage.graph.get(head).unwrap();
    let material = head_node.as_mesh().unwrap().materials().next().unwrap();
    assert_eq!(material.color(), expected);
    assert!(material.wireframe);
    assert_eq!(head_node.transform.scale.x, 0.5);
    assert_eq!(head_node.transform.scale.z, 0.5);

    let base_mesh = viewer.stage.graph.mesh(base).unwrap();
    let base_material = base_mesh.materials().next().unwrap();
    assert_eq!(base_material.color(), base_color);
    assert!(!base_material.wireframe);

    assert!(viewer.send(ControlEvent::Wireframe));
    let material = viewer.stage.graph.mesh(head).unwrap().materials().next().unwrap();
    assert!(!material.wireframe);
}

#[test]
fn controls_are_inert_before_anything_loads() {
    let mut viewer = Viewer::new(&ControlSettings::default());

    assert!(!viewer.send(ControlEvent::Color(200.0)));
    assert!(!viewer.send(ControlEvent::Size(10.0)));
    assert!(!viewer.send(ControlEvent::Wireframe));
    assert!(!viewer.send(ControlEvent::Animate));
    assert!(!viewer.send(ControlEvent::Morph {
        index: 0,
        value: 0.5,
    }));
    assert!(!viewer.state.animation_started);

    // Auto-rotate needs no mesh
    assert!(viewer.send(ControlEvent::AutoRotate));
    assert!(viewer.state.auto_rotate);
    assert!(viewer.orbit.auto_rotate);
}

#[test]
fn disabled_controls_have_no_binding() {
    let asset = import_glb(&two_mesh_glb()).unwrap();
    let mut viewer = Viewer::new(&ControlSettings {
        color: false,
        wireframe: false,
        ..ControlSettings::default()
    });
    viewer.load(asset);
    let head = viewer.node_named("Head");
    let before = viewer.stage.graph.mesh(head).unwrap().materials().next().unwrap().color();

    assert!(!viewer.send(ControlEvent::Color(90.0)));
    assert!(!viewer.send(ControlEvent::Wireframe));
    assert!(viewer.send(ControlEvent::Size(150.0)));

    let material = viewer.stage.graph.mesh(head).unwrap().materials().next().unwrap();
    assert_eq!(material.color(), before);
    assert!(!material.wireframe);
}

#[test]
fn missing_morph_panel_skips_sliders_only() {
    let asset = import_glb(&two_mesh_glb()).unwrap();
    let mut viewer = Viewer::new(&ControlSettings::default());
    viewer.panel = None;
    let summary = on_load(asset, &mut viewer.stage, &mut viewer.state, None);

    assert_eq!(summary.sliders, 0);
    assert!(viewer.state.primary_mesh.is_some());
    assert!(viewer.state.animation.is_some());
}

#[test]
fn nested_mesh_wins_over_later_root_mesh() {
    let asset = import_glb(&nested_mesh_glb()).unwrap();
    let mut viewer = Viewer::new(&ControlSettings::default());
    let summary = on_load(
        asset,
        &mut viewer.stage,
        &mut viewer.state,
        viewer.panel.as_mut(),
    );

    assert_eq!(summary.meshes, 2);
    assert_eq!(viewer.state.primary_mesh, Some(viewer.node_named("Nested")));
}

#[test]
fn mesh_less_asset_leaves_controls_inert() {
    let asset = import_glb(&groups_only_glb()).unwrap();
    let mut viewer = Viewer::new(&ControlSettings::default());
    let summary = on_load(
        asset,
        &mut viewer.stage,
        &mut viewer.state,
        viewer.panel.as_mut(),
    );

    assert_eq!(summary.meshes, 0);
    assert_eq!(summary.clips, 0);
    assert_eq!(summary.sliders, 0);
    assert!(viewer.state.primary_mesh.is_none());
    let pivot = viewer.node_named("Pivot");
    assert!(viewer.stage.graph.get(pivot).unwrap().as_mesh().is_none());

    assert!(!viewer.send(ControlEvent::Color(120.0)));
    assert!(!viewer.send(ControlEvent::Size(50.0)));
    assert!(!viewer.send(ControlEvent::Wireframe));
    assert!(!viewer.send(ControlEvent::Animate));
    assert!(!viewer.state.animation_started);
}
