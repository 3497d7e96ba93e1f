use crate::controls::{
    COLOR_RANGE, ControlBinder, ControlEvent, ControlId, MORPH_MAX, MORPH_MIN, MORPH_STEP,
    MorphPanel, SIZE_INITIAL, SIZE_RANGE,
};
use crate::settings::UiSettings;
use crate::state::ViewerState;

/// Side panel carrying the bound controls and the generated shape-key
/// sliders. Widgets only report what the user did; the binder applies it.
pub struct ControlPanel {
    color: f32,
    size: f32,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self {
            color: COLOR_RANGE.0,
            size: SIZE_INITIAL,
        }
    }

    pub fn color(&self) -> f32 {
        self.color
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        settings: &UiSettings,
        binder: &ControlBinder,
        state: &ViewerState,
        morph_panel: Option<&MorphPanel>,
    ) -> Vec<ControlEvent> {
        let mut events = Vec::new();
        if !settings.show_panel {
            return events;
        }

        egui::SidePanel::right("controls")
            .resizable(false)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Controls");
                ui.separator();

                if binder.is_bound(ControlId::Color) {
                    ui.label(ControlId::Color.label());
                    if ui
                        .add(egui::Slider::new(&mut self.color, COLOR_RANGE.0..=COLOR_RANGE.1))
                        .changed()
                    {
                        events.push(ControlEvent::Color(self.color));
                    }
                }

                if binder.is_bound(ControlId::Size) {
                    ui.label(ControlId::Size.label());
                    if ui
                        .add(egui::Slider::new(&mut self.size, SIZE_RANGE.0..=SIZE_RANGE.1))
                        .changed()
                    {
                        events.push(ControlEvent::Size(self.size));
                    }
                }

                ui.separator();
                ui.horizontal_wrapped(|ui| {
                    if binder.is_bound(ControlId::Animate) {
                        let running = state
                            .animation
                            .as_ref()
                            .and_then(|a| a.action())
                            .is_some_and(|a| a.is_advancing());
                        if ui
                            .selectable_label(running, ControlId::Animate.label())
                            .clicked()
                        {
                            events.push(ControlEvent::Animate);
                        }
                    }
                    if binder.is_bound(ControlId::AutoRotate)
                        && ui
                            .selectable_label(state.auto_rotate, ControlId::AutoRotate.label())
                            .clicked()
                    {
                        events.push(ControlEvent::AutoRotate);
                    }
                    if binder.is_bound(ControlId::Wireframe)
                        && ui.button(ControlId::Wireframe.label()).clicked()
                    {
                        events.push(ControlEvent::Wireframe);
                    }
                });

                let Some(panel) = morph_panel.filter(|_| settings.show_shape_keys) else {
                    return;
                };
                ui.separator();
                egui::CollapsingHeader::new("Shape keys")
                    .default_open(true)
                    .show(ui, |ui| {
                        if panel.is_empty() {
                            ui.label("No shape keys");
                        }
                        egui::ScrollArea::vertical().show(ui, |ui| {
                            for (index, slider) in panel.sliders().iter().enumerate() {
                                ui.push_id(index, |ui| {
                                    ui.label(slider.label.as_str());
                                    let mut value = slider.value;
                                    let response = ui.add(
                                        egui::Slider::new(&mut value, MORPH_MIN..=MORPH_MAX)
                                            .step_by(MORPH_STEP as f64)
                                            .trailing_fill(true),
                                    );
                                    if response.changed() {
                                        events.push(ControlEvent::Morph { index, value });
                                    }
                                });
                            }
                        });
                    });
            });

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ControlSettings;

    fn run_once(panel: &mut ControlPanel, settings: &UiSettings) -> Vec<ControlEvent> {
        let ctx = egui::Context::default();
        let binder = ControlBinder::bind(&ControlSettings::default());
        let state = ViewerState::new();
        let morph = MorphPanel::new();
        let mut events = Vec::new();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            events = panel.show(ctx, settings, &binder, &state, Some(&morph));
        });
        events
    }

    #[test]
    fn sliders_start_at_their_initial_values() {
        let panel = ControlPanel::new();
        assert_eq!(panel.color(), 0.0);
        assert_eq!(panel.size(), 100.0);
    }

    #[test]
    fn idle_frame_emits_nothing() {
        let mut panel = ControlPanel::new();
        assert!(run_once(&mut panel, &UiSettings::default()).is_empty());

        let hidden = UiSettings {
            show_panel: false,
            show_shape_keys: false,
        };
        assert!(run_once(&mut panel, &hidden).is_empty());
    }
}
