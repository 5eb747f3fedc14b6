use egui::Context;

use crate::controller::{ObjectInteractor, TaskState, TextLabel};
use crate::model::ColorAttribute;

const MAX_SWATCHES: usize = 64;

/// Playback buttons pressed this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Pause,
    Resume,
    Restart,
}

/// What the desktop panel reads besides the interactor itself
pub struct PanelState<'a> {
    pub time_label: &'a TextLabel,
    pub speed_label: &'a TextLabel,
    pub playback: Option<TaskState>,
    pub source: &'a str,
}

/// Build the desktop UI and return egui output plus any requested playback action
pub fn build_ui(
    egui_ctx: &Context,
    raw_input: egui::RawInput,
    panel: &PanelState<'_>,
    interactor: &mut ObjectInteractor,
) -> (egui::FullOutput, Option<PanelAction>) {
    let mut action = None;
    let output = egui_ctx.run(raw_input, |ctx| {
        action = draw_playback_window(ctx, panel, interactor);
    });
    (output, action)
}

fn draw_playback_window(ctx: &Context, panel: &PanelState<'_>, interactor: &mut ObjectInteractor) -> Option<PanelAction> {
    let mut action = None;
    egui::Window::new("Playback")
        .default_pos([8.0, 8.0])
        .default_size([260.0, 160.0])
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(panel.source).small());
            ui.separator();
            ui.label(panel.time_label.text());
            ui.label(panel.speed_label.text());

            // Like the page's range input, speed only changes once a drag is released;
            // the in-progress value lives in egui memory until then
            let settings = interactor.slider_settings();
            let drag_id = ui.make_persistent_id("speed_slider");
            let mut speed = ui.data(|d| d.get_temp::<f32>(drag_id)).unwrap_or(settings.value);
            let slider = egui::Slider::new(&mut speed, settings.min..=settings.max)
                .step_by(settings.step as f64)
                .show_value(false);
            let response = ui.add(slider);
            if response.dragged() {
                ui.data_mut(|d| d.insert_temp(drag_id, speed));
            } else {
                ui.data_mut(|d| d.remove::<f32>(drag_id));
            }
            if slider_commits(response.changed(), response.dragged(), response.drag_stopped()) {
                interactor.on_slider_change(speed);
            }

            ui.horizontal(|ui| {
                match panel.playback {
                    Some(TaskState::Running { .. }) => {
                        if ui.button("Pause").clicked() {
                            action = Some(PanelAction::Pause);
                        }
                    }
                    Some(TaskState::Paused { .. }) => {
                        if ui.button("Resume").clicked() {
                            action = Some(PanelAction::Resume);
                        }
                    }
                    _ => {}
                }
                if panel.playback.is_some() && ui.button("Restart").clicked() {
                    action = Some(PanelAction::Restart);
                }
            });

            draw_color_strip(ui, &interactor.target().colors);
        });
    action
}

/// A `change` fires on release of a drag, or on a click/keyboard edit
fn slider_commits(changed: bool, dragged: bool, drag_stopped: bool) -> bool {
    drag_stopped || (changed && !dragged)
}

/// Evenly sampled swatches of the current vertex colors
fn draw_color_strip(ui: &mut egui::Ui, colors: &ColorAttribute) {
    let count = colors.vertex_count();
    if count == 0 {
        ui.label(egui::RichText::new("No colors yet").small());
        return;
    }

    let swatches = count.min(MAX_SWATCHES);
    let width = ui.available_width().max(64.0);
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, 16.0), egui::Sense::hover());
    let swatch_w = rect.width() / swatches as f32;
    let painter = ui.painter();
    for i in 0..swatches {
        let Some([r, g, b]) = colors.vertex(i * count / swatches) else {
            continue;
        };
        let color = egui::Color32::from_rgb(
            (r.clamp(0.0, 1.0) * 255.0) as u8,
            (g.clamp(0.0, 1.0) * 255.0) as u8,
            (b.clamp(0.0, 1.0) * 255.0) as u8,
        );
        let min = egui::pos2(rect.min.x + swatch_w * i as f32, rect.min.y);
        painter.rect_filled(egui::Rect::from_min_size(min, egui::vec2(swatch_w, rect.height())), 0.0, color);
    }
    ui.label(egui::RichText::new(format!("{count} vertices")).small());
}
