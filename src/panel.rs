use eframe::egui::{self, Context, TextureId};

use crate::ember::Engine;

pub const PANEL_WIDTH: u32 = 220;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelAction {
    Reset,
    Save,
    SetMaxBounces(u32),
}

// 오른쪽 설정 패널 + 가운데 렌더링 결과
pub struct Panel {
    pub restart_on_move: bool,
    pub fps: f32,
    max_bounces: u32,
}

impl Panel {
    pub fn new(engine: &Engine) -> Self {
        Self {
            restart_on_move: false,
            fps: 0.0,
            max_bounces: engine.settings().max_bounces,
        }
    }

    pub fn show(
        &mut self,
        ctx: &Context,
        engine: &Engine,
        frame: TextureId,
        grabbed: bool,
    ) -> Vec<PanelAction> {
        let mut actions = Vec::new();
        let settings = engine.settings();

        egui::SidePanel::right("Side Menu")
            .resizable(false)
            .default_width(PANEL_WIDTH as f32)
            .show(ctx, |ui| {
                ui.heading("Ember");
                ui.separator();

                let target = settings.sample_count_target;
                let progress = engine.frame_num() as f32 / target as f32;
                ui.label(format!("samples {} / {}", engine.frame_num(), target));
                ui.add(egui::ProgressBar::new(progress).show_percentage());
                ui.label(format!("{:.0} fps", self.fps));

                let position = engine.camera().position;
                ui.label(format!(
                    "camera ({:.2}, {:.2}, {:.2})",
                    position.x, position.y, position.z
                ));

                ui.separator();

                if ui
                    .add(egui::Slider::new(&mut self.max_bounces, 1..=16).text("bounces"))
                    .changed()
                {
                    actions.push(PanelAction::SetMaxBounces(self.max_bounces));
                }
                ui.checkbox(&mut self.restart_on_move, "restart on camera move");

                ui.horizontal(|ui| {
                    if ui.button("Reset").clicked() {
                        actions.push(PanelAction::Reset);
                    }
                    if ui.button("Save PNG").clicked() {
                        actions.push(PanelAction::Save);
                    }
                });

                ui.separator();
                ui.small(if grabbed {
                    "WASD move, C release mouse"
                } else {
                    "WASD move, C grab mouse to look"
                });
                ui.small("Space reset, P save, Esc quit");
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                // 비율 유지하면서 꽉 차게
                let available = ui.available_size();
                let (width, height) = (settings.width as f32, settings.height as f32);
                let scale = (available.x / width).min(available.y / height).max(0.0);

                ui.vertical_centered(|ui| {
                    ui.image(frame, egui::vec2(width * scale, height * scale));
                });
            });

        actions
    }
}
