use eframe::egui;
use viewer_core::{AppViewModel, Entities, Msg};

use super::constants::*;
use super::texture::TextureSlot;

pub fn show(ui: &mut egui::Ui, view: &AppViewModel, tree: &TextureSlot) -> Vec<Msg> {
    let mut msgs = Vec::new();

    ui.heading("Confirmation");
    if let Some(notice) = &view.notice {
        ui.colored_label(WARNING_COLOR, notice.as_str());
    }

    ui.horizontal(|ui| {
        ui.label("Timeline:");
        ui.spacing_mut().slider_width = TIMELINE_WIDTH;
        let mut selected = view.selected;
        let slider = egui::Slider::new(&mut selected, 0..=view.max_step()).show_value(false);
        if ui.add_enabled(view.history_len > 0, slider).changed() {
            msgs.push(Msg::StepSelected(selected));
        }
        ui.label(view.step_label.as_str());
        if ui
            .add_enabled(view.history_len > 0, egui::Button::new("Regenerate"))
            .clicked()
        {
            msgs.push(Msg::RegenerateClicked);
        }
    });
    ui.separator();

    ui.columns(3, |columns| {
        columns[0].heading("Code");
        egui::ScrollArea::both()
            .id_source("selected_code_scroll")
            .show(&mut columns[0], |ui| {
                let code = view.selected_code.as_deref().unwrap_or_default();
                ui.label(egui::RichText::new(code).monospace());
            });

        columns[1].heading("AST (JSON)");
        egui::ScrollArea::both()
            .id_source("ast_json_scroll")
            .show(&mut columns[1], |ui| {
                ui.label(egui::RichText::new(view.ast_text.as_str()).monospace());
            });

        columns[2].heading("AST Tree");
        egui::ScrollArea::vertical()
            .id_source("ast_tree_scroll")
            .show(&mut columns[2], |ui| {
                if let Some(handle) = tree.handle() {
                    ui.add(
                        egui::Image::new((handle.id(), handle.size_vec2()))
                            .max_width(TREE_MAX_WIDTH),
                    );
                }
                if let Some(entities) = &view.entities {
                    ui.separator();
                    entities_list(ui, entities);
                }
            });
    });

    msgs
}

fn entities_list(ui: &mut egui::Ui, entities: &Entities) {
    ui.label(egui::RichText::new("Operators").strong());
    ui.label(join_or_dash(&entities.operators));
    ui.label(egui::RichText::new("Functions").strong());
    ui.label(join_or_dash(&entities.functions));
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}
