use eframe::egui;
use viewer_core::{AppViewModel, Msg, SaveStatus};

use super::constants::*;

pub fn show(ui: &mut egui::Ui, view: &AppViewModel) -> Vec<Msg> {
    let mut msgs = Vec::new();

    ui.heading("Enter your code");
    ui.horizontal(|ui| {
        if ui.button("Clear").clicked() {
            msgs.push(Msg::ClearClicked);
        }
        save_status_label(ui, &view.save_status);
    });
    ui.separator();

    let mut text = view.editor_text.clone();
    egui::ScrollArea::vertical()
        .id_source("editor_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let response = ui.add(
                egui::TextEdit::multiline(&mut text)
                    .id_source(EDITOR_TEXT_ID)
                    .code_editor()
                    .desired_rows(EDITOR_ROWS)
                    .desired_width(f32::INFINITY),
            );
            if response.changed() {
                msgs.push(Msg::EditorChanged(text.clone()));
            }
        });

    msgs
}

fn save_status_label(ui: &mut egui::Ui, status: &SaveStatus) {
    match status {
        SaveStatus::Idle => {
            ui.label(egui::RichText::new("Saved automatically while typing").weak());
        }
        SaveStatus::Pending => {
            ui.label(egui::RichText::new("Saving…").weak());
        }
        SaveStatus::Saved { at } => {
            ui.colored_label(SAVED_COLOR, format!("Saved at {at}"));
        }
        SaveStatus::Deleted => {
            ui.label(egui::RichText::new("Source deleted").weak());
        }
        SaveStatus::Failed(message) => {
            ui.colored_label(WARNING_COLOR, "Save failed")
                .on_hover_text(message.as_str());
        }
    }
}
