use std::sync::{mpsc, Arc, OnceLock};

use anyhow::Context as _;
use eframe::egui;
use viewer_core::{update, AppState, AppViewModel, Msg};
use viewer_logging::{viewer_info, viewer_warn};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::ui;

pub fn run_app() -> anyhow::Result<()> {
    let (config, config_error) = AppConfig::load();
    viewer_logging::initialize(config.log_destination(), config.log_level());
    if let Some(err) = config_error {
        viewer_warn!("Using default settings: {}", err);
    }
    viewer_info!("Starting AST viewer against {}", config.backend_url);

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let repaint = Arc::new(OnceLock::new());
    let runner = EffectRunner::new(config.engine_config(), msg_tx, repaint.clone())
        .context("starting backend engine")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(ui::constants::WINDOW_TITLE)
            .with_inner_size([config.window_width, config.window_height]),
        ..Default::default()
    };

    eframe::run_native(
        ui::constants::WINDOW_TITLE,
        options,
        Box::new(move |cc| {
            let _ = repaint.set(cc.egui_ctx.clone());
            Box::new(ViewerApp::new(runner, msg_rx))
        }),
    )
    .map_err(|err| anyhow::anyhow!("window failed: {err}"))
}

struct ViewerApp {
    state: AppState,
    view: AppViewModel,
    runner: EffectRunner,
    msg_rx: mpsc::Receiver<Msg>,
    tree_texture: ui::texture::TextureSlot,
    closing: bool,
}

impl ViewerApp {
    fn new(runner: EffectRunner, msg_rx: mpsc::Receiver<Msg>) -> Self {
        let state = AppState::new();
        let view = state.view();
        let mut app = Self {
            state,
            view,
            runner,
            msg_rx,
            tree_texture: ui::texture::TextureSlot::default(),
            closing: false,
        };
        app.dispatch_msg(Msg::Started);
        app
    }

    fn process_pending_messages(&mut self) {
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.dispatch_msg(msg);
        }
    }

    fn dispatch_msg(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
    }

    /// Rebuilds the view model when state changed since the last frame.
    fn refresh_view(&mut self, ctx: &egui::Context) {
        if !self.state.consume_dirty() {
            return;
        }
        self.view = self.state.view();
        self.tree_texture.sync(ctx, self.view.tree.as_ref());
        ctx.request_repaint();
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_pending_messages();

        if ctx.input(|i| i.viewport().close_requested()) && !self.closing {
            self.closing = true;
            self.dispatch_msg(Msg::CloseRequested);
            self.tree_texture.release();
            return;
        }

        self.refresh_view(ctx);

        let mut msgs = Vec::new();
        egui::SidePanel::left(ui::constants::EDITOR_PANEL_ID)
            .resizable(true)
            .default_width(ui::constants::EDITOR_DEFAULT_WIDTH)
            .show(ctx, |panel| {
                msgs.extend(ui::editor::show(panel, &self.view));
            });
        egui::CentralPanel::default().show(ctx, |panel| {
            msgs.extend(ui::confirmation::show(panel, &self.view, &self.tree_texture));
        });

        for msg in msgs {
            self.dispatch_msg(msg);
        }
        self.refresh_view(ctx);
    }
}
