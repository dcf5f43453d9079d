use eframe::egui;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use viewer_core::{Generation, TreeImage};
use viewer_logging::{viewer_debug, viewer_info, viewer_warn};

use super::constants::TREE_TEXTURE_NAME;

/// Holds the GPU texture for the current tree image and nothing else.
#[derive(Default)]
pub struct TextureSlot {
    generation: Option<Generation>,
    handle: Option<egui::TextureHandle>,
}

impl TextureSlot {
    /// Uploads `tree` if it is not the image already held, releasing the
    /// previous texture first. Images larger than the GPU allows are scaled
    /// down to fit.
    pub fn sync(&mut self, ctx: &egui::Context, tree: Option<&TreeImage>) {
        let Some(tree) = tree else {
            self.release();
            return;
        };
        if self.generation == Some(tree.generation) {
            return;
        }

        self.release();
        let max_side = ctx.input(|i| i.max_texture_side);
        let Some(image) = color_image(tree, max_side) else {
            viewer_warn!(
                "Tree image {}x{} has {} bytes of pixel data; not uploading",
                tree.width,
                tree.height,
                tree.rgba.len()
            );
            return;
        };
        self.handle = Some(ctx.load_texture(TREE_TEXTURE_NAME, image, egui::TextureOptions::LINEAR));
        self.generation = Some(tree.generation);
    }

    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            viewer_debug!("Releasing tree texture {:?}", handle.id());
        }
        self.generation = None;
    }

    pub fn handle(&self) -> Option<&egui::TextureHandle> {
        self.handle.as_ref()
    }
}

/// Largest size with the same aspect ratio whose sides fit within `max_side`.
fn fit_within(width: u32, height: u32, max_side: usize) -> (u32, u32) {
    let max_side = u32::try_from(max_side).unwrap_or(u32::MAX).max(1);
    let longest = width.max(height);
    if longest <= max_side {
        return (width, height);
    }
    let scale = |side: u32| ((u64::from(side) * u64::from(max_side)) / u64::from(longest)).max(1) as u32;
    (scale(width), scale(height))
}

/// `None` when the pixel buffer does not match the stated dimensions.
fn color_image(tree: &TreeImage, max_side: usize) -> Option<egui::ColorImage> {
    let (width, height) = fit_within(tree.width, tree.height, max_side);
    if (width, height) == (tree.width, tree.height) {
        let expected = tree.width as usize * tree.height as usize * 4;
        if tree.rgba.len() != expected {
            return None;
        }
        return Some(egui::ColorImage::from_rgba_unmultiplied(
            [width as usize, height as usize],
            &tree.rgba,
        ));
    }

    viewer_info!(
        "Scaling tree image {}x{} down to {}x{}",
        tree.width,
        tree.height,
        width,
        height
    );
    let source = RgbaImage::from_raw(tree.width, tree.height, tree.rgba.to_vec())?;
    let scaled = imageops::resize(&source, width, height, FilterType::Triangle);
    Some(egui::ColorImage::from_rgba_unmultiplied(
        [width as usize, height as usize],
        scaled.as_raw(),
    ))
}
