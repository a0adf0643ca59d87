use eframe::egui::{self, TextureHandle, TextureOptions};

use cosmo_viewer::state::AppState;

use crate::color::{region_image, region_palette};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CosmoViewerApp {
    pub state: AppState,
    /// Rasterised confidence regions, rebuilt only when the surfaces change.
    regions: Option<RegionTextures>,
}

struct RegionTextures {
    generation: u64,
    textures: Vec<TextureHandle>,
}

impl CosmoViewerApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            regions: None,
        }
    }
}

/// Upload one texture per surface if the cached set is stale.
fn region_textures<'a>(
    cache: &'a mut Option<RegionTextures>,
    state: &AppState,
    ctx: &egui::Context,
) -> &'a [TextureHandle] {
    let stale = !matches!(cache, Some(c) if c.generation == state.surfaces_generation);
    if stale {
        let shades = region_palette(state.surfaces.len());
        let textures = state
            .surfaces
            .iter()
            .zip(&shades)
            .map(|(surface, shade)| {
                ctx.load_texture(
                    format!("regions_z{:.2}", surface.z_max()),
                    region_image(surface, shade),
                    TextureOptions::NEAREST,
                )
            })
            .collect();
        log::debug!("uploaded {} confidence-region textures", state.surfaces.len());
        *cache = Some(RegionTextures {
            generation: state.surfaces_generation,
            textures,
        });
    }
    match cache {
        Some(c) => &c.textures,
        None => &[],
    }
}

impl eframe::App for CosmoViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: confidence regions ----
        let textures = region_textures(&mut self.regions, &self.state, ctx);
        egui::SidePanel::left("confidence_panel")
            .default_width(480.0)
            .resizable(true)
            .show(ctx, |ui| {
                ui.heading("Confidence regions");
                egui::TopBottomPanel::bottom("fit_summary_panel")
                    .resizable(false)
                    .show_inside(ui, |ui| {
                        panels::fit_summary(ui, &self.state);
                    });
                plot::confidence_plot(ui, &mut self.state, textures);
            });

        // ---- Central panel: residuals + live model ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::residual_plot(ui, &self.state);
        });

        egui::Window::new("Observations")
            .open(&mut self.state.show_table)
            .default_width(300.0)
            .show(ctx, |ui| {
                panels::observation_table(ui, &self.state.dataset);
            });
    }
}
