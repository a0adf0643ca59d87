use eframe::egui::{self, Color32, RichText, TextureHandle, Ui};
use egui_plot::{
    Corner, HLine, Legend, Line, MarkerShape, Plot, PlotImage, PlotPoint, PlotPoints, Points, Text,
};

use cosmo_viewer::session::{PointerEvent, format_label};
use cosmo_viewer::state::AppState;

const GUIDE_COLOR: Color32 = Color32::from_rgba_premultiplied(90, 90, 90, 90);
const DATA_COLOR: Color32 = Color32::from_rgb(31, 119, 180);
const MODEL_COLOR: Color32 = Color32::from_rgb(255, 127, 14);

// ---------------------------------------------------------------------------
// Confidence-region plot (side panel)
// ---------------------------------------------------------------------------

/// Render the (Omega_m, Omega_Lambda) plane with the filled confidence
/// regions, and drive the fit session from pointer input on it.
pub fn confidence_plot(ui: &mut Ui, state: &mut AppState, textures: &[TextureHandle]) {
    let grid = state.config.grid();
    let [[x0, y0], [x1, y1]] = grid.bounds();
    let (n_m, n_l) = grid.shape();

    // Each pixel covers one grid cell centred on its sample.
    let width = (x1 - x0) * n_m as f64 / (n_m as f64 - 1.0);
    let height = (y1 - y0) * n_l as f64 / (n_l as f64 - 1.0);
    let center = PlotPoint::new((x0 + x1) / 2.0, (y0 + y1) / 2.0);

    let response = Plot::new("confidence_plot")
        .legend(Legend::default().position(Corner::RightBottom))
        .x_axis_label("Ωm")
        .y_axis_label("ΩΛ")
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .allow_double_click_reset(false)
        .include_x(x0)
        .include_x(x1)
        .include_y(y0)
        .include_y(y1)
        .show(ui, |plot_ui| {
            for (surface, texture) in state.surfaces.iter().zip(textures) {
                let image = PlotImage::new(
                    texture.id(),
                    center,
                    egui::vec2(width as f32, height as f32),
                )
                .name(format!("z < {:.1}", surface.z_max()));
                plot_ui.image(image);
            }

            for &q in &state.config.q0_guides {
                let guide: PlotPoints = [x0, x1].iter().map(|&x| [x, x / 2.0 - q]).collect();
                plot_ui.line(Line::new(guide).color(GUIDE_COLOR).width(1.0));
                let at = 0.8 * x1;
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(at, at / 2.0 - q + 0.02),
                        RichText::new(format!("q₀ = {q:.2}")).size(10.0),
                    )
                    .color(GUIDE_COLOR),
                );
            }

            let best: PlotPoints = state
                .surfaces
                .iter()
                .filter_map(|s| s.best_fit())
                .map(|(om, ol)| [om, ol])
                .collect();
            plot_ui.points(
                Points::new(best)
                    .shape(MarkerShape::Cross)
                    .radius(4.0)
                    .color(Color32::BLACK),
            );

            let params = state.session.params();
            let current: PlotPoints = std::iter::once([params.omega_m, params.omega_lambda]).collect();
            plot_ui.points(
                Points::new(current)
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(4.0)
                    .color(MODEL_COLOR),
            );

            plot_ui.pointer_coordinate()
        });

    let pos = response.inner.map(|p| [p.x, p.y]);
    let (pressed, moved, released) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.is_moving(),
            i.pointer.primary_released(),
        )
    });

    let session = &mut state.session;
    let mut redraw = false;
    if pressed {
        session.handle(PointerEvent::Press(pos));
    }
    if moved {
        redraw |= session.handle(PointerEvent::Motion(pos));
    }
    if released {
        session.handle(PointerEvent::Release);
    }
    if redraw {
        ui.ctx().request_repaint();
    }
}

// ---------------------------------------------------------------------------
// Residual plot (central panel)
// ---------------------------------------------------------------------------

/// Render the Hubble residuals relative to the reference model, with the
/// live model curve from the fit session.
pub fn residual_plot(ui: &mut Ui, state: &AppState) {
    let residuals = state.residuals();
    let reference = state.config.reference_params();

    Plot::new("residual_plot")
        .legend(Legend::default().position(Corner::LeftTop))
        .x_axis_label("Redshift")
        .y_axis_label("Δμ (mag)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for &[z, delta, sigma] in &residuals {
                let bar: PlotPoints = [[z, delta - sigma], [z, delta + sigma]].into_iter().collect();
                plot_ui.line(Line::new(bar).color(DATA_COLOR).width(1.0));
            }
            let points: PlotPoints = residuals.iter().map(|&[z, delta, _]| [z, delta]).collect();
            plot_ui.points(
                Points::new(points)
                    .name("JLA")
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(3.0)
                    .color(DATA_COLOR),
            );

            plot_ui.hline(
                HLine::new(0.0)
                    .name(format_label(reference.omega_m, reference.omega_lambda))
                    .color(Color32::GRAY),
            );

            let curve: PlotPoints = state.session.points().into_iter().collect();
            plot_ui.line(
                Line::new(curve)
                    .name(state.session.label())
                    .color(MODEL_COLOR)
                    .width(2.0),
            );
        });
}
