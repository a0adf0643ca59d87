use crate::config::ViewerConfig;
use crate::data::ObservationSet;
use crate::fit::{ChiSquareSurface, compute_surfaces};
use crate::session::FitSession;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,

    /// Loaded observations.
    pub dataset: ObservationSet,

    /// One chi-square surface per configured redshift cutoff, computed
    /// eagerly whenever the dataset changes.
    pub surfaces: Vec<ChiSquareSurface>,

    /// Drag interaction and the live model curve.
    pub session: FitSession,

    /// Bumped whenever `surfaces` is rebuilt, so cached renderings can be
    /// invalidated.
    pub surfaces_generation: u64,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether the observation table window is open.
    pub show_table: bool,
}

impl AppState {
    pub fn new(config: ViewerConfig, dataset: ObservationSet) -> Self {
        let surfaces = build_surfaces(&config, &dataset);
        let session = build_session(&config, &dataset);
        Self {
            config,
            dataset,
            surfaces,
            session,
            surfaces_generation: 0,
            status_message: None,
            show_table: false,
        }
    }

    /// Replace the dataset and rebuild everything derived from it.
    pub fn set_dataset(&mut self, dataset: ObservationSet) {
        self.surfaces = build_surfaces(&self.config, &dataset);
        self.session = build_session(&self.config, &dataset);
        self.dataset = dataset;
        self.surfaces_generation += 1;
        self.status_message = None;
    }

    /// Observations relative to the reference model: `(z, delta mu, sigma)`.
    pub fn residuals(&self) -> Vec<[f64; 3]> {
        let reference = self.config.reference_params();
        self.dataset
            .iter()
            .map(|o| [o.z, o.mu - reference.distance_modulus(o.z), o.sigma])
            .collect()
    }
}

fn build_surfaces(config: &ViewerConfig, dataset: &ObservationSet) -> Vec<ChiSquareSurface> {
    compute_surfaces(dataset, &config.cutoffs, config.h0, &config.grid())
}

fn build_session(config: &ViewerConfig, dataset: &ObservationSet) -> FitSession {
    FitSession::new(
        config.reference_params(),
        config.curve_redshifts(dataset.max_redshift()),
        config.grid().bounds(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{DragState, PointerEvent};

    fn small_config() -> ViewerConfig {
        ViewerConfig {
            grid_resolution: 10,
            ..ViewerConfig::default()
        }
    }

    fn dataset(mu_shift: f64) -> ObservationSet {
        ObservationSet::from_columns(
            vec![0.1, 0.3, 0.6, 1.0],
            vec![38.2 + mu_shift, 40.8 + mu_shift, 42.5 + mu_shift, 43.9 + mu_shift],
            vec![0.1, 0.1, 0.2, 0.2],
        )
        .unwrap()
    }

    #[test]
    fn builds_one_surface_per_cutoff() {
        let state = AppState::new(small_config(), dataset(0.0));
        assert_eq!(state.surfaces.len(), 2);
        assert_eq!(state.surfaces[0].observations_used(), 2);
        assert_eq!(state.surfaces[1].observations_used(), 4);
        let zs = state.session.redshifts();
        assert!((zs.last().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn set_dataset_resets_session() {
        let mut state = AppState::new(small_config(), dataset(0.0));
        state.session.handle(PointerEvent::Press(Some([0.5, 0.5])));
        state.session.handle(PointerEvent::Motion(Some([0.6, 0.6])));
        state.status_message = Some("old".into());

        state.set_dataset(dataset(0.1));
        assert_eq!(state.session.state(), DragState::Idle);
        assert_eq!(state.session.revision(), 0);
        assert_eq!(state.surfaces_generation, 1);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn residuals_relative_to_reference() {
        let state = AppState::new(small_config(), dataset(0.0));
        let reference = state.config.reference_params();
        let r = state.residuals();
        assert_eq!(r.len(), 4);
        assert_eq!(r[0][1], 38.2 - reference.distance_modulus(0.1));
        assert_eq!(r[3][2], 0.2);
    }
}
