//! Interactive fit session.
//!
//! Owns the pointer-drag state machine and the model curve shown on the
//! residual plot. The UI feeds it [`PointerEvent`]s from the
//! confidence-region plot; the residual plot reads [`FitSession::points`]
//! and [`FitSession::label`] every frame.
//!
//! ```text
//!            press inside axes
//!   Idle ───────────────────────▶ Dragging ──┐ motion inside axes:
//!    ▲                               │  ▲    │ recompute curve + label
//!    └────────── release ────────────┘  └────┘
//! ```

use crate::cosmology::CosmoParams;

/// Pointer-interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

/// A pointer event on the confidence-region plot. Positions are in data
/// space, `(Omega_m, Omega_Lambda)`; `None` means the pointer is not over the
/// plotted axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press(Option<[f64; 2]>),
    Release,
    Motion(Option<[f64; 2]>),
}

/// Label text for a density pair.
pub fn format_label(omega_m: f64, omega_lambda: f64) -> String {
    format!("Ωm = {omega_m:.2}, ΩΛ = {omega_lambda:.2}")
}

// ---------------------------------------------------------------------------
// FitSession
// ---------------------------------------------------------------------------

/// Per-window interaction context, replacing any ambient mutable state.
#[derive(Debug, Clone)]
pub struct FitSession {
    state: DragState,
    last_pointer: Option<[f64; 2]>,
    /// `[[x_min, y_min], [x_max, y_max]]` of the confidence-region axes.
    bounds: [[f64; 2]; 2],
    reference: CosmoParams,
    current: CosmoParams,
    redshifts: Vec<f64>,
    /// `mu(z; current) - mu(z; reference)` at each sampled redshift.
    curve: Vec<f64>,
    label: String,
    revision: u64,
}

impl FitSession {
    /// Start idle, showing the reference model (a flat zero curve).
    pub fn new(reference: CosmoParams, redshifts: Vec<f64>, bounds: [[f64; 2]; 2]) -> Self {
        let curve = vec![0.0; redshifts.len()];
        Self {
            state: DragState::Idle,
            last_pointer: None,
            bounds,
            reference,
            current: reference,
            redshifts,
            curve,
            label: format_label(reference.omega_m, reference.omega_lambda),
            revision: 0,
        }
    }

    /// Advance the state machine. Returns `true` when the residual plot
    /// must be redrawn.
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Press(pos) => {
                self.track(pos);
                if self.state == DragState::Idle && self.inside(pos).is_some() {
                    log::debug!("drag start at {pos:?}");
                    self.state = DragState::Dragging;
                }
                false
            }
            PointerEvent::Release => {
                if self.state == DragState::Dragging {
                    log::debug!("drag end");
                }
                self.state = DragState::Idle;
                false
            }
            PointerEvent::Motion(pos) => {
                self.track(pos);
                if self.state != DragState::Dragging {
                    return false;
                }
                match self.inside(pos) {
                    Some([omega_m, omega_lambda]) => {
                        self.set_densities(omega_m, omega_lambda);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Recompute the displayed curve and label for a density pair.
    pub fn set_densities(&mut self, omega_m: f64, omega_lambda: f64) {
        self.current = self.reference.with_densities(omega_m, omega_lambda);
        let candidate = self.current.distance_moduli(&self.redshifts);
        let reference = self.reference.distance_moduli(&self.redshifts);
        self.curve = candidate
            .iter()
            .zip(&reference)
            .map(|(c, r)| c - r)
            .collect();
        self.label = format_label(omega_m, omega_lambda);
        self.revision += 1;
    }

    fn track(&mut self, pos: Option<[f64; 2]>) {
        if pos.is_some() {
            self.last_pointer = pos;
        }
    }

    /// `pos` if it is finite and within the axes bounds.
    fn inside(&self, pos: Option<[f64; 2]>) -> Option<[f64; 2]> {
        let [x, y] = pos?;
        let [[x0, y0], [x1, y1]] = self.bounds;
        let ok = x.is_finite() && y.is_finite() && (x0..=x1).contains(&x) && (y0..=y1).contains(&y);
        ok.then_some([x, y])
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state == DragState::Dragging
    }

    /// Last pointer position seen over the axes.
    pub fn last_pointer(&self) -> Option<[f64; 2]> {
        self.last_pointer
    }

    pub fn reference(&self) -> CosmoParams {
        self.reference
    }

    /// Parameters the displayed curve was computed for.
    pub fn params(&self) -> CosmoParams {
        self.current
    }

    pub fn redshifts(&self) -> &[f64] {
        &self.redshifts
    }

    pub fn curve(&self) -> &[f64] {
        &self.curve
    }

    /// `(z, delta mu)` pairs for plotting.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.redshifts
            .iter()
            .zip(&self.curve)
            .map(|(&z, &d)| [z, d])
            .collect()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of curve updates so far; bumps once per redraw request.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
