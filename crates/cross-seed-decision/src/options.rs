//! Per-call tuning the caller resolves before invoking the engine (the
//! engine itself is agnostic to where these values come from —
//! `cross-seed-config` resolves them per searchee label).

/// Controls which non-exact content-agreement decisions the engine is
/// allowed to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Only [`cross_seed_model::Decision::Match`] is reachable.
    Strict,
    /// Full and size-only matches are reachable.
    Flexible,
    /// Full, size-only, and partial matches are reachable.
    Partial,
}

impl MatchMode {
    /// Whether a size-only (name-agnostic) bijection is acceptable.
    #[must_use]
    pub const fn allows_size_only(self) -> bool {
        matches!(self, Self::Flexible | Self::Partial)
    }

    /// Whether a partial (piece-aligned coverage) match is acceptable.
    #[must_use]
    pub const fn allows_partial(self) -> bool {
        matches!(self, Self::Partial)
    }
}

/// Resolved tuning values for one [`crate::engine::DecisionEngine::assess`]
/// call.
#[derive(Debug, Clone, Copy)]
pub struct AssessmentOptions {
    /// Which content-agreement decisions are reachable.
    pub match_mode: MatchMode,
    /// `fuzzySizeFactor(searchee)`: fractional size tolerance.
    pub fuzzy_size_factor: f64,
    /// `minSizeRatio(searchee)`: minimum piece-aligned coverage for a
    /// partial match.
    pub min_size_ratio: f64,
    /// Opts single episodes back into matching against a season-pack
    /// searchee title.
    pub include_single_episodes: bool,
}
