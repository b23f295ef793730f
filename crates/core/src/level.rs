//! Level curve - maps cumulative experience to a level.
//!
//! Level `n` spans `floor(base_xp * growth^(n-1))` experience points. Every
//! requirement is computed in closed form, so the level reported for a total
//! and the progress bar drawn inside that level always agree.

use serde::{Deserialize, Serialize};
use crate::error::CoreError;

/// Geometric experience schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveParams", into = "CurveParams")]
pub struct LevelCurve {
    base_xp: u64,
    growth: f64,
}

/// Unvalidated curve parameters as they appear in configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveParams {
    /// Experience needed to clear level 1
    pub base_xp: u64,
    /// Multiplier applied to the requirement of each following level
    pub growth: f64,
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            base_xp: LevelCurve::DEFAULT_BASE_XP,
            growth: LevelCurve::DEFAULT_GROWTH,
        }
    }
}

impl LevelCurve {
    /// Experience needed to clear level 1.
    pub const DEFAULT_BASE_XP: u64 = 100;
    /// Per-level growth of the requirement.
    pub const DEFAULT_GROWTH: f64 = 1.5;

    /// Create a curve. `base_xp` must be positive and `growth` finite and at least 1.
    pub fn new(base_xp: u64, growth: f64) -> Result<Self, CoreError> {
        if base_xp == 0 {
            return Err(CoreError::InvalidCurve("base_xp must be positive".to_string()));
        }
        if !growth.is_finite() || growth < 1.0 {
            return Err(CoreError::InvalidCurve(format!(
                "growth must be a finite number >= 1, got {growth}"
            )));
        }
        Ok(Self { base_xp, growth })
    }

    /// Experience needed to clear level 1.
    pub fn base_xp(&self) -> u64 {
        self.base_xp
    }

    /// Per-level growth factor.
    pub fn growth(&self) -> f64 {
        self.growth
    }

    /// Experience between the start of `level` and the start of `level + 1`.
    ///
    /// Level 0 is treated as level 1.
    pub fn xp_required_for_level(&self, level: u32) -> u64 {
        let exponent = level.max(1) - 1;
        let exponent = exponent.min(i32::MAX as u32) as i32;
        let required = self.base_xp as f64 * self.growth.powi(exponent);
        // `as` saturates on overflow and infinity
        (required.floor() as u64).max(1)
    }

    /// Highest level whose cumulative requirement does not exceed `xp`.
    pub fn level_for_xp(&self, xp: u64) -> u32 {
        if self.growth == 1.0 {
            let cleared = xp / self.base_xp;
            return u32::try_from(cleared.saturating_add(1)).unwrap_or(u32::MAX);
        }

        let mut level = 1u32;
        let mut consumed = 0u64;
        while level < u32::MAX {
            match consumed.checked_add(self.xp_required_for_level(level)) {
                Some(next) if next <= xp => {
                    consumed = next;
                    level += 1;
                }
                _ => break,
            }
        }
        level
    }

    /// Cumulative experience at which `level` starts (0 for level 1).
    pub fn cumulative_xp_for_level(&self, level: u32) -> u64 {
        if self.growth == 1.0 {
            return u64::from(level.max(1) - 1).saturating_mul(self.base_xp);
        }
        let mut total = 0u64;
        for l in 1..level.max(1) {
            total = total.saturating_add(self.xp_required_for_level(l));
            if total == u64::MAX {
                break;
            }
        }
        total
    }

    /// Position of `xp` inside its level, for progress-bar display.
    pub fn progress(&self, xp: u64) -> LevelProgress {
        let level = self.level_for_xp(xp);
        let start = self.cumulative_xp_for_level(level);
        let xp_into_level = xp.saturating_sub(start);
        let xp_for_level = self.xp_required_for_level(level);
        LevelProgress {
            level,
            xp_into_level,
            xp_for_level,
            fraction: (xp_into_level as f64 / xp_for_level as f64).clamp(0.0, 1.0),
        }
    }
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self {
            base_xp: Self::DEFAULT_BASE_XP,
            growth: Self::DEFAULT_GROWTH,
        }
    }
}

impl TryFrom<CurveParams> for LevelCurve {
    type Error = CoreError;

    fn try_from(params: CurveParams) -> Result<Self, Self::Error> {
        Self::new(params.base_xp, params.growth)
    }
}

impl From<LevelCurve> for CurveParams {
    fn from(curve: LevelCurve) -> Self {
        Self {
            base_xp: curve.base_xp,
            growth: curve.growth,
        }
    }
}

/// Where a learner stands inside the current level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// Current level
    pub level: u32,
    /// Experience earned since the level started
    pub xp_into_level: u64,
    /// Experience the level spans
    pub xp_for_level: u64,
    /// `xp_into_level / xp_for_level`, in `[0, 1)`
    pub fraction: f64,
}

/// [`LevelCurve::level_for_xp`] on the default curve.
pub fn level_for_xp(xp: u64) -> u32 {
    LevelCurve::default().level_for_xp(xp)
}

/// [`LevelCurve::xp_required_for_level`] on the default curve.
pub fn xp_required_for_level(level: u32) -> u64 {
    LevelCurve::default().xp_required_for_level(level)
}

/// [`LevelCurve::cumulative_xp_for_level`] on the default curve.
pub fn cumulative_xp_for_level(level: u32) -> u64 {
    LevelCurve::default().cumulative_xp_for_level(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_levels() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(249), 2);
        assert_eq!(level_for_xp(250), 3);
        assert_eq!(level_for_xp(475), 4);
    }

    #[test]
    fn test_requirements_floor_geometric_growth() {
        assert_eq!(xp_required_for_level(1), 100);
        assert_eq!(xp_required_for_level(2), 150);
        assert_eq!(xp_required_for_level(3), 225);
        assert_eq!(xp_required_for_level(4), 337);
        assert_eq!(xp_required_for_level(5), 506);
        assert_eq!(xp_required_for_level(0), 100);
    }

    #[test]
    fn test_monotonic() {
        let mut previous = level_for_xp(0);
        for xp in (0..20_000u64).step_by(7) {
            let level = level_for_xp(xp);
            assert!(level >= previous, "level dropped at xp {}", xp);
            previous = level;
        }
    }

    #[test]
    fn test_level_starts_match_cumulative_requirement() {
        for level in 1..30 {
            let start = cumulative_xp_for_level(level);
            assert_eq!(level_for_xp(start), level);
            if start > 0 {
                assert_eq!(level_for_xp(start - 1), level - 1);
            }
        }
    }

    #[test]
    fn test_extreme_xp_terminates() {
        let level = level_for_xp(u64::MAX);
        assert!(level > 50);
        assert!(level_for_xp(u64::MAX / 2) <= level);
    }

    #[test]
    fn test_progress_inside_level() {
        let progress = LevelCurve::default().progress(175);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.xp_into_level, 75);
        assert_eq!(progress.xp_for_level, 150);
        assert!((progress.fraction - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_flat_curve() {
        let curve = LevelCurve::new(50, 1.0).unwrap();
        assert_eq!(curve.level_for_xp(0), 1);
        assert_eq!(curve.level_for_xp(149), 3);
        assert_eq!(curve.cumulative_xp_for_level(3), 100);
    }

    #[test]
    fn test_invalid_curves_rejected() {
        assert!(LevelCurve::new(0, 1.5).is_err());
        assert!(LevelCurve::new(100, 0.5).is_err());
        assert!(LevelCurve::new(100, f64::NAN).is_err());
        assert!(serde_json::from_str::<LevelCurve>(r#"{"base_xp":0,"growth":1.5}"#).is_err());
    }

    #[test]
    fn test_curve_params_default_missing_fields() {
        let curve: LevelCurve = serde_json::from_str(r#"{"growth":2.0}"#).unwrap();
        assert_eq!(curve.base_xp(), 100);
        assert_eq!(curve.xp_required_for_level(3), 400);
    }
}
