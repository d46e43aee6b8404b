//! Named easing functions over normalized progress `t ∈ [0, 1]`.
//!
//! Every function maps `0 → 0` and `1 → 1` exactly. `Elastic` overshoots
//! above 1 in between; the others stay inside `[0, 1]`.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    #[serde(rename = "linear")]
    Linear,
    #[serde(rename = "easeOutExpo")]
    EaseOutExpo,
    #[serde(rename = "easeInOutCubic")]
    EaseInOutCubic,
    #[serde(rename = "elastic")]
    Elastic,
}

impl Easing {
    pub const ALL: [Easing; 4] = [
        Easing::Linear,
        Easing::EaseOutExpo,
        Easing::EaseInOutCubic,
        Easing::Elastic,
    ];

    /// Look up an easing by name. Unknown names resolve to [`Easing::Linear`].
    pub fn from_name(name: &str) -> Easing {
        Self::ALL
            .into_iter()
            .find(|easing| easing.name() == name)
            .unwrap_or_else(|| {
                tracing::debug!(name, "Unknown easing name, using linear");
                Easing::Linear
            })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseOutExpo => "easeOutExpo",
            Easing::EaseInOutCubic => "easeInOutCubic",
            Easing::Elastic => "elastic",
        }
    }

    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::EaseOutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::Elastic => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    let c4 = (2.0 * PI) / 3.0;
                    2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
                }
            }
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_exact() {
        for easing in Easing::ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing} at 0");
            assert_eq!(easing.apply(1.0), 1.0, "{easing} at 1");
        }
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(Easing::from_name("easeOutExpo"), Easing::EaseOutExpo);
        assert_eq!(Easing::from_name("easeInOutCubic"), Easing::EaseInOutCubic);
        assert_eq!(Easing::from_name("elastic"), Easing::Elastic);
        assert_eq!(Easing::from_name("linear"), Easing::Linear);
        assert_eq!(Easing::from_name("bounce"), Easing::Linear);
        assert_eq!(Easing::from_name(""), Easing::Linear);
    }

    #[test]
    fn test_cubic_is_symmetric_about_midpoint() {
        let cubic = Easing::EaseInOutCubic;
        assert!((cubic.apply(0.5) - 0.5).abs() < 1e-12);
        for t in [0.1, 0.2, 0.3, 0.4] {
            let sum = cubic.apply(t) + cubic.apply(1.0 - t);
            assert!((sum - 1.0).abs() < 1e-12, "t={t}");
        }
    }

    #[test]
    fn test_expo_approaches_one_before_the_end() {
        let near_end = Easing::EaseOutExpo.apply(0.999);
        assert!(near_end < 1.0);
        assert!(near_end > 0.99);
    }

    #[test]
    fn test_monotone_easings_stay_in_range() {
        for easing in [Easing::Linear, Easing::EaseOutExpo, Easing::EaseInOutCubic] {
            let mut previous = 0.0;
            for step in 0..=100 {
                let value = easing.apply(step as f64 / 100.0);
                assert!((0.0..=1.0).contains(&value), "{easing} out of range");
                assert!(value >= previous, "{easing} not monotone");
                previous = value;
            }
        }
    }
}
