//! Categorical judgments derived from current conditions: an air-quality tier
//! and a go/no-go launch verdict with the list of constraints that failed.

use std::fmt;

use serde::Serialize;

use crate::model::WeatherSnapshot;

/// Highest EPA index still reported as [`AirQuality::Good`].
pub const AQI_GOOD_MAX: u8 = 2;
/// Highest EPA index still reported as [`AirQuality::Moderate`].
pub const AQI_MODERATE_MAX: u8 = 4;

pub const THUNDER_KEYWORDS: [&str; 3] = ["thunder", "storm", "lightning"];
pub const HEAVY_RAIN_MM: f64 = 5.0;
pub const MIN_VISIBILITY_KM: f64 = 5.0;
pub const MAX_WIND_KPH: f64 = 30.0;
pub const MAX_GUST_KPH: f64 = 45.0;
/// Gust estimate relative to sustained wind when the provider omits gusts.
pub const GUST_FACTOR: f64 = 1.5;

pub const ALL_CLEAR: &str = "All clear for launch";
/// Joins violation descriptions in [`LaunchSafety::summary`]. No single
/// description may contain it.
pub const SUMMARY_SEPARATOR: &str = "; ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AirQuality {
    Good,
    Moderate,
    Unhealthy,
}

impl AirQuality {
    pub fn from_index(index: u8) -> Self {
        if index <= AQI_GOOD_MAX {
            AirQuality::Good
        } else if index <= AQI_MODERATE_MAX {
            AirQuality::Moderate
        } else {
            AirQuality::Unhealthy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AirQuality::Good => "Good",
            AirQuality::Moderate => "Moderate",
            AirQuality::Unhealthy => "Unhealthy",
        }
    }
}

impl fmt::Display for AirQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Safe,
    Abort,
}

/// A launch constraint that failed, with the reading that failed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    ThunderRisk { condition: String },
    HeavyRain { precipitation_mm: f64 },
    LowVisibility { visibility_km: f64 },
    WindExcess { wind_kph: f64, gust_kph: f64 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::ThunderRisk { condition } => {
                write!(f, "Thunder/lightning risk ({condition})")
            }
            Violation::HeavyRain { precipitation_mm } => write!(
                f,
                "Heavy rain ({precipitation_mm:.1} mm > {HEAVY_RAIN_MM:.1} mm)"
            ),
            Violation::LowVisibility { visibility_km } => write!(
                f,
                "Low visibility ({visibility_km:.1} km < {MIN_VISIBILITY_KM:.1} km)"
            ),
            Violation::WindExcess { wind_kph, gust_kph } => write!(
                f,
                "Wind excess ({wind_kph:.1} kph, gusts {gust_kph:.1} kph, \
                 limits {MAX_WIND_KPH:.0}/{MAX_GUST_KPH:.0} kph)"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchSafety {
    pub verdict: Verdict,
    /// Ordered: thunder, rain, visibility, wind.
    pub violations: Vec<Violation>,
}

impl LaunchSafety {
    pub fn evaluate(snapshot: &WeatherSnapshot) -> Self {
        let mut violations = Vec::new();

        if has_thunder_risk(&snapshot.condition_text) {
            violations.push(Violation::ThunderRisk {
                condition: snapshot.condition_text.clone(),
            });
        }

        if snapshot.precipitation_mm > HEAVY_RAIN_MM {
            violations.push(Violation::HeavyRain {
                precipitation_mm: snapshot.precipitation_mm,
            });
        }

        if snapshot.visibility.km < MIN_VISIBILITY_KM {
            violations.push(Violation::LowVisibility {
                visibility_km: snapshot.visibility.km,
            });
        }

        let gust_kph = effective_gust_kph(snapshot);
        if snapshot.wind.kph > MAX_WIND_KPH || gust_kph > MAX_GUST_KPH {
            violations.push(Violation::WindExcess {
                wind_kph: snapshot.wind.kph,
                gust_kph,
            });
        }

        let verdict = if violations.is_empty() {
            Verdict::Safe
        } else {
            Verdict::Abort
        };

        Self {
            verdict,
            violations,
        }
    }

    pub fn is_safe(&self) -> bool {
        self.verdict == Verdict::Safe
    }

    /// Fixed all-clear text, or the violation descriptions joined by
    /// [`SUMMARY_SEPARATOR`].
    pub fn summary(&self) -> String {
        if self.violations.is_empty() {
            return ALL_CLEAR.to_string();
        }

        self.violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(SUMMARY_SEPARATOR)
    }
}

pub fn effective_gust_kph(snapshot: &WeatherSnapshot) -> f64 {
    snapshot.gust_kph.unwrap_or(snapshot.wind.kph * GUST_FACTOR)
}

fn has_thunder_risk(condition: &str) -> bool {
    let lower = condition.to_lowercase();
    THUNDER_KEYWORDS.iter().any(|kw| lower.contains(kw))
}
