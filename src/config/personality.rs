use std::fmt;
use std::str::FromStr;

use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rating_fraction;

/// Named playing styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    Balanced,
    Aggressive,
    Positional,
    Defensive,
    Tactical,
    Solid,
    Romantic,
}

impl Personality {
    pub const ALL: [Personality; 7] = [
        Personality::Balanced,
        Personality::Aggressive,
        Personality::Positional,
        Personality::Defensive,
        Personality::Tactical,
        Personality::Solid,
        Personality::Romantic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Personality::Balanced => "balanced",
            Personality::Aggressive => "aggressive",
            Personality::Positional => "positional",
            Personality::Defensive => "defensive",
            Personality::Tactical => "tactical",
            Personality::Solid => "solid",
            Personality::Romantic => "romantic",
        }
    }

    /// Parse a name, falling back to `Balanced` for anything unknown.
    pub fn from_name_or_default(name: &str) -> Personality {
        name.parse().unwrap_or_else(|_| {
            warn!("unknown personality `{}`, using balanced", name);
            Personality::Balanced
        })
    }

    /// Words in an opening's name that this style gravitates towards.
    pub fn opening_keywords(self) -> &'static [&'static str] {
        match self {
            Personality::Balanced => &[],
            Personality::Aggressive => &["Attack", "Sicilian", "King's Indian", "Dragon"],
            Personality::Positional => &["Queen's Gambit Declined", "English", "Catalan", "Reti", "Slav"],
            Personality::Defensive => &["Caro-Kann", "French", "Berlin", "Petrov"],
            Personality::Tactical => &["Gambit", "Attack", "Open", "Scotch"],
            Personality::Solid => &["London", "Slav", "Caro-Kann", "Queen's Gambit Declined"],
            Personality::Romantic => &["Gambit", "King's Gambit", "Evans", "Vienna"],
        }
    }

    /// Base multipliers for this style.
    pub fn modifiers(self) -> PersonalityModifiers {
        let base = PersonalityModifiers::NEUTRAL;
        match self {
            Personality::Balanced => base,
            Personality::Aggressive => PersonalityModifiers {
                tactical: 1.3,
                king_safety: 0.8,
                mobility: 1.2,
                aggression: 1.6,
                risk_tolerance: 1.4,
                sacrifice_willingness: 1.3,
                patience: 0.8,
                ..base
            },
            Personality::Positional => PersonalityModifiers {
                positional: 1.4,
                tactical: 0.9,
                pawn_structure: 1.4,
                mobility: 1.1,
                aggression: 0.9,
                risk_tolerance: 0.8,
                patience: 1.3,
                consistency: 1.2,
                ..base
            },
            Personality::Defensive => PersonalityModifiers {
                material: 1.1,
                king_safety: 1.5,
                aggression: 0.6,
                risk_tolerance: 0.6,
                sacrifice_willingness: 0.6,
                patience: 1.2,
                ..base
            },
            Personality::Tactical => PersonalityModifiers {
                tactical: 1.5,
                positional: 0.85,
                mobility: 1.2,
                aggression: 1.2,
                risk_tolerance: 1.2,
                ..base
            },
            Personality::Solid => PersonalityModifiers {
                material: 1.15,
                pawn_structure: 1.25,
                king_safety: 1.25,
                risk_tolerance: 0.7,
                sacrifice_willingness: 0.7,
                consistency: 1.3,
                ..base
            },
            Personality::Romantic => PersonalityModifiers {
                material: 0.85,
                tactical: 1.3,
                aggression: 1.5,
                risk_tolerance: 1.5,
                sacrifice_willingness: 1.8,
                consistency: 0.8,
                ..base
            },
        }
    }
}

impl FromStr for Personality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Personality::ALL
            .iter()
            .copied()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| format!("unknown personality: {}", s))
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Default for Personality {
    fn default() -> Self {
        Personality::Balanced
    }
}

/// Multiplicative overlay on evaluation weights and behaviour. 1.0 is neutral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonalityModifiers {
    pub material: f64,
    pub positional: f64,
    pub tactical: f64,
    pub king_safety: f64,
    pub mobility: f64,
    pub pawn_structure: f64,
    pub aggression: f64,
    pub risk_tolerance: f64,
    pub sacrifice_willingness: f64,
    pub patience: f64,
    pub consistency: f64,
}

impl PersonalityModifiers {
    pub const NEUTRAL: PersonalityModifiers = PersonalityModifiers {
        material: 1.0,
        positional: 1.0,
        tactical: 1.0,
        king_safety: 1.0,
        mobility: 1.0,
        pawn_structure: 1.0,
        aggression: 1.0,
        risk_tolerance: 1.0,
        sacrifice_willingness: 1.0,
        patience: 1.0,
        consistency: 1.0,
    };

    fn map(self, mut f: impl FnMut(f64) -> f64) -> Self {
        self.zip(self, |a, _| f(a))
    }

    fn zip(self, other: Self, mut f: impl FnMut(f64, f64) -> f64) -> Self {
        PersonalityModifiers {
            material: f(self.material, other.material),
            positional: f(self.positional, other.positional),
            tactical: f(self.tactical, other.tactical),
            king_safety: f(self.king_safety, other.king_safety),
            mobility: f(self.mobility, other.mobility),
            pawn_structure: f(self.pawn_structure, other.pawn_structure),
            aggression: f(self.aggression, other.aggression),
            risk_tolerance: f(self.risk_tolerance, other.risk_tolerance),
            sacrifice_willingness: f(self.sacrifice_willingness, other.sacrifice_willingness),
            patience: f(self.patience, other.patience),
            consistency: f(self.consistency, other.consistency),
        }
    }
}

impl Default for PersonalityModifiers {
    fn default() -> Self {
        PersonalityModifiers::NEUTRAL
    }
}

/// Modifiers for a personality name; unknown names get `balanced`.
pub fn personality(name: &str) -> PersonalityModifiers {
    Personality::from_name_or_default(name).modifiers()
}

/// Linear interpolation: `t = 0` gives `a`, `t = 1` gives `b`.
pub fn blend(a: &PersonalityModifiers, b: &PersonalityModifiers, t: f64) -> PersonalityModifiers {
    let t = t.clamp(0.0, 1.0);
    a.zip(*b, |x, y| x * (1.0 - t) + y * t)
}

/// Exaggerate the style at low ratings and damp it towards neutral at high ones.
///
/// Deviation from 1.0 is scaled by 1.5 at the rating floor down to 0.5 at the top.
pub fn rating_adjust(modifiers: &PersonalityModifiers, rating: u32) -> PersonalityModifiers {
    let scale = 1.5 - rating_fraction(rating);
    modifiers.map(|m| (1.0 + (m - 1.0) * scale).max(0.1))
}

/// Random jitter on every multiplier, wider for weaker ratings.
pub fn perturb<R: Rng>(modifiers: &PersonalityModifiers, rating: u32, rng: &mut R) -> PersonalityModifiers {
    let amplitude = 0.02 + 0.13 * (1.0 - rating_fraction(rating));
    modifiers.map(|m| (m * (1.0 + rng.gen_range(-amplitude..=amplitude))).max(0.1))
}
