//! User profile normalization
//!
//! Turns a loosely-typed plan request into a [`UserProfile`] the engine can
//! rely on. Coercion never fails: every field that is absent, `null`, empty,
//! `"none"` or unparsable falls back to its documented default.
//!
//! # Defaults
//!
//! | field            | default  |
//! |------------------|----------|
//! | `age`            | 23       |
//! | `height_cm`      | 170      |
//! | `weight_kg`      | 70       |
//! | `activity_level` | 1.55     |
//! | `goal`           | `loss`   |
//! | `deficiency`     | `none`   |
//! | `chronic`        | `none`   |
//! | `cuisine_pref`   | none     |
//! | `food_type`      | none     |
//! | `calorie_target` | none     |

use crate::types::PlanRequest;
use serde_json::Value;
use std::fmt;

pub const DEFAULT_AGE: f64 = 23.0;
pub const DEFAULT_HEIGHT_CM: f64 = 170.0;
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;
pub const DEFAULT_ACTIVITY_LEVEL: f64 = 1.55;

/// Literal used by clients to mean "no value"
pub const NONE_LITERAL: &str = "none";

// ============================================================================
// Categorical fields
// ============================================================================

/// Weekly training/nutrition goal
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Goal {
    #[default]
    Loss,
    Gain,
    Muscle,
    /// Any goal outside the known set, kept as its normalized text
    Other(String),
}

impl Goal {
    /// Known goals in one-hot order
    pub const KNOWN: [Goal; 3] = [Goal::Loss, Goal::Gain, Goal::Muscle];

    /// Build from an already-normalized value
    pub fn from_normalized(value: &str) -> Self {
        match value {
            "loss" => Goal::Loss,
            "gain" => Goal::Gain,
            "muscle" => Goal::Muscle,
            other => Goal::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Goal::Loss => "loss",
            Goal::Gain => "gain",
            Goal::Muscle => "muscle",
            Goal::Other(value) => value,
        }
    }
}

/// Nutrient deficiency the plan should compensate for
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Deficiency {
    #[default]
    None,
    Iron,
    VitaminD,
    Protein,
    Other(String),
}

impl Deficiency {
    /// Known deficiencies in one-hot order
    pub const KNOWN: [Deficiency; 4] = [
        Deficiency::None,
        Deficiency::Iron,
        Deficiency::VitaminD,
        Deficiency::Protein,
    ];

    pub fn from_normalized(value: &str) -> Self {
        match value {
            NONE_LITERAL => Deficiency::None,
            "iron" => Deficiency::Iron,
            "vitd" => Deficiency::VitaminD,
            "protein" => Deficiency::Protein,
            other => Deficiency::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Deficiency::None => NONE_LITERAL,
            Deficiency::Iron => "iron",
            Deficiency::VitaminD => "vitd",
            Deficiency::Protein => "protein",
            Deficiency::Other(value) => value,
        }
    }
}

/// Chronic condition that constrains recipe choice
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Chronic {
    #[default]
    None,
    Diabetes,
    Hypertension,
    Other(String),
}

impl Chronic {
    /// Known conditions in one-hot order
    pub const KNOWN: [Chronic; 3] = [Chronic::None, Chronic::Diabetes, Chronic::Hypertension];

    pub fn from_normalized(value: &str) -> Self {
        match value {
            NONE_LITERAL => Chronic::None,
            "diabetes" => Chronic::Diabetes,
            "hypertension" => Chronic::Hypertension,
            other => Chronic::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Chronic::None => NONE_LITERAL,
            Chronic::Diabetes => "diabetes",
            Chronic::Hypertension => "hypertension",
            Chronic::Other(value) => value,
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Deficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Chronic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// User profile
// ============================================================================

/// Normalized per-request user profile
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub age: f64,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: f64,
    pub goal: Goal,
    pub deficiency: Deficiency,
    pub chronic: Chronic,
    /// Preferred cuisine, lower-cased; `None` means no preference
    pub cuisine_pref: Option<String>,
    /// Required food type, lower-cased; `None` means no restriction
    pub food_type: Option<String>,
    pub calorie_target: Option<f64>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            age: DEFAULT_AGE,
            height_cm: DEFAULT_HEIGHT_CM,
            weight_kg: DEFAULT_WEIGHT_KG,
            activity_level: DEFAULT_ACTIVITY_LEVEL,
            goal: Goal::default(),
            deficiency: Deficiency::default(),
            chronic: Chronic::default(),
            cuisine_pref: None,
            food_type: None,
            calorie_target: None,
        }
    }
}

impl UserProfile {
    /// Coerce and normalize a raw request
    pub fn from_request(request: &PlanRequest) -> Self {
        let goal = normalize_category(request.goal.as_ref()).unwrap_or_else(|| "loss".to_string());
        let deficiency = normalize_category(request.deficiency.as_ref());
        let chronic = normalize_category(request.chronic.as_ref());

        Self {
            age: coerce_number(request.age.as_ref(), DEFAULT_AGE),
            height_cm: coerce_number(request.height_cm.as_ref(), DEFAULT_HEIGHT_CM),
            weight_kg: coerce_number(request.weight_kg.as_ref(), DEFAULT_WEIGHT_KG),
            activity_level: coerce_number(request.activity_level.as_ref(), DEFAULT_ACTIVITY_LEVEL),
            goal: Goal::from_normalized(&goal),
            deficiency: deficiency
                .as_deref()
                .map(Deficiency::from_normalized)
                .unwrap_or_default(),
            chronic: chronic
                .as_deref()
                .map(Chronic::from_normalized)
                .unwrap_or_default(),
            cuisine_pref: normalize_category(request.cuisine_pref.as_ref()),
            food_type: normalize_category(request.food_type.as_ref()),
            calorie_target: coerce_optional_number(request.calorie_target.as_ref()),
        }
    }

    /// Convert back into request form; `from_request` on the result yields `self`
    pub fn to_request(&self) -> PlanRequest {
        PlanRequest {
            age: Some(Value::from(self.age)),
            height_cm: Some(Value::from(self.height_cm)),
            weight_kg: Some(Value::from(self.weight_kg)),
            activity_level: Some(Value::from(self.activity_level)),
            goal: Some(Value::from(self.goal.as_str())),
            deficiency: Some(Value::from(self.deficiency.as_str())),
            chronic: Some(Value::from(self.chronic.as_str())),
            cuisine_pref: self.cuisine_pref.clone().map(Value::from),
            food_type: self.food_type.clone().map(Value::from),
            calorie_target: self.calorie_target.map(Value::from),
            seed: None,
        }
    }
}

// ============================================================================
// Coercion helpers
// ============================================================================

/// Normalize a categorical value: trimmed and lower-cased
///
/// Returns `None` for absent, `null`, non-string, empty and `"none"` values.
/// Applying it to its own output is a no-op.
pub fn normalize_category(value: Option<&Value>) -> Option<String> {
    let text = value?.as_str()?.trim().to_lowercase();
    if text.is_empty() || text == NONE_LITERAL {
        None
    } else {
        Some(text)
    }
}

/// Coerce a number-like value, falling back to `default`
pub fn coerce_number(value: Option<&Value>, default: f64) -> f64 {
    parse_number(value).unwrap_or(default)
}

/// Coerce an optional number-like value; zero and unparsable values are absent
pub fn coerce_optional_number(value: Option<&Value>) -> Option<f64> {
    parse_number(value).filter(|v| *v != 0.0)
}

/// Coerce a random seed from a non-negative integer or numeric string
pub fn coerce_seed(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}
