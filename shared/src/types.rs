//! API request and response types

use crate::errors::ParseCategoryError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Plan request
// ============================================================================

/// Raw plan request as sent by clients
///
/// Every field is kept as an untyped JSON value so that `"abc"` for a number
/// or `null` for a string never rejects the request; see
/// [`UserProfile::from_request`](crate::profile::UserProfile::from_request).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanRequest {
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub height_cm: Option<Value>,
    #[serde(default)]
    pub weight_kg: Option<Value>,
    #[serde(default)]
    pub activity_level: Option<Value>,
    #[serde(default)]
    pub goal: Option<Value>,
    #[serde(default)]
    pub deficiency: Option<Value>,
    #[serde(default)]
    pub chronic: Option<Value>,
    #[serde(default)]
    pub cuisine_pref: Option<Value>,
    #[serde(default)]
    pub food_type: Option<Value>,
    #[serde(default)]
    pub calorie_target: Option<Value>,
    /// Seed for every random draw of the request (jitter and fallback scores)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<Value>,
}

// ============================================================================
// Meal slots
// ============================================================================

/// One of the three daily meal slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    /// Slots in the order they are filled each day
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Dinner => "Dinner",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealSlot {
    type Err = ParseCategoryError;

    /// Case-insensitive parse
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealSlot::Breakfast),
            "lunch" => Ok(MealSlot::Lunch),
            "dinner" => Ok(MealSlot::Dinner),
            _ => Err(ParseCategoryError::MealSlot(s.to_string())),
        }
    }
}

// ============================================================================
// Plan response
// ============================================================================

/// Display copy of a selected recipe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealSelection {
    pub recipe_name: String,
    pub ingredients: String,
    pub instructions: String,
    pub preparation: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub iron_mg: f64,
    pub suitable_for_diabetes: bool,
}

impl MealSelection {
    /// Placeholder emitted when no recipe matches a slot
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn is_placeholder(&self) -> bool {
        self.recipe_name.is_empty()
    }
}

/// The three meals of one day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    #[serde(rename = "Breakfast")]
    pub breakfast: MealSelection,
    #[serde(rename = "Lunch")]
    pub lunch: MealSelection,
    #[serde(rename = "Dinner")]
    pub dinner: MealSelection,
}

impl DayPlan {
    pub fn meal(&self, slot: MealSlot) -> &MealSelection {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
        }
    }

    pub fn meal_mut(&mut self, slot: MealSlot) -> &mut MealSelection {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
        }
    }

    /// Meals in slot order
    pub fn meals(&self) -> impl Iterator<Item = (MealSlot, &MealSelection)> {
        MealSlot::ALL.into_iter().map(move |slot| (slot, self.meal(slot)))
    }
}

/// Seven ordered days of meals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPlan {
    pub days: Vec<DayPlan>,
}

/// Full response of the plan endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResponse {
    pub plan: WeeklyPlan,
    pub workout: Vec<String>,
}

// ============================================================================
// Status
// ============================================================================

/// Engine status report used to detect degraded mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub dataset_loaded: bool,
    pub model_loaded: bool,
    pub recipe_count: usize,
    pub feature_dim: usize,
    pub user_dim: usize,
    pub categorical_dim: usize,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_slot_parse_is_case_insensitive() {
        assert_eq!("breakfast".parse::<MealSlot>(), Ok(MealSlot::Breakfast));
        assert_eq!(" LUNCH ".parse::<MealSlot>(), Ok(MealSlot::Lunch));
        assert_eq!("Dinner".parse::<MealSlot>(), Ok(MealSlot::Dinner));
        assert!("snack".parse::<MealSlot>().is_err());
    }

    #[test]
    fn test_day_plan_serializes_slot_names() {
        let mut day = DayPlan::default();
        day.meal_mut(MealSlot::Lunch).recipe_name = "Dal".to_string();

        let json = serde_json::to_value(&day).unwrap();
        assert!(json.get("Breakfast").is_some());
        assert_eq!(json["Lunch"]["recipe_name"], "Dal");
        assert!(json.get("Dinner").is_some());
    }

    #[test]
    fn test_day_plan_meals_in_slot_order() {
        let day = DayPlan::default();
        let slots: Vec<MealSlot> = day.meals().map(|(slot, _)| slot).collect();
        assert_eq!(slots, MealSlot::ALL.to_vec());
    }

    #[test]
    fn test_request_tolerates_wrong_types() {
        let request: PlanRequest =
            serde_json::from_str(r#"{"age": "abc", "goal": null, "unknown": 1}"#).unwrap();
        assert_eq!(request.age, Some(Value::from("abc")));
        assert!(request.goal.is_none());
    }
}
