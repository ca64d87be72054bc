//! Static weekly workout catalogues, one per goal

use crate::profile::Goal;

pub const LOSS_WORKOUTS: [&str; 7] = [
    "HIIT + Core (30–40 min)",
    "Brisk Walk/Cycling (45 min)",
    "Full Body Strength (40 min)",
    "Yoga + Mobility (30 min)",
    "Interval Running + Core (30 min)",
    "Bodyweight Strength (40 min)",
    "Light Walk + Stretch (20 min)",
];

pub const MUSCLE_WORKOUTS: [&str; 7] = [
    "Push Day: Chest/Shoulders/Triceps (60 min)",
    "Pull Day: Back/Biceps (60 min)",
    "Leg Day: Squats/Deadlifts (60 min)",
    "Core + Mobility (30 min)",
    "Upper Body Strength (50 min)",
    "Lower Body Strength (50 min)",
    "Active Rest + Stretch (20 min)",
];

pub const GAIN_WORKOUTS: [&str; 7] = [
    "Heavy Full Body Strength (50 min)",
    "Cardio 20 min + Shoulders (40 min)",
    "Moderate Full Body Strength (45 min)",
    "Core + Yoga (30 min)",
    "Upper Body Hypertrophy (50 min)",
    "Lower Body Hypertrophy (50 min)",
    "Rest Day + Stretch (20 min)",
];

/// Catalogue for a goal; unknown goals get the weight-loss week
pub fn catalogue(goal: &Goal) -> &'static [&'static str; 7] {
    match goal {
        Goal::Muscle => &MUSCLE_WORKOUTS,
        Goal::Gain => &GAIN_WORKOUTS,
        Goal::Loss | Goal::Other(_) => &LOSS_WORKOUTS,
    }
}

/// Owned seven-day workout list for a response
pub fn workout_plan(goal: &Goal) -> Vec<String> {
    catalogue(goal).iter().map(|w| w.to_string()).collect()
}
