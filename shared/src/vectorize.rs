//! User feature vector
//!
//! Layout (13 values):
//!
//! | index | feature                                   |
//! |-------|-------------------------------------------|
//! | 0     | age / 100                                 |
//! | 1     | BMI / 50                                  |
//! | 2     | activity_level / 2                        |
//! | 3-5   | goal one-hot `[loss, gain, muscle]`       |
//! | 6-9   | deficiency one-hot `[none, iron, vitd, protein]` |
//! | 10-12 | chronic one-hot `[none, diabetes, hypertension]` |
//!
//! Categories outside the known set leave their block all zero.
//! `calorie_target` is not part of the vector.

use crate::profile::{Chronic, Deficiency, Goal, UserProfile};

/// Length of every user vector
pub const USER_VECTOR_DIM: usize = 13;

/// Added to the squared height so an absent height never divides by zero
pub const BMI_EPSILON: f64 = 1e-6;

/// Fixed-length user vector
pub type UserVector = [f32; USER_VECTOR_DIM];

/// Body-mass index with a guarded denominator
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m + BMI_EPSILON)
}

/// Encode a normalized profile
pub fn vectorize(user: &UserProfile) -> UserVector {
    let mut values = Vec::with_capacity(USER_VECTOR_DIM);
    values.push(user.age / 100.0);
    values.push(bmi(user.weight_kg, user.height_cm) / 50.0);
    values.push(user.activity_level / 2.0);

    values.extend(one_hot(&Goal::KNOWN, &user.goal));
    values.extend(one_hot(&Deficiency::KNOWN, &user.deficiency));
    values.extend(one_hot(&Chronic::KNOWN, &user.chronic));

    let mut vector = [0.0f32; USER_VECTOR_DIM];
    for (slot, value) in vector.iter_mut().zip(values) {
        *slot = value as f32;
    }
    vector
}

fn one_hot<'a, T: PartialEq>(categories: &'a [T], value: &'a T) -> impl Iterator<Item = f64> + 'a {
    categories
        .iter()
        .map(move |category| if category == value { 1.0 } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_dimension_matches_category_counts() {
        let expected = 3 + Goal::KNOWN.len() + Deficiency::KNOWN.len() + Chronic::KNOWN.len();
        assert_eq!(USER_VECTOR_DIM, expected);
    }

    #[test]
    fn test_bmi_calculation() {
        let value = bmi(70.0, 175.0);
        assert!((value - 22.857).abs() < 0.01);
    }

    #[test]
    fn test_bmi_with_zero_height_is_finite() {
        assert!(bmi(70.0, 0.0).is_finite());
    }

    #[test]
    fn test_default_profile_vector() {
        let vector = vectorize(&UserProfile::default());

        assert!((vector[0] - 0.23).abs() < 1e-6);
        assert!((vector[2] - 0.775).abs() < 1e-6);
        // loss, none, none
        assert_eq!(&vector[3..6], &[1.0, 0.0, 0.0]);
        assert_eq!(&vector[6..10], &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(&vector[10..13], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_one_hot_positions() {
        let user = UserProfile {
            goal: Goal::Muscle,
            deficiency: Deficiency::Protein,
            chronic: Chronic::Hypertension,
            ..Default::default()
        };
        let vector = vectorize(&user);

        assert_eq!(&vector[3..6], &[0.0, 0.0, 1.0]);
        assert_eq!(&vector[6..10], &[0.0, 0.0, 0.0, 1.0]);
        assert_eq!(&vector[10..13], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unseen_categories_encode_to_zero() {
        let user = UserProfile {
            goal: Goal::Other("maintain".to_string()),
            deficiency: Deficiency::Other("zinc".to_string()),
            chronic: Chronic::Other("asthma".to_string()),
            ..Default::default()
        };
        let vector = vectorize(&user);
        assert!(vector[3..].iter().all(|v| *v == 0.0));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_vector_is_finite_and_deterministic(
            age in 0.0f64..120.0,
            height in 0.0f64..250.0,
            weight in 0.0f64..300.0,
            activity in 1.0f64..2.5,
        ) {
            let user = UserProfile {
                age,
                height_cm: height,
                weight_kg: weight,
                activity_level: activity,
                ..Default::default()
            };
            let first = vectorize(&user);
            let second = vectorize(&user);

            prop_assert_eq!(first, second);
            prop_assert!(first.iter().all(|v| v.is_finite()));
            prop_assert_eq!(first[3..].iter().sum::<f32>(), 3.0);
        }
    }
}
