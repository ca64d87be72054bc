//! Per-request recipe scoring
//!
//! Base scores come from the ranking model, or from uniform noise when the
//! model is missing or fails. Heuristic overlays are then applied in a fixed
//! order, followed by a small Gaussian jitter that breaks ties.

use super::dataset::{Nutrient, Recipe, RecipeTable};
use super::model::{ModelError, RankingModel};
use crate::config::{FoodTypePolicy, ScoringConfig};
use diet_planner_shared::{vectorize, Chronic, Deficiency, UserProfile, UserVector};
use metrics::counter;
use ndarray::Array1;
use ndarray_rand::rand_distr::{Distribution, Normal, Uniform};
use ndarray_rand::RandomExt;
use rand::Rng;
use tracing::{debug, warn};

/// Score bonus per mg of iron for iron-deficient users
pub const IRON_BONUS_PER_MG: f64 = 0.02;

/// Score bonus per gram of protein for protein-deficient users
pub const PROTEIN_BONUS_PER_G: f64 = 0.03;

/// Score penalty per gram of carbohydrate for diabetic users
pub const DIABETES_CARB_PENALTY_PER_G: f64 = 0.01;

/// Where the base scores came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreSource {
    Model,
    RandomFallback,
}

/// Adjusted scores parallel to the recipe table
///
/// `None` marks a recipe excluded from candidacy.
#[derive(Debug, Clone)]
pub struct ScoredRecipes {
    scores: Vec<Option<f32>>,
    source: ScoreSource,
}

impl ScoredRecipes {
    pub fn new(scores: Vec<Option<f32>>, source: ScoreSource) -> Self {
        Self { scores, source }
    }

    pub fn scores(&self) -> &[Option<f32>] {
        &self.scores
    }

    /// Score of the recipe at `index`, `None` if excluded or out of range
    pub fn get(&self, index: usize) -> Option<f32> {
        self.scores.get(index).copied().flatten()
    }

    pub fn source(&self) -> ScoreSource {
        self.source
    }
}

/// Scores every recipe of a table for one user
pub struct ScoringEngine<'a> {
    table: &'a RecipeTable,
    model: Option<&'a dyn RankingModel>,
    config: &'a ScoringConfig,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(
        table: &'a RecipeTable,
        model: Option<&'a dyn RankingModel>,
        config: &'a ScoringConfig,
    ) -> Self {
        Self {
            table,
            model,
            config,
        }
    }

    pub fn score<R: Rng>(&self, user: &UserProfile, rng: &mut R) -> ScoredRecipes {
        let vector = vectorize(user);

        let (base, source) = match self.model_scores(&vector) {
            Ok(scores) => (scores, ScoreSource::Model),
            Err(err) => {
                warn!(error = %err, "Ranking model unavailable, using random scores");
                counter!("model_fallback_total").increment(1);
                (self.random_scores(rng), ScoreSource::RandomFallback)
            }
        };

        let mut scores: Vec<Option<f32>> = self
            .table
            .recipes()
            .iter()
            .zip(base)
            .map(|(recipe, score)| self.adjust(user, recipe, score))
            .collect();

        self.add_jitter(&mut scores, rng);

        debug!(
            recipes = scores.len(),
            excluded = scores.iter().filter(|s| s.is_none()).count(),
            ?source,
            "Recipes scored"
        );

        ScoredRecipes::new(scores, source)
    }

    fn model_scores(&self, user: &UserVector) -> Result<Vec<f32>, ModelError> {
        let model = self.model.ok_or(ModelError::Unavailable)?;
        let scores = model.score_batch(user, self.table.features().view())?;
        if scores.len() != self.table.len() {
            return Err(ModelError::OutputLength {
                expected: self.table.len(),
                actual: scores.len(),
            });
        }
        Ok(scores)
    }

    fn random_scores<R: Rng>(&self, rng: &mut R) -> Vec<f32> {
        Array1::random_using(self.table.len(), Uniform::new(0.0f32, 1.0), rng).to_vec()
    }

    /// Apply the heuristic overlays; `None` when the recipe is filtered out
    fn adjust(&self, user: &UserProfile, recipe: &Recipe, score: f32) -> Option<f32> {
        let mut score = score;

        if let Some(cuisine) = user.cuisine_pref.as_deref() {
            if !recipe.has_cuisine(cuisine) {
                score *= self.config.cuisine_penalty;
            }
        }

        if let Some(food_type) = user.food_type.as_deref() {
            if !recipe.has_food_type(food_type) {
                match self.config.food_type_policy {
                    FoodTypePolicy::Filter => return None,
                    FoodTypePolicy::Penalty => score *= self.config.food_type_soft_penalty,
                }
            }
        }

        match user.deficiency {
            Deficiency::Iron => score += (recipe.nutrient(Nutrient::IronMg) * IRON_BONUS_PER_MG) as f32,
            Deficiency::Protein => {
                score += (recipe.nutrient(Nutrient::ProteinG) * PROTEIN_BONUS_PER_G) as f32
            }
            _ => {}
        }

        if user.chronic == Chronic::Diabetes {
            score -= (recipe.nutrient(Nutrient::CarbsG) * DIABETES_CARB_PENALTY_PER_G) as f32;
        }

        Some(score)
    }

    fn add_jitter<R: Rng>(&self, scores: &mut [Option<f32>], rng: &mut R) {
        if self.config.jitter_std <= 0.0 {
            return;
        }
        let Ok(normal) = Normal::new(0.0f32, self.config.jitter_std) else {
            return;
        };
        // One draw per recipe keeps the stream independent of which rows are excluded
        for score in scores.iter_mut() {
            let noise = normal.sample(rng);
            if let Some(value) = score {
                *value += noise;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dataset::fixtures::{sample_table, CUISINES};
    use diet_planner_shared::PlanRequest;
    use ndarray::ArrayView2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;

    /// Model that gives every recipe the same score
    struct ConstantModel(f32);

    impl RankingModel for ConstantModel {
        fn user_dim(&self) -> usize {
            diet_planner_shared::USER_VECTOR_DIM
        }

        fn recipe_dim(&self) -> usize {
            Nutrient::COUNT
        }

        fn score_batch(&self, _user: &[f32], recipes: ArrayView2<'_, f32>) -> Result<Vec<f32>, ModelError> {
            Ok(vec![self.0; recipes.nrows()])
        }
    }

    /// Model that always fails at inference time
    struct BrokenModel;

    impl RankingModel for BrokenModel {
        fn user_dim(&self) -> usize {
            4
        }

        fn recipe_dim(&self) -> usize {
            Nutrient::COUNT
        }

        fn score_batch(&self, user: &[f32], _recipes: ArrayView2<'_, f32>) -> Result<Vec<f32>, ModelError> {
            Err(ModelError::DimensionMismatch {
                expected: 4,
                actual: user.len(),
            })
        }
    }

    /// Model that returns too few scores
    struct ShortModel;

    impl RankingModel for ShortModel {
        fn user_dim(&self) -> usize {
            diet_planner_shared::USER_VECTOR_DIM
        }

        fn recipe_dim(&self) -> usize {
            Nutrient::COUNT
        }

        fn score_batch(&self, _user: &[f32], _recipes: ArrayView2<'_, f32>) -> Result<Vec<f32>, ModelError> {
            Ok(vec![1.0])
        }
    }

    fn no_jitter() -> ScoringConfig {
        ScoringConfig {
            jitter_std: 0.0,
            ..ScoringConfig::default()
        }
    }

    fn profile(body: serde_json::Value) -> UserProfile {
        let request: PlanRequest = serde_json::from_value(body).unwrap();
        UserProfile::from_request(&request)
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_model_scores_are_used() {
        let table = sample_table();
        let config = no_jitter();
        let model = ConstantModel(0.5);
        let engine = ScoringEngine::new(&table, Some(&model), &config);

        let scored = engine.score(&UserProfile::default(), &mut rng());
        assert_eq!(scored.source(), ScoreSource::Model);
        assert_eq!(scored.scores().len(), table.len());
        assert!(scored.scores().iter().all(|s| *s == Some(0.5)));
    }

    #[test]
    fn test_missing_model_falls_back_to_uniform_scores() {
        let table = sample_table();
        let config = no_jitter();
        let engine = ScoringEngine::new(&table, None, &config);

        let scored = engine.score(&UserProfile::default(), &mut rng());
        assert_eq!(scored.source(), ScoreSource::RandomFallback);
        assert_eq!(scored.scores().len(), table.len());
        assert!(scored
            .scores()
            .iter()
            .all(|s| matches!(s, Some(v) if (0.0..1.0).contains(v))));
    }

    #[test]
    fn test_inference_errors_fall_back() {
        let table = sample_table();
        let config = no_jitter();

        let broken = BrokenModel;
        let scored = ScoringEngine::new(&table, Some(&broken), &config).score(&UserProfile::default(), &mut rng());
        assert_eq!(scored.source(), ScoreSource::RandomFallback);

        let short = ShortModel;
        let scored = ScoringEngine::new(&table, Some(&short), &config).score(&UserProfile::default(), &mut rng());
        assert_eq!(scored.source(), ScoreSource::RandomFallback);
        assert_eq!(scored.scores().len(), table.len());
    }

    #[test]
    fn test_cuisine_penalty() {
        let table = sample_table();
        let config = no_jitter();
        let model = ConstantModel(1.0);
        let engine = ScoringEngine::new(&table, Some(&model), &config);

        let scored = engine.score(&profile(json!({ "cuisine_pref": "INDIAN" })), &mut rng());
        for (recipe, score) in table.recipes().iter().zip(scored.scores()) {
            let expected = if recipe.cuisine == CUISINES[0] { 1.0 } else { 0.8 };
            assert_eq!(*score, Some(expected), "{}", recipe.name);
        }
    }

    #[test]
    fn test_food_type_filter_excludes_other_types() {
        let table = sample_table();
        let config = no_jitter();
        let model = ConstantModel(1.0);
        let engine = ScoringEngine::new(&table, Some(&model), &config);

        let scored = engine.score(&profile(json!({ "food_type": "vegan" })), &mut rng());
        for (i, recipe) in table.recipes().iter().enumerate() {
            assert_eq!(scored.get(i).is_some(), recipe.food_type == "vegan");
        }
    }

    #[test]
    fn test_food_type_soft_penalty() {
        let table = sample_table();
        let config = ScoringConfig {
            food_type_policy: FoodTypePolicy::Penalty,
            ..no_jitter()
        };
        let model = ConstantModel(1.0);
        let engine = ScoringEngine::new(&table, Some(&model), &config);

        let scored = engine.score(&profile(json!({ "food_type": "veg" })), &mut rng());
        for (recipe, score) in table.recipes().iter().zip(scored.scores()) {
            let expected = if recipe.food_type == "veg" { 1.0 } else { 0.5 };
            assert_eq!(*score, Some(expected));
        }
    }

    #[test]
    fn test_deficiency_bonuses() {
        let table = sample_table();
        let config = no_jitter();
        let model = ConstantModel(0.0);
        let engine = ScoringEngine::new(&table, Some(&model), &config);

        let iron = engine.score(&profile(json!({ "deficiency": "iron" })), &mut rng());
        let protein = engine.score(&profile(json!({ "deficiency": "protein" })), &mut rng());
        for (i, recipe) in table.recipes().iter().enumerate() {
            let expected_iron = (recipe.nutrient(Nutrient::IronMg) * IRON_BONUS_PER_MG) as f32;
            let expected_protein = (recipe.nutrient(Nutrient::ProteinG) * PROTEIN_BONUS_PER_G) as f32;
            assert!((iron.get(i).unwrap() - expected_iron).abs() < 1e-6);
            assert!((protein.get(i).unwrap() - expected_protein).abs() < 1e-6);
        }
    }

    #[test]
    fn test_diabetes_penalizes_carbs() {
        let table = sample_table();
        let config = no_jitter();
        let model = ConstantModel(1.0);
        let engine = ScoringEngine::new(&table, Some(&model), &config);

        let scored = engine.score(&profile(json!({ "chronic": "Diabetes" })), &mut rng());
        for (i, recipe) in table.recipes().iter().enumerate() {
            let expected = 1.0 - (recipe.nutrient(Nutrient::CarbsG) * DIABETES_CARB_PENALTY_PER_G) as f32;
            assert!((scored.get(i).unwrap() - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_jitter_is_small() {
        let table = sample_table();
        let config = ScoringConfig::default();
        let model = ConstantModel(1.0);
        let engine = ScoringEngine::new(&table, Some(&model), &config);

        let scored = engine.score(&UserProfile::default(), &mut rng());
        assert!(scored.scores().iter().all(|s| (s.unwrap() - 1.0).abs() < 1e-2));
        assert!(scored.scores().iter().any(|s| *s != Some(1.0)));
    }

    #[test]
    fn test_same_seed_gives_same_scores() {
        let table = sample_table();
        let config = ScoringConfig::default();
        let engine = ScoringEngine::new(&table, None, &config);
        let user = profile(json!({ "goal": "gain", "food_type": "veg" }));

        let first = engine.score(&user, &mut ChaCha8Rng::seed_from_u64(42));
        let second = engine.score(&user, &mut ChaCha8Rng::seed_from_u64(42));
        let other = engine.score(&user, &mut ChaCha8Rng::seed_from_u64(43));

        assert_eq!(first.scores(), second.scores());
        assert_ne!(first.scores(), other.scores());
        // exclusion does not depend on the seed
        let excluded = |s: &ScoredRecipes| s.scores().iter().map(Option::is_none).collect::<Vec<_>>();
        assert_eq!(excluded(&first), excluded(&other));
    }
}
