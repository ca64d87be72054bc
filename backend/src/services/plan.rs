//! Plan service - one weekly meal and workout plan per request

use super::planner::PlanBuilder;
use super::scoring::ScoringEngine;
use crate::state::EngineContext;
use diet_planner_shared::profile::coerce_seed;
use diet_planner_shared::{workouts, PlanRequest, PlanResponse, UserProfile};
use metrics::counter;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Plan service
pub struct PlanService;

impl PlanService {
    /// Generate a plan for a raw request
    ///
    /// CPU-bound and synchronous; async callers should run it on the
    /// blocking pool. The request `seed`, or else the configured seed, makes
    /// every random draw reproducible.
    pub fn generate(engine: &EngineContext, request: &PlanRequest) -> PlanResponse {
        let profile = UserProfile::from_request(request);
        let seed = coerce_seed(request.seed.as_ref()).or(engine.scoring().seed);
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let scored = ScoringEngine::new(engine.table(), engine.model(), engine.scoring())
            .score(&profile, &mut rng);
        let plan = PlanBuilder::new(engine.table(), engine.planner().novelty_window).build(&scored);
        let workout = workouts::workout_plan(&profile.goal);

        info!(
            goal = %profile.goal,
            deficiency = %profile.deficiency,
            chronic = %profile.chronic,
            source = ?scored.source(),
            seeded = seed.is_some(),
            "Weekly plan generated"
        );
        counter!("plans_generated_total").increment(1);

        PlanResponse { plan, workout }
    }
}
