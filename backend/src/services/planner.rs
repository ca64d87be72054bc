//! Weekly plan assembly
//!
//! Each of the 21 slots takes the best-scoring candidate for its meal type
//! that is not among the most recent selections. When every candidate is
//! recent the top one is repeated; when a slot has no candidates at all it
//! gets an empty placeholder.

use super::dataset::RecipeTable;
use super::scoring::ScoredRecipes;
use diet_planner_shared::{DayPlan, MealSelection, MealSlot, WeeklyPlan};
use metrics::counter;
use std::collections::VecDeque;
use tracing::debug;

pub const DAYS_PER_WEEK: usize = 7;

/// Most recent selected recipe names, oldest first
#[derive(Debug, Clone)]
pub struct NoveltyWindow {
    capacity: usize,
    names: VecDeque<String>,
}

impl NoveltyWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            names: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Record a selection, evicting the oldest entries past capacity
    ///
    /// A repeated name moves to the most recent position.
    pub fn record(&mut self, name: &str) {
        if let Some(pos) = self.names.iter().position(|n| n == name) {
            self.names.remove(pos);
        }
        self.names.push_back(name.to_string());
        while self.names.len() > self.capacity {
            self.names.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Turns scored recipes into a seven-day plan
pub struct PlanBuilder<'a> {
    table: &'a RecipeTable,
    novelty_window: usize,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(table: &'a RecipeTable, novelty_window: usize) -> Self {
        Self {
            table,
            novelty_window,
        }
    }

    pub fn build(&self, scored: &ScoredRecipes) -> WeeklyPlan {
        let ranked: Vec<(MealSlot, Vec<usize>)> = MealSlot::ALL
            .into_iter()
            .map(|slot| (slot, self.ranked_candidates(slot, scored)))
            .collect();

        let mut recent = NoveltyWindow::new(self.novelty_window);
        let mut days = Vec::with_capacity(DAYS_PER_WEEK);

        for day in 0..DAYS_PER_WEEK {
            let mut plan = DayPlan::default();
            for (slot, candidates) in &ranked {
                let selection = self.select(candidates, &mut recent);
                if selection.is_placeholder() {
                    debug!(day, slot = %slot, "No candidates for slot");
                }
                *plan.meal_mut(*slot) = selection;
            }
            days.push(plan);
        }

        WeeklyPlan { days }
    }

    /// Indices of non-excluded recipes for `slot`, best first, ties in table order
    fn ranked_candidates(&self, slot: MealSlot, scored: &ScoredRecipes) -> Vec<usize> {
        let mut candidates: Vec<(usize, f32)> = self
            .table
            .recipes()
            .iter()
            .enumerate()
            .filter(|(_, recipe)| recipe.slot == Some(slot))
            .filter_map(|(idx, _)| scored.get(idx).map(|score| (idx, score)))
            .collect();

        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
        candidates.into_iter().map(|(idx, _)| idx).collect()
    }

    fn select(&self, candidates: &[usize], recent: &mut NoveltyWindow) -> MealSelection {
        let Some(&top) = candidates.first() else {
            counter!("placeholder_slots_total").increment(1);
            return MealSelection::placeholder();
        };

        let recipes = self.table.recipes();
        let pick = candidates
            .iter()
            .copied()
            .find(|&idx| !recent.contains(&recipes[idx].name))
            .unwrap_or(top);

        let recipe = &recipes[pick];
        recent.record(&recipe.name);
        recipe.selection()
    }
}
