//! Recipe dataset loading and feature encoding
//!
//! The table is read once at startup from CSV and never mutated afterwards.
//! Loading fits two transforms over the whole dataset:
//!
//! - a [`CategoricalEncoder`] over `cuisine` and `meal_type`, whose width is
//!   reported as `categorical_dim` on the status endpoint
//! - a [`Standardizer`] over the [`Nutrient`] columns, which produces the
//!   per-recipe feature matrix consumed by the ranking model
//!
//! Missing or non-numeric nutrient cells count as `0.0`; missing categorical
//! cells fall into the [`UNKNOWN_CATEGORY`] bucket. Rows that cannot be
//! decoded, or that lack a name or meal type, are dropped.

use diet_planner_shared::{MealSelection, MealSlot};
use ndarray::Array2;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Bucket for missing categorical values
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Prefixes of boolean suitability columns
const FLAG_PREFIXES: [&str; 2] = ["suitable_for_", "recommended_for_"];

/// Dataset loading errors
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read recipe dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("Recipe dataset is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Recipe dataset contains no usable rows")]
    Empty,
}

// ============================================================================
// Nutrients
// ============================================================================

/// Numeric nutrition columns; declaration order is feature column order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nutrient {
    Calories,
    ProteinG,
    CarbsG,
    FatG,
    FiberG,
    GlycemicIndex,
    IronMg,
    CalciumMg,
    VitaminDMcg,
    SeleniumMcg,
    SaturatedFatG,
    SugarG,
    SodiumMg,
    PotassiumMg,
    VitaminB12Mcg,
    VitaminCMg,
}

impl Nutrient {
    pub const COUNT: usize = 16;

    pub const ALL: [Nutrient; Nutrient::COUNT] = [
        Nutrient::Calories,
        Nutrient::ProteinG,
        Nutrient::CarbsG,
        Nutrient::FatG,
        Nutrient::FiberG,
        Nutrient::GlycemicIndex,
        Nutrient::IronMg,
        Nutrient::CalciumMg,
        Nutrient::VitaminDMcg,
        Nutrient::SeleniumMcg,
        Nutrient::SaturatedFatG,
        Nutrient::SugarG,
        Nutrient::SodiumMg,
        Nutrient::PotassiumMg,
        Nutrient::VitaminB12Mcg,
        Nutrient::VitaminCMg,
    ];

    /// CSV column name
    pub fn column(&self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::ProteinG => "protein_g",
            Nutrient::CarbsG => "carbs_g",
            Nutrient::FatG => "fat_g",
            Nutrient::FiberG => "fiber_g",
            Nutrient::GlycemicIndex => "glycemic_index",
            Nutrient::IronMg => "iron_mg",
            Nutrient::CalciumMg => "calcium_mg",
            Nutrient::VitaminDMcg => "vitamin_d_mcg",
            Nutrient::SeleniumMcg => "selenium_mcg",
            Nutrient::SaturatedFatG => "saturated_fat_g",
            Nutrient::SugarG => "sugar_g",
            Nutrient::SodiumMg => "sodium_mg",
            Nutrient::PotassiumMg => "potassium_mg",
            Nutrient::VitaminB12Mcg => "vitamin_b12_mcg",
            Nutrient::VitaminCMg => "vitamin_c_mg",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

// ============================================================================
// Recipes
// ============================================================================

/// One immutable recipe row
#[derive(Debug, Clone)]
pub struct Recipe {
    pub name: String,
    /// Raw meal type text
    pub meal_type: String,
    /// Parsed meal slot; `None` when the meal type is not a known slot
    pub slot: Option<MealSlot>,
    pub cuisine: String,
    pub food_type: String,
    pub ingredients: String,
    pub instructions: String,
    pub preparation: String,
    nutrients: [f64; Nutrient::COUNT],
    flags: BTreeMap<String, bool>,
    cuisine_key: String,
    food_type_key: String,
}

impl Recipe {
    pub fn nutrient(&self, nutrient: Nutrient) -> f64 {
        self.nutrients[nutrient.index()]
    }

    /// Suitability flag, `false` when the column is absent
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Case-insensitive cuisine comparison against a lower-cased preference
    pub fn has_cuisine(&self, normalized: &str) -> bool {
        self.cuisine_key == normalized
    }

    /// Case-insensitive food type comparison against a lower-cased preference
    pub fn has_food_type(&self, normalized: &str) -> bool {
        self.food_type_key == normalized
    }

    /// Display copy placed into a plan
    pub fn selection(&self) -> MealSelection {
        MealSelection {
            recipe_name: self.name.clone(),
            ingredients: self.ingredients.clone(),
            instructions: self.instructions.clone(),
            preparation: self.preparation.clone(),
            calories: self.nutrient(Nutrient::Calories),
            protein_g: self.nutrient(Nutrient::ProteinG),
            carbs_g: self.nutrient(Nutrient::CarbsG),
            fat_g: self.nutrient(Nutrient::FatG),
            iron_mg: self.nutrient(Nutrient::IronMg),
            suitable_for_diabetes: self.flag("suitable_for_diabetes"),
        }
    }

    fn placeholder() -> Self {
        Self {
            name: String::new(),
            meal_type: UNKNOWN_CATEGORY.to_string(),
            slot: None,
            cuisine: UNKNOWN_CATEGORY.to_string(),
            food_type: UNKNOWN_CATEGORY.to_string(),
            ingredients: String::new(),
            instructions: String::new(),
            preparation: String::new(),
            nutrients: [0.0; Nutrient::COUNT],
            flags: BTreeMap::new(),
            cuisine_key: UNKNOWN_CATEGORY.to_lowercase(),
            food_type_key: UNKNOWN_CATEGORY.to_lowercase(),
        }
    }
}

// ============================================================================
// Encoders
// ============================================================================

/// One-hot encoder fit over categorical columns
///
/// Categories are sorted per column; unknown values encode to all zeros.
#[derive(Debug, Clone, Default)]
pub struct CategoricalEncoder {
    columns: Vec<(String, Vec<String>)>,
}

impl CategoricalEncoder {
    /// Fit one column per entry of `columns`, each paired with its observed values
    pub fn fit<'a>(columns: impl IntoIterator<Item = (&'a str, Vec<&'a str>)>) -> Self {
        let columns = columns
            .into_iter()
            .map(|(name, values)| {
                let mut categories: Vec<String> = values.into_iter().map(str::to_string).collect();
                categories.sort();
                categories.dedup();
                (name.to_string(), categories)
            })
            .collect();
        Self { columns }
    }

    /// Total output width
    pub fn len(&self) -> usize {
        self.columns.iter().map(|(_, c)| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Output names such as `cuisine_Indian`
    #[cfg(test)]
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|(name, categories)| categories.iter().map(move |c| format!("{}_{}", name, c)))
            .collect()
    }

    /// Encode one value per fitted column
    #[cfg(test)]
    pub fn transform(&self, values: &[&str]) -> Vec<f32> {
        let mut encoded = Vec::with_capacity(self.len());
        for ((_, categories), value) in self.columns.iter().zip(values) {
            encoded.extend(
                categories
                    .iter()
                    .map(|c| if c == value { 1.0 } else { 0.0 }),
            );
        }
        encoded
    }
}

/// Zero-mean, unit-variance scaler fit once over the dataset
///
/// Uses the population standard deviation; constant columns keep scale 1.
#[derive(Debug, Clone)]
pub struct Standardizer {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl Standardizer {
    pub fn fit(rows: &[[f64; Nutrient::COUNT]]) -> Self {
        let n = rows.len().max(1) as f64;
        let mut means = vec![0.0; Nutrient::COUNT];
        let mut scales = vec![1.0; Nutrient::COUNT];

        for col in 0..Nutrient::COUNT {
            let mean = rows.iter().map(|r| r[col]).sum::<f64>() / n;
            let variance = rows.iter().map(|r| (r[col] - mean).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt();
            means[col] = mean;
            if std > f64::EPSILON {
                scales[col] = std;
            }
        }

        Self { means, scales }
    }

    /// Identity transform used in degraded mode
    pub fn identity() -> Self {
        Self {
            means: vec![0.0; Nutrient::COUNT],
            scales: vec![1.0; Nutrient::COUNT],
        }
    }

    pub fn transform(&self, row: &[f64; Nutrient::COUNT]) -> [f32; Nutrient::COUNT] {
        let mut out = [0.0f32; Nutrient::COUNT];
        for (col, value) in row.iter().enumerate() {
            out[col] = ((value - self.means[col]) / self.scales[col]) as f32;
        }
        out
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }
}

// ============================================================================
// Table
// ============================================================================

/// The loaded recipe table plus its fitted transforms
#[derive(Debug, Clone)]
pub struct RecipeTable {
    recipes: Vec<Recipe>,
    features: Array2<f32>,
    encoder: CategoricalEncoder,
    standardizer: Standardizer,
    loaded: bool,
}

impl RecipeTable {
    /// Load a CSV dataset from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Reading recipe dataset");
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        Self::from_csv(reader)
    }

    /// Load a CSV dataset from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self::from_csv(reader)
    }

    /// Degraded-mode table: one empty recipe with an all-zero feature row
    pub fn placeholder() -> Self {
        Self {
            recipes: vec![Recipe::placeholder()],
            features: Array2::zeros((1, Nutrient::COUNT)),
            encoder: CategoricalEncoder::default(),
            standardizer: Standardizer::identity(),
            loaded: false,
        }
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, DatasetError> {
        let headers = reader.headers()?.clone();
        let columns = ColumnIndex::new(&headers)?;

        let mut recipes = Vec::new();
        for record in reader.records() {
            let record = match record {
                Ok(record) => record,
                Err(err) if err.is_io_error() => return Err(err.into()),
                Err(err) => {
                    warn!(
                        line = err.position().map(|p| p.line()),
                        error = %err,
                        "Skipping malformed recipe row"
                    );
                    continue;
                }
            };
            if let Some(recipe) = columns.parse_row(&record) {
                recipes.push(recipe);
            }
        }

        if recipes.is_empty() {
            return Err(DatasetError::Empty);
        }

        let encoder = CategoricalEncoder::fit([
            ("cuisine", recipes.iter().map(|r| r.cuisine.as_str()).collect::<Vec<_>>()),
            ("meal_type", recipes.iter().map(|r| r.meal_type.as_str()).collect::<Vec<_>>()),
        ]);

        let raw: Vec<[f64; Nutrient::COUNT]> = recipes.iter().map(|r| r.nutrients).collect();
        let standardizer = Standardizer::fit(&raw);

        let mut features = Array2::zeros((recipes.len(), Nutrient::COUNT));
        for (mut row, values) in features.rows_mut().into_iter().zip(&raw) {
            for (cell, value) in row.iter_mut().zip(standardizer.transform(values)) {
                *cell = value;
            }
        }

        info!(
            recipes = recipes.len(),
            features = Nutrient::COUNT,
            categories = encoder.len(),
            "Recipe dataset loaded"
        );

        Ok(Self {
            recipes,
            features,
            encoder,
            standardizer,
            loaded: true,
        })
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Standardized feature matrix, one row per recipe
    pub fn features(&self) -> &Array2<f32> {
        &self.features
    }

    pub fn encoder(&self) -> &CategoricalEncoder {
        &self.encoder
    }

    pub fn standardizer(&self) -> &Standardizer {
        &self.standardizer
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Width of each recipe feature row
    pub fn feature_dim(&self) -> usize {
        self.features.ncols()
    }

    /// `false` when running on the degraded placeholder
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

/// Header positions resolved once per file
struct ColumnIndex {
    recipe_name: usize,
    meal_type: usize,
    cuisine: Option<usize>,
    food_type: Option<usize>,
    ingredients: Option<usize>,
    instructions: Option<usize>,
    preparation: Option<usize>,
    nutrients: [Option<usize>; Nutrient::COUNT],
    flags: Vec<(String, usize)>,
}

impl ColumnIndex {
    fn new(headers: &csv::StringRecord) -> Result<Self, DatasetError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let mut nutrients = [None; Nutrient::COUNT];
        for nutrient in Nutrient::ALL {
            nutrients[nutrient.index()] = find(nutrient.column());
        }

        let flags = headers
            .iter()
            .enumerate()
            .map(|(idx, h)| (h.trim().to_lowercase(), idx))
            .filter(|(h, _)| FLAG_PREFIXES.iter().any(|p| h.starts_with(p)))
            .collect();

        Ok(Self {
            recipe_name: find("recipe_name").ok_or(DatasetError::MissingColumn("recipe_name"))?,
            meal_type: find("meal_type").ok_or(DatasetError::MissingColumn("meal_type"))?,
            cuisine: find("cuisine"),
            food_type: find("food_type"),
            ingredients: find("ingredients"),
            instructions: find("instructions"),
            preparation: find("preparation"),
            nutrients,
            flags,
        })
    }

    /// Build a recipe, or `None` when the name or meal type is blank
    fn parse_row(&self, record: &csv::StringRecord) -> Option<Recipe> {
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).map(str::trim).unwrap_or("");
        let category = |idx: Option<usize>| {
            let value = cell(idx);
            let value = if value.is_empty() { UNKNOWN_CATEGORY } else { value };
            value.to_string()
        };

        let name = cell(Some(self.recipe_name));
        let meal_type = cell(Some(self.meal_type));
        if name.is_empty() || meal_type.is_empty() {
            return None;
        }

        let mut nutrients = [0.0; Nutrient::COUNT];
        for (value, idx) in nutrients.iter_mut().zip(self.nutrients) {
            *value = parse_numeric(cell(idx));
        }

        let flags = self
            .flags
            .iter()
            .map(|(name, idx)| (name.clone(), parse_flag(cell(Some(*idx)))))
            .collect();

        let cuisine = category(self.cuisine);
        let food_type = category(self.food_type);

        Some(Recipe {
            name: name.to_string(),
            meal_type: meal_type.to_string(),
            slot: meal_type.parse().ok(),
            cuisine_key: cuisine.to_lowercase(),
            food_type_key: food_type.to_lowercase(),
            cuisine,
            food_type,
            ingredients: cell(self.ingredients).to_string(),
            instructions: cell(self.instructions).to_string(),
            preparation: cell(self.preparation).to_string(),
            nutrients,
            flags,
        })
    }
}

fn parse_numeric(cell: &str) -> f64 {
    cell.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn parse_flag(cell: &str) -> bool {
    matches!(
        cell.to_lowercase().as_str(),
        "true" | "1" | "1.0" | "yes" | "y" | "t"
    )
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::RecipeTable;
    use std::fmt::Write;

    pub const CUISINES: [&str; 3] = ["Indian", "Italian", "Mexican"];
    pub const FOOD_TYPES: [&str; 3] = ["veg", "non-veg", "vegan"];

    /// Nine recipes per meal slot across three cuisines and three food types
    pub fn sample_csv() -> String {
        let mut csv = String::from(
            "recipe_name,meal_type,cuisine,food_type,ingredients,instructions,preparation,\
             calories,protein_g,carbs_g,fat_g,fiber_g,iron_mg,suitable_for_diabetes\n",
        );
        for meal in ["Breakfast", "Lunch", "Dinner"] {
            for i in 0..9 {
                writeln!(
                    csv,
                    "{meal} Dish {i},{meal},{},{},item a; item b,Cook it,10 min,{},{},{},{},{},{},{}",
                    CUISINES[i % 3],
                    FOOD_TYPES[(i / 3) % 3],
                    250 + i * 40,
                    5 + i * 3,
                    60 - i * 5,
                    8 + i,
                    2 + i % 4,
                    1.0 + i as f64 * 0.5,
                    i % 2 == 0,
                )
                .unwrap();
            }
        }
        csv
    }

    pub fn sample_table() -> RecipeTable {
        RecipeTable::from_reader(sample_csv().as_bytes()).unwrap()
    }
}
