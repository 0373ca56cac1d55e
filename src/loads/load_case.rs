//! Load cases and their semantic categories

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic category of a load case (TCVN 2737 load types)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LoadCategory {
    Dead,
    Live,
    RoofLive,
    Wind,
    Seismic,
    Crane,
}

impl LoadCategory {
    pub const ALL: [LoadCategory; 6] = [
        LoadCategory::Dead,
        LoadCategory::Live,
        LoadCategory::RoofLive,
        LoadCategory::Wind,
        LoadCategory::Seismic,
        LoadCategory::Crane,
    ];

    /// Symbol used in combination formulas
    pub fn symbol(&self) -> &'static str {
        match self {
            LoadCategory::Dead => "D",
            LoadCategory::Live => "L",
            LoadCategory::RoofLive => "Lr",
            LoadCategory::Wind => "W",
            LoadCategory::Seismic => "E",
            LoadCategory::Crane => "C",
        }
    }

    /// Lateral categories may carry signed factors
    pub fn is_lateral(&self) -> bool {
        matches!(self, LoadCategory::Wind | LoadCategory::Seismic)
    }

    /// Default case name for a category
    pub fn default_case_name(&self) -> &'static str {
        match self {
            LoadCategory::Dead => "Dead",
            LoadCategory::Live => "Live",
            LoadCategory::RoofLive => "RoofLive",
            LoadCategory::Wind => "Wind",
            LoadCategory::Seismic => "Seismic",
            LoadCategory::Crane => "Crane",
        }
    }
}

/// A load case groups related loads under a common name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCase {
    /// Name of the load case; member and node loads refer to it
    pub name: String,
    pub category: LoadCategory,
    /// Description of the load case
    pub description: Option<String>,
}

impl LoadCase {
    /// Create a new load case
    pub fn new(name: &str, category: LoadCategory) -> Self {
        Self {
            name: name.to_string(),
            category,
            description: None,
        }
    }

    /// Load case named after its category
    pub fn of(category: LoadCategory) -> Self {
        Self::new(category.default_case_name(), category)
    }

    /// Set a description
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn dead() -> Self {
        Self::of(LoadCategory::Dead).with_description("Self-weight and permanent finishes")
    }

    pub fn live() -> Self {
        Self::of(LoadCategory::Live).with_description("Occupancy loads")
    }

    pub fn wind() -> Self {
        Self::of(LoadCategory::Wind).with_description("Wind loads")
    }
}

/// The load cases present in a model, at most one per category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadCaseSet {
    cases: BTreeMap<LoadCategory, LoadCase>,
}

impl LoadCaseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a case, replacing any case of the same category
    pub fn insert(&mut self, case: LoadCase) {
        self.cases.insert(case.category, case);
    }

    /// Builder-style insert
    pub fn with(mut self, case: LoadCase) -> Self {
        self.insert(case);
        self
    }

    pub fn get(&self, category: LoadCategory) -> Option<&LoadCase> {
        self.cases.get(&category)
    }

    pub fn contains(&self, category: LoadCategory) -> bool {
        self.cases.contains_key(&category)
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadCase> {
        self.cases.values()
    }
}

impl FromIterator<LoadCase> for LoadCaseSet {
    fn from_iter<I: IntoIterator<Item = LoadCase>>(iter: I) -> Self {
        let mut set = LoadCaseSet::new();
        for case in iter {
            set.insert(case);
        }
        set
    }
}
