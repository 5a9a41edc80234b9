use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// Unit of measurement for an ingredient amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    G,
    Kg,
    Ml,
    L,
    Pcs,
    Tbsp,
    Tsp,
}

#[derive(Error, Debug)]
#[error("unknown unit: {0}")]
pub struct UnknownUnit(String);

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::G => "g",
            Unit::Kg => "kg",
            Unit::Ml => "ml",
            Unit::L => "l",
            Unit::Pcs => "pcs",
            Unit::Tbsp => "tbsp",
            Unit::Tsp => "tsp",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "g" => Ok(Unit::G),
            "kg" => Ok(Unit::Kg),
            "ml" => Ok(Unit::Ml),
            "l" => Ok(Unit::L),
            "pcs" => Ok(Unit::Pcs),
            "tbsp" => Ok(Unit::Tbsp),
            "tsp" => Ok(Unit::Tsp),
            other => Err(UnknownUnit(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Ingredient {
    pub name: String,
    pub unit: Unit,
    pub amount: f64,
    /// Optional group label used to cluster ingredients in display,
    /// e.g. "For the sauce".
    #[serde(default)]
    pub group: Option<String>,
}

/// A single preparation step. The order index is caller-assigned and is
/// stored as-is, never reassigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecipeStep {
    pub order_id: i32,
    pub step: String,
    /// Image ids attached to this step.
    #[serde(default)]
    pub images: Vec<i32>,
}

/// A recipe payload as supplied by a caller, before an id is assigned.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub portions: i32,
    pub cooking_time: i32,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<RecipeStep>,
    pub categories: Vec<String>,
    /// Non-cover image ids; the referenced images must already exist.
    #[serde(default)]
    pub gallery_images: Vec<i32>,
    #[serde(default)]
    pub cover_image: Option<i32>,
}

/// The full recipe aggregate as served by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Recipe {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub portions: i32,
    pub cooking_time: i32,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<RecipeStep>,
    pub categories: Vec<String>,
    #[serde(default)]
    pub gallery_images: Vec<i32>,
    #[serde(default)]
    pub cover_image: Option<i32>,
    #[serde(default)]
    pub creator_name: Option<String>,
    #[serde(default)]
    pub creator_id: Option<i32>,
    #[serde(default)]
    pub clicks: i32,
}

impl Recipe {
    /// Build the aggregate for a draft that was just persisted.
    pub fn from_draft(id: i32, draft: RecipeDraft, creator_id: Option<i32>, creator_name: Option<String>) -> Self {
        Recipe {
            id,
            title: draft.title,
            description: draft.description,
            portions: draft.portions,
            cooking_time: draft.cooking_time,
            ingredients: draft.ingredients,
            steps: draft.steps,
            categories: draft.categories,
            gallery_images: draft.gallery_images,
            cover_image: draft.cover_image,
            creator_name,
            creator_id,
            clicks: 0,
        }
    }
}

/// A slimmer recipe shape for listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeListing {
    pub id: i32,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub creator: Option<String>,
    pub categories: Vec<String>,
    #[serde(default)]
    pub cover_image: Option<i32>,
    pub clicks: i32,
    pub cooking_time: i32,
}

/// Sort field for recipe listings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Most clicked first by default.
    #[default]
    Clicks,
    Title,
    Id,
    CookingTime,
}

/// Sort direction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter, sort and pagination options for recipe listings.
#[derive(Debug, Default, Clone)]
pub struct ListQuery {
    pub limit: Option<i64>,
    /// 1-indexed page; only meaningful together with `limit`.
    pub page: Option<i64>,
    /// Case-insensitive substring matched against title or description.
    pub search: Option<String>,
    /// A recipe must carry all of these to match.
    pub categories: Vec<String>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_strings_round_trip() {
        for s in ["g", "kg", "ml", "l", "pcs", "tbsp", "tsp"] {
            let unit: Unit = s.parse().unwrap();
            assert_eq!(unit.as_str(), s);
        }
    }

    #[test]
    fn unit_serde_round_trip() {
        for unit in [Unit::G, Unit::Kg, Unit::Ml, Unit::L, Unit::Pcs, Unit::Tbsp, Unit::Tsp] {
            let json = serde_json::to_string(&unit).unwrap();
            assert_eq!(json, format!("\"{}\"", unit.as_str()));
            let back: Unit = serde_json::from_str(&json).unwrap();
            assert_eq!(back, unit);
        }
    }

    #[test]
    fn unknown_unit_is_rejected() {
        assert!("cup".parse::<Unit>().is_err());
        assert!(serde_json::from_str::<Unit>("\"cup\"").is_err());
    }
}
