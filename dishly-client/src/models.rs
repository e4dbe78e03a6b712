//! Items served by the cursor endpoints.
//!
//! Field names follow the API's camelCase JSON. Every field the backend may
//! omit or send as `null` has a default, so partially populated payloads
//! still decode.

use dishly_feed::{ItemKey, Keyed};
use serde::{Deserialize, Serialize};

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IngredientQuantity {
    /// Ingredient id.
    pub ingredient_id: Option<i64>,
    /// Display name.
    pub ingredient_name: String,
    /// Free-text amount ("200 g", "a pinch").
    pub quantity: Option<String>,
}

/// A full recipe, as listed by the recipe feeds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recipe {
    /// Recipe id; the cursor of recipe feeds.
    pub id: i64,
    /// Title.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Image URL.
    pub image: Option<String>,
    /// Category.
    pub category: Option<String>,
    /// Author's display name.
    pub author: Option<String>,
    /// Author's user id.
    pub user_id: Option<i64>,
    /// Preparation time, free text.
    pub time: Option<String>,
    /// Ingredient lines.
    pub ingredients: Vec<IngredientQuantity>,
    /// Preparation steps.
    pub steps: Vec<String>,
    /// Whether the recipe is public.
    pub public_recipe: Option<bool>,
}

/// Recipe reference embedded in meal preps and collections.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeSummary {
    /// Recipe id.
    pub id: i64,
    /// Title.
    pub name: String,
    /// Image URL.
    pub image: Option<String>,
}

/// Meal prep reference listed by collection feeds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MealPrepSummary {
    /// Meal prep id.
    pub id: i64,
    /// Title.
    pub name: String,
    /// Image URL.
    pub image: Option<String>,
}

/// A review left on a meal prep.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MealPrepReview {
    /// Review id.
    pub id: Option<i64>,
    /// Review text.
    pub comment: Option<String>,
    /// Stars, 1 to 5.
    pub rating: Option<u8>,
    /// Reviewer's username.
    pub username: Option<String>,
    /// Reviewer's photo URL.
    pub user_photo: Option<String>,
    /// Creation time as sent by the server (ISO-8601).
    pub created_at: Option<String>,
}

/// A full meal prep, as listed by the meal prep feeds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MealPrep {
    /// Meal prep id; the cursor of meal prep feeds.
    pub id: i64,
    /// Title.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Image URL.
    pub image: Option<String>,
    /// Author's display name.
    pub author: Option<String>,
    /// Author's photo URL.
    pub author_photo: Option<String>,
    /// Author's user id.
    pub user_id: Option<i64>,
    /// Whether the meal prep is public.
    pub public_meal_prep: Option<bool>,
    /// Recipes it bundles.
    pub recipes: Vec<RecipeSummary>,
    /// Reviews.
    pub reviews: Vec<MealPrepReview>,
    /// Mean rating, if rated.
    pub average_rating: Option<f64>,
    /// Number of ratings.
    pub rating_count: u32,
    /// Whether it contains an ingredient the viewer marked as undesired.
    pub has_undesired_ingredients: bool,
}

macro_rules! keyed_by_id {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Keyed for $ty {
                fn item_key(&self) -> Option<ItemKey> {
                    Some(ItemKey::Int(self.id))
                }
            }
        )+
    };
}

keyed_by_id!(Recipe, RecipeSummary, MealPrep, MealPrepSummary);

/// One-line label for listings.
pub trait Headline {
    /// `#<id> <name>` plus whatever identifies the item further.
    fn headline(&self) -> String;
}

impl Headline for Recipe {
    fn headline(&self) -> String {
        match &self.author {
            Some(author) => format!("#{} {} (by {author})", self.id, self.name),
            None => format!("#{} {}", self.id, self.name),
        }
    }
}

impl Headline for MealPrep {
    fn headline(&self) -> String {
        let recipes = self.recipes.len();
        match self.average_rating {
            Some(rating) => format!("#{} {} [{recipes} recipes, {rating:.1}*]", self.id, self.name),
            None => format!("#{} {} [{recipes} recipes]", self.id, self.name),
        }
    }
}

impl Headline for RecipeSummary {
    fn headline(&self) -> String {
        format!("#{} {}", self.id, self.name)
    }
}

impl Headline for MealPrepSummary {
    fn headline(&self) -> String {
        format!("#{} {}", self.id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dishly_feed::Page;

    #[test]
    fn test_recipe_page_decodes() {
        let json = r#"{
            "items": [{
                "id": 12,
                "name": "Shakshuka",
                "author": "ana",
                "userId": 3,
                "ingredients": [{"ingredientId": 1, "ingredientName": "egg", "quantity": "4"}],
                "steps": ["fry", "simmer"],
                "publicRecipe": true
            }],
            "nextCursor": "12",
            "hasNext": true
        }"#;
        let page: Page<Recipe> = serde_json::from_str(json).unwrap();
        let recipe = &page.items[0];
        assert_eq!(recipe.id, 12);
        assert_eq!(recipe.user_id, Some(3));
        assert_eq!(recipe.ingredients[0].ingredient_name, "egg");
        assert_eq!(recipe.description, None);
        assert_eq!(recipe.item_key(), Some(ItemKey::Int(12)));
    }

    #[test]
    fn test_meal_prep_tolerates_missing_fields() {
        let prep: MealPrep = serde_json::from_str(r#"{"id": 5, "name": "Week 1"}"#).unwrap();
        assert_eq!(prep.rating_count, 0);
        assert!(prep.recipes.is_empty());
        assert!(!prep.has_undesired_ingredients);
    }

    #[test]
    fn test_headlines() {
        let recipe = Recipe {
            id: 1,
            name: "Soup".into(),
            author: Some("li".into()),
            ..Recipe::default()
        };
        assert_eq!(recipe.headline(), "#1 Soup (by li)");

        let prep = MealPrep {
            id: 2,
            name: "Prep".into(),
            recipes: vec![RecipeSummary::default()],
            average_rating: Some(4.0),
            ..MealPrep::default()
        };
        assert_eq!(prep.headline(), "#2 Prep [1 recipes, 4.0*]");
    }
}
