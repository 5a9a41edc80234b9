pub mod memory;
pub mod pg;

pub use memory::MemoryDatabase;
pub use pg::PgDatabase;

use crate::error::DbError;
use crate::models::User;
use crate::types::{ListQuery, Recipe, RecipeDraft, RecipeListing};

/// Capability set the rest of the system depends on. `PgDatabase` is the
/// production implementation; `MemoryDatabase` backs the tests.
pub trait Database: Send + Sync {
    /// Persist a draft and return the generated recipe id. Child rows
    /// (categories, ingredients, steps) and image associations are written
    /// in the same transaction as the recipe row.
    fn create_recipe(&self, draft: &RecipeDraft, creator: Option<i32>) -> Result<i32, DbError>;

    /// Assemble the full aggregate. Does not touch the click counter; the
    /// HTTP layer schedules `increment_clicks` separately so a slow or
    /// failed increment never delays the response.
    fn get_recipe(&self, recipe_id: i32) -> Result<Recipe, DbError>;

    fn increment_clicks(&self, recipe_id: i32) -> Result<(), DbError>;

    fn list_recipes(&self, query: &ListQuery) -> Result<Vec<RecipeListing>, DbError>;

    /// Replace the stored aggregate with `recipe`. Fails with
    /// `UpdateFailed` when the scalar update matches zero rows.
    fn update_recipe(&self, recipe: &Recipe) -> Result<(), DbError>;

    fn delete_recipe(&self, recipe_id: i32) -> Result<(), DbError>;

    /// Disabled users are never authorized, admins always are, everyone
    /// else only for their own recipes. A missing user row is an error,
    /// not a `false`.
    fn is_authorized(&self, user_id: i32, recipe_id: i32) -> Result<bool, DbError>;

    fn create_image(&self, data: &[u8]) -> Result<i32, DbError>;

    fn get_image(&self, image_id: i32) -> Result<Vec<u8>, DbError>;

    fn delete_image(&self, image_id: i32) -> Result<(), DbError>;

    /// Orphan sweep: delete images with no recipe or step association
    /// older than the grace window.
    fn delete_unused_images(&self) -> Result<(), DbError>;

    fn recipes_by_category(&self, category: &str) -> Result<Vec<i32>, DbError>;

    fn all_categories(&self) -> Result<Vec<String>, DbError>;

    fn get_user_by_username(&self, username: &str) -> Result<User, DbError>;

    fn get_user_by_id(&self, user_id: i32) -> Result<User, DbError>;

    fn create_user(&self, username: &str, password_hash: &str, is_admin: bool) -> Result<User, DbError>;
}

/// Grace window before an orphaned image becomes eligible for deletion.
pub const ORPHAN_GRACE_HOURS: i64 = 24;
