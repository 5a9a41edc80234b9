//! Production repository backed by PostgreSQL.
//!
//! Each operation checks a connection out of the pool for its own scope, so
//! the connection is returned on every path including errors. Multi-statement
//! writes (create, update) run inside a single transaction; the original
//! system applied them statement by statement, which could leave a recipe
//! with half its children on failure and let concurrent readers observe an
//! empty child collection mid-update.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::Utc;
use diesel::dsl::count_star;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::error::DbError;
use crate::models::{
    NewCategoryRow, NewImageRow, NewIngredientRow, NewRecipeRow, NewStepRow, NewUser, RecipeRow,
    User,
};
use crate::schema::{categories, images, ingredients, recipe_steps, recipes, users};
use crate::types::{
    Ingredient, ListQuery, Recipe, RecipeDraft, RecipeListing, RecipeStep, SortBy, SortOrder, Unit,
};

use super::{Database, ORPHAN_GRACE_HOURS};

pub struct PgDatabase {
    pool: DbPool,
}

impl PgDatabase {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Treat non-positive image ids as "no cover"; clients send 0 or -1 for
/// drafts that never had one.
fn normalize_cover(cover: Option<i32>) -> Option<i32> {
    cover.filter(|id| *id > 0)
}

fn escape_like(pattern: &str) -> String {
    pattern.replace('%', "\\%").replace('_', "\\_")
}

/// Insert categories, ingredients and steps for a recipe, re-pointing each
/// step's images at the generated step id.
fn insert_children(
    conn: &mut PgConnection,
    recipe_id: i32,
    ingredients_in: &[Ingredient],
    steps: &[RecipeStep],
    category_names: &[String],
) -> QueryResult<()> {
    for category in category_names {
        diesel::insert_into(categories::table)
            .values(&NewCategoryRow {
                recipe_id,
                category,
            })
            .execute(conn)?;
    }

    for ingredient in ingredients_in {
        diesel::insert_into(ingredients::table)
            .values(&NewIngredientRow {
                recipe_id,
                name: &ingredient.name,
                unit: ingredient.unit.as_str(),
                amount: ingredient.amount,
                ingredient_group: ingredient.group.as_deref(),
            })
            .execute(conn)?;
    }

    for step in steps {
        let step_id: i32 = diesel::insert_into(recipe_steps::table)
            .values(&NewStepRow {
                recipe_id,
                order_index: step.order_id,
                instructions: &step.step,
            })
            .returning(recipe_steps::id)
            .get_result(conn)?;

        for image_id in &step.images {
            diesel::update(images::table.find(image_id))
                .set(images::step_id.eq(step_id))
                .execute(conn)?;
        }
    }

    Ok(())
}

/// Reconcile the stored image set against the desired one (gallery plus
/// cover). Images no longer wanted are deleted outright, newly wanted ones
/// are re-pointed at the recipe, unchanged ones are left alone.
fn reconcile_images(
    conn: &mut PgConnection,
    recipe_id: i32,
    gallery: &[i32],
    cover: Option<i32>,
) -> QueryResult<()> {
    let current: BTreeSet<i32> = images::table
        .filter(images::recipe_id.eq(recipe_id))
        .select(images::id)
        .load::<i32>(conn)?
        .into_iter()
        .collect();

    let mut desired: BTreeSet<i32> = gallery.iter().copied().collect();
    if let Some(cover) = normalize_cover(cover) {
        desired.insert(cover);
    }

    for image_id in current.difference(&desired) {
        diesel::delete(images::table.find(image_id)).execute(conn)?;
    }

    for image_id in desired.difference(&current) {
        diesel::update(images::table.find(image_id))
            .set(images::recipe_id.eq(recipe_id))
            .execute(conn)?;
    }

    Ok(())
}

fn categories_for(conn: &mut PgConnection, recipe_id: i32) -> QueryResult<Vec<String>> {
    categories::table
        .filter(categories::recipe_id.eq(recipe_id))
        .select(categories::category)
        .order(categories::category.asc())
        .load(conn)
}

fn ingredients_for(conn: &mut PgConnection, recipe_id: i32) -> Result<Vec<Ingredient>, DbError> {
    let rows: Vec<(String, String, f64, Option<String>)> = ingredients::table
        .filter(ingredients::recipe_id.eq(recipe_id))
        .select((
            ingredients::name,
            ingredients::unit,
            ingredients::amount,
            ingredients::ingredient_group,
        ))
        .order(ingredients::id.asc())
        .load(conn)?;

    rows.into_iter()
        .map(|(name, unit, amount, group)| {
            let unit = Unit::from_str(&unit).map_err(|e| DbError::Validation(e.to_string()))?;
            Ok(Ingredient {
                name,
                unit,
                amount,
                group,
            })
        })
        .collect()
}

fn steps_for(conn: &mut PgConnection, recipe_id: i32) -> QueryResult<Vec<RecipeStep>> {
    let rows: Vec<(i32, i32, String)> = recipe_steps::table
        .filter(recipe_steps::recipe_id.eq(recipe_id))
        .select((
            recipe_steps::id,
            recipe_steps::order_index,
            recipe_steps::instructions,
        ))
        .order(recipe_steps::order_index.asc())
        .load(conn)?;

    let mut steps = Vec::with_capacity(rows.len());
    for (step_id, order_id, step) in rows {
        let step_images: Vec<i32> = images::table
            .filter(images::step_id.eq(step_id))
            .select(images::id)
            .order(images::id.asc())
            .load(conn)?;
        steps.push(RecipeStep {
            order_id,
            step,
            images: step_images,
        });
    }
    Ok(steps)
}

/// Gallery images: everything pointing at the recipe that is neither a step
/// image nor the designated cover.
fn gallery_images_for(
    conn: &mut PgConnection,
    recipe_id: i32,
    cover: Option<i32>,
) -> QueryResult<Vec<i32>> {
    let mut query = images::table
        .filter(images::recipe_id.eq(recipe_id))
        .filter(images::step_id.is_null())
        .into_boxed();
    if let Some(cover) = cover {
        query = query.filter(images::id.ne(cover));
    }
    query.select(images::id).order(images::id.asc()).load(conn)
}

fn user_by_id(conn: &mut PgConnection, user_id: i32) -> Result<User, DbError> {
    users::table
        .find(user_id)
        .select(User::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| DbError::not_found(format!("user {user_id}")))
}

impl Database for PgDatabase {
    fn create_recipe(&self, draft: &RecipeDraft, creator: Option<i32>) -> Result<i32, DbError> {
        let mut conn = self.pool.get()?;

        let recipe_id = conn.transaction::<i32, DbError, _>(|conn| {
            let recipe_id: i32 = diesel::insert_into(recipes::table)
                .values(&NewRecipeRow {
                    title: &draft.title,
                    description: draft.description.as_deref(),
                    cooking_time: draft.cooking_time,
                    cover_image: normalize_cover(draft.cover_image),
                    portions: draft.portions,
                    user_id: creator,
                })
                .returning(recipes::id)
                .get_result(conn)?;

            insert_children(conn, recipe_id, &draft.ingredients, &draft.steps, &draft.categories)?;

            for image_id in &draft.gallery_images {
                diesel::update(images::table.find(image_id))
                    .set(images::recipe_id.eq(recipe_id))
                    .execute(conn)?;
            }
            if let Some(cover) = normalize_cover(draft.cover_image) {
                diesel::update(images::table.find(cover))
                    .set(images::recipe_id.eq(recipe_id))
                    .execute(conn)?;
            }

            Ok(recipe_id)
        })?;

        Ok(recipe_id)
    }

    fn get_recipe(&self, recipe_id: i32) -> Result<Recipe, DbError> {
        let mut conn = self.pool.get()?;

        let (row, creator_name) = recipes::table
            .left_join(users::table)
            .filter(recipes::id.eq(recipe_id))
            .select((RecipeRow::as_select(), users::username.nullable()))
            .first::<(RecipeRow, Option<String>)>(&mut conn)
            .optional()?
            .ok_or_else(|| DbError::not_found(format!("recipe {recipe_id}")))?;

        let recipe_categories = categories_for(&mut conn, recipe_id)?;
        let recipe_ingredients = ingredients_for(&mut conn, recipe_id)?;
        let recipe_steps = steps_for(&mut conn, recipe_id)?;
        let gallery = gallery_images_for(&mut conn, recipe_id, row.cover_image)?;

        Ok(Recipe {
            id: row.id,
            title: row.title,
            description: row.description,
            portions: row.portions,
            cooking_time: row.cooking_time,
            ingredients: recipe_ingredients,
            steps: recipe_steps,
            categories: recipe_categories,
            gallery_images: gallery,
            cover_image: row.cover_image,
            creator_name,
            creator_id: row.user_id,
            clicks: row.clicks,
        })
    }

    fn increment_clicks(&self, recipe_id: i32) -> Result<(), DbError> {
        let mut conn = self.pool.get()?;
        diesel::update(recipes::table.find(recipe_id))
            .set(recipes::clicks.eq(recipes::clicks + 1))
            .execute(&mut conn)?;
        Ok(())
    }

    fn list_recipes(&self, query: &ListQuery) -> Result<Vec<RecipeListing>, DbError> {
        let mut conn = self.pool.get()?;

        let mut sql = recipes::table.into_boxed();

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(search));
            sql = sql.filter(
                recipes::title
                    .ilike(pattern.clone())
                    .nullable()
                    .or(recipes::description.ilike(pattern)),
            );
        }

        // Intersection semantics: a recipe matches only when it carries
        // every requested category, via group + count-equals-cardinality.
        if !query.categories.is_empty() {
            let matching: Vec<i32> = categories::table
                .filter(categories::category.eq_any(&query.categories))
                .group_by(categories::recipe_id)
                .having(count_star().eq(query.categories.len() as i64))
                .select(categories::recipe_id)
                .load(&mut conn)?;
            sql = sql.filter(recipes::id.eq_any(matching));
        }

        // Explicit id tie-break so equal sort keys produce a stable order.
        sql = match (query.sort_by, query.sort_order) {
            (SortBy::Clicks, SortOrder::Desc) => sql.order(recipes::clicks.desc()),
            (SortBy::Clicks, SortOrder::Asc) => sql.order(recipes::clicks.asc()),
            (SortBy::Title, SortOrder::Desc) => sql.order(recipes::title.desc()),
            (SortBy::Title, SortOrder::Asc) => sql.order(recipes::title.asc()),
            (SortBy::Id, SortOrder::Desc) => sql.order(recipes::id.desc()),
            (SortBy::Id, SortOrder::Asc) => sql.order(recipes::id.asc()),
            (SortBy::CookingTime, SortOrder::Desc) => sql.order(recipes::cooking_time.desc()),
            (SortBy::CookingTime, SortOrder::Asc) => sql.order(recipes::cooking_time.asc()),
        };
        sql = sql.then_order_by(recipes::id.asc());

        if let Some(limit) = query.limit {
            sql = sql.limit(limit);
            if let Some(page) = query.page {
                sql = sql.offset((page - 1).max(0) * limit);
            }
        }

        let rows: Vec<RecipeRow> = sql.select(RecipeRow::as_select()).load(&mut conn)?;

        let mut listings = Vec::with_capacity(rows.len());
        for row in rows {
            let row_categories = categories_for(&mut conn, row.id)?;

            // Best-effort enrichment: a listing row that references a
            // missing creator is dropped, not a failure of the whole list.
            let creator = match row.user_id {
                Some(user_id) => match user_by_id(&mut conn, user_id) {
                    Ok(user) => Some(user.username),
                    Err(e) => {
                        tracing::warn!(recipe_id = row.id, error = %e, "skipping listing row");
                        continue;
                    }
                },
                None => None,
            };

            listings.push(RecipeListing {
                id: row.id,
                title: row.title,
                description: row.description.unwrap_or_default(),
                creator,
                categories: row_categories,
                cover_image: row.cover_image,
                clicks: row.clicks,
                cooking_time: row.cooking_time,
            });
        }

        Ok(listings)
    }

    fn update_recipe(&self, recipe: &Recipe) -> Result<(), DbError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<(), DbError, _>(|conn| {
            let affected = diesel::update(recipes::table.find(recipe.id))
                .set((
                    recipes::title.eq(&recipe.title),
                    recipes::description.eq(recipe.description.as_deref()),
                    recipes::cooking_time.eq(recipe.cooking_time),
                    recipes::cover_image.eq(normalize_cover(recipe.cover_image)),
                    recipes::portions.eq(recipe.portions),
                ))
                .execute(conn)?;
            if affected == 0 {
                return Err(DbError::UpdateFailed(format!("recipe {}", recipe.id)));
            }

            // Full replace of the child collections; step images are
            // re-associated from the incoming step lists.
            diesel::delete(categories::table.filter(categories::recipe_id.eq(recipe.id)))
                .execute(conn)?;
            diesel::delete(ingredients::table.filter(ingredients::recipe_id.eq(recipe.id)))
                .execute(conn)?;
            diesel::delete(recipe_steps::table.filter(recipe_steps::recipe_id.eq(recipe.id)))
                .execute(conn)?;

            insert_children(conn, recipe.id, &recipe.ingredients, &recipe.steps, &recipe.categories)?;
            reconcile_images(conn, recipe.id, &recipe.gallery_images, recipe.cover_image)?;

            Ok(())
        })
    }

    fn delete_recipe(&self, recipe_id: i32) -> Result<(), DbError> {
        let mut conn = self.pool.get()?;
        let affected = diesel::delete(recipes::table.find(recipe_id)).execute(&mut conn)?;
        if affected == 0 {
            return Err(DbError::not_found(format!("recipe {recipe_id}")));
        }
        Ok(())
    }

    fn is_authorized(&self, user_id: i32, recipe_id: i32) -> Result<bool, DbError> {
        let mut conn = self.pool.get()?;

        let user = user_by_id(&mut conn, user_id)?;
        if user.disabled {
            return Ok(false);
        }
        if user.is_admin {
            return Ok(true);
        }

        let creator: Option<Option<i32>> = recipes::table
            .find(recipe_id)
            .select(recipes::user_id)
            .first(&mut conn)
            .optional()?;
        Ok(creator.flatten() == Some(user_id))
    }

    fn create_image(&self, data: &[u8]) -> Result<i32, DbError> {
        let mut conn = self.pool.get()?;
        let image_id = diesel::insert_into(images::table)
            .values(&NewImageRow { data })
            .returning(images::id)
            .get_result(&mut conn)?;
        Ok(image_id)
    }

    fn get_image(&self, image_id: i32) -> Result<Vec<u8>, DbError> {
        let mut conn = self.pool.get()?;
        images::table
            .find(image_id)
            .select(images::data)
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| DbError::not_found(format!("image {image_id}")))
    }

    fn delete_image(&self, image_id: i32) -> Result<(), DbError> {
        let mut conn = self.pool.get()?;
        let affected = diesel::delete(images::table.find(image_id)).execute(&mut conn)?;
        if affected == 0 {
            return Err(DbError::not_found(format!("image {image_id}")));
        }
        Ok(())
    }

    fn delete_unused_images(&self) -> Result<(), DbError> {
        let mut conn = self.pool.get()?;
        let cutoff = Utc::now() - chrono::Duration::hours(ORPHAN_GRACE_HOURS);
        diesel::delete(
            images::table
                .filter(images::recipe_id.is_null())
                .filter(images::step_id.is_null())
                .filter(images::created_at.lt(cutoff)),
        )
        .execute(&mut conn)?;
        Ok(())
    }

    fn recipes_by_category(&self, category: &str) -> Result<Vec<i32>, DbError> {
        let mut conn = self.pool.get()?;
        let ids = categories::table
            .filter(categories::category.eq(category))
            .select(categories::recipe_id)
            .order(categories::recipe_id.asc())
            .load(&mut conn)?;
        Ok(ids)
    }

    fn all_categories(&self) -> Result<Vec<String>, DbError> {
        let mut conn = self.pool.get()?;
        let names = categories::table
            .select(categories::category)
            .distinct()
            .order(categories::category.asc())
            .load(&mut conn)?;
        Ok(names)
    }

    fn get_user_by_username(&self, username: &str) -> Result<User, DbError> {
        let mut conn = self.pool.get()?;
        users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| DbError::not_found(format!("user {username}")))
    }

    fn get_user_by_id(&self, user_id: i32) -> Result<User, DbError> {
        let mut conn = self.pool.get()?;
        user_by_id(&mut conn, user_id)
    }

    fn create_user(&self, username: &str, password_hash: &str, is_admin: bool) -> Result<User, DbError> {
        let mut conn = self.pool.get()?;
        let result = diesel::insert_into(users::table)
            .values(&NewUser {
                username,
                password_hash,
                is_admin,
                disabled: false,
            })
            .returning(User::as_select())
            .get_result(&mut conn);

        match result {
            Ok(user) => Ok(user),
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            )) => Err(DbError::DuplicateUser(username.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
