//! In-memory repository used by tests. Mirrors the semantics of the
//! PostgreSQL implementation, including storage-level cascade behavior
//! (child rows die with the recipe, image references are nulled out).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::error::DbError;
use crate::models::User;
use crate::types::{
    Ingredient, ListQuery, Recipe, RecipeDraft, RecipeListing, RecipeStep, SortBy, SortOrder,
};

use super::{Database, ORPHAN_GRACE_HOURS};

#[derive(Debug, Clone)]
struct StoredStep {
    id: i32,
    order_id: i32,
    step: String,
}

#[derive(Debug, Clone)]
struct StoredRecipe {
    title: String,
    description: Option<String>,
    cooking_time: i32,
    cover_image: Option<i32>,
    portions: i32,
    user_id: Option<i32>,
    clicks: i32,
    categories: Vec<String>,
    ingredients: Vec<Ingredient>,
    steps: Vec<StoredStep>,
}

#[derive(Debug, Clone)]
struct StoredImage {
    recipe_id: Option<i32>,
    step_id: Option<i32>,
    data: Vec<u8>,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    users: BTreeMap<i32, User>,
    recipes: BTreeMap<i32, StoredRecipe>,
    images: BTreeMap<i32, StoredImage>,
    next_user_id: i32,
    next_recipe_id: i32,
    next_image_id: i32,
    next_step_id: i32,
}

impl Inner {
    fn step_images(&self, step_id: i32) -> Vec<i32> {
        self.images
            .iter()
            .filter(|(_, image)| image.step_id == Some(step_id))
            .map(|(id, _)| *id)
            .collect()
    }

    fn gallery_images(&self, recipe_id: i32, cover: Option<i32>) -> Vec<i32> {
        self.images
            .iter()
            .filter(|(id, image)| {
                image.recipe_id == Some(recipe_id)
                    && image.step_id.is_none()
                    && Some(**id) != cover
            })
            .map(|(id, _)| *id)
            .collect()
    }

    fn insert_children(&mut self, steps: &[RecipeStep]) -> Vec<StoredStep> {
        let mut stored = Vec::with_capacity(steps.len());
        for step in steps {
            self.next_step_id += 1;
            let step_id = self.next_step_id;
            for image_id in &step.images {
                if let Some(image) = self.images.get_mut(image_id) {
                    image.step_id = Some(step_id);
                }
            }
            stored.push(StoredStep {
                id: step_id,
                order_id: step.order_id,
                step: step.step.clone(),
            });
        }
        // Stored in order index order, matching the read path's ORDER BY.
        stored.sort_by_key(|s| s.order_id);
        stored
    }

    fn attach_image(&mut self, recipe_id: i32, image_id: i32) {
        if let Some(image) = self.images.get_mut(&image_id) {
            image.recipe_id = Some(recipe_id);
        }
    }

    fn reconcile_images(&mut self, recipe_id: i32, gallery: &[i32], cover: Option<i32>) {
        let current: BTreeSet<i32> = self
            .images
            .iter()
            .filter(|(_, image)| image.recipe_id == Some(recipe_id))
            .map(|(id, _)| *id)
            .collect();

        let mut desired: BTreeSet<i32> = gallery.iter().copied().collect();
        if let Some(cover) = cover.filter(|id| *id > 0) {
            desired.insert(cover);
        }

        for image_id in current.difference(&desired) {
            self.remove_image(*image_id);
        }
        for image_id in desired.difference(&current) {
            self.attach_image(recipe_id, *image_id);
        }
    }

    fn remove_image(&mut self, image_id: i32) -> bool {
        if self.images.remove(&image_id).is_none() {
            return false;
        }
        for recipe in self.recipes.values_mut() {
            if recipe.cover_image == Some(image_id) {
                recipe.cover_image = None;
            }
        }
        true
    }
}

pub struct MemoryDatabase {
    inner: Mutex<Inner>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Test hook: rewrite an image's creation timestamp so the orphan
    /// sweep's grace window can be exercised without waiting it out.
    pub fn set_image_created_at(&self, image_id: i32, created_at: DateTime<Utc>) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(image) = inner.images.get_mut(&image_id) {
            image.created_at = created_at;
        }
    }

    /// Test hook: toggle the disabled flag on a user.
    pub fn set_user_disabled(&self, user_id: i32, disabled: bool) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.get_mut(&user_id) {
            user.disabled = disabled;
        }
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl Database for MemoryDatabase {
    fn create_recipe(&self, draft: &RecipeDraft, creator: Option<i32>) -> Result<i32, DbError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_recipe_id += 1;
        let recipe_id = inner.next_recipe_id;

        let steps = inner.insert_children(&draft.steps);
        let cover = draft.cover_image.filter(|id| *id > 0);
        for image_id in &draft.gallery_images {
            inner.attach_image(recipe_id, *image_id);
        }
        if let Some(cover) = cover {
            inner.attach_image(recipe_id, cover);
        }

        inner.recipes.insert(
            recipe_id,
            StoredRecipe {
                title: draft.title.clone(),
                description: draft.description.clone(),
                cooking_time: draft.cooking_time,
                cover_image: cover,
                portions: draft.portions,
                user_id: creator,
                clicks: 0,
                categories: draft.categories.clone(),
                ingredients: draft.ingredients.clone(),
                steps,
            },
        );

        Ok(recipe_id)
    }

    fn get_recipe(&self, recipe_id: i32) -> Result<Recipe, DbError> {
        let inner = self.inner.lock().unwrap();
        let stored = inner
            .recipes
            .get(&recipe_id)
            .ok_or_else(|| DbError::not_found(format!("recipe {recipe_id}")))?;

        let creator_name = stored
            .user_id
            .and_then(|id| inner.users.get(&id))
            .map(|user| user.username.clone());

        let steps = stored
            .steps
            .iter()
            .map(|step| RecipeStep {
                order_id: step.order_id,
                step: step.step.clone(),
                images: inner.step_images(step.id),
            })
            .collect();

        Ok(Recipe {
            id: recipe_id,
            title: stored.title.clone(),
            description: stored.description.clone(),
            portions: stored.portions,
            cooking_time: stored.cooking_time,
            ingredients: stored.ingredients.clone(),
            steps,
            categories: stored.categories.clone(),
            gallery_images: inner.gallery_images(recipe_id, stored.cover_image),
            cover_image: stored.cover_image,
            creator_name,
            creator_id: stored.user_id,
            clicks: stored.clicks,
        })
    }

    fn increment_clicks(&self, recipe_id: i32) -> Result<(), DbError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(recipe) = inner.recipes.get_mut(&recipe_id) {
            recipe.clicks += 1;
        }
        Ok(())
    }

    fn list_recipes(&self, query: &ListQuery) -> Result<Vec<RecipeListing>, DbError> {
        let inner = self.inner.lock().unwrap();

        let search = query
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase());

        let mut rows: Vec<(i32, &StoredRecipe)> = inner
            .recipes
            .iter()
            .filter(|(_, recipe)| {
                if let Some(search) = &search {
                    let in_title = recipe.title.to_lowercase().contains(search);
                    let in_description = recipe
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(search));
                    if !in_title && !in_description {
                        return false;
                    }
                }
                query
                    .categories
                    .iter()
                    .all(|category| recipe.categories.contains(category))
            })
            .map(|(id, recipe)| (*id, recipe))
            .collect();

        rows.sort_by(|(id_a, a), (id_b, b)| {
            let ordering = match query.sort_by {
                SortBy::Clicks => a.clicks.cmp(&b.clicks),
                SortBy::Title => a.title.cmp(&b.title),
                SortBy::Id => id_a.cmp(id_b),
                SortBy::CookingTime => a.cooking_time.cmp(&b.cooking_time),
            };
            let ordering = match query.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            };
            ordering.then(id_a.cmp(id_b))
        });

        let offset = match (query.limit, query.page) {
            (Some(limit), Some(page)) => ((page - 1).max(0) * limit) as usize,
            _ => 0,
        };
        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);

        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(id, recipe)| RecipeListing {
                id,
                title: recipe.title.clone(),
                description: recipe.description.clone().unwrap_or_default(),
                creator: recipe
                    .user_id
                    .and_then(|uid| inner.users.get(&uid))
                    .map(|user| user.username.clone()),
                categories: recipe.categories.clone(),
                cover_image: recipe.cover_image,
                clicks: recipe.clicks,
                cooking_time: recipe.cooking_time,
            })
            .collect())
    }

    fn update_recipe(&self, recipe: &Recipe) -> Result<(), DbError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.recipes.contains_key(&recipe.id) {
            return Err(DbError::UpdateFailed(format!("recipe {}", recipe.id)));
        }

        // Old steps go away wholesale; their image links are nulled the way
        // the schema's ON DELETE SET NULL would.
        let old_step_ids: Vec<i32> = inner.recipes[&recipe.id].steps.iter().map(|s| s.id).collect();
        for image in inner.images.values_mut() {
            if image.step_id.is_some_and(|id| old_step_ids.contains(&id)) {
                image.step_id = None;
            }
        }

        let steps = inner.insert_children(&recipe.steps);
        inner.reconcile_images(recipe.id, &recipe.gallery_images, recipe.cover_image);

        let cover = recipe.cover_image.filter(|id| *id > 0);
        let stored = inner.recipes.get_mut(&recipe.id).expect("checked above");
        stored.title = recipe.title.clone();
        stored.description = recipe.description.clone();
        stored.cooking_time = recipe.cooking_time;
        stored.cover_image = cover;
        stored.portions = recipe.portions;
        stored.categories = recipe.categories.clone();
        stored.ingredients = recipe.ingredients.clone();
        stored.steps = steps;

        Ok(())
    }

    fn delete_recipe(&self, recipe_id: i32) -> Result<(), DbError> {
        let mut inner = self.inner.lock().unwrap();
        let stored = inner
            .recipes
            .remove(&recipe_id)
            .ok_or_else(|| DbError::not_found(format!("recipe {recipe_id}")))?;

        let step_ids: Vec<i32> = stored.steps.iter().map(|s| s.id).collect();
        for image in inner.images.values_mut() {
            if image.recipe_id == Some(recipe_id) {
                image.recipe_id = None;
            }
            if image.step_id.is_some_and(|id| step_ids.contains(&id)) {
                image.step_id = None;
            }
        }
        Ok(())
    }

    fn is_authorized(&self, user_id: i32, recipe_id: i32) -> Result<bool, DbError> {
        let inner = self.inner.lock().unwrap();
        let user = inner
            .users
            .get(&user_id)
            .ok_or_else(|| DbError::not_found(format!("user {user_id}")))?;
        if user.disabled {
            return Ok(false);
        }
        if user.is_admin {
            return Ok(true);
        }
        Ok(inner
            .recipes
            .get(&recipe_id)
            .is_some_and(|recipe| recipe.user_id == Some(user_id)))
    }

    fn create_image(&self, data: &[u8]) -> Result<i32, DbError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_image_id += 1;
        let image_id = inner.next_image_id;
        inner.images.insert(
            image_id,
            StoredImage {
                recipe_id: None,
                step_id: None,
                data: data.to_vec(),
                created_at: Utc::now(),
            },
        );
        Ok(image_id)
    }

    fn get_image(&self, image_id: i32) -> Result<Vec<u8>, DbError> {
        let inner = self.inner.lock().unwrap();
        inner
            .images
            .get(&image_id)
            .map(|image| image.data.clone())
            .ok_or_else(|| DbError::not_found(format!("image {image_id}")))
    }

    fn delete_image(&self, image_id: i32) -> Result<(), DbError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.remove_image(image_id) {
            return Err(DbError::not_found(format!("image {image_id}")));
        }
        Ok(())
    }

    fn delete_unused_images(&self) -> Result<(), DbError> {
        let mut inner = self.inner.lock().unwrap();
        let cutoff = Utc::now() - chrono::Duration::hours(ORPHAN_GRACE_HOURS);
        let orphaned: Vec<i32> = inner
            .images
            .iter()
            .filter(|(_, image)| {
                image.recipe_id.is_none() && image.step_id.is_none() && image.created_at < cutoff
            })
            .map(|(id, _)| *id)
            .collect();
        for image_id in orphaned {
            inner.remove_image(image_id);
        }
        Ok(())
    }

    fn recipes_by_category(&self, category: &str) -> Result<Vec<i32>, DbError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .recipes
            .iter()
            .filter(|(_, recipe)| recipe.categories.iter().any(|c| c == category))
            .map(|(id, _)| *id)
            .collect())
    }

    fn all_categories(&self) -> Result<Vec<String>, DbError> {
        let inner = self.inner.lock().unwrap();
        let names: BTreeSet<String> = inner
            .recipes
            .values()
            .flat_map(|recipe| recipe.categories.iter().cloned())
            .collect();
        Ok(names.into_iter().collect())
    }

    fn get_user_by_username(&self, username: &str) -> Result<User, DbError> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .values()
            .find(|user| user.username == username)
            .cloned()
            .ok_or_else(|| DbError::not_found(format!("user {username}")))
    }

    fn get_user_by_id(&self, user_id: i32) -> Result<User, DbError> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| DbError::not_found(format!("user {user_id}")))
    }

    fn create_user(&self, username: &str, password_hash: &str, is_admin: bool) -> Result<User, DbError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.values().any(|user| user.username == username) {
            return Err(DbError::DuplicateUser(username.to_string()));
        }
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_admin,
            disabled: false,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }
}
