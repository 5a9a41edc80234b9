use diesel::prelude::*;
use serde::Serialize;

#[derive(Queryable, Selectable, Debug, Clone, Serialize)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub disabled: bool,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub is_admin: bool,
    pub disabled: bool,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecipeRow {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub cooking_time: i32,
    pub cover_image: Option<i32>,
    pub portions: i32,
    pub user_id: Option<i32>,
    pub clicks: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipes)]
pub struct NewRecipeRow<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub cooking_time: i32,
    pub cover_image: Option<i32>,
    pub portions: i32,
    pub user_id: Option<i32>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipe_steps)]
pub struct NewStepRow<'a> {
    pub recipe_id: i32,
    pub order_index: i32,
    pub instructions: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ingredients)]
pub struct NewIngredientRow<'a> {
    pub recipe_id: i32,
    pub name: &'a str,
    pub unit: &'a str,
    pub amount: f64,
    pub ingredient_group: Option<&'a str>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::categories)]
pub struct NewCategoryRow<'a> {
    pub recipe_id: i32,
    pub category: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::images)]
pub struct NewImageRow<'a> {
    pub data: &'a [u8],
}
