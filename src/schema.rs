diesel::table! {
    categories (recipe_id, category) {
        recipe_id -> Int4,
        category -> Varchar,
    }
}

diesel::table! {
    images (id) {
        id -> Int4,
        recipe_id -> Nullable<Int4>,
        step_id -> Nullable<Int4>,
        data -> Bytea,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    ingredients (id) {
        id -> Int4,
        recipe_id -> Int4,
        name -> Varchar,
        unit -> Varchar,
        amount -> Float8,
        ingredient_group -> Nullable<Varchar>,
    }
}

diesel::table! {
    recipe_steps (id) {
        id -> Int4,
        recipe_id -> Int4,
        order_index -> Int4,
        instructions -> Text,
    }
}

diesel::table! {
    recipes (id) {
        id -> Int4,
        title -> Varchar,
        description -> Nullable<Text>,
        cooking_time -> Int4,
        cover_image -> Nullable<Int4>,
        portions -> Int4,
        user_id -> Nullable<Int4>,
        clicks -> Int4,
    }
}

diesel::table! {
    users (id) {
        id -> Int4,
        #[max_length = 255]
        username -> Varchar,
        password_hash -> Varchar,
        is_admin -> Bool,
        disabled -> Bool,
    }
}

diesel::joinable!(categories -> recipes (recipe_id));
diesel::joinable!(ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_steps -> recipes (recipe_id));
diesel::joinable!(recipes -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    categories,
    images,
    ingredients,
    recipe_steps,
    recipes,
    users,
);
