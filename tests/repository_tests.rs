use std::sync::Arc;

use chrono::{Duration, Utc};

use galley::error::DbError;
use galley::repo::{Database, MemoryDatabase};
use galley::types::{
    Ingredient, ListQuery, Recipe, RecipeDraft, RecipeStep, SortBy, SortOrder, Unit,
};

fn draft(title: &str) -> RecipeDraft {
    RecipeDraft {
        title: title.to_string(),
        description: Some(format!("{} description", title)),
        portions: 4,
        cooking_time: 30,
        ingredients: vec![
            Ingredient {
                name: "flour".to_string(),
                unit: Unit::G,
                amount: 500.0,
                group: None,
            },
            Ingredient {
                name: "milk".to_string(),
                unit: Unit::Ml,
                amount: 250.0,
                group: Some("batter".to_string()),
            },
        ],
        steps: vec![
            RecipeStep {
                order_id: 1,
                step: "Mix the batter.".to_string(),
                images: Vec::new(),
            },
            RecipeStep {
                order_id: 2,
                step: "Fry until golden.".to_string(),
                images: Vec::new(),
            },
        ],
        categories: vec!["breakfast".to_string(), "sweet".to_string()],
        gallery_images: Vec::new(),
        cover_image: None,
    }
}

#[test]
fn create_then_get_round_trips() {
    let db = MemoryDatabase::new();
    let id = db.create_recipe(&draft("Pancakes"), None).unwrap();

    let recipe = db.get_recipe(id).unwrap();
    assert_eq!(recipe.id, id);
    assert_eq!(recipe.title, "Pancakes");
    assert_eq!(recipe.description.as_deref(), Some("Pancakes description"));
    assert_eq!(recipe.portions, 4);
    assert_eq!(recipe.cooking_time, 30);
    assert_eq!(recipe.ingredients.len(), 2);
    assert_eq!(recipe.ingredients[0].unit, Unit::G);
    assert_eq!(recipe.ingredients[1].group.as_deref(), Some("batter"));
    assert_eq!(recipe.categories, vec!["breakfast", "sweet"]);
    assert_eq!(recipe.steps.len(), 2);
    assert_eq!(recipe.steps[0].order_id, 1);
    assert_eq!(recipe.steps[1].step, "Fry until golden.");
    assert_eq!(recipe.clicks, 0);
    assert_eq!(recipe.creator_name, None);
}

#[test]
fn creator_name_is_resolved() {
    let db = MemoryDatabase::new();
    let user = db.create_user("alice", "hash", false).unwrap();
    let id = db.create_recipe(&draft("Pancakes"), Some(user.id)).unwrap();

    let recipe = db.get_recipe(id).unwrap();
    assert_eq!(recipe.creator_id, Some(user.id));
    assert_eq!(recipe.creator_name.as_deref(), Some("alice"));
}

#[test]
fn concurrent_click_increments_all_land() {
    let db = Arc::new(MemoryDatabase::new());
    let id = db.create_recipe(&draft("Popular"), None).unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let db = db.clone();
        handles.push(std::thread::spawn(move || {
            for _ in 0..25 {
                db.increment_clicks(id).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(db.get_recipe(id).unwrap().clicks, 200);
}

#[test]
fn category_filter_requires_every_category() {
    let db = MemoryDatabase::new();

    let mut both = draft("Both");
    both.categories = vec!["vegan".to_string(), "dinner".to_string()];
    let both_id = db.create_recipe(&both, None).unwrap();

    let mut one = draft("One");
    one.categories = vec!["vegan".to_string()];
    db.create_recipe(&one, None).unwrap();

    let listings = db
        .list_recipes(&ListQuery {
            categories: vec!["vegan".to_string(), "dinner".to_string()],
            ..Default::default()
        })
        .unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].id, both_id);

    // No filter matches everything.
    let all = db.list_recipes(&ListQuery::default()).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn search_is_case_insensitive_over_title_and_description() {
    let db = MemoryDatabase::new();

    let mut title_hit = draft("Spicy CURRY");
    title_hit.description = Some("weeknight dinner".to_string());
    let title_id = db.create_recipe(&title_hit, None).unwrap();

    let mut description_hit = draft("Stew");
    description_hit.description = Some("a mild curry base".to_string());
    let description_id = db.create_recipe(&description_hit, None).unwrap();

    db.create_recipe(&draft("Salad"), None).unwrap();

    let mut ids: Vec<i32> = db
        .list_recipes(&ListQuery {
            search: Some("curry".to_string()),
            ..Default::default()
        })
        .unwrap()
        .into_iter()
        .map(|l| l.id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec![title_id, description_id]);

    // Empty search string matches everything.
    let all = db
        .list_recipes(&ListQuery {
            search: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(all.len(), 3);
}

#[test]
fn pagination_returns_the_requested_window() {
    let db = MemoryDatabase::new();
    let mut ids = Vec::new();
    for i in 0..25 {
        ids.push(db.create_recipe(&draft(&format!("Recipe {:02}", i)), None).unwrap());
    }

    let page = db
        .list_recipes(&ListQuery {
            limit: Some(10),
            page: Some(2),
            sort_by: SortBy::Id,
            sort_order: SortOrder::Asc,
            ..Default::default()
        })
        .unwrap();

    let got: Vec<i32> = page.iter().map(|l| l.id).collect();
    assert_eq!(got, ids[10..20].to_vec());
}

#[test]
fn sort_ties_break_by_id_ascending() {
    let db = MemoryDatabase::new();
    // Same clicks everywhere, so the tie-break decides the whole order.
    let a = db.create_recipe(&draft("A"), None).unwrap();
    let b = db.create_recipe(&draft("B"), None).unwrap();
    let c = db.create_recipe(&draft("C"), None).unwrap();

    let listings = db
        .list_recipes(&ListQuery {
            sort_by: SortBy::Clicks,
            sort_order: SortOrder::Desc,
            ..Default::default()
        })
        .unwrap();
    let got: Vec<i32> = listings.iter().map(|l| l.id).collect();
    assert_eq!(got, vec![a, b, c]);
}

#[test]
fn update_reconciles_the_image_set() {
    let db = MemoryDatabase::new();
    let img1 = db.create_image(b"one").unwrap();
    let img2 = db.create_image(b"two").unwrap();
    let img3 = db.create_image(b"three").unwrap();
    let img4 = db.create_image(b"four").unwrap();

    let mut d = draft("Photogenic");
    d.cover_image = Some(img1);
    d.gallery_images = vec![img2, img3];
    let id = db.create_recipe(&d, None).unwrap();

    let mut update = db.get_recipe(id).unwrap();
    update.cover_image = Some(img4);
    update.gallery_images = vec![img2];
    db.update_recipe(&update).unwrap();

    let recipe = db.get_recipe(id).unwrap();
    assert_eq!(recipe.cover_image, Some(img4));
    assert_eq!(recipe.gallery_images, vec![img2]);

    // Dropped images are gone, kept and attached ones remain.
    assert!(matches!(db.get_image(img1), Err(DbError::NotFound(_))));
    assert!(matches!(db.get_image(img3), Err(DbError::NotFound(_))));
    assert!(db.get_image(img2).is_ok());
    assert!(db.get_image(img4).is_ok());
}

#[test]
fn update_replaces_child_collections() {
    let db = MemoryDatabase::new();
    let id = db.create_recipe(&draft("Original"), None).unwrap();

    let mut update = db.get_recipe(id).unwrap();
    update.title = "Revised".to_string();
    update.categories = vec!["dinner".to_string()];
    update.ingredients = vec![Ingredient {
        name: "rice".to_string(),
        unit: Unit::Kg,
        amount: 1.0,
        group: None,
    }];
    update.steps = vec![RecipeStep {
        order_id: 1,
        step: "Cook the rice.".to_string(),
        images: Vec::new(),
    }];
    db.update_recipe(&update).unwrap();

    let recipe = db.get_recipe(id).unwrap();
    assert_eq!(recipe.title, "Revised");
    assert_eq!(recipe.categories, vec!["dinner"]);
    assert_eq!(recipe.ingredients.len(), 1);
    assert_eq!(recipe.ingredients[0].name, "rice");
    assert_eq!(recipe.steps.len(), 1);
}

#[test]
fn update_of_missing_recipe_fails() {
    let db = MemoryDatabase::new();
    let ghost = Recipe {
        id: 999,
        title: "Ghost".to_string(),
        description: None,
        portions: 1,
        cooking_time: 5,
        ingredients: Vec::new(),
        steps: Vec::new(),
        categories: Vec::new(),
        gallery_images: Vec::new(),
        cover_image: None,
        creator_name: None,
        creator_id: None,
        clicks: 0,
    };
    assert!(matches!(
        db.update_recipe(&ghost),
        Err(DbError::UpdateFailed(_))
    ));
}

#[test]
fn delete_semantics() {
    let db = MemoryDatabase::new();
    assert!(matches!(db.delete_recipe(42), Err(DbError::NotFound(_))));

    let id = db.create_recipe(&draft("Short-lived"), None).unwrap();
    db.delete_recipe(id).unwrap();
    assert!(matches!(db.get_recipe(id), Err(DbError::NotFound(_))));
}

#[test]
fn authorization_truth_table() {
    let db = MemoryDatabase::new();
    let admin = db.create_user("admin", "hash", true).unwrap();
    let owner = db.create_user("owner", "hash", false).unwrap();
    let other = db.create_user("other", "hash", false).unwrap();
    let recipe = db.create_recipe(&draft("Owned"), Some(owner.id)).unwrap();

    assert!(db.is_authorized(admin.id, recipe).unwrap());
    assert!(db.is_authorized(owner.id, recipe).unwrap());
    assert!(!db.is_authorized(other.id, recipe).unwrap());

    // Missing user is an error, not a quiet denial.
    assert!(matches!(
        db.is_authorized(999, recipe),
        Err(DbError::NotFound(_))
    ));

    // Missing recipe denies everyone but admins.
    assert!(!db.is_authorized(owner.id, 999).unwrap());
    assert!(db.is_authorized(admin.id, 999).unwrap());

    // Disabled accounts lose access outright, admin or not.
    db.set_user_disabled(owner.id, true);
    assert!(!db.is_authorized(owner.id, recipe).unwrap());
    db.set_user_disabled(admin.id, true);
    assert!(!db.is_authorized(admin.id, recipe).unwrap());
}

#[test]
fn duplicate_usernames_are_rejected() {
    let db = MemoryDatabase::new();
    db.create_user("alice", "hash", false).unwrap();
    assert!(matches!(
        db.create_user("alice", "other", false),
        Err(DbError::DuplicateUser(_))
    ));
}

#[test]
fn orphan_sweep_honors_the_grace_window() {
    let db = MemoryDatabase::new();

    let fresh_orphan = db.create_image(b"fresh").unwrap();
    let stale_orphan = db.create_image(b"stale").unwrap();
    let attached = db.create_image(b"attached").unwrap();

    let mut d = draft("Keeper");
    d.cover_image = Some(attached);
    db.create_recipe(&d, None).unwrap();

    let stale = Utc::now() - Duration::hours(25);
    db.set_image_created_at(stale_orphan, stale);
    db.set_image_created_at(attached, stale);

    db.delete_unused_images().unwrap();

    assert!(db.get_image(fresh_orphan).is_ok());
    assert!(matches!(
        db.get_image(stale_orphan),
        Err(DbError::NotFound(_))
    ));
    assert!(db.get_image(attached).is_ok());
}

#[test]
fn step_images_follow_their_step() {
    let db = MemoryDatabase::new();
    let step_img = db.create_image(b"step photo").unwrap();

    let mut d = draft("Illustrated");
    d.steps[0].images = vec![step_img];
    let id = db.create_recipe(&d, None).unwrap();

    let recipe = db.get_recipe(id).unwrap();
    assert_eq!(recipe.steps[0].images, vec![step_img]);
    // Step images are not part of the gallery.
    assert!(recipe.gallery_images.is_empty());
}

#[test]
fn category_queries() {
    let db = MemoryDatabase::new();
    let mut a = draft("A");
    a.categories = vec!["soup".to_string()];
    let a_id = db.create_recipe(&a, None).unwrap();

    let mut b = draft("B");
    b.categories = vec!["soup".to_string(), "winter".to_string()];
    let b_id = db.create_recipe(&b, None).unwrap();

    let mut ids = db.recipes_by_category("soup").unwrap();
    ids.sort();
    assert_eq!(ids, vec![a_id, b_id]);
    assert!(db.recipes_by_category("dessert").unwrap().is_empty());

    let categories = db.all_categories().unwrap();
    assert_eq!(categories, vec!["soup".to_string(), "winter".to_string()]);
}
