//! Builders for domain values shared by service tests.

use chrono::{TimeZone, Utc};

use crate::domain::{
    Email, Ingredient, IngredientId, IngredientLine, PersonName, Recipe, RecipeId, Tag, TagId,
    User, UserId, Username,
};

pub(crate) fn user_id(raw: i64) -> UserId {
    UserId::new(raw).expect("fixture user id")
}

pub(crate) fn recipe_id(raw: i64) -> RecipeId {
    RecipeId::new(raw).expect("fixture recipe id")
}

pub(crate) fn user(raw: i64) -> User {
    User {
        id: user_id(raw),
        email: Email::new(format!("cook{raw}@example.org")).expect("fixture email"),
        username: Username::new(format!("cook{raw}")).expect("fixture username"),
        first_name: PersonName::new("Ada", "first_name").expect("fixture name"),
        last_name: PersonName::new("Cook", "last_name").expect("fixture name"),
        avatar: None,
    }
}

pub(crate) fn recipe(raw: i64, author: i64) -> Recipe {
    let tag = Tag::new(TagId::new(1).expect("tag id"), "Dinner", "dinner").expect("fixture tag");
    let sugar = Ingredient::new(IngredientId::new(1).expect("ingredient id"), "sugar", "g")
        .expect("fixture ingredient");
    Recipe {
        id: recipe_id(raw),
        author: user_id(author),
        name: format!("Recipe {raw}"),
        text: "Mix everything.".to_owned(),
        cooking_time: 10,
        image: format!("recipes/images/{raw}.png"),
        pub_date: Utc
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .single()
            .expect("fixture timestamp"),
        tags: vec![tag],
        ingredients: vec![IngredientLine {
            ingredient: sugar,
            amount: 100,
        }],
    }
}
