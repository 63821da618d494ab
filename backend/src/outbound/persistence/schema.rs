//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the embedded migrations under
//! `backend/migrations`. Regenerate with `diesel print-schema` when a
//! migration changes a table.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Int8,
        /// Login identifier, unique.
        email -> Varchar,
        /// Public handle, unique.
        username -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        /// Media path relative to the media root.
        avatar -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Follower edges; `(user_id, author_id)` is unique and never reflexive.
    subscriptions (id) {
        id -> Int8,
        user_id -> Int8,
        author_id -> Int8,
    }
}

diesel::table! {
    tags (id) {
        id -> Int8,
        name -> Varchar,
        slug -> Varchar,
    }
}

diesel::table! {
    /// Ingredient catalogue; `(name, measurement_unit)` is unique.
    ingredients (id) {
        id -> Int8,
        name -> Varchar,
        measurement_unit -> Varchar,
    }
}

diesel::table! {
    recipes (id) {
        id -> Int8,
        author_id -> Int8,
        name -> Varchar,
        text -> Text,
        /// Minutes, 1..=32000.
        cooking_time -> Int4,
        image -> Text,
        pub_date -> Timestamptz,
    }
}

diesel::table! {
    recipe_tags (recipe_id, tag_id) {
        recipe_id -> Int8,
        tag_id -> Int8,
    }
}

diesel::table! {
    recipe_ingredients (id) {
        id -> Int8,
        recipe_id -> Int8,
        ingredient_id -> Int8,
        amount -> Int4,
    }
}

diesel::table! {
    favorites (id) {
        id -> Int8,
        user_id -> Int8,
        recipe_id -> Int8,
    }
}

diesel::table! {
    shopping_cart (id) {
        id -> Int8,
        user_id -> Int8,
        recipe_id -> Int8,
    }
}

diesel::joinable!(recipes -> users (author_id));
diesel::joinable!(recipe_tags -> recipes (recipe_id));
diesel::joinable!(recipe_tags -> tags (tag_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));
diesel::joinable!(favorites -> recipes (recipe_id));
diesel::joinable!(shopping_cart -> recipes (recipe_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    subscriptions,
    tags,
    ingredients,
    recipes,
    recipe_tags,
    recipe_ingredients,
    favorites,
    shopping_cart,
);
