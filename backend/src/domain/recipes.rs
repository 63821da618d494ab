//! Recipe reads and authoring.
//!
//! Views are assembled per viewer: author profiles carry `is_subscribed`
//! and each recipe carries the viewer's favorite and cart marks.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tracing::{info, warn};

use crate::domain::ports::{
    MediaStore, RecipeRelationKind, RecipeRelationRepository, RecipeRepository, RecipesCommand,
    RecipesQuery, SubscriptionRepository, UserRepository,
};
use crate::domain::repository_errors::{
    map_media_error, map_recipe_error, map_relation_error, map_subscription_error, map_user_error,
};
use crate::domain::{
    Access, Error, ImageUpload, MediaKind, NewRecipe, Recipe, RecipeDraft, RecipeId,
    RecipeListing, RecipeUpdate, RecipeView, User, UserId, UserProfile, authorize,
};

/// Bundle of adapters the recipe service depends on.
pub struct RecipeServicePorts<R, L, U, S, M> {
    pub recipes: Arc<R>,
    /// Favourite and cart flags for the viewer.
    pub relations: Arc<L>,
    /// Author profiles.
    pub users: Arc<U>,
    /// Drives the author's `is_subscribed` flag.
    pub subscriptions: Arc<S>,
    /// Stores uploaded recipe images.
    pub media: Arc<M>,
}

/// Recipe service implementing [`RecipesQuery`] and [`RecipesCommand`].
pub struct RecipeService<R, L, U, S, M> {
    recipes: Arc<R>,
    relations: Arc<L>,
    users: Arc<U>,
    subscriptions: Arc<S>,
    media: Arc<M>,
}

impl<R, L, U, S, M> Clone for RecipeService<R, L, U, S, M> {
    fn clone(&self) -> Self {
        Self {
            recipes: Arc::clone(&self.recipes),
            relations: Arc::clone(&self.relations),
            users: Arc::clone(&self.users),
            subscriptions: Arc::clone(&self.subscriptions),
            media: Arc::clone(&self.media),
        }
    }
}

impl<R, L, U, S, M> RecipeService<R, L, U, S, M> {
    /// Create a new service from its adapters.
    pub fn new(ports: RecipeServicePorts<R, L, U, S, M>) -> Self {
        let RecipeServicePorts {
            recipes,
            relations,
            users,
            subscriptions,
            media,
        } = ports;
        Self {
            recipes,
            relations,
            users,
            subscriptions,
            media,
        }
    }
}

impl<R, L, U, S, M> RecipeService<R, L, U, S, M>
where
    R: RecipeRepository,
    L: RecipeRelationRepository,
    U: UserRepository,
    S: SubscriptionRepository,
    M: MediaStore,
{
    async fn marks(
        &self,
        kind: RecipeRelationKind,
        viewer: Option<UserId>,
        ids: &[RecipeId],
    ) -> Result<HashSet<RecipeId>, Error> {
        match viewer {
            Some(viewer) if !ids.is_empty() => self
                .relations
                .marked_among(kind, viewer, ids)
                .await
                .map_err(map_relation_error),
            _ => Ok(HashSet::new()),
        }
    }

    async fn authors(&self, recipes: &[Recipe]) -> Result<HashMap<UserId, User>, Error> {
        let mut authors = HashMap::new();
        for recipe in recipes {
            if authors.contains_key(&recipe.author) {
                continue;
            }
            let author = self
                .users
                .find_by_id(recipe.author)
                .await
                .map_err(map_user_error)?
                .ok_or_else(|| {
                    Error::internal(format!(
                        "author {} of recipe {} missing",
                        recipe.author, recipe.id
                    ))
                })?;
            authors.insert(recipe.author, author);
        }
        Ok(authors)
    }

    async fn views(
        &self,
        viewer: Option<UserId>,
        recipes: Vec<Recipe>,
    ) -> Result<Vec<RecipeView>, Error> {
        let ids: Vec<RecipeId> = recipes.iter().map(|recipe| recipe.id).collect();
        let favorited = self.marks(RecipeRelationKind::Favorite, viewer, &ids).await?;
        let in_cart = self
            .marks(RecipeRelationKind::ShoppingCart, viewer, &ids)
            .await?;
        let authors = self.authors(&recipes).await?;
        let author_ids: Vec<UserId> = authors.keys().copied().collect();
        let followed = match viewer {
            Some(viewer) if !author_ids.is_empty() => self
                .subscriptions
                .followed_among(viewer, &author_ids)
                .await
                .map_err(map_subscription_error)?,
            _ => HashSet::new(),
        };

        recipes
            .into_iter()
            .map(|recipe| {
                let author = authors
                    .get(&recipe.author)
                    .cloned()
                    .ok_or_else(|| Error::internal("recipe author was not loaded"))?;
                Ok(RecipeView {
                    is_favorited: favorited.contains(&recipe.id),
                    is_in_shopping_cart: in_cart.contains(&recipe.id),
                    author: UserProfile {
                        is_subscribed: followed.contains(&author.id),
                        user: author,
                    },
                    recipe,
                })
            })
            .collect()
    }

    async fn view(&self, viewer: Option<UserId>, recipe: Recipe) -> Result<RecipeView, Error> {
        self.views(viewer, vec![recipe])
            .await?
            .pop()
            .ok_or_else(|| Error::internal("recipe view was not built"))
    }

    async fn find_existing(&self, id: RecipeId) -> Result<Recipe, Error> {
        self.recipes
            .find(id)
            .await
            .map_err(map_recipe_error)?
            .ok_or_else(|| Error::not_found(format!("recipe {id} not found")))
    }

    async fn store_image(&self, image: &ImageUpload) -> Result<String, Error> {
        self.media
            .store(MediaKind::RecipeImage, image)
            .await
            .map_err(map_media_error)
    }

    async fn discard_image(&self, path: &str) {
        if let Err(err) = self.media.remove(path).await {
            warn!(path, error = %err, "failed to remove recipe image");
        }
    }

    async fn authorize_write(
        &self,
        viewer: Option<UserId>,
        id: RecipeId,
    ) -> Result<(UserId, Recipe), Error> {
        let viewer = viewer.ok_or_else(|| Error::unauthorized("login required"))?;
        let recipe = self.find_existing(id).await?;
        authorize(Some(viewer), recipe.author, Access::Write)?;
        Ok((viewer, recipe))
    }
}

#[async_trait]
impl<R, L, U, S, M> RecipesQuery for RecipeService<R, L, U, S, M>
where
    R: RecipeRepository,
    L: RecipeRelationRepository,
    U: UserRepository,
    S: SubscriptionRepository,
    M: MediaStore,
{
    async fn list(
        &self,
        viewer: Option<UserId>,
        listing: RecipeListing,
        page: PageRequest,
    ) -> Result<Page<RecipeView>, Error> {
        let Some(filter) = listing.resolve(viewer) else {
            return Ok(Page::empty());
        };
        let recipes = self
            .recipes
            .list(&filter, page)
            .await
            .map_err(map_recipe_error)?;
        let total = recipes.total();
        let views = self.views(viewer, recipes.into_items()).await?;
        Ok(Page::new(views, total))
    }

    async fn get(&self, viewer: Option<UserId>, id: RecipeId) -> Result<RecipeView, Error> {
        let recipe = self.find_existing(id).await?;
        self.view(viewer, recipe).await
    }

    async fn resolve_short_link(&self, id: RecipeId) -> Result<RecipeId, Error> {
        let exists = self.recipes.exists(id).await.map_err(map_recipe_error)?;
        if exists {
            Ok(id)
        } else {
            Err(Error::not_found(format!("recipe {id} not found")))
        }
    }
}

#[async_trait]
impl<R, L, U, S, M> RecipesCommand for RecipeService<R, L, U, S, M>
where
    R: RecipeRepository,
    L: RecipeRelationRepository,
    U: UserRepository,
    S: SubscriptionRepository,
    M: MediaStore,
{
    async fn create(
        &self,
        author: UserId,
        draft: RecipeDraft,
        image: ImageUpload,
    ) -> Result<RecipeView, Error> {
        let image = self.store_image(&image).await?;
        let new_recipe = NewRecipe {
            author,
            draft,
            image,
        };
        let recipe = match self.recipes.create(&new_recipe).await {
            Ok(recipe) => recipe,
            Err(err) => {
                self.discard_image(&new_recipe.image).await;
                return Err(map_recipe_error(err));
            }
        };
        info!(recipe = %recipe.id, %author, "recipe created");
        self.view(Some(author), recipe).await
    }

    async fn authorize_edit(&self, viewer: Option<UserId>, id: RecipeId) -> Result<(), Error> {
        self.authorize_write(viewer, id).await.map(|_| ())
    }

    async fn update(
        &self,
        viewer: Option<UserId>,
        id: RecipeId,
        draft: RecipeDraft,
        image: Option<ImageUpload>,
    ) -> Result<RecipeView, Error> {
        let (viewer, existing) = self.authorize_write(viewer, id).await?;
        let image = match image {
            Some(upload) => Some(self.store_image(&upload).await?),
            None => None,
        };
        let update = RecipeUpdate {
            draft,
            image: image.clone(),
        };
        let updated = match self.recipes.update(id, &update).await {
            Ok(Some(recipe)) => recipe,
            Ok(None) => {
                if let Some(path) = &image {
                    self.discard_image(path).await;
                }
                return Err(Error::not_found(format!("recipe {id} not found")));
            }
            Err(err) => {
                if let Some(path) = &image {
                    self.discard_image(path).await;
                }
                return Err(map_recipe_error(err));
            }
        };
        if image.as_ref().is_some_and(|path| *path != existing.image) {
            self.discard_image(&existing.image).await;
        }
        info!(recipe = %id, author = %viewer, "recipe updated");
        self.view(Some(viewer), updated).await
    }

    async fn delete(&self, viewer: Option<UserId>, id: RecipeId) -> Result<(), Error> {
        let (viewer, existing) = self.authorize_write(viewer, id).await?;
        let deleted = self.recipes.delete(id).await.map_err(map_recipe_error)?;
        if !deleted {
            return Err(Error::not_found(format!("recipe {id} not found")));
        }
        self.discard_image(&existing.image).await;
        info!(recipe = %id, author = %viewer, "recipe deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "recipes_tests.rs"]
mod tests;
