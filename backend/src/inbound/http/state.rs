//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountsCommand, LoginService, MediaStore, RecipeRelationRepository, RecipeRelationsCommand,
    RecipeRepository, RecipesCommand, RecipesQuery, ReferenceDataRepository, ShoppingListQuery,
    SubscriptionRepository, SubscriptionsCommand, SubscriptionsQuery, UserRepository, UsersQuery,
};
use crate::domain::{
    AccountService, RecipeRelationService, RecipeService, RecipeServicePorts, ShoppingListService,
    SubscriptionService,
};
use crate::inbound::http::links::PublicLinks;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountsCommand>,
    pub users: Arc<dyn UsersQuery>,
    pub subscriptions: Arc<dyn SubscriptionsCommand>,
    pub subscriptions_query: Arc<dyn SubscriptionsQuery>,
    pub recipes: Arc<dyn RecipesCommand>,
    pub recipes_query: Arc<dyn RecipesQuery>,
    pub relations: Arc<dyn RecipeRelationsCommand>,
    pub shopping_list: Arc<dyn ShoppingListQuery>,
    pub reference_data: Arc<dyn ReferenceDataRepository>,
}

/// Driven adapters the domain services are assembled from.
pub struct Repositories<U, S, R, L, D, M> {
    pub users: Arc<U>,
    pub subscriptions: Arc<S>,
    pub recipes: Arc<R>,
    pub relations: Arc<L>,
    pub reference_data: Arc<D>,
    pub media: Arc<M>,
}

impl<U, S, R, L, D, M> Repositories<U, S, R, L, D, M>
where
    U: UserRepository + 'static,
    S: SubscriptionRepository + 'static,
    R: RecipeRepository + 'static,
    L: RecipeRelationRepository + 'static,
    D: ReferenceDataRepository + 'static,
    M: MediaStore + 'static,
{
    /// Build every domain service over these adapters.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use foodgram::inbound::http::state::Repositories;
    /// use foodgram::outbound::media::FilesystemMediaStore;
    /// use foodgram::outbound::memory::InMemoryStore;
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let media = FilesystemMediaStore::open("/tmp/foodgram-media").expect("media root");
    /// let ports = Repositories {
    ///     users: store.clone(),
    ///     subscriptions: store.clone(),
    ///     recipes: store.clone(),
    ///     relations: store.clone(),
    ///     reference_data: store,
    ///     media: Arc::new(media),
    /// }
    /// .into_ports();
    /// let _login = ports.login.clone();
    /// ```
    pub fn into_ports(self) -> HttpStatePorts {
        let Self {
            users,
            subscriptions,
            recipes,
            relations,
            reference_data,
            media,
        } = self;

        let accounts = Arc::new(AccountService::new(
            users.clone(),
            subscriptions.clone(),
            media.clone(),
        ));
        let subscription_service = Arc::new(SubscriptionService::new(
            users.clone(),
            subscriptions.clone(),
            recipes.clone(),
        ));
        let recipe_service = Arc::new(RecipeService::new(RecipeServicePorts {
            recipes: recipes.clone(),
            relations: relations.clone(),
            users,
            subscriptions,
            media,
        }));

        HttpStatePorts {
            login: accounts.clone(),
            accounts: accounts.clone(),
            users: accounts,
            subscriptions: subscription_service.clone(),
            subscriptions_query: subscription_service,
            recipes: recipe_service.clone(),
            recipes_query: recipe_service,
            relations: Arc::new(RecipeRelationService::new(recipes.clone(), relations)),
            shopping_list: Arc::new(ShoppingListService::new(recipes)),
            reference_data,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountsCommand>,
    pub users: Arc<dyn UsersQuery>,
    pub subscriptions: Arc<dyn SubscriptionsCommand>,
    pub subscriptions_query: Arc<dyn SubscriptionsQuery>,
    pub recipes: Arc<dyn RecipesCommand>,
    pub recipes_query: Arc<dyn RecipesQuery>,
    pub relations: Arc<dyn RecipeRelationsCommand>,
    pub shopping_list: Arc<dyn ShoppingListQuery>,
    pub reference_data: Arc<dyn ReferenceDataRepository>,
    pub links: PublicLinks,
}

impl HttpState {
    /// Construct state from a ports bundle and link settings.
    pub fn new(ports: HttpStatePorts, links: PublicLinks) -> Self {
        let HttpStatePorts {
            login,
            accounts,
            users,
            subscriptions,
            subscriptions_query,
            recipes,
            recipes_query,
            relations,
            shopping_list,
            reference_data,
        } = ports;
        Self {
            login,
            accounts,
            users,
            subscriptions,
            subscriptions_query,
            recipes,
            recipes_query,
            relations,
            shopping_list,
            reference_data,
            links,
        }
    }
}
