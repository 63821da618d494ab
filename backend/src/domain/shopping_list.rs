//! Shopping-list aggregation over a user's cart.
//!
//! Quantities are summed per `(name, unit)` across every recipe in the cart,
//! including repeats within one recipe. Lines are ordered by name then unit,
//! so the output does not depend on cart or recipe order.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{RecipeRepository, ShoppingListQuery};
use crate::domain::repository_errors::map_recipe_error;
use crate::domain::{CartLine, Error, UserId};

/// Title written above the ingredient lines.
pub const SHOPPING_LIST_TITLE: &str = "Shopping list";

/// One aggregated line of the shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListLine {
    /// Ingredient name.
    pub name: String,
    /// Unit the total is expressed in.
    pub measurement_unit: String,
    /// Sum of every amount for this name and unit.
    pub total: u64,
}

impl ShoppingListLine {
    /// Render as `<name> (<unit>) — <total>`.
    pub fn render(&self) -> String {
        format!("{} ({}) — {}", self.name, self.measurement_unit, self.total)
    }
}

/// Aggregated shopping list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingList {
    lines: Vec<ShoppingListLine>,
}

impl ShoppingList {
    /// Group cart lines by `(name, unit)` and sum their amounts.
    ///
    /// # Examples
    /// ```
    /// use foodgram::domain::{CartLine, ShoppingList};
    ///
    /// let list = ShoppingList::aggregate(vec![
    ///     CartLine { name: "flour".into(), measurement_unit: "g".into(), amount: 300 },
    ///     CartLine { name: "flour".into(), measurement_unit: "g".into(), amount: 200 },
    /// ]);
    /// assert_eq!(list.lines()[0].render(), "flour (g) — 500");
    /// ```
    pub fn aggregate(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut totals: BTreeMap<(String, String), u64> = BTreeMap::new();
        for line in lines {
            *totals
                .entry((line.name, line.measurement_unit))
                .or_default() += u64::from(line.amount);
        }
        let lines = totals
            .into_iter()
            .map(|((name, measurement_unit), total)| ShoppingListLine {
                name,
                measurement_unit,
                total,
            })
            .collect();
        Self { lines }
    }

    /// Aggregated lines, ordered by name then unit.
    pub fn lines(&self) -> &[ShoppingListLine] {
        &self.lines
    }

    /// True when the cart held no ingredients.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Plain-text document: a title line followed by one line per ingredient.
    pub fn render(&self) -> String {
        let mut out = format!("{SHOPPING_LIST_TITLE}\n");
        for line in &self.lines {
            out.push_str(&line.render());
            out.push('\n');
        }
        out
    }
}

/// Shopping-list service implementing [`ShoppingListQuery`].
#[derive(Clone)]
pub struct ShoppingListService<R> {
    recipes: Arc<R>,
}

impl<R> ShoppingListService<R> {
    /// Build the service over the recipe repository that stores the cart.
    pub fn new(recipes: Arc<R>) -> Self {
        Self { recipes }
    }
}

#[async_trait]
impl<R> ShoppingListQuery for ShoppingListService<R>
where
    R: RecipeRepository,
{
    async fn shopping_list(&self, user: UserId) -> Result<ShoppingList, Error> {
        let lines = self
            .recipes
            .cart_lines(user)
            .await
            .map_err(map_recipe_error)?;
        debug!(%user, cart_lines = lines.len(), "aggregating shopping list");
        Ok(ShoppingList::aggregate(lines))
    }
}
