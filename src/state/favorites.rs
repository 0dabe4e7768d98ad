use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::localized::LocalizedText;
use crate::state::storage::{KeyValueStorage, FAVORITES_KEY};

/// Snapshot of a liked product. Lives only in browser-local storage;
/// price and name are copied at like-time and never refreshed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FavoriteItem {
    pub product_id: Uuid,
    pub name: LocalizedText,
    pub price: Decimal,
    pub image: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// State transitions of the favorites list.
#[derive(Clone, Debug)]
pub enum FavoritesAction {
    /// No-op when the product id is already present (set semantics)
    Add(FavoriteItem),
    Remove(Uuid),
    Clear,
    /// Wholesale replacement, used once at startup
    Load(Vec<FavoriteItem>),
}

/// Pure transition function over the favorites list.
pub fn reduce(items: Vec<FavoriteItem>, action: FavoritesAction) -> Vec<FavoriteItem> {
    match action {
        FavoritesAction::Add(item) => {
            if items.iter().any(|i| i.product_id == item.product_id) {
                items
            } else {
                let mut items = items;
                items.push(item);
                items
            }
        }
        FavoritesAction::Remove(product_id) => items
            .into_iter()
            .filter(|i| i.product_id != product_id)
            .collect(),
        FavoritesAction::Clear => Vec::new(),
        FavoritesAction::Load(items) => items,
    }
}

/// Favorites list persisted to local storage after every change and
/// rehydrated from it on construction. No backend interaction and no
/// multi-device sync; a single-browser convenience cache.
pub struct FavoritesStore<S: KeyValueStorage> {
    storage: S,
    items: Vec<FavoriteItem>,
}

impl<S: KeyValueStorage> FavoritesStore<S> {
    /// Opens the store, rehydrating the persisted list. An unreadable
    /// payload degrades to an empty list rather than failing startup.
    pub fn open(storage: S) -> Self {
        let items = match storage.get(FAVORITES_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring corrupt favorites payload: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };

        let mut store = Self {
            storage,
            items: Vec::new(),
        };
        store.dispatch(FavoritesAction::Load(items));
        store
    }

    /// Applies an action through the reducer and persists the result.
    pub fn dispatch(&mut self, action: FavoritesAction) {
        self.items = reduce(std::mem::take(&mut self.items), action);
        self.persist();
    }

    pub fn items(&self) -> &[FavoriteItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, product_id: Uuid) -> bool {
        self.items.iter().any(|i| i.product_id == product_id)
    }

    fn persist(&self) {
        match serde_json::to_string(&self.items) {
            Ok(raw) => self.storage.set(FAVORITES_KEY, &raw),
            Err(e) => warn!("Failed to serialize favorites: {}", e),
        }
    }
}
