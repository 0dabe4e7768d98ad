//! Client-side state for the storefront UI shell.
//!
//! These types model what the browser keeps on its side of the API: the
//! cart presentation cache, the favorites list, and the two local-storage
//! keys (anonymous session token and serialized favorites). They are
//! explicit objects handed to the component tree; lifecycle, reset, and
//! persistence are all visible at the call site, never ambient singletons.

pub mod cart_state;
pub mod favorites;
pub mod storage;

pub use cart_state::CartState;
pub use favorites::{reduce, FavoriteItem, FavoritesAction, FavoritesStore};
pub use storage::{ensure_session_token, FileStorage, KeyValueStorage, MemoryStorage};
