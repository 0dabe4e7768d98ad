use crate::{
    entities::{cart, cart_item, Cart, CartItem, CartItemModel, CartModel, Product, ProductModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// The key a cart row is looked up by: an authenticated customer or an
/// anonymous browser session, never both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartOwner {
    Customer(Uuid),
    Session(String),
}

impl CartOwner {
    fn condition(&self) -> Condition {
        match self {
            CartOwner::Customer(id) => Condition::all().add(cart::Column::CustomerId.eq(*id)),
            CartOwner::Session(token) => {
                Condition::all().add(cart::Column::SessionId.eq(token.clone()))
            }
        }
    }
}

/// One cart line joined to its product row for display.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub item: CartItemModel,
    pub product: ProductModel,
}

/// Derived cart totals; computed from the line items on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub item_count: i64,
    pub total: Decimal,
}

/// Durable cart CRUD scoped to a [`CartOwner`].
///
/// All operations issue plain sequential statements with no transaction
/// and no locking: a read-stock-then-write sequence can race with a
/// concurrent mutation of the same cart (two browser tabs) and the last
/// write wins. That matches the backend-interaction contract this service
/// reproduces; do not add locking here without redesigning that contract.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Looks up the owner's cart, creating it lazily on first use.
    ///
    /// Uniqueness per owner key is lookup-or-create semantics only; there
    /// is no database constraint backing it. Two concurrent first calls
    /// for the same key can both insert, after which every lookup picks
    /// the older row deterministically and the newer one stays empty.
    #[instrument(skip(self))]
    pub async fn get_or_create_cart(&self, owner: &CartOwner) -> Result<CartModel, ServiceError> {
        if let Some(existing) = self.find_cart(owner).await? {
            return Ok(existing);
        }

        let cart_id = Uuid::new_v4();
        let (customer_id, session_id) = match owner {
            CartOwner::Customer(id) => (Some(*id), None),
            CartOwner::Session(token) => (None, Some(token.clone())),
        };

        let cart = cart::ActiveModel {
            id: Set(cart_id),
            customer_id: Set(customer_id),
            session_id: Set(session_id),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        let cart = cart.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CartCreated(cart_id))
            .await;

        info!("Created cart {} for {:?}", cart_id, owner);
        Ok(cart)
    }

    /// Lists the cart's lines joined to their products, newest first.
    ///
    /// Always safe to call; creates the cart if it does not exist yet.
    /// Lines whose product row has vanished are skipped with a warning.
    pub async fn list_items(&self, owner: &CartOwner) -> Result<Vec<CartLine>, ServiceError> {
        let cart = self.get_or_create_cart(owner).await?;

        let rows = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .find_also_related(Product)
            .order_by_desc(cart_item::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let lines = rows
            .into_iter()
            .filter_map(|(item, product)| match product {
                Some(product) => Some(CartLine { item, product }),
                None => {
                    warn!(
                        "Cart {} references missing product {}; skipping line {}",
                        item.cart_id, item.product_id, item.id
                    );
                    None
                }
            })
            .collect();

        Ok(lines)
    }

    /// Adds a product to the cart, merging into an existing line.
    ///
    /// Rejects inactive or unknown products and any quantity that would
    /// push the line past the product's current stock. A new line captures
    /// the product's price at this moment; merging into an existing line
    /// keeps the price captured when that line was first created.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        owner: &CartOwner,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemModel, ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::InvalidInput(
                "Quantity must be positive".to_string(),
            ));
        }

        let cart = self.get_or_create_cart(owner).await?;

        let product = Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found or inactive", product_id))
            })?;

        let existing = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .one(&*self.db)
            .await?;

        let new_quantity = existing.as_ref().map_or(0, |i| i.quantity) + quantity;
        if new_quantity > product.stock_quantity {
            return Err(ServiceError::InsufficientStock(format!(
                "Only {} in stock for product {}",
                product.stock_quantity, product_id
            )));
        }

        let item = if let Some(item) = existing {
            let mut item: cart_item::ActiveModel = item.into();
            item.quantity = Set(new_quantity);
            item.updated_at = Set(Utc::now());
            item.update(&*self.db).await?
        } else {
            let item = cart_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart.id),
                product_id: Set(product_id),
                quantity: Set(quantity),
                unit_price: Set(product.price),
                created_at: Set(Utc::now()),
                updated_at: Set(Utc::now()),
            };
            item.insert(&*self.db).await?
        };

        self.touch_cart(&cart).await?;

        self.event_sender
            .send_or_log(Event::CartItemAdded {
                cart_id: cart.id,
                product_id,
            })
            .await;

        info!(
            "Added product {} x{} to cart {}",
            product_id, quantity, cart.id
        );
        Ok(item)
    }

    /// Sets a line's quantity in place.
    ///
    /// Zero and negative quantities are rejected rather than treated as
    /// removal; items are removed explicitly via [`Self::remove_item`].
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        owner: &CartOwner,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemModel, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::InvalidInput(
                "Quantity must be positive".to_string(),
            ));
        }

        let item = CartItem::find_by_id(item_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart item {} not found", item_id)))?;

        let cart = self
            .find_cart(owner)
            .await?
            .filter(|c| c.id == item.cart_id)
            .ok_or_else(|| {
                ServiceError::InvalidOperation("Item does not belong to this cart".to_string())
            })?;

        // Validate against the product's current stock, not the stock at
        // the time the line was created.
        let product = Product::find_by_id(item.product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", item.product_id))
            })?;

        if quantity > product.stock_quantity {
            return Err(ServiceError::InsufficientStock(format!(
                "Only {} in stock for product {}",
                product.stock_quantity, product.id
            )));
        }

        let mut active: cart_item::ActiveModel = item.into();
        active.quantity = Set(quantity);
        active.updated_at = Set(Utc::now());
        let item = active.update(&*self.db).await?;

        self.touch_cart(&cart).await?;

        self.event_sender
            .send_or_log(Event::CartItemQuantityChanged {
                cart_id: cart.id,
                item_id,
                quantity,
            })
            .await;

        Ok(item)
    }

    /// Removes a line from the owner's cart. Idempotent: removing an id
    /// that is already gone is indistinguishable from success.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, owner: &CartOwner, item_id: Uuid) -> Result<(), ServiceError> {
        let Some(cart) = self.find_cart(owner).await? else {
            return Ok(());
        };

        let result = CartItem::delete_many()
            .filter(cart_item::Column::Id.eq(item_id))
            .filter(cart_item::Column::CartId.eq(cart.id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected > 0 {
            self.touch_cart(&cart).await?;
            self.event_sender
                .send_or_log(Event::CartItemRemoved {
                    cart_id: cart.id,
                    item_id,
                })
                .await;
        }

        Ok(())
    }

    /// Deletes every line of the owner's cart.
    #[instrument(skip(self))]
    pub async fn clear(&self, owner: &CartOwner) -> Result<(), ServiceError> {
        let Some(cart) = self.find_cart(owner).await? else {
            return Ok(());
        };

        CartItem::delete_many()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .exec(&*self.db)
            .await?;

        self.touch_cart(&cart).await?;
        self.event_sender
            .send_or_log(Event::CartCleared(cart.id))
            .await;

        info!("Cleared cart {}", cart.id);
        Ok(())
    }

    /// Derives `{item_count, total}` from the current lines using each
    /// line's captured price. Pure aggregation, no caching.
    pub async fn summary(&self, owner: &CartOwner) -> Result<CartSummary, ServiceError> {
        let lines = self.list_items(owner).await?;

        let item_count = lines.iter().map(|l| i64::from(l.item.quantity)).sum();
        let total = lines.iter().map(|l| l.item.line_total()).sum();

        Ok(CartSummary { item_count, total })
    }

    /// Folds an anonymous cart into the customer's cart at login.
    ///
    /// Lines move over wholesale; when both carts hold the same product
    /// the quantities sum into the customer's line (which keeps its own
    /// captured price). The anonymous cart row is deleted afterwards, so
    /// calling this twice is a safe no-op. The call site triggers this;
    /// nothing here watches for login events.
    #[instrument(skip(self))]
    pub async fn merge_anonymous_cart(
        &self,
        session_token: &str,
        customer_id: Uuid,
    ) -> Result<(), ServiceError> {
        let anonymous = self
            .find_cart(&CartOwner::Session(session_token.to_string()))
            .await?;
        let Some(anonymous) = anonymous else {
            return Ok(());
        };

        let customer_cart = self
            .get_or_create_cart(&CartOwner::Customer(customer_id))
            .await?;

        let items = CartItem::find()
            .filter(cart_item::Column::CartId.eq(anonymous.id))
            .all(&*self.db)
            .await?;

        for item in items {
            let existing = CartItem::find()
                .filter(cart_item::Column::CartId.eq(customer_cart.id))
                .filter(cart_item::Column::ProductId.eq(item.product_id))
                .one(&*self.db)
                .await?;

            match existing {
                Some(target) => {
                    let merged = target.quantity + item.quantity;
                    let mut target: cart_item::ActiveModel = target.into();
                    target.quantity = Set(merged);
                    target.updated_at = Set(Utc::now());
                    target.update(&*self.db).await?;

                    CartItem::delete_by_id(item.id).exec(&*self.db).await?;
                }
                None => {
                    let mut moved: cart_item::ActiveModel = item.into();
                    moved.cart_id = Set(customer_cart.id);
                    moved.updated_at = Set(Utc::now());
                    moved.update(&*self.db).await?;
                }
            }
        }

        Cart::delete_by_id(anonymous.id).exec(&*self.db).await?;
        self.touch_cart(&customer_cart).await?;

        self.event_sender
            .send_or_log(Event::CartsMerged {
                anonymous_cart_id: anonymous.id,
                customer_cart_id: customer_cart.id,
            })
            .await;

        info!(
            "Merged anonymous cart {} into customer cart {}",
            anonymous.id, customer_cart.id
        );
        Ok(())
    }

    async fn find_cart(&self, owner: &CartOwner) -> Result<Option<CartModel>, ServiceError> {
        // Oldest row wins so duplicate carts created by a lookup race
        // resolve to the same winner on every subsequent call.
        let cart = Cart::find()
            .filter(owner.condition())
            .order_by_asc(cart::Column::CreatedAt)
            .order_by_asc(cart::Column::Id)
            .one(&*self.db)
            .await?;
        Ok(cart)
    }

    async fn touch_cart(&self, cart: &CartModel) -> Result<(), ServiceError> {
        let mut active: cart::ActiveModel = cart.clone().into();
        active.updated_at = Set(Utc::now());
        active.update(&*self.db).await?;
        Ok(())
    }
}
