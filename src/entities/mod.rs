/// Storefront entities module
pub mod cart;
pub mod cart_item;
pub mod order;
pub mod product;

// Re-export entities
pub use cart::{Entity as Cart, Model as CartModel};
pub use cart_item::{Entity as CartItem, Model as CartItemModel};
pub use order::{Entity as Order, Model as OrderModel};
pub use product::{Entity as Product, Model as ProductModel};
