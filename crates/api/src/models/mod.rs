//! Domain models and their frontend-facing views.
//!
//! Models mirror the database rows; `*View` structs own the response shaping
//! the frontend depends on (camelCase fields plus the legacy snake_case
//! aliases such as `image_url` and `stock_quantity`).

pub mod address;
pub mod cart;
pub mod category;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;

pub use address::{Address, AddressView, Pincode};
pub use cart::{CartItem, CartItemView};
pub use category::{Category, CategoryView};
pub use order::{AdminOrderUser, AdminOrderView, Order, OrderItem, OrderItemView, OrderView};
pub use payment::Payment;
pub use product::{Product, ProductImage, ProductImageView, ProductView, ProductWithRelations};
pub use user::{User, UserSummary};
