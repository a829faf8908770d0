//! Domain types for the Bancarella server.
//!
//! These types represent validated domain objects separate from database
//! row types. Request/input shapes used by the JSON API live alongside the
//! entities they create.

pub mod audit;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use audit::AuditLogEntry;
pub use order::{
    AdminOrder, Order, OrderItem, OrderItemRequest, OrderWithItems, PlacedOrder, UpdateOrderInput,
};
pub use product::{
    ColorInput, Product, ProductColor, ProductInput, ProductVariant, ProductWithColors,
    VariantInput,
};
pub use session::{CurrentUser, session_keys};
pub use user::User;
