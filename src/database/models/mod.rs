pub mod product;
pub mod user;

pub use product::{NewProduct, Product, ProductPatch, ProductSummary};
pub use user::User;
