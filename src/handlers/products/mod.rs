pub mod collection;
pub mod record;
pub mod utils;

// Re-export handler functions for use in routing
pub use collection::get as products_get;
pub use collection::mine as products_mine;
pub use collection::post as products_post;

pub use record::delete as product_delete;
pub use record::get as product_get;
pub use record::put as product_put;
