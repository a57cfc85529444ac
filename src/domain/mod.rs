pub mod dataset;
pub mod possession;
pub mod price;
pub mod record;

pub use dataset::Dataset;
pub use price::{Price, PriceGrammar, PriceRange};
pub use record::Record;
