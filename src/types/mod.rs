//! Value and tuple machinery shared by the catalog and the executors.

mod tuple;
mod value;

pub use tuple::{Tuple, TupleMeta};
pub use value::Value;
