mod category;
mod effective_schema;

pub use category::{CategoryNode, CategoryState};
pub use effective_schema::{AllowList, AllowListIndex, EffectiveSchema};
