mod variant_key_builder;

pub use variant_key_builder::VariantKeyBuilder;
