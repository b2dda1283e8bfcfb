mod listing_attribute_service;

pub use listing_attribute_service::ListingAttributeService;
