mod listing_dto;

pub use listing_dto::{
    AcceptedListingDto, AcceptedVariantDto, ListingAttributesDto, VariantAttributesDto,
};
