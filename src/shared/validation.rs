use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for machine keys (attribute keys, lookup type keys)
    /// Lowercase snake_case starting with a letter
    /// - Valid: "color", "device_model", "size2"
    /// - Invalid: "Color", "_color", "color-name", "2size"
    pub static ref KEY_REGEX: Regex = Regex::new(r"^[a-z][a-z0-9]*(?:_[a-z0-9]+)*$").unwrap();

    /// Regex for category slugs
    /// Must be lowercase alphanumeric with hyphens
    /// - Valid: "phones", "mobile-phones", "tv4k"
    /// - Invalid: "-phones", "phones-", "mobile--phones", "Phones", "mobile_phones"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Regex for option codes (enum options, lookup options)
    /// Lowercase alphanumeric with underscores, hyphens or dots between runs
    /// - Valid: "red", "iphone_14", "xl", "2.5-inch"
    /// - Invalid: "Red", "_red", "red_", "red blue"
    pub static ref CODE_REGEX: Regex =
        Regex::new(r"^[a-z0-9]+(?:[_.\-][a-z0-9]+)*$").unwrap();

    /// Regex for seller SKUs
    /// Alphanumeric start, then alphanumerics, dots, underscores or hyphens
    /// - Valid: "TSHIRT-RED-M", "sku_001", "A1.B2"
    /// - Invalid: "-abc", "has space", "sku/1"
    pub static ref SKU_REGEX: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._\-]*$").unwrap();
}
