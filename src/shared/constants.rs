/// Separates axis tokens inside a variant key
pub const VARIANT_AXIS_DELIMITER: char = '|';

/// Separates an axis key from its value inside a variant key token
pub const VARIANT_KEY_VALUE_SEPARATOR: char = ':';

/// Separates group members inside a single group axis token
pub const VARIANT_MEMBER_DELIMITER: char = ',';

/// Separates a group member key from its value
pub const VARIANT_MEMBER_ASSIGN: char = '=';

/// Escape character for reserved characters in variant key tokens
pub const VARIANT_ESCAPE: char = '\\';

/// Separator used when materializing category slug paths
pub const SLUG_PATH_SEPARATOR: char = '/';

/// Date format accepted and produced for Date attributes
pub const DATE_FORMAT: &str = "%Y-%m-%d";
