/// Dataset and collection name constants to ensure consistency across the codebase.
/// The dataset file names are the fixed names of the IMDb dump resources; the
/// collection names address the destination index per document type.

// Reserved literal denoting an absent field value in the dump format
pub const NULL_MARKER: &str = "\\N";

// Input dataset resources (gzip-compressed, tab-separated, one header line)
pub const NAME_BASICS_FILE: &str = "name.basics.tsv.gz";
pub const TITLE_BASICS_FILE: &str = "title.basics.tsv.gz";
pub const TITLE_PRINCIPALS_FILE: &str = "title.principals.tsv.gz";

// Destination collections, one per document type
pub const BASIC_TITLE_INFO_COLLECTION: &str = "basic_title_info";
pub const PRINCIPAL_CAST_COLLECTION: &str = "principal_cast";
