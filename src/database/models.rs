/*!
 * Database entity models.
 *
 * These structures map directly to the `attribute` and `localization`
 * tables.
 */

/// Named dictionary entry referenced by localization records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// AT_ID
    pub id: i64,
    /// AT_NAME, unique
    pub name: String,
}

/// Stored localization row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizationRecord {
    /// LC_ID
    pub id: i64,
    /// LC_AT_1..LC_AT_4
    pub attributes: [Option<i64>; 4],
    /// LC_TEXT_DE
    pub text_de: String,
    /// LC_TEXT_EN
    pub text_en: String,
}

/// Localization row ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLocalization {
    pub attributes: [Option<i64>; 4],
    pub text_de: String,
    pub text_en: String,
}

/// Outcome of a get-or-create lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAttribute {
    pub id: i64,
    /// True when the row did not exist before the call
    pub created: bool,
}
