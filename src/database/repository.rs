/*!
 * SQL access for the attribute dictionary and localization table.
 *
 * Every function takes a plain `&Connection` so it works the same inside
 * a transaction (which derefs to `Connection`) and outside of one.
 */

use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{Attribute, LocalizationRecord, NewLocalization, ResolvedAttribute};

// =========================================================================
// Attribute Operations
// =========================================================================

/// Look up an attribute id by exact name
pub fn find_attribute_id(conn: &Connection, name: &str) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT AT_ID FROM attribute WHERE AT_NAME = ?1",
        [name],
        |row| row.get(0),
    )
    .optional()
}

/// Insert a new attribute and return its generated id
pub fn insert_attribute(conn: &Connection, name: &str) -> rusqlite::Result<i64> {
    conn.execute("INSERT INTO attribute (AT_NAME) VALUES (?1)", [name])?;
    let id = conn.last_insert_rowid();
    debug!("Created attribute '{}' with id {}", name, id);
    Ok(id)
}

/// Lookup, then insert only when absent
pub fn get_or_create_attribute(conn: &Connection, name: &str) -> rusqlite::Result<ResolvedAttribute> {
    if let Some(id) = find_attribute_id(conn, name)? {
        return Ok(ResolvedAttribute { id, created: false });
    }

    let id = insert_attribute(conn, name)?;
    Ok(ResolvedAttribute { id, created: true })
}

/// List all attributes ordered by id
pub fn list_attributes(conn: &Connection) -> rusqlite::Result<Vec<Attribute>> {
    let mut stmt = conn.prepare("SELECT AT_ID, AT_NAME FROM attribute ORDER BY AT_ID")?;
    let rows = stmt.query_map([], |row| {
        Ok(Attribute {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    rows.collect()
}

// =========================================================================
// Localization Operations
// =========================================================================

/// Insert one localization row and return its generated id
pub fn insert_localization(conn: &Connection, record: &NewLocalization) -> rusqlite::Result<i64> {
    let [at1, at2, at3, at4] = record.attributes;
    conn.execute(
        r#"
        INSERT INTO localization
            (LC_AT_1, LC_AT_2, LC_AT_3, LC_AT_4, LC_TEXT_DE, LC_TEXT_EN)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![at1, at2, at3, at4, record.text_de, record.text_en],
    )?;
    Ok(conn.last_insert_rowid())
}

/// List all localization rows ordered by rowid
pub fn list_localizations(conn: &Connection) -> rusqlite::Result<Vec<LocalizationRecord>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT rowid, LC_AT_1, LC_AT_2, LC_AT_3, LC_AT_4, LC_TEXT_DE, LC_TEXT_EN
        FROM localization ORDER BY rowid
        "#,
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(LocalizationRecord {
            id: row.get(0)?,
            attributes: [row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?],
            text_de: row.get(5)?,
            text_en: row.get(6)?,
        })
    })?;
    rows.collect()
}

/// Count rows of one of the importer's tables
pub fn count_rows(conn: &Connection, table: &str) -> rusqlite::Result<i64> {
    let sql = match table {
        "attribute" => "SELECT COUNT(*) FROM attribute",
        "localization" => "SELECT COUNT(*) FROM localization",
        _ => return Err(rusqlite::Error::InvalidParameterName(table.to_string())),
    };
    conn.query_row(sql, [], |row| row.get(0))
}
