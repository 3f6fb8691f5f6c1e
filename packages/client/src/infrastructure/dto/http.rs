//! REST API response DTOs.

use serde::{Deserialize, Deserializer};

/// Accept both JSON strings and numbers for server-assigned ids.
///
/// The room and file services are free to use numeric database keys; the
/// client treats every id as an opaque token.
fn de_opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Room payload from `GET /room/{a}/{b}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    #[serde(deserialize_with = "de_opaque_id")]
    pub id: String,
    pub participant_a: String,
    pub participant_b: String,
}

/// File row from `GET /api/files/my-files/{ownerId}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntryDto {
    #[serde(deserialize_with = "de_opaque_id")]
    pub id: String,
    pub filename: String,
    #[serde(deserialize_with = "de_opaque_id")]
    pub owner_id: String,
    #[serde(default)]
    pub storage_path: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub content_type: Option<String>,
}
