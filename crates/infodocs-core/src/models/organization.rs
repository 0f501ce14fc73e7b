use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;
use uuid::Uuid;

/// The issuing organization ("spa"). Always re-fetched from storage by the
/// caller; never taken from a request payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Organization {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub alternate_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website: String,
    /// Stored-relative path or URL of the logo.
    #[serde(default)]
    pub logo: String,
}

/// Organization fields exposed to templates as flat `spa_*` keys.
pub const ORGANIZATION_CONTEXT_FIELDS: &[(&str, &str)] = &[
    ("name", "spa_name"),
    ("address", "spa_address"),
    ("area", "spa_area"),
    ("city", "spa_city"),
    ("state", "spa_state"),
    ("country", "spa_country"),
    ("pincode", "spa_pincode"),
    ("phone_number", "spa_phone"),
    ("alternate_number", "spa_phone1"),
    ("email", "spa_email"),
    ("website", "spa_website"),
    ("logo", "spa_logo"),
];

/// Organization fields exposed under the nested `spa` object.
pub const ORGANIZATION_BLOCK_FIELDS: &[(&str, &str)] = &[
    ("id", "id"),
    ("name", "name"),
    ("address", "address"),
    ("area", "area"),
    ("city", "city"),
    ("state", "state"),
    ("country", "country"),
    ("pincode", "pincode"),
    ("phone_number", "phone_number"),
    ("alternate_number", "alternate_number"),
    ("email", "email"),
    ("website", "website"),
    ("logo", "logo"),
];

/// Fields the render context takes from trusted sources only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Authoritative {
    /// Document date, already formatted for display.
    #[serde(default)]
    pub date: Option<String>,
    /// Name of the document's subject.
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub organization: Option<Organization>,
}

/// Project `entity` onto a mapping, renaming each exposed `(field, key)`
/// pair. Missing or null fields project to an empty string; string values
/// are trimmed.
pub fn project<T: Serialize>(entity: &T, exposed: &[(&str, &str)]) -> Map<String, Value> {
    let source = match serde_json::to_value(entity) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };

    exposed
        .iter()
        .map(|(field, key)| {
            let value = match source.get(*field) {
                Some(Value::String(s)) => Value::String(s.trim().to_string()),
                Some(Value::Null) | None => Value::String(String::new()),
                Some(other) => other.clone(),
            };
            (key.to_string(), value)
        })
        .collect()
}
