//! JSON snapshot encoding for the session record.
//!
//! Snapshots are read back leniently: missing keys take their defaults and
//! labels this build does not recognise load as "unset" so an old or hand
//! edited file never blocks the wizard. When a file carries both the
//! English key and its legacy Spanish spelling, the English key wins.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::session::Session;

const INDENT: &[u8] = b"    ";

/// English keys of the session record and their legacy spellings.
const SESSION_KEYS: [(&str, &str); 5] = [
    ("country", "pais"),
    ("length_km", "largo"),
    ("width_km", "ancho"),
    ("foods", "alimentos"),
    ("tables", "tablas"),
];

/// English keys of a food entry and their legacy spellings.
const FOOD_KEYS: [(&str, &str); 5] = [
    ("name", "nombre"),
    ("level", "nivel"),
    ("bracket", "categoria"),
    ("mode", "modo"),
    ("accumulated_value", "valor_acumulado"),
];

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("snapshot is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Serialize the whole record as indented JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(session: &Session) -> Result<String, SnapshotError> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    session.serialize(&mut serializer)?;
    buffer.push(b'\n');
    Ok(String::from_utf8(buffer)?)
}

/// Parse a snapshot, treating blank input as an empty record.
///
/// # Errors
///
/// Returns an error if the text is not a JSON object.
pub fn decode(text: &str) -> Result<Session, SnapshotError> {
    if text.trim().is_empty() {
        return Ok(Session::default());
    }
    let mut raw: Value = serde_json::from_str(text)?;
    if let Value::Object(root) = &mut raw {
        drop_shadowed(root, &SESSION_KEYS);
        let key = if root.contains_key("foods") {
            "foods"
        } else {
            "alimentos"
        };
        if let Some(Value::Array(foods)) = root.get_mut(key) {
            for food in foods.iter_mut().filter_map(Value::as_object_mut) {
                drop_shadowed(food, &FOOD_KEYS);
            }
        }
    }
    Ok(serde_json::from_value(raw)?)
}

/// Remove legacy keys whose English counterpart is also present.
fn drop_shadowed(object: &mut Map<String, Value>, pairs: &[(&str, &str)]) {
    for (english, legacy) in pairs {
        if object.contains_key(*english) {
            object.remove(*legacy);
        }
    }
}

/// Deserialize an optional value, mapping anything unparseable to `None`.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}
