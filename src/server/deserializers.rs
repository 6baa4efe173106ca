use serde::de::Error;
use serde::{Deserialize, Deserializer};

use crate::pagination::first_page;

// the web client sends `searchTerm: ""` from an untouched search box, which means "no search"
pub fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageParam {
    Number(i64),
    Text(String),
}

// a page that is not a number at all is read as the first page, the way the web client
// has always been served; negative pages stay an error
pub fn lenient_page<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match PageParam::deserialize(deserializer)? {
        PageParam::Number(n) => n,
        PageParam::Text(text) => match text.trim().parse::<i64>() {
            Ok(n) => n,
            Err(_) => return Ok(first_page()),
        },
    };
    u32::try_from(number).map_err(|_| D::Error::custom(format!("page {number} is out of range")))
}
