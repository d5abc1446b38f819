//! Case conversion between the casing a handler uses internally (column names, response keys)
//! and the casing its callers see.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Casing {
    #[default]
    #[serde(rename = "snake_case")]
    Snake,
    #[serde(rename = "camelCase")]
    Camel,
    #[serde(rename = "TitleCase")]
    Title,
}

impl Casing {
    pub const ALL: [Casing; 3] = [Casing::Snake, Casing::Camel, Casing::Title];

    pub fn as_str(&self) -> &'static str {
        match self {
            Casing::Snake => "snake_case",
            Casing::Camel => "camelCase",
            Casing::Title => "TitleCase",
        }
    }
}

impl fmt::Display for Casing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Casing {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Casing::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Casing::ALL.iter().map(Casing::as_str).collect();
                ConfigError::Invalid(format!(
                    "Invalid casing '{}'. Allowed casings are: {}",
                    s,
                    allowed.join(", ")
                ))
            })
    }
}

/// Split an identifier into lowercase words according to the casing it is written in.
/// Every capital starts a new word, so snake and Title/camel forms convert back exactly.
pub fn words(s: &str, casing: Casing) -> Vec<String> {
    match casing {
        Casing::Snake => s
            .split('_')
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect(),
        Casing::Camel | Casing::Title => {
            let mut out = Vec::new();
            let mut current = String::new();
            for c in s.chars() {
                if c.is_uppercase() && !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                current.extend(c.to_lowercase());
            }
            if !current.is_empty() {
                out.push(current);
            }
            out
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn join(words: &[String], casing: Casing) -> String {
    match casing {
        Casing::Snake => words.join("_"),
        Casing::Title => words.iter().map(|w| capitalize(w)).collect(),
        Casing::Camel => words
            .iter()
            .enumerate()
            .map(|(i, w)| if i == 0 { w.clone() } else { capitalize(w) })
            .collect(),
    }
}

/// Re-case an identifier. e.g. ("number_results", Snake, Title) -> "NumberResults"
pub fn swap_casing(s: &str, from: Casing, to: Casing) -> String {
    if from == to {
        return s.to_string();
    }
    join(&words(s, from), to)
}

/// The pair of casings a handler translates between.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseMapping {
    pub internal: Casing,
    pub external: Casing,
}

impl CaseMapping {
    pub fn new(internal: Casing, external: Casing) -> Self {
        CaseMapping { internal, external }
    }

    pub fn to_external(&self, s: &str) -> String {
        swap_casing(s, self.internal, self.external)
    }

    pub fn to_internal(&self, s: &str) -> String {
        swap_casing(s, self.external, self.internal)
    }

    /// Re-key an object from internal to external casing. Values are untouched.
    pub fn object_to_external(&self, obj: Map<String, Value>) -> Map<String, Value> {
        obj.into_iter().map(|(k, v)| (self.to_external(&k), v)).collect()
    }

    /// Re-key an object from external to internal casing. Values are untouched.
    pub fn object_to_internal(&self, obj: Map<String, Value>) -> Map<String, Value> {
        obj.into_iter().map(|(k, v)| (self.to_internal(&k), v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn swaps_between_all_casings() {
        assert_eq!("NumberResults", swap_casing("number_results", Casing::Snake, Casing::Title));
        assert_eq!("numberResults", swap_casing("number_results", Casing::Snake, Casing::Camel));
        assert_eq!("next_page", swap_casing("NextPage", Casing::Title, Casing::Snake));
        assert_eq!("NextPage", swap_casing("nextPage", Casing::Camel, Casing::Title));
        assert_eq!("ClientError", swap_casing("client_error", Casing::Snake, Casing::Title));
        assert_eq!("age", swap_casing("Age", Casing::Title, Casing::Snake));
    }

    #[test]
    fn single_letter_words_survive_a_round_trip() {
        assert_eq!("PointXY", swap_casing("point_x_y", Casing::Snake, Casing::Title));
        assert_eq!("point_x_y", swap_casing("PointXY", Casing::Title, Casing::Snake));
        assert_eq!("user_i_d", swap_casing("userID", Casing::Camel, Casing::Snake));
    }

    #[test]
    fn snake_title_round_trip_is_symmetric() {
        for name in ["id", "email", "input_errors", "number_results", "a_b_c", "point_x_y"] {
            let title = swap_casing(name, Casing::Snake, Casing::Title);
            assert_eq!(name, swap_casing(&title, Casing::Title, Casing::Snake));
        }
    }

    #[test]
    fn parses_casing_names() {
        assert_eq!(Casing::Title, "TitleCase".parse().unwrap());
        let err = "kebab-case".parse::<Casing>().unwrap_err();
        assert_eq!(
            "Invalid casing 'kebab-case'. Allowed casings are: snake_case, camelCase, TitleCase",
            err.to_string()
        );
    }

    #[test]
    fn rekeys_objects_both_ways() {
        let mapping = CaseMapping::new(Casing::Snake, Casing::Title);
        let external = mapping.object_to_external(json!({"next_page": {"start": 5}}).as_object().cloned().unwrap());
        assert_eq!(json!({"NextPage": {"start": 5}}), Value::Object(external.clone()));
        assert_eq!(json!({"next_page": {"start": 5}}), Value::Object(mapping.object_to_internal(external)));
    }
}
