use crate::definition::one_or_many;
use serde::{Deserialize, Serialize};

/// Actor name that matches any actor not listed by another column.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub actors: Vec<String>,
}

impl ColumnDefinition {
    pub fn display_name(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.key)
    }

    pub fn is_wildcard(&self) -> bool {
        self.actors.iter().any(|a| a == WILDCARD)
    }
}

/// Display columns of a procedure, in declared order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Columns {
    columns: Vec<ColumnDefinition>,
}

impl Columns {
    pub fn new(columns: Vec<ColumnDefinition>) -> Self {
        Self { columns }
    }

    /// One column per actor, used when a procedure declares none.
    pub fn one_per_actor(actors: &[&str]) -> Self {
        let columns = actors
            .iter()
            .map(|a| ColumnDefinition {
                key: a.to_string(),
                display: None,
                actors: vec![a.to_string()],
            })
            .collect();
        Self { columns }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Index of the first column listing `actor`, falling back to the first
    /// wildcard column.
    pub fn column_index(&self, actor: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.actors.iter().any(|a| a == actor))
            .or_else(|| self.columns.iter().position(ColumnDefinition::is_wildcard))
    }

    /// Every actor named in a column definition.
    pub fn all_actors(&self, include_wildcard: bool) -> Vec<&str> {
        self.columns
            .iter()
            .flat_map(|c| c.actors.iter())
            .map(String::as_str)
            .filter(|a| include_wildcard || *a != WILDCARD)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Columns {
        let defs: Vec<ColumnDefinition> = serde_yaml::from_str(
            r#"
- key: IV
  display: IV/SSRMS
  actors: [IV, SSRMS]
- key: EV1
  actors: EV1
- key: other
  actors: "*"
"#,
        )
        .unwrap();
        Columns::new(defs)
    }

    #[test]
    fn listed_actor_resolves_to_its_column() {
        let c = columns();
        assert_eq!(c.column_index("SSRMS"), Some(0));
        assert_eq!(c.column_index("EV1"), Some(1));
    }

    #[test]
    fn unlisted_actor_falls_back_to_wildcard() {
        assert_eq!(columns().column_index("EV2"), Some(2));

        let no_wildcard = Columns::one_per_actor(&["EV1", "EV2"]);
        assert_eq!(no_wildcard.column_index("IV"), None);
    }

    #[test]
    fn all_actors_optionally_includes_wildcard() {
        let c = columns();
        assert_eq!(c.all_actors(false), vec!["IV", "SSRMS", "EV1"]);
        assert_eq!(c.all_actors(true), vec!["IV", "SSRMS", "EV1", "*"]);
        assert_eq!(c.iter().next().unwrap().display_name(), "IV/SSRMS");
    }
}
