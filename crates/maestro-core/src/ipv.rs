use crate::definition::one_or_many;
use serde::{Deserialize, Deserializer, Serialize};

/// IPV-specific procedure metadata (`ipvFields:` in a procedure file).
///
/// The field set is fixed. Strings default to empty; list fields accept a
/// single scalar or a list and default to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IpvFields {
    /// Procedure number like `X.X.XXX`.
    #[serde(default)]
    pub number: String,
    /// Unique ID within IPV, like `M_12345`.
    #[serde(default)]
    pub m_number: String,
    #[serde(default)]
    pub proc_code: String,
    #[serde(default)]
    pub book: String,
    #[serde(default)]
    pub applicability: String,
    #[serde(default)]
    pub ipv_version: String,
    #[serde(default)]
    pub objective: String,

    #[serde(default, deserialize_with = "list")]
    pub crew_required: Vec<String>,
    #[serde(default, deserialize_with = "list")]
    pub parts: Vec<String>,
    #[serde(default, deserialize_with = "list")]
    pub materials: Vec<String>,
    #[serde(default, deserialize_with = "list")]
    pub tools: Vec<String>,
    #[serde(default, deserialize_with = "list")]
    pub ipv_location: Vec<String>,
    #[serde(default, deserialize_with = "list")]
    pub ipv_duration: Vec<String>,
    #[serde(default, deserialize_with = "list")]
    pub referenced_procedures: Vec<String>,
}

// `null` is treated like an absent list.
fn list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "one_or_many")] Vec<String>);

    Ok(Option::<Wrapper>::deserialize(deserializer)?
        .map(|w| w.0)
        .unwrap_or_default())
}
