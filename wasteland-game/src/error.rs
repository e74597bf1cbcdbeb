//! Errors raised while loading or validating static game data.
//!
//! Gameplay operations never fail; they degrade to logged no-ops. Only data
//! ingestion can reject input.
use thiserror::Error;

/// Problems found while parsing or cross-checking data assets.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to parse {asset}: {source}")]
    Parse {
        asset: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: &'static str, id: String },
    #[error("item id `{id}` must not contain the instance separator `#`")]
    ReservedSeparator { id: String },
    #[error("{field} of item `{id}` out of range (got {value})")]
    ItemOutOfRange {
        id: String,
        field: &'static str,
        value: f64,
    },
    #[error("loot table `{table}` references unknown item `{item}`")]
    UnknownLootItem { table: String, item: String },
    #[error("loot table `{table}` has an empty common pool")]
    EmptyCommonPool { table: String },
    #[error("fallback loot table `{0}` is missing")]
    MissingFallbackTable(&'static str),
    #[error("effect entry references unknown item `{0}`")]
    UnknownEffectItem(String),
    #[error("location `{id}` lies outside the map plane ({x:.1}, {y:.1})")]
    LocationOutOfBounds { id: String, x: f64, y: f64 },
    #[error("danger level of location `{id}` must be 0..=5 (got {value})")]
    DangerOutOfRange { id: String, value: u8 },
}

impl DataError {
    pub(crate) const fn parse(asset: &'static str, source: serde_json::Error) -> Self {
        Self::Parse { asset, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_ids() {
        let err = DataError::UnknownLootItem {
            table: "forest".into(),
            item: "laser".into(),
        };
        assert_eq!(
            err.to_string(),
            "loot table `forest` references unknown item `laser`"
        );

        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = DataError::parse("items", parse_err);
        assert!(err.to_string().starts_with("failed to parse items"));
    }
}
