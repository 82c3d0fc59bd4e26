/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
use crate::validation::{LotSizeRules, PriceInterval, SymbolSet, TickSizeRules};
use serde::Deserialize;

/// The on-disk shape of the validation-rule configuration document,
/// loaded once at engine construction. Unknown top-level keys are
/// ignored rather than rejected, so operators can carry forward fields
/// meant for other consumers of the same document.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    /// Lot-size intervals.
    #[serde(default)]
    pub lot_size: Vec<PriceInterval<u64>>,
    /// Tick-size intervals.
    #[serde(default)]
    pub tick_size: Vec<PriceInterval<i64>>,
    /// Whitelisted symbols.
    #[serde(default)]
    pub symbols: Vec<String>,
}

impl RuleConfig {
    /// Parses a config document from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Builds the three rule sets the engine holds for its lifetime.
    pub fn into_rules(self) -> (TickSizeRules, LotSizeRules, SymbolSet) {
        (
            TickSizeRules::new(self.tick_size),
            LotSizeRules::new(self.lot_size),
            SymbolSet::new(self.symbols),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_document() {
        let json = r#"{
            "tick_size": [{"from": "0", "to": null, "value": 1}],
            "lot_size": [{"from": "0", "to": null, "value": 100}],
            "symbols": ["ABC", "XYZ"]
        }"#;
        let config = RuleConfig::from_json(json).unwrap();
        assert_eq!(config.symbols, vec!["ABC".to_string(), "XYZ".to_string()]);
    }

    #[test]
    fn ignores_unknown_top_level_keys() {
        let json = r#"{"symbols": ["ABC"], "unrelated_key": 42}"#;
        let config = RuleConfig::from_json(json).unwrap();
        assert_eq!(config.symbols, vec!["ABC".to_string()]);
    }

    #[test]
    fn defaults_missing_sections_to_empty() {
        let json = r#"{}"#;
        let config = RuleConfig::from_json(json).unwrap();
        assert!(config.lot_size.is_empty());
        assert!(config.tick_size.is_empty());
        assert!(config.symbols.is_empty());
    }
}
