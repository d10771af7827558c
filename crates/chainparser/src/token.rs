//! Default token metadata.

use chainparser_core::NormalizedValue;
use serde::Serialize;

/// Methods queried by [`crate::ContractParser::get_default_token_data`].
pub const DEFAULT_TOKEN_METHODS: [&str; 4] = ["name", "symbol", "decimals", "totalSupply"];

/// Token metadata; each field is `None` when its call failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub name: Option<NormalizedValue>,
    pub symbol: Option<NormalizedValue>,
    pub decimals: Option<NormalizedValue>,
    pub total_supply: Option<NormalizedValue>,
}

impl TokenData {
    /// Pairs call results with [`DEFAULT_TOKEN_METHODS`] in order.
    pub fn from_results(results: impl IntoIterator<Item = Option<NormalizedValue>>) -> Self {
        let mut data = TokenData::default();
        for (method, value) in DEFAULT_TOKEN_METHODS.iter().zip(results) {
            let field = match *method {
                "name" => &mut data.name,
                "symbol" => &mut data.symbol,
                "decimals" => &mut data.decimals,
                "totalSupply" => &mut data.total_supply,
                _ => continue,
            };
            *field = value;
        }
        data
    }
}
