// ============================================================================
// Structure : TvlMap
// ============================================================================
// Total Value Locked par vault, aplati depuis la réponse `tvl`
//
// La réponse est indexée par chain puis par vault :
//   { "56": { "cake-bnb": 1200.5, ... }, "137": { ... } }
//
// Si un même vault apparaît sous plusieurs chains, la dernière chain dans
// l'ordre du document l'emporte (serde_json est compilé avec preserve_order).
// ============================================================================

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use crate::api::Endpoint;
use crate::error::ShapeError;
use crate::models::shape::{expect_object_with_sentinel, number_or_zero};

/// TVL par identifiant de vault
pub type TvlMap = HashMap<String, f64>;

/// Réduit une réponse `tvl` en TvlMap
///
/// Exige la présence de la chain "56" (BSC).
pub fn parse_tvls(data: Value) -> Result<TvlMap, ShapeError> {
    let chains = expect_object_with_sentinel(Endpoint::Tvl, data)?;

    let mut tvls = TvlMap::new();
    for (chain, vaults) in chains {
        let Value::Object(vaults) = vaults else {
            warn!(%chain, "Skipping TVL chain entry that is not an object");
            continue;
        };

        for (vault_id, tvl) in vaults {
            tvls.insert(vault_id, number_or_zero(&tvl));
        }
    }

    Ok(tvls)
}

/// Somme de toutes les TVL
pub fn total_tvl(tvls: &TvlMap) -> f64 {
    tvls.values().sum()
}
