// ============================================================================
// Structure : PriceMap
// ============================================================================
// Prix par identifiant de token (ou de LP token)
//
// CONCEPTS RUST :
// 1. Type alias : PriceMap est un HashMap<String, f64>, pas un nouveau type
// 2. Iterators : into_iter().map().collect() construit la map en une passe
// ============================================================================

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use crate::api::Endpoint;
use crate::error::ShapeError;
use crate::models::shape::{expect_object, number_or_zero};

/// Prix par identifiant
pub type PriceMap = HashMap<String, f64>;

/// Réduit une réponse `prices` ou `lps` en PriceMap
///
/// Chaque valeur non numérique devient 0.
pub fn parse_prices(endpoint: Endpoint, data: Value) -> Result<PriceMap, ShapeError> {
    let entries = expect_object(endpoint, data)?;

    let mut coerced = 0;
    let prices: PriceMap = entries
        .into_iter()
        .map(|(id, value)| {
            if !value.is_number() {
                coerced += 1;
            }
            (id, number_or_zero(&value))
        })
        .collect();

    if coerced > 0 {
        warn!(%endpoint, coerced, "Non-numeric prices coerced to 0");
    }

    Ok(prices)
}

/// Fusionne plusieurs PriceMap dans l'ordre donné
///
/// En cas de collision, la dernière map gagne.
pub fn merge_prices<I>(maps: I) -> PriceMap
where
    I: IntoIterator<Item = PriceMap>,
{
    maps.into_iter().fold(PriceMap::new(), |mut merged, map| {
        merged.extend(map);
        merged
    })
}
