// ============================================================================
// Validation de forme
// ============================================================================
// Vérifications structurelles sur le JSON brut, avant toute réduction
//
// CONCEPT : Enveloppe vs valeurs
// - L'enveloppe fausse (pas un objet, pas un tableau, sentinelle absente)
//   fait échouer l'appel avec ShapeError
// - Une valeur isolée fausse est ramenée à 0 par number_or_zero
// ============================================================================

use serde_json::{Map, Value};

use crate::api::Endpoint;
use crate::error::{ShapeError, ShapeExpectation};

/// Exige un objet JSON et le consomme
pub(crate) fn expect_object(
    endpoint: Endpoint,
    data: Value,
) -> Result<Map<String, Value>, ShapeError> {
    match data {
        Value::Object(map) => Ok(map),
        _ => Err(ShapeError::new(endpoint.path(), ShapeExpectation::Object)),
    }
}

/// Exige un objet JSON contenant la clé sentinelle de l'endpoint
pub(crate) fn expect_object_with_sentinel(
    endpoint: Endpoint,
    data: Value,
) -> Result<Map<String, Value>, ShapeError> {
    let map = expect_object(endpoint, data)?;

    match endpoint.sentinel() {
        Some(key) if !map.contains_key(key) => Err(ShapeError::new(
            endpoint.path(),
            ShapeExpectation::ObjectWithKey(key),
        )),
        _ => Ok(map),
    }
}

/// Exige un tableau JSON et le consomme
pub(crate) fn expect_array(endpoint: Endpoint, data: Value) -> Result<Vec<Value>, ShapeError> {
    match data {
        Value::Array(items) => Ok(items),
        _ => Err(ShapeError::new(endpoint.path(), ShapeExpectation::Array)),
    }
}

/// Nombre JSON fini, sinon 0
pub(crate) fn number_or_zero(value: &Value) -> f64 {
    value
        .as_f64()
        .filter(|number| number.is_finite())
        .unwrap_or(0.0)
}
