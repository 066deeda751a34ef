// ============================================================================
// Structure : Buyback
// ============================================================================
// Rachats de BIFI par chain, depuis la réponse `bifibuyback`
//
// L'API renvoie les montants sous forme de chaînes décimales :
//   { "bsc": { "buybackTokenAmount": "12.5", "buybackUsdAmount": "4100.2" } }
// ============================================================================

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::api::Endpoint;
use crate::error::ShapeError;
use crate::models::shape::expect_object_with_sentinel;

/// Montants rachetés sur une chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Buyback {
    /// Quantité de BIFI rachetée
    pub tokens: f64,

    /// Valeur en USD
    pub usd: f64,
}

impl Buyback {
    fn from_json(chain: &str, value: &Value) -> Self {
        let Value::Object(fields) = value else {
            warn!(%chain, "Buyback entry is not an object, using zeros");
            return Self::default();
        };

        Self {
            tokens: parse_decimal(chain, fields.get("buybackTokenAmount")),
            usd: parse_decimal(chain, fields.get("buybackUsdAmount")),
        }
    }
}

/// Rachats par identifiant de chain
pub type BuybackMap = HashMap<String, Buyback>;

/// Réduit une réponse `bifibuyback` en BuybackMap
///
/// Exige la présence de la chain "bsc".
pub fn parse_buyback(data: Value) -> Result<BuybackMap, ShapeError> {
    let chains = expect_object_with_sentinel(Endpoint::Buyback, data)?;

    Ok(chains
        .iter()
        .map(|(chain, value)| (chain.clone(), Buyback::from_json(chain, value)))
        .collect())
}

/// Parse un montant décimal (chaîne ou nombre JSON)
///
/// Une valeur absente, illisible ou non finie vaut 0.
fn parse_decimal(chain: &str, value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::String(raw)) => parse_leading_decimal(raw),
        Some(Value::Number(number)) => number.as_f64(),
        _ => None,
    };

    match parsed.filter(|amount| amount.is_finite()) {
        Some(amount) => amount,
        None => {
            warn!(%chain, raw = ?value, "Unparsable buyback amount, using 0");
            0.0
        }
    }
}

/// Parse le plus long préfixe décimal d'une chaîne ("12.5 BIFI" -> 12.5)
///
/// Syntaxe acceptée : espaces initiaux, signe, chiffres, partie décimale,
/// exposant. Il faut au moins un chiffre avant l'exposant.
fn parse_leading_decimal(raw: &str) -> Option<f64> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();

    let count_digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|byte| byte.is_ascii_digit())
            .count()
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let integer_digits = count_digits(end);
    end += integer_digits;

    let mut fraction_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction_digits = count_digits(end + 1);
        if integer_digits > 0 || fraction_digits > 0 {
            end += 1 + fraction_digits;
        }
    }

    if integer_digits == 0 && fraction_digits == 0 {
        return None;
    }

    // L'exposant n'est pris que s'il est complet ("1e" -> 1)
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+' | b'-')) {
            exponent_end += 1;
        }
        let exponent_digits = count_digits(exponent_end);
        if exponent_digits > 0 {
            end = exponent_end + exponent_digits;
        }
    }

    text[..end].parse::<f64>().ok()
}
