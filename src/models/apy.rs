// ============================================================================
// Structure : ApyRecord
// ============================================================================
// Détail du rendement d'un vault, tel que renvoyé par `apy/breakdown`
//
// CONCEPTS RUST :
// 1. Option<f64> : distingue "champ absent" de "champ à 0"
// 2. #[serde(flatten)] : les champs inconnus sont conservés tels quels
// 3. Constructeur fallible : from_json renvoie None si la forme est invalide
//
// CONCEPT FINANCE : APY vs APR
// - APY : rendement annuel avec capitalisation
// - APR : taux annuel sans capitalisation
// - Le rendement journalier se calcule à partir d'APR : (tradingApr + vaultApr) / 365
// ============================================================================

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::api::Endpoint;
use crate::error::ShapeError;
use crate::models::shape::expect_object;

/// Jours par an (convention de capitalisation quotidienne)
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Détail de l'APY d'un vault
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApyRecord {
    /// APY total (0.5 = 50 %)
    pub total_apy: f64,

    /// APR des frais de trading, si fourni
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trading_apr: Option<f64>,

    /// APR du vault, si fourni
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault_apr: Option<f64>,

    /// Autres champs renvoyés par l'API (compoundingsPerYear, beefyPerformanceFee, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApyRecord {
    /// Enregistrement neutre, utilisé pour les entrées invalides ou absentes
    pub fn zero() -> Self {
        Self {
            total_apy: 0.0,
            trading_apr: None,
            vault_apr: None,
            extra: Map::new(),
        }
    }

    /// Construit un ApyRecord si la valeur a la bonne forme
    ///
    /// Forme attendue :
    /// - un objet
    /// - `totalApy` numérique
    /// - `tradingApr` / `vaultApr` absents, numériques ou null (null compte pour 0)
    pub fn from_json(value: Value) -> Option<Self> {
        let Value::Object(mut fields) = value else {
            return None;
        };

        let total_apy = fields.shift_remove("totalApy")?.as_f64()?;
        let trading_apr = take_optional_rate(&mut fields, "tradingApr")?;
        let vault_apr = take_optional_rate(&mut fields, "vaultApr")?;

        Some(Self {
            total_apy,
            trading_apr,
            vault_apr,
            extra: fields,
        })
    }

    /// APR de trading effectif (0 si absent)
    pub fn effective_trading_apr(&self) -> f64 {
        self.trading_apr.unwrap_or(0.0)
    }

    /// APR du vault effectif : la valeur fournie, sinon dérivée de totalApy
    pub fn effective_vault_apr(&self) -> f64 {
        self.vault_apr
            .unwrap_or_else(|| apr_from_apy(self.total_apy))
    }

    /// Rendement journalier : (tradingApr + vaultApr) / 365
    pub fn total_daily(&self) -> f64 {
        (self.effective_trading_apr() + self.effective_vault_apr()) / DAYS_PER_YEAR
    }

    /// Noms JSON des champs portés par cet enregistrement
    pub(crate) fn field_names(&self) -> impl Iterator<Item = &str> {
        let named: [Option<&str>; 3] = [
            Some("totalApy"),
            self.trading_apr.map(|_| "tradingApr"),
            self.vault_apr.map(|_| "vaultApr"),
        ];
        named
            .into_iter()
            .flatten()
            .chain(self.extra.keys().map(String::as_str))
    }
}

/// Extrait un taux optionnel
///
/// - Some(None) : clé absente
/// - Some(Some(x)) : nombre, ou 0 pour null
/// - None : présent mais pas un nombre (forme invalide)
fn take_optional_rate(fields: &mut Map<String, Value>, key: &str) -> Option<Option<f64>> {
    match fields.shift_remove(key) {
        None => Some(None),
        Some(Value::Null) => Some(Some(0.0)),
        Some(value) => value.as_f64().map(Some),
    }
}

/// Convertit un APY (capitalisé) en APR à capitalisation quotidienne
///
/// `((apy + 1) ^ (1/365) - 1) * 365`. Un APY inférieur à -100 % n'a pas de
/// racine réelle : le résultat est alors ramené à 0.
pub fn apr_from_apy(total_apy: f64) -> f64 {
    let apr = ((total_apy + 1.0).powf(1.0 / DAYS_PER_YEAR) - 1.0) * DAYS_PER_YEAR;
    if apr.is_finite() {
        apr
    } else {
        0.0
    }
}

/// APY par identifiant de vault
pub type ApyMap = HashMap<String, ApyRecord>;

/// Réduit une réponse `apy/breakdown` en ApyMap
pub fn parse_apy_breakdown(data: Value) -> Result<ApyMap, ShapeError> {
    let entries = expect_object(Endpoint::ApyBreakdown, data)?;

    let apys = entries
        .into_iter()
        .map(|(vault_id, value)| {
            let record = ApyRecord::from_json(value).unwrap_or_else(|| {
                warn!(vault = %vault_id, "Malformed APY entry, using totalApy = 0");
                ApyRecord::zero()
            });
            (vault_id, record)
        })
        .collect();

    Ok(apys)
}
