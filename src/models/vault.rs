// ============================================================================
// Structures : VaultRecord et VaultWithApy
// ============================================================================
// Métadonnées d'un vault, puis jointure avec son APY
//
// CONCEPTS RUST :
// 1. Construction pure : on ne modifie jamais le JSON d'entrée, on consomme
//    la Map et on construit un nouvel enregistrement
// 2. #[serde(flatten)] : les champs libres du vault sont ré-émis au même
//    niveau que vaultId lors de la sérialisation
// 3. Ownership : join_vaults_with_apy consomme les vaults (move) et
//    emprunte les APY (&ApyMap)
// ============================================================================

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::api::Endpoint;
use crate::error::ShapeError;
use crate::models::apy::{ApyMap, ApyRecord};
use crate::models::shape::expect_array;

/// Métadonnées d'un vault, indexées par son identifiant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultRecord {
    /// Identifiant (ancien champ `id`)
    pub vault_id: String,

    /// Tous les autres champs renvoyés par l'API, sans `id`
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl VaultRecord {
    /// Construit un VaultRecord depuis une entrée du tableau `vaults`
    ///
    /// Retourne None si l'entrée n'est pas un objet ou n'a pas d'`id`
    /// utilisable (chaîne, ou nombre converti en chaîne).
    pub fn from_json(value: Value) -> Option<Self> {
        let Value::Object(mut fields) = value else {
            return None;
        };

        let vault_id = match fields.shift_remove("id")? {
            Value::String(id) => id,
            Value::Number(id) => id.to_string(),
            _ => return None,
        };

        // vaultId est réservé à l'identifiant extrait
        fields.shift_remove("vaultId");

        Some(Self { vault_id, fields })
    }
}

/// Vaults par identifiant
pub type VaultMap = HashMap<String, VaultRecord>;

/// Réduit une réponse `vaults` en VaultMap
pub fn parse_vaults(data: Value) -> Result<VaultMap, ShapeError> {
    let items = expect_array(Endpoint::Vaults, data)?;

    let mut vaults = VaultMap::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match VaultRecord::from_json(item) {
            Some(vault) => {
                vaults.insert(vault.vault_id.clone(), vault);
            }
            None => warn!(index, "Skipping vault entry without a usable id"),
        }
    }

    Ok(vaults)
}

/// Vault enrichi de son APY et de son rendement journalier
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultWithApy {
    pub vault_id: String,

    /// Champs du vault qui ne sont pas écrasés par l'APY
    #[serde(flatten)]
    pub fields: Map<String, Value>,

    /// Champs APY (prioritaires sur ceux du vault)
    #[serde(flatten)]
    pub apy: ApyRecord,

    /// (tradingApr + vaultApr) / 365
    pub total_daily: f64,
}

impl VaultWithApy {
    /// Fusionne un vault et son APY
    pub fn new(vault: VaultRecord, mut apy: ApyRecord) -> Self {
        apy.extra.shift_remove("vaultId");
        apy.extra.shift_remove("totalDaily");

        let mut fields = vault.fields;
        for name in apy.field_names() {
            fields.shift_remove(name);
        }
        fields.shift_remove("totalDaily");

        let total_daily = apy.total_daily();

        Self {
            vault_id: vault.vault_id,
            fields,
            apy,
            total_daily,
        }
    }
}

/// Joint chaque vault à son APY ; un vault sans APY reçoit totalApy = 0
pub fn join_vaults_with_apy(vaults: VaultMap, apys: &ApyMap) -> HashMap<String, VaultWithApy> {
    vaults
        .into_iter()
        .map(|(id, vault)| {
            let apy = apys.get(&id).cloned().unwrap_or_else(ApyRecord::zero);
            (id, VaultWithApy::new(vault, apy))
        })
        .collect()
}
