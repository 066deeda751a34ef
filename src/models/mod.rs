// ============================================================================
// Module : models
// ============================================================================
// Ce module contient les structures de données normalisées de l'API Beefy
// et les reducers qui les construisent depuis le JSON brut
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : sous-module public (accessible depuis l'extérieur)
// - "mod" : sous-module privé au crate (ici : les validations de forme)
// ============================================================================

pub mod apy;       // ApyRecord, ApyMap
pub mod buyback;   // Buyback, BuybackMap
pub mod price;     // PriceMap
mod shape;         // Validations structurelles partagées
pub mod tvl;       // TvlMap
pub mod vault;     // VaultRecord, VaultWithApy

// Re-export des structures principales pour simplifier les imports
pub use apy::{apr_from_apy, parse_apy_breakdown, ApyMap, ApyRecord};
pub use buyback::{parse_buyback, Buyback, BuybackMap};
pub use price::{merge_prices, parse_prices, PriceMap};
pub use tvl::{parse_tvls, total_tvl, TvlMap};
pub use vault::{join_vaults_with_apy, parse_vaults, VaultMap, VaultRecord, VaultWithApy};
