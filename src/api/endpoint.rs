// ============================================================================
// Endpoints de l'API Beefy
// ============================================================================
// Catalogue des chemins interrogés par le client
//
// CONCEPT RUST : Enum Copy comme catalogue
// - Chaque variante connaît son chemin et son éventuelle clé sentinelle
// - Le compilateur force à couvrir tous les endpoints dans les match
// ============================================================================

use std::fmt;

/// Endpoint interrogé sur l'API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Prix des tokens simples
    Prices,
    /// Prix des LP tokens
    Lps,
    /// Détail des APY par vault
    ApyBreakdown,
    /// Liste des vaults
    Vaults,
    /// TVL par chain puis par vault
    Tvl,
    /// Statistiques de rachat de BIFI
    Buyback,
}

impl Endpoint {
    /// Chemin relatif à l'URL de base (sans slash initial)
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Prices => "prices",
            Endpoint::Lps => "lps",
            Endpoint::ApyBreakdown => "apy/breakdown",
            Endpoint::Vaults => "vaults",
            Endpoint::Tvl => "tvl",
            Endpoint::Buyback => "bifibuyback",
        }
    }

    /// Clé qui doit être présente dans la réponse pour la considérer valide
    ///
    /// Les réponses TVL et buyback sont indexées par chain : l'absence de
    /// la chain BSC signifie que l'API a renvoyé quelque chose d'incomplet.
    pub fn sentinel(&self) -> Option<&'static str> {
        match self {
            Endpoint::Tvl => Some("56"),
            Endpoint::Buyback => Some("bsc"),
            _ => None,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
