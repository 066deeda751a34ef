// ============================================================================
// Module : error
// ============================================================================
// Taxonomie des erreurs de la bibliothèque
//
// CONCEPTS RUST :
// 1. thiserror : dérive Display + std::error::Error sur un enum
// 2. #[from] : conversion automatique avec l'opérateur ?
// 3. Deux niveaux d'erreur :
//    - ShapeError : l'enveloppe JSON n'a pas la forme attendue (échec bruyant)
//    - ApiError : tout ce qui peut faire échouer un appel (transport + forme)
//
// Les valeurs individuelles mal formées ne sont PAS des erreurs : elles sont
// ramenées à 0 par les reducers de `models`.
// ============================================================================

use reqwest::StatusCode;
use thiserror::Error;

/// Attente structurelle non respectée par une réponse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeExpectation {
    /// Un objet JSON non-null
    Object,
    /// Un tableau JSON
    Array,
    /// Un objet JSON contenant une clé sentinelle (ex: "56", "bsc")
    ObjectWithKey(&'static str),
}

impl std::fmt::Display for ShapeExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeExpectation::Object => write!(f, "a JSON object"),
            ShapeExpectation::Array => write!(f, "a JSON array"),
            ShapeExpectation::ObjectWithKey(key) => {
                write!(f, "a JSON object containing key \"{}\"", key)
            }
        }
    }
}

/// La réponse a été parsée en JSON mais n'a pas la forme attendue
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to fetch {endpoint}: expected {expected}")]
pub struct ShapeError {
    /// Chemin de l'endpoint (ex: "tvl")
    pub endpoint: &'static str,

    /// Ce qui était attendu
    pub expected: ShapeExpectation,
}

impl ShapeError {
    pub fn new(endpoint: &'static str, expected: ShapeExpectation) -> Self {
        Self { endpoint, expected }
    }
}

/// Erreur d'un appel à l'API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Enveloppe JSON invalide (pas un objet, pas un tableau, sentinelle absente)
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// Échec réseau ou décodage du corps de la réponse
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Le serveur a répondu avec un statut hors 2xx
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },

    /// Le client HTTP n'a pas pu être construit
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),
}

impl ApiError {
    /// Vrai si l'erreur vient d'une enveloppe JSON mal formée
    pub fn is_shape(&self) -> bool {
        matches!(self, ApiError::Shape(_))
    }
}
