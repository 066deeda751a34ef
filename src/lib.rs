// ============================================================================
// BeefyWallet - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // Client API Beefy Finance
pub mod config;    // Configuration du client
pub mod error;     // Erreurs typées
pub mod models;    // Structures de données normalisées

pub use api::BeefyClient;
pub use config::ClientConfig;
pub use error::{ApiError, ShapeError};
