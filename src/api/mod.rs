// ============================================================================
// Module : api
// ============================================================================
// Ce module contient le client HTTP de l'API Beefy Finance et le catalogue
// de ses endpoints
// ============================================================================

pub mod beefy;     // Client API Beefy
pub mod endpoint;  // Chemins et clés sentinelles

// Re-export des éléments principaux
pub use beefy::{build_api_url, cache_buster, current_cache_buster, BeefyClient};
pub use endpoint::Endpoint;
