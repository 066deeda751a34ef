// ============================================================================
// Module : config
// ============================================================================
// Configuration du client HTTP Beefy
//
// La bibliothèque ne lit aucune variable d'environnement : c'est l'appelant
// (le binaire, un test) qui construit la configuration.
// ============================================================================

/// URL de base de l'API publique Beefy
pub const DEFAULT_BASE_URL: &str = "https://api.beefy.finance";

/// Configuration du client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// URL de base, sans slash final (ex: "https://api.beefy.finance")
    pub base_url: String,

    /// User-Agent envoyé avec chaque requête
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Remplace l'URL de base
    ///
    /// CONCEPT RUST : Builder pattern par valeur
    /// - self est consommé puis renvoyé modifié
    /// - Permet de chaîner : ClientConfig::default().with_base_url(...)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Remplace le User-Agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
