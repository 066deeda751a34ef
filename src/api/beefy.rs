// ============================================================================
// API Client : Beefy Finance
// ============================================================================
// Récupère prix, vaults, APY, TVL et rachats depuis l'API Beefy
//
// CONCEPTS RUST AVANCÉS :
// 1. async/await : programmation asynchrone (non-bloquante)
// 2. Result<T, ApiError> : erreurs typées avec thiserror
// 3. tokio::join! : lance deux requêtes en parallèle et attend les deux
// 4. serde_json::Value : le JSON est validé à la main avant réduction
// ============================================================================

use std::collections::HashMap;

use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::api::Endpoint;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::models::{
    join_vaults_with_apy, merge_prices, parse_apy_breakdown, parse_buyback, parse_prices,
    parse_tvls, parse_vaults, total_tvl, ApyMap, BuybackMap, PriceMap, TvlMap, VaultMap,
    VaultWithApy,
};

/// Durée d'une fenêtre de cache buster (1 minute)
const CACHE_BUSTER_WINDOW_MS: i64 = 60 * 1000;

// ============================================================================
// Construction des URLs
// ============================================================================

/// Nombre de minutes entières écoulées depuis l'epoch Unix
///
/// Stable pendant une minute, change à chaque minute : les caches HTTP
/// intermédiaires peuvent servir une réponse au plus une minute.
pub fn cache_buster(now_ms: i64) -> i64 {
    // Division entière : tronque vers zéro
    now_ms / CACHE_BUSTER_WINDOW_MS
}

/// Cache buster pour l'instant présent
pub fn current_cache_buster() -> i64 {
    cache_buster(Utc::now().timestamp_millis())
}

/// Construit l'URL complète d'un endpoint
///
/// Format : `<base>/<path>?_=<cache_buster>`
pub fn build_api_url(base_url: &str, endpoint: Endpoint, cache_buster: i64) -> String {
    format!(
        "{}/{}?_={}",
        base_url.trim_end_matches('/'),
        endpoint.path(),
        cache_buster
    )
}

// ============================================================================
// Client
// ============================================================================

/// Client de l'API Beefy
///
/// CONCEPT RUST : reqwest::Client
/// - Contient un pool de connexions : on le crée une fois et on le réutilise
/// - Aucun état propre à un appel n'est conservé entre deux requêtes
#[derive(Debug, Clone)]
pub struct BeefyClient {
    http_client: Client,
    base_url: String,
}

impl BeefyClient {
    /// Crée un client à partir d'une configuration
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        debug!(base_url = %config.base_url, "Creating HTTP client");
        let http_client = Client::builder()
            .user_agent(config.user_agent)
            .build()
            .map_err(ApiError::ClientBuild)?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL de base utilisée par ce client
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET sur un endpoint, retourne le corps JSON brut
    ///
    /// CONCEPT RUST : #[instrument]
    /// - Ajoute un span avec le chemin de l'endpoint
    /// - Tous les logs de la requête portent ce contexte
    #[instrument(skip(self, endpoint), fields(endpoint = %endpoint))]
    async fn fetch_json(&self, endpoint: Endpoint) -> Result<Value, ApiError> {
        let url = build_api_url(&self.base_url, endpoint, current_cache_buster());
        debug!(url = %url, "Sending HTTP request to Beefy API");

        let response = self.http_client.get(&url).send().await?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            error!(status = %status, "Beefy API returned error status");
            return Err(ApiError::Status {
                endpoint: endpoint.path(),
                status,
            });
        }

        let data = response.json::<Value>().await?;
        Ok(data)
    }

    /// Prix des tokens simples (`prices`)
    pub async fn get_single_prices(&self) -> Result<PriceMap, ApiError> {
        self.get_prices(Endpoint::Prices).await
    }

    /// Prix des LP tokens (`lps`)
    pub async fn get_lp_prices(&self) -> Result<PriceMap, ApiError> {
        self.get_prices(Endpoint::Lps).await
    }

    async fn get_prices(&self, endpoint: Endpoint) -> Result<PriceMap, ApiError> {
        let data = self.fetch_json(endpoint).await?;
        let prices = parse_prices(endpoint, data)?;

        info!(%endpoint, prices = prices.len(), "Successfully fetched prices");
        Ok(prices)
    }

    /// Prix simples et LP fusionnés ; les LP l'emportent en cas de collision
    ///
    /// Les deux requêtes partent en même temps. Si l'une échoue, l'appel
    /// échoue et le résultat de l'autre est abandonné.
    pub async fn get_all_prices(&self) -> Result<PriceMap, ApiError> {
        let (single, lps) = tokio::join!(self.get_single_prices(), self.get_lp_prices());
        Ok(merge_prices([single?, lps?]))
    }

    /// Détail des APY par vault (`apy/breakdown`)
    pub async fn get_apy_breakdown(&self) -> Result<ApyMap, ApiError> {
        let data = self.fetch_json(Endpoint::ApyBreakdown).await?;
        let apys = parse_apy_breakdown(data)?;

        info!(vaults = apys.len(), "Successfully fetched APY breakdown");
        Ok(apys)
    }

    /// Métadonnées des vaults (`vaults`)
    pub async fn get_vaults(&self) -> Result<VaultMap, ApiError> {
        let data = self.fetch_json(Endpoint::Vaults).await?;
        let vaults = parse_vaults(data)?;

        info!(vaults = vaults.len(), "Successfully fetched vaults");
        Ok(vaults)
    }

    /// Vaults joints à leur APY, avec le rendement journalier
    pub async fn get_vaults_with_apy(&self) -> Result<HashMap<String, VaultWithApy>, ApiError> {
        let (vaults, apys) = tokio::join!(self.get_vaults(), self.get_apy_breakdown());
        Ok(join_vaults_with_apy(vaults?, &apys?))
    }

    /// TVL par vault (`tvl`), toutes chains confondues
    pub async fn get_tvls(&self) -> Result<TvlMap, ApiError> {
        let data = self.fetch_json(Endpoint::Tvl).await?;
        let tvls = parse_tvls(data)?;

        info!(vaults = tvls.len(), "Successfully fetched TVL");
        Ok(tvls)
    }

    /// Somme des TVL de tous les vaults
    pub async fn get_total_tvl(&self) -> Result<f64, ApiError> {
        let tvls = self.get_tvls().await?;
        Ok(total_tvl(&tvls))
    }

    /// Rachats de BIFI par chain (`bifibuyback`)
    pub async fn get_buyback(&self) -> Result<BuybackMap, ApiError> {
        let data = self.fetch_json(Endpoint::Buyback).await?;
        let buybacks = parse_buyback(data)?;

        info!(chains = buybacks.len(), "Successfully fetched buyback stats");
        Ok(buybacks)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShapeError;
    use serde_json::json;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Démarre un serveur local qui répond `body` sur `route`
    async fn serve(routes: &[(&str, Value)]) -> MockServer {
        let server = MockServer::start().await;
        for (route, body) in routes {
            Mock::given(method("GET"))
                .and(path(*route))
                .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
                .mount(&server)
                .await;
        }
        server
    }

    fn client_for(server: &MockServer) -> BeefyClient {
        BeefyClient::new(ClientConfig::default().with_base_url(server.uri())).unwrap()
    }

    #[test]
    fn test_cache_buster_stable_within_minute() {
        let start = 1_700_000_040_000; // début d'une minute
        assert_eq!(cache_buster(start), cache_buster(start + 59_999));
        assert_eq!(cache_buster(start + 60_000), cache_buster(start) + 1);
        assert!(cache_buster(start + 120_000) > cache_buster(start + 60_000));
    }

    #[test]
    fn test_build_api_url() {
        let url = build_api_url("https://api.beefy.finance/", Endpoint::ApyBreakdown, 28_333_334);
        assert_eq!(url, "https://api.beefy.finance/apy/breakdown?_=28333334");

        assert_eq!(
            build_api_url("http://x", Endpoint::Tvl, cache_buster(1_700_000_040_000)),
            build_api_url("http://x", Endpoint::Tvl, cache_buster(1_700_000_099_999))
        );
        assert_ne!(
            build_api_url("http://x", Endpoint::Tvl, cache_buster(1_700_000_099_999)),
            build_api_url("http://x", Endpoint::Tvl, cache_buster(1_700_000_100_000))
        );
    }

    /// Comme `serve`, mais chaque réponse arrive après `delay`
    async fn serve_delayed(routes: &[(&str, Value)], delay: Duration) -> MockServer {
        let server = MockServer::start().await;
        for (route, body) in routes {
            Mock::given(method("GET"))
                .and(path(*route))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(body.clone())
                        .set_delay(delay),
                )
                .mount(&server)
                .await;
        }
        server
    }

    #[test]
    fn test_client_base_url_is_normalized() {
        let config = ClientConfig {
            base_url: "http://127.0.0.1:9000/".to_string(),
            ..ClientConfig::default()
        };
        let client = BeefyClient::new(config).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9000");
    }

    #[tokio::test]
    async fn test_request_sends_configured_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tvl"))
            .and(header("user-agent", "dashboard/1.2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"56": {"v1": 1}})))
            .mount(&server)
            .await;

        let config = ClientConfig::default()
            .with_base_url(server.uri())
            .with_user_agent("dashboard/1.2");
        let client = BeefyClient::new(config).unwrap();

        assert_eq!(client.get_total_tvl().await.unwrap(), 1.0);
    }

    #[tokio::test]
    async fn test_request_carries_cache_buster() {
        let server = serve(&[("/prices", json!({"BIFI": 300.0}))]).await;

        let before = current_cache_buster();
        let prices = client_for(&server).get_single_prices().await.unwrap();
        let after = current_cache_buster();
        assert_eq!(prices["BIFI"], 300.0);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let sent: i64 = requests[0]
            .url
            .query_pairs()
            .find(|(key, _)| key == "_")
            .map(|(_, value)| value.parse::<i64>().unwrap())
            .unwrap();
        assert!(before <= sent && sent <= after);
    }

    #[tokio::test]
    async fn test_get_single_prices_coerces() {
        let server = serve(&[("/prices", json!({"a": 1.5, "b": "oops", "c": null}))]).await;

        let prices = client_for(&server).get_single_prices().await.unwrap();

        assert_eq!(prices, PriceMap::from([
            ("a".to_string(), 1.5),
            ("b".to_string(), 0.0),
            ("c".to_string(), 0.0),
        ]));
    }

    #[tokio::test]
    async fn test_get_lp_prices_rejects_null() {
        let server = serve(&[("/lps", Value::Null)]).await;

        let err = client_for(&server).get_lp_prices().await.unwrap_err();

        assert!(err.is_shape());
    }

    #[tokio::test]
    async fn test_get_all_prices_lp_overrides_single() {
        let server = serve(&[
            ("/prices", json!({"BIFI": 300.0, "shared": 1.0})),
            ("/lps", json!({"cake-bnb": 12.0, "shared": 2.0})),
        ])
        .await;
        let client = client_for(&server);

        let all = client.get_all_prices().await.unwrap();
        let expected = merge_prices([
            client.get_single_prices().await.unwrap(),
            client.get_lp_prices().await.unwrap(),
        ]);

        assert_eq!(all, expected);
        assert_eq!(all["shared"], 2.0);
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_get_all_prices_propagates_failure() {
        let server = serve(&[("/prices", json!({"BIFI": 300.0})), ("/lps", json!("down"))]).await;

        let err = client_for(&server).get_all_prices().await.unwrap_err();

        assert!(err.is_shape());
    }

    #[tokio::test]
    async fn test_get_vaults_with_apy() {
        let server = serve(&[
            (
                "/vaults",
                json!([
                    {"id": "v1", "name": "Vault One"},
                    {"id": "v2", "name": "Vault Two"}
                ]),
            ),
            (
                "/apy/breakdown",
                json!({"v1": {"totalApy": 0.1}, "orphan": {"totalApy": 5.0}}),
            ),
        ])
        .await;

        let vaults = client_for(&server).get_vaults_with_apy().await.unwrap();

        assert_eq!(vaults.len(), 2);
        let expected = (1.1f64.powf(1.0 / 365.0) - 1.0) * 365.0 / 365.0;
        assert!((vaults["v1"].total_daily - expected).abs() < 1e-15);
        assert_eq!(vaults["v2"].apy.total_apy, 0.0);
        assert_eq!(vaults["v2"].total_daily, 0.0);
    }

    #[tokio::test]
    async fn test_get_vaults_with_apy_propagates_failure() {
        let server = serve(&[
            ("/vaults", json!([{"id": "v1"}])),
            ("/apy/breakdown", Value::Null),
        ])
        .await;

        let err = client_for(&server).get_vaults_with_apy().await.unwrap_err();

        assert!(err.is_shape());
        assert!(matches!(
            err,
            ApiError::Shape(ShapeError { endpoint: "apy/breakdown", .. })
        ));
    }

    #[tokio::test]
    async fn test_composed_calls_fetch_concurrently() {
        let delay = Duration::from_millis(500);
        let server = serve_delayed(
            &[
                ("/prices", json!({"BIFI": 300.0})),
                ("/lps", json!({"cake-bnb": 12.0})),
                ("/vaults", json!([{"id": "v1"}])),
                ("/apy/breakdown", json!({"v1": {"totalApy": 0.1}})),
            ],
            delay,
        )
        .await;
        let client = client_for(&server);

        // Deux requêtes en série prendraient au moins 2 * delay
        let started = Instant::now();
        let prices = client.get_all_prices().await.unwrap();
        let elapsed = started.elapsed();
        assert_eq!(prices.len(), 2);
        assert!(elapsed >= delay);
        assert!(elapsed < delay * 2, "get_all_prices took {:?}", elapsed);

        let started = Instant::now();
        let vaults = client.get_vaults_with_apy().await.unwrap();
        let elapsed = started.elapsed();
        assert_eq!(vaults.len(), 1);
        assert!(elapsed >= delay);
        assert!(elapsed < delay * 2, "get_vaults_with_apy took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_get_vaults_rejects_object() {
        let server = serve(&[("/vaults", json!({"id": "v1"}))]).await;

        let err = client_for(&server).get_vaults().await.unwrap_err();

        assert!(err.is_shape());
        assert_eq!(err.to_string(), "Failed to fetch vaults: expected a JSON array");
    }

    #[tokio::test]
    async fn test_get_tvls_and_total() {
        let server = serve(&[("/tvl", json!({"56": {"v1": 10, "v2": 5}, "99": {"v1": 20}}))]).await;
        let client = client_for(&server);

        let tvls = client.get_tvls().await.unwrap();
        assert_eq!(tvls["v1"], 20.0);
        assert_eq!(tvls["v2"], 5.0);

        assert_eq!(client.get_total_tvl().await.unwrap(), 25.0);
    }

    #[tokio::test]
    async fn test_get_tvls_requires_sentinel() {
        let server = serve(&[("/tvl", json!({"137": {"v1": 10}}))]).await;

        let err = client_for(&server).get_total_tvl().await.unwrap_err();

        assert!(err.is_shape());
    }

    #[tokio::test]
    async fn test_get_buyback() {
        let server = serve(&[(
            "/bifibuyback",
            json!({"bsc": {"buybackTokenAmount": "1.25", "buybackUsdAmount": "500"}}),
        )])
        .await;

        let buybacks = client_for(&server).get_buyback().await.unwrap();

        assert_eq!(buybacks["bsc"].tokens, 1.25);
        assert_eq!(buybacks["bsc"].usd, 500.0);
    }

    #[tokio::test]
    async fn test_get_buyback_requires_sentinel() {
        let server = serve(&[("/bifibuyback", json!({"polygon": {}}))]).await;

        let err = client_for(&server).get_buyback().await.unwrap_err();

        assert!(err.is_shape());
    }

    #[tokio::test]
    async fn test_error_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tvl"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).get_tvls().await.unwrap_err();

        assert!(matches!(err, ApiError::Status { endpoint: "tvl", .. }));
    }

    #[tokio::test]
    async fn test_malformed_json_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vaults"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).get_vaults().await.unwrap_err();

        assert!(matches!(err, ApiError::Http(_)));
    }
}
