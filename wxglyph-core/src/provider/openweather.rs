use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::{fmt, time::Duration};

use crate::{
    Config,
    classifier::classify,
    config::API_KEY_ENV,
    error::FetchError,
    model::{WeatherQuery, WeatherResult},
};

use super::WeatherProvider;

pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    endpoint: Url,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self> {
        Ok(Self {
            api_key,
            endpoint: Url::parse(DEFAULT_ENDPOINT).context("Invalid default OpenWeather endpoint")?,
            http: Client::new(),
        })
    }

    /// Key from `WXGLYPH_API_KEY` or the config file.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::from_config_with_env(config, std::env::var(API_KEY_ENV).ok())
    }

    pub fn from_config_with_env(config: &Config, env_key: Option<String>) -> Result<Self> {
        let mut provider = Self::new(config.resolve_api_key_with(env_key)?)?;

        if let Some(endpoint) = &config.endpoint {
            provider = provider.with_endpoint(endpoint)?;
        }
        if let Some(timeout) = config.timeout() {
            provider = provider.with_timeout(timeout)?;
        }

        Ok(provider)
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid OpenWeather endpoint: {endpoint}"))?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(self)
    }

    /// `{endpoint}?q={city}&appid={key}`. No units are requested, so the
    /// temperature comes back in Kelvin.
    pub fn request_url(&self, city: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", city)
            .append_pair("appid", &self.api_key);
        url
    }

    async fn fetch_current(&self, city: &str) -> Result<WeatherResult, FetchError> {
        tracing::info!(city, endpoint = %self.endpoint, "requesting current weather");

        let res = self
            .http
            .get(self.request_url(city))
            .send()
            .await
            .map_err(FetchError::from_transport)?;

        let status = res.status();
        tracing::debug!(%status, "OpenWeather responded");

        if let Err(err) = res.error_for_status_ref() {
            return Err(FetchError::from_transport(err));
        }
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                code: status.as_u16(),
                raw: format!("HTTP status {status}"),
            });
        }

        let body = res.text().await.map_err(FetchError::from_transport)?;
        parse_current(&body)
    }
}

impl fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, query: &WeatherQuery) -> Result<WeatherResult, FetchError> {
        self.fetch_current(&query.city).await
    }
}

/// `cod` is numeric on success but some error bodies send it as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwCod {
    Number(i64),
    Text(String),
}

impl OwCod {
    fn is_ok(&self) -> bool {
        match self {
            OwCod::Number(n) => *n == 200,
            OwCod::Text(s) => s.trim() == "200",
        }
    }
}

impl fmt::Display for OwCod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwCod::Number(n) => write!(f, "{n}"),
            OwCod::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: i64,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    cod: OwCod,
    #[serde(default)]
    message: Option<String>,
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

fn parse_current(body: &str) -> Result<WeatherResult, FetchError> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Payload(e.to_string()))?;

    if !parsed.cod.is_ok() {
        return Err(FetchError::ApplicationStatus {
            cod: parsed.cod.to_string(),
            message: parsed.message,
        });
    }

    let main = parsed
        .main
        .ok_or_else(|| FetchError::Payload("missing `main` section".into()))?;
    let weather = parsed
        .weather
        .first()
        .ok_or_else(|| FetchError::Payload("empty `weather` list".into()))?;

    Ok(classify(main.temp, &weather.description, weather.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classifier::GlyphCategory,
        model::Outcome,
        provider::lookup,
    };
    use httpmock::prelude::*;
    use serde_json::json;

    const PATH: &str = "/data/2.5/weather";

    fn provider_for(server: &MockServer) -> OpenWeatherProvider {
        OpenWeatherProvider::new("KEY".into())
            .unwrap()
            .with_endpoint(&server.url(PATH))
            .unwrap()
    }

    async fn lookup_error(provider: &OpenWeatherProvider, city: &str) -> String {
        match lookup(provider, &WeatherQuery::new(city)).await {
            Outcome::Error(err) => err.message(),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn request_url_carries_only_city_and_key() {
        let provider = OpenWeatherProvider::new("SECRET".into()).unwrap();
        let url = provider.request_url("São Paulo");

        assert!(url.as_str().starts_with(DEFAULT_ENDPOINT));
        assert!(url.as_str().contains("q=S%C3%A3o+Paulo"));

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "São Paulo".to_string()),
                ("appid".to_string(), "SECRET".to_string()),
            ]
        );
    }

    #[test]
    fn debug_output_hides_api_key() {
        let provider = OpenWeatherProvider::new("SECRET".into()).unwrap();
        assert!(!format!("{provider:?}").contains("SECRET"));
    }

    #[test]
    fn default_endpoint_is_used_without_override() {
        let provider = OpenWeatherProvider::new("KEY".into()).unwrap();
        assert_eq!(provider.endpoint.as_str(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn from_config_without_any_key_fails() {
        let err = OpenWeatherProvider::from_config_with_env(&Config::default(), None).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn from_config_prefers_env_key() {
        let cfg = Config {
            api_key: Some("FILE_KEY".into()),
            endpoint: None,
            timeout_secs: None,
        };
        let provider =
            OpenWeatherProvider::from_config_with_env(&cfg, Some("ENV_KEY".into())).unwrap();

        let url = provider.request_url("Oslo");
        assert!(url.query_pairs().any(|(k, v)| k == "appid" && v == "ENV_KEY"));
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let err = OpenWeatherProvider::new("KEY".into())
            .unwrap()
            .with_endpoint("not a url")
            .unwrap_err();
        assert!(err.to_string().contains("Invalid OpenWeather endpoint"));
    }

    #[test]
    fn empty_weather_list_is_a_payload_error() {
        let body = json!({"cod": 200, "main": {"temp": 280.0}, "weather": []}).to_string();
        assert!(matches!(parse_current(&body), Err(FetchError::Payload(_))));
    }

    #[test]
    fn string_cod_is_accepted() {
        let body = json!({
            "cod": "200",
            "main": {"temp": 273.15},
            "weather": [{"id": 601, "description": "snow"}]
        })
        .to_string();

        let res = parse_current(&body).unwrap();
        assert_eq!(res.category, GlyphCategory::Snow);
        assert_eq!(res.temperature_label(), "0°C");
    }

    #[tokio::test]
    async fn london_light_rain() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(PATH)
                    .query_param("q", "London")
                    .query_param("appid", "KEY");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "cod": 200,
                        "name": "London",
                        "main": {"temp": 288.15, "humidity": 81},
                        "weather": [{"id": 500, "main": "Rain", "description": "light rain"}]
                    }));
            })
            .await;

        let res = provider_for(&server)
            .current_weather(&WeatherQuery::new("London"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(res.temperature_label(), "15°C");
        assert_eq!(res.category, GlyphCategory::Rain);
        assert_eq!(res.condition, "light rain");
    }

    #[tokio::test]
    async fn not_found_is_reported_once_without_retry() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path(PATH);
                then.status(404)
                    .json_body(json!({"cod": "404", "message": "city not found"}));
            })
            .await;

        let msg = lookup_error(&provider_for(&server), "Atlantis").await;

        mock.assert_hits_async(1).await;
        assert_eq!(msg, "Error: 404 Not Found\nThe requested city could not be found.");
    }

    #[tokio::test]
    async fn server_error_status_is_mapped() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(PATH);
                then.status(502);
            })
            .await;

        let msg = lookup_error(&provider_for(&server), "Paris").await;
        assert_eq!(msg, "Error: 502 Bad Gateway\nInvalid response from the upstream server.");
    }

    #[tokio::test]
    async fn unlisted_status_falls_back_to_unknown_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(PATH);
                then.status(418);
            })
            .await;

        let msg = lookup_error(&provider_for(&server), "Paris").await;
        let (headline, detail) = msg.split_once('\n').unwrap();

        assert!(headline.contains("418"), "{headline}");
        assert!(headline.ends_with(" Unknown Error"));
        assert!(!headline.contains("KEY"));
        assert_eq!(detail, "Please try again later.");
    }

    #[tokio::test]
    async fn application_status_on_http_ok_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(PATH);
                then.status(200)
                    .json_body(json!({"cod": "429", "message": "quota exceeded"}));
            })
            .await;

        let msg = lookup_error(&provider_for(&server), "Rome").await;
        assert_eq!(msg, "Error: 429 Unexpected Response\nquota exceeded");
    }

    #[tokio::test]
    async fn unreachable_host_is_no_internet() {
        let provider = OpenWeatherProvider::new("KEY".into())
            .unwrap()
            .with_endpoint("http://127.0.0.1:1/data/2.5/weather")
            .unwrap();

        let msg = lookup_error(&provider, "Oslo").await;
        assert_eq!(msg, "No Internet\nCheck your internet connection and try again!");
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(PATH);
                then.status(200)
                    .delay(Duration::from_secs(3))
                    .json_body(json!({"cod": 200}));
            })
            .await;

        let provider = provider_for(&server)
            .with_timeout(Duration::from_millis(200))
            .unwrap();

        let msg = lookup_error(&provider, "Lima").await;
        assert_eq!(msg, "Request Timed Out\nThe server took too long to respond.");
    }

    #[tokio::test]
    async fn redirect_loop_is_too_many_redirects() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(PATH);
                then.status(302).header("Location", server.url(PATH));
            })
            .await;

        let msg = lookup_error(&provider_for(&server), "Quito").await;
        assert_eq!(msg, "Too Many Redirects\nCheck the URL and try again.");
    }

    #[tokio::test]
    async fn undecodable_body_is_an_unexpected_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(PATH);
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let msg = lookup_error(&provider_for(&server), "Kyiv").await;
        let (headline, detail) = msg.split_once('\n').unwrap();
        assert_eq!(headline, "An unexpected error occurred:");
        assert!(!detail.is_empty());
    }
}
