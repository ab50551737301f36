use axum::{
    extract::{Form, FromRequest, Path, Query, State},
    http::{header::CONTENT_TYPE, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use stockdash_core::ingest::error::{MarketDataError, MarketDataErrorKind};
use stockdash_core::ingest::provider::MarketDataProvider;
use stockdash_core::ingest::ticker::Ticker;
use stockdash_core::scoring::axis::Axis;
use stockdash_core::scoring::health::HealthScoreSource;
use stockdash_core::screener::ScreenerSession;
use stockdash_core::view::profile::{render_company_profile, CompanyProfileView};
use stockdash_core::view::screener::{activate_advanced_filters, render_screener, ScreenerView};

use crate::html::{self, PageStyle};

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn MarketDataProvider>,
    pub health: Arc<dyn HealthScoreSource>,
    pub style: PageStyle,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(home))
        .route("/portfolio", get(portfolio))
        .route("/profile", get(profile_html))
        .route("/api/profile/:symbol", get(profile_json))
        .route("/screener", get(screener_html))
        .route("/api/screener", get(screener_json))
        .route("/screener/advanced", post(advanced_html))
        .route("/api/screener/advanced", post(advanced_json))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn home(State(state): State<AppState>) -> Html<String> {
    Html(html::home_page(&state.style))
}

async fn portfolio(State(state): State<AppState>) -> Html<String> {
    Html(html::portfolio_page(&state.style))
}

/// A failed request, rendered either as a page or as `{"error": ...}`.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Provider failures map by kind; anything else is an internal error.
    fn from_anyhow(err: &anyhow::Error) -> Self {
        let (status, message) = match err.downcast_ref::<MarketDataError>() {
            Some(e) if e.kind == MarketDataErrorKind::NotFound => {
                (StatusCode::NOT_FOUND, e.user_message())
            }
            Some(e) => (StatusCode::BAD_GATEWAY, e.user_message()),
            None => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };

        if status == StatusCode::NOT_FOUND {
            tracing::info!(error = %err, "lookup returned no data");
        } else {
            sentry_anyhow::capture_anyhow(err);
            tracing::error!(error = %err, %status, "request failed");
        }

        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

async fn lookup(state: &AppState, symbol: &str) -> Result<CompanyProfileView, ApiError> {
    let ticker = Ticker::parse(symbol).map_err(|e| ApiError::bad_request(e.to_string()))?;
    render_company_profile(state.provider.as_ref(), state.health.as_ref(), ticker.as_str())
        .await
        .map_err(|e| ApiError::from_anyhow(&e))
}

#[derive(Debug, Deserialize)]
struct ProfileQuery {
    symbol: Option<String>,
}

async fn profile_html(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
) -> Response {
    let symbol = query.symbol.unwrap_or_default();
    if symbol.trim().is_empty() {
        return Html(html::profile_search_page(&state.style)).into_response();
    }

    match lookup(&state, &symbol).await {
        Ok(view) => Html(html::profile_page(&state.style, &view)).into_response(),
        Err(e) => (
            e.status,
            Html(html::profile_error_page(&state.style, &symbol, &e.message)),
        )
            .into_response(),
    }
}

async fn profile_json(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<CompanyProfileView>, ApiError> {
    lookup(&state, &symbol).await.map(Json)
}

/// Raw screener selections. Absent fields keep the session defaults.
#[derive(Debug, Default, Deserialize)]
struct ScreenerQuery {
    valuation: Option<u8>,
    growth: Option<u8>,
    profitability: Option<u8>,
    balance_sheet: Option<u8>,
    dividends: Option<u8>,
    management: Option<u8>,
    country: Option<String>,
    sector: Option<String>,
    market_cap: Option<String>,
}

impl ScreenerQuery {
    fn into_session(self) -> anyhow::Result<ScreenerSession> {
        let mut session = ScreenerSession::default();
        for (axis, value) in [
            (Axis::Valuation, self.valuation),
            (Axis::Growth, self.growth),
            (Axis::Profitability, self.profitability),
            (Axis::BalanceSheet, self.balance_sheet),
            (Axis::Dividends, self.dividends),
            (Axis::Management, self.management),
        ] {
            if let Some(v) = value {
                session.thresholds.set(axis, v)?;
            }
        }
        if let Some(c) = self.country {
            session.country = c;
        }
        if let Some(s) = self.sector {
            session.sector = s;
        }
        if let Some(m) = self.market_cap {
            session.market_cap = m;
        }
        session.validate()?;
        Ok(session)
    }
}

/// Screener selections from the query string, or from a urlencoded form body on POST.
struct ScreenerParams(ScreenerSession);

#[axum::async_trait]
impl<S> FromRequest<S> for ScreenerParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, ApiError> {
        let query = if has_form_body(&req) {
            let Form(query) = Form::<ScreenerQuery>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            query
        } else {
            let Query(query) = Query::<ScreenerQuery>::try_from_uri(req.uri())
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            query
        };

        query
            .into_session()
            .map(Self)
            .map_err(|e| ApiError::bad_request(e.to_string()))
    }
}

fn has_form_body(req: &axum::extract::Request) -> bool {
    req.method() != Method::GET
        && req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"))
}

fn screener_page(state: &AppState, result: Result<ScreenerView, ApiError>) -> Response {
    match result {
        Ok(view) => Html(html::screener_page(&state.style, &view)).into_response(),
        Err(e) => (
            e.status,
            Html(html::error_page(&state.style, "Screener", &e.message)),
        )
            .into_response(),
    }
}

async fn screener_html(
    State(state): State<AppState>,
    params: Result<ScreenerParams, ApiError>,
) -> Response {
    let result = params.map(|ScreenerParams(s)| render_screener(&s));
    screener_page(&state, result)
}

async fn screener_json(ScreenerParams(session): ScreenerParams) -> Json<ScreenerView> {
    Json(render_screener(&session))
}

async fn advanced_html(
    State(state): State<AppState>,
    params: Result<ScreenerParams, ApiError>,
) -> Response {
    let result = params.map(|ScreenerParams(s)| activate_advanced_filters(&s));
    screener_page(&state, result)
}

async fn advanced_json(ScreenerParams(session): ScreenerParams) -> Json<ScreenerView> {
    Json(activate_advanced_filters(&session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use serde_json::Value;
    use stockdash_core::domain::fundamentals::FundamentalsRecord;
    use stockdash_core::domain::history::{Lookback, PriceBar, PriceHistory};
    use stockdash_core::scoring::health::PlaceholderHealthScores;
    use tower::ServiceExt;

    struct FakeProvider;

    #[async_trait::async_trait]
    impl MarketDataProvider for FakeProvider {
        fn provider_name(&self) -> &'static str {
            "fake"
        }

        async fn fetch_fundamentals(&self, ticker: &Ticker) -> anyhow::Result<FundamentalsRecord> {
            match ticker.as_str() {
                "AAPL" => Ok(serde_json::from_value(json!({
                    "shortName": "Apple Inc.",
                    "trailingPE": 30.0,
                    "profitMargins": 0.25,
                    "currentPrice": 227.5,
                }))?),
                "DOWN" => Err(MarketDataError::new(
                    MarketDataErrorKind::Transport,
                    "DOWN",
                    "quote_summary",
                    "connection refused",
                )
                .into()),
                other => Err(MarketDataError::new(
                    MarketDataErrorKind::NotFound,
                    other,
                    "quote_summary",
                    "Quote not found",
                )
                .into()),
            }
        }

        async fn fetch_history(
            &self,
            _ticker: &Ticker,
            _lookback: Lookback,
        ) -> anyhow::Result<PriceHistory> {
            Ok(PriceHistory::new(vec![PriceBar {
                date: NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
                open: None,
                high: None,
                low: None,
                close: 227.5,
                volume: Some(42),
            }]))
        }
    }

    fn app() -> Router {
        build_router(AppState {
            provider: Arc::new(FakeProvider),
            health: Arc::new(PlaceholderHealthScores),
            style: PageStyle::default(),
        })
    }

    async fn send(method: &str, uri: &str) -> (StatusCode, String) {
        dispatch(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn post_form(uri: &str, form: &str) -> (StatusCode, String) {
        dispatch(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn dispatch(request: Request<Body>) -> (StatusCode, String) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        assert_eq!(send("GET", "/healthz").await, (StatusCode::OK, "ok".to_string()));
    }

    #[tokio::test]
    async fn static_pages_render() {
        let (status, body) = send("GET", "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Choose a page to start"));

        let (_, body) = send("GET", "/portfolio").await;
        assert!(body.contains("Portfolio page under construction"));

        let (status, body) = send("GET", "/profile").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("name=\"symbol\""));
    }

    #[tokio::test]
    async fn profile_json_renders_view() {
        let (status, body) = send("GET", "/api/profile/aapl").await;
        assert_eq!(status, StatusCode::OK);
        let v: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["ticker"], "AAPL");
        assert_eq!(v["overview"]["name"], "Apple Inc.");
        assert_eq!(v["axis_scores"]["valuation"], 2.0);
        assert_eq!(v["price_chart"]["kind"], "figure");
    }

    #[tokio::test]
    async fn profile_html_embeds_charts() {
        let (status, body) = send("GET", "/profile?symbol=AAPL").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Plotly.newPlot(\"radar-chart\""));
        assert!(body.contains("Apple Inc. (AAPL)"));
    }

    #[tokio::test]
    async fn invalid_symbol_is_bad_request() {
        let (status, body) = send("GET", "/api/profile/%24%24%24").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let v: Value = serde_json::from_str(&body).unwrap();
        assert!(v["error"].as_str().unwrap().contains("invalid characters"));
    }

    #[tokio::test]
    async fn unknown_symbol_is_not_found() {
        let (status, body) = send("GET", "/api/profile/ZZZZ").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let v: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["error"], "No data found for symbol ZZZZ");

        let (status, body) = send("GET", "/profile?symbol=ZZZZ").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Error loading data: No data found for symbol ZZZZ"));
    }

    #[tokio::test]
    async fn provider_outage_is_bad_gateway() {
        let (status, _) = send("GET", "/api/profile/DOWN").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn screener_json_honours_thresholds() {
        let (status, body) = send("GET", "/api/screener?profitability=5&country=USA").await;
        assert_eq!(status, StatusCode::OK);
        let v: Value = serde_json::from_str(&body).unwrap();
        let companies: Vec<&str> = v["rows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["company"].as_str().unwrap())
            .collect();
        assert_eq!(companies, vec!["Apple", "Microsoft"]);
        assert_eq!(v["session"]["country"], "USA");
        assert_eq!(v["notice"], Value::Null);
    }

    #[tokio::test]
    async fn screener_empty_result_has_notice() {
        let (_, body) = send("GET", "/api/screener?valuation=5").await;
        let v: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["rows"], json!([]));
        assert_eq!(v["notice"], "No companies match your criteria.");

        let (_, body) = send("GET", "/screener?valuation=5").await;
        assert!(body.contains("No companies match your criteria."));
    }

    #[tokio::test]
    async fn screener_rejects_out_of_range_threshold() {
        let (status, body) = send("GET", "/api/screener?growth=6").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Growth threshold"));

        let (status, _) = send("GET", "/api/screener?sector=Mining").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn advanced_filters_confirm() {
        let (status, body) = send("POST", "/api/screener/advanced").await;
        assert_eq!(status, StatusCode::OK);
        let v: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["message"], "Advanced filters activated!");
        assert_eq!(v["rows"].as_array().unwrap().len(), 7);

        let (_, body) = send("POST", "/screener/advanced?growth=5").await;
        assert!(body.contains("Advanced filters activated!"));
    }

    #[tokio::test]
    async fn advanced_filters_keep_posted_selections() {
        let form = "valuation=0&growth=5&profitability=0&balance_sheet=0&dividends=1\
                    &management=0&country=UK&sector=Finance&market_cap=Mid+Cap";

        let (status, body) = post_form("/screener/advanced", form).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Advanced filters activated!"));
        assert!(body.contains("<option value=\"UK\" selected>UK</option>"));
        assert!(body.contains("<td>Apple</td>"));
        assert!(body.contains("<td>Nvidia</td>"));
        assert!(!body.contains("<td>Tesla</td>"));

        let (status, body) = post_form("/api/screener/advanced", form).await;
        assert_eq!(status, StatusCode::OK);
        let v: Value = serde_json::from_str(&body).unwrap();
        let companies: Vec<&str> = v["rows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["company"].as_str().unwrap())
            .collect();
        assert_eq!(companies, vec!["Apple", "Nvidia"]);
        assert_eq!(v["session"]["market_cap"], "Mid Cap");
        assert_eq!(v["session"]["thresholds"]["growth"], 5);
    }

    #[tokio::test]
    async fn malformed_threshold_is_json_error() {
        for uri in [
            "/api/screener?growth=abc",
            "/api/screener?growth=300",
            "/api/screener?growth=",
        ] {
            let (status, body) = send("GET", uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            let v: Value = serde_json::from_str(&body).unwrap();
            assert!(v["error"].as_str().is_some(), "{uri}");
        }

        let (status, body) = post_form("/api/screener/advanced", "dividends=x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(serde_json::from_str::<Value>(&body).unwrap()["error"].is_string());
    }

    #[tokio::test]
    async fn malformed_threshold_renders_error_page() {
        let (status, body) = send("GET", "/screener?growth=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("class=\"error\""));
    }
}
