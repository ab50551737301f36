//! Server-rendered pages. Charts are drawn client-side by plotly.js from the figure JSON.

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;
use std::borrow::Cow;
use stockdash_core::view::chart::{ChartSection, Figure};
use stockdash_core::view::profile::{CompanyProfileView, MetricLine};
use stockdash_core::view::screener::ScreenerView;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const BASE_CSS: &str = "\
body {font-family: 'Inter', sans-serif; background: #f5f6fa; margin: 0;}
main {padding-top: 1rem; max-width: 1200px; margin: 0 auto;}
nav a {margin-right: 1rem;}
.card {padding: 1.5rem; border-radius: 16px; box-shadow: 0 4px 12px rgba(0,0,0,0.05); margin-bottom: 1.5rem; background: #fff;}
.section-title {font-size: 1.25rem; font-weight: 600; margin-bottom: 1rem;}
.notice {color: #8a6d3b;}
.error {color: #a94442;}
table {border-collapse: collapse;}
th, td {padding: 0.3rem 0.8rem; border-bottom: 1px solid #e5e5e5; text-align: left;}
";

const HIDE_CHROME_CSS: &str = "header {visibility: hidden;}\nfooter {visibility: hidden;}\n";

/// Presentation settings applied to every page.
#[derive(Debug, Clone)]
pub struct PageStyle {
    pub hide_chrome: bool,
    pub css: String,
}

impl PageStyle {
    pub fn new(hide_chrome: bool) -> Self {
        Self {
            hide_chrome,
            css: BASE_CSS.to_string(),
        }
    }

    fn stylesheet(&self) -> String {
        if self.hide_chrome {
            format!("{HIDE_CHROME_CSS}{}", self.css)
        } else {
            self.css.clone()
        }
    }
}

impl Default for PageStyle {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Element text.
pub fn text(s: &str) -> Cow<'_, str> {
    encode_text(s)
}

/// Value of a double-quoted attribute.
pub fn attr(s: &str) -> Cow<'_, str> {
    encode_double_quoted_attribute(s)
}

/// JSON safe to inline inside a `<script>` element.
fn script_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

fn layout(style: &PageStyle, title: &str, body: &str, with_plotly: bool) -> String {
    let plotly = if with_plotly {
        format!("<script src=\"{PLOTLY_CDN}\"></script>")
    } else {
        String::new()
    };
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} · Stock Screener</title>\n<style>\n{css}</style>\n{plotly}\n</head>\n\
         <body>\n<header></header>\n<main>\n<h1>📊 Stock Screener App</h1>\n\
         <nav><a href=\"/\">Home</a><a href=\"/screener\">Screener</a>\
         <a href=\"/profile\">Company Profile</a><a href=\"/portfolio\">Portfolio</a></nav>\n\
         {body}\n</main>\n<footer></footer>\n</body>\n</html>\n",
        title = text(title),
        css = style.stylesheet(),
    )
}

pub fn home_page(style: &PageStyle) -> String {
    layout(style, "Home", "<h2>Choose a page to start</h2>", false)
}

pub fn portfolio_page(style: &PageStyle) -> String {
    layout(
        style,
        "Portfolio",
        "<div class=\"card\"><p>Portfolio page under construction</p></div>",
        false,
    )
}

fn profile_form(symbol: &str) -> String {
    format!(
        "<div class=\"card\"><div class=\"section-title\">🔍 Company Profile</div>\
         <form method=\"get\" action=\"/profile\">\
         <label>Enter company symbol (e.g., MSFT, AAPL) \
         <input type=\"text\" name=\"symbol\" value=\"{}\"></label> \
         <button type=\"submit\">Load Data</button></form></div>",
        attr(symbol)
    )
}

pub fn profile_search_page(style: &PageStyle) -> String {
    layout(style, "Company Profile", &profile_form(""), false)
}

pub fn profile_error_page(style: &PageStyle, symbol: &str, message: &str) -> String {
    let body = format!(
        "{}<div class=\"card\"><p class=\"error\">Error loading data: {}</p></div>",
        profile_form(symbol),
        text(message)
    );
    layout(style, "Company Profile", &body, false)
}

fn metric_list(lines: &[MetricLine]) -> String {
    let items: String = lines
        .iter()
        .map(|m| {
            format!(
                "<li><strong>{}:</strong> {}</li>",
                text(&m.label),
                text(&m.value)
            )
        })
        .collect();
    format!("<ul>{items}</ul>")
}

fn figure_div(id: &str, figure: &Figure) -> String {
    format!(
        "<div id=\"{id}\"></div>\n<script>Plotly.newPlot(\"{id}\", {}, {});</script>",
        script_json(&figure.data),
        script_json(&figure.layout)
    )
}

fn card(title: &str, inner: &str) -> String {
    format!(
        "<div class=\"card\"><div class=\"section-title\">{}</div>{inner}</div>",
        text(title)
    )
}

pub fn profile_page(style: &PageStyle, view: &CompanyProfileView) -> String {
    let o = &view.overview;
    let overview = format!(
        "<h2>{} ({})</h2>\
         <p><strong>Sector:</strong> {}</p>\
         <p><strong>Industry:</strong> {}</p>\
         <p><strong>Employees:</strong> {}</p>\
         <p><strong>Website:</strong> {}</p>\
         <p>{}</p>",
        text(&o.name),
        text(&o.ticker),
        text(&o.sector),
        text(&o.industry),
        text(&o.employees),
        text(&o.website),
        text(&o.summary),
    );

    let history = match &view.price_chart {
        ChartSection::Figure(fig) => {
            let mut s = figure_div("price-chart", fig);
            if let Some(volume) = &view.volume_chart {
                s.push_str(&figure_div("volume-chart", volume));
            }
            s
        }
        ChartSection::Notice(notice) => format!("<p class=\"notice\">{}</p>", text(notice)),
    };

    let body = [
        profile_form(view.ticker.as_str()),
        card("Overview", &overview),
        card("Key Metrics", &metric_list(&view.key_metrics)),
        card("Price History", &history),
        card(
            "Fundamental Radar",
            &figure_div("radar-chart", &view.radar_chart),
        ),
        card(
            "Financial Health Scores",
            &figure_div("health-chart", &view.health_chart),
        ),
        card("Valuation Ratios", &metric_list(&view.ratios)),
    ]
    .concat();

    layout(style, &o.name, &body, true)
}

fn select(name: &str, label: &str, options: &[String], selected: &str) -> String {
    let opts: String = options
        .iter()
        .map(|o| {
            let sel = if o == selected { " selected" } else { "" };
            format!("<option value=\"{}\"{sel}>{}</option>", attr(o), text(o))
        })
        .collect();
    format!(
        "<label>{} <select name=\"{}\">{opts}</select></label><br>",
        text(label),
        attr(name)
    )
}

pub fn screener_page(style: &PageStyle, view: &ScreenerView) -> String {
    let ratings: String = view
        .ratings
        .iter()
        .map(|r| {
            let options: Vec<String> = r.options.iter().map(u8::to_string).collect();
            select(&r.key, &r.label, &options, &r.selected.to_string())
        })
        .collect();
    let filters: String = view
        .filters
        .iter()
        .map(|f| select(&f.key, &f.label, &f.options, &f.selected))
        .collect();

    let form = format!(
        "<form method=\"get\" action=\"/screener\">\
         {}{}\
         <button type=\"submit\">Apply</button> \
         <button type=\"submit\" formmethod=\"post\" formaction=\"/screener/advanced\">Advanced Filters</button>\
         </form>",
        card("Ratings", &ratings),
        card("Filters", &filters),
    );

    let message = view
        .message
        .as_deref()
        .map(|m| format!("<p class=\"notice\">{}</p>", text(m)))
        .unwrap_or_default();

    let results = match &view.notice {
        Some(notice) => format!("<p class=\"notice\">{}</p>", text(notice)),
        None => {
            let header: String = std::iter::once("Company".to_string())
                .chain(view.ratings.iter().map(|r| r.label.clone()))
                .map(|h| format!("<th>{}</th>", text(&h)))
                .collect();
            let rows: String = view
                .rows
                .iter()
                .map(|row| {
                    let cells: String = [
                        row.valuation,
                        row.growth,
                        row.profitability,
                        row.balance_sheet,
                        row.dividends,
                        row.management,
                    ]
                    .iter()
                    .map(|v| format!("<td>{v}</td>"))
                    .collect();
                    format!("<tr><td>{}</td>{cells}</tr>", text(&row.company))
                })
                .collect();
            format!("<table><thead><tr>{header}</tr></thead><tbody>{rows}</tbody></table>")
        }
    };

    let body = format!("{form}{message}{}", card("Results", &results));
    layout(style, "Screener", &body, false)
}

pub fn error_page(style: &PageStyle, title: &str, message: &str) -> String {
    let body = format!(
        "<div class=\"card\"><p class=\"error\">{}</p></div>",
        text(message)
    );
    layout(style, title, &body, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockdash_core::screener::ScreenerSession;
    use stockdash_core::view::screener::render_screener;

    #[test]
    fn escape_handles_markup() {
        assert_eq!(text("<b>&</b>"), "&lt;b&gt;&amp;&lt;/b&gt;");

        let quoted = attr("\"><script>");
        assert!(!quoted.contains('"'));
        assert!(!quoted.contains('<'));
        assert!(quoted.contains("&quot;"));
    }

    #[test]
    fn profile_form_keeps_symbol_inside_the_attribute() {
        let html = profile_error_page(&PageStyle::default(), "\"><b>x", "bad");
        assert!(html.contains("value=\"&quot;&gt;&lt;b&gt;x\""));
    }

    #[test]
    fn script_json_cannot_close_the_script() {
        let s = script_json(&serde_json::json!({"name": "</script><b>"}));
        assert!(!s.contains("</script>"));
    }

    #[test]
    fn chrome_hiding_is_optional() {
        assert!(home_page(&PageStyle::new(true)).contains("header {visibility: hidden;}"));
        assert!(!home_page(&PageStyle::new(false)).contains("visibility: hidden"));
    }

    #[test]
    fn screener_page_marks_selection() {
        let mut session = ScreenerSession::default();
        session.thresholds.growth = 4;
        session.country = "UK".to_string();
        let html = screener_page(&PageStyle::default(), &render_screener(&session));
        assert!(html.contains("<option value=\"UK\" selected>UK</option>"));
        assert!(html.contains("<td>Tesla</td>"));
        assert!(!html.contains("<td>Coca-Cola</td>"));
    }
}
