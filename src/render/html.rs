//! Server-side rendering of the dashboard page
//!
//! The page is a single self-contained document: a sidebar form holding the
//! widget state, metric cards, six Vega-Lite charts embedded with
//! `vega-embed`, and the filtered rows. Every widget change re-submits the
//! form, which reruns the pipeline for the new state.

use crate::charts::Chart;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::filter::{ALL_SENTINEL, FilterOptions, FilterState};
use crate::filter::selection::{END_KEY, START_KEY};
use crate::metrics::{MetricKind, Metrics};
use crate::pipeline::DashboardView;
use crate::schema::Dimension;

const VEGA_SCRIPTS: &str = r#"<script src="https://cdn.jsdelivr.net/npm/vega@5"></script>
    <script src="https://cdn.jsdelivr.net/npm/vega-lite@5"></script>
    <script src="https://cdn.jsdelivr.net/npm/vega-embed@6"></script>"#;

/// Escape text for HTML element content and attribute values
#[must_use]
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render the whole page for one view
pub fn render_page(title: &str, options: &FilterOptions, view: &DashboardView) -> Result<String> {
    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
    {scripts}
</head>
<body>
    <aside class="sidebar">
        {sidebar}
    </aside>
    <main>
        <h1>🚗 {title}</h1>
        {metrics}
        {charts}
        {table}
    </main>
</body>
</html>"#,
        title = escape_html(title),
        css = inline_css(),
        scripts = VEGA_SCRIPTS,
        sidebar = render_sidebar(options, &view.filters),
        metrics = render_metrics(&view.metrics),
        charts = render_charts(&view.charts)?,
        table = render_table(&view.table)?,
    ))
}

fn render_sidebar(options: &FilterOptions, filters: &FilterState) -> String {
    let (min, max) = options
        .date_bounds
        .map(|(min, max)| (min.to_string(), max.to_string()))
        .unwrap_or_default();

    let dates: String = [
        ("Start Date", START_KEY, filters.start_date),
        ("End Date", END_KEY, filters.end_date),
    ]
    .into_iter()
    .map(|(label, key, value)| {
        format!(
            r#"<label>{label}<input type="date" name="{key}" value="{value}" min="{min}" max="{max}" onchange="this.form.submit()"></label>"#,
        )
    })
    .collect();

    let selects: String = Dimension::ALL
        .into_iter()
        .filter_map(|dimension| {
            options
                .values(dimension)
                .map(|values| render_select(dimension, values, filters))
        })
        .collect();

    let query = escape_html(&filters.to_query_string());
    format!(
        r#"<form method="get" action="/" id="filters"><h2>Search Filters</h2>{dates}{selects}</form>
        <p class="links"><a href="/?{query}">Link to this view</a> · <a href="/api/view?{query}">JSON</a></p>"#
    )
}

fn render_select(dimension: Dimension, values: &[String], filters: &FilterState) -> String {
    let selection = filters.selection(dimension);
    let choices: String = std::iter::once(ALL_SENTINEL)
        .chain(values.iter().map(String::as_str))
        .map(|value| {
            format!(
                r#"<option value="{v}"{selected}>{v}</option>"#,
                v = escape_html(value),
                selected = if selection.is_selected(value) { " selected" } else { "" },
            )
        })
        .collect();

    format!(
        r#"<label>{label}<select name="{name}" multiple size="6" onchange="this.form.submit()">{choices}</select></label>"#,
        label = dimension.label(),
        name = dimension.column(),
    )
}

fn render_card(kind: MetricKind, metrics: &Metrics) -> String {
    let value = metrics
        .get(kind)
        .map_or_else(|| "-".to_string(), |count| count.to_string());
    format!(
        r#"<div class="{class}"><span class="metric-value">{value}</span><span class="metric-label">{icon} {label}</span></div>"#,
        class = kind.tone().css_class(),
        icon = kind.icon(),
        label = kind.label(),
    )
}

fn render_metrics(metrics: &Metrics) -> String {
    let summary: String = MetricKind::SUMMARY
        .into_iter()
        .map(|kind| render_card(kind, metrics))
        .collect();
    let status: String = MetricKind::STATUS
        .into_iter()
        .map(|kind| render_card(kind, metrics))
        .collect();

    format!(
        r#"<div class="metric-container">{summary}</div>
        <div class="divider"></div>
        <div class="metric-container">{status}</div>
        <div class="divider"></div>"#
    )
}

/// Chart JSON placed inside a `<script>` element
fn script_safe_json(chart: &Chart) -> Result<String> {
    Ok(serde_json::to_string(&chart.spec)?.replace("</", "<\\/"))
}

fn render_charts(charts: &[Chart]) -> Result<String> {
    let cells: String = charts
        .iter()
        .enumerate()
        .map(|(idx, chart)| {
            format!(
                r#"<section class="chart-cell"><h3>{heading}</h3><div id="chart-{idx}" class="chart"></div></section>"#,
                heading = chart.kind.heading(),
            )
        })
        .collect();

    let scripts = charts
        .iter()
        .enumerate()
        .map(|(idx, chart)| {
            Ok(format!(
                r##"vegaEmbed("#chart-{idx}", {spec}, {{actions: false}});"##,
                spec = script_safe_json(chart)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?
        .join("\n");

    Ok(format!(
        r#"<div class="chart-grid">{cells}</div>
        <script>
{scripts}
        </script>"#
    ))
}

fn render_table(table: &Dataset) -> Result<String> {
    let header: String = table
        .column_names()
        .iter()
        .map(|name| format!("<th>{}</th>", escape_html(name)))
        .collect();

    let body: String = table
        .formatted_rows()?
        .into_iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|cell| format!("<td>{}</td>", escape_html(cell)))
                .collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();

    Ok(format!(
        r#"<section class="data">
            <h3>Filtered Uber Onboarding Data</h3>
            <p class="meta">{rows} rows</p>
            <div class="table-scroll"><table><thead><tr>{header}</tr></thead><tbody>{body}</tbody></table></div>
        </section>"#,
        rows = table.num_rows(),
    ))
}

fn inline_css() -> &'static str {
    r#"
html, body {
    font-family: "Gill Sans", sans-serif;
    margin: 0;
}

body {
    background-color: #f0f2f5;
    display: flex;
}

.sidebar {
    background-color: #fafafa;
    color: #4f8af4;
    width: 280px;
    min-height: 100vh;
    padding: 1rem;
    box-sizing: border-box;
}

.sidebar label {
    display: block;
    margin-bottom: 1rem;
}

.sidebar input, .sidebar select {
    display: block;
    width: 100%;
    margin-top: 0.25rem;
}

main {
    flex: 1;
    padding: 1rem 2rem;
    min-width: 0;
}

h1 {
    color: #ff6347;
}

.metric-card {
    padding: 20px;
    border-radius: 10px;
    color: white;
    text-align: center;
    margin: 10px;
    flex-grow: 1;
    display: flex;
    flex-direction: column;
    justify-content: center;
}

.metric-card.large {
    height: 150px;
    background-color: #4f8af4;
}

.metric-card.blue {
    background-color: #1f77b4;
}

.metric-card.green {
    background-color: #2ca02c;
}

.metric-card.red {
    background-color: #d62728;
}

.metric-value {
    font-size: 36px;
    font-weight: bold;
}

.metric-label {
    font-size: 18px;
}

.metric-container {
    display: flex;
    justify-content: space-around;
    flex-wrap: wrap;
}

.divider {
    border-top: 2px solid #4f8af4;
    margin: 40px 0;
}

.chart-grid {
    display: grid;
    grid-template-columns: repeat(2, minmax(0, 1fr));
    gap: 1.5rem;
}

.chart {
    width: 100%;
}

.table-scroll {
    max-height: 480px;
    overflow: auto;
    background: #ffffff;
}

table {
    border-collapse: collapse;
    width: 100%;
}

th, td {
    padding: 0.4rem 0.75rem;
    border-bottom: 1px solid #e5e7eb;
    text-align: left;
    font-size: 0.875rem;
    white-space: nowrap;
}

thead th {
    position: sticky;
    top: 0;
    background: #f9fafb;
}

.meta {
    color: #6b7280;
}

.links {
    font-size: 0.875rem;
}
"#
}
