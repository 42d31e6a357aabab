use std::sync::Arc;

use onboard_dash::render::render_page;
use onboard_dash::server::filters_from_query;
use onboard_dash::{Dashboard, DashboardConfig, Dimension, MetricKind, Selection};

use crate::utils::{date, sample_dataset};

fn dashboard() -> onboard_dash::Result<Dashboard> {
    Dashboard::new(Arc::new(sample_dataset()), &DashboardConfig::default())
}

#[test]
fn test_default_view() -> onboard_dash::Result<()> {
    let dashboard = dashboard()?;
    let filters = dashboard.default_filters();
    assert_eq!(filters.start_date, date(2023, 6, 1));
    assert_eq!(filters.end_date, date(2023, 7, 3));

    let view = dashboard.run(&filters)?;
    assert_eq!(view.table.num_rows(), 5);
    assert_eq!(view.charts.len(), 6);
    assert_eq!(view.metrics.get(MetricKind::Drivers), Some(5));
    Ok(())
}

#[test]
fn test_options_come_from_the_unfiltered_table() -> onboard_dash::Result<()> {
    let dashboard = dashboard()?;
    let lagos = dashboard
        .default_filters()
        .with_selection(Dimension::City, Selection::from_values(["Lagos"]));

    let view = dashboard.run(&lagos)?;
    assert_eq!(view.metrics.get(MetricKind::Cities), Some(1));
    assert_eq!(dashboard.options().values(Dimension::City).map(<[_]>::len), Some(3));
    Ok(())
}

#[test]
fn test_query_string_drives_the_pipeline() -> onboard_dash::Result<()> {
    let dashboard = dashboard()?;

    let filters = filters_from_query(
        &dashboard,
        Some("start=2023-06-01&end=2023-06-30&city=Lagos&city=Abuja&type_of_partner=N%2FA"),
    );
    assert!(filters.selection(Dimension::TypeOfPartner).is_selected("N/A"));

    let view = dashboard.run(&filters)?;
    assert_eq!(view.table.num_rows(), 1);

    let defaults = filters_from_query(&dashboard, None);
    assert_eq!(defaults, dashboard.default_filters());
    Ok(())
}

#[test]
fn test_view_json_document() -> onboard_dash::Result<()> {
    let dashboard = dashboard()?;
    let view = dashboard.run(&dashboard.default_filters())?;
    let json = view.to_json()?;

    assert_eq!(json["rows"], 5);
    assert_eq!(json["metrics"]["total_cities"], 2);
    assert_eq!(json["filters"]["start_date"], "2023-06-01");
    assert_eq!(json["charts"][3]["kind"], "partner");
    assert_eq!(json["charts"][3]["spec"]["mark"]["type"], "arc");
    assert_eq!(json["records"][0]["names"], "Driver A");
    Ok(())
}

#[test]
fn test_page_contains_every_section() -> onboard_dash::Result<()> {
    let dashboard = dashboard()?;
    let filters = dashboard
        .default_filters()
        .with_selection(Dimension::City, Selection::from_values(["Lagos"]));
    let view = dashboard.run(&filters)?;

    let page = render_page("Uber Onboarding Analysis", dashboard.options(), &view)?;

    assert!(page.contains("<title>Uber Onboarding Analysis</title>"));
    assert!(page.contains("Select City"));
    assert!(page.contains(r#"<option value="Lagos" selected>Lagos</option>"#));
    assert!(page.contains(r#"<option value="Abuja">Abuja</option>"#));
    assert!(page.contains(r#"<option value="All">All</option>"#));
    assert!(page.contains("Drivers Not Driving"));
    assert_eq!(page.matches("vegaEmbed(").count(), 6);
    assert!(page.contains("Filtered Uber Onboarding Data"));
    assert!(page.contains("<td>Driver A</td>"));
    assert_eq!(page.matches("metric-card large").count(), 3);
    assert!(page.contains("metric-card large blue"));
    assert!(page.contains("metric-card large green"));
    Ok(())
}

#[test]
fn test_page_links_back_to_its_view() -> onboard_dash::Result<()> {
    let dashboard = dashboard()?;
    let filters = dashboard
        .default_filters()
        .with_selection(Dimension::City, Selection::from_values(["Lagos"]));
    let view = dashboard.run(&filters)?;

    let page = render_page("Uber Onboarding Analysis", dashboard.options(), &view)?;
    let query = "start=2023-06-01&amp;end=2023-07-03&amp;city=Lagos";
    assert!(page.contains(&format!(r#"href="/?{query}""#)));
    assert!(page.contains(&format!(r#"href="/api/view?{query}""#)));

    let shared = filters_from_query(&dashboard, Some(filters.to_query_string().as_str()));
    assert_eq!(shared, filters);
    Ok(())
}
