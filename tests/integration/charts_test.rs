use onboard_dash::charts::{
    AggregateKey, Channel, ChartConfig, ChartKind, Granularity, city_chart,
    date_distribution_chart, partner_chart, weekly_trend_chart,
};
use onboard_dash::{FilterState, apply_filters, build_charts};

use crate::utils::{dataset_from_columns, date, sample_dataset};

fn text(key: &str) -> AggregateKey {
    AggregateKey::Text(key.to_string())
}

#[test]
fn test_empty_table_gives_empty_aggregations() -> onboard_dash::Result<()> {
    let dataset = sample_dataset();
    let empty = apply_filters(&dataset, &FilterState::new(date(2023, 6, 2), date(2023, 6, 1)))?;

    let charts = build_charts(&empty, date(2023, 6, 2), date(2023, 6, 1), &ChartConfig::default())?;
    assert_eq!(charts.len(), 6);
    assert!(charts.iter().all(|chart| chart.aggregation.is_empty()));
    assert_eq!(
        charts.iter().map(|chart| chart.kind).collect::<Vec<_>>(),
        ChartKind::ALL.to_vec()
    );
    Ok(())
}

#[test]
fn test_distribution_orders_by_count_then_key() -> onboard_dash::Result<()> {
    let chart = city_chart(&sample_dataset(), &ChartConfig::default())?;

    let rows: Vec<_> = chart
        .aggregation
        .rows
        .iter()
        .map(|row| (row.key.to_string(), row.count))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Lagos".to_string(), 3),
            ("Abuja".to_string(), 2),
            ("Ibadan".to_string(), 1),
        ]
    );

    let tied = dataset_from_columns(&[("city", vec![Some("b"), Some("a"), Some("c"), Some("a")])]);
    let chart = city_chart(&tied, &ChartConfig::default())?;
    let keys: Vec<_> = chart.aggregation.rows.iter().map(|row| row.key.to_string()).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
    Ok(())
}

#[test]
fn test_partner_percentages_sum_to_hundred() -> onboard_dash::Result<()> {
    let chart = partner_chart(&sample_dataset(), &ChartConfig::default())?;

    let total: f64 = chart
        .aggregation
        .rows
        .iter()
        .filter_map(|row| row.percentage)
        .sum();
    assert!((total - 100.0).abs() < 1e-9);
    assert_eq!(chart.aggregation.count_of(&text("Fleet")), Some(3));

    let doc = chart.spec.to_vega_lite();
    assert_eq!(doc["mark"]["type"], "arc");
    assert_eq!(doc["encoding"]["tooltip"][2]["format"], ".1f");
    assert_eq!(doc["encoding"]["tooltip"][0]["title"], "Type of Partner");
    Ok(())
}

#[test]
fn test_weekly_trend_is_in_week_order() -> onboard_dash::Result<()> {
    let dataset = dataset_from_columns(&[(
        "new_week",
        vec![Some("10"), Some("9"), Some("10"), Some("27"), None],
    )]);
    let chart = weekly_trend_chart(&dataset, &ChartConfig::default())?;

    let rows: Vec<_> = chart
        .aggregation
        .rows
        .iter()
        .map(|row| (row.key.clone(), row.count))
        .collect();
    assert_eq!(
        rows,
        vec![
            (AggregateKey::Integer(9), 1),
            (AggregateKey::Integer(10), 2),
            (AggregateKey::Integer(27), 1),
        ]
    );
    assert_eq!(chart.spec.to_vega_lite()["mark"]["point"], true);
    Ok(())
}

#[test]
fn test_date_distribution_by_month() -> onboard_dash::Result<()> {
    let chart = date_distribution_chart(
        &sample_dataset(),
        date(2023, 6, 1),
        date(2023, 7, 3),
        &ChartConfig::default(),
    )?;

    assert_eq!(chart.aggregation.field, Granularity::Month.field());
    let rows: Vec<_> = chart
        .aggregation
        .rows
        .iter()
        .map(|row| (row.key.to_string(), row.count))
        .collect();
    assert_eq!(rows, vec![("June".to_string(), 4), ("July".to_string(), 1)]);

    assert_eq!(chart.spec.title, "Monthly Distribution");
    let x_axis = chart.spec.encoding(Channel::X).expect("x encoding");
    assert_eq!(x_axis.sort.as_ref().map(Vec::len), Some(12));
    Ok(())
}

#[test]
fn test_date_distribution_by_year_and_day() -> onboard_dash::Result<()> {
    let dataset = dataset_from_columns(&[(
        "date",
        vec![Some("2023-03-05"), Some("2023-03-05"), Some("2024-01-15"), Some("bad")],
    )]);
    let config = ChartConfig::default();

    let yearly = date_distribution_chart(&dataset, date(2023, 1, 1), date(2024, 1, 15), &config)?;
    assert_eq!(yearly.aggregation.count_of(&AggregateKey::Integer(2023)), Some(2));
    assert_eq!(yearly.aggregation.count_of(&AggregateKey::Integer(2024)), Some(1));
    assert_eq!(yearly.spec.title, "Yearly Distribution");

    let daily = date_distribution_chart(&dataset, date(2023, 3, 5), date(2023, 3, 20), &config)?;
    assert_eq!(daily.spec.title, "Daily Distribution");
    assert_eq!(daily.aggregation.field, "day");
    assert_eq!(daily.aggregation.count_of(&AggregateKey::Integer(5)), Some(2));
    assert_eq!(daily.aggregation.total(), 3);
    Ok(())
}

#[test]
fn test_chart_data_matches_aggregation() -> onboard_dash::Result<()> {
    let config = ChartConfig {
        use_container_width: false,
        width: 480,
        ..ChartConfig::default()
    };
    let chart = city_chart(&sample_dataset(), &config)?;
    let doc = chart.spec.to_vega_lite();

    assert_eq!(doc["width"], 480);
    assert_eq!(doc["data"]["values"][0]["city"], "Lagos");
    assert_eq!(doc["data"]["values"][0]["count"], 3);
    assert_eq!(doc["encoding"]["x"]["title"], "City");
    assert_eq!(doc["encoding"]["y"]["title"], "Count");
    Ok(())
}
