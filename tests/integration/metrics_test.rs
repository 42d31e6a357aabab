use onboard_dash::{FilterState, KeywordMatching, MetricKind, apply_filters, calculate_metrics};

use crate::utils::{dataset_from_columns, date, driving_overlap_dataset, sample_dataset};

#[test]
fn test_driving_overlaps_not_driving() -> onboard_dash::Result<()> {
    let metrics = calculate_metrics(&driving_overlap_dataset(), KeywordMatching::Substring)?;

    assert_eq!(metrics.get(MetricKind::Drivers), Some(100));
    assert_eq!(metrics.get(MetricKind::Driving), Some(100));
    assert_eq!(metrics.get(MetricKind::NotDriving), Some(60));

    let driving = metrics.get(MetricKind::Driving).unwrap_or_default();
    let not_driving = metrics.get(MetricKind::NotDriving).unwrap_or_default();
    assert!(driving + not_driving > metrics.get(MetricKind::Drivers).unwrap_or_default());
    Ok(())
}

#[test]
fn test_exclude_negated_separates_statuses() -> onboard_dash::Result<()> {
    let metrics =
        calculate_metrics(&driving_overlap_dataset(), KeywordMatching::ExcludeNegated)?;

    assert_eq!(metrics.get(MetricKind::Driving), Some(40));
    assert_eq!(metrics.get(MetricKind::NotDriving), Some(60));
    Ok(())
}

#[test]
fn test_sample_counts() -> onboard_dash::Result<()> {
    let metrics = calculate_metrics(&sample_dataset(), KeywordMatching::default())?;

    assert_eq!(metrics.get(MetricKind::Cities), Some(3));
    // Ada, Bola, Chi and the placeholder
    assert_eq!(metrics.get(MetricKind::Onboarders), Some(4));
    assert_eq!(metrics.get(MetricKind::PartnerTypes), Some(3));
    assert_eq!(metrics.get(MetricKind::Drivers), Some(6));
    assert_eq!(metrics.get(MetricKind::Driving), Some(2));
    assert_eq!(metrics.get(MetricKind::NotDriving), Some(1));
    assert_eq!(metrics.get(MetricKind::UploadingDocs), Some(1));
    assert_eq!(metrics.get(MetricKind::TripCompleted), Some(1));
    assert_eq!(metrics.get(MetricKind::RewardsExpired), Some(0));
    assert_eq!(metrics.get(MetricKind::PaymentStopped), Some(0));
    assert_eq!(metrics.get(MetricKind::Invalid), Some(1));
    Ok(())
}

#[test]
fn test_empty_table_gives_zero_metrics() -> onboard_dash::Result<()> {
    let dataset = sample_dataset();
    let empty = apply_filters(&dataset, &FilterState::new(date(2024, 1, 2), date(2024, 1, 1)))?;
    let metrics = calculate_metrics(&empty, KeywordMatching::Substring)?;

    assert_eq!(metrics.len(), 11);
    assert!(metrics.iter().all(|(_, count)| count == 0));
    Ok(())
}

#[test]
fn test_repeated_drivers_count_once() -> onboard_dash::Result<()> {
    let dataset = dataset_from_columns(&[
        ("comment", vec![Some("Driving"), Some("driving again"), Some("Driving"), None]),
        ("names", vec![Some("Ann"), Some("Ann"), None, Some("Ben")]),
    ]);
    let metrics = calculate_metrics(&dataset, KeywordMatching::Substring)?;

    assert_eq!(metrics.get(MetricKind::Drivers), Some(2));
    assert_eq!(metrics.get(MetricKind::Driving), Some(1));
    Ok(())
}

#[test]
fn test_missing_columns_omit_their_metrics() -> onboard_dash::Result<()> {
    let dataset = dataset_from_columns(&[
        ("city", vec![Some("Lagos"), Some("Lagos"), None]),
        ("names", vec![Some("a"), Some("b"), Some("c")]),
    ]);
    let metrics = calculate_metrics(&dataset, KeywordMatching::Substring)?;

    assert_eq!(metrics.get(MetricKind::Cities), Some(1));
    assert_eq!(metrics.get(MetricKind::Drivers), Some(3));
    assert_eq!(metrics.get(MetricKind::Onboarders), None);
    assert_eq!(metrics.get(MetricKind::Driving), None);
    Ok(())
}

#[test]
fn test_metrics_serialize_by_name() -> onboard_dash::Result<()> {
    let metrics = calculate_metrics(&driving_overlap_dataset(), KeywordMatching::Substring)?;
    let json = serde_json::to_value(&metrics)?;

    assert_eq!(json["total_driving"], 100);
    assert_eq!(json["total_not_driving"], 60);
    assert!(json.get("total_cities").is_none());
    Ok(())
}
