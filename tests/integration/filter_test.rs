use onboard_dash::filter::BatchFilter;
use onboard_dash::{Dimension, FilterOptions, FilterState, Selection, apply_filters};

use crate::utils::{dataset_from_columns, date, sample_dataset};

#[test]
fn test_options_are_sorted_distinct_values() -> onboard_dash::Result<()> {
    let options = FilterOptions::from_dataset(&sample_dataset())?;

    assert_eq!(
        options.values(Dimension::City),
        Some(["Abuja", "Ibadan", "Lagos"].map(String::from).as_slice())
    );
    assert_eq!(
        options.values(Dimension::TypeOfPartner),
        Some(["Fleet", "Individual", "N/A"].map(String::from).as_slice())
    );
    assert_eq!(options.date_bounds, Some((date(2023, 6, 1), date(2023, 7, 3))));
    Ok(())
}

#[test]
fn test_default_state_keeps_every_dated_row() -> onboard_dash::Result<()> {
    let dataset = sample_dataset();
    let options = FilterOptions::from_dataset(&dataset)?;

    let filtered = apply_filters(&dataset, &FilterState::defaults(&options))?;

    // The row with an unparsable date never falls inside a range
    assert_eq!(filtered.num_rows(), 5);
    Ok(())
}

#[test]
fn test_inverted_range_is_empty_not_an_error() -> onboard_dash::Result<()> {
    let dataset = sample_dataset();
    let state = FilterState::new(date(2023, 7, 1), date(2023, 6, 1));

    let filtered = apply_filters(&dataset, &state)?;
    assert!(filtered.is_empty());
    Ok(())
}

#[test]
fn test_range_bounds_are_inclusive() -> onboard_dash::Result<()> {
    let dataset = sample_dataset();
    let state = FilterState::new(date(2023, 6, 15), date(2023, 6, 15));

    let filtered = apply_filters(&dataset, &state)?;
    assert_eq!(filtered.num_rows(), 1);
    Ok(())
}

#[test]
fn test_all_sentinel_equals_omitting_the_filter() -> onboard_dash::Result<()> {
    let dataset = sample_dataset();
    let options = FilterOptions::from_dataset(&dataset)?;
    let defaults = FilterState::defaults(&options);

    let explicit_all = defaults.clone().with_selection(
        Dimension::City,
        Selection::from_values(["Lagos", "All"]),
    );
    let empty_pick = defaults
        .clone()
        .with_selection(Dimension::Onboarder, Selection::from_values(Vec::<String>::new()));

    let baseline = apply_filters(&dataset, &defaults)?;
    assert_eq!(apply_filters(&dataset, &explicit_all)?.num_rows(), baseline.num_rows());
    assert_eq!(apply_filters(&dataset, &empty_pick)?.num_rows(), baseline.num_rows());
    Ok(())
}

#[test]
fn test_dimensions_are_conjunctive() -> onboard_dash::Result<()> {
    let dataset = sample_dataset();
    let options = FilterOptions::from_dataset(&dataset)?;

    let lagos = FilterState::defaults(&options)
        .with_selection(Dimension::City, Selection::from_values(["Lagos"]));
    assert_eq!(apply_filters(&dataset, &lagos)?.num_rows(), 3);

    let lagos_fleet = lagos
        .with_selection(Dimension::TypeOfPartner, Selection::from_values(["Fleet"]));
    let filtered = apply_filters(&dataset, &lagos_fleet)?;
    assert_eq!(filtered.num_rows(), 1);

    let names = filtered.string_column("names")?.expect("names column");
    assert_eq!(names.value(0), "Driver A");
    Ok(())
}

#[test]
fn test_placeholder_values_are_selectable() -> onboard_dash::Result<()> {
    let dataset = sample_dataset();
    let options = FilterOptions::from_dataset(&dataset)?;

    let state = FilterState::defaults(&options)
        .with_selection(Dimension::TypeOfPartner, Selection::from_values(["N/A"]));
    let filtered = apply_filters(&dataset, &state)?;
    assert_eq!(filtered.num_rows(), 1);
    Ok(())
}

#[test]
fn test_filtering_never_changes_the_source() -> onboard_dash::Result<()> {
    let dataset = sample_dataset();
    let state = FilterState::new(date(2023, 6, 1), date(2023, 6, 2));

    let filtered = apply_filters(&dataset, &state)?;
    assert_eq!(filtered.num_rows(), 2);
    assert_eq!(dataset.num_rows(), 6);
    assert_eq!(FilterOptions::from_dataset(&dataset)?.values(Dimension::City).map(<[_]>::len), Some(3));
    Ok(())
}

#[test]
fn test_missing_columns_are_skipped() -> onboard_dash::Result<()> {
    let dataset = dataset_from_columns(&[
        ("date", vec![Some("2023-06-01"), Some("2023-06-02")]),
        ("names", vec![Some("a"), Some("b")]),
    ]);
    let options = FilterOptions::from_dataset(&dataset)?;
    assert!(options.values(Dimension::City).is_none());

    let state = FilterState::defaults(&options)
        .with_selection(Dimension::City, Selection::from_values(["Lagos"]));
    let filter = state.build_filter(&dataset);

    assert_eq!(filter.len(), 1, "only the date range applies");
    assert!(filter.required_columns().contains("date"));
    assert_eq!(apply_filters(&dataset, &state)?.num_rows(), 2);
    Ok(())
}

#[test]
fn test_table_without_dates_is_not_restricted_by_date() -> onboard_dash::Result<()> {
    let dataset = dataset_from_columns(&[("city", vec![Some("Lagos"), Some("Abuja")])]);
    let options = FilterOptions::from_dataset(&dataset)?;
    assert_eq!(options.date_bounds, None);

    let filtered = apply_filters(&dataset, &FilterState::defaults(&options))?;
    assert_eq!(filtered.num_rows(), 2);

    let inverted = FilterState::new(date(2023, 2, 1), date(2023, 1, 1));
    assert!(apply_filters(&dataset, &inverted)?.is_empty());
    Ok(())
}
