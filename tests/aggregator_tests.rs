use chrono::{DateTime, Duration, TimeZone, Utc};
use load_report::aggregator::{
    Aggregation, AggregationMode, AggregationSource, Aggregator, PlateauAggregation,
    StepAggregation,
};
use load_report::dataset::{Column, GroupKey, MetricFrame};
use load_report::metrics::global;
use load_report::plan::{LoadPlan, Offsets, Plateau};
use load_report::utils::error::AggregationError;
use pretty_assertions::assert_eq;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
}

fn at(minutes: i64) -> Option<DateTime<Utc>> {
    Some(t0() + Duration::minutes(minutes))
}

fn op(name: &str) -> Option<String> {
    Some(name.to_string())
}

/// Samples around the plan `[(5,10,2,50), (0,10,0,75)]` with offset 1,
/// whose windows are `[6, 14)` and `[18, 26)` minutes.
fn load_test_frame() -> MetricFrame {
    let rows: Vec<(Option<DateTime<Utc>>, Option<String>, Option<f64>)> = vec![
        (at(3), op("search"), Some(5000.0)), // ramp-up, excluded
        (at(7), op("login"), Some(100.0)),
        (at(8), op("search"), Some(50.0)),
        (at(10), None, Some(30.0)),
        (at(13), op("login"), Some(200.0)),
        (at(14), op("login"), Some(999.0)), // window end, excluded
        (at(16), op("login"), Some(7777.0)), // ramp-down, excluded
        (at(20), op("login"), Some(300.0)),
        (at(21), op("login"), None),         // null measurement, skipped
        (None, op("login"), Some(1.0)),      // null timestamp, never in a window
    ];

    let requests = vec![Some(1.0); rows.len()];
    let (ts, ops, rt): (Vec<_>, Vec<_>, Vec<_>) = rows.into_iter().fold(
        (Vec::new(), Vec::new(), Vec::new()),
        |(mut a, mut b, mut c), (t, o, r)| {
            a.push(t);
            b.push(o);
            c.push(r);
            (a, b, c)
        },
    );

    MetricFrame::new()
        .with_column("timestamp", Column::Timestamp(ts))
        .unwrap()
        .with_column("operation", Column::Text(ops))
        .unwrap()
        .with_column("response_time", Column::Float(rt))
        .unwrap()
        .with_column("requests", Column::Float(requests))
        .unwrap()
}

fn source(frame: &MetricFrame) -> AggregationSource<'_> {
    AggregationSource::new(frame, vec!["operation".to_string()], "timestamp", t0())
}

fn ramp_plan() -> LoadPlan {
    LoadPlan::from_tuples(&[(5.0, 10.0, 2.0, 50.0), (0.0, 10.0, 0.0, 75.0)])
}

fn step_aggregation(frame: &MetricFrame) -> StepAggregation<'_> {
    StepAggregation::new(source(frame), ramp_plan(), Offsets::symmetric(1.0).unwrap()).unwrap()
}

#[test]
fn test_one_window_per_step_in_plan_order() {
    let frame = load_test_frame();
    let plan = LoadPlan::from_tuples(&[
        (1.0, 5.0, 1.0, 10.0),
        (1.0, 5.0, 1.0, 20.0),
        (1.0, 5.0, 1.0, 30.0),
        (1.0, 5.0, 1.0, 40.0),
    ]);
    let agg = StepAggregation::new(source(&frame), plan, Offsets::default()).unwrap();

    let windows = agg.windows();
    assert_eq!(windows.len(), 4);
    assert_eq!(
        windows.iter().map(|w| w.level).collect::<Vec<_>>(),
        vec![Some(10.0), Some(20.0), Some(30.0), Some(40.0)]
    );
    assert_eq!(
        windows.iter().map(|w| w.start).collect::<Vec<_>>(),
        vec![1.0, 8.0, 15.0, 22.0]
    );
}

#[test]
fn test_single_step_without_offsets() {
    let frame = load_test_frame();
    let plan = LoadPlan::from_tuples(&[(0.0, 10.0, 0.0, 50.0)]);
    let agg = StepAggregation::new(source(&frame), plan, Offsets::new(0.0, 0.0).unwrap()).unwrap();

    let windows = agg.windows();
    assert_eq!(windows.len(), 1);
    assert_eq!((windows[0].start, windows[0].duration, windows[0].level), (0.0, 10.0, Some(50.0)));
    assert_eq!(
        windows[0].absolute(t0()).unwrap(),
        (t0(), t0() + Duration::minutes(10))
    );
}

#[test]
fn test_symmetric_offset_two_steps() {
    let frame = load_test_frame();
    let agg = step_aggregation(&frame);

    let windows: Vec<_> = agg
        .windows()
        .into_iter()
        .map(|w| (w.start, w.duration, w.level))
        .collect();

    assert_eq!(windows, vec![(6.0, 8.0, Some(50.0)), (18.0, 8.0, Some(75.0))]);
}

#[test]
fn test_window_derivation_is_restartable() {
    let frame = load_test_frame();
    let agg = step_aggregation(&frame);

    let first: Vec<_> = agg.shift_time().collect();
    let second: Vec<_> = agg.shift_time().collect();

    assert_eq!(first, second);
    assert_eq!(agg.windows(), first);
}

#[test]
fn test_avg_per_window_and_operation() {
    let frame = load_test_frame();
    let agg = step_aggregation(&frame);

    let table = agg
        .compute(global().get("avg").unwrap(), "response_time")
        .unwrap();

    let login = GroupKey::single("login");
    let search = GroupKey::single("search");

    assert_eq!(table.value(0, &login), Some(150.0));
    assert_eq!(table.value(0, &search), Some(50.0));
    assert_eq!(table.value(0, &GroupKey::null()), Some(30.0));
    assert_eq!(table.value(1, &login), Some(300.0));
    assert_eq!(table.level(0), Some(50.0));
    assert_eq!(table.level(1), Some(75.0));
}

#[test]
fn test_empty_window_yields_sentinel_for_every_group() {
    let frame = load_test_frame();
    let agg = step_aggregation(&frame);

    let table = agg
        .compute(global().get("avg").unwrap(), "response_time")
        .unwrap();

    let second: Vec<_> = table.window_values(1).collect();
    assert_eq!(second.len(), 3);
    assert!(table.value(1, &GroupKey::single("search")).unwrap().is_nan());
    assert!(table.value(1, &GroupKey::null()).unwrap().is_nan());
}

#[test]
fn test_null_operation_is_its_own_group() {
    let frame = load_test_frame();
    let agg = step_aggregation(&frame);

    let table = agg
        .compute(global().get("avg").unwrap(), "response_time")
        .unwrap();

    assert_eq!(
        table.groups(),
        vec![
            &GroupKey::null(),
            &GroupKey::single("login"),
            &GroupKey::single("search"),
        ]
    );
}

#[test]
fn test_window_end_and_ramps_excluded() {
    let frame = load_test_frame();
    let agg = step_aggregation(&frame);

    let table = agg
        .compute(global().get("avg").unwrap(), "response_time")
        .unwrap();

    let login_first = table
        .window_values(0)
        .find(|c| c.operation == GroupKey::single("login"))
        .unwrap();
    assert_eq!(login_first.samples, 2);

    let login_second = table
        .window_values(1)
        .find(|c| c.operation == GroupKey::single("login"))
        .unwrap();
    assert_eq!(login_second.samples, 1);
}

#[test]
fn test_rpm_uses_window_duration_by_default() {
    let frame = load_test_frame();
    let agg = step_aggregation(&frame);
    let rpm = global().get("rpm").unwrap();

    let table = agg.compute(rpm, "requests").unwrap();
    assert_eq!(table.value(0, &GroupKey::single("login")), Some(0.25));

    let table = agg.compute_with(rpm, "requests", Some(1.0)).unwrap();
    assert_eq!(table.value(0, &GroupKey::single("login")), Some(2.0));
}

#[test]
fn test_degenerate_window_emitted_with_sentinels() {
    let frame = load_test_frame();
    let plan = LoadPlan::from_tuples(&[(5.0, 2.0, 0.0, 50.0)]);
    let agg = StepAggregation::new(source(&frame), plan, Offsets::symmetric(1.0).unwrap()).unwrap();

    let windows = agg.windows();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].duration, 0.0);

    let table = agg
        .compute(global().get("avg").unwrap(), "response_time")
        .unwrap();
    assert!(table.cells.iter().all(|c| c.value.is_nan() && c.samples == 0));
}

#[test]
fn test_multiple_grouping_columns() {
    let frame = load_test_frame()
        .with_column(
            "host",
            Column::Text(vec![
                Some("a".to_string()),
                Some("a".to_string()),
                Some("a".to_string()),
                Some("a".to_string()),
                Some("b".to_string()),
                Some("a".to_string()),
                Some("a".to_string()),
                Some("a".to_string()),
                Some("a".to_string()),
                Some("a".to_string()),
            ]),
        )
        .unwrap();
    let src = AggregationSource::new(
        &frame,
        vec!["operation".to_string(), "host".to_string()],
        "timestamp",
        t0(),
    );
    let agg = StepAggregation::new(src, ramp_plan(), Offsets::symmetric(1.0).unwrap()).unwrap();

    let table = agg
        .compute(global().get("avg").unwrap(), "response_time")
        .unwrap();

    let login_a = GroupKey(vec![Some("login".to_string()), Some("a".to_string())]);
    let login_b = GroupKey(vec![Some("login".to_string()), Some("b".to_string())]);
    assert_eq!(table.value(0, &login_a), Some(100.0));
    assert_eq!(table.value(0, &login_b), Some(200.0));
}

#[test]
fn test_text_timestamps_are_parsed() {
    let frame = MetricFrame::new()
        .with_column(
            "timestamp",
            Column::Text(vec![
                Some("2024-03-01T10:07:00Z".to_string()),
                Some("2024-03-01T12:07:00+02:00".to_string()),
            ]),
        )
        .unwrap()
        .with_column("operation", Column::Text(vec![op("login"), op("login")]))
        .unwrap()
        .with_column("response_time", Column::Float(vec![Some(10.0), Some(20.0)]))
        .unwrap();

    let agg = step_aggregation(&frame);
    let table = agg
        .compute(global().get("avg").unwrap(), "response_time")
        .unwrap();

    assert_eq!(table.value(0, &GroupKey::single("login")), Some(15.0));
}

#[test]
fn test_malformed_timestamp_fails_at_construction() {
    let frame = MetricFrame::new()
        .with_column("timestamp", Column::Text(vec![Some("not-a-date".to_string())]))
        .unwrap()
        .with_column("operation", Column::Text(vec![op("login")]))
        .unwrap();

    let result = StepAggregation::new(source(&frame), ramp_plan(), Offsets::default());
    assert!(matches!(
        result,
        Err(AggregationError::MalformedTimestamp { row: 0, .. })
    ));
}

#[test]
fn test_missing_measurement_column() {
    let frame = load_test_frame();
    let agg = step_aggregation(&frame);

    let err = agg
        .compute(global().get("avg").unwrap(), "latency")
        .unwrap_err();
    assert_eq!(err, AggregationError::MissingColumn("latency".to_string()));
}

#[test]
fn test_missing_operation_column() {
    let frame = load_test_frame();
    let src = AggregationSource::new(&frame, vec!["endpoint".to_string()], "timestamp", t0());

    let result = StepAggregation::new(src, ramp_plan(), Offsets::default());
    assert!(matches!(result, Err(AggregationError::MissingColumn(c)) if c == "endpoint"));
}

#[test]
fn test_plateau_aggregation() {
    let frame = load_test_frame();
    let agg = PlateauAggregation::new(
        source(&frame),
        vec![Plateau::new("steady", 6.0, 20.0).with_level(60.0)],
    )
    .unwrap();

    let table = agg
        .compute(global().get("avg").unwrap(), "response_time")
        .unwrap();

    // 7, 13, 14, 16 and 20 minutes fall inside [6, 26)
    let expected = (100.0 + 200.0 + 999.0 + 7777.0 + 300.0) / 5.0;
    assert_eq!(table.value(0, &GroupKey::single("login")), Some(expected));
    assert_eq!(table.level(0), Some(60.0));
}

#[test]
fn test_aggregator_selected_from_mode() {
    let frame = load_test_frame();

    let step = Aggregator::from_mode(
        source(&frame),
        AggregationMode::Step {
            plan: ramp_plan(),
            offsets: Offsets::symmetric(1.0).unwrap(),
        },
    )
    .unwrap();
    assert!(matches!(step, Aggregator::Step(_)));
    assert_eq!(step.windows().len(), 2);

    let whole =
        Aggregator::from_mode(source(&frame), AggregationMode::WholeTest { end: None }).unwrap();
    assert!(matches!(whole, Aggregator::Plateau(_)));

    let table = whole
        .compute(global().get("avg").unwrap(), "response_time")
        .unwrap();
    let search = table.value(0, &GroupKey::single("search")).unwrap();
    assert_eq!(search, (5000.0 + 50.0) / 2.0);
}

#[test]
fn test_concurrent_computations_share_frame() {
    let frame = load_test_frame();
    let agg = step_aggregation(&frame);

    let (avg, rpm) = std::thread::scope(|s| {
        let avg = s.spawn(|| agg.compute(global().get("avg").unwrap(), "response_time"));
        let rpm = s.spawn(|| agg.compute(global().get("rpm").unwrap(), "requests"));
        (avg.join().unwrap().unwrap(), rpm.join().unwrap().unwrap())
    });

    assert_eq!(avg.metric.name, "avg");
    assert_eq!(rpm.metric.name, "rpm");
    assert_eq!(avg.windows, rpm.windows);
}
