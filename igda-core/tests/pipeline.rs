use igda_core::{
    AcquisitionMode, Bracket, Category, DistanceTables, Level, Session, Stage, StageError,
    classify, snapshot,
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn nacional_thresholds_follow_pd_for_many_baselines() {
    let mut pd = 0.37;
    while pd < 25_000.0 {
        let tables = DistanceTables::derive(pd).unwrap();
        let nacional = tables.table(Level::Nacional);
        assert!(nacional.is_descending(), "pd {pd}");
        assert!((nacional.muy_lejano - pd).abs() <= 0.005 + 1e-9, "pd {pd}");
        assert!((nacional.lejano - 0.6 * pd).abs() <= 0.005 + 1e-9, "pd {pd}");
        assert!((nacional.intermedio - 0.3 * pd).abs() <= 0.005 + 1e-9, "pd {pd}");
        assert!((nacional.cercano - 0.1 * pd).abs() <= 0.005 + 1e-9, "pd {pd}");
        pd = pd * 1.7 + 3.11;
    }
}

#[test]
fn table_derivation_is_byte_for_byte_stable() {
    for pd in [1.0, 686.0, 1_234.567, 4_017.5] {
        let first = serde_json::to_string(&DistanceTables::derive(pd).unwrap()).unwrap();
        for _ in 0..5 {
            let again = serde_json::to_string(&DistanceTables::derive(pd).unwrap()).unwrap();
            assert_eq!(first, again);
        }
    }
}

#[test]
fn rebuilding_tables_from_the_same_pd_changes_nothing() {
    let mut session = Session::default();
    session.resolve_geography(None, 900.0, 700.0).unwrap();
    let first = session.build_tables().unwrap();
    let second = session.build_tables().unwrap();
    assert_eq!(first, second);
    assert_eq!(session.tables, Some(first));
}

#[test]
fn every_threshold_classifies_into_its_own_bracket_or_an_earlier_one() {
    let tables = DistanceTables::derive(2_500.0).unwrap();
    for (level, table) in tables.iter() {
        for (bracket, threshold) in table.entries() {
            let (found_level, found_bracket) = classify(threshold, &tables).unwrap();
            // Earlier levels may share the same value; never a later one.
            assert!(
                (found_level, found_bracket) <= (level, bracket),
                "{threshold} km gave {found_level}/{found_bracket}, expected at most {level}/{bracket}"
            );
        }
    }
    assert_eq!(
        classify(tables.nacional.intermedio, &tables),
        Some((Level::Nacional, Bracket::Intermedio))
    );
}

#[test]
fn wizard_run_matches_hand_computed_index() {
    let mut session = Session::default();
    // PD = 1000 -> Nacional {1000, 600, 300, 100}, Regional {100, 70, 50, 30},
    // Zonal {30, 24, 18, 12}, Local {30, 18, 12, 6}.
    session
        .resolve_geography(Some("Example"), 1_500.0, 500.0)
        .unwrap();
    session
        .set_foods(&["coffee", "rice", "cheese", "lettuce"])
        .unwrap();
    session.build_tables().unwrap();
    session
        .record_distances(&[10_500.0, 450.0, 55.0, 8.0])
        .unwrap();
    session
        .tag_modes(&[
            AcquisitionMode::Buy,
            AcquisitionMode::Buy,
            AcquisitionMode::Barter,
            AcquisitionMode::Produce,
        ])
        .unwrap();
    let rows = session.compute_values().unwrap();

    // coffee Mundial/Lejano/Buy = 1 + 2 - 3 = 0
    // rice Nacional/Intermedio/Buy = 3 + 3 - 3 = 3
    // cheese Regional/Intermedio/Barter = 4 + 3 - 1 = 6
    // lettuce Local/Cercano/Produce = 6 + 4 - 0 = 10
    let values: Vec<i32> = rows.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![0, 3, 6, 10]);

    let report = session.finalize().unwrap();
    assert_eq!(report.food_count, 4);
    assert_eq!(report.total_value, 19);
    // 40 / 19 = 2.105... -> 2.11
    assert!(approx(report.igda, 2.11));
    assert_eq!(report.category, Category::Regional);
    let nacional = report
        .km_by_level
        .iter()
        .find(|entry| entry.level == Level::Nacional)
        .unwrap();
    assert!(approx(nacional.km, 450.0));
    let zonal = report
        .km_by_level
        .iter()
        .find(|entry| entry.level == Level::Zonal)
        .unwrap();
    assert!(approx(zonal.km, 0.0));
}

#[test]
fn stages_can_be_rerun_out_of_order() {
    let mut session = Session::default();
    session.resolve_geography(None, 1_000.0, 1_000.0).unwrap();
    session.set_foods(&["eggs", "flour"]).unwrap();
    session.build_tables().unwrap();
    session.record_distances(&[40.0, 700.0]).unwrap();
    session.compute_values().unwrap();
    assert_eq!(session.progress(), Stage::ValuesAggregated);

    // A smaller country shrinks the tables; stale classifications remain
    // until distances are recorded again.
    session.resolve_geography(None, 100.0, 100.0).unwrap();
    session.build_tables().unwrap();
    let before = session.foods[0].classification();
    session.record_distances(&[40.0, 700.0]).unwrap();
    assert_ne!(session.foods[0].classification(), before);
    assert_eq!(
        session.foods[0].classification(),
        Some((Level::Nacional, Bracket::Intermedio))
    );
}

#[test]
fn finalize_before_values_is_a_missing_prerequisite() {
    let mut session = Session::default();
    session.set_foods(&["apple"]).unwrap();
    let err = session.finalize().unwrap_err();
    assert_eq!(
        err,
        StageError::MissingPrerequisite {
            stage: Stage::IndexFinalized,
            needs: Stage::ValuesAggregated,
        }
    );
    assert_eq!(
        err.to_string(),
        "cannot reach 'index finalized' before 'values aggregated'"
    );
}

#[test]
fn snapshot_survives_a_full_save_and_load() {
    let mut session = Session::default();
    session
        .resolve_geography(Some("Uruguay"), 560.0, 480.0)
        .unwrap();
    session.set_foods(&["mate", "beef"]).unwrap();
    session.build_tables().unwrap();
    session.record_distances(&[1_200.0, 15.0]).unwrap();
    session.tag_modes(&[AcquisitionMode::Buy, AcquisitionMode::Barter]).unwrap();
    session.compute_values().unwrap();

    let text = snapshot::encode(&session).unwrap();
    let restored = snapshot::decode(&text).unwrap();
    assert_eq!(restored, session);
    assert_eq!(snapshot::encode(&restored).unwrap(), text);
}
