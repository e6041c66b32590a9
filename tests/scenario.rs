use std::path::PathBuf;

use terminus::config::{load_and_build, load_scenario};
use terminus::core::vector;
use terminus::ephemeris::AberrationCorrection;
use terminus::method::{Shadow, Shape};
use terminus::surface::ellipsoid::level;
use terminus::terminator::{CorrectionLocus, TerminatorContext, find_terminator_points};

fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("configs")
        .join("scenarios")
        .join(name)
}

#[test]
fn mars_scenario_finds_one_point_per_cut() {
    let scenario = load_and_build(scenario_path("mars.yaml")).expect("mars scenario");
    assert_eq!(scenario.name.as_deref(), Some("mars-umbral"));
    let request = &scenario.request;
    assert_eq!(request.method.shape, Shape::Ellipsoid);
    assert_eq!(request.aberration_correction, AberrationCorrection::LtS);
    assert_eq!(request.locus, CorrectionLocus::Center);

    let context = TerminatorContext::new(&scenario.ephemeris);
    let table = find_terminator_points(&context, request).expect("terminator table");
    assert_eq!(table.len(), 3);
    let radii = [3_396.19, 3_396.19, 3_376.2];
    for row in table.rows() {
        assert_eq!(row.len(), 1);
        assert!(row.target_epoch < request.epoch);
        let point = &row.points[0];
        assert!((level(&radii, &point.position) - 1.0).abs() < 1e-9);
        // Earth to Mars is between 0.5 and 4 AU in this model.
        let range = vector::norm(&point.surface_vector);
        assert!(range > 7.0e7 && range < 6.0e8, "{range}");
    }
}

#[test]
fn phobos_scenario_searches_the_named_plate_model() {
    let scenario = load_and_build(scenario_path("phobos.yaml")).expect("phobos scenario");
    let request = &scenario.request;
    assert_eq!(request.method.shape, Shape::Dsk);
    assert_eq!(request.method.shadow, Shadow::Penumbral);
    assert_eq!(request.cut_count, 12);

    let context = TerminatorContext::new(&scenario.ephemeris).with_surfaces(&scenario.surfaces);
    let table = find_terminator_points(&context, request).expect("terminator table");
    assert_eq!(table.len(), 12);
    for (cut, row) in table.rows().iter().enumerate() {
        assert_eq!(row.cut, cut);
        assert!(!row.is_empty(), "cut {cut} found no points");
        for point in &row.points {
            let radius = vector::norm(&point.position);
            assert!(radius > 9.0 && radius <= 13.0 + 1e-6, "{radius}");
        }
    }
}

#[test]
fn command_line_style_overrides_rebuild_the_request() {
    let mut config = load_scenario(scenario_path("mars.yaml")).expect("mars config");
    config.request.method = "penumbral/guided/ellipsoid".to_string();
    config.request.cut_count = 5;
    config.request.locus = "center".to_string();
    config.request.aberration_correction = "none".to_string();
    let scenario = config.build().expect("rebuilt scenario");

    let context = TerminatorContext::new(&scenario.ephemeris);
    let table = find_terminator_points(&context, &scenario.request).expect("terminator table");
    assert_eq!(table.len(), 5);
    assert_eq!(table.point_count(), 5);
    assert!(
        table
            .rows()
            .iter()
            .all(|row| row.target_epoch == scenario.request.epoch)
    );
}
