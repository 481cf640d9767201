use gauge::{Dataset, Gauge, ProjectSammon, ProjectionMethod, Projector};
use nalgebra::{DMatrix, DVector};

// Planar points lifted onto a tilted plane in three dimensions,
// so a perfect two dimensional image exists.
const PLANE: [(f64, f64); 6] = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0), (2.0, 0.5), (0.5, 2.0)];
const OFFSETS: [(f64, f64); 6] = [(0.05, -0.1), (-0.1, 0.08), (0.12, 0.0), (0.0, -0.07), (-0.06, 0.1), (0.09, 0.04)];

fn lifted() -> Dataset {
    let s = std::f64::consts::FRAC_1_SQRT_2;
    let mut up = Dataset::new(3);
    for (a, b) in PLANE {
        up.add_point(DVector::from_vec(vec![a * s, a * s, b]), None).unwrap();
    }
    up
}

// A sheared and jittered copy of the plane
fn distorted() -> Dataset {
    let mut down = Dataset::new(2);
    for ((a, b), (o0, o1)) in PLANE.iter().zip(OFFSETS.iter()) {
        down.add_point(DVector::from_vec(vec![a * 1.3 + 0.1 * b + o0, b * 0.8 + o1]), None).unwrap();
    }
    down
}

#[test]
fn sammon_recovers_a_planar_embedding() {
    if let Err(_) = pretty_env_logger::try_init() {}

    let up = lifted();
    let mut down = distorted();
    let mut sammon = ProjectSammon::new(0.5, 0.1, Some(0));
    sammon.init(&up, &mut down).unwrap();
    let start = sammon.closeness();

    let mut last = f64::MAX;
    for _ in 0..500 {
        last = sammon.iterate(&up, &mut down).unwrap();
    }
    assert!(last < start);
    assert!(last < 1e-6, "closeness {}", last);

    // pairwise distances are reproduced downstairs
    for i in 0..up.len() {
        for j in 0..up.len() {
            let (du, dd) = (up.distance(i, j).unwrap(), down.distance(i, j).unwrap());
            assert!((du - dd).abs() < 1e-3, "pair ({}, {}): {} vs {}", i, j, du, dd);
        }
    }
}

#[test]
fn gauge_drives_the_sammon_map() {
    if let Err(_) = pretty_env_logger::try_init() {}

    let mut gauge = Gauge::new(ProjectionMethod::Sammon(ProjectSammon::new(0.5, 0.1, Some(1))));
    for p in lifted().points() {
        assert!(gauge.add_datapoint(p.clone()).unwrap());
    }
    let cancel = common::Cancellation::new();
    let first = gauge.iterate(1, &cancel).unwrap();
    let report = gauge.iterate(300, &cancel).unwrap();
    assert_eq!(report.iterations, 300);
    assert!(!report.cancelled);
    assert!(report.error < first.error);
    assert_eq!(gauge.downstairs().len(), PLANE.len());
}

#[test]
fn switching_methods_reprojects() {
    let m = DMatrix::from_row_slice(4, 3, &[0.0, 0.0, 0.0, 2.0, 0.0, 0.1, 0.0, 1.0, 0.0, 2.0, 1.0, 0.1]);
    let mut gauge = Gauge::default();
    gauge.set_upstairs(Dataset::from_matrix(&m)).unwrap();

    gauge.set_method_by_name("PCA").unwrap();
    assert_eq!(gauge.method().name(), "PCA");
    assert_eq!(gauge.downstairs().len(), 4);
    assert_eq!(gauge.error(), 0.0);
    // nearly planar data keeps its distances under PCA
    let d = gauge.downstairs().distance(0, 3).unwrap();
    assert!((d - gauge.upstairs().distance(0, 3).unwrap()).abs() < 0.01);

    assert!(gauge.set_method_by_name("isomap").is_err());
}
