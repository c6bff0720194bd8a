use planar_facets::json::{primitives_to_json, regions_to_json};
use planar_facets::{decompose, Axis, CurveBound, Domain, FacetCalculator, FacetError, PlanarGraph, Region};
use std::sync::Arc;

fn polygon(points: &[(f64, f64)]) -> PlanarGraph {
    let mut g = PlanarGraph::new();
    for i in 0..points.len() {
        let (p, q) = (points[i], points[(i + 1) % points.len()]);
        let c = CurveBound::line_through(format!("e{}", i), p, q).unwrap();
        g.add_curve_segment(p, q, c).unwrap();
    }
    g
}

fn only_region(g: PlanarGraph) -> Region {
    let mut regions = decompose(Arc::new(g)).unwrap();
    assert_eq!(regions.len(), 1);
    regions.remove(0)
}

/// Wedge between `y = 1 + x/4` and `y = 3 - x/4`, closed on the left by
/// `x = 0` and meeting at `(4, 2)`.
fn band() -> Region {
    only_region(polygon(&[(0.0, 1.0), (4.0, 2.0), (0.0, 3.0)]))
}

#[test]
fn band_position_queries() {
    let r = band();
    assert_eq!(r.domain(), Domain::new(0.0, 4.0).unwrap());
    assert!(r.right_of(4.5));
    assert!(!r.right_of(4.0));
    assert!(r.left_of(-0.1));
    assert!(!r.left_of(0.0));
    assert!(r.passes_through(Axis::Vertical(2.0)));
    assert!(!r.passes_through(Axis::Vertical(4.0)));
    assert!(r.passes_through(Axis::Horizontal(2.0)));
    assert!(!r.passes_through(Axis::Horizontal(3.0)));
    assert!(!r.passes_through(Axis::Horizontal(-1.0)));
}

#[test]
fn position_against_another_region_bound() {
    let r = band();
    let next = only_region(polygon(&[(5.0, 0.0), (6.0, 0.0), (5.0, 1.0)]));
    assert!(next.left().is_vertical());
    assert!(r.right_of_bound(next.left()).unwrap());
    assert!(!r.left_of_bound(next.left()).unwrap());
    // a point extreme stands for the vertical line through it
    assert!(r.right().is_point());
    assert!(next.left_of_bound(r.right()).unwrap());
    assert!(!r.right_of_bound(r.right()).unwrap());
    let slanted = r.upper().curves().next().unwrap();
    assert!(matches!(r.right_of_bound(slanted), Err(FacetError::UnsupportedTopology(_))));
}

#[test]
fn closest_chain_faces_the_axis() {
    let r = band();
    let below = r.closest_chain(Axis::Horizontal(-1.0)).unwrap();
    assert_eq!(below.labels(), r.lower().labels());
    let above = r.closest_chain(Axis::Horizontal(3.0)).unwrap();
    assert_eq!(above.labels(), r.upper().labels());
    assert!(matches!(
        r.closest_chain(Axis::Horizontal(2.0)),
        Err(FacetError::AxisThroughRegion(_))
    ));
    assert!(matches!(
        r.closest_chain(Axis::Vertical(10.0)),
        Err(FacetError::UnsupportedTopology(_))
    ));
}

#[test]
fn chain_evaluation_respects_domain() {
    let r = band();
    assert!((r.upper_at(2.0).unwrap() - 2.5).abs() < 1e-12);
    assert!((r.lower_at(2.0).unwrap() - 1.5).abs() < 1e-12);
    assert_eq!(r.upper_at(0.0).unwrap(), 3.0);
    let err = r.upper_at(5.0).unwrap_err();
    assert!(err.is_recoverable());
    assert!(matches!(err, FacetError::Domain { value, .. } if value == 5.0));
}

#[test]
fn containment_is_strict() {
    let r = band();
    assert!(r.contains(2.0, 2.0));
    assert!(!r.contains(2.0, 2.6));
    assert!(!r.contains(0.0, 2.0));
    assert!(!r.contains(5.0, 2.0));
    let y = r.y_range();
    assert_eq!((y.lo, y.hi), (1.0, 3.0));
}

#[test]
fn triangle_is_one_to_one() {
    let r = only_region(polygon(&[(0.0, 0.0), (3.0, 0.0), (1.0, 2.0)]));
    assert!(r.is_one_to_one());
    assert!(r.require_one_to_one().is_ok());
    assert!(r.left().is_point() && r.right().is_point());
    assert_eq!(r.upper().len(), 2);
    assert!(r.upper().is_monotone());
    assert!((r.upper_at(1.0).unwrap() - 2.0).abs() < 1e-12);
}

#[test]
fn folded_chain_is_not_one_to_one() {
    // a notch cut into the top edge makes the upper chain double back
    let r = only_region(polygon(&[
        (0.0, 0.0),
        (4.0, 0.0),
        (4.0, 3.0),
        (1.0, 3.0),
        (3.0, 2.0),
        (0.0, 2.0),
    ]));
    assert!(!r.is_one_to_one());
    assert!(matches!(r.require_one_to_one(), Err(FacetError::UnsupportedTopology(_))));
    assert!(r.upper().values_at(2.0).len() > 1);
    assert!(matches!(r.upper_at(2.0), Err(FacetError::UnsupportedTopology(_))));
    assert_eq!(r.lower_at(2.0).unwrap(), 0.0);
}

#[test]
fn json_summaries() {
    let g = polygon(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0)]);
    let calc = FacetCalculator::new(Arc::new(g));
    let prims = primitives_to_json(&calc.primitives().unwrap());
    let kinds: Vec<&str> = prims["primitives"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["minimal_cycle", "minimal_cycle"]);
    let outer: Vec<bool> = prims["primitives"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["outer"].as_bool().unwrap())
        .collect();
    assert_eq!(outer.iter().filter(|o| **o).count(), 1);

    let regions: Vec<Region> = calc.regions().unwrap().into_iter().collect::<Result<_, _>>().unwrap();
    let v = regions_to_json(&regions);
    assert_eq!(v[0]["area"], 2.0);
    assert_eq!(v[0]["left"]["type"], "vertical");
    assert_eq!(v[0]["upper"][0]["label"], "e2");
    assert_eq!(v[0]["upper"][0]["from"], serde_json::json!([0.0, 1.0]));
}
