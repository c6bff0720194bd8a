use planar_facets::{CurveBound, Domain, FacetCalculator, FacetError, PlanarGraph, Primitive, Region};
use std::sync::Arc;

fn add_segment(g: &mut PlanarGraph, label: &str, p: (f64, f64), q: (f64, f64)) -> u32 {
    let c = CurveBound::line_through(label, p, q).expect("segment curve");
    g.add_curve_segment(p, q, c).expect("segment edge")
}

fn square_graph() -> PlanarGraph {
    let mut g = PlanarGraph::new();
    add_segment(&mut g, "bottom", (0.0, 0.0), (4.0, 0.0));
    add_segment(&mut g, "right", (4.0, 0.0), (4.0, 4.0));
    add_segment(&mut g, "top", (4.0, 4.0), (0.0, 4.0));
    add_segment(&mut g, "left", (0.0, 4.0), (0.0, 0.0));
    g
}

fn regions_of(calc: &FacetCalculator) -> Vec<Region> {
    calc.regions()
        .expect("facets")
        .into_iter()
        .map(|r| r.expect("region"))
        .collect()
}

#[test]
fn square_yields_one_region() {
    let calc = FacetCalculator::new(Arc::new(square_graph()));
    let facets = calc.primitives().unwrap();
    assert_eq!(facets.len(), 2);
    let cycles: Vec<_> = facets.cycles().collect();
    assert_eq!(cycles.len(), 2);
    assert!((cycles[0].signed_area.abs() - 16.0).abs() < 1e-9);
    assert!((cycles[0].signed_area + cycles[1].signed_area).abs() < 1e-9);
    assert_eq!(facets.outer_faces().count(), 1);

    let regions = regions_of(&calc);
    assert_eq!(regions.len(), 1);
    let r = &regions[0];
    assert_eq!(r.domain(), Domain::new(0.0, 4.0).unwrap());
    assert!(r.right_of(5.0));
    assert!(!r.right_of(0.0));
    assert!(r.left_of(-1.0));
    assert!(!r.left_of(2.0));
    assert!(r.left().is_vertical());
    assert!(r.right().is_vertical());
    assert_eq!(r.upper().labels(), vec!["top"]);
    assert_eq!(r.lower().labels(), vec!["bottom"]);
    assert_eq!(r.signed_area(), 16.0);
}

#[test]
fn parabola_lens_orders_chains() {
    let dom = Domain::new(-2.0, 2.0).unwrap();
    let low = CurveBound::function("x^2", dom, |x| x * x).unwrap();
    let high = CurveBound::function("4 - x^2", dom, |x| 4.0 - x * x).unwrap();
    let s = 2f64.sqrt();
    let mut g = PlanarGraph::new();
    let a = g.add_node(-s, 2.0).unwrap();
    let b = g.add_node(s, 2.0).unwrap();
    g.add_edge(a, b, low.clone()).unwrap();
    g.add_edge(a, b, high.clone()).unwrap();

    let calc = FacetCalculator::new(Arc::new(g));
    let facets = calc.primitives().unwrap();
    assert_eq!(facets.bounded_cycles().count(), 1);

    let regions = regions_of(&calc);
    assert_eq!(regions.len(), 1);
    let r = &regions[0];
    assert_eq!(r.upper().labels(), vec!["4 - x^2"]);
    assert_eq!(r.lower().labels(), vec!["x^2"]);
    assert!(r.upper().curves().next().unwrap().same_curve(&high));
    assert!(r.lower().curves().next().unwrap().same_curve(&low));
    let d = r.domain();
    assert!((d.lo + s).abs() < 1e-12 && (d.hi - s).abs() < 1e-12);
    assert!(r.left().is_point() && r.right().is_point());
    assert!((r.upper_at(0.0).unwrap() - 4.0).abs() < 1e-12);
    assert!(r.lower_at(0.0).unwrap().abs() < 1e-12);
    // exact lens area is 16√2/3; the flattened outline undershoots slightly
    let exact = 16.0 * s / 3.0;
    assert!(r.signed_area() > 0.0 && (r.signed_area() - exact).abs() < 0.05);
}

#[test]
fn isolated_node_and_dangling_edge_are_kept_apart() {
    let mut g = square_graph();
    g.add_node(10.0, 10.0).unwrap();
    add_segment(&mut g, "tail", (6.0, 0.0), (8.0, 0.0));
    let calc = FacetCalculator::new(Arc::new(g));
    let facets = calc.primitives().unwrap();
    assert_eq!(facets.len(), 4);
    let kinds = |f: fn(&Primitive) -> bool| facets.primitives.iter().filter(|p| f(p)).count();
    assert_eq!(kinds(|p| matches!(p, Primitive::IsolatedNode { .. })), 1);
    assert_eq!(kinds(|p| matches!(p, Primitive::Filament { .. })), 1);
    assert_eq!(kinds(|p| p.is_outer_face()), 1);
    assert_eq!(kinds(|p| p.as_cycle().map_or(false, |c| !c.is_outer())), 1);
    assert_eq!(facets.half_edge_total(), 10);
    assert_eq!(regions_of(&calc).len(), 1);
}

#[test]
fn spur_attached_to_corner_is_a_filament() {
    let mut g = square_graph();
    add_segment(&mut g, "tail", (4.0, 4.0), (6.0, 5.0));
    let calc = FacetCalculator::new(Arc::new(g));
    let facets = calc.primitives().unwrap();
    assert_eq!(facets.filaments().count(), 1);
    assert_eq!(facets.filaments().next().unwrap().len(), 2);
    assert_eq!(facets.bounded_cycles().count(), 1);
    assert_eq!(facets.outer_faces().count(), 1);
    assert_eq!(regions_of(&calc).len(), 1);
}

#[test]
fn shared_edge_splits_into_two_regions() {
    let mut g = PlanarGraph::new();
    add_segment(&mut g, "b0", (0.0, 0.0), (2.0, 0.0));
    add_segment(&mut g, "b1", (2.0, 0.0), (4.0, 0.0));
    add_segment(&mut g, "r", (4.0, 0.0), (4.0, 2.0));
    add_segment(&mut g, "t1", (4.0, 2.0), (2.0, 2.0));
    add_segment(&mut g, "t0", (2.0, 2.0), (0.0, 2.0));
    add_segment(&mut g, "l", (0.0, 2.0), (0.0, 0.0));
    add_segment(&mut g, "mid", (2.0, 0.0), (2.0, 2.0));
    let calc = FacetCalculator::new(Arc::new(g));
    let mut regions = regions_of(&calc);
    assert_eq!(regions.len(), 2);
    regions.sort_by(|a, b| a.left_x().partial_cmp(&b.left_x()).unwrap());
    assert_eq!(regions[0].right().label(), "mid");
    assert_eq!(regions[1].left().label(), "mid");
    assert!(regions[0].right().same_curve(regions[1].left()));
    assert_eq!(regions[0].upper().labels(), vec!["t0"]);
    assert_eq!(regions[1].lower().labels(), vec!["b1"]);
}

#[test]
fn lobes_touching_at_a_node_share_one_outer_face() {
    // y = x and y = x^3 cross at the origin: two lobes joined at one node
    let dom = Domain::new(-1.0, 1.0).unwrap();
    let line = CurveBound::function("x", dom, |x| x).unwrap();
    let cube = CurveBound::function("x^3", dom, |x| x * x * x).unwrap();
    let mut g = PlanarGraph::new();
    let a = g.add_node(-1.0, -1.0).unwrap();
    let o = g.add_node(0.0, 0.0).unwrap();
    let b = g.add_node(1.0, 1.0).unwrap();
    for (p, q) in [(a, o), (o, b)] {
        g.add_edge(p, q, line.clone()).unwrap();
        g.add_edge(p, q, cube.clone()).unwrap();
    }
    let calc = FacetCalculator::new(Arc::new(g));
    let facets = calc.primitives().unwrap();
    assert_eq!(facets.cycles().count(), 3);
    let outer: Vec<_> = facets.outer_faces().collect();
    assert_eq!(outer.len(), 1);
    assert!(!outer[0].is_simple());
    assert!(facets.bounded_cycles().all(|c| c.is_simple()));

    let mut regions = regions_of(&calc);
    assert_eq!(regions.len(), facets.cycles().count() - 1);
    regions.sort_by(|p, q| p.left_x().partial_cmp(&q.left_x()).unwrap());
    assert_eq!(regions[0].domain(), Domain::new(-1.0, 0.0).unwrap());
    assert_eq!(regions[0].upper().labels(), vec!["x^3"]);
    assert_eq!(regions[1].domain(), Domain::new(0.0, 1.0).unwrap());
    assert_eq!(regions[1].upper().labels(), vec!["x"]);
    for r in &regions {
        assert!((r.signed_area() - 0.25).abs() < 5e-3);
    }
    assert!((outer[0].signed_area + 0.5).abs() < 1e-2);
}

#[test]
fn hole_touching_the_boundary_stays_in_its_face() {
    // a triangle hanging inside the square from its lower-left corner
    let mut g = square_graph();
    add_segment(&mut g, "t0", (0.0, 0.0), (2.0, 1.0));
    add_segment(&mut g, "t1", (2.0, 1.0), (1.0, 2.0));
    add_segment(&mut g, "t2", (1.0, 2.0), (0.0, 0.0));
    let calc = FacetCalculator::new(Arc::new(g));
    let facets = calc.primitives().unwrap();
    assert_eq!(facets.half_edge_total(), 14);
    let outer: Vec<f64> = facets.outer_faces().map(|c| c.signed_area).collect();
    assert_eq!(outer.len(), 1);
    assert!((outer[0] + 16.0).abs() < 1e-9);
    let mut bounded: Vec<f64> = facets.bounded_cycles().map(|c| c.signed_area).collect();
    bounded.sort_by(|p, q| p.partial_cmp(q).unwrap());
    assert_eq!(bounded.len(), 2);
    assert!((bounded[0] - 1.5).abs() < 1e-9);
    assert!((bounded[1] - 14.5).abs() < 1e-9);

    // the pinched face is rejected on its own; the triangle still assembles
    let results = calc.regions().unwrap();
    assert_eq!(results.len(), facets.cycles().count() - 1);
    let (ok, failed): (Vec<_>, Vec<_>) = results.into_iter().partition(|r| r.is_ok());
    assert_eq!(ok.len(), 1);
    let triangle = ok[0].as_ref().unwrap();
    assert!((triangle.signed_area() - 1.5).abs() < 1e-9);
    assert_eq!(triangle.domain(), Domain::new(0.0, 2.0).unwrap());
    assert_eq!(failed.len(), 1);
    assert!(matches!(
        &failed[0],
        Err(FacetError::UnsupportedTopology(m)) if m.contains("touches itself")
    ));
}
