#[cfg(feature = "bench_facets")]
use planar_facets::{CurveBound, Domain, FacetCalculator, PlanarGraph, RegionAssembler};
#[cfg(feature = "bench_facets")]
use std::sync::Arc;
#[cfg(feature = "bench_facets")]
use std::time::Instant;

#[cfg(not(feature = "bench_facets"))]
fn main() {
    panic!("facets_bench requires --features bench_facets");
}

/// A `w` x `h` grid whose horizontal rows are gentle arcs, so every bounded
/// face has curved upper and lower chains.
#[cfg(feature = "bench_facets")]
fn build_grid_graph(w: usize, h: usize) -> PlanarGraph {
    let mut g = PlanarGraph::new();
    let bow = |x: f64| 0.05 * (x * 0.7).sin();
    for j in 0..=h {
        let y0 = j as f64 * 6.0;
        for i in 0..w {
            let (x0, x1) = (i as f64 * 6.0, (i + 1) as f64 * 6.0);
            let row = CurveBound::function(
                format!("row{}", j),
                Domain::between(x0, x1),
                move |x| y0 + bow(x),
            );
            if let Ok(c) = row {
                g.add_curve_segment((x0, y0 + bow(x0)), (x1, y0 + bow(x1)), c);
            }
        }
    }
    for i in 0..=w {
        let x = i as f64 * 6.0;
        for j in 0..h {
            let (y0, y1) = (j as f64 * 6.0 + bow(x), (j + 1) as f64 * 6.0 + bow(x));
            if let Ok(c) = CurveBound::line_through(format!("col{}", i), (x, y0), (x, y1)) {
                g.add_curve_segment((x, y0), (x, y1), c);
            }
        }
    }
    g
}

#[cfg(feature = "bench_facets")]
fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut w = 60usize;
    let mut h = 60usize;
    let mut repeats = 5usize;
    for a in &args[1..] {
        if let Some(val) = a.strip_prefix("--w=") {
            if let Ok(v) = val.parse() {
                w = v;
            }
        } else if let Some(val) = a.strip_prefix("--h=") {
            if let Ok(v) = val.parse() {
                h = v;
            }
        } else if let Some(val) = a.strip_prefix("--repeats=") {
            if let Ok(v) = val.parse() {
                repeats = v;
            }
        }
    }

    let t0 = Instant::now();
    let graph = Arc::new(build_grid_graph(w, h));
    let build_ms = t0.elapsed().as_secs_f64() * 1000.0;

    let calc = FacetCalculator::new(graph);
    let mut trace_times = Vec::with_capacity(repeats);
    let mut region_times = Vec::with_capacity(repeats);
    let mut regions = 0usize;
    for _ in 0..repeats {
        let t = Instant::now();
        let facets = match calc.compute_uncached() {
            Ok(f) => Arc::new(f),
            Err(e) => {
                eprintln!("trace failed: {}", e);
                return;
            }
        };
        trace_times.push(t.elapsed().as_secs_f64() * 1000.0);
        let t = Instant::now();
        let asm = RegionAssembler::from_facets(calc.graph(), facets, calc.options());
        regions = asm.regions().len();
        region_times.push(t.elapsed().as_secs_f64() * 1000.0);
    }
    let avg = |v: &[f64]| if v.is_empty() { 0.0 } else { v.iter().sum::<f64>() / v.len() as f64 };

    println!(
        "grid={}x{} edges={} regions={} build_ms={:.3} avg_trace_ms={:.3} avg_regions_ms={:.3}",
        w,
        h,
        calc.graph().edge_count(),
        regions,
        build_ms,
        avg(&trace_times),
        avg(&region_times)
    );
}
