use std::sync::Arc;

use crate::algorithms::facets::FacetCalculator;
use crate::error::Result;
use crate::region::Region;
use crate::PlanarGraph;

/// Full pipeline for one graph. The first rejected region fails the graph.
pub fn decompose(graph: Arc<PlanarGraph>) -> Result<Vec<Region>> {
    let calc = FacetCalculator::new(graph);
    calc.regions()?.into_iter().collect()
}

/// Runs [`decompose`] over every graph; a failing graph is logged and does not
/// stop the others.
pub fn decompose_batch<I>(graphs: I) -> Vec<Result<Vec<Region>>>
where
    I: IntoIterator<Item = Arc<PlanarGraph>>,
{
    graphs
        .into_iter()
        .enumerate()
        .map(|(i, g)| {
            let r = decompose(g);
            match &r {
                Ok(regions) => log::debug!("graph {}: {} regions", i, regions.len()),
                Err(e) => log::warn!("graph {} failed: {}", i, e),
            }
            r
        })
        .collect()
}
