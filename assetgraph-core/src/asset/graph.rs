//! Asset graph helpers.

use indexmap::IndexSet;

use super::record::AssetRecord;
use crate::error::AssetError;
use crate::graph::{Graph, GraphNode, NodeId};
use crate::identity::Invalidation;

/// The dependency graph of a build, with assets as nodes.
pub type AssetGraph = Graph<AssetRecord>;

/// Every asset that must be rebuilt when `invalidation` fires: the assets
/// that depend on it directly (through their file path or their recorded
/// invalidations) and, transitively, every asset that depends on those.
pub fn assets_invalidated_by<'g>(
    graph: &'g AssetGraph,
    invalidation: &Invalidation,
) -> Vec<&'g AssetRecord> {
    let direct: Vec<NodeId> = graph
        .find_nodes(|asset| {
            let own_file = matches!(
                invalidation,
                Invalidation::File { file_path } if file_path == asset.file_path()
            );
            own_file || asset.invalidations().contains(invalidation)
        })
        .into_iter()
        .map(|asset| asset.id().clone())
        .collect();

    let mut affected = IndexSet::new();
    for id in &direct {
        if affected.contains(id) {
            continue;
        }
        graph.traverse_ancestors::<(), _>(id, |asset, _, actions| {
            if !affected.insert(asset.id().clone()) {
                actions.skip_children();
            }
            None
        });
    }

    affected
        .iter()
        .filter_map(|id| graph.get_node(id))
        .collect()
}

/// Check every record in the graph for a stale id.
pub fn verify_identities(graph: &AssetGraph) -> Result<(), AssetError> {
    graph.nodes().try_for_each(AssetRecord::verify_id)
}
