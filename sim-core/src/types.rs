/// Identifier for a node in a [`crate::tree::Tree`].
///
/// This is an index into `Tree::nodes`, and is only meaningful until the
/// next [`crate::network::GrowthNetwork::reset`].
pub type NodeId = usize;
