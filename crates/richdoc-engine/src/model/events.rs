use crate::model::tree::NodeId;

/// Notification emitted for a node after a successful length mutation.
///
/// Every mutation produces a `LengthChange` immediately followed by an
/// `Update` for each affected node; failed mutations emit nothing. Delivery
/// is synchronous and completes before the mutating call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEvent {
    /// The node's length changed by `diff`.
    LengthChange { diff: isize },
    /// Generic change notification, always fired right after `LengthChange`.
    Update,
}

/// Observer invoked for every event. Listeners receive the affected node id
/// and the event; they have no handle back into the tree, so they cannot
/// re-enter a mutation while one is being reported.
pub(crate) type Listener = Box<dyn FnMut(NodeId, &NodeEvent)>;
