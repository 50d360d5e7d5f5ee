//! Partition assignment is out of scope for this codec, but the message
//! format's consumers need a seam to plug one in. This trait mirrors the
//! shape of a partition assignor without implementing any assignment
//! strategy itself.

use std::collections::HashMap;

/// One member's subscription metadata, as a coordinator would gather it
/// before running an assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subscription {
    pub topics: Vec<String>,
    pub user_data: Option<Vec<u8>>,
}

/// The partitions assigned to one member after an assignor has run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment {
    pub partitions: HashMap<String, Vec<i32>>,
    pub user_data: Option<Vec<u8>>,
}

/// A strategy for dividing a topic's partitions among a consumer group's
/// members. Implementations are expected to be deterministic: every group
/// member runs the same assignor over the same inputs and must agree on the
/// result without further coordination.
pub trait PartitionAssignor {
    /// The protocol name a broker uses to pick an assignor the whole group
    /// supports (e.g. `"range"`, `"roundrobin"`).
    fn name(&self) -> &str;

    /// The subscription this member should advertise for `topics`.
    fn subscription(&self, topics: &[String]) -> Subscription;

    /// Assigns partitions to members given each member's subscription.
    fn assign(
        &self,
        partitions_per_topic: &HashMap<String, i32>,
        subscriptions: &HashMap<String, Subscription>,
    ) -> HashMap<String, Assignment>;

    /// Called on each member with its own resulting assignment, for
    /// assignors that want to remember it for the next rebalance.
    fn on_assignment(&mut self, _assignment: &Assignment) {}
}
