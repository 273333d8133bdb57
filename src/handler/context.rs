use std::sync::Arc;

use crate::common::clock::ClockImpl;
use crate::common::config::{ClusterConfig, Settings};
use crate::common::layout::LocalLayout;
use crate::storage::shared_store_impl::SharedStoreImpl;

/// Everything a cycle step needs: the shared store, the topology, the
/// process settings, the local directory layout and a time source.
pub struct HandlerContext {
    pub shared_store: Arc<SharedStoreImpl>,
    pub cluster: Arc<ClusterConfig>,
    pub settings: Arc<Settings>,
    pub local: LocalLayout,
    pub clock: ClockImpl,
}
