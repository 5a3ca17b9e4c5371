use std::sync::Arc;

use mirror::ledger::ArtworkCatalog;
use mirror::reconcile::Reconciler;
use mirror::store::MirrorStore;
use types::ids::Address;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MirrorStore>,
    pub reconciler: Arc<Reconciler>,
    pub catalog: Arc<dyn ArtworkCatalog>,
    /// Asset contract rows created through the initial-sync path belong to
    pub asset_contract: Address,
}

impl AppState {
    pub fn new(
        store: Arc<MirrorStore>,
        reconciler: Arc<Reconciler>,
        catalog: Arc<dyn ArtworkCatalog>,
        asset_contract: Address,
    ) -> Self {
        Self {
            store,
            reconciler,
            catalog,
            asset_contract,
        }
    }
}
