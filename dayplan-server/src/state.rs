use std::sync::Arc;

use dayplan_core::links::QuickLink;
use dayplan_core::planner::Planner;

/// Shared application state: the one planner this server fronts.
pub struct AppState<A, S> {
    pub planner: Arc<Planner<A, S>>,
    pub links: Arc<Vec<QuickLink>>,
}

impl<A, S> AppState<A, S> {
    pub fn new(planner: Planner<A, S>, links: Vec<QuickLink>) -> Self {
        AppState {
            planner: Arc::new(planner),
            links: Arc::new(links),
        }
    }
}

// Manual impl: deriving would require `A: Clone` and `S: Clone`.
impl<A, S> Clone for AppState<A, S> {
    fn clone(&self) -> Self {
        AppState {
            planner: Arc::clone(&self.planner),
            links: Arc::clone(&self.links),
        }
    }
}
