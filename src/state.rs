use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::db::OrmConn;
use crate::gateway::PaymentGateway;
use crate::session::Sessions;

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub sessions: Sessions,
    pub catalog: Arc<Catalog>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub config: Arc<AppConfig>,
}
