//! Server state.

use std::sync::Arc;

use crate::usecase::DispatchNotificationUseCase;

/// Shared application state
pub struct AppState {
    /// DispatchNotificationUseCase（通知配信のユースケース）
    pub dispatch_notification_usecase: Arc<DispatchNotificationUseCase>,
    /// Collection whose creations are dispatched (e.g. "notifications")
    pub collection: String,
}
