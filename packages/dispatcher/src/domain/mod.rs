//! Domain layer
//!
//! 通知レコード・プッシュメッセージなどのドメインモデルと、
//! 外部サービスへのポート（trait）を定義します。

pub mod entity;
pub mod error;
pub mod message;
pub mod port;
pub mod value_object;

pub use entity::{DeliveryState, NotificationRecord, RecordUpdate};
pub use error::{PushError, RecordError, StoreError};
pub use message::{Notification, PushMessage};
pub use port::{NotificationStore, PushProvider};
pub use value_object::{DocumentPath, FcmToken};
