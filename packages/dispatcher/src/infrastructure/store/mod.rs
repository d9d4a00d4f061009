//! NotificationStore の実装
//!
//! - `firestore`: Firestore REST API を使った実装
//! - `inmemory`: HashMap を使ったインメモリ実装（ローカル実行・テスト用）

pub mod firestore;
pub mod inmemory;

pub use firestore::FirestoreNotificationStore;
pub use inmemory::InMemoryNotificationStore;
