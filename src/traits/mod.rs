//! # Backend Traits
//!
//! The two external collaborators, each behind a narrow trait:
//!
//! | Trait | Collaborator | Held as |
//! |-------|--------------|---------|
//! | [`ScopedBackend`] | permission-scoped storage provider | `Arc<dyn ScopedBackend>` |
//! | [`PreferenceStore`] | durable key-value preferences | `Arc<dyn PreferenceStore>` |
//!
//! Both are object-safe and require `Send + Sync`, so one instance can be
//! built at startup and handed to every consumer.

mod preferences;
mod scoped;

pub use preferences::{ChangeCallback, ListenerId, PreferenceStore};
pub use scoped::{NoScopedStorage, ScopedBackend};
