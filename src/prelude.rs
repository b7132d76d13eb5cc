//! Convenient re-exports for common types and traits

pub use crate::AnchoredMessagesPlugin;
pub use crate::OrbitTrackingPlugin;
pub use crate::events::BeginDrag;
pub use crate::events::BeginEdit;
pub use crate::events::ClearMessages;
pub use crate::events::CommitEdit;
pub use crate::events::ConfirmRecovery;
pub use crate::events::DeleteMessage;
pub use crate::events::EndDrag;
pub use crate::events::EndEdit;
pub use crate::events::MessagePlaced;
pub use crate::events::MessageRemoved;
pub use crate::events::PlaceMessage;
pub use crate::events::RecoveryRequested;
pub use crate::events::TrackingFailed;
pub use crate::events::TrackingFrame;
pub use crate::events::UpdateDrag;
pub use crate::geometry::CameraPose;
pub use crate::message::AnchoredMessage;
pub use crate::message::MessageId;
pub use crate::session::TrackingBackend;
pub use crate::session::TrackingSession;
pub use crate::AnchorConfig;
pub use crate::MessageCollection;
pub use crate::SessionStatus;
pub use crate::Viewport;
#[cfg(feature = "visualization")]
pub use crate::overlay::MessageOverlayPlugin;
