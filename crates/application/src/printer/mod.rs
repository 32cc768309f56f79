pub mod broadcaster;
pub mod builder;
pub mod dispatcher;
pub mod policy;
pub mod registry;

pub use broadcaster::{StatusBroadcaster, StatusSnapshot, StatusUpdate, SubscriptionId};
pub use builder::{EscPosBuilder, test_page};
pub use dispatcher::{DispatchOutcome, ReceiptDispatcher};
pub use policy::{AllowDirectConnections, OriginContext, SecureContextPolicy};
pub use registry::PrinterRegistry;
