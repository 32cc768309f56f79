use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use domain::printer::{ConnectionPolicy, ExecutionContext, PrinterDescriptor, PrinterError};
use tracing::warn;

/// Execution context whose origin can be flipped at runtime
#[derive(Debug, Default)]
pub struct OriginContext {
    secure: AtomicBool,
}

impl OriginContext {
    pub fn new(secure_origin: bool) -> Self {
        Self {
            secure: AtomicBool::new(secure_origin),
        }
    }

    pub fn set_secure_origin(&self, secure: bool) {
        self.secure.store(secure, Ordering::SeqCst);
    }
}

impl ExecutionContext for OriginContext {
    fn is_secure_origin(&self) -> bool {
        self.secure.load(Ordering::SeqCst)
    }
}

/// Refuses plaintext socket connections to LAN printers under a secure origin,
/// mirroring the restriction browsers enforce on https pages.
pub struct SecureContextPolicy {
    context: Arc<dyn ExecutionContext>,
}

impl SecureContextPolicy {
    pub fn new(context: Arc<dyn ExecutionContext>) -> Self {
        Self { context }
    }
}

impl ConnectionPolicy for SecureContextPolicy {
    fn check(&self, descriptor: &PrinterDescriptor) -> Result<(), PrinterError> {
        // Asked on every attempt; the context is never cached
        if self.context.is_secure_origin() {
            warn!(printer_id = %descriptor.id, "Direct printer connection blocked by secure origin");
            return Err(PrinterError::PolicyBlocked);
        }
        Ok(())
    }
}

/// Native default: every direct connection is allowed
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowDirectConnections;

impl ConnectionPolicy for AllowDirectConnections {
    fn check(&self, _descriptor: &PrinterDescriptor) -> Result<(), PrinterError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::PrinterId;

    fn descriptor() -> PrinterDescriptor {
        PrinterDescriptor::network(PrinterId::new("p1").unwrap(), "Front", "10.0.0.2:9100")
    }

    #[test]
    fn test_insecure_origin_is_allowed() {
        let policy = SecureContextPolicy::new(Arc::new(OriginContext::new(false)));
        assert!(policy.check(&descriptor()).is_ok());
    }

    #[test]
    fn test_secure_origin_is_blocked() {
        let policy = SecureContextPolicy::new(Arc::new(OriginContext::new(true)));
        assert_eq!(policy.check(&descriptor()), Err(PrinterError::PolicyBlocked));
    }

    #[test]
    fn test_context_is_reevaluated() {
        let context = Arc::new(OriginContext::new(true));
        let policy = SecureContextPolicy::new(context.clone());
        assert!(policy.check(&descriptor()).is_err());

        context.set_secure_origin(false);
        assert!(policy.check(&descriptor()).is_ok());
    }

    #[test]
    fn test_allow_all() {
        assert!(AllowDirectConnections.check(&descriptor()).is_ok());
    }
}
