//! EventSynthesizer - notify a reactive framework of an injected value
//!
//! Frameworks that own an input's value install an instance-level `value`
//! property to track writes. Assigning through that property updates the
//! tracker too, so the framework sees no change and re-renders the old
//! value. The synthesizer writes through the prototype's native setter
//! instead and then announces the change with bubbling `input` and `change`
//! events, in that order. Delegated listeners sit high in the tree, so both
//! events must bubble.

use crate::driver::{DomDriver, EventKind, NodeRef, SyntheticEvent};
use crate::result::ProbeResult;

/// Dispatch order after the value write
pub const INJECTION_EVENTS: [EventKind; 2] = [EventKind::Input, EventKind::Change];

/// Injects values through the native setter
#[derive(Debug)]
pub struct EventSynthesizer<'a, D: DomDriver + ?Sized> {
    driver: &'a D,
}

impl<'a, D: DomDriver + ?Sized> EventSynthesizer<'a, D> {
    /// Create a synthesizer over a driver
    #[must_use]
    pub const fn new(driver: &'a D) -> Self {
        Self { driver }
    }

    /// Set `value` through the native setter, then dispatch bubbling
    /// `input` and `change`
    pub async fn inject_value(&self, node: NodeRef, value: &str) -> ProbeResult<()> {
        tracing::debug!(%node, value, "injecting value");
        self.driver.native_set_value(node, value).await?;
        for kind in INJECTION_EVENTS {
            self.driver
                .dispatch_event(node, SyntheticEvent::bubbling(kind))
                .await?;
        }
        Ok(())
    }
}
