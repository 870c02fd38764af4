//! Formprobe: cross-library form widget interaction for browser tests
//!
//! The same logical form field renders very differently under Material UI,
//! Chakra UI and React-Bootstrap. Formprobe exposes generic operations
//! ("select this option under this label", "set this rating") that find the
//! control, classify its shape and run the right strategy, verifying the
//! value took effect before moving on.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ScenarioRunner ──► Widgets                                     │
//! │                        │                                        │
//! │        ┌───────────────┼──────────────────┐                     │
//! │        ▼               ▼                  ▼                     │
//! │  WidgetLocator   VariantDetector     ValueSetter                │
//! │   (label → root)  (root → kind)   (kind → strategies)           │
//! │                                          │                      │
//! │                                  EventSynthesizer               │
//! │                                          │                      │
//! │                     DomDriver ◄──────────┘                      │
//! │            CdpDriver (browser) │ MemoryDom (in-process)         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use formprobe::prelude::*;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let dom = MemoryDom::new();
//! let group = dom.append(dom.body(), ElementSpec::new("div")).unwrap();
//! dom.append(group, ElementSpec::new("label").text("Department")).unwrap();
//! let select = dom.append(group, ElementSpec::new("select").bind("department")).unwrap();
//! dom.append(select, ElementSpec::new("option").attr("value", "").text("Select...")).unwrap();
//! dom.append(select, ElementSpec::new("option").attr("value", "eng").text("Engineering")).unwrap();
//!
//! let outcome = Widgets::new(&dom).select("Department", "Engineering").await.unwrap();
//! assert!(outcome.is_applied());
//! assert_eq!(dom.field("department").as_deref(), Some("eng"));
//! # });
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod browser;
mod config;
mod driver;
mod event;
mod locator;
#[allow(clippy::missing_errors_doc)]
pub mod memory;
mod result;
mod scenario;
mod strategy;
mod variant;
mod wait;
mod widgets;

#[cfg(feature = "browser")]
pub use browser::{Browser, CdpDriver};
pub use browser::BrowserConfig;
pub use config::{ProbeConfig, DEFAULT_SETTLE_POLL_MS, DEFAULT_SETTLE_TIMEOUT_MS};
pub use driver::{
    normalize_text, AttrFilter, ClickOptions, ClickPosition, DomDriver, ElementQuery, EventKind,
    NodeInfo, NodeRef, Point, SyntheticEvent, TextMatch,
};
pub use event::{EventSynthesizer, INJECTION_EVENTS};
pub use locator::{Adjacency, ControlRoot, WidgetLocator};
pub use result::{ProbeError, ProbeResult};
pub use scenario::{
    FormVariant, Scenario, ScenarioReport, ScenarioRunner, Step, StepReport, DEFAULT_BASE_URL,
    SUCCESS_TEXT,
};
pub use strategy::{
    format_number, priority, Strategy, StrategyAttempt, StrategyOutcome, TargetValue, ValueSetter,
};
pub use variant::{classify_shape, ControlDescriptor, SwitchBinding, VariantDetector, VariantKind};
pub use wait::{
    poll_until, settle, wait_until, WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};
pub use widgets::Widgets;

/// Commonly used items
pub mod prelude {
    #[cfg(feature = "browser")]
    pub use super::browser::{Browser, CdpDriver};
    pub use super::browser::BrowserConfig;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::event::*;
    pub use super::locator::*;
    pub use super::memory::{Behavior, Binding, ElementSpec, MemoryDom, RecordedEvent};
    pub use super::result::*;
    pub use super::scenario::*;
    pub use super::strategy::*;
    pub use super::variant::*;
    pub use super::wait::*;
    pub use super::widgets::*;
}
