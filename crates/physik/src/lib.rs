//! Page logic for the Physik reference site.
//!
//! This crate provides:
//! - Section search with debouncing, reversible term highlighting and URL sync
//! - A damped pendulum stepped once per animation frame
//! - Theme, menu, disclosure-panel, counter and confetti state
//! - Transition descriptions for the page's animation library
//!
//! Everything here is target-independent; the browser bindings live in
//! `physik-home`.

pub mod anim;
pub mod config;
pub mod confetti;
pub mod counter;
pub mod error;
pub mod highlight;
pub mod index;
pub mod nav;
pub mod pendulum;
pub mod progress;
pub mod search;
pub mod theme;
pub mod widgets;

pub use anim::{Animator, ScrollCallbacks, ScrollSpec, Tween};
pub use config::{PendulumConfig, SiteConfig};
pub use error::{ConfigError, ParamError, ThemeError};
pub use highlight::{segment, ContentNode, Matcher, Segment};
pub use index::{normalize_query, MatchResult, Section, SectionIndex};
pub use pendulum::{Pendulum, PendulumState, RunState, Scene};
pub use search::{
    Evaluation, ManualTimers, NoResultsIndicator, SearchController, SearchState, SearchView,
    ShowAction, TimerId, Timers,
};
pub use theme::Theme;
