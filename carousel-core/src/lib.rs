//! # Carousel Core
//!
//! Editing engine for multi-slide social media carousels.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                carousel-core                │
//! ├─────────────────────────────────────────────┤
//! │  Document Model  │  Editor Engine           │
//! │  - Slides        │  - Actions / reducer     │
//! │  - Elements      │  - Undo / redo history   │
//! │  - Theme         │  - Selection, view mode  │
//! ├─────────────────────────────────────────────┤
//! │  Geometry        │  Interaction             │
//! │  - Smart guides  │  - Drag / resize session │
//! │  - Layout maps   │  - Gesture coalescing    │
//! ├─────────────────────────────────────────────┤
//! │  Collaborators: migrate, export, store,     │
//! │  autosave, templates                        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Every document change goes through [`EditorState::dispatch`] (or the
//! by-value [`reduce`]). Requests that do not apply leave the state exactly
//! as it was.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod autosave;
pub mod config;
pub mod document;
pub mod drag;
pub mod element;
pub mod error;
pub mod export;
pub mod geometry;
pub mod guides;
pub mod history;
pub mod ids;
pub mod markup;
pub mod migrate;
pub mod slide;
pub mod state;
pub mod store;
pub mod templates;
pub mod theme;

pub use action::Action;
pub use autosave::{AutoSaver, SaveEvent};
pub use config::{AutoSaveConfig, DragConfig, EditorConfig, SnapConfig};
pub use document::{CarouselDocument, DocumentFormat, Footer, FooterStyle, Header};
pub use drag::{DragController, DragMode, DragPhase};
pub use element::{Element, ElementKind, ElementStyle, HeadingLevel, TextAlign};
pub use error::{CarouselError, CarouselResult};
pub use geometry::{CanvasSize, Frame, Point, Rect, ScreenRect, SlideMeasurement, SlideMeasurer, CANVAS};
pub use guides::{smart_guides, Guide, GuideOrientation, GuideResult};
pub use history::History;
pub use ids::{ElementId, IdAllocator, SlideId};
pub use migrate::{migrate, MigrateError, MigrationReport};
pub use slide::{Direction, Slide, SlideBody, SlideElement, SlideLayout};
pub use state::{reduce, EditorState, Selection, ViewMode};
pub use store::{DocumentStore, FileStore, MemoryStore, StoreError};
pub use templates::SlideTemplate;
pub use theme::Theme;

/// Carousel core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
