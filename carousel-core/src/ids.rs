//! Slide and element identifiers.
//!
//! Ids are opaque strings: documents produced by other tools use short
//! hand-written ids such as `_tpl_h1`, so any string is accepted. Freshly
//! generated ids are UUID v4 values, and [`IdAllocator`] guarantees they do
//! not collide with anything already present in a document.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::CarouselDocument;
use crate::slide::Slide;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4().simple().to_string())
            }

            /// Borrow the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is the empty string.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Unique identifier of a slide within a document.
    SlideId
);

string_id!(
    /// Unique identifier of an element within a slide (and, after import, the document).
    ElementId
);

/// Issues identifiers that are unique within one document.
///
/// Built from the document's current id set; every id handed out is also
/// recorded, so a batch of allocations (duplicating a slide with many
/// elements, say) never collides with itself either.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    taken: HashSet<String>,
}

impl IdAllocator {
    /// Create an allocator with no reserved ids.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an allocator that avoids every slide and element id in `doc`.
    #[must_use]
    pub fn for_document(doc: &CarouselDocument) -> Self {
        let mut allocator = Self::new();
        for slide in &doc.slides {
            allocator.reserve(slide.id.as_str());
            for id in slide.element_ids() {
                allocator.reserve(id.as_str());
            }
        }
        allocator
    }

    /// Mark an id as used. Returns `false` if it was already taken.
    pub fn reserve(&mut self, id: &str) -> bool {
        self.taken.insert(id.to_string())
    }

    /// Allocate a fresh element id.
    pub fn element_id(&mut self) -> ElementId {
        ElementId(self.fresh())
    }

    /// Allocate a fresh slide id.
    pub fn slide_id(&mut self) -> SlideId {
        SlideId(self.fresh())
    }

    /// Claim every id of `slide`, replacing the ones that are empty or
    /// already taken. Returns how many ids were replaced.
    pub fn adopt(&mut self, slide: &mut Slide) -> usize {
        let mut replaced = 0;
        if slide.id.is_empty() || !self.reserve(slide.id.as_str()) {
            slide.id = self.slide_id();
            replaced += 1;
        }
        for element in slide.elements_mut() {
            if element.id.is_empty() || !self.reserve(element.id.as_str()) {
                element.id = self.element_id();
                replaced += 1;
            }
        }
        replaced
    }

    fn fresh(&mut self) -> String {
        loop {
            let candidate = Uuid::new_v4().simple().to_string();
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
