//! Deck / Card Motion System
//!
//! Two ordered card stacks and a serialized stream of curved single-card
//! transfers between them.
//!
//! ```text
//!   Left stack            CardTransfer (world space)            Right stack
//!  ┌────────┐   pop top   ┌──────────────────────────┐  commit  ┌────────┐
//!  │ z = n  │ ──────────► │ quadratic Bézier, t: 0→1 │ ───────► │ z+1    │
//!  │  ...   │             └──────────────────────────┘          │  ...   │
//!  └────────┘                                                   └────────┘
//! ```
//!
//! At most one transfer is in flight. Stacks keep an explicit top-card
//! cache updated on every push/pop; a full re-scan only happens when the
//! cache is found stale.

pub mod card;
pub mod stack;
pub mod transfer;
pub mod system;

pub use card::{Card, CardHome, CardId};
pub use stack::{Stack, StackSide};
pub use transfer::CardTransfer;
pub use system::{Deck, DeckEvent};
