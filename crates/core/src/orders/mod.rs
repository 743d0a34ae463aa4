//! Order domain: status machine, domain record and submission outcomes.
//!
//! Orders are created `NEW` by ingestion and advanced only by the
//! reconciliation worker:
//!
//! ```text
//! NEW ──► PROCESSING ──► PROCESSED
//!  │          │  ▲
//!  │          └──┘ (refresh)
//!  ├──────────────────► PROCESSED
//!  └──────────────────► INVALID ◄── PROCESSING
//! ```

pub mod error;
pub mod types;

pub use error::OrderError;
pub use types::{Order, OrderStatus, SubmitOutcome};
