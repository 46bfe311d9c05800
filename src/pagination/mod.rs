//! Cursor pagination.
//!
//! - `cursor`: continuation token codec (the wire contract)
//! - `types`: request validation and the page envelope
//! - `engine`: the fetch-`page_size + 1`-and-trim window over an ordered source

mod cursor;
mod engine;
mod types;

pub use cursor::{CursorError, TOKEN_LEN, decode_cursor, encode_cursor};
pub use engine::{CursorKey, ScopedRecords, WindowSource, paginate};
pub use types::{MAX_PAGE_SIZE, MIN_PAGE_SIZE, OrderDirection, Page, PageRequest};
