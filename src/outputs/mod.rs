//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: Writes the board snapshot consumed by the display page
//!
//! # Output Structure
//!
//! ```text
//! data/
//! ├── stories.json    # news profile
//! └── research.json   # research profile
//! ```

pub mod json;
