//! Asset group loaders, one per phase.
//!
//! | Group | Scheduling | Failure |
//! |---|---|---|
//! | fonts | synchronous, no network wait | cannot fail |
//! | styles | fan-out, join | first failure is fatal |
//! | blocks | fan-out, join | per block, recorded |
//! | scripts | one after another | per script, recorded |

pub mod blocks;
pub mod fonts;
pub mod scripts;
pub mod styles;

pub use blocks::{BlockOutcome, load_blocks};
pub use fonts::{font_face_css, load_fonts};
pub use scripts::{ScriptOutcome, load_scripts};
pub use styles::load_styles;
