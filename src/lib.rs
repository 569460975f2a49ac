//! Quarterly vaccination doses per manufacturer, folded into a
//! location → year → quarter → vaccine tree and laid out with a
//! force-directed simulation.

pub mod error;
pub mod export;
pub mod layout;
pub mod util;
pub mod vaccinations;

pub use error::{LayoutError, PipelineError};
