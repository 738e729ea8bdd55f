//! Low-level building blocks for custom matching pipelines.
//!
//! These expose the correlation kernels and peak selection used by
//! [`Finder`](crate::Finder), for callers that already hold pixel buffers and
//! want score maps directly.

pub use crate::candidate::{best_peak, peaks_at_least, Peak};
#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::ZnccRayon;
pub use crate::kernel::fft::ZnccFft;
pub use crate::kernel::scalar::ZnccScalar;
pub use crate::kernel::{Kernel, ScoreMap};
pub use crate::template::TemplatePlan;
