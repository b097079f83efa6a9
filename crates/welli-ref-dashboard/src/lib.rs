//! # welli-ref-dashboard
//!
//! Reference runtime for the Welli clinician dashboard's assistant features.
//!
//! Provides the two chat surfaces and three scripted scenarios:
//!
//! 1. **Patient Assistant Panel**: per-patient chat that names its subject.
//! 2. **Medical Assistant Page**: the standalone, subject-free assistant.
//! 3. **Shared Rule Table**: both surfaces on one table, checked for
//!    identical replies apart from the interpolated subject.
//!
//! All data is hardcoded and fictional. No external API calls are made.

pub mod mock_data;
pub mod scenarios;
pub mod surfaces;

pub use surfaces::{ChatSurface, SurfaceKind};
