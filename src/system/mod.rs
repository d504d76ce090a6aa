//! # System Interaction Layer
//!
//! The boundary between the command pipeline and the operating system.
//!
//! ## Modules
//!
//! - **`executor`**: Launches the final argument vector as a direct process through the
//!   [`executor::Launcher`] seam, either capturing its output or attaching it to the
//!   caller's terminal, and maps failures onto [`executor::ExecutionError`].

pub mod executor;
