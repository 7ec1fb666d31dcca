//! Trait definitions for Dramaturg text-generation backends.
//!
//! The analysis stations never talk to a provider SDK directly. They go
//! through [`TextGenerator`], which the Gemini backend and the scripted test
//! backend both implement.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::TextGenerator;
