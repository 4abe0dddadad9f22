// src/lib.rs

//! gazette — course-of-appearance model for newspaper digitization.
//!
//! A course of appearance records on which days which issues of a newspaper
//! physically appeared. It consists of blocks of time, each holding one or
//! more issues, and can be split into digitization work units ("processes")
//! at a chosen granularity.

pub mod describe;
pub mod error;
pub mod models;
pub mod utils;
pub mod xml;
