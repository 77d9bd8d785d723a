//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate history, lifecycle and repository calls into use-case APIs.
//! - Own the input validation boundary.
//! - Keep transport layers decoupled from storage details.

pub mod note_service;
pub mod validation;
