//! HTTP request handlers.

pub mod form;
