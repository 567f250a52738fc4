//! Domain logic for the MailSpark email generation backend.
//!
//! Everything in this crate is free of database and HTTP concerns: the
//! template tree and its placeholder engine, copy generation against an
//! abstract completion provider, the session save codec, and the credit
//! policy behind the usage gate.

pub mod billing;
pub mod catalog;
pub mod copywriting;
pub mod error;
pub mod providers;
pub mod session_codec;
pub mod style;
pub mod template;
pub mod types;
