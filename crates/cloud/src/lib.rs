//! Concrete clients for the external providers the backend talks to.
//!
//! - [`openai`] -- chat completions behind [`CompletionProvider`].
//! - [`stripe`] -- customers, plans and subscriptions behind [`BillingProvider`].
//! - [`s3`] -- user file storage behind [`ObjectStorage`].
//!
//! [`CompletionProvider`]: mailspark_core::providers::CompletionProvider
//! [`BillingProvider`]: mailspark_core::providers::BillingProvider
//! [`ObjectStorage`]: mailspark_core::providers::ObjectStorage

pub mod openai;
pub mod s3;
pub mod stripe;

mod http;
