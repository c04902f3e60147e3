//! Bitcoin script envelope format utilities for the ANCHOR inscription
//! carrier.
//!
//! This crate provides functionality for creating and parsing Bitcoin script
//! envelopes that encapsulate arbitrary data within `OP_FALSE OP_IF ... OP_ENDIF`
//! blocks, tagged with a protocol id and a content type.
//!
//! # Envelope Structure
//!
//! ```text
//! OP_FALSE
//! OP_IF
//!   <protocol id>
//!   OP_1 <content type>
//!   OP_0 <body_chunk_0> ... <body_chunk_n>
//! OP_ENDIF
//! OP_TRUE
//! ```
//!
//! Bodies larger than 520 bytes are automatically chunked to comply with
//! Bitcoin's consensus rules, and reassembled on parse.
//!
//! # Examples
//!
//! ```
//! use anchor_envelope_fmt::{builder::build_tagged_envelope, parser::parse_tagged_envelope};
//!
//! let body = vec![1; 1200];
//! let script = build_tagged_envelope(b"anchor", b"text/plain", &body).unwrap();
//!
//! let env = parse_tagged_envelope(&script, b"anchor").unwrap();
//! assert_eq!(env.content_type(), b"text/plain");
//! assert_eq!(env.body(), &body[..]);
//! ```

/// Bitcoin script envelope builder utilities.
pub mod builder;

/// Error types for envelope operations.
pub mod errors;

/// Bitcoin script envelope parser utilities.
pub mod parser;
