// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for type safety across anchorscan.
//!
//! This module provides newtype wrappers for domain concepts:
//! - Chain identifiers and roles
//! - Block identifiers and chain-scoped block references
//! - On-chain timestamps, spec versions and storage keys
//! - Cached block payloads

pub mod chain;

// Note: Public types are re-exported from lib.rs, not here
