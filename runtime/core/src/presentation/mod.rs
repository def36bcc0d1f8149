// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer
//!
//! HTTP surface. Handlers translate requests into calls on the application
//! layer and nothing else.
//!
//! | Module | Serves |
//! |--------|--------|
//! | [`api`] | one `Bailiff` host |
//! | [`registry_api`] | the name registry daemon |

pub mod api;
pub mod registry_api;
