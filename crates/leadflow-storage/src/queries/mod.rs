// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed queries over the journey tables.

pub mod history;
pub mod schedules;
pub mod templates;
