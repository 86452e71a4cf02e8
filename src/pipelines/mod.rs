// SPDX-License-Identifier: GPL-3.0-only

//! Capture pipeline

pub mod capture;
