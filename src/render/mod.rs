// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame composition: chart rasterization, blending and frame warps.

pub mod blend;
pub mod chart;
pub mod compose;
pub mod transform;
