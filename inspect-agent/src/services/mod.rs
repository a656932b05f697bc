// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod inspector;
pub mod link_analyser;
pub mod logging;
pub mod parser;
