// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod persistence;
pub mod storage;
pub mod store;
pub mod utils;
pub mod views;
pub mod commands;
