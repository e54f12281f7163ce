// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod categories;
pub mod debts;
pub mod entries;
pub mod fixed;
pub mod remote;
pub mod reports;
pub mod sync;
pub mod transactions;
