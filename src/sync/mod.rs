// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod channel;
pub mod http;
pub mod memory;
pub mod reconcile;

pub use channel::{Connector, FamilyCode, ReplicaEvent, Subscription, SyncChannel, SyncError};
pub use http::{HttpConnector, HttpReplica, RemoteConfig};
pub use memory::MemoryReplica;
pub use reconcile::{Bootstrap, reconcile};
