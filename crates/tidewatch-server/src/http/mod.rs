// SPDX-License-Identifier: Apache-2.0

pub(crate) mod admin;
pub(crate) mod handlers;
pub(crate) mod observations;
pub(crate) mod regions;
pub(crate) mod species;
