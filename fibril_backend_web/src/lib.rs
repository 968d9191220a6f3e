// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for fibril.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`DomHost`]: a [`HostAdapter`] over live DOM nodes
//! - [`IdleLoop`]: a `requestIdleCallback` driver that runs one scheduler
//!   slice per callback
//!
//! ```rust,ignore
//! let host = DomHost::for_container(&container).expect("attached container");
//! let idle = IdleLoop::new(host, container.into(), SchedulerConfig::idle_callback(), |err| {
//!     web_sys::console::error_1(&format!("{err}").into());
//! });
//! idle.render(Element::component("App", app));
//! idle.start();
//! ```

#![no_std]

extern crate alloc;

mod dom;
mod idle;

pub use dom::DomHost;
pub use fibril_core::HostAdapter;
pub use idle::IdleLoop;
