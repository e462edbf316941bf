//! # Architecture Abstraction Layer
//!
//! The scheduler itself is portable; a port only has to drive
//! [`kernel::on_tick`](crate::kernel::on_tick) from a periodic interrupt at
//! `TICK_HZ`. The Cortex-M0+ port uses SysTick.

pub mod cortex_m0plus;
