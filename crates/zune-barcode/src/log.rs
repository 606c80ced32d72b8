/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Stand-in for the `log` crate when the `log` feature is disabled.
//!
//! Every macro accepts the same arguments as its `log` counterpart
//! and expands to nothing, so call sites never need a `cfg`.

// #[macro_export] always places the macro in the crate root,
// #[doc(hidden)] + "pub use" namespaces it under `crate::log`.
pub use crate::{
    __barcode_debug as debug, __barcode_error as error, __barcode_info as info,
    __barcode_log_enabled as log_enabled, __barcode_trace as trace, __barcode_warn as warn
};

#[repr(usize)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Level {
    Error = 1,
    Warn,
    Info,
    Debug,
    Trace
}

#[doc(hidden)]
#[macro_export]
macro_rules! __barcode_log_enabled {
    ($lvl:expr) => {{
        let _ = $lvl;
        false
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __barcode_error {
    ($($arg:tt)+) => {};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __barcode_warn {
    ($($arg:tt)+) => {};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __barcode_info {
    ($($arg:tt)+) => {};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __barcode_debug {
    ($($arg:tt)+) => {};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __barcode_trace {
    ($($arg:tt)+) => {};
}
