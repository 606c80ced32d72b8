/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Keeping faults inside the call
//!
//! Every boundary call runs through [`guarded`], so a panic in the
//! engine becomes an `Unknown` error result instead of unwinding into
//! the host.
//!
//! On targets built with `panic = "abort"` (the default for wasm32)
//! there is nothing to catch, the panic hook of the host crate reports
//! those.
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use log::error;

use crate::errors::{BridgeError, ErrorDescriptor};

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "Unknown error".to_string()
    }
}

/// Run `call`, translating a panic into an `Unknown` descriptor
pub(crate) fn guarded<T>(call: impl FnOnce() -> T) -> Result<T, ErrorDescriptor> {
    // the closures only capture borrowed inputs and fresh outputs, none
    // of which is observed again after a panic
    catch_unwind(AssertUnwindSafe(call)).map_err(|payload| {
        let err = BridgeError::Unknown(panic_message(payload.as_ref()));
        error!("Recovered from a fault inside the engine: {}", err.message());
        err.to_descriptor()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn values_pass_through() {
        assert_eq!(guarded(|| 42), Ok(42));
    }

    #[test]
    fn panics_become_unknown_errors() {
        let err = guarded(|| -> u8 { panic!("boom") }).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unknown);
        assert_eq!(err.message, "boom");

        let code = 7;
        let err = guarded(|| -> u8 { panic!("code {code}") }).unwrap_err();
        assert_eq!(err.message, "code 7");

        let err = guarded(|| -> u8 { std::panic::panic_any(3_u32) }).unwrap_err();
        assert_eq!(err.message, "Unknown error");
    }
}
