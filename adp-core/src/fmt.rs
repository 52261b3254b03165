//! Logging macros routed to `defmt` or `log` depending on enabled features.
//!
//! Without either feature the macros type-check their arguments and emit
//! nothing. `log` is reached through a re-export, so downstream crates need no
//! `log` dependency of their own. `defmt` cannot be re-exported: a crate that
//! calls these macros must depend on `defmt` whenever `adp-core/defmt` is on,
//! which is why `adp-runtime/defmt` forwards to `adp-core/defmt`.

#[cfg(all(feature = "log", feature = "defmt"))]
compile_error!("features `log` and `defmt` are mutually exclusive");

#[doc(hidden)]
#[cfg(feature = "log")]
pub use ::log as __log;

#[cfg(all(not(doc), feature = "defmt"))]
mod defmt_backend {
    #[macro_export]
    macro_rules! trace {
        ($s:literal $(, $x:expr)* $(,)?) => { ::defmt::trace!($s $(, $x)*) };
    }

    #[macro_export]
    macro_rules! debug {
        ($s:literal $(, $x:expr)* $(,)?) => { ::defmt::debug!($s $(, $x)*) };
    }

    #[macro_export]
    macro_rules! info {
        ($s:literal $(, $x:expr)* $(,)?) => { ::defmt::info!($s $(, $x)*) };
    }

    #[macro_export]
    macro_rules! warn {
        ($s:literal $(, $x:expr)* $(,)?) => { ::defmt::warn!($s $(, $x)*) };
    }
}

#[cfg(all(not(doc), feature = "log"))]
mod log_backend {
    #[macro_export]
    macro_rules! trace {
        ($s:literal $(, $x:expr)* $(,)?) => { $crate::fmt::__log::trace!($s $(, $x)*) };
    }

    #[macro_export]
    macro_rules! debug {
        ($s:literal $(, $x:expr)* $(,)?) => { $crate::fmt::__log::debug!($s $(, $x)*) };
    }

    #[macro_export]
    macro_rules! info {
        ($s:literal $(, $x:expr)* $(,)?) => { $crate::fmt::__log::info!($s $(, $x)*) };
    }

    #[macro_export]
    macro_rules! warn {
        ($s:literal $(, $x:expr)* $(,)?) => { $crate::fmt::__log::warn!($s $(, $x)*) };
    }
}

#[cfg(any(doc, not(any(feature = "defmt", feature = "log"))))]
mod none {
    /// Logs a trace message.
    #[macro_export]
    macro_rules! trace {
        ($s:literal $(, $x:expr)* $(,)?) => {{
            let _ = ($s $(, &$x)*);
        }};
    }

    /// Logs a debug message.
    #[macro_export]
    macro_rules! debug {
        ($s:literal $(, $x:expr)* $(,)?) => {{
            let _ = ($s $(, &$x)*);
        }};
    }

    /// Logs an info message.
    #[macro_export]
    macro_rules! info {
        ($s:literal $(, $x:expr)* $(,)?) => {{
            let _ = ($s $(, &$x)*);
        }};
    }

    /// Logs a warning.
    #[macro_export]
    macro_rules! warn {
        ($s:literal $(, $x:expr)* $(,)?) => {{
            let _ = ($s $(, &$x)*);
        }};
    }
}
