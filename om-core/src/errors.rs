pub use std::backtrace::Backtrace;

pub use anyhow::{
    anyhow,
    bail,
    ensure,
};
pub use paste::paste;
pub use regex::{
    Regex,
    RegexBuilder,
};
pub use thiserror::Error;

pub type EmptyResult = anyhow::Result<()>;

pub const BUILD_DIR: &str = "/.build/";
pub const RUSTC_DIR: &str = "/rustc/";
pub const GLIBC: &str = "glibc";

// Declares a thiserror enum at the given visibility, plus a crate-local snake_case constructor
// per variant that wraps it in an anyhow::Error, e.g. `ReconcileError::unknown_field("spec.foo")`.
#[macro_export]
macro_rules! err_impl {
    (@hidden $errtype:ident, $item:ident, String) => {
        paste! {
            #[allow(dead_code)]
            pub(crate) fn [<$item:snake>](in_: &str) -> anyhow::Error {
                anyhow!{$errtype::$item(in_.into())}
            }
        }
    };

    (@hidden $errtype:ident, $item:ident, $($dtype:tt)::+) => {
        paste! {
            #[allow(dead_code)]
            pub(crate) fn [<$item:snake>](in_: &$($dtype)::+) -> anyhow::Error {
                anyhow!{$errtype::$item(in_.clone())}
            }
        }
    };

    ($vis:vis $errtype:ident,
        $(#[$errinfo:meta] $item:ident($($dtype:tt)::+),)+
    ) => {
        #[derive(Debug, Error)]
        $vis enum $errtype {
            $(#[$errinfo] $item($($dtype)::+)),+
        }

        impl $errtype {
            $(err_impl! {@hidden $errtype, $item, $($dtype)::+})+
        }
    };
}

// Logs an error along with the frames of its backtrace that point into objmatch code.  Only
// meant for the top-level handler in omctl's main.
#[macro_export]
macro_rules! omerr {
    ($err:ident, $msg:literal $(, $args:expr)*) => {
        error!(
            concat!($msg, "\n\n{}\n\nPartial Stack Trace:\n\n{}\n\n") $(, $args)*,
            $err,
            $crate::errors::prune_backtrace(&$err.backtrace().to_string())
        );
    };
}

fn skipped(count: usize) -> String {
    match count {
        0 => String::new(),
        1 => "      -- <skipped 1 frame> --\n".into(),
        n => format!("      -- <skipped {n} frames> --\n"),
    }
}

// Drops std, toolchain and libc frames from a rendered backtrace, leaving a marker with the
// number of frames dropped in their place
pub fn prune_backtrace(bt: &str) -> String {
    let Ok(frame_re) = RegexBuilder::new(r"^\s+\d+(?s:.*?)(\s+at\s+.*:\d+)$").multi_line(true).build() else {
        return bt.into();
    };

    let mut pruned = String::new();
    let mut dropped = 0;
    for frame in frame_re.find_iter(bt).map(|m| m.as_str()) {
        if frame.contains(BUILD_DIR) || frame.contains(RUSTC_DIR) || frame.contains(GLIBC) {
            dropped += 1;
        } else if !frame.is_empty() {
            pruned += &skipped(dropped);
            pruned += frame;
            pruned.push('\n');
            dropped = 0;
        }
    }
    pruned += &skipped(dropped);
    pruned.trim_end().into()
}

pub use {
    err_impl,
    omerr,
};

err_impl! {pub ReconcileError,
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("value cannot be coerced to declared type: {0}")]
    TypeMismatch(String),

    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    #[error("cannot compare objects of different types: {0}")]
    ResourceTypeMismatch(String),
}

err_impl! {pub SchemaError,
    #[error("duplicate field name: {0}")]
    DuplicateField(String),

    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("unknown resource kind: {0}")]
    UnknownKind(String),

    #[error("invalid field kind: {0}")]
    InvalidFieldKind(String),
}
