//! Shared test code for the DPoS transaction validation crates.
// Standard lints
#![warn(missing_docs)]
#![allow(clippy::try_err)]
#![deny(clippy::await_holding_lock)]
#![forbid(unsafe_code)]

use std::{collections::HashSet, fmt, panic::PanicInfo, sync::Once};

use color_eyre::{config::Frame, section::PanicMessage};
use once_cell::sync::Lazy;
use owo_colors::OwoColorize;
use tracing_error::ErrorLayer;
use tracing_subscriber::{prelude::*, EnvFilter};

pub mod prelude;
pub mod service_extensions;

/// The log filter used when `RUST_LOG` is unset.
///
/// The verifier logs every rejection at `debug`, and most tests expect
/// rejections, so consensus logs are quieter than the rest.
pub const DEFAULT_LOG_FILTER: &str = "warn,ela_consensus=error";

/// A multi-threaded Tokio runtime that can be shared between tests.
///
/// Verifier tests hand work to the rayon pool and wait on it from async
/// code, so they need a runtime with real worker threads. A shared runtime
/// must not be used by tests that pause the Tokio timer.
pub static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("test runtime builds")
});

static INIT: Once = Once::new();

/// Installs the tracing subscriber and the error report hooks.
///
/// Call at the start of every test. Later calls do nothing.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .with(ErrorLayer::default())
            .init();

        color_eyre::config::HookBuilder::default()
            .add_frame_filter(Box::new(keep_test_frames))
            .panic_message(TestPanicMessage)
            .install()
            .expect("report hooks are installed once");
    })
}

/// Frames from these paths are runtime or harness plumbing, not test code.
const HIDDEN_FRAME_PREFIXES: &[&str] = &[
    "tokio::",
    "rayon_core::",
    "std::panic",
    "std::thread::local",
    "test::run_test_in_process",
    "test::assert_test_result",
    "core::ops::function::FnOnce::call_once",
    "core::result::Result",
    "<core::future::",
    "<alloc::boxed::Box",
    "<std::panic::AssertUnwindSafe",
    "<futures_util::",
    "<T as futures_util",
    "<tracing_futures::Instrumented",
];

/// Keeps the first frame at each location, unless it is harness plumbing.
fn keep_test_frames(frames: &mut Vec<&Frame>) {
    let mut seen = HashSet::new();

    frames.retain(|frame| {
        let Some(name) = frame.name.as_deref() else {
            return false;
        };

        seen.insert((frame.filename.clone(), frame.lineno))
            && !HIDDEN_FRAME_PREFIXES
                .iter()
                .any(|prefix| name.starts_with(prefix))
    });
}

/// Prints test panics, except the panic raised when a test returns `Err`.
///
/// The test harness has already printed the error report in that case.
struct TestPanicMessage;

const RETURNED_ERR: &str = "the test returned a termination value with a non-zero status code";

impl PanicMessage for TestPanicMessage {
    fn display(&self, info: &PanicInfo<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload = info.payload();
        let message = payload
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| payload.downcast_ref::<&str>().copied())
            .unwrap_or("<non string panic payload>");

        if message.contains(RETURNED_ERR) {
            return write!(f, "---- end of test output ----");
        }

        writeln!(f, "{}", "\nThe test panicked.".red())?;
        writeln!(f, "Message:  {}", message.cyan())?;
        match info.location() {
            Some(location) => write!(
                f,
                "Location: {}:{}",
                location.file().purple(),
                location.line().purple()
            ),
            None => write!(f, "Location: <unknown>"),
        }
    }
}
