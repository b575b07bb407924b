#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cfdp_logging` is the workspace's logging facade: a small verbosity-level
//! model plus a [`init`] bootstrap that wires
//! `tracing` output to the terminal. Every other crate in the workspace
//! emits through `tracing`'s `trace!`/`debug!`/`info!`/`warn!`/`error!`
//! macros directly rather than depending on this crate — this crate only
//! owns turning a [`Verbosity`] (or `RUST_LOG`) into an installed
//! subscriber.
//!
//! # Design
//!
//! There is no per-area `InfoFlag`/`DebugFlag` table here: the receiver core
//! has no CLI of its own, so a flag-parsing surface would have nothing to
//! parse. What remains is the *progressive verbosity level* idea, reduced to
//! the four levels a host binary actually needs to choose between.
//!
//! # Invariants
//!
//! - [`init`] is safe to call more than once per process (a second call is
//!   a no-op rather than a panic), so host binaries and test harnesses can
//!   call it defensively.
//! - An explicit `RUST_LOG` environment variable always takes precedence
//!   over the [`Verbosity`] argument passed to [`init`].
//!
//! # Examples
//!
//! ```
//! use cfdp_logging::{init, transaction_span, Verbosity};
//!
//! init(Verbosity::from_occurrences(2));
//! let _span = transaction_span(42, 7).entered();
//! tracing::info!("metadata received");
//! ```
//!
//! # See also
//!
//! - [`cfdp_receiver`](https://docs.rs/cfdp_receiver) instruments its state
//!   transitions with [`transaction_span`].

use tracing_subscriber::EnvFilter;

/// A coarse, progressive logging verbosity, independent of any particular
/// command-line flag syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Verbosity {
    /// Only warnings and errors.
    Quiet,
    /// Warnings, errors, and top-level lifecycle events. The default.
    #[default]
    Normal,
    /// Adds per-PDU and per-transition detail.
    Verbose,
    /// Adds per-segment and per-timer-tick detail.
    Debug,
}

impl Verbosity {
    /// Derives a verbosity from a repeat-count such as a host binary's `-v`
    /// occurrences, saturating at [`Verbosity::Debug`].
    #[must_use]
    pub const fn from_occurrences(count: u8) -> Self {
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// The `tracing` level this verbosity corresponds to.
    #[must_use]
    pub const fn tracing_level(self) -> tracing::Level {
        match self {
            Self::Quiet => tracing::Level::WARN,
            Self::Normal => tracing::Level::INFO,
            Self::Verbose => tracing::Level::DEBUG,
            Self::Debug => tracing::Level::TRACE,
        }
    }
}

/// Installs a `tracing_subscriber::fmt` subscriber as the global default.
///
/// Honors `RUST_LOG` when set; otherwise filters at `verbosity`'s
/// [`Verbosity::tracing_level`]. Calling this more than once (for example
/// from multiple integration tests in the same binary) is harmless: the
/// second and later calls silently do nothing, since a global subscriber is
/// already installed.
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.tracing_level().to_string()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Builds the `tracing` span the receiver state machine enters for the
/// duration of work on one transaction, so `RUST_LOG` filtering can isolate
/// a single transaction's log lines in a multi-transaction deployment.
#[must_use]
pub fn transaction_span(source_entity_id: u64, transaction_seq_no: u64) -> tracing::Span {
    tracing::info_span!(
        "cfdp_transaction",
        source_entity_id,
        transaction_seq_no,
    )
}
