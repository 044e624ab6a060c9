//! Configurators.
//!
//! Two ways to configure the framework: [`basic`] wires the root logger
//! to the console for programs that just want output, and [`dom`] reads
//! a declarative XML document. Both act on the current repository held
//! by the [`manager`](crate::manager).

pub mod basic;
pub mod dom;
pub mod property;

pub use self::dom::DomConfigurator;
