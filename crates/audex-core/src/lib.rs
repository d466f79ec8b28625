//! Export orchestration.
//!
//! [`Exporter`] turns raw JSON records into an audited, redacted file:
//!
//! ```no_run
//! use audex_core::{Exporter, PolicyRegistry};
//! use audex_model::{ExportConfig, ExportFormat};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let policies = PolicyRegistry::load(std::path::Path::new("policies.toml"))?;
//! let exporter = Exporter::new(policies);
//! let config = ExportConfig::new(ExportFormat::Xlsx, "plans", vec!["name".into()]);
//! let result = exporter.export(&[], &config, "user-42", None, None);
//! println!("{}", result.summary());
//! # Ok(())
//! # }
//! ```
//!
//! Format encoders sit behind [`AdapterRegistry`]; replacing the adapter for a
//! format changes nothing for callers.

mod error;
mod exporter;
mod registry;
mod sink;

pub use error::{ExportError, Result};
pub use exporter::{ExportOutput, Exporter, ProgressFn, USER_HASH_LEN};
pub use registry::{AdapterRegistry, PolicyRegistry};
pub use sink::{DeliverySink, DirectorySink, MemorySink};
