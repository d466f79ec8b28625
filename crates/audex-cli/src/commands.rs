use std::io::{self, IsTerminal};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, info_span};

use audex_cli::records::load_records;
use audex_core::{DirectorySink, Exporter, PolicyRegistry};
use audex_hash::Hasher;
use audex_model::{CancelFlag, DateRange, ExportConfig, ExportProgress, ExportResult};

use crate::cli::{ExportArgs, PoliciesArgs, PreviewArgs, RequestArgs};
use crate::summary::{print_policies, print_policy_fields, print_preview};

const PROGRESS_TEMPLATE: &str = "{spinner:.cyan} [{bar:32.cyan/blue}] {pos:>3}% {msg}";

/// Shell convention for a run stopped by SIGINT.
pub const EXIT_CANCELLED: i32 = 130;

pub fn export_exit_code(result: &ExportResult) -> i32 {
    match result {
        ExportResult::Success { .. } => 0,
        ExportResult::Cancelled { .. } => EXIT_CANCELLED,
        ExportResult::Error { .. } => 1,
    }
}

pub fn run_export(args: &ExportArgs, cancel: &CancelFlag) -> Result<ExportResult> {
    let request = &args.request;
    let span = info_span!("export_command", module = %request.module, format = ?request.format);
    let _guard = span.enter();
    let start = Instant::now();

    let exporter = build_exporter(request)?.with_sink(DirectorySink::new(args.out.clone()));
    let records = load_records(&request.records)?;
    let config = build_config(request, exporter.policies());

    let bar = progress_bar(args.no_progress);
    let mut on_progress = |progress: &ExportProgress| {
        bar.set_position(u64::from(progress.percent));
        bar.set_message(progress.message.clone());
    };
    let result = exporter.export(
        &records,
        &config,
        &request.user,
        Some(&mut on_progress),
        Some(cancel),
    );
    bar.finish_and_clear();

    info!(
        outcome = %result.summary(),
        duration_ms = start.elapsed().as_millis(),
        "export command finished"
    );
    Ok(result)
}

pub fn run_preview(args: &PreviewArgs) -> Result<()> {
    let request = &args.request;
    let span = info_span!("preview_command", module = %request.module);
    let _guard = span.enter();

    let exporter = build_exporter(request)?;
    let records = load_records(&request.records)?;
    let config = build_config(request, exporter.policies());
    let payload = exporter
        .preview(&records, &config, &request.user)
        .context("preview export")?;
    print_preview(&payload, args.limit);
    Ok(())
}

pub fn run_policies(args: &PoliciesArgs) -> Result<()> {
    let registry = load_policies(args)?;
    match &args.module {
        Some(module) => {
            let policy = registry.get(module.trim()).ok_or_else(|| {
                anyhow!(
                    "unknown module {module:?} (known: {})",
                    registry.modules().join(", ")
                )
            })?;
            print_policy_fields(policy);
        }
        None => print_policies(&registry),
    }
    Ok(())
}

fn load_policies(args: &PoliciesArgs) -> Result<PolicyRegistry> {
    PolicyRegistry::load(&args.policies)
        .with_context(|| format!("load policy catalog {}", args.policies.display()))
}

fn build_exporter(request: &RequestArgs) -> Result<Exporter> {
    let policies = PolicyRegistry::load(&request.policies)
        .with_context(|| format!("load policy catalog {}", request.policies.display()))?;
    let exporter = Exporter::new(policies);
    Ok(if request.fallback_hash {
        exporter.with_hasher(Hasher::fallback())
    } else {
        exporter
    })
}

/// Turn flags into an export request. Without `--fields` the policy's default
/// selection is used; an unknown module is left for the exporter to report.
fn build_config(request: &RequestArgs, policies: &PolicyRegistry) -> ExportConfig {
    let selected = if request.fields.is_empty() {
        policies
            .get(request.module.trim())
            .map(|policy| policy.default_selection())
            .unwrap_or_default()
    } else {
        request
            .fields
            .iter()
            .map(|field| field.trim().to_string())
            .collect()
    };
    let mut config = ExportConfig::new(request.format.into(), request.module.clone(), selected)
        .with_audit_metadata(!request.no_audit);
    if let (Some(from), Some(to)) = (request.from, request.to) {
        config = config.with_date_range(DateRange::new(from, to));
    }
    for (key, value) in &request.filters {
        config = config.with_filter(key.clone(), value.clone());
    }
    if request.full_export {
        config = config.with_full_export(request.confirm);
    }
    debug!(
        fields = config.selected_fields.len(),
        full_export = config.full_export,
        "export config built"
    );
    config
}

fn progress_bar(hidden: bool) -> ProgressBar {
    if hidden || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(100);
    match ProgressStyle::with_template(PROGRESS_TEMPLATE) {
        Ok(style) => bar.set_style(style.progress_chars("=> ")),
        Err(error) => debug!(%error, "progress template rejected"),
    }
    bar
}
