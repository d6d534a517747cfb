//! Formatted terminal output for training runs.
//!
//! We keep formatting code in one place so:
//! - the pipeline and math code stay clean and testable
//! - output changes are localized

use crate::app::pipeline::RunOutput;
use crate::domain::ProductModel;
use crate::domain::FEATURE_NAMES;

/// Format the run summary (dataset stats + per-product diagnostics).
pub fn format_run_summary(run: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== pf - Per-Product Price Models ===\n");
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        run.ingest.rows_read,
        run.ingest.rows_used,
        run.ingest.row_errors.len()
    ));
    out.push_str(&format!(
        "Features: rows={} | products={} | base year={}\n",
        run.table.rows.len(),
        run.table.periods_per_product.len(),
        run.table.min_year
    ));

    out.push_str("\nTrained models:\n");
    out.push_str(&format_models_table(run.snapshot.models.values()));

    if !run.insufficient.is_empty() || !run.failures.is_empty() {
        out.push_str("\nSkipped:\n");
        for err in run.insufficient.iter().chain(&run.failures) {
            out.push_str(&format!("- {err}\n"));
        }
    }

    match &run.snapshot.revenue {
        Some(rev) => out.push_str(&format!(
            "\nRevenue model: n={} RMSE={:.3}\n",
            rev.n_obs, rev.rmse
        )),
        None => out.push_str("\nRevenue model: not trained\n"),
    }
    match &run.snapshot.discount {
        Some(d) => out.push_str(&format!(
            "Discount model: n={} RMSE={:.4}\n",
            d.n_obs, d.rmse
        )),
        None => out.push_str("Discount model: not trained\n"),
    }

    out
}

/// One line per model: product, observations, in-sample RMSE, intercept.
pub fn format_models_table<'a>(models: impl IntoIterator<Item = &'a ProductModel>) -> String {
    let mut out = String::new();
    out.push_str(
        format!("{:<24} {:>6} {:>10} {:>12}\n", "product", "n", "rmse", "intercept").trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<24} {:-<6} {:-<10} {:-<12}\n", "", "", "", "").trim_end());
    out.push('\n');

    for m in models {
        out.push_str(
            format!(
                "{:<24} {:>6} {:>10.4} {:>12.4}\n",
                truncate(&m.product, 24),
                m.n_obs,
                m.rmse,
                m.model.intercept
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Named coefficients for a single model.
pub fn format_coefficients(model: &ProductModel) -> String {
    let mut out = format!("{} (intercept {:.6})\n", model.product, model.model.intercept);
    for (name, beta) in FEATURE_NAMES.iter().zip(&model.model.coefficients) {
        out.push_str(&format!("  {name:<20} {beta:>14.6}\n"));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
