use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;
use tokio::fs;

use crate::planner::{Plan, Slot};

/// Writes the plan as pretty JSON, creating parent directories as needed.
pub async fn write_plan_json(plan: &Plan, out_path: &Path) -> Result<()> {
    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }
    let json = serde_json::to_string_pretty(plan).context("Failed to serialize plan")?;
    fs::write(out_path, json)
        .await
        .with_context(|| format!("Failed to write plan to {:?}", out_path))?;
    Ok(())
}

/// Human-readable per-day breakdown and weekly totals.
pub fn format_summary(plan: &Plan) -> String {
    let mut out = String::new();
    for day in &plan.days {
        let _ = writeln!(out, "DAY {}: rel_err={:.3} quality={:.3}", day.day, day.info.relative_error, day.info.quality);
        let meals = [
            (Slot::Breakfast, &day.meals.breakfast),
            (Slot::Lunch, &day.meals.lunch),
            (Slot::Dinner, &day.meals.dinner),
        ];
        for (slot, meal) in meals {
            let _ = writeln!(
                out,
                "  {}: {} | items={} | P={:.1} C={:.1} F={:.1}",
                slot.as_str().to_uppercase(),
                meal.names.join(", "),
                meal.roles.len(),
                meal.macros.protein,
                meal.macros.carbs,
                meal.macros.fat
            );
        }
    }
    let wt = &plan.weekly_totals;
    let _ = writeln!(
        out,
        "WEEK TOTALS: P={:.1} C={:.1} F={:.1} kcal={:.0} price={:.2}",
        wt.protein, wt.carbs, wt.fat, wt.kcal, wt.price
    );
    out
}
