use chrono::NaiveDate;
use clap::Args;
use nutriplan_core::models::PlanDetails;
use nutriplan_core::{
    normalize_plan, plan_targets, render, CategoryTable, LayoutOptions, PageSection, PlanDocument,
};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use super::{parse_date, CommandError, OutputFormat};
use crate::config::Config;
use crate::input::{read_json, InputError};

/// Lay out one or more plan documents as printable sections
#[derive(Args)]
pub struct RenderCommand {
    /// Plan files (JSON): a bare plan, or an object with `plan`, `details`
    /// and `start_date`
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Include macro summaries
    #[arg(long)]
    macros: bool,

    /// Include the plan description
    #[arg(long)]
    description: bool,

    /// Include the guidelines
    #[arg(long)]
    guidelines: bool,

    /// Include the supplements
    #[arg(long)]
    supplements: bool,

    /// Date of `day_1` (YYYY-MM-DD); overrides the document's own
    #[arg(long)]
    start_date: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Serialize)]
struct RenderedDocument {
    file: PathBuf,
    sections: Vec<PageSection>,
}

impl RenderCommand {
    /// Section flags select exactly the sections named; without any, the
    /// configured layout applies.
    fn layout_options(&self, config: &Config) -> LayoutOptions {
        if self.macros || self.description || self.guidelines || self.supplements {
            LayoutOptions {
                include_macros: self.macros,
                include_description: self.description,
                include_guidelines: self.guidelines,
                include_supplements: self.supplements,
            }
        } else {
            config.layout.value
        }
    }

    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let start_date = self.start_date.as_deref().map(parse_date).transpose()?;
        let options = self.layout_options(config);
        let table = Arc::new(config.category_table());

        let handles: Vec<_> = self
            .files
            .iter()
            .cloned()
            .map(|file| {
                let table = Arc::clone(&table);
                tokio::task::spawn_blocking(move || {
                    render_file(file, start_date, &options, &table)
                })
            })
            .collect();

        let mut rendered = Vec::with_capacity(handles.len());
        for handle in handles {
            let document = handle
                .await
                .map_err(|e| CommandError::Task(e.to_string()))??;
            rendered.push(document);
        }
        tracing::info!(documents = rendered.len(), "rendered documents");

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rendered)?),
            OutputFormat::Text => {
                for (index, document) in rendered.iter().enumerate() {
                    if index > 0 {
                        println!();
                    }
                    if rendered.len() > 1 {
                        println!("# {}\n", document.file.display());
                    }
                    for section in &document.sections {
                        println!("{}", section);
                    }
                }
            }
        }
        Ok(())
    }
}

fn render_file(
    file: PathBuf,
    start_date: Option<NaiveDate>,
    options: &LayoutOptions,
    table: &CategoryTable,
) -> Result<RenderedDocument, InputError> {
    let mut document = load_document(&read_json(&file)?);
    if start_date.is_some() {
        document.start_date = start_date;
    }
    let sections = render(&document, options, table);
    Ok(RenderedDocument { file, sections })
}

/// Builds a document from either a wrapper object carrying `plan` or a bare
/// plan of any accepted shape.
fn load_document(raw: &Value) -> PlanDocument {
    let Some(plan) = raw.get("plan").filter(|plan| plan.is_object() || plan.is_array()) else {
        return PlanDocument::new(normalize_plan(raw)).with_targets(plan_targets(raw));
    };

    let details = raw
        .get("details")
        .and_then(|details| serde_json::from_value::<PlanDetails>(details.clone()).ok())
        .unwrap_or_default();
    let start_date = raw
        .get("start_date")
        .and_then(Value::as_str)
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok());

    PlanDocument::new(normalize_plan(plan))
        .with_details(details)
        .with_start_date(start_date)
        .with_targets(plan_targets(plan))
}
