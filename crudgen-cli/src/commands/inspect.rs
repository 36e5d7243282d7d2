//! Show how a record's fields are classified

use anyhow::Result;
use clap::Args;
use console::style;
use crudgen::classify::FieldClassifier;
use crudgen::state::FieldRoles;
use crudgen_cli_lib::SourceArgs;

/// Print the primary, soft-delete, read and write role of every field
#[derive(Debug, Args)]
pub struct InspectCommand {
    #[command(flatten)]
    source: SourceArgs,
}

impl InspectCommand {
    /// Execute the inspect command
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be loaded or an override names
    /// an unknown field.
    pub fn execute(&self) -> Result<()> {
        let settings = self.source.settings()?;
        let record = self.source.source()?.record(self.source.record.trim())?;
        let state = FieldClassifier::classify(record, &settings.overrides())?;

        println!(
            "\n{} {} (table {})\n",
            style("Record").bold(),
            style(state.roles.model()).cyan().bold(),
            style(state.roles.table()).yellow()
        );
        for line in role_lines(&state.roles) {
            println!("  {line}");
        }
        println!();
        Ok(())
    }
}

/// One unstyled line per field: name, column, type, then its roles
fn role_lines(roles: &FieldRoles) -> Vec<String> {
    let fields = roles.record().fields();
    let name_width = fields.iter().map(|f| f.name().len()).max().unwrap_or(0);
    let column_width = fields.iter().map(|f| f.column().len()).max().unwrap_or(0);

    fields
        .iter()
        .map(|f| {
            let i = f.ordinal();
            let mut tags = Vec::new();
            if roles.primary() == Some(i) {
                tags.push("primary");
            }
            if roles.soft_delete() == Some(i) {
                tags.push("soft-delete");
            }
            if roles.read().contains(&i) {
                tags.push("read");
            }
            if roles.write().contains(&i) {
                tags.push("write");
            }
            format!(
                "{:name_width$}  {:column_width$}  {}  [{}]",
                f.name(),
                f.column(),
                f.type_expr(),
                tags.join(", ")
            )
        })
        .collect()
}
