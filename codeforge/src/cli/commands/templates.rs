//! `codeforge templates list`.

use crate::cli::app::TemplatesCommand;
use anyhow::Result;
use codeforge_core::templates::list_templates;

pub fn execute(command: TemplatesCommand) -> Result<()> {
    match command {
        TemplatesCommand::List => list(),
    }
    Ok(())
}

fn list() {
    println!("{:<14} {:<10} {:<28} DESCRIPTION", "KEY", "LANGUAGE", "NAME");
    for template in list_templates() {
        println!("{:<14} {:<10} {:<28} {}", template.key, template.language.as_str(), template.name, template.description);
    }
}
