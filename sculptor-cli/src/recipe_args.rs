use anyhow::{bail, Context, Result};
use clap::Args;
use sculptor_core::catalog::ENVIRONMENT_ID;
use sculptor_core::Recipe;
use std::path::PathBuf;

/// Recipe assembled from the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct RecipeArgs {
    /// Block to add, as BASE_ID or BASE_ID:key=value,key=value (repeatable).
    /// A comma not followed by `key=` stays part of the value.
    #[arg(long = "block", short = 'b', value_name = "SPEC")]
    pub blocks: Vec<String>,

    /// Environment setting, e.g. vdd=1.8 or reset_style=sync-active-low (repeatable)
    #[arg(long = "set", short = 's', value_name = "KEY=VALUE")]
    pub environment: Vec<String>,

    /// Free-text customization appended to the instruction
    #[arg(long)]
    pub customization: Option<String>,

    /// File whose contents the model should mimic
    #[arg(long, value_name = "PATH")]
    pub reference_file: Option<PathBuf>,
}

/// Everything a workbench needs besides the provider.
#[derive(Debug)]
pub struct Draft {
    pub recipe: Recipe,
    pub customization: String,
    pub reference_code: String,
}

impl RecipeArgs {
    pub fn load(&self) -> Result<Draft> {
        let mut recipe = Recipe::new();

        for spec in &self.blocks {
            let (base_id, overrides) = parse_block_spec(spec)?;
            let id = recipe
                .add_from_catalog(base_id)
                .with_context(|| format!("Invalid --block '{spec}'"))?
                .id
                .clone();
            for (key, value) in overrides {
                apply_param(&mut recipe, &id, key, &value)
                    .with_context(|| format!("Invalid --block '{spec}'"))?;
            }
        }

        for assignment in &self.environment {
            let (key, value) = parse_assignment(assignment)?;
            apply_param(&mut recipe, ENVIRONMENT_ID, key, value)
                .with_context(|| format!("Invalid --set '{assignment}'"))?;
        }

        let reference_code = match &self.reference_file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read reference file {path:?}"))?,
            None => String::new(),
        };

        Ok(Draft {
            recipe,
            customization: self.customization.clone().unwrap_or_default(),
            reference_code,
        })
    }
}

fn apply_param(recipe: &mut Recipe, id: &str, key: &str, value: &str) -> Result<()> {
    let Some(block) = recipe.get_mut(id) else {
        bail!("Block '{id}' is not in the recipe")
    };
    block.set_param(key, value)?;
    Ok(())
}

fn parse_assignment(text: &str) -> Result<(&str, &str)> {
    let Some((key, value)) = text.split_once('=') else {
        bail!("Expected KEY=VALUE, got '{text}'")
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("Missing key in '{text}'")
    }
    Ok((key, value.trim()))
}

fn is_key(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn parse_block_spec(spec: &str) -> Result<(&str, Vec<(&str, String)>)> {
    let (base_id, rest) = match spec.split_once(':') {
        Some((base_id, rest)) => (base_id.trim(), rest),
        None => (spec.trim(), ""),
    };
    if base_id.is_empty() {
        bail!("Missing block id in '{spec}'")
    }

    let mut overrides: Vec<(&str, String)> = Vec::new();
    for part in rest.split(',').filter(|part| !part.trim().is_empty()) {
        let starts_assignment = part.split_once('=').is_some_and(|(key, _)| is_key(key));
        match overrides.last_mut() {
            Some((_, value)) if !starts_assignment => {
                value.push(',');
                value.push_str(part.trim_end());
            }
            _ => {
                let (key, value) = parse_assignment(part)?;
                overrides.push((key, value.to_string()));
            }
        }
    }

    Ok((base_id, overrides))
}
