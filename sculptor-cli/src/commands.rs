use crate::recipe_args::{Draft, RecipeArgs};
use anyhow::{bail, Context, Result};
use sculptor_core::ai::{self, Model};
use sculptor_core::catalog;
use sculptor_core::preview::Snippets;
use sculptor_core::{
    build_prompt, build_system_instruction, SessionInputs, SessionManager, SettingsManager,
    Workbench,
};
use std::path::PathBuf;
use tracing::info;

pub fn catalog() -> Result<()> {
    for (category, blocks) in catalog::by_category() {
        println!("{category}");
        for block in blocks {
            println!(
                "  {:<12} {:<14} {}",
                block.base_id, block.label, block.description
            );
        }
    }
    Ok(())
}

pub fn models() -> Result<()> {
    let default = Model::default();
    for model in Model::selectable() {
        let marker = if model == default { " (default)" } else { "" };
        println!("{}{marker}", model.name());
    }
    Ok(())
}

pub fn preview(args: &RecipeArgs) -> Result<()> {
    let draft = args.load()?;
    let snippets = Snippets::from_params(&draft.recipe.environment().params);
    for (label, snippet) in snippets.sections() {
        println!("== {label} ==\n{snippet}\n");
    }
    Ok(())
}

pub fn prompt(args: &RecipeArgs) -> Result<()> {
    let Draft {
        recipe,
        customization,
        reference_code,
    } = args.load()?;
    let inputs = SessionInputs::from_recipe(&recipe, &customization, &reference_code);

    println!("=== System instruction ===\n{}\n", build_system_instruction(&inputs));
    println!("=== User turn ===\n{}", build_prompt(&recipe, &inputs));
    Ok(())
}

pub struct GenerateOptions {
    pub recipe: RecipeArgs,
    pub settings: Option<PathBuf>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub output: Option<PathBuf>,
}

pub async fn generate(options: GenerateOptions) -> Result<()> {
    let draft = options.recipe.load()?;

    let settings_manager = match options.settings {
        Some(path) => SettingsManager::from_path(path)?,
        None => SettingsManager::new()?,
    };
    let mut settings = settings_manager.settings();

    if let Some(name) = options.provider.as_deref() {
        settings
            .set_active_provider(name)
            .map_err(anyhow::Error::msg)?;
    }
    if let Some(name) = options.model.as_deref() {
        let Some(model) = Model::from_name(name) else {
            bail!("Unknown model '{name}'; run `sculptor models` for the list")
        };
        settings.model = model;
    }

    let provider = ai::create_active_provider(&settings)?;
    let manager = SessionManager::new(provider, settings.model_settings());
    info!(
        provider = ?settings.active_provider,
        model = settings.model.name(),
        "Generating"
    );

    let mut workbench = Workbench::new(manager);
    workbench.set_recipe(draft.recipe);
    workbench.set_customization(draft.customization);
    workbench.set_reference_code(draft.reference_code);

    let result = match workbench.generate().await {
        Ok(result) => result,
        Err(err) if err.is_transient() => {
            return Err(anyhow::Error::new(err)
                .context("The provider is temporarily unavailable; run the command again later"))
        }
        Err(err) => return Err(err.into()),
    };

    match options.output {
        Some(path) => {
            std::fs::write(&path, &result.code)
                .with_context(|| format!("Failed to write generated code to {path:?}"))?;
            println!("Wrote {} bytes of Verilog-A to {}", result.code.len(), path.display());
        }
        None if result.has_code() => println!("{}\n", result.code),
        None => println!("(no code block in the reply)\n"),
    }
    if !result.explanation.is_empty() {
        println!("{}", result.explanation);
    }

    Ok(())
}
