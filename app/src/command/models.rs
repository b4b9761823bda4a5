use chatrs_core::SUPPORTED_MODELS;
use chatrs_core::models::DEFAULT_MODEL;

/// Strategy for listing the models a chat may use.
#[derive(Debug, Clone, Copy)]
pub struct ModelsStrategy;

impl super::CommandStrategy for ModelsStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        for model in SUPPORTED_MODELS {
            let marker = if model == DEFAULT_MODEL { " (default)" } else { "" };
            println!("{model}{marker}");
        }
        Ok(())
    }
}
