mod ui;

use anyhow::Result;
use writeai::core::config::Config;
use writeai::services::generation::GenerationController;
use writeai::services::llm;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {:#}", e);
            eprintln!("Please fix 'config.yml' or remove it to use the defaults.");
            return Err(e);
        }
    };

    let llm = match llm::create_llm(&config.llm) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error initializing LLM client: {:#}", e);
            return Err(e);
        }
    };

    let mut controller = GenerationController::new(llm, config.llm.model.clone());
    ui::run(&mut controller).await?;

    Ok(())
}
