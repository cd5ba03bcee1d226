use voca_config::VocaConfig;
use voca_forge::Forge;
use voca_store::SkillStore;

pub(super) async fn cmd_serve(mut config: VocaConfig, listen: Option<String>) -> voca_core::Result<()> {
    if let Some(listen) = listen {
        config.server.listen = listen;
    }

    // Fail before binding when upstream calls could never succeed.
    config.require_api_key()?;
    let store = SkillStore::open(&config.store.path)?;
    let forge = Forge::from_config(&config, store)?;

    println!("Voca v{}", env!("CARGO_PKG_VERSION"));
    println!("   Chat model:  {}", config.openai.chat_model);
    println!("   Image model: {}", config.openai.image_model);
    println!("   Store:       {}", config.store.path.display());
    println!("   Listening:   http://{}", config.server.listen);
    println!();

    voca_server::start_server(config.server.clone(), forge).await
}
