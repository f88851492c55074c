use rizzonator_lib::llm::provider;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    // `rizzonator set-key <KEY>` stores the OpenRouter key in the OS keychain.
    if args.get(1).map(String::as_str) == Some("set-key") {
        let Some(key) = args.get(2) else {
            eprintln!("Usage: rizzonator set-key <OPENROUTER_API_KEY>");
            std::process::exit(2);
        };
        match provider::save_api_key(&provider::openrouter(), key) {
            Ok(()) => eprintln!("Saved key {}", provider::mask_token(key)),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = rizzonator_lib::run().await {
        log::error!("{}", e);
        eprintln!("rizzonator: {}", e);
        std::process::exit(1);
    }
}
