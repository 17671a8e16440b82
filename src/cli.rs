use anyhow::{Result, bail};

use crate::config::Config;
use crate::store::ContentStore;
use crate::store::types::Role;

fn print_help() {
    println!("pressbox - editorial workflow service\n");
    println!("Usage: pressbox <command>\n");
    println!("Commands:");
    println!("  serve                          Start the API server (default)");
    println!("  token <name> <role> [agent-id] Mint an API token (role: editor | agent)");
    println!("  tokens                         List minted tokens");
    println!("  revoke <token-id>              Delete a token");
    println!("  help                           Show this help");
}

pub async fn run_main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None | Some("serve") => {
            crate::logging::init();
            let config = Config::from_env();
            crate::web::serve(config).await
        }
        Some("token") => mint_token(&args[1..]),
        Some("tokens") => list_tokens(),
        Some("revoke") => revoke_token(&args[1..]),
        Some("help") | Some("--help") | Some("-h") => {
            print_help();
            Ok(())
        }
        Some(other) => {
            print_help();
            bail!("unknown command: {other}")
        }
    }
}

fn mint_token(args: &[String]) -> Result<()> {
    let (name, role) = match (args.first(), args.get(1)) {
        (Some(name), Some(role)) => (name, Role::parse(role)?),
        _ => bail!("usage: pressbox token <name> <role> [agent-id]"),
    };
    let agent_id = args.get(2).map(String::as_str);
    if role == Role::Agent && agent_id.is_none() {
        bail!("agent tokens must be bound to an agent id");
    }

    let config = Config::from_env();
    let store = ContentStore::open(&config.db_path)?;
    if let Some(id) = agent_id
        && store.get_agent(id)?.is_none()
    {
        bail!("no agent with id {id}");
    }

    let (raw, record) = store.create_api_token(name, role, agent_id)?;
    println!("Token created ({} / {}).", record.name, record.role.as_str());
    println!("Save this value, it is not shown again:\n\n  {raw}\n");
    Ok(())
}

fn list_tokens() -> Result<()> {
    let config = Config::from_env();
    let store = ContentStore::open(&config.db_path)?;
    let tokens = store.list_api_tokens()?;
    if tokens.is_empty() {
        println!("No tokens minted.");
        return Ok(());
    }
    for t in tokens {
        let binding = t.agent_id.as_deref().unwrap_or("-");
        println!("{}  {:6}  {:20}  agent={}", t.id, t.role.as_str(), t.name, binding);
    }
    Ok(())
}

fn revoke_token(args: &[String]) -> Result<()> {
    let Some(id) = args.first() else {
        bail!("usage: pressbox revoke <token-id>");
    };
    let config = Config::from_env();
    let store = ContentStore::open(&config.db_path)?;
    if store.delete_api_token(id)? {
        println!("Token {id} revoked.");
        Ok(())
    } else {
        bail!("no token with id {id}")
    }
}
