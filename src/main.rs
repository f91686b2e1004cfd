use env_logger::Env;
use log::{debug, info, warn};
use scummtool::{Config, Engine, Script, SymbolTable};
use std::env;
use std::fs::File;
use std::io::prelude::*;

fn usage(program: &str) {
    eprintln!("scummtool - disassembler and VM for v4 adventure-game scripts");
    eprintln!();
    eprintln!(
        "Usage: {} <script-file> [--id N] [--config FILE] [--run] [--no-bytes]",
        program
    );
    eprintln!();
    eprintln!("  --id N         Script number shown in the listing (default 0)");
    eprintln!("  --config FILE  TOML file with listing/run options and symbol names");
    eprintln!("  --run          Execute the script after listing it");
    eprintln!("  --no-bytes     Leave raw instruction bytes out of the listing");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("scummtool");

    let mut filename = None;
    let mut id: u16 = 0;
    let mut config_path = None;
    let mut run = false;
    let mut no_bytes = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--id" => {
                i += 1;
                let value = args.get(i).ok_or("--id needs a value")?;
                id = value
                    .parse()
                    .map_err(|_| format!("Invalid script id: {}", value))?;
            }
            "--config" => {
                i += 1;
                config_path = Some(args.get(i).ok_or("--config needs a file")?.clone());
            }
            "--run" => run = true,
            "--no-bytes" => no_bytes = true,
            "-h" | "--help" => {
                usage(program);
                return Ok(());
            }
            arg if !arg.starts_with('-') && filename.is_none() => {
                filename = Some(arg.to_string());
            }
            other => {
                eprintln!("Unknown option: {}", other);
                usage(program);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let filename = match filename {
        Some(f) => f,
        None => {
            usage(program);
            std::process::exit(1);
        }
    };

    let config = match &config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let mut listing_options = config.listing.clone();
    if no_bytes {
        listing_options.show_bytes = false;
    }

    let mut file = File::open(&filename)?;
    let mut bytecode = Vec::new();
    file.read_to_end(&mut bytecode)?;
    debug!("Loaded {} bytes from {}", bytecode.len(), filename);

    let script = Script::decode(id, bytecode)?;

    let mut st = SymbolTable::with_defaults();
    let applied = config.apply_symbols(&mut st)?;
    if applied > 0 {
        debug!("Applied {} symbol hints", applied);
    }

    let listing = script.listing(&mut st, &listing_options);
    print!("{}", listing.text);
    if !listing.is_consistent() {
        warn!("Listing has {} inconsistent labels", listing.errors.len());
    }

    if run {
        let mut engine = Engine::with_options(config.run.clone());
        engine.run(&script)?;
        info!("Script {} finished", script.id);
        for (prop, value) in engine.properties() {
            info!("{} = {}", prop.key(), value);
        }
    }

    Ok(())
}
