use std::env;
use std::fs;
use std::process;

use schemadraw::codec;
use schemadraw::model::Schema;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <input> [options]", args[0]);
        eprintln!();
        eprintln!("Options:");
        eprintln!("  -o, --output <file>    Output file (default: stdout)");
        eprintln!("  -t, --to <code|json>   Target format (default: by input extension)");
        process::exit(1);
    }

    let input_path = &args[1];
    let mut output_path: Option<String> = None;
    let mut target: Option<String> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(args[i].clone());
                }
            }
            "-t" | "--to" => {
                i += 1;
                if i < args.len() {
                    target = Some(args[i].clone());
                }
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let input = match fs::read_to_string(input_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {}: {}", input_path, e);
            process::exit(1);
        }
    };

    // A .json input holds the canvas model, anything else is schema source.
    let target = target.unwrap_or_else(|| {
        if input_path.ends_with(".json") {
            "code".to_string()
        } else {
            "json".to_string()
        }
    });

    let output = match target.as_str() {
        "code" => {
            let schema: Schema = match serde_json::from_str(&input) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Invalid schema JSON: {}", e);
                    process::exit(1);
                }
            };
            codec::generate(&schema)
        }
        "json" => {
            let schema = match codec::parse(&input) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Parse error: {}", e);
                    process::exit(1);
                }
            };
            match serde_json::to_string_pretty(&schema) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Failed to encode schema: {}", e);
                    process::exit(1);
                }
            }
        }
        other => {
            eprintln!("Invalid target format: {}", other);
            process::exit(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &output) {
                eprintln!("Failed to write {}: {}", path, e);
                process::exit(1);
            }
        }
        None => println!("{}", output),
    }
}
