//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the planner's REST endpoints.
//! Usage: `openapi [PATH]`, where `PATH` defaults to `openapi.json` and `-` prints to stdout.

use api_lib::web::rest::openapi_json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let document = openapi_json()?;
    match std::env::args().nth(1).as_deref() {
        Some("-") => println!("{}", document),
        target => {
            let path = target.unwrap_or("openapi.json");
            std::fs::write(path, document)?;
            eprintln!("OpenAPI document written to {}", path);
        }
    }
    Ok(())
}
