use miette::Result;
use prebundle_core::version::version_string;
use prebundle_core::VERSION;
use serde::Serialize;

#[derive(Serialize)]
struct VersionJson {
    ok: bool,
    version: &'static str,
}

pub fn run(json: bool) -> Result<()> {
    if json {
        return super::print_json(&VersionJson {
            ok: true,
            version: VERSION,
        });
    }
    println!("{}", version_string());
    Ok(())
}
