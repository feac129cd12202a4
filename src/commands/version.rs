use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("gpuscope version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
