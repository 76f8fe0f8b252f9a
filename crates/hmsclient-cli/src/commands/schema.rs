//! Offline schema rendering.

use anyhow::Result;
use hmsclient_core::{make_schema, parse_schema};

/// Expand compact `name[:type]` specs and print `name<TAB>type` lines.
pub fn render(specs: &[String]) -> Result<()> {
    for line in lines(specs)? {
        println!("{}", line);
    }
    Ok(())
}

fn lines(specs: &[String]) -> Result<Vec<String>> {
    let columns = make_schema(specs)?;
    Ok(parse_schema(&columns).collect())
}
